use serde::{Deserialize, Serialize};
use std::fmt;

pub mod product;

// Re-exports for convenience
pub use product::*;

/// Purchase availability of a product page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    SoldOut,
    PreOrder,
    InStock,
}

impl Status {
    /// Alert text for a transition into this status, if it warrants one.
    pub fn alert_message(&self) -> Option<&'static str> {
        match self {
            Status::PreOrder => Some("is now available to PRE-ORDER."),
            Status::InStock => Some("is now IN STOCK!"),
            Status::SoldOut => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::SoldOut => "SoldOut",
            Status::PreOrder => "PreOrder",
            Status::InStock => "InStock",
        };
        f.write_str(label)
    }
}
