// Page classifier implementations
pub mod storefront;

pub use storefront::{StorefrontClassifier, classify};
