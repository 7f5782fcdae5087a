use regex::Regex;
use std::sync::LazyLock;

use crate::models::Status;
use crate::plugins::traits::{Classification, Classifier, Decision};

// Lowercased input; `(?s)` lets the button body span lines, `.*?` keeps it
// to the first closing tag.
static BUTTON_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<button[^>]*(add-to-cart|product-form__submit|name="add")[^>]*>(.*?)</button>"#)
        .expect("button pattern is a valid regex")
});

// Single-line on purpose: a `<` with no `>` before the next newline is left alone.
static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<.*?>").expect("tag pattern is a valid regex"));

const IN_STOCK_SIGNALS: &[&str] = &["add to cart", "add to bag", "add to basket", "buy now"];

const PRE_ORDER_SIGNALS: &[&str] = &[
    "this product is currently on pre-order",
    "this item is a recurring or deferred purchase",
    "pre-order now",
    "pre order now",
    " pre-order ",
    " pre order ",
];

const SOLD_OUT_SIGNALS: &[&str] = &["- sold out", ">sold out<", " sold out "];

/// Two-tier heuristic for storefront product pages.
///
/// The purchase button label wins when one is present. Otherwise the whole
/// page is scanned for phrases, with in-stock copy taking precedence over
/// pre-order copy, and pre-order over sold-out. A page that says nothing
/// recognisable is assumed to be in stock so a restock is never missed.
#[derive(Debug, Clone, Copy, Default)]
pub struct StorefrontClassifier;

impl StorefrontClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Plain text of the first purchase button, if the page has one.
    pub fn button_label(html: &str) -> Option<String> {
        let captures = BUTTON_PATTERN.captures(html)?;
        let inner = captures.get(2).map(|m| m.as_str()).unwrap_or_default();
        Some(TAG_PATTERN.replace_all(inner, "").trim().to_lowercase())
    }

    fn status_from_label(label: &str) -> Status {
        if label.contains("sold out") {
            Status::SoldOut
        } else if label.contains("pre-order") || label.contains("pre order") {
            Status::PreOrder
        } else {
            Status::InStock
        }
    }

    fn status_from_document(html: &str) -> Status {
        let contains_any = |signals: &[&str]| signals.iter().any(|signal| html.contains(signal));

        if contains_any(IN_STOCK_SIGNALS) {
            Status::InStock
        } else if contains_any(PRE_ORDER_SIGNALS) {
            Status::PreOrder
        } else if contains_any(SOLD_OUT_SIGNALS) {
            Status::SoldOut
        } else {
            Status::InStock
        }
    }
}

impl Classifier for StorefrontClassifier {
    fn name(&self) -> &str {
        "storefront"
    }

    fn classify_detailed(&self, html: &str) -> Classification {
        if html.trim().is_empty() {
            return Classification {
                status: Status::SoldOut,
                decided_by: Decision::Empty,
            };
        }

        let html = html.to_lowercase();

        match Self::button_label(&html) {
            Some(label) => Classification {
                status: Self::status_from_label(&label),
                decided_by: Decision::Button { label },
            },
            None => Classification {
                status: Self::status_from_document(&html),
                decided_by: Decision::Fallback,
            },
        }
    }
}

/// Classify a page with the default storefront heuristics.
pub fn classify(html: &str) -> Status {
    StorefrontClassifier.classify(html)
}
