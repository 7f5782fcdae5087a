use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::utils::error::{AppError, Result};

/// Artist tag used when a product has no tag of its own.
pub const DEFAULT_ARTIST_TAG: &str = "madison";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub artist_tag: String,
}

impl Product {
    pub fn new(name: impl Into<String>, url: impl Into<String>, artist_tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            artist_tag: artist_tag.into(),
        }
    }
}

/// Fixed, ordered set of monitored products keyed by name.
///
/// Iteration follows insertion order so every poll pass visits products
/// in the same sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn from_products(products: Vec<Product>) -> Result<Self> {
        let mut index = HashMap::with_capacity(products.len());
        for (position, product) in products.iter().enumerate() {
            if product.name.trim().is_empty() {
                return Err(AppError::Validation("Product name must not be empty".into()));
            }
            if index.insert(product.name.clone(), position).is_some() {
                return Err(AppError::Validation(format!(
                    "Duplicate product name in catalog: {}",
                    product.name
                )));
            }
        }

        Ok(Self { products, index })
    }

    /// The store catalog the watcher ships with.
    pub fn builtin() -> Self {
        const STORE: &str = "https://www.onrpt.store/collections/madison-beer/products";

        let madison = [
            ("locket vinyl", "locket-lp"),
            ("locket cd", "locket-cd"),
            ("limited edition locket necklace and cd - bundle", "limited-edition-locket-necklace-and-cd-bundle"),
            ("limited edition locket necklace and cd + signed insert", "limited-edition-locket-necklace-and-cd-signed"),
            ("locket music bundle", "locket-music-bundle"),
            ("limited edition locket vinyl + signed insert", "signed-insert-locket-vinyl"),
            ("locket cassette", "locket-cassette"),
            ("limited edition locket necklace", "locket"),
            ("locket tee", "limited-edition-locket-tee"),
            ("locket tee + cd + signed insert", "limited-edition-locket-tee-and-cd-signed-insert"),
            ("locket tee + cd", "limited-edition-locket-tee-and-cd"),
        ];

        let mut products: Vec<Product> = madison
            .iter()
            .map(|(name, slug)| Product::new(*name, format!("{}/{}", STORE, slug), "madison"))
            .collect();

        // Placeholder links until the travis store pages are known
        products.push(Product::new("utopia tee", "https://travis-store-link-here", "travis"));
        products.push(Product::new("tour hoodie", "https://travis-store-link-here-2", "travis"));

        // Names above are distinct literals, so indexing cannot collide
        let index = products
            .iter()
            .enumerate()
            .map(|(position, product)| (product.name.clone(), position))
            .collect();

        Self { products, index }
    }

    pub fn get(&self, name: &str) -> Option<&Product> {
        self.index.get(name).map(|&position| &self.products[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Artist tag for a product, falling back to the default tag.
    pub fn artist_tag_for(&self, name: &str) -> &str {
        self.get(name)
            .map(|product| product.artist_tag.as_str())
            .unwrap_or(DEFAULT_ARTIST_TAG)
    }
}
