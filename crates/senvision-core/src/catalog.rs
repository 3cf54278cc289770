//! Product catalog lookups.
//!
//! The storefront publishes its products as a JSON listing with French
//! field names and display-formatted prices:
//!
//! ```json
//! [{ "id": 12, "nom": "Ray-Ban Aviator", "prix": "85 000", "image": "img/rb.jpg", "promotion": 15 }]
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::ShopResult;
use crate::types::{Product, ProductId, MAX_DISCOUNT_PERCENT};

/// Shown when a listing entry has no usable image
pub const FALLBACK_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1511499767150-a48a237f0083?w=400&h=300&fit=crop";

/// Source of product records for add-to-cart actions
pub trait Catalog {
    fn find_by_id(&self, id: &ProductId) -> Option<Product>;
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListingPrice {
    Amount(u64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct ListingEntry {
    id: ProductId,
    nom: String,
    prix: ListingPrice,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    promotion: u8,
}

/// Parse a display price such as `"12 500"` into whole FCFA
pub fn parse_price(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    digits.parse().ok()
}

/// Catalog backed by the storefront's product listing
#[derive(Debug, Clone, Default)]
pub struct ListingCatalog {
    products: Vec<Product>,
}

impl ListingCatalog {
    pub fn from_products(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Parse a listing document.
    ///
    /// Entries whose price cannot be read are skipped with a warning; a
    /// document that is not a listing at all is an error.
    pub fn from_json(json: &str) -> ShopResult<Self> {
        let entries: Vec<ListingEntry> = serde_json::from_str(json)?;
        let mut products = Vec::with_capacity(entries.len());

        for entry in entries {
            let price = match entry.prix {
                ListingPrice::Amount(n) => Some(n),
                ListingPrice::Text(ref text) => parse_price(text),
            };
            let Some(price) = price else {
                tracing::warn!(id = %entry.id, "skipping listing entry with unreadable price");
                continue;
            };

            let image = entry
                .image
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| FALLBACK_IMAGE_URL.to_string());

            products.push(Product {
                id: entry.id,
                name: entry.nom,
                price,
                image,
                promotion: entry.promotion.min(MAX_DISCOUNT_PERCENT),
            });
        }

        Ok(Self { products })
    }

    pub fn load(path: impl AsRef<Path>) -> ShopResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }
}

impl Catalog for ListingCatalog {
    fn find_by_id(&self, id: &ProductId) -> Option<Product> {
        self.products.iter().find(|p| &p.id == id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"[
        {"id": 1, "nom": "Ray-Ban Aviator", "prix": "85 000", "image": "img/rb.jpg", "promotion": 15, "nouveau": true},
        {"id": 2, "nom": "Oakley Holbrook", "prix": "62 500", "image": "  "},
        {"id": 3, "nom": "Sur devis", "prix": "à voir"},
        {"id": "gucci-gg", "nom": "Gucci GG", "prix": 120000}
    ]"#;

    #[test]
    fn test_parse_price_strips_grouping() {
        assert_eq!(parse_price("12 500"), Some(12_500));
        assert_eq!(parse_price("1\u{202f}250\u{202f}000"), Some(1_250_000));
        assert_eq!(parse_price("gratuit"), None);
    }

    #[test]
    fn test_listing_parses_storefront_entries() {
        let catalog = ListingCatalog::from_json(LISTING).unwrap();
        assert_eq!(catalog.products().len(), 3);

        let rb = catalog.find_by_id(&ProductId::Number(1)).unwrap();
        assert_eq!(rb.name, "Ray-Ban Aviator");
        assert_eq!(rb.price, 85_000);
        assert_eq!(rb.promotion, 15);
        assert_eq!(rb.image, "img/rb.jpg");
    }

    #[test]
    fn test_blank_image_falls_back() {
        let catalog = ListingCatalog::from_json(LISTING).unwrap();
        let oakley = catalog.find_by_id(&ProductId::Number(2)).unwrap();
        assert_eq!(oakley.price, 62_500);
        assert_eq!(oakley.image, FALLBACK_IMAGE_URL);
    }

    #[test]
    fn test_unreadable_price_is_skipped() {
        let catalog = ListingCatalog::from_json(LISTING).unwrap();
        assert!(catalog.find_by_id(&ProductId::Number(3)).is_none());
    }

    #[test]
    fn test_string_ids_and_numeric_prices() {
        let catalog = ListingCatalog::from_json(LISTING).unwrap();
        let gucci = catalog.find_by_id(&ProductId::from("gucci-gg")).unwrap();
        assert_eq!(gucci.price, 120_000);
    }

    #[test]
    fn test_malformed_listing_is_an_error() {
        assert!(ListingCatalog::from_json("{\"not\": \"a list\"}").is_err());
    }
}
