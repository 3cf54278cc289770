//! Core types for the SenVision cart

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ShopError;

/// Largest discount a line item can carry, in percent
pub const MAX_DISCOUNT_PERCENT: u8 = 100;

/// Unique identifier for a product
///
/// Storefront listings use integer ids, but hand-written pages sometimes use
/// string keys. Both forms are accepted and persisted as-is. Equality is
/// strict: `Number(7)` and `Key("7")` are different products.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    Number(i64),
    Key(String),
}

impl ProductId {
    /// Parse user input; anything that reads as an integer becomes `Number`
    pub fn parse(s: &str) -> Result<Self, ShopError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ShopError::InvalidProductId(s.to_string()));
        }
        Ok(match s.parse::<i64>() {
            Ok(n) => ProductId::Number(n),
            Err(_) => ProductId::Key(s.to_string()),
        })
    }
}

impl FromStr for ProductId {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<i64> for ProductId {
    fn from(n: i64) -> Self {
        ProductId::Number(n)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        ProductId::Key(s.to_string())
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductId::Number(n) => write!(f, "{}", n),
            ProductId::Key(k) => f.write_str(k),
        }
    }
}

/// A product as the catalog describes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Whole FCFA, before discount
    pub price: u64,
    pub image: String,
    /// Discount percent, 0 for none
    #[serde(default)]
    pub promotion: u8,
}

impl Product {
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            image: String::new(),
            promotion: 0,
        }
    }

    pub fn with_promotion(mut self, percent: u8) -> Self {
        self.promotion = percent;
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }
}

/// One product entry in the cart
///
/// Field names on the wire follow the storefront's persisted format:
/// `{id, name, price, image, quantity, promotion}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: ProductId,
    pub name: String,
    #[serde(rename = "price")]
    pub unit_price: u64,
    #[serde(rename = "image", default)]
    pub image_url: String,
    pub quantity: u32,
    #[serde(rename = "promotion", default)]
    pub discount_percent: u8,
}

impl LineItem {
    /// A fresh line for `product` with quantity 1
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            image_url: product.image.clone(),
            quantity: 1,
            discount_percent: product.promotion.min(MAX_DISCOUNT_PERCENT),
        }
    }

    /// Per-unit price after discount
    pub fn effective_price(&self) -> f64 {
        let price = self.unit_price as f64;
        if self.discount_percent > 0 {
            price * (1.0 - f64::from(self.discount_percent) / 100.0)
        } else {
            price
        }
    }

    /// `effective_price * quantity`
    pub fn line_total(&self) -> f64 {
        self.effective_price() * f64::from(self.quantity)
    }
}
