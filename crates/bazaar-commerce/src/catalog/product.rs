//! Product records as the REST backend sends them, and the validated
//! internal product they normalize into.
//!
//! Everything past this module can assume well-typed, non-optional fields.
//! Price strings, missing image lists and backslashed upload paths are dealt
//! with here, once.

use crate::cart::LineItem;
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// A numeric field that the backend sometimes sends as a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrString {
    Number(f64),
    Text(String),
}

impl NumberOrString {
    /// Coerce to a finite number.
    pub fn to_f64(&self, field: &str) -> Result<f64, CommerceError> {
        let value = match self {
            NumberOrString::Number(n) => *n,
            NumberOrString::Text(s) => s.trim().parse::<f64>().map_err(|_| {
                CommerceError::ValidationError(format!("{} is not a number: {:?}", field, s))
            })?,
        };
        if !value.is_finite() {
            return Err(CommerceError::ValidationError(format!(
                "{} is not finite",
                field
            )));
        }
        Ok(value)
    }
}

/// Product as returned by the catalog API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(alias = "title")]
    pub name: String,
    pub price: NumberOrString,
    /// Percent off, 0-100.
    #[serde(default)]
    pub discount: Option<NumberOrString>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub stock: Option<i64>,
}

/// A validated catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Money,
    /// Line-level discount percent, if the product is on sale.
    pub discount_percent: Option<f64>,
    /// Normalized relative image paths, first is primary.
    pub images: Vec<String>,
    /// Units in stock, when the backend reports it.
    pub stock: Option<i64>,
}

impl Product {
    /// Normalize an API record, pricing it in `currency`.
    pub fn from_record(record: ProductRecord, currency: Currency) -> Result<Self, CommerceError> {
        let id = record.id.trim();
        if id.is_empty() {
            return Err(CommerceError::ValidationError(
                "product id is empty".to_string(),
            ));
        }
        let name = record.name.trim();
        if name.is_empty() {
            return Err(CommerceError::ValidationError(format!(
                "product {} has no name",
                id
            )));
        }

        let price = record.price.to_f64("price")?;
        if price < 0.0 {
            return Err(CommerceError::ValidationError(format!(
                "product {} has negative price",
                id
            )));
        }

        let price = Money::try_from_decimal(price, currency).ok_or_else(|| {
            CommerceError::ValidationError(format!("product {} price is out of range", id))
        })?;

        let discount_percent = match record.discount {
            Some(d) => {
                let d = d.to_f64("discount")?;
                validate_percent(d)?;
                (d > 0.0).then_some(d)
            }
            None => None,
        };

        let images = record
            .images
            .unwrap_or_default()
            .iter()
            .map(|p| normalize_media_path(p))
            .filter(|p| !p.is_empty())
            .collect();

        Ok(Self {
            id: ProductId::new(id),
            name: name.to_string(),
            price,
            discount_percent,
            images,
            stock: record.stock,
        })
    }

    /// Primary image path, if any.
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// A cart line as the backend or the browser cart store sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineRecord {
    pub product: ProductRecord,
    #[serde(default = "default_quantity")]
    pub quantity: NumberOrString,
}

fn default_quantity() -> NumberOrString {
    NumberOrString::Number(1.0)
}

impl CartLineRecord {
    /// Normalize into a cart line item.
    pub fn into_line_item(self, currency: Currency) -> Result<LineItem, CommerceError> {
        let quantity = self.quantity.to_f64("quantity")?;
        if quantity.fract() != 0.0 {
            return Err(CommerceError::ValidationError(format!(
                "quantity must be a whole number, got {}",
                quantity
            )));
        }
        let product = Product::from_record(self.product, currency)?;
        LineItem::for_product(&product, quantity as i64)
    }
}

/// Validate a 0-100 percentage.
pub(crate) fn validate_percent(percent: f64) -> Result<(), CommerceError> {
    if !(0.0..=100.0).contains(&percent) {
        return Err(CommerceError::ValidationError(format!(
            "percentage out of range: {}",
            percent
        )));
    }
    Ok(())
}

/// Normalize an upload path: backslashes become slashes, leading
/// separators and `./` are dropped.
///
/// ```
/// use bazaar_commerce::catalog::normalize_media_path;
/// assert_eq!(normalize_media_path("uploads\\products\\a.png"), "uploads/products/a.png");
/// ```
pub fn normalize_media_path(path: &str) -> String {
    let path = path.trim().replace('\\', "/");
    let mut path = path.as_str();
    loop {
        if let Some(rest) = path.strip_prefix("./") {
            path = rest;
        } else if let Some(rest) = path.strip_prefix('/') {
            path = rest;
        } else {
            break;
        }
    }
    path.to_string()
}

/// Join a normalized media path onto the upload root.
pub fn media_url(upload_root: &str, path: &str) -> String {
    let root = upload_root.trim_end_matches('/');
    let path = normalize_media_path(path);
    if root.is_empty() {
        path
    } else {
        format!("{}/{}", root, path)
    }
}
