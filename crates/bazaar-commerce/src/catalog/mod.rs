//! Product catalog module.
//!
//! Boundary types for products coming off the REST backend.

mod product;

pub(crate) use product::validate_percent;
pub use product::{
    media_url, normalize_media_path, CartLineRecord, NumberOrString, Product, ProductRecord,
};
