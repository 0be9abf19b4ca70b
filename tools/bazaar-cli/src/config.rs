//! CLI configuration.

use anyhow::{bail, Context, Result};
use bazaar_commerce::cart::{Coupon, CouponCatalog, CouponKind, PricingPolicy, TaxBasis};
use bazaar_commerce::{Currency, Money};
use serde::{Deserialize, Serialize};

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Shipping and tax rules.
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Media configuration.
    #[serde(default)]
    pub media: MediaConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Coupon table. Empty means the builtin coupons.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coupons: Vec<CouponConfig>,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Currency all amounts are priced in.
    pub fn currency(&self) -> Result<Currency> {
        Currency::from_code(&self.pricing.currency)
            .with_context(|| format!("Unknown currency: {}", self.pricing.currency))
    }

    /// Build the pricing policy.
    pub fn pricing_policy(&self) -> Result<PricingPolicy> {
        let currency = self.currency()?;
        let policy = PricingPolicy {
            currency,
            free_shipping_threshold: amount(
                "pricing.free_shipping_threshold",
                self.pricing.free_shipping_threshold,
                currency,
            )?,
            shipping_fee: amount("pricing.shipping_fee", self.pricing.shipping_fee, currency)?,
            tax_rate_percent: self.pricing.tax_rate_percent,
            tax_basis: self.pricing.tax_basis,
        };
        policy.validate().context("Invalid [pricing] section")?;
        Ok(policy)
    }

    /// Build the coupon catalog.
    pub fn coupon_catalog(&self) -> Result<CouponCatalog> {
        let currency = self.currency()?;
        if self.coupons.is_empty() {
            return Ok(CouponCatalog::builtin(currency));
        }

        let coupons = self
            .coupons
            .iter()
            .map(|c| c.to_coupon(currency))
            .collect::<Result<Vec<_>>>()?;
        CouponCatalog::new(currency, coupons).context("Invalid [[coupons]] table")
    }
}

/// Pricing section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// ISO currency code (default: INR).
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Shipping is free once the subtotal exceeds this.
    #[serde(default = "default_free_shipping_threshold")]
    pub free_shipping_threshold: f64,

    /// Flat shipping fee below the threshold.
    #[serde(default = "default_shipping_fee")]
    pub shipping_fee: f64,

    /// Tax rate in percent.
    #[serde(default = "default_tax_rate")]
    pub tax_rate_percent: f64,

    /// What tax is applied to.
    #[serde(default)]
    pub tax_basis: TaxBasis,
}

fn default_currency() -> String {
    "INR".to_string()
}

fn default_free_shipping_threshold() -> f64 {
    500.0
}

fn default_shipping_fee() -> f64 {
    50.0
}

fn default_tax_rate() -> f64 {
    18.0
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            free_shipping_threshold: default_free_shipping_threshold(),
            shipping_fee: default_shipping_fee(),
            tax_rate_percent: default_tax_rate(),
            tax_basis: TaxBasis::default(),
        }
    }
}

/// One coupon row. Amounts are in major units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponConfig {
    pub code: String,
    pub kind: CouponKind,
    /// Percent for percentage coupons, amount for fixed ones.
    pub value: f64,
    #[serde(default)]
    pub minimum_order_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_discount_amount: Option<f64>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_true() -> bool {
    true
}

impl CouponConfig {
    fn to_coupon(&self, currency: Currency) -> Result<Coupon> {
        let minimum = amount("minimum_order_amount", self.minimum_order_amount, currency)?;
        let mut coupon = match self.kind {
            CouponKind::Percentage => Coupon::percentage(&self.code, self.value, minimum),
            CouponKind::Fixed => {
                if self.maximum_discount_amount.is_some() {
                    bail!(
                        "coupon {}: maximum_discount_amount only applies to percentage coupons",
                        self.code
                    );
                }
                Coupon::fixed(&self.code, amount("value", self.value, currency)?, minimum)
            }
        };
        if let Some(cap) = self.maximum_discount_amount {
            coupon = coupon.with_cap(amount("maximum_discount_amount", cap, currency)?);
        }
        if let Some(ref description) = self.description {
            coupon = coupon.with_description(description);
        }
        if !self.active {
            coupon = coupon.deactivated();
        }
        Ok(coupon)
    }
}

/// Convert a major-unit config amount to `Money`.
fn amount(field: &str, value: f64, currency: Currency) -> Result<Money> {
    Money::try_from_decimal(value, currency)
        .with_context(|| format!("{} is out of range: {}", field, value))
}

/// Storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for persisted carts (default: platform data dir).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

/// Media configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Base URL or directory product image paths are joined onto.
    #[serde(default)]
    pub upload_root: String,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,

    /// Default filter directive, overridden by RUST_LOG.
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: default_level(),
        }
    }
}

/// Generate a default bazaar.toml config file.
pub fn generate_default_config() -> String {
    r#"# Bazaar storefront configuration

[pricing]
currency = "INR"
# Shipping is free when the subtotal is strictly above this amount
free_shipping_threshold = 500
shipping_fee = 50
tax_rate_percent = 18
# "subtotal" or "discounted_subtotal"
tax_basis = "subtotal"

[storage]
# dir = ".bazaar/carts"

[media]
upload_root = ""

[logging]
# "human" or "json"
format = "human"
level = "warn"

# Leave the coupon table out to use the builtin coupons.
[[coupons]]
code = "WELCOME10"
kind = "percentage"
value = 10
minimum_order_amount = 500
maximum_discount_amount = 200
description = "10% off your first order"

[[coupons]]
code = "FLAT50"
kind = "fixed"
value = 50
minimum_order_amount = 299
description = "Flat 50 off"

[[coupons]]
code = "SAVE20"
kind = "percentage"
value = 20
minimum_order_amount = 1000
maximum_discount_amount = 500
description = "20% off orders above 1000"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_builtin() {
        let config: CliConfig = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.coupons.len(), 3);
        assert_eq!(config.pricing_policy().unwrap(), PricingPolicy::default());
        assert_eq!(
            config.coupon_catalog().unwrap(),
            CouponCatalog::builtin(Currency::INR)
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: CliConfig = toml::from_str("").unwrap();
        assert_eq!(config.pricing.currency, "INR");
        assert_eq!(config.logging.format, LogFormat::Human);
        assert!(config.storage.dir.is_none());
        assert_eq!(
            config.coupon_catalog().unwrap(),
            CouponCatalog::builtin(Currency::INR)
        );
    }

    #[test]
    fn test_custom_pricing() {
        let config: CliConfig = toml::from_str(
            r#"
[pricing]
currency = "usd"
free_shipping_threshold = 49.99
shipping_fee = 4.5
tax_rate_percent = 5
tax_basis = "discounted_subtotal"
"#,
        )
        .unwrap();

        let policy = config.pricing_policy().unwrap();
        assert_eq!(policy.currency, Currency::USD);
        assert_eq!(policy.free_shipping_threshold.amount_cents, 4999);
        assert_eq!(policy.shipping_fee.amount_cents, 450);
        assert_eq!(policy.tax_basis, TaxBasis::DiscountedSubtotal);
    }

    #[test]
    fn test_unknown_currency_rejected() {
        let config: CliConfig = toml::from_str("[pricing]\ncurrency = \"XYZ\"").unwrap();
        assert!(config.pricing_policy().is_err());
    }

    #[test]
    fn test_duplicate_coupons_rejected() {
        let config: CliConfig = toml::from_str(
            r#"
[[coupons]]
code = "SAVE"
kind = "fixed"
value = 10

[[coupons]]
code = "save"
kind = "fixed"
value = 20
"#,
        )
        .unwrap();
        assert!(config.coupon_catalog().is_err());
    }

    #[test]
    fn test_cap_on_fixed_coupon_rejected() {
        let config: CliConfig = toml::from_str(
            r#"
[[coupons]]
code = "FLAT"
kind = "fixed"
value = 10
maximum_discount_amount = 5
"#,
        )
        .unwrap();
        assert!(config.coupon_catalog().is_err());
    }

    #[test]
    fn test_out_of_range_amounts_rejected() {
        let config: CliConfig =
            toml::from_str("[pricing]\nshipping_fee = 1e20").unwrap();
        assert!(config.pricing_policy().is_err());

        let config: CliConfig = toml::from_str(
            r#"
[[coupons]]
code = "HUGE"
kind = "fixed"
value = 1e20
"#,
        )
        .unwrap();
        assert!(config.coupon_catalog().is_err());
    }

    #[test]
    fn test_inactive_coupon_loaded() {
        let config: CliConfig = toml::from_str(
            r#"
[[coupons]]
code = "OLD"
kind = "percentage"
value = 5
active = false
"#,
        )
        .unwrap();
        let catalog = config.coupon_catalog().unwrap();
        assert!(!catalog.get("old").unwrap().active);
    }
}
