//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};
use bazaar_commerce::cart::CouponValue;

use super::{ConfigArgs, ConfigCommand};
use crate::config::generate_default_config;
use crate::context::{Context, CONFIG_NAMES};

/// Run the config command.
pub fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match ctx.config_path {
        Some(ref path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }

    let pricing = &ctx.config.pricing;
    ctx.output.info("");
    ctx.output.info("[pricing]");
    ctx.output.kv("currency", &pricing.currency);
    ctx.output.kv(
        "free_shipping_threshold",
        &pricing.free_shipping_threshold.to_string(),
    );
    ctx.output.kv("shipping_fee", &pricing.shipping_fee.to_string());
    ctx.output
        .kv("tax_rate_percent", &pricing.tax_rate_percent.to_string());
    ctx.output.kv("tax_basis", pricing.tax_basis.as_str());

    ctx.output.info("");
    ctx.output.info("[storage]");
    ctx.output.kv("dir", &ctx.carts_dir().display().to_string());

    ctx.output.info("");
    ctx.output.info("[media]");
    ctx.output.kv("upload_root", &ctx.config.media.upload_root);

    ctx.output.info("");
    ctx.output.info("[logging]");
    ctx.output
        .kv("format", &format!("{:?}", ctx.config.logging.format).to_lowercase());
    ctx.output.kv("level", &ctx.config.logging.level);

    ctx.output.info("");
    if ctx.config.coupons.is_empty() {
        ctx.output.info("Coupons: builtin");
    } else {
        ctx.output.info("Coupons:");
        for coupon in &ctx.config.coupons {
            ctx.output.list_item(&coupon.code);
        }
    }

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join(CONFIG_NAMES[0]);

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config())?;

    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    if ctx.config_path.is_none() {
        warnings.push("no config file found, using defaults".to_string());
    }

    match ctx.pricing_policy() {
        Ok(policy) => {
            if policy.shipping_fee.is_zero() {
                warnings.push("pricing.shipping_fee is 0, every order ships free".to_string());
            }
            if policy.tax_rate_percent == 0.0 {
                warnings.push("pricing.tax_rate_percent is 0".to_string());
            }
        }
        Err(e) => errors.push(format!("{:#}", e)),
    }

    match ctx.coupon_catalog() {
        Ok(catalog) => {
            for coupon in catalog.iter() {
                if let CouponValue::Fixed(amount) = coupon.value {
                    if amount.amount_cents > coupon.minimum_order_amount.amount_cents {
                        warnings.push(format!(
                            "coupon {} can take more off than its minimum order",
                            coupon.code
                        ));
                    }
                }
            }
        }
        Err(e) => errors.push(format!("{:#}", e)),
    }

    if !matches!(
        ctx.config.logging.level.to_lowercase().as_str(),
        "error" | "warn" | "info" | "debug" | "trace" | "off"
    ) {
        warnings.push(format!(
            "logging.level '{}' is treated as a filter directive",
            ctx.config.logging.level
        ));
    }

    // Print results
    if errors.is_empty() && warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for error in &errors {
        ctx.output.error(&format!("Error: {}", error));
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }

    ctx.output.success("Configuration is valid (with warnings)");

    Ok(())
}
