//! Price a cart file.

use std::fs;

use anyhow::{Context as _, Result};
use bazaar_commerce::cart::{Cart, CartTotals};
use bazaar_commerce::catalog::CartLineRecord;

use super::TotalsArgs;
use crate::context::Context;

/// A cart file after pricing.
struct PricedCart {
    cart: Cart,
    totals: CartTotals,
    coupon_rejection: Option<String>,
}

/// Run the totals command.
pub fn run(args: TotalsArgs, ctx: &Context) -> Result<()> {
    let policy = ctx.pricing_policy()?;
    let priced = price_file(&args, ctx)?;
    let totals = &priced.totals;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "coupon": priced.cart.coupon_code,
            "coupon_rejection": priced.coupon_rejection,
            "totals": totals,
        }));
        return Ok(());
    }

    ctx.output.header("Cart totals");
    ctx.output.totals(totals);

    if let Some(remaining) = policy.remaining_for_free_shipping(&totals.subtotal) {
        if !priced.cart.is_empty() {
            ctx.output
                .info(&format!("Add {} more for free shipping", remaining.display()));
        }
    }

    Ok(())
}

fn price_file(args: &TotalsArgs, ctx: &Context) -> Result<PricedCart> {
    let currency = ctx.currency()?;
    let policy = ctx.pricing_policy()?;
    let catalog = ctx.coupon_catalog()?;

    let path = ctx.resolve_path(&args.file);
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read cart file: {}", path.display()))?;
    let records: Vec<CartLineRecord> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse cart file: {}", path.display()))?;

    let mut cart = Cart::new("cli", currency);
    for (i, record) in records.into_iter().enumerate() {
        let item = record
            .into_line_item(currency)
            .with_context(|| format!("Invalid cart line {}", i))?;
        ctx.output
            .debug(&format!("{} x{} @ {}", item.product_name, item.quantity, item.unit_price));
        cart.add_item(item)
            .with_context(|| format!("Invalid cart line {}", i))?;
    }

    let mut coupon_rejection = None;
    if let Some(ref code) = args.coupon {
        match cart.apply_coupon(code, &catalog) {
            Ok(applied) => ctx.output.debug(&format!(
                "Coupon {} grants {}",
                applied.code, applied.amount
            )),
            Err(reason) => {
                ctx.output.warn(&format!("Coupon not applied: {}", reason));
                coupon_rejection = Some(reason.to_string());
            }
        }
    }

    let totals = cart.totals(&catalog, &policy)?;
    Ok(PricedCart {
        cart,
        totals,
        coupon_rejection,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CliConfig;
    use crate::output::Output;
    use bazaar_commerce::{Currency, Money};

    fn context(dir: &tempfile::TempDir) -> Context {
        Context {
            config: CliConfig::default(),
            config_path: None,
            output: Output::new(false, false),
            cwd: dir.path().to_path_buf(),
        }
    }

    fn record(id: &str, price: &str, quantity: &str) -> String {
        format!(
            r#"{{"product": {{"_id": "{}", "name": "Kurta", "price": "{}", "images": null}}, "quantity": "{}"}}"#,
            id, price, quantity
        )
    }

    fn write_cart(dir: &tempfile::TempDir, records: &[String]) -> String {
        let name = "cart.json";
        std::fs::write(dir.path().join(name), format!("[{}]", records.join(","))).unwrap();
        name.to_string()
    }

    fn args(file: String, coupon: Option<&str>) -> TotalsArgs {
        TotalsArgs {
            file,
            coupon: coupon.map(str::to_string),
        }
    }

    fn inr(units: i64) -> Money {
        Money::major(units, Currency::INR)
    }

    #[test]
    fn test_same_product_at_two_prices() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_cart(&dir, &[record("p1", "300", "1"), record("p1", "400", "1")]);

        let priced = price_file(&args(file, None), &context(&dir)).unwrap();
        assert_eq!(priced.cart.items.len(), 2);
        assert_eq!(priced.totals.subtotal, inr(700));
        assert_eq!(priced.totals.subtotal.amount_cents, 70_000);
        assert!(priced.totals.shipping.is_zero());
    }

    #[test]
    fn test_repeated_line_merges() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_cart(&dir, &[record("p1", "300", "1"), record("p1", "300", "1")]);

        let priced = price_file(&args(file, None), &context(&dir)).unwrap();
        assert_eq!(priced.cart.items.len(), 1);
        assert_eq!(priced.totals.item_count, 2);
    }

    #[test]
    fn test_coupon_applied() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_cart(&dir, &[record("p1", "300", "2")]);

        let priced = price_file(&args(file, Some("welcome10")), &context(&dir)).unwrap();
        assert_eq!(priced.cart.coupon_code.as_deref(), Some("WELCOME10"));
        assert!(priced.coupon_rejection.is_none());
        assert_eq!(priced.totals.discount, inr(60));
        assert_eq!(priced.totals.total, inr(648));
    }

    #[test]
    fn test_coupon_rejected_prices_without_discount() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_cart(&dir, &[record("p1", "100", "1")]);

        let priced = price_file(&args(file, Some("FLAT50")), &context(&dir)).unwrap();
        assert!(priced.cart.coupon_code.is_none());
        assert!(priced.coupon_rejection.is_some());
        assert!(priced.totals.discount.is_zero());
        assert_eq!(priced.totals.total, inr(168));
    }

    #[test]
    fn test_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(price_file(&args("missing.json".to_string(), None), &context(&dir)).is_err());

        std::fs::write(dir.path().join("bad.json"), "{not json").unwrap();
        assert!(price_file(&args("bad.json".to_string(), None), &context(&dir)).is_err());
    }
}
