//! Coupon lookup commands.

use anyhow::{bail, Context as _, Result};
use bazaar_commerce::cart::{CouponRejection, CouponValue};
use bazaar_commerce::Money;

use super::CouponArgs;
use crate::context::Context;
use crate::output::status_badge;

/// Run the coupon command.
pub fn run(args: CouponArgs, ctx: &Context) -> Result<()> {
    if !args.subtotal.is_finite() || args.subtotal < 0.0 {
        bail!("Subtotal must be a non-negative number");
    }

    let catalog = ctx.coupon_catalog()?;
    let subtotal = Money::try_from_decimal(args.subtotal, catalog.currency())
        .context("Subtotal is out of range")?;

    match catalog.evaluate(&args.code, &subtotal) {
        Ok(applied) => {
            if ctx.output.is_json() {
                ctx.output.json(&serde_json::json!({
                    "code": applied.code,
                    "subtotal": subtotal,
                    "discount": applied.amount,
                    "applied": true,
                }));
                return Ok(());
            }
            ctx.output.success(&format!(
                "{} takes {} off {}",
                applied.code,
                applied.amount.display(),
                subtotal.display()
            ));
        }
        Err(rejection) => {
            if ctx.output.is_json() {
                ctx.output.json(&serde_json::json!({
                    "code": args.code,
                    "subtotal": subtotal,
                    "discount": Money::zero(subtotal.currency),
                    "applied": false,
                    "reason": rejection.to_string(),
                }));
                return Ok(());
            }
            ctx.output.warn(&rejection.to_string());
            if let CouponRejection::BelowMinimum { minimum, .. } = rejection {
                ctx.output.info(&format!(
                    "Add {} more to qualify",
                    Money::new(minimum.amount_cents - subtotal.amount_cents, minimum.currency)
                        .display()
                ));
            }
        }
    }

    Ok(())
}

/// Run the coupons command.
pub fn list(ctx: &Context) -> Result<()> {
    let catalog = ctx.coupon_catalog()?;

    if ctx.output.is_json() {
        let coupons: Vec<_> = catalog.iter().collect();
        ctx.output.json(&coupons);
        return Ok(());
    }

    ctx.output.header("Coupons");

    let widths = [12, 10, 12, 12, 10];
    ctx.output
        .table_row(&["CODE", "VALUE", "MIN ORDER", "MAX OFF", "STATUS"], &widths);
    for coupon in catalog.iter() {
        let value = match &coupon.value {
            CouponValue::Percentage(p) => format!("{}%", p),
            CouponValue::Fixed(amount) => amount.display(),
        };
        let cap = coupon
            .maximum_discount_amount
            .map(|m| m.display())
            .unwrap_or_else(|| "-".to_string());
        ctx.output.table_row(
            &[
                &coupon.code,
                &value,
                &coupon.minimum_order_amount.display(),
                &cap,
                &status_badge(coupon.active),
            ],
            &widths,
        );
    }

    Ok(())
}
