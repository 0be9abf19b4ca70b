//! Persisted cart commands.

use anyhow::{anyhow, Context as _, Result};
use bazaar_cache::{FileStore, SessionId};
use bazaar_commerce::cart::{CartSession, LineItem};
use bazaar_commerce::catalog::{media_url, NumberOrString, Product, ProductRecord};
use bazaar_commerce::ids::{LineItemId, ProductId};
use dialoguer::Confirm;

use super::{CartArgs, CartCommand};
use crate::context::Context;

/// Run the cart command.
pub fn run(args: CartArgs, ctx: &Context) -> Result<()> {
    let command = args.command.unwrap_or(CartCommand::Show);

    if let CartCommand::New = command {
        let session_id = SessionId::generate();
        if ctx.output.is_json() {
            ctx.output.json(&serde_json::json!({ "session": session_id.as_str() }));
        } else {
            println!("{}", session_id);
        }
        return Ok(());
    }

    let session_id = SessionId::parse(&args.session)?;
    ctx.output.debug(&format!(
        "Cart store: {}",
        ctx.carts_dir().display()
    ));
    let mut session = CartSession::open(ctx.cart_cache()?, session_id, ctx.currency()?)
        .context("Failed to open cart")?;

    match command {
        CartCommand::Show | CartCommand::New => {}
        CartCommand::Add {
            product_id,
            name,
            price,
            quantity,
            discount,
            image,
        } => {
            let record = ProductRecord {
                id: product_id,
                name,
                price: NumberOrString::Text(price),
                discount: discount.map(NumberOrString::Text),
                images: image.map(|i| vec![i]),
                stock: None,
            };
            let product = Product::from_record(record, session.cart().currency)?;
            let quantity = NumberOrString::Text(quantity).to_f64("quantity")?;
            if quantity.fract() != 0.0 {
                return Err(anyhow!("Quantity must be a whole number"));
            }
            let item = LineItem::for_product(&product, quantity as i64)?;
            session.add(item)?;

            ctx.output.success(&format!("Added {} x{}", product.name, quantity));
            if let Some(path) = product.primary_image() {
                ctx.output
                    .kv("image", &media_url(&ctx.config.media.upload_root, path));
            }
        }
        CartCommand::Set { line, quantity } => {
            let id = find_line(&session, &line)?;
            session.update_quantity(&id, quantity)?;
            if quantity > 0 {
                ctx.output.success(&format!("Set {} to {}", line, quantity));
            } else {
                ctx.output.success(&format!("Removed {}", line));
            }
        }
        CartCommand::Remove { line } => {
            let id = find_line(&session, &line)?;
            session.remove(&id)?;
            ctx.output.success(&format!("Removed {}", line));
        }
        CartCommand::Coupon { code } => {
            let catalog = ctx.coupon_catalog()?;
            let applied = session.apply_coupon(&code, &catalog)?;
            ctx.output.success(&format!(
                "Applied {} ({} off)",
                applied.code,
                applied.amount.display()
            ));
        }
        CartCommand::Uncoupon => {
            if session.remove_coupon()? {
                ctx.output.success("Coupon removed");
            } else {
                ctx.output.info("No coupon to remove");
            }
        }
        CartCommand::Clear { yes } => {
            if session.cart().is_empty() {
                ctx.output.info("Cart is already empty");
                return Ok(());
            }
            if !yes && !ctx.output.is_json() {
                let confirmed = Confirm::new()
                    .with_prompt(format!(
                        "Remove all {} item(s) from the cart?",
                        session.cart().item_count()
                    ))
                    .default(false)
                    .interact()?;
                if !confirmed {
                    ctx.output.info("Clear cancelled");
                    return Ok(());
                }
            }
            session.clear()?;
            ctx.output.success("Cart cleared");
        }
    }

    show(&session, ctx)
}

fn show(session: &CartSession<FileStore>, ctx: &Context) -> Result<()> {
    let catalog = ctx.coupon_catalog()?;
    let policy = ctx.pricing_policy()?;
    let cart = session.cart();
    let totals = session.totals(&catalog, &policy)?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "session": session.session_id().as_str(),
            "cart": cart,
            "totals": totals,
        }));
        return Ok(());
    }

    ctx.output.header(&format!("Cart {}", session.session_id()));
    if let Some(updated) = chrono::DateTime::from_timestamp(cart.updated_at, 0) {
        ctx.output
            .kv("updated", &updated.format("%Y-%m-%d %H:%M:%S UTC").to_string());
    }

    if cart.is_empty() {
        ctx.output.info("Cart is empty");
        return Ok(());
    }

    let widths = [24, 20, 5, 12];
    ctx.output.table_row(&["LINE", "PRODUCT", "QTY", "PRICE"], &widths);
    for item in &cart.items {
        ctx.output.table_row(
            &[
                item.id.as_str(),
                &item.product_name,
                &item.quantity.to_string(),
                &item.unit_price.display(),
            ],
            &widths,
        );
    }

    if let Some(ref code) = cart.coupon_code {
        match catalog.evaluate(code, &totals.subtotal) {
            Ok(_) => ctx.output.kv("coupon", code),
            Err(reason) => ctx.output.warn(&format!("Coupon {} not applied: {}", code, reason)),
        }
    }

    println!();
    ctx.output.totals(&totals);
    Ok(())
}

/// Resolve a line by line id, falling back to product id.
fn find_line(session: &CartSession<FileStore>, line: &str) -> Result<LineItemId> {
    let cart = session.cart();
    let id = LineItemId::new(line);
    if cart.get_item(&id).is_some() {
        return Ok(id);
    }
    cart.get_item_by_product(&ProductId::new(line))
        .map(|item| item.id.clone())
        .ok_or_else(|| anyhow!("No line or product {} in the cart", line))
}
