//! CLI command implementations.

pub mod cart;
pub mod config;
pub mod coupon;
pub mod totals;

use clap::{Args, Subcommand};

/// Arguments for the totals command.
#[derive(Args)]
pub struct TotalsArgs {
    /// JSON file with an array of cart lines as the API returns them.
    pub file: String,

    /// Coupon code to apply.
    #[arg(long)]
    pub coupon: Option<String>,
}

/// Arguments for the coupon command.
#[derive(Args)]
pub struct CouponArgs {
    /// Coupon code.
    pub code: String,

    /// Cart subtotal in major units.
    #[arg(short, long)]
    pub subtotal: f64,
}

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: Option<CartCommand>,

    /// Session the cart belongs to.
    #[arg(short, long, default_value = "default")]
    pub session: String,
}

#[derive(Subcommand)]
pub enum CartCommand {
    /// Show the cart and its totals.
    Show,
    /// Print a fresh session id.
    New,
    /// Add a product to the cart.
    Add {
        /// Product id.
        product_id: String,

        /// Product name.
        #[arg(short, long)]
        name: String,

        /// Unit price in major units.
        #[arg(short, long)]
        price: String,

        /// Quantity to add.
        #[arg(short, long, default_value = "1")]
        quantity: String,

        /// Sale percent off this product.
        #[arg(short, long)]
        discount: Option<String>,

        /// Product image path.
        #[arg(long)]
        image: Option<String>,
    },
    /// Set a line's quantity; 0 removes it.
    Set {
        /// Line id or product id.
        line: String,
        /// New quantity.
        quantity: i64,
    },
    /// Remove a line.
    Remove {
        /// Line id or product id.
        line: String,
    },
    /// Apply a coupon code.
    Coupon {
        /// Coupon code.
        code: String,
    },
    /// Remove the coupon.
    Uncoupon,
    /// Empty the cart.
    Clear {
        /// Skip confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}
