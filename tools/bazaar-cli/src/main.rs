//! Bazaar CLI - Command line tool for pricing storefront carts.
//!
//! Commands:
//! - `bazaar totals` - Price a cart file
//! - `bazaar coupon` - Check a coupon code against a subtotal
//! - `bazaar coupons` - List the coupon catalog
//! - `bazaar cart` - Manage a persisted cart
//! - `bazaar config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::{CartArgs, ConfigArgs, CouponArgs, TotalsArgs};
use config::{LogFormat, LoggingConfig};

/// Bazaar CLI - Price carts and manage coupons
#[derive(Parser)]
#[command(name = "bazaar")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute totals for a cart file
    Totals(TotalsArgs),

    /// Check a coupon code against a subtotal
    Coupon(CouponArgs),

    /// List available coupons
    Coupons,

    /// Manage a persisted cart
    Cart(CartArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

fn init_tracing(verbose: bool, json: bool, logging: &LoggingConfig) {
    let default_level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    if json || logging.format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let config_path = cli.config.as_deref();
    let ctx = match context::Context::load(config_path, output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    init_tracing(cli.verbose, cli.json, &ctx.config.logging);
    if let Some(ref path) = ctx.config_path {
        tracing::debug!(path = %path.display(), "loaded config");
    }

    // Execute command
    let result = match cli.command {
        Commands::Totals(args) => commands::totals::run(args, &ctx),
        Commands::Coupon(args) => commands::coupon::run(args, &ctx),
        Commands::Coupons => commands::coupon::list(&ctx),
        Commands::Cart(args) => commands::cart::run(args, &ctx),
        Commands::Config(args) => commands::config::run(args, &ctx),
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
