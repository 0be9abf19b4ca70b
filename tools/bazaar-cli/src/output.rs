//! Output formatting for the CLI.

use bazaar_commerce::cart::CartTotals;
use bazaar_commerce::Money;
use console::style;

/// Output handler for CLI messages.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    /// Create a new output handler.
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    /// Print an info message.
    pub fn info(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("ℹ").blue(), msg);
    }

    /// Print a success message.
    pub fn success(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("✓").green(), msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: &str) {
        if self.json {
            return;
        }
        eprintln!("{} {}", style("⚠").yellow(), msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(msg).red());
    }

    /// Print a debug message (only in verbose mode).
    pub fn debug(&self, msg: &str) {
        if !self.verbose || self.json {
            return;
        }
        eprintln!("{} {}", style("→").dim(), style(msg).dim());
    }

    /// Print a header/title.
    pub fn header(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print JSON output.
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    /// Print a key-value pair.
    pub fn kv(&self, key: &str, value: &str) {
        if self.json {
            return;
        }
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(&self, item: &str) {
        if self.json {
            return;
        }
        println!("  {} {}", style("•").dim(), item);
    }

    /// Print a table row.
    pub fn table_row(&self, cols: &[&str], widths: &[usize]) {
        if self.json {
            return;
        }
        let formatted: Vec<String> = cols
            .iter()
            .zip(widths.iter())
            .map(|(col, width)| format!("{:width$}", col, width = width))
            .collect();
        println!("  {}", formatted.join("  "));
    }

    /// Print a totals breakdown, or the totals as JSON.
    pub fn totals(&self, totals: &CartTotals) {
        if self.json {
            self.json(totals);
            return;
        }

        let widths = [10, 14];
        self.table_row(&["Subtotal", &totals.subtotal.display()], &widths);
        if totals.has_discount() {
            self.table_row(&["Discount", &format!("-{}", totals.discount.display())], &widths);
        }
        self.table_row(&["Tax", &totals.tax.display()], &widths);
        self.table_row(&["Shipping", &shipping_label(&totals.shipping)], &widths);
        println!(
            "  {:10}  {}",
            style("Total").bold(),
            style(totals.total.display()).bold()
        );
        self.kv("items", &totals.item_count.to_string());
    }

    /// Check if JSON mode is enabled.
    pub fn is_json(&self) -> bool {
        self.json
    }
}

fn shipping_label(shipping: &Money) -> String {
    if shipping.is_zero() {
        style("FREE").green().to_string()
    } else {
        shipping.display()
    }
}

/// Badge for a coupon's active flag.
pub fn status_badge(active: bool) -> String {
    if active {
        style("active").green().to_string()
    } else {
        style("inactive").dim().to_string()
    }
}
