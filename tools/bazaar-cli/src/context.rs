//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use bazaar_cache::{Cache, FileStore};
use bazaar_commerce::cart::{CouponCatalog, PricingPolicy};
use bazaar_commerce::Currency;

use crate::config::CliConfig;
use crate::output::Output;

/// Config file names, in lookup order.
pub const CONFIG_NAMES: [&str; 3] = ["bazaar.toml", ".bazaar.toml", "bazaar.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Where the config was loaded from, if anywhere.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = if let Some(path) = config_path {
            (CliConfig::load(path)?, Some(PathBuf::from(path)))
        } else {
            // Try to find config in current directory or parent directories
            match find_config(&cwd) {
                Some(path) => {
                    let config = CliConfig::load(&path.to_string_lossy())?;
                    (config, Some(path))
                }
                None => (CliConfig::default(), None),
            }
        };

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    pub fn currency(&self) -> Result<Currency> {
        self.config.currency()
    }

    pub fn pricing_policy(&self) -> Result<PricingPolicy> {
        self.config.pricing_policy()
    }

    pub fn coupon_catalog(&self) -> Result<CouponCatalog> {
        self.config.coupon_catalog()
    }

    /// Directory persisted carts live in.
    pub fn carts_dir(&self) -> PathBuf {
        match self.config.storage.dir {
            Some(ref dir) => self.resolve_path(dir),
            None => dirs_path().join("bazaar").join("carts"),
        }
    }

    /// Open the cart store.
    pub fn cart_cache(&self) -> Result<Cache<FileStore>> {
        let dir = self.carts_dir();
        let store = FileStore::open(&dir)
            .with_context(|| format!("Failed to open cart store at {}", dir.display()))?;
        Ok(Cache::new(store))
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }
}

/// Find a config file in the directory tree.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for name in &CONFIG_NAMES {
            let config_path = current.join(name);
            if config_path.is_file() {
                return Some(config_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Get the platform-specific data directory.
fn dirs_path() -> PathBuf {
    if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local").join("share")
    } else {
        std::env::temp_dir()
    }
}
