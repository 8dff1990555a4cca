//! Tracked-shop catalog: domain normalization and the YAML seed file.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Canonical dedup key for a storefront: lowercase host without scheme,
/// `www.` prefix, port, path, query, or trailing dot.
///
/// `"https://www.Example-Shop.com/collections/all"` → `"example-shop.com"`.
#[must_use]
pub fn normalize_domain(raw: &str) -> String {
    let lower = raw.trim().to_ascii_lowercase();
    let no_scheme = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .unwrap_or(&lower);
    let no_www = no_scheme.strip_prefix("www.").unwrap_or(no_scheme);
    let host = no_www
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(no_www)
        .split(':')
        .next()
        .unwrap_or(no_www);
    host.trim_end_matches('.').to_owned()
}

/// One catalog entry. Descriptive fields are back-fill-only once stored:
/// seeding never overwrites a non-empty database value with an empty one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopConfig {
    pub name: String,
    pub url: String,
    pub category: Option<String>,
    pub monthly_visits: Option<f64>,
    /// Free text as reported by the trends dashboard, e.g. `"$50k-$100k"`.
    pub monthly_revenue: Option<String>,
    pub product_count: Option<i32>,
    pub year_founded: Option<i32>,
    pub project_tag: Option<String>,
}

impl ShopConfig {
    #[must_use]
    pub fn domain(&self) -> String {
        normalize_domain(&self.url)
    }
}

#[derive(Debug, Deserialize)]
pub struct ShopsFile {
    pub shops: Vec<ShopConfig>,
}

/// Load and validate the shop catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails
/// validation.
pub fn load_shops(path: &Path) -> Result<ShopsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ShopsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let shops_file: ShopsFile = serde_yaml::from_str(&content)?;

    validate_shops(&shops_file)?;

    Ok(shops_file)
}

fn validate_shops(shops_file: &ShopsFile) -> Result<(), ConfigError> {
    let mut seen_domains = HashSet::new();

    for shop in &shops_file.shops {
        if shop.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "shop name must be non-empty".to_owned(),
            ));
        }

        let domain = shop.domain();
        if domain.is_empty() {
            return Err(ConfigError::Validation(format!(
                "shop '{}' has an unusable url: '{}'",
                shop.name, shop.url
            )));
        }

        if !seen_domains.insert(domain.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate shop domain: '{domain}' (from shop '{}')",
                shop.name
            )));
        }

        if let Some(year) = shop.year_founded {
            if !(1900..=2100).contains(&year) {
                return Err(ConfigError::Validation(format!(
                    "shop '{}' has implausible year_founded {year}",
                    shop.name
                )));
            }
        }
    }

    Ok(())
}
