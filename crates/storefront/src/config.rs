//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `SHOPIFY_STORE` - Shopify store domain (e.g., your-store.myshopify.com)
//! - `SHOPIFY_STOREFRONT_PRIVATE_TOKEN` - Storefront API private access token
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `SHOPIFY_API_VERSION` - API version (default: 2026-01)
//! - `SHOPIFY_STOREFRONT_ENDPOINT` - Full GraphQL endpoint URL, overrides store + version
//! - `STOREFRONT_PRODUCTS_PER_PAGE` - Home grid page size (default: 12)
//! - `STOREFRONT_COLLECTION_LIMIT` - Products shown on a collection page (default: 20)
//! - `CHECKOUT_TIMEOUT_SECS` - Upper bound for the checkout handoff (default: 15)
//! - `CART_IDLE_TIMEOUT_MINUTES` - Idle time before a session cart is dropped (default: 120)
//! - `BRAND_NAME`, `BRAND_TAGLINE` - Header/footer copy
//! - `BRAND_HEADER_FONT`, `BRAND_BODY_FONT` - Google Fonts families
//! - `BRAND_PRIMARY_COLOR`, `BRAND_SECONDARY_COLOR` - Theme colors (any CSS color)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate (default: 0.0)

use std::collections::HashMap;
use std::fmt::Display;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Shopify Storefront API configuration
    pub shopify: ShopifyStorefrontConfig,
    /// Catalog page sizes
    pub catalog: CatalogConfig,
    /// Session cart and checkout limits
    pub cart: CartConfig,
    /// Store name, copy and theme
    pub brand: BrandConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "production")
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Shopify Storefront API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct ShopifyStorefrontConfig {
    /// Shopify store domain (e.g., your-store.myshopify.com)
    pub store: String,
    /// Shopify API version (e.g., 2026-01)
    pub api_version: String,
    /// Storefront API private access token (server-side only)
    pub storefront_private_token: SecretString,
    /// Full GraphQL endpoint, replacing the one derived from store + version
    pub endpoint_override: Option<String>,
}

impl std::fmt::Debug for ShopifyStorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyStorefrontConfig")
            .field("store", &self.store)
            .field("api_version", &self.api_version)
            .field("storefront_private_token", &"[REDACTED]")
            .field("endpoint_override", &self.endpoint_override)
            .finish()
    }
}

impl ShopifyStorefrontConfig {
    /// GraphQL endpoint for the Storefront API.
    #[must_use]
    pub fn endpoint(&self) -> String {
        self.endpoint_override.clone().unwrap_or_else(|| {
            format!(
                "https://{}/api/{}/graphql.json",
                self.store, self.api_version
            )
        })
    }
}

/// Catalog page sizes.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Products per page on the home grid
    pub products_per_page: i64,
    /// Products shown on a collection page
    pub collection_limit: i64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            products_per_page: 12,
            collection_limit: 20,
        }
    }
}

/// Session cart and checkout limits.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Upper bound for the create-cart + add-lines sequence
    pub checkout_timeout: Duration,
    /// Idle time after which a session cart is discarded
    pub idle_timeout: Duration,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            checkout_timeout: Duration::from_secs(15),
            idle_timeout: Duration::from_secs(120 * 60),
        }
    }
}

/// Store name, copy and theme.
#[derive(Debug, Clone)]
pub struct BrandConfig {
    pub name: String,
    pub tagline: String,
    pub header_font: String,
    pub body_font: String,
    pub primary_color: String,
    pub secondary_color: String,
}

impl Default for BrandConfig {
    fn default() -> Self {
        Self {
            name: "Store".to_string(),
            tagline: "Your premium shopping destination".to_string(),
            header_font: "Space Grotesk".to_string(),
            body_font: "Inter".to_string(),
            primary_color: "#000000".to_string(),
            secondary_color: "#f3f4f6".to_string(),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_parsed_or_default::<IpAddr>("STOREFRONT_HOST", "127.0.0.1")?;
        let port = get_parsed_or_default::<u16>("STOREFRONT_PORT", "3000")?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        validate_base_url(&base_url, "STOREFRONT_BASE_URL")?;

        let shopify = ShopifyStorefrontConfig::from_env()?;
        let catalog = CatalogConfig::from_env()?;
        let cart = CartConfig::from_env()?;
        let brand = BrandConfig::from_env();

        Ok(Self {
            host,
            port,
            base_url,
            shopify,
            catalog,
            cart,
            brand,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_parsed_or_default("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: get_parsed_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl ShopifyStorefrontConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let endpoint_override = get_optional_env("SHOPIFY_STOREFRONT_ENDPOINT");
        if let Some(endpoint) = &endpoint_override {
            validate_base_url(endpoint, "SHOPIFY_STOREFRONT_ENDPOINT")?;
        }

        Ok(Self {
            store: get_required_env("SHOPIFY_STORE")?,
            api_version: get_env_or_default("SHOPIFY_API_VERSION", "2026-01"),
            storefront_private_token: get_validated_secret("SHOPIFY_STOREFRONT_PRIVATE_TOKEN")?,
            endpoint_override,
        })
    }
}

impl CatalogConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            products_per_page: get_positive("STOREFRONT_PRODUCTS_PER_PAGE", 12)?,
            collection_limit: get_positive("STOREFRONT_COLLECTION_LIMIT", 20)?,
        })
    }
}

impl CartConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let timeout_secs = get_positive("CHECKOUT_TIMEOUT_SECS", 15)?;
        let idle_minutes = get_positive("CART_IDLE_TIMEOUT_MINUTES", 120)?;
        Ok(Self {
            checkout_timeout: Duration::from_secs(timeout_secs.unsigned_abs()),
            idle_timeout: Duration::from_secs(idle_minutes.unsigned_abs() * 60),
        })
    }
}

impl BrandConfig {
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            name: get_optional_env("BRAND_NAME").unwrap_or(defaults.name),
            tagline: get_optional_env("BRAND_TAGLINE").unwrap_or(defaults.tagline),
            header_font: get_optional_env("BRAND_HEADER_FONT").unwrap_or(defaults.header_font),
            body_font: get_optional_env("BRAND_BODY_FONT").unwrap_or(defaults.body_font),
            primary_color: get_optional_env("BRAND_PRIMARY_COLOR")
                .unwrap_or(defaults.primary_color),
            secondary_color: get_optional_env("BRAND_SECONDARY_COLOR")
                .unwrap_or(defaults.secondary_color),
        }
    }

    /// Google Fonts stylesheet URL for the header and body families.
    #[must_use]
    pub fn fonts_url(&self) -> String {
        format!(
            "https://fonts.googleapis.com/css2?family={}:wght@400;500;600;700;800&family={}:wght@300;400;500;600;700&display=swap",
            self.header_font.replace(' ', "+"),
            self.body_font.replace(' ', "+"),
        )
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn get_parsed_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a strictly positive integer environment variable.
fn get_positive(key: &str, default: i64) -> Result<i64, ConfigError> {
    let value = get_parsed_or_default::<i64>(key, &default.to_string())?;
    if value <= 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be greater than zero (got {value})"),
        ));
    }
    Ok(value)
}

/// Validate that a URL is absolute http(s) with a host.
fn validate_base_url(value: &str, var_name: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Real API tokens are random hex/base64, so low entropy means a hand-typed value
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the token issued by Shopify."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
