//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Upload configuration.
    #[serde(default)]
    pub uploads: UploadConfig,
    /// Zakat configuration.
    #[serde(default)]
    pub zakat: ZakatConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
    /// Refresh token expiration in seconds.
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    900 // 15 minutes
}

fn default_refresh_token_expiry() -> u64 {
    604_800 // 7 days
}

/// File upload configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Root directory for stored files.
    #[serde(default = "default_upload_root")]
    pub root: String,
    /// Maximum upload size in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_size_bytes: u64,
}

fn default_upload_root() -> String {
    "./uploads".to_string()
}

fn default_max_upload_bytes() -> u64 {
    16 * 1024 * 1024 // 16 MiB
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            root: default_upload_root(),
            max_size_bytes: default_max_upload_bytes(),
        }
    }
}

/// Zakat configuration.
///
/// The nisab threshold tracks the price of 85 g of gold and changes over
/// time, so it is configuration rather than a hardcoded constant.
#[derive(Debug, Clone, Deserialize)]
pub struct ZakatConfig {
    /// Nisab threshold in SAR.
    #[serde(default = "default_nisab_threshold")]
    pub nisab_threshold: Decimal,
}

fn default_nisab_threshold() -> Decimal {
    // 85 g gold at 595.05 SAR/g
    Decimal::new(50_579_25, 2)
}

impl Default for ZakatConfig {
    fn default() -> Self {
        Self {
            nisab_threshold: default_nisab_threshold(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("MUHASIB").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_nisab_matches_85g_gold() {
        assert_eq!(ZakatConfig::default().nisab_threshold, dec!(50579.25));
    }

    #[test]
    fn test_default_upload_limit_is_16_mib() {
        assert_eq!(UploadConfig::default().max_size_bytes, 16 * 1024 * 1024);
    }
}
