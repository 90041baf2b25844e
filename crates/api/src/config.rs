//! Application configuration loaded from environment variables.

use std::time::Duration;

use payments::EngineOptions;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `CURRENCY` — charge currency (default: `"usd"`)
/// - `CHECKOUT_SUCCESS_URL` / `CHECKOUT_CANCEL_URL` — hosted-flow redirects
/// - `PROVIDER_TIMEOUT_MS` — payment provider call bound (default: `10000`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub currency: String,
    pub checkout_success_url: String,
    pub checkout_cancel_url: String,
    pub provider_timeout_ms: u64,
}

impl Config {
    /// Loads configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            currency: std::env::var("CURRENCY").unwrap_or(defaults.currency),
            checkout_success_url: std::env::var("CHECKOUT_SUCCESS_URL")
                .unwrap_or(defaults.checkout_success_url),
            checkout_cancel_url: std::env::var("CHECKOUT_CANCEL_URL")
                .unwrap_or(defaults.checkout_cancel_url),
            provider_timeout_ms: std::env::var("PROVIDER_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.provider_timeout_ms),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Converts the payment-related settings into engine options.
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            currency: self.currency.clone(),
            success_url: self.checkout_success_url.clone(),
            cancel_url: self.checkout_cancel_url.clone(),
            provider_timeout: Duration::from_millis(self.provider_timeout_ms),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            currency: "usd".to_string(),
            checkout_success_url: "https://bookcourier.example.com/payment/success".to_string(),
            checkout_cancel_url: "https://bookcourier.example.com/payment/cancel".to_string(),
            provider_timeout_ms: 10_000,
        }
    }
}
