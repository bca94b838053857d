//! Environment-backed configuration.

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    /// Shared HMAC secret for webhook signatures. May be empty, in which
    /// case signature verification fails closed and /health/ready reports 503.
    pub webhook_secret: String,
    pub database_url: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        let webhook_secret = env::var("WEBHOOK_SECRET").unwrap_or_default();
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://messages.db".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8000);

        Self {
            webhook_secret,
            database_url,
            port,
        }
    }
}
