use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

pub const DEFAULT_SWEEP_CRON: &str = "0 * * * * *";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub qr_signing_secret: String,
    pub notification_sweep_cron: String,
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a valid number")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "trip-server".to_string()),
            qr_signing_secret: env::var("QR_SIGNING_SECRET").unwrap_or_else(|_| jwt_secret.clone()),
            jwt_secret,
            notification_sweep_cron: env::var("NOTIFICATION_SWEEP_CRON")
                .unwrap_or_else(|_| DEFAULT_SWEEP_CRON.to_string()),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|origins| parse_origins(&origins))
                .unwrap_or_default(),
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}
