use std::env;
use std::str::FromStr;

use crate::services::aggregation::ComplianceAveraging;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_access_token_expiry_secs: i64,
    pub jwt_refresh_token_expiry_secs: i64,
    /// Allowed CORS origin.
    pub frontend_url: String,
    pub compliance_averaging: ComplianceAveraging,
}

/// Parse an optional variable, falling back to `default` when unset or malformed.
fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Load configuration. `DATABASE_URL` and `JWT_SECRET` are required.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10),
            host: env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_or("BACKEND_PORT", 3000),
            jwt_secret: env::var("JWT_SECRET")?,
            jwt_access_token_expiry_secs: parse_or("JWT_ACCESS_TOKEN_EXPIRY_SECS", 900),
            jwt_refresh_token_expiry_secs: parse_or("JWT_REFRESH_TOKEN_EXPIRY_SECS", 604_800),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3001".to_string()),
            compliance_averaging: parse_or("COMPLIANCE_AVERAGING", ComplianceAveraging::default()),
        })
    }
}
