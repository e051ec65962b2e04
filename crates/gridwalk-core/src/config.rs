//! Configuration module
//!
//! Settings are read from the process environment (after loading `.env` when present).
//! The database URL is either given whole via `DATABASE_URL` or assembled from the
//! `DATABASE_USER` / `DATABASE_PASSWORD` / `DATABASE_HOST` / `DATABASE_PORT` /
//! `DATABASE_NAME` components.

use std::env;

const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_DATABASE_PORT: u16 = 5432;
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;

/// Schema holding the per-layer data tables.
pub const DEFAULT_LAYER_SCHEMA: &str = "gridwalk_layer_data";

#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub layer_schema: String,
    pub run_migrations: bool,
    pub environment: String,
    pub http_concurrency_limit: usize,
    /// Emit logs as JSON lines instead of the compact console format
    pub log_json: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = match lookup("DATABASE_URL").filter(|s| !s.is_empty()) {
            Some(url) => url,
            None => database_url_from_parts(&lookup)?,
        };

        let config = Config {
            server_port: parse_or("PORT", &lookup, DEFAULT_PORT)?,
            cors_origins: lookup("CORS_ORIGINS")
                .unwrap_or_else(|| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            database_url,
            db_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", &lookup, MAX_CONNECTIONS)?,
            db_timeout_seconds: parse_or("DB_TIMEOUT_SECONDS", &lookup, CONNECTION_TIMEOUT_SECS)?,
            layer_schema: lookup("LAYER_SCHEMA")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_LAYER_SCHEMA.to_string()),
            run_migrations: lookup("RUN_MIGRATIONS")
                .map(|s| s.to_lowercase() != "false" && s != "0")
                .unwrap_or(true),
            environment: lookup("ENVIRONMENT")
                .or_else(|| lookup("APP_ENV"))
                .unwrap_or_else(|| "development".to_string()),
            http_concurrency_limit: parse_or(
                "HTTP_CONCURRENCY_LIMIT",
                &lookup,
                HTTP_CONCURRENCY_LIMIT,
            )?
            .max(1),
            log_json: lookup("LOG_FORMAT")
                .map(|s| s.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.db_max_connections == 0 {
            return Err(anyhow::anyhow!("DATABASE_MAX_CONNECTIONS cannot be 0"));
        }

        if self.db_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("DB_TIMEOUT_SECONDS cannot be 0"));
        }

        if !is_identifier(&self.layer_schema) {
            return Err(anyhow::anyhow!(
                "LAYER_SCHEMA must be a plain SQL identifier (letters, digits, underscore)"
            ));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}

fn database_url_from_parts<F>(lookup: &F) -> Result<String, anyhow::Error>
where
    F: Fn(&str) -> Option<String>,
{
    let required = |key: &str| {
        lookup(key).ok_or_else(|| {
            anyhow::anyhow!("Missing environment variable: {} (or set DATABASE_URL)", key)
        })
    };

    let user = required("DATABASE_USER")?;
    let password = required("DATABASE_PASSWORD")?;
    let host = required("DATABASE_HOST")?;
    let name = required("DATABASE_NAME")?;
    let port: u16 = parse_or("DATABASE_PORT", lookup, DEFAULT_DATABASE_PORT)?;
    let disable_ssl = lookup("DATABASE_DISABLE_SSL")
        .map(|s| s.to_lowercase() == "true")
        .unwrap_or(false);

    let mut url = format!(
        "postgresql://{}:{}@{}:{}/{}",
        urlencoding::encode(&user),
        urlencoding::encode(&password),
        host,
        port,
        name
    );
    if disable_ssl {
        url.push_str("?sslmode=disable");
    }
    Ok(url)
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> Result<T, anyhow::Error>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e)),
        None => Ok(default),
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= 63
        && !s.starts_with(|c: char| c.is_ascii_digit())
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
