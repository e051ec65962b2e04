//! Configuration validation
//!
//! Startup checks beyond `Config::validate`, mostly about production safety.

use anyhow::Result;
use gridwalk_core::Config;

pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.is_production() {
        if config.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS configured to allow all origins (*) in production. \
                Set specific allowed origins via the CORS_ORIGINS environment variable."
            ));
        }

        if config.database_url.contains("sslmode=disable") {
            tracing::warn!("Database SSL is disabled in production");
        }
    }

    if config.cors_origins.is_empty() {
        tracing::warn!("CORS_ORIGINS is empty - browsers will be unable to call the API");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(move |key| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        })
        .unwrap()
    }

    #[test]
    fn test_wildcard_cors_rejected_in_production() {
        let config = config(&[
            ("DATABASE_URL", "postgres://u:p@db/gridwalk"),
            ("ENVIRONMENT", "production"),
        ]);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_explicit_cors_allowed_in_production() {
        let config = config(&[
            ("DATABASE_URL", "postgres://u:p@db/gridwalk"),
            ("ENVIRONMENT", "production"),
            ("CORS_ORIGINS", "https://maps.example.com"),
        ]);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_wildcard_cors_allowed_in_development() {
        let config = config(&[("DATABASE_URL", "postgres://u:p@db/gridwalk")]);
        assert!(validate_config(&config).is_ok());
    }
}
