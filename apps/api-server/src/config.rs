//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use quill_infra::auth::MAX_EXPIRATION_HOURS;
use quill_infra::{DatabaseConfig, Environment, JwtConfig};

/// Signing secret used when `API_SECRET` is unset in development and test.
pub const DEV_SECRET: &str = "DEV_ONLY_SECRET_DO_NOT_USE_IN_PRODUCTION";

/// Configuration errors. The server refuses to start on any of these.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("API_SECRET must be set when running in {0}")]
    MissingSecret(Environment),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    /// Check action results against their validation rules before responding.
    pub validate_action_results: bool,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        let secret = resolve_secret(env::var("API_SECRET").ok(), environment)?;

        let mut jwt = JwtConfig::new(secret);
        if let Some(hours) = parse_expiration_hours(env::var("JWT_EXPIRATION_HOURS").ok())? {
            jwt.expiration_hours = hours;
        }
        if let Ok(issuer) = env::var("JWT_ISSUER") {
            jwt.issuer = issuer;
        }

        Ok(Self {
            environment,
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_value("PORT", env::var("PORT").ok())?.unwrap_or(8080),
            database: DatabaseConfig::from_env(environment),
            jwt,
            validate_action_results: parse_flag(env::var("VALIDATE_ACTION_RESULTS").ok())
                .unwrap_or_else(|| environment.is_dev_or_test()),
        })
    }
}

/// Pick the token signing secret. Production must provide one.
pub fn resolve_secret(
    value: Option<String>,
    environment: Environment,
) -> Result<String, ConfigError> {
    match value.filter(|s| !s.trim().is_empty()) {
        Some(secret) => Ok(secret),
        None if environment.is_dev_or_test() => {
            tracing::warn!("API_SECRET not set. Using the development-only secret.");
            Ok(DEV_SECRET.to_string())
        }
        None => Err(ConfigError::MissingSecret(environment)),
    }
}

fn parse_value<T: FromStr>(
    name: &'static str,
    value: Option<String>,
) -> Result<Option<T>, ConfigError> {
    value
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { name, value: raw })
        })
        .transpose()
}

/// Token lifetime in hours: at least one hour, at most ten years.
fn parse_expiration_hours(value: Option<String>) -> Result<Option<i64>, ConfigError> {
    match parse_value::<i64>("JWT_EXPIRATION_HOURS", value)? {
        Some(hours) if !(1..=MAX_EXPIRATION_HOURS).contains(&hours) => Err(ConfigError::Invalid {
            name: "JWT_EXPIRATION_HOURS",
            value: hours.to_string(),
        }),
        hours => Ok(hours),
    }
}

fn parse_flag(value: Option<String>) -> Option<bool> {
    value.map(|v| !matches!(v.trim().to_lowercase().as_str(), "false" | "0" | "no" | "off"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_from_environment_wins() {
        let secret = resolve_secret(Some("s3cret".to_string()), Environment::Production).unwrap();
        assert_eq!(secret, "s3cret");
    }

    #[test]
    fn test_dev_and_test_fall_back_to_dev_secret() {
        assert_eq!(
            resolve_secret(None, Environment::Development).unwrap(),
            DEV_SECRET
        );
        assert_eq!(
            resolve_secret(Some("  ".to_string()), Environment::Test).unwrap(),
            DEV_SECRET
        );
    }

    #[test]
    fn test_production_requires_secret() {
        let err = resolve_secret(None, Environment::Production).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret(Environment::Production)));
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value::<u16>("PORT", None).unwrap(), None);
        assert_eq!(parse_value::<u16>("PORT", Some(" 3000 ".to_string())).unwrap(), Some(3000));
        assert!(matches!(
            parse_value::<u16>("PORT", Some("eighty".to_string())),
            Err(ConfigError::Invalid { name: "PORT", .. })
        ));
    }

    #[test]
    fn test_expiration_hours_bounds() {
        assert_eq!(parse_expiration_hours(None).unwrap(), None);
        assert_eq!(parse_expiration_hours(Some("1".to_string())).unwrap(), Some(1));
        assert_eq!(
            parse_expiration_hours(Some(MAX_EXPIRATION_HOURS.to_string())).unwrap(),
            Some(MAX_EXPIRATION_HOURS)
        );

        for rejected in ["0", "-2", "87601", "10000000000", "soon"] {
            assert!(
                matches!(
                    parse_expiration_hours(Some(rejected.to_string())),
                    Err(ConfigError::Invalid { name: "JWT_EXPIRATION_HOURS", .. })
                ),
                "{rejected} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag(None), None);
        assert_eq!(parse_flag(Some("false".to_string())), Some(false));
        assert_eq!(parse_flag(Some("0".to_string())), Some(false));
        assert_eq!(parse_flag(Some("true".to_string())), Some(true));
    }
}
