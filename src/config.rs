use std::str::FromStr;

use anyhow::{Context, Result, anyhow};

use crate::services::shared_carts::DEFAULT_SHARE_CODE_ATTEMPTS;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct OrdersConfig {
    /// Reject checkout/cancel of orders that are no longer PENDING.
    pub strict_transitions: bool,
}

#[derive(Debug, Clone)]
pub struct SharedCartsConfig {
    pub code_attempts: u32,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub orders: OrdersConfig,
    pub shared_carts: SharedCartsConfig,
}

/// Reads the configuration from the process environment (after `.env` has been loaded).
pub fn load() -> Result<AppConfig> {
    from_lookup(|key| std::env::var(key).ok())
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|err| anyhow!("Invalid value for {key}: {err}")),
        None => Ok(default),
    }
}

pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<AppConfig> {
    let url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;

    Ok(AppConfig {
        server: ServerConfig {
            host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "SERVER_PORT", 3000)?,
        },
        database: DatabaseConfig {
            url,
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
        },
        orders: OrdersConfig {
            strict_transitions: parse_or(&lookup, "ORDERS_STRICT_TRANSITIONS", false)?,
        },
        shared_carts: SharedCartsConfig {
            code_attempts: parse_or(
                &lookup,
                "SHARED_CART_CODE_ATTEMPTS",
                DEFAULT_SHARE_CODE_ATTEMPTS,
            )?,
        },
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_the_database_is_set() {
        let config = from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/food")]))
            .unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.max_connections, 10);
        assert!(!config.orders.strict_transitions);
        assert_eq!(config.shared_carts.code_attempts, DEFAULT_SHARE_CODE_ATTEMPTS);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/food"),
            ("SERVER_PORT", "8080"),
            ("ORDERS_STRICT_TRANSITIONS", "true"),
            ("SHARED_CART_CODE_ATTEMPTS", "3"),
        ]))
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert!(config.orders.strict_transitions);
        assert_eq!(config.shared_carts.code_attempts, 3);
    }

    #[test]
    fn missing_database_url_and_bad_numbers_fail() {
        assert!(from_lookup(lookup_from(&[])).is_err());
        assert!(
            from_lookup(lookup_from(&[
                ("DATABASE_URL", "postgres://db/food"),
                ("SERVER_PORT", "eighty"),
            ]))
            .is_err()
        );
    }
}
