use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite://database.db";
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_JWKS_CACHE_SECONDS: u64 = 600;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} env var not set")]
    MissingVar(&'static str),
    #[error("{name} env var has invalid value {value:?}")]
    InvalidVar { name: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub reset_database: bool,
    pub listen_addr: SocketAddr,
    pub issuer: String,
    pub audience: String,
    pub algorithms: Vec<String>,
    pub jwks_url: String,
    pub jwks_cache: Duration,
    pub public_keys_pem: Option<Vec<String>>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::MissingVar(name));
        let invalid = |name: &'static str, value: String| ConfigError::InvalidVar { name, value };

        let domain = required("AUTH0_DOMAIN")?;
        let audience = required("API_AUDIENCE")?;

        let listen_addr = lookup("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = listen_addr
            .parse::<SocketAddr>()
            .map_err(|_| invalid("LISTEN_ADDR", listen_addr.clone()))?;

        let reset_database = match lookup("RESET_DATABASE") {
            None => false,
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                _ => return Err(invalid("RESET_DATABASE", value)),
            },
        };

        let jwks_cache = match lookup("JWKS_CACHE_SECONDS") {
            None => Duration::from_secs(DEFAULT_JWKS_CACHE_SECONDS),
            Some(value) => value
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| invalid("JWKS_CACHE_SECONDS", value.clone()))?,
        };

        let algorithms: Vec<String> = lookup("ALGORITHMS")
            .unwrap_or_else(|| "RS256".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if algorithms.is_empty() {
            return Err(invalid("ALGORITHMS", String::new()));
        }

        // same format as the other services: comma-separated, newlines escaped
        let public_keys_pem = lookup("PUBLIC_KEYS_PEM").map(|value| {
            value
                .split(',')
                .map(|s| s.to_string().replace("\\n", "\n"))
                .collect()
        });

        Ok(Self {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            reset_database,
            listen_addr,
            issuer: lookup("TOKEN_ISSUER").unwrap_or_else(|| format!("https://{}/", domain)),
            audience,
            algorithms,
            jwks_url: lookup("JWKS_URL")
                .unwrap_or_else(|| format!("https://{}/.well-known/jwks.json", domain)),
            jwks_cache,
            public_keys_pem,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&'static str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<&'static str, String> =
            vars.iter().map(|(k, v)| (*k, v.to_string())).collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    const BASE: [(&str, &str); 2] = [
        ("AUTH0_DOMAIN", "coffee.eu.auth0.com"),
        ("API_AUDIENCE", "drinks"),
    ];

    #[test]
    fn defaults_derive_from_domain() {
        let config = config(&BASE).unwrap();

        assert_eq!(config.issuer, "https://coffee.eu.auth0.com/");
        assert_eq!(
            config.jwks_url,
            "https://coffee.eu.auth0.com/.well-known/jwks.json"
        );
        assert_eq!(config.algorithms, vec!["RS256".to_string()]);
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.listen_addr, "0.0.0.0:8000".parse().unwrap());
        assert_eq!(config.jwks_cache, Duration::from_secs(600));
        assert!(!config.reset_database);
        assert!(config.public_keys_pem.is_none());
    }

    #[test]
    fn domain_and_audience_are_required() {
        assert_eq!(
            config(&[("API_AUDIENCE", "drinks")]).unwrap_err(),
            ConfigError::MissingVar("AUTH0_DOMAIN")
        );
        assert_eq!(
            config(&[("AUTH0_DOMAIN", "coffee.eu.auth0.com")]).unwrap_err(),
            ConfigError::MissingVar("API_AUDIENCE")
        );
    }

    #[test]
    fn invalid_values_are_reported() {
        let mut vars = BASE.to_vec();
        vars.push(("JWKS_CACHE_SECONDS", "soon"));
        assert!(matches!(
            config(&vars),
            Err(ConfigError::InvalidVar { name: "JWKS_CACHE_SECONDS", .. })
        ));

        let mut vars = BASE.to_vec();
        vars.push(("RESET_DATABASE", "maybe"));
        assert!(matches!(
            config(&vars),
            Err(ConfigError::InvalidVar { name: "RESET_DATABASE", .. })
        ));
    }

    #[test]
    fn pem_keys_are_unescaped() {
        let mut vars = BASE.to_vec();
        vars.push(("PUBLIC_KEYS_PEM", "-----BEGIN-----\\nabc,-----BEGIN-----\\ndef"));
        vars.push(("RESET_DATABASE", "true"));

        let config = config(&vars).unwrap();

        assert!(config.reset_database);
        assert_eq!(
            config.public_keys_pem,
            Some(vec![
                "-----BEGIN-----\nabc".to_string(),
                "-----BEGIN-----\ndef".to_string()
            ])
        );
    }
}
