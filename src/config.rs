use std::str::FromStr;

// ============================================================================
// Configuration - Environment-driven runtime settings
// ============================================================================
//
// APP_ENV=production selects the deployed request shape and the managed store
// endpoint; anything else is local development against a store on
// 127.0.0.1:STORE_PORT.
//
// ============================================================================

pub const DEFAULT_TABLE: &str = "orders";
pub const DEFAULT_KEYSPACE: &str = "orders_ks";
pub const DEFAULT_STORE_PORT: u16 = 9042;
pub const DEFAULT_HTTP_PORT: u16 = 3000;
pub const DEFAULT_MANAGED_NODE: &str = "scylla:9042";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnvironment {
    Local,
    Production,
}

impl RuntimeEnvironment {
    pub fn from_indicator(indicator: Option<&str>) -> Self {
        match indicator {
            Some("production") => RuntimeEnvironment::Production,
            _ => RuntimeEnvironment::Local,
        }
    }

    pub fn is_local(&self) -> bool {
        *self == RuntimeEnvironment::Local
    }
}

/// Where path parameters and body live on an incoming event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestShape {
    /// `event.path` and `event.body` are plain objects.
    Local,
    /// `event.pathParameters` is an object, `event.body` a JSON string.
    Deployed,
}

impl FromStr for RequestShape {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(RequestShape::Local),
            "deployed" => Ok(RequestShape::Deployed),
            _ => Err(()),
        }
    }
}

impl From<RuntimeEnvironment> for RequestShape {
    fn from(env: RuntimeEnvironment) -> Self {
        match env {
            RuntimeEnvironment::Local => RequestShape::Local,
            RuntimeEnvironment::Production => RequestShape::Deployed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Scylla,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scylla" => Ok(StoreBackend::Scylla),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub nodes: Vec<String>,
    pub keyspace: String,
    pub table: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub environment: RuntimeEnvironment,
    pub request_shape: RequestShape,
    pub store: StoreConfig,
    pub http_port: u16,
}

fn parse_or<T: FromStr>(
    key: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = RuntimeEnvironment::from_indicator(lookup("APP_ENV").as_deref());
        let request_shape: RequestShape = parse_or("REQUEST_SHAPE", lookup("REQUEST_SHAPE"), environment.into())?;
        let backend = parse_or("STORE_BACKEND", lookup("STORE_BACKEND"), StoreBackend::Scylla)?;

        let nodes = if environment.is_local() {
            let port = parse_or("STORE_PORT", lookup("STORE_PORT"), DEFAULT_STORE_PORT)?;
            vec![format!("127.0.0.1:{}", port)]
        } else {
            lookup("STORE_NODES")
                .unwrap_or_else(|| DEFAULT_MANAGED_NODE.to_string())
                .split(',')
                .map(str::trim)
                .filter(|node| !node.is_empty())
                .map(str::to_string)
                .collect()
        };

        Ok(Self {
            environment,
            request_shape,
            store: StoreConfig {
                backend,
                nodes,
                keyspace: lookup("STORE_KEYSPACE").unwrap_or_else(|| DEFAULT_KEYSPACE.to_string()),
                table: lookup("ORDERS_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            },
            http_port: parse_or("HTTP_PORT", lookup("HTTP_PORT"), DEFAULT_HTTP_PORT)?,
        })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_are_local() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.environment, RuntimeEnvironment::Local);
        assert_eq!(config.request_shape, RequestShape::Local);
        assert_eq!(config.store.backend, StoreBackend::Scylla);
        assert_eq!(config.store.nodes, vec!["127.0.0.1:9042".to_string()]);
        assert_eq!(config.store.keyspace, "orders_ks");
        assert_eq!(config.store.table, "orders");
        assert_eq!(config.http_port, 3000);
    }

    #[test]
    fn test_local_store_port() {
        let config = config_from(&[("APP_ENV", "development"), ("STORE_PORT", "8000")]).unwrap();
        assert_eq!(config.store.nodes, vec!["127.0.0.1:8000".to_string()]);
    }

    #[test]
    fn test_production_uses_managed_nodes() {
        let config = config_from(&[("APP_ENV", "production"), ("STORE_PORT", "8000")]).unwrap();

        assert_eq!(config.environment, RuntimeEnvironment::Production);
        assert_eq!(config.request_shape, RequestShape::Deployed);
        assert_eq!(config.store.nodes, vec![DEFAULT_MANAGED_NODE.to_string()]);

        let config = config_from(&[
            ("APP_ENV", "production"),
            ("STORE_NODES", "10.0.0.1:9042, 10.0.0.2:9042"),
        ])
        .unwrap();
        assert_eq!(config.store.nodes, vec!["10.0.0.1:9042", "10.0.0.2:9042"]);
    }

    #[test]
    fn test_request_shape_override() {
        let config = config_from(&[("REQUEST_SHAPE", "deployed")]).unwrap();
        assert_eq!(config.environment, RuntimeEnvironment::Local);
        assert_eq!(config.request_shape, RequestShape::Deployed);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = config_from(&[("STORE_PORT", "not-a-port")]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for STORE_PORT: not-a-port");

        assert!(config_from(&[("STORE_BACKEND", "postgres")]).is_err());
        assert!(config_from(&[("REQUEST_SHAPE", "lambda")]).is_err());
    }
}
