use serde::Deserialize;
use std::env::vars;
use std::fmt::Display;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Env {
    #[serde(rename = "local")]
    Local,
    #[serde(rename = "test")]
    Test,
    #[serde(rename = "prod")]
    Prod,
}

impl Env {
    pub fn as_str(self) -> &'static str {
        match self {
            Env::Local => "local",
            Env::Test => "test",
            Env::Prod => "prod",
        }
    }
}

impl Display for Env {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// R2 bucket credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct R2Credentials {
    pub account_id: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
}

// Validated configuration. Every environment-dependent default is already applied.
#[derive(Debug, Clone)]
pub struct Config {
    env: Env,
    database_url: String,
    server_addr: String,
    port: u16,
    public_url: String,
    jwt_secret: String,
    r2: Option<R2Credentials>,
}

// Environment variables as read, before defaults.
#[derive(Deserialize)]
struct RawConfig {
    env: Env,
    database_url: String,
    server_addr: Option<String>,
    port: Option<u16>,
    public_url: Option<String>,
    jwt_secret: Option<String>,
    cf_account_id: Option<String>,
    cf_access_key_id: Option<String>,
    cf_secret_access_key: Option<String>,
    cf_bucket: Option<String>,
}

impl Config {
    /// Configuration for tests. Not for production use.
    pub fn new_for_test() -> Self {
        Self {
            env: Env::Test,
            database_url: "postgres://localhost:5432/test".to_string(),
            server_addr: "127.0.0.1".to_string(),
            port: 8080,
            public_url: "http://127.0.0.1:8080".to_string(),
            jwt_secret: "test-jwt-secret-key-for-local-development".to_string(),
            r2: None,
        }
    }

    pub fn environment(&self) -> &Env {
        &self.env
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn server_addr(&self) -> &str {
        &self.server_addr
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Externally reachable base URL, used in download links.
    pub fn public_url(&self) -> &str {
        &self.public_url
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    pub fn r2(&self) -> Option<&R2Credentials> {
        self.r2.as_ref()
    }

    pub fn is_local(&self) -> bool {
        matches!(self.env, Env::Local)
    }

    pub fn is_prod(&self) -> bool {
        matches!(self.env, Env::Prod)
    }

    /// Reads configuration from environment variables.
    pub fn init() -> anyhow::Result<Self> {
        info!("Loading configuration from environment variables");

        let raw_config: RawConfig = serde_env::from_iter(vars())?;
        Self::from_raw(raw_config)
    }

    fn from_raw(raw_config: RawConfig) -> anyhow::Result<Self> {
        let RawConfig {
            env,
            database_url,
            server_addr,
            port,
            public_url,
            jwt_secret,
            cf_account_id,
            cf_access_key_id,
            cf_secret_access_key,
            cf_bucket,
        } = raw_config;

        let server_addr = match server_addr {
            Some(addr) => {
                info!("Using provided SERVER_ADDR: {}", addr);
                addr
            }
            None => {
                let default_addr = match env {
                    Env::Local => "127.0.0.1",
                    _ => "0.0.0.0",
                };
                info!(
                    "SERVER_ADDR not set, defaulting to {} for {} environment",
                    default_addr, env
                );
                default_addr.to_string()
            }
        };

        let port = match port {
            Some(port) => port,
            None if matches!(env, Env::Local) => {
                info!("PORT not set, defaulting to 8080 for local environment");
                8080
            }
            None => anyhow::bail!("PORT must be set for {} environment", env),
        };

        let public_url = match public_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{server_addr}:{port}"),
        };

        let jwt_secret = match jwt_secret {
            Some(secret) => secret,
            None if matches!(env, Env::Local | Env::Test) => {
                info!("JWT_SECRET not set, using default for {} environment", env);
                "default-jwt-secret-for-local-development-only".to_string()
            }
            None => anyhow::bail!("JWT_SECRET must be set for {} environment", env),
        };

        let r2 = match (cf_account_id, cf_access_key_id, cf_secret_access_key, cf_bucket) {
            (Some(account_id), Some(access_key_id), Some(secret_access_key), Some(bucket)) => {
                info!("R2 storage credentials found for {} environment", env);
                Some(R2Credentials {
                    account_id,
                    access_key_id,
                    secret_access_key,
                    bucket,
                })
            }
            (account_id, access_key_id, secret_access_key, bucket) if matches!(env, Env::Prod) => {
                let missing: Vec<_> = [
                    ("CF_ACCOUNT_ID", account_id.is_none()),
                    ("CF_ACCESS_KEY_ID", access_key_id.is_none()),
                    ("CF_SECRET_ACCESS_KEY", secret_access_key.is_none()),
                    ("CF_BUCKET", bucket.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, is_missing)| is_missing.then_some(name))
                .collect();
                anyhow::bail!("{} must be set for {} environment", missing.join(", "), env);
            }
            _ => {
                info!("R2 credentials incomplete, using in-memory storage for {} environment", env);
                None
            }
        };

        Ok(Config {
            env,
            database_url,
            server_addr,
            port,
            public_url,
            jwt_secret,
            r2,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_env::from_iter;

    #[test]
    fn local_defaults() {
        let raw: RawConfig = from_iter(vec![
            ("ENV", "local"),
            ("DATABASE_URL", "postgres://example"),
        ])
        .expect("RawConfig should deserialize");

        let config = Config::from_raw(raw).expect("local config should build");
        assert_eq!(config.server_addr(), "127.0.0.1");
        assert_eq!(config.port(), 8080);
        assert_eq!(config.public_url(), "http://127.0.0.1:8080");
        assert!(config.r2().is_none());
        assert!(config.is_local());
    }

    #[test]
    fn port_required_outside_local() {
        let raw: RawConfig = from_iter(vec![
            ("ENV", "test"),
            ("DATABASE_URL", "postgres://example"),
        ])
        .expect("RawConfig should deserialize");

        let err = Config::from_raw(raw).unwrap_err().to_string();
        assert!(err.contains("PORT"));
    }

    #[test]
    fn default_server_addr_for_test_is_public() {
        let raw: RawConfig = from_iter(vec![
            ("ENV", "test"),
            ("DATABASE_URL", "postgres://example"),
            ("PORT", "3000"),
            ("PUBLIC_URL", "https://files.example.com/"),
        ])
        .expect("RawConfig should deserialize");

        let config = Config::from_raw(raw).expect("test config should build");
        assert_eq!(config.server_addr(), "0.0.0.0");
        assert_eq!(config.port(), 3000);
        assert_eq!(config.public_url(), "https://files.example.com");
    }

    #[test]
    fn jwt_secret_required_for_prod() {
        let raw: RawConfig = from_iter(vec![
            ("ENV", "prod"),
            ("DATABASE_URL", "postgres://example"),
            ("PORT", "8080"),
            ("CF_ACCOUNT_ID", "acc"),
            ("CF_ACCESS_KEY_ID", "key"),
            ("CF_SECRET_ACCESS_KEY", "secret"),
            ("CF_BUCKET", "bucket"),
        ])
        .expect("RawConfig should deserialize");

        let err = Config::from_raw(raw).unwrap_err().to_string();
        assert!(err.contains("JWT_SECRET"));
    }

    #[test]
    fn r2_credentials_required_for_prod() {
        let raw: RawConfig = from_iter(vec![
            ("ENV", "prod"),
            ("DATABASE_URL", "postgres://example"),
            ("PORT", "8080"),
            ("JWT_SECRET", "test-jwt-secret"),
            ("CF_ACCOUNT_ID", "acc"),
        ])
        .expect("RawConfig should deserialize");

        let err = Config::from_raw(raw).unwrap_err().to_string();
        assert!(err.contains("CF_ACCESS_KEY_ID"));
        assert!(err.contains("CF_BUCKET"));
        assert!(!err.contains("CF_ACCOUNT_ID"));
    }

    #[test]
    fn prod_with_everything_set() {
        let raw: RawConfig = from_iter(vec![
            ("ENV", "prod"),
            ("DATABASE_URL", "postgres://example"),
            ("PORT", "8080"),
            ("JWT_SECRET", "test-jwt-secret"),
            ("CF_ACCOUNT_ID", "acc"),
            ("CF_ACCESS_KEY_ID", "key"),
            ("CF_SECRET_ACCESS_KEY", "secret"),
            ("CF_BUCKET", "bucket"),
        ])
        .expect("RawConfig should deserialize");

        let config = Config::from_raw(raw).expect("prod config should build");
        assert!(config.is_prod());
        assert_eq!(config.r2().map(|r2| r2.bucket.as_str()), Some("bucket"));
        assert_eq!(config.jwt_secret(), "test-jwt-secret");
    }
}
