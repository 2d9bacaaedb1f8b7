use serde::Deserialize;

/// Default service address for local development.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessConfig {
    pub api_base_url: String,
}

#[derive(Deserialize)]
struct RawBusinessConfig {
    cabinet_api_url: Option<String>,
}

impl BusinessConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: base_url.into(),
        }
    }

    /// Reads `CABINET_API_URL`, falling back to [`DEFAULT_API_URL`].
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let raw: Result<RawBusinessConfig, _> = serde_env::from_iter(vars);
        match raw {
            Ok(RawBusinessConfig {
                cabinet_api_url: Some(url),
            }) if !url.trim().is_empty() => Self::new(url),
            Ok(_) => Self::default(),
            Err(e) => {
                log::warn!("Ignoring unreadable environment configuration: {e}");
                Self::default()
            }
        }
    }

    /// Base URL without a trailing slash.
    pub fn api_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}
