//! User search index configuration.
//!
//! ```toml
//! [search]
//! url = "http://localhost:9200"
//! index = "user"
//! timeout_secs = 10
//! ```

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Elasticsearch connection used for user search.
/// Absent section means user search is not available.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    /// Base URL of the Elasticsearch cluster.
    pub url: String,

    /// Index holding user documents.
    #[serde(default = "default_index")]
    pub index: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Basic auth username.
    #[serde(default)]
    pub username: Option<String>,

    /// Basic auth password. Use `${VAR}` interpolation rather than a literal.
    #[serde(default)]
    pub password: Option<String>,
}

fn default_index() -> String {
    "user".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl SearchConfig {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = url::Url::parse(&self.url)
            .map_err(|e| ConfigError::Validation(format!("search.url is invalid: {}", e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(format!(
                "search.url must be http or https, got {}",
                url.scheme()
            )));
        }
        if self.index.is_empty() || self.index.contains('/') {
            return Err(ConfigError::Validation(format!(
                "search.index is not a valid index name: {:?}",
                self.index
            )));
        }
        if self.password.is_some() && self.username.is_none() {
            return Err(ConfigError::Validation(
                "search.password requires search.username".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: SearchConfig = toml::from_str(r#"url = "http://localhost:9200""#).unwrap();
        assert_eq!(config.index, "user");
        assert_eq!(config.timeout(), std::time::Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_url_rejected() {
        let config: SearchConfig = toml::from_str(r#"url = "not a url""#).unwrap();
        assert!(config.validate().is_err());

        let config: SearchConfig = toml::from_str(r#"url = "ftp://search.local""#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_password_without_username_rejected() {
        let config: SearchConfig = toml::from_str(
            r#"
            url = "https://search.local"
            password = "secret"
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }
}
