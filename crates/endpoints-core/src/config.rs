//! Configuration types for the endpoint publisher.
//!
//! Every value is read once at process start and passed by reference to the
//! components that need it. Constructors validate eagerly so a misconfigured
//! run fails before the first network call.

use std::time::Duration;

use url::Url;

use crate::error::AppError;
use crate::fields::FieldMap;

/// Default base URL of the Knack REST API.
pub const DEFAULT_KNACK_API_URL: &str = "https://api.knack.com/v1";

/// Returns the trimmed value, or `MissingConfig(var)` when it is absent or blank.
///
/// # Examples
///
/// ```
/// use endpoints_core::config::require;
///
/// assert_eq!(require(Some(" abc "), "X").unwrap(), "abc");
/// assert!(require(Some("  "), "X").is_err());
/// assert!(require(None, "X").is_err());
/// ```
pub fn require<'a>(value: Option<&'a str>, var: &'static str) -> Result<&'a str, AppError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::MissingConfig(var)),
    }
}

/// Carto SQL API endpoints used to build export URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartoConfig {
    /// Base SQL endpoint, e.g. `https://phl.carto.com/api/v2/sql`.
    /// Kept verbatim; URLs are assembled by interpolation.
    pub sql_endpoint: String,
    /// Base URL of the API documentation page. The table name is appended as a fragment.
    pub api_docs_endpoint: String,
}

impl CartoConfig {
    /// Validates both endpoints and keeps them as given.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidUrl` if either endpoint is not an absolute URL.
    pub fn new(sql_endpoint: &str, api_docs_endpoint: &str) -> Result<Self, AppError> {
        Url::parse(sql_endpoint)?;
        Url::parse(api_docs_endpoint)?;

        Ok(Self {
            sql_endpoint: sql_endpoint.to_string(),
            api_docs_endpoint: api_docs_endpoint.to_string(),
        })
    }
}

/// Knack application credentials and schema identifiers.
#[derive(Debug, Clone)]
pub struct KnackConfig {
    pub application_id: String,
    pub api_key: String,
    /// Numeric id of the Knack object (table) holding endpoint records.
    pub object_id: String,
    pub api_url: Url,
    pub fields: FieldMap,
}

impl KnackConfig {
    /// # Errors
    ///
    /// Returns `AppError::InvalidUrl` if `api_url` cannot be parsed.
    pub fn new(
        application_id: &str,
        api_key: &str,
        object_id: &str,
        api_url: &str,
        fields: FieldMap,
    ) -> Result<Self, AppError> {
        Ok(Self {
            application_id: application_id.to_string(),
            api_key: api_key.to_string(),
            object_id: object_id.to_string(),
            api_url: Url::parse(api_url)?,
            fields,
        })
    }

    /// URL of the record collection of the configured object.
    ///
    /// # Examples
    ///
    /// ```
    /// use endpoints_core::config::{KnackConfig, DEFAULT_KNACK_API_URL};
    /// use endpoints_core::fields::FieldMap;
    ///
    /// let fields = FieldMap::new("1", "2", "3", "4").unwrap();
    /// let knack = KnackConfig::new("app", "key", "7", DEFAULT_KNACK_API_URL, fields).unwrap();
    /// assert_eq!(
    ///     knack.records_url(),
    ///     "https://api.knack.com/v1/objects/object_7/records"
    /// );
    /// ```
    pub fn records_url(&self) -> String {
        format!(
            "{}/objects/object_{}/records",
            self.api_url.as_str().trim_end_matches('/'),
            self.object_id
        )
    }
}

/// CKAN portal host and API key.
#[derive(Debug, Clone)]
pub struct CkanConfig {
    pub host: Url,
    pub api_key: String,
}

impl CkanConfig {
    /// # Errors
    ///
    /// Returns `AppError::InvalidUrl` if `host` cannot be parsed.
    pub fn new(host: &str, api_key: &str) -> Result<Self, AppError> {
        Ok(Self {
            host: Url::parse(host)?,
            api_key: api_key.to_string(),
        })
    }
}

/// HTTP client configuration for external API calls.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl HttpConfig {
    pub fn with_timeout_secs(secs: u64) -> Self {
        Self {
            timeout: Duration::from_secs(secs),
            ..Self::default()
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("carto-endpoints/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> FieldMap {
        FieldMap::new("10", "11", "12", "13").unwrap()
    }

    #[test]
    fn test_require_trims_and_rejects_blank() {
        assert_eq!(require(Some("  x "), "VAR").unwrap(), "x");
        assert!(matches!(
            require(Some(""), "VAR"),
            Err(AppError::MissingConfig("VAR"))
        ));
        assert!(matches!(
            require(None, "CKAN_HOST"),
            Err(AppError::MissingConfig("CKAN_HOST"))
        ));
    }

    #[test]
    fn test_carto_config_keeps_endpoint_verbatim() {
        let carto = CartoConfig::new(
            "https://carto.example/sql",
            "https://docs.example/api",
        )
        .unwrap();
        assert_eq!(carto.sql_endpoint, "https://carto.example/sql");
        assert_eq!(carto.api_docs_endpoint, "https://docs.example/api");
    }

    #[test]
    fn test_carto_config_invalid_url() {
        let result = CartoConfig::new("carto.example/sql", "https://docs.example");
        assert!(matches!(result, Err(AppError::InvalidUrl(_))));
    }

    #[test]
    fn test_records_url_trailing_slash() {
        let knack =
            KnackConfig::new("app", "key", "42", "https://knack.example/v1/", fields()).unwrap();
        assert_eq!(
            knack.records_url(),
            "https://knack.example/v1/objects/object_42/records"
        );
    }

    #[test]
    fn test_ckan_config_invalid_host() {
        assert!(CkanConfig::new("not-a-url", "key").is_err());
        assert!(CkanConfig::new("https://data.example.org", "key").is_ok());
    }

    #[test]
    fn test_http_config_defaults() {
        let config = HttpConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("carto-endpoints/"));
        assert_eq!(
            HttpConfig::with_timeout_secs(5).timeout,
            Duration::from_secs(5)
        );
    }
}
