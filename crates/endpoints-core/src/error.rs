use thiserror::Error;

/// Application-wide error types.
///
/// This enum represents every failure the endpoint publisher can run into, from
/// configuration problems detected at startup to rejections returned by Knack
/// or CKAN.
///
/// # Error Conversion
///
/// Some errors convert automatically from their source types using `#[from]`:
/// - `serde_json::Error` → `AppError::SerializationError`
/// - `url::ParseError` → `AppError::InvalidUrl`
///
/// # Examples
///
/// ```
/// use endpoints_core::error::AppError;
///
/// fn example() -> Result<(), AppError> {
///     Err(AppError::MissingConfig("CARTO_ENDPOINT"))
/// }
///
/// assert!(example().unwrap_err().is_config_error());
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// A required configuration value is unset or blank.
    ///
    /// Holds the name of the environment variable that should provide it.
    #[error("Missing configuration value: {0}")]
    MissingConfig(&'static str),

    /// A configured URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A payload key has no entry in the Knack field map.
    ///
    /// This is a configuration error: the payload shape and the field map
    /// must agree on the four logical keys.
    #[error("No Knack field configured for payload key '{0}'")]
    UnmappedField(String),

    /// Two logical keys point at the same Knack field.
    #[error("Knack field {0} is configured for more than one payload key")]
    DuplicateField(String),

    /// HTTP client request failed.
    #[error("API Client error: {0}")]
    ClientError(String),

    /// Knack refused to create a record.
    #[error("Knack rejected record: HTTP {status}: {body}")]
    RecordRejected { status: u16, body: String },

    /// CKAN answered but reported a failure.
    #[error("CKAN error: {0}")]
    CkanError(String),

    /// The requested CKAN package does not exist.
    #[error("CKAN package not found: {0}")]
    PackageNotFound(String),

    /// JSON serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Network or connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timeout.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Generic application error for cases not covered by specific variants.
    #[error("Error: {0}")]
    Generic(String),
}

impl AppError {
    /// Returns a user-friendly error message suitable for CLI output.
    pub fn user_message(&self) -> String {
        match self {
            AppError::MissingConfig(var) => {
                format!(
                    "Missing configuration value {}.\n   Set it in the environment or in a .env file.",
                    var
                )
            }
            AppError::InvalidUrl(e) => {
                format!(
                    "Invalid URL in configuration: {}\n   Example: https://phl.carto.com/api/v2/sql",
                    e
                )
            }
            AppError::UnmappedField(key) => {
                format!(
                    "Payload key '{}' has no Knack field.\n   Check the KNACK_FIELD_* variables.",
                    key
                )
            }
            AppError::RecordRejected { status, .. } if *status == 401 || *status == 403 => {
                "Knack refused the credentials.\n   Check KNACK_APPLICATION_ID and KNACK_API_KEY."
                    .to_string()
            }
            AppError::CkanError(msg) if msg.contains("Authorization") => {
                format!("CKAN refused the request: {}\n   Check CKAN_API_KEY.", msg)
            }
            AppError::PackageNotFound(slug) => {
                format!("CKAN has no dataset with slug '{}'.", slug)
            }
            AppError::NetworkError(msg) => {
                format!("Network error: {}\n   Check your internet connection.", msg)
            }
            AppError::Timeout(secs) => {
                format!(
                    "Request timed out after {} seconds.\n   The server may be overloaded. Try again later.",
                    secs
                )
            }
            _ => self.to_string(),
        }
    }

    /// Returns true if this error comes from local configuration rather than
    /// from a remote service.
    ///
    /// # Examples
    ///
    /// ```
    /// use endpoints_core::error::AppError;
    ///
    /// assert!(AppError::UnmappedField("colour".to_string()).is_config_error());
    /// assert!(!AppError::Timeout(30).is_config_error());
    /// ```
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            AppError::MissingConfig(_)
                | AppError::InvalidUrl(_)
                | AppError::UnmappedField(_)
                | AppError::DuplicateField(_)
        )
    }
}
