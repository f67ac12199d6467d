use endpoints_core::config::HttpConfig;
use endpoints_core::error::AppError;
use reqwest::Client;

/// Builds the shared `reqwest` client with the configured user agent and timeout.
pub(crate) fn build_client(http: &HttpConfig) -> Result<Client, AppError> {
    Client::builder()
        .user_agent(http.user_agent.as_str())
        .timeout(http.timeout)
        .build()
        .map_err(|e| AppError::ClientError(e.to_string()))
}

/// Classifies a transport-level failure.
pub(crate) fn send_error(e: reqwest::Error, http: &HttpConfig) -> AppError {
    if e.is_timeout() {
        AppError::Timeout(http.timeout.as_secs())
    } else if e.is_connect() {
        AppError::NetworkError(format!("Connection failed: {}", e))
    } else {
        AppError::ClientError(e.to_string())
    }
}
