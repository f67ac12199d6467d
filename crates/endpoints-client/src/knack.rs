use endpoints_core::config::{HttpConfig, KnackConfig};
use endpoints_core::error::AppError;
use endpoints_core::traits::RecordStore;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde_json::{Map, Value};
use tracing::debug;

use crate::http::{build_client, send_error};

const APPLICATION_ID_HEADER: &str = "X-Knack-Application-Id";
const API_KEY_HEADER: &str = "X-Knack-REST-API-Key";

/// HTTP client for the Knack object records API.
///
/// Records are created with `POST /objects/object_<id>/records`. Knack answers
/// a successful create with HTTP 200; any other status is treated as a
/// rejection of that single record.
///
/// # Examples
///
/// ```no_run
/// use endpoints_client::KnackClient;
/// use endpoints_core::config::{HttpConfig, KnackConfig, DEFAULT_KNACK_API_URL};
/// use endpoints_core::fields::FieldMap;
/// use endpoints_core::traits::RecordStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let fields = FieldMap::new("12", "13", "14", "15")?;
/// let config = KnackConfig::new("app-id", "api-key", "3", DEFAULT_KNACK_API_URL, fields)?;
/// let client = KnackClient::new(&config, &HttpConfig::default())?;
///
/// let record = serde_json::json!({"field_14": "CSV"});
/// client.create_record(record.as_object().unwrap()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct KnackClient {
    client: Client,
    records_url: Url,
    application_id: String,
    api_key: String,
    http: HttpConfig,
}

impl KnackClient {
    /// Creates a client for the configured Knack object.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidUrl` if the records URL cannot be built.
    /// Returns `AppError::ClientError` if the HTTP client cannot be built.
    pub fn new(config: &KnackConfig, http: &HttpConfig) -> Result<Self, AppError> {
        let records_url = Url::parse(&config.records_url())?;

        Ok(Self {
            client: build_client(http)?,
            records_url,
            application_id: config.application_id.clone(),
            api_key: config.api_key.clone(),
            http: http.clone(),
        })
    }

    pub fn records_url(&self) -> &Url {
        &self.records_url
    }

    fn create_request(&self, record: &Map<String, Value>) -> RequestBuilder {
        self.client
            .post(self.records_url.clone())
            .header(APPLICATION_ID_HEADER, &self.application_id)
            .header(API_KEY_HEADER, &self.api_key)
            .json(record)
    }
}

impl RecordStore for KnackClient {
    async fn create_record(&self, record: &Map<String, Value>) -> Result<(), AppError> {
        let response = self
            .create_request(record)
            .send()
            .await
            .map_err(|e| send_error(e, &self.http))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        check_status(status, body)?;

        debug!("Knack accepted record at {}", self.records_url);
        Ok(())
    }
}

/// Knack signals a created record with HTTP 200 only; every other status,
/// other 2xx codes included, rejects the record.
fn check_status(status: StatusCode, body: String) -> Result<(), AppError> {
    if status == StatusCode::OK {
        return Ok(());
    }

    Err(AppError::RecordRejected {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use endpoints_core::config::DEFAULT_KNACK_API_URL;
    use endpoints_core::fields::FieldMap;

    fn config() -> KnackConfig {
        let fields = FieldMap::new("12", "13", "14", "15").unwrap();
        KnackConfig::new("app-123", "secret", "7", DEFAULT_KNACK_API_URL, fields).unwrap()
    }

    #[test]
    fn test_new_builds_records_url() {
        let client = KnackClient::new(&config(), &HttpConfig::default()).unwrap();
        assert_eq!(
            client.records_url().as_str(),
            "https://api.knack.com/v1/objects/object_7/records"
        );
    }

    #[test]
    fn test_check_status_ok() {
        assert!(check_status(StatusCode::OK, r#"{"id": "abc"}"#.to_string()).is_ok());
    }

    #[test]
    fn test_check_status_created_is_rejected() {
        let result = check_status(StatusCode::CREATED, "{}".to_string());
        match result {
            Err(AppError::RecordRejected { status, body }) => {
                assert_eq!(status, 201);
                assert_eq!(body, "{}");
            }
            other => panic!("Expected AppError::RecordRejected, got {:?}", other),
        }
    }

    #[test]
    fn test_check_status_unauthorized() {
        let err = check_status(StatusCode::UNAUTHORIZED, "Invalid API key".to_string())
            .unwrap_err();
        assert!(matches!(err, AppError::RecordRejected { status: 401, .. }));
        assert!(err.user_message().contains("KNACK_API_KEY"));
    }

    #[test]
    fn test_create_request_headers_and_body() {
        let client = KnackClient::new(&config(), &HttpConfig::default()).unwrap();
        let record = serde_json::json!({
            "field_14": "CSV",
            "field_12": ["rep-1"]
        });

        let request = client
            .create_request(record.as_object().unwrap())
            .build()
            .unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.headers()[APPLICATION_ID_HEADER], "app-123");
        assert_eq!(request.headers()[API_KEY_HEADER], "secret");
        assert_eq!(
            request.headers()[reqwest::header::CONTENT_TYPE],
            "application/json"
        );

        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        let sent: Value = serde_json::from_slice(body).unwrap();
        assert_eq!(sent, record);
    }
}
