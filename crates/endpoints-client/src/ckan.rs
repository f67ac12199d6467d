use endpoints_core::config::{CkanConfig, HttpConfig};
use endpoints_core::error::AppError;
use endpoints_core::models::CkanPackage;
use endpoints_core::traits::PackageCatalog;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::http::{build_client, send_error};

/// Generic wrapper for CKAN API responses.
///
/// CKAN API reference: <https://docs.ckan.org/en/2.9/api/>
///
/// CKAN always returns responses with the structure:
/// ```json
/// {
///     "success": bool,
///     "result": T,
///     "error": { "__type": "...", "message": "..." }
/// }
/// ```
/// `result` is present on success and `error` on failure.
#[derive(Deserialize, Debug)]
struct CkanResponse<T> {
    success: bool,
    result: Option<T>,
    error: Option<CkanApiError>,
}

/// Error object of a failed CKAN action.
///
/// Validation errors carry per-field messages instead of `message`; those are
/// kept in `fields`.
#[derive(Deserialize, Debug, Default)]
struct CkanApiError {
    #[serde(rename = "__type")]
    kind: Option<String>,
    message: Option<String>,
    #[serde(flatten)]
    fields: serde_json::Map<String, Value>,
}

impl CkanApiError {
    fn describe(&self) -> String {
        let kind = self.kind.as_deref().unwrap_or("Error");
        match &self.message {
            Some(message) => format!("{}: {}", kind, message),
            None if !self.fields.is_empty() => {
                format!("{}: {}", kind, Value::Object(self.fields.clone()))
            }
            None => kind.to_string(),
        }
    }

    fn is_not_found(&self) -> bool {
        self.kind.as_deref() == Some("Not Found Error")
    }
}

/// HTTP client for reading and republishing CKAN dataset packages.
///
/// Every request carries the API key in the `Authorization` header so that
/// private datasets can be read as well as updated.
///
/// # Examples
///
/// ```no_run
/// use endpoints_client::CkanClient;
/// use endpoints_core::config::{CkanConfig, HttpConfig};
/// use endpoints_core::traits::PackageCatalog;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = CkanConfig::new("https://catalog.example.org", "api-key")?;
/// let client = CkanClient::new(&config, &HttpConfig::default())?;
/// let package = client.show_package("crime-incidents").await?;
/// println!("{} has {} resources", package.title, package.resources.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CkanClient {
    client: Client,
    base_url: Url,
    api_key: String,
    http: HttpConfig,
}

impl CkanClient {
    /// Creates a new CKAN client for the configured portal.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ClientError` if the HTTP client cannot be built.
    pub fn new(config: &CkanConfig, http: &HttpConfig) -> Result<Self, AppError> {
        // `Url::join` replaces the last path segment unless it ends with '/'.
        let mut base_url = config.host.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client: build_client(http)?,
            base_url,
            api_key: config.api_key.clone(),
            http: http.clone(),
        })
    }

    fn action_url(&self, action: &str) -> Result<Url, AppError> {
        Ok(self.base_url.join(&format!("api/3/action/{}", action))?)
    }

    fn show_request(&self, slug: &str) -> Result<RequestBuilder, AppError> {
        let mut url = self.action_url("package_show")?;
        url.query_pairs_mut().append_pair("id", slug);

        Ok(self
            .client
            .get(url)
            .header(AUTHORIZATION, &self.api_key))
    }

    fn update_request(&self, package: &CkanPackage) -> Result<RequestBuilder, AppError> {
        Ok(self
            .client
            .post(self.action_url("package_update")?)
            .header(AUTHORIZATION, &self.api_key)
            .json(package))
    }

    /// Sends a CKAN action request and unwraps the response envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        slug: &str,
    ) -> Result<T, AppError> {
        let response = request.send().await.map_err(|e| send_error(e, &self.http))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::ClientError(e.to_string()))?;

        parse_response(status, &body, slug)
    }
}

/// Turns a CKAN action response into its result or a typed error.
fn parse_response<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
    slug: &str,
) -> Result<T, AppError> {
    let envelope: CkanResponse<T> = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) if status.is_success() => return Err(AppError::SerializationError(e)),
        Err(_) => {
            return Err(AppError::ClientError(format!(
                "HTTP {} from CKAN",
                status.as_u16()
            )))
        }
    };

    if envelope.success {
        return envelope.result.ok_or_else(|| {
            AppError::CkanError("response has success: true but no result".to_string())
        });
    }

    let error = envelope.error.unwrap_or_default();
    if status == StatusCode::NOT_FOUND || error.is_not_found() {
        return Err(AppError::PackageNotFound(slug.to_string()));
    }
    Err(AppError::CkanError(error.describe()))
}

impl PackageCatalog for CkanClient {
    async fn show_package(&self, slug: &str) -> Result<CkanPackage, AppError> {
        debug!("package_show {}", slug);
        let request = self.show_request(slug)?;
        self.call(request, slug).await
    }

    async fn update_package(&self, package: &CkanPackage) -> Result<CkanPackage, AppError> {
        debug!(
            "package_update {} with {} resources",
            package.name,
            package.resources.len()
        );
        let request = self.update_request(package)?;
        self.call(request, &package.name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn client(host: &str) -> CkanClient {
        let config = CkanConfig::new(host, "ckan-key").unwrap();
        CkanClient::new(&config, &HttpConfig::default()).unwrap()
    }

    #[test]
    fn test_new_with_valid_url() {
        let client = client("https://catalog.example.org");
        assert_eq!(client.base_url.as_str(), "https://catalog.example.org/");
    }

    #[test]
    fn test_base_url_keeps_subpath() {
        let client = client("https://example.org/catalog");
        assert_eq!(
            client.action_url("package_show").unwrap().as_str(),
            "https://example.org/catalog/api/3/action/package_show"
        );
    }

    #[test]
    fn test_show_request() {
        let request = client("https://catalog.example.org")
            .show_request("crime-incidents")
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(
            request.url().as_str(),
            "https://catalog.example.org/api/3/action/package_show?id=crime-incidents"
        );
        assert_eq!(request.headers()[AUTHORIZATION], "ckan-key");
    }

    #[test]
    fn test_update_request_sends_full_package() {
        let package: CkanPackage = serde_json::from_str(
            r#"{"id": "1", "name": "parcels", "title": "Parcels",
                "notes": "n", "resources": [{"url": "https://a.example/x"}]}"#,
        )
        .unwrap();

        let request = client("https://catalog.example.org")
            .update_request(&package)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        assert!(request.url().path().ends_with("/package_update"));
        let body: Value =
            serde_json::from_slice(request.body().and_then(|b| b.as_bytes()).unwrap()).unwrap();
        assert_eq!(body["notes"], "n");
        assert_eq!(body["resources"][0]["url"], "https://a.example/x");
    }

    #[test]
    fn test_parse_success() {
        let body = r#"{"success": true, "result": {"id": "1", "name": "n", "title": "T"}}"#;
        let package: CkanPackage = parse_response(StatusCode::OK, body, "n").unwrap();
        assert_eq!(package.title, "T");
    }

    #[test]
    fn test_parse_not_found() {
        let body = r#"{"success": false, "error": {"__type": "Not Found Error", "message": "Not found"}}"#;
        let result: Result<CkanPackage, _> = parse_response(StatusCode::NOT_FOUND, body, "ghost");
        assert!(matches!(result, Err(AppError::PackageNotFound(ref s)) if s == "ghost"));
    }

    #[test]
    fn test_parse_authorization_error() {
        let body = r#"{"success": false, "error": {"__type": "Authorization Error", "message": "Access denied"}}"#;
        let result: Result<CkanPackage, _> = parse_response(StatusCode::FORBIDDEN, body, "x");
        match result {
            Err(AppError::CkanError(msg)) => {
                assert_eq!(msg, "Authorization Error: Access denied");
            }
            other => panic!("Expected AppError::CkanError, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_validation_error() {
        let body = r#"{"success": false, "error": {"__type": "Validation Error", "url": ["Missing value"]}}"#;
        let result: Result<Map<String, Value>, _> =
            parse_response(StatusCode::CONFLICT, body, "x");
        match result {
            Err(AppError::CkanError(msg)) => {
                assert!(msg.starts_with("Validation Error: "));
                assert!(msg.contains("Missing value"));
            }
            other => panic!("Expected AppError::CkanError, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_non_json_error_page() {
        let result: Result<CkanPackage, _> =
            parse_response(StatusCode::BAD_GATEWAY, "<html>502</html>", "x");
        assert!(matches!(result, Err(AppError::ClientError(ref m)) if m.contains("502")));
    }
}
