//! JSON API client

use crate::HttpClientConfig;
use async_trait::async_trait;
use incognito_core::{Error, Password, Result, SessionStatus, StatusClient, StatusOperation};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// HTTP status client
pub struct HttpStatusClient {
    base_url: Url,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct PasswordRequest<'a> {
    password: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(alias = "errorMessage", alias = "message")]
    error: String,
}

impl HttpStatusClient {
    /// Create a client for the configured backend
    pub fn new(config: &HttpClientConfig) -> Result<Self> {
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| Error::Config(format!("Invalid backend URL {}: {}", config.base_url, e)))?;

        // Backend runs alongside the UI; system proxies must not see its traffic
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .no_proxy()
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { base_url, client })
    }

    /// API root all endpoints are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, op: StatusOperation) -> Result<Url> {
        let path = match op {
            StatusOperation::Query => "incognito/status",
            StatusOperation::Enable => "incognito/enable",
            StatusOperation::Disable => "incognito/disable",
            StatusOperation::Unlock => "incognito/unlock",
            StatusOperation::Lock => "incognito/lock",
        };
        self.base_url
            .join(path)
            .map_err(|e| Error::Config(format!("Invalid endpoint {}: {}", path, e)))
    }

    async fn post(&self, op: StatusOperation, password: Option<&Password>) -> Result<()> {
        let url = self.endpoint(op)?;
        debug!("POST {}", url);

        let request = self.client.post(url);
        let request = match password {
            Some(password) => request.json(&PasswordRequest {
                password: password.expose(),
            }),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| Error::Transport(format!("{} failed: {}", op, e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_response(op, status, &body))
    }
}

/// Map a non-success HTTP response onto the error taxonomy.
///
/// 401/403 on unlock is a wrong password; 400/422 is a policy rejection;
/// everything else is a transport fault.
pub fn classify_response(op: StatusOperation, status: StatusCode, body: &str) -> Error {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|body| body.error)
        .unwrap_or_else(|_| body.trim().to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN if op == StatusOperation::Unlock => {
            Error::InvalidCredential
        }
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            if message.is_empty() {
                Error::Rejected(format!("{} rejected ({})", op, status))
            } else {
                Error::Rejected(message)
            }
        }
        _ => {
            let detail = format!("{} failed: HTTP {} {}", op, status.as_u16(), message);
            Error::Transport(detail.trim_end().to_string())
        }
    }
}

#[async_trait]
impl StatusClient for HttpStatusClient {
    async fn query_status(&self) -> Result<SessionStatus> {
        let op = StatusOperation::Query;
        let url = self.endpoint(op)?;
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("{} failed: {}", op, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_response(op, status, &body));
        }

        response
            .json::<SessionStatus>()
            .await
            .map_err(|e| Error::Transport(format!("{} returned invalid status: {}", op, e)))
    }

    async fn enable(&self, password: &Password) -> Result<()> {
        self.post(StatusOperation::Enable, Some(password)).await
    }

    async fn disable(&self) -> Result<()> {
        self.post(StatusOperation::Disable, None).await
    }

    async fn unlock(&self, password: &Password) -> Result<()> {
        self.post(StatusOperation::Unlock, Some(password)).await
    }

    async fn lock(&self) -> Result<()> {
        self.post(StatusOperation::Lock, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_unlock_is_invalid_credential() {
        let err = classify_response(StatusOperation::Unlock, StatusCode::UNAUTHORIZED, "");
        assert!(err.is_invalid_credential());

        let err = classify_response(StatusOperation::Unlock, StatusCode::FORBIDDEN, "");
        assert!(err.is_invalid_credential());
    }

    #[test]
    fn test_unauthorized_elsewhere_is_transport() {
        let err = classify_response(StatusOperation::Lock, StatusCode::UNAUTHORIZED, "");
        assert!(err.is_transport());
    }

    #[test]
    fn test_bad_request_is_rejection_with_message() {
        let err = classify_response(
            StatusOperation::Enable,
            StatusCode::BAD_REQUEST,
            r#"{"error":"password required"}"#,
        );
        assert!(matches!(err, Error::Rejected(ref m) if m == "password required"));

        let err = classify_response(
            StatusOperation::Enable,
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"errorMessage":"too short"}"#,
        );
        assert!(matches!(err, Error::Rejected(ref m) if m == "too short"));
    }

    #[test]
    fn test_server_error_is_transport() {
        let err = classify_response(
            StatusOperation::Query,
            StatusCode::INTERNAL_SERVER_ERROR,
            "boom",
        );
        assert!(err.is_transport());
        assert_eq!(err.to_string(), "Transport error: query_status failed: HTTP 500 boom");
    }

    #[test]
    fn test_endpoints_join_base() {
        let client =
            HttpStatusClient::new(&HttpClientConfig::new("http://localhost:9000/api")).unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:9000/api/");
        assert_eq!(
            client.endpoint(StatusOperation::Unlock).unwrap().as_str(),
            "http://localhost:9000/api/incognito/unlock"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpStatusClient::new(&HttpClientConfig::new("not a url")).err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }
}
