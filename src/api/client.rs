//! HTTP client for the rewards backend.
//!
//! JSON over HTTP with bearer authentication, a request timeout and
//! exponential-backoff retries on transient failures.

use crate::config::{ApiConfig, RetryPolicy};
use crate::error::AppError;
use reqwest::{header, Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

/// Header carrying the per-request idempotency key on POSTs.
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Rewards backend client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl ApiClient {
    /// Create a new client.
    ///
    /// `token` is sent as `Authorization: Bearer <token>` on every request.
    pub fn new(config: &ApiConfig, token: Option<&str>) -> Result<Self, AppError> {
        let base_url = config
            .base_url
            .clone()
            .ok_or_else(|| AppError::configuration("No API URL configured", "CODEQUEST_API_URL"))?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        if let Some(token) = token {
            let mut value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| AppError::authentication("Invalid token format"))?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry: config.retry.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full URL from an endpoint path.
    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET an endpoint with optional query parameters.
    pub async fn get<T, Q>(&self, endpoint: &str, query: Option<&Q>) -> Result<T, AppError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send(Method::GET, endpoint, query, None::<&()>).await
    }

    /// GET an endpoint, mapping 404 to `None`.
    pub async fn get_optional<T, Q>(
        &self,
        endpoint: &str,
        query: Option<&Q>,
    ) -> Result<Option<T>, AppError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        match self.get(endpoint, query).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.status_code() == Some(404) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn post<T, B>(&self, endpoint: &str, body: Option<&B>) -> Result<T, AppError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::POST, endpoint, None::<&()>, body).await
    }

    pub async fn put<T, B>(&self, endpoint: &str, body: &B) -> Result<T, AppError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::PUT, endpoint, None::<&()>, Some(body)).await
    }

    /// Send a request, retrying transient failures per the retry policy.
    ///
    /// POSTs carry one idempotency key for all attempts so the backend can
    /// drop duplicates of a retried write.
    async fn send<T, Q, B>(
        &self,
        method: Method,
        endpoint: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> Result<T, AppError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let url = self.api_url(endpoint);
        let idempotency_key = (method == Method::POST).then(|| Uuid::new_v4().to_string());
        let mut attempt: u32 = 0;

        loop {
            let mut request = self.client.request(method.clone(), &url);
            if let Some(query) = query {
                request = request.query(query);
            }
            if let Some(body) = body {
                request = request.json(body);
            }
            if let Some(key) = &idempotency_key {
                request = request.header(IDEMPOTENCY_HEADER, key);
            }

            let reason = match request.send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if self.retry.should_retry_status(status) && self.retry.allows_retry(attempt) {
                        format!("status {}", status)
                    } else {
                        return self.handle_response(response, endpoint).await;
                    }
                }
                Err(e) if (e.is_timeout() || e.is_connect()) && self.retry.allows_retry(attempt) => {
                    e.to_string()
                }
                Err(e) => {
                    log::error!("[api] {} {} failed: {}", method, endpoint, e);
                    return Err(e.into());
                }
            };

            let delay = self.retry.delay_for(attempt);
            attempt += 1;
            log::warn!(
                "[api] {} {} failed ({}), retry {}/{} in {:?}",
                method,
                endpoint,
                reason,
                attempt,
                self.retry.max_retries,
                delay
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Handle API response, checking for errors.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
        endpoint: &str,
    ) -> Result<T, AppError> {
        let status = response.status();

        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| AppError::internal(format!("Failed to parse response: {}", e)))
        } else if status == StatusCode::UNAUTHORIZED {
            Err(AppError::authentication_expired(
                "Session expired or token revoked. Please sign in again.",
            ))
        } else {
            let status_code = status.as_u16();
            let body = response.text().await.unwrap_or_default();
            let body_message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| {
                    // Errors come back as {"message": "..."} or {"error": "..."}
                    v.get("message").or_else(|| v.get("error")).map(|m| match m.as_str() {
                        Some(s) => s.to_string(),
                        None => m.to_string(),
                    })
                });

            let message = match (status, &body_message) {
                (StatusCode::FORBIDDEN, _) => "Access denied".to_string(),
                (StatusCode::NOT_FOUND, _) => "Resource not found".to_string(),
                (StatusCode::TOO_MANY_REQUESTS, _) => "Rate limit exceeded".to_string(),
                (_, Some(msg)) => msg.clone(),
                _ => format!("Request failed ({}): {}", status_code, body),
            };

            Err(AppError::api_full(message, status_code, endpoint))
        }
    }
}

/// Percent-encode one path segment.
pub fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> ApiConfig {
        ApiConfig {
            base_url: Some(url.to_string()),
            ..ApiConfig::default()
        }
    }

    #[test]
    fn test_api_url_construction() {
        let client = ApiClient::new(&config("https://rewards.example.com/api/"), None).unwrap();
        assert_eq!(client.base_url(), "https://rewards.example.com/api");
        assert_eq!(
            client.api_url("/users/me"),
            "https://rewards.example.com/api/users/me"
        );
    }

    #[test]
    fn test_requires_base_url() {
        let err = ApiClient::new(&ApiConfig::default(), None).unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));
    }

    #[test]
    fn test_rejects_invalid_token() {
        let err = ApiClient::new(&config("http://localhost"), Some("bad\ntoken")).unwrap_err();
        assert!(matches!(err, AppError::Authentication { .. }));
    }

    #[test]
    fn test_segment_encoding() {
        assert_eq!(segment("MR-1423"), "MR-1423");
        assert_eq!(segment("a/b c"), "a%2Fb%20c");
    }
}
