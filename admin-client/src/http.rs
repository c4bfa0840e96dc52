//! HTTP client for the backend REST API

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CACHE_CONTROL, PRAGMA};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::query::{BackendEnvelope, Pagination, QueryRequest, QueryResponse};
use shared::session::{BackendLoginData, LoginRequest};

use crate::{ClientConfig, ClientError, ClientResult, FetchError};

/// HTTP client for making requests to the backend
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the current token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// 所有请求都禁用缓存，并附带 Bearer 令牌
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut request = self
            .client
            .request(method, self.url(path))
            .header(CACHE_CONTROL, "no-cache, no-store")
            .header(PRAGMA, "no-cache");

        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        request
    }

    /// Send a request and unwrap the backend envelope
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> ClientResult<BackendEnvelope<T>> {
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Handle the HTTP response
    ///
    /// Non-success statuses and `success: false` envelopes both become
    /// [`FetchError`]; the backend error body is parsed when present.
    async fn handle_response<T: DeserializeOwned>(
        response: Response,
    ) -> ClientResult<BackendEnvelope<T>> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let backend = serde_json::from_str::<BackendEnvelope<Value>>(&text)
                .ok()
                .and_then(|env| env.error);
            let reason = status.canonical_reason().unwrap_or("Unknown");

            let (code, detail_message, details) = match backend {
                Some(err) => (err.code, err.message, err.details),
                None => (None, None, None),
            };
            let message = match detail_message {
                Some(msg) => format!("Request failed: {} {}: {}", status.as_u16(), reason, msg),
                None => format!("Request failed: {} {}", status.as_u16(), reason),
            };

            return Err(FetchError {
                code: code.unwrap_or_else(|| format!("HTTP_{}", status.as_u16())),
                message,
                status_code: status.as_u16(),
                details,
            }
            .into());
        }

        // 204 / 空响应体
        if text.trim().is_empty() {
            return Ok(BackendEnvelope {
                success: true,
                data: None,
                pagination: None,
                error: None,
            });
        }

        let envelope: BackendEnvelope<T> = serde_json::from_str(&text)?;
        if !envelope.success {
            let err = envelope.error.unwrap_or_default();
            return Err(FetchError {
                code: err.code.unwrap_or_else(|| "UNKNOWN".to_string()),
                message: err
                    .message
                    .unwrap_or_else(|| "Backend reported failure".to_string()),
                status_code: status.as_u16(),
                details: err.details,
            }
            .into());
        }

        Ok(envelope)
    }

    fn require_data<T>(envelope: BackendEnvelope<T>, what: &str) -> ClientResult<T> {
        envelope
            .data
            .ok_or_else(|| ClientError::InvalidResponse(format!("Missing {} data", what)))
    }

    // ========== Table API ==========

    /// One page of records: `GET {endpoint}?cursor=..&limit=..`
    pub async fn query(&self, endpoint: &str, request: &QueryRequest) -> ClientResult<QueryResponse> {
        let pairs = request.to_query_pairs();
        let envelope = self
            .send::<Vec<Value>>(self.request(Method::GET, endpoint).query(&pairs))
            .await?;

        let pagination = envelope.pagination.clone();
        let data = Self::require_data(envelope, "page")?;
        // 后端未返回分页信息时视为单页
        let pagination = pagination.unwrap_or_else(|| Pagination::single_page(data.len() as u64));

        Ok(QueryResponse::new(data, pagination))
    }

    // ========== Records API ==========

    /// `POST {endpoint}`
    pub async fn create_record<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        record: &B,
    ) -> ClientResult<Value> {
        let envelope = self
            .send::<Value>(self.request(Method::POST, endpoint).json(record))
            .await?;
        Ok(envelope.data.unwrap_or(Value::Null))
    }

    /// `PUT {endpoint}/{id}`
    pub async fn update_record<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        id: &str,
        record: &B,
    ) -> ClientResult<Value> {
        let path = format!("{}/{}", endpoint.trim_end_matches('/'), id);
        let envelope = self
            .send::<Value>(self.request(Method::PUT, &path).json(record))
            .await?;
        Ok(envelope.data.unwrap_or(Value::Null))
    }

    /// `DELETE {endpoint}/{id}`
    pub async fn delete_record(&self, endpoint: &str, id: &str) -> ClientResult<()> {
        let path = format!("{}/{}", endpoint.trim_end_matches('/'), id);
        self.send::<Value>(self.request(Method::DELETE, &path))
            .await?;
        Ok(())
    }

    // ========== Auth API ==========

    /// Verify credentials against the backend: `POST /auth/login`
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<BackendLoginData> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let envelope = self
            .send::<BackendLoginData>(self.request(Method::POST, "/auth/login").json(&request))
            .await?;
        Self::require_data(envelope, "login")
    }
}
