//! Authenticated-request client
//!
//! Every call to the directory API goes through [`HttpClient::send`]. The
//! network implementation keeps a cookie jar for the session cookie and
//! echoes the CSRF cookie back as a header on every request.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{ClientConfig, ClientError, ClientResult};

/// A request relative to the API base path
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below the base URL, e.g. `funcionarios/42/`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Extra headers; these replace the defaults on name clash
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    /// POST without a body
    pub fn post_empty(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Response status plus a best-effort JSON body
///
/// The body is an empty object when the payload is empty or not JSON
/// (e.g. `204 No Content`).
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    /// Build from raw bytes, falling back to `{}` on parse failure
    pub fn from_bytes(status: StatusCode, bytes: &[u8]) -> Self {
        let body = serde_json::from_slice(bytes).unwrap_or_else(|_| Value::Object(Map::new()));
        Self { status, body }
    }

    /// Whether the status is 2xx
    pub fn is_ok(&self) -> bool {
        self.status.is_success()
    }

    /// Deserialize the body
    pub fn parse<T: DeserializeOwned>(&self) -> ClientResult<T> {
        serde_json::from_value(self.body.clone())
            .map_err(|e| ClientError::InvalidResponse(format!("{}: {}", self.status, e)))
    }
}

/// HTTP client trait
///
/// Implementations must not retry and must not turn a non-2xx status into
/// an error; only transport failures are `Err`.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(&self, request: ApiRequest) -> ClientResult<RawResponse>;
}

/// Network HTTP client backed by reqwest
#[derive(Debug, Clone)]
pub struct NetworkHttpClient {
    client: Client,
    jar: Arc<Jar>,
    base: String,
    base_url: Url,
    csrf_cookie: String,
    csrf_header: HeaderName,
}

impl NetworkHttpClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let base = config.base_url.trim_end_matches('/').to_string();
        let base_url = Url::parse(&format!("{}/", base))
            .map_err(|e| ClientError::Url(format!("{}: {}", base, e)))?;
        let csrf_header = HeaderName::from_bytes(config.csrf_header.as_bytes())
            .map_err(|e| ClientError::Config(format!("invalid CSRF header name: {}", e)))?;

        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(jar.clone())
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            jar,
            base,
            base_url,
            csrf_cookie: config.csrf_cookie.clone(),
            csrf_header,
        })
    }

    /// Base URL without the trailing slash
    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    /// Current CSRF token from the cookie jar, empty if the server has not
    /// issued one yet
    pub fn csrf_token(&self) -> String {
        let Some(header) = self.jar.cookies(&self.base_url) else {
            return String::new();
        };
        let Ok(raw) = header.to_str() else {
            return String::new();
        };
        raw.split(';')
            .map(str::trim)
            .find_map(|pair| {
                pair.strip_prefix(self.csrf_cookie.as_str())
                    .and_then(|rest| rest.strip_prefix('='))
            })
            .map(|value| {
                urlencoding::decode(value)
                    .map(|v| v.into_owned())
                    .unwrap_or_else(|_| value.to_string())
            })
            .unwrap_or_default()
    }

    fn headers(&self, extra: &[(String, String)]) -> ClientResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let token = HeaderValue::from_str(&self.csrf_token())
            .unwrap_or_else(|_| HeaderValue::from_static(""));
        headers.insert(self.csrf_header.clone(), token);

        for (name, value) in extra {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ClientError::Config(format!("invalid header name {}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ClientError::Config(format!("invalid header value: {}", e)))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl HttpClient for NetworkHttpClient {
    async fn send(&self, request: ApiRequest) -> ClientResult<RawResponse> {
        let url = self.url(&request.path);
        let mut req = self
            .client
            .request(request.method.clone(), &url)
            .headers(self.headers(&request.headers)?);
        if !request.query.is_empty() {
            req = req.query(&request.query);
        }
        if let Some(body) = &request.body {
            req = req.body(serde_json::to_vec(body)?);
        }

        let response = req.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            status = status.as_u16(),
            "API call"
        );
        Ok(RawResponse::from_bytes(status, &bytes))
    }
}
