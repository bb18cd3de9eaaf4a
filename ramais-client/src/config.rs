//! Client configuration

use std::time::Duration;

/// Default API base path
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
/// Cookie the server stores the anti-forgery token in
pub const DEFAULT_CSRF_COOKIE: &str = "csrftoken";
/// Header the token is echoed back in
pub const DEFAULT_CSRF_HEADER: &str = "X-CSRFToken";

/// Client configuration for connecting to the directory API
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | RAMAIS_API_BASE | http://localhost:8000/api | API base path |
/// | RAMAIS_TIMEOUT_SECS | 30 | Request timeout |
/// | RAMAIS_CSRF_COOKIE | csrftoken | CSRF cookie name |
/// | RAMAIS_CSRF_HEADER | X-CSRFToken | CSRF header name |
/// | RAMAIS_NOTICE_TTL_MS | 5000 | How long a notice stays visible |
/// | RAMAIS_FILTER_SETTLE_MS | 300 | Quiet period before a filter reload |
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL (e.g., "http://localhost:8000/api")
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Name of the cookie holding the CSRF token
    pub csrf_cookie: String,

    /// Name of the request header carrying the CSRF token
    pub csrf_header: String,

    /// Lifetime of a user-facing notice
    pub notice_ttl: Duration,

    /// Quiet period after the last filter change before reloading
    pub filter_settle: Duration,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: 30,
            csrf_cookie: DEFAULT_CSRF_COOKIE.to_string(),
            csrf_header: DEFAULT_CSRF_HEADER.to_string(),
            notice_ttl: Duration::from_millis(5000),
            filter_settle: Duration::from_millis(300),
        }
    }

    /// Load configuration from environment variables
    ///
    /// Unset or unparseable variables fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::new(DEFAULT_BASE_URL);
        Self {
            base_url: std::env::var("RAMAIS_API_BASE").unwrap_or(defaults.base_url),
            timeout: std::env::var("RAMAIS_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout),
            csrf_cookie: std::env::var("RAMAIS_CSRF_COOKIE").unwrap_or(defaults.csrf_cookie),
            csrf_header: std::env::var("RAMAIS_CSRF_HEADER").unwrap_or(defaults.csrf_header),
            notice_ttl: std::env::var("RAMAIS_NOTICE_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.notice_ttl),
            filter_settle: std::env::var("RAMAIS_FILTER_SETTLE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.filter_settle),
        }
    }

    /// Set the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the CSRF cookie and header names
    pub fn with_csrf(mut self, cookie: impl Into<String>, header: impl Into<String>) -> Self {
        self.csrf_cookie = cookie.into();
        self.csrf_header = header.into();
        self
    }

    /// Set how long notices stay visible
    pub fn with_notice_ttl(mut self, ttl: Duration) -> Self {
        self.notice_ttl = ttl;
        self
    }

    /// Set the filter debounce period
    pub fn with_filter_settle(mut self, settle: Duration) -> Self {
        self.filter_settle = settle;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
