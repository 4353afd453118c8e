use crate::{auth::Auth, errors::Result, telemetry::TelemetryConfig, Error};
use std::time::Duration;

/// Environment variable holding the API key
pub const ENV_API_KEY: &str = "ORCHESTRATE_API_KEY";

/// Environment variable overriding the base URL
pub const ENV_BASE_URL: &str = "ORCHESTRATE_URL";

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the service, including the API version
    pub base_url: String,
    /// Authentication configuration
    pub auth: Auth,
    /// Request timeout
    pub timeout: Duration,
    /// User agent suffix
    pub user_agent_suffix: Option<String>,
    /// Telemetry configuration
    pub telemetry_config: TelemetryConfig,
    /// Allow plain HTTP base URLs
    pub allow_insecure_http: bool,
}

/// Builder for creating a configured Client
///
/// ```no_run
/// use orchestrate_sdk::{Auth, ClientBuilder};
///
/// # fn example() -> orchestrate_sdk::Result<()> {
/// let client = ClientBuilder::new()
///     .auth(Auth::api_key("your-api-key"))
///     .timeout_ms(10_000)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: String,
    auth: Option<Auth>,
    timeout_ms: u64,
    user_agent_suffix: Option<String>,
    telemetry_config: TelemetryConfig,
    allow_insecure_http: bool,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    /// Create a new client builder pointing at the hosted service
    pub fn new() -> Self {
        Self {
            base_url: crate::DEFAULT_BASE_URL.to_string(),
            auth: None,
            timeout_ms: crate::DEFAULT_TIMEOUT_MS,
            user_agent_suffix: None,
            telemetry_config: TelemetryConfig::default(),
            allow_insecure_http: false,
        }
    }

    /// Create a builder from `ORCHESTRATE_API_KEY` and, if set, `ORCHESTRATE_URL`
    pub fn from_env() -> Result<Self> {
        let key = std::env::var(ENV_API_KEY)
            .map_err(|_| Error::Config(format!("{} is not set", ENV_API_KEY)))?;

        let mut builder = Self::new().api_key(key);
        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            builder = builder.base_url(url);
        }
        Ok(builder)
    }

    /// Override the base URL (e.g. a regional data center or a local mock)
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the authentication method
    pub fn auth(mut self, auth: Auth) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Shorthand for `.auth(Auth::api_key(key))`
    pub fn api_key(self, key: impl Into<String>) -> Self {
        self.auth(Auth::api_key(key))
    }

    /// Set the request timeout in milliseconds
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Add a custom user agent suffix
    pub fn user_agent_extra(mut self, suffix: impl Into<String>) -> Self {
        self.user_agent_suffix = Some(suffix.into());
        self
    }

    /// Configure telemetry/metrics
    #[cfg(feature = "metrics")]
    pub fn with_telemetry(mut self, config: TelemetryConfig) -> Self {
        self.telemetry_config = config;
        self
    }

    /// Enable telemetry with default settings
    #[cfg(feature = "metrics")]
    pub fn enable_telemetry(mut self) -> Self {
        self.telemetry_config.enabled = true;
        self
    }

    /// Allow `http://` base URLs, for local gateways and test servers
    pub fn allow_insecure_http(mut self) -> Self {
        self.allow_insecure_http = true;
        self
    }

    /// Build the client with the configured options
    pub fn build(self) -> Result<crate::Client> {
        let url = self.base_url.trim_end_matches('/');

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(Error::Config(
                "Base URL must start with http:// or https://".to_string(),
            ));
        }

        if url.starts_with("http://") && !self.allow_insecure_http {
            return Err(Error::Config(
                "HTTP URLs are not allowed by default. Use .allow_insecure_http() to enable"
                    .to_string(),
            ));
        }

        let auth = self.auth.ok_or_else(|| {
            Error::Config(
                "Authentication is required. Use .api_key() or .auth() to set it".to_string(),
            )
        })?;

        let config = ClientConfig {
            base_url: url.to_string(),
            auth,
            timeout: Duration::from_millis(self.timeout_ms),
            user_agent_suffix: self.user_agent_suffix,
            telemetry_config: self.telemetry_config,
            allow_insecure_http: self.allow_insecure_http,
        };

        crate::client::Client::new(config)
    }
}
