//! Authentication support for the Orchestrate SDK
//!
//! Orchestrate authenticates with HTTP Basic, using the application's API
//! key as the user name and an empty password. The SDK supports:
//!
//! 1. **API Key** - the usual case, sent as `Authorization: Basic base64(key:)`
//! 2. **Basic** - explicit user name and password, for proxies and gateways
//! 3. **Bearer Token** - for gateways in front of the service
//! 4. **Key Provider** - the API key is looked up before every request
//!
//! # Examples
//!
//! ```
//! use orchestrate_sdk::Auth;
//!
//! let auth = Auth::api_key("your-api-key");
//! let auth = Auth::basic("user", "password");
//! let auth = Auth::bearer("gateway-token");
//! ```
//!
//! ## Dynamic Key Provider
//!
//! ```
//! use orchestrate_sdk::{Auth, KeyProvider, SecretString};
//! use async_trait::async_trait;
//!
//! #[derive(Clone)]
//! struct EnvKey;
//!
//! #[async_trait]
//! impl KeyProvider for EnvKey {
//!     async fn api_key(&self) -> Result<SecretString, Box<dyn std::error::Error + Send + Sync>> {
//!         let key = std::env::var("ORCHESTRATE_API_KEY")?;
//!         Ok(SecretString::new(key))
//!     }
//!
//!     fn clone_box(&self) -> Box<dyn KeyProvider> {
//!         Box::new(self.clone())
//!     }
//! }
//!
//! let auth = Auth::key_provider(EnvKey);
//! ```

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Authentication method for the Orchestrate API
///
/// All credentials are stored using [`SecretString`] so they do not leak
/// into logs or debug output.
#[derive(Clone)]
pub enum Auth {
    /// API key, sent as HTTP Basic with an empty password
    ApiKey(SecretString),
    /// HTTP Basic with an explicit password
    Basic {
        /// User name
        username: String,
        /// Password
        password: SecretString,
    },
    /// Bearer token, sent as `Authorization: Bearer <token>`
    Bearer(SecretString),
    /// API key resolved per request
    KeyProvider(Box<dyn KeyProvider>),
}

impl Auth {
    /// Create an API key authentication
    pub fn api_key(key: impl Into<String>) -> Self {
        Auth::ApiKey(SecretString::new(key.into()))
    }

    /// Create a basic authentication with user name and password
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Auth::Basic {
            username: username.into(),
            password: SecretString::new(password.into()),
        }
    }

    /// Create a bearer token authentication
    pub fn bearer(token: impl Into<String>) -> Self {
        Auth::Bearer(SecretString::new(token.into()))
    }

    /// Create an authentication backed by a [`KeyProvider`]
    pub fn key_provider(provider: impl KeyProvider + 'static) -> Self {
        Auth::KeyProvider(Box::new(provider))
    }

    /// Get the authorization header name and value
    pub(crate) async fn get_header(
        &self,
    ) -> Result<(&'static str, String), Box<dyn std::error::Error + Send + Sync>> {
        match self {
            Auth::ApiKey(key) => Ok(("Authorization", basic_value(key.expose_secret(), ""))),
            Auth::Basic { username, password } => Ok((
                "Authorization",
                basic_value(username, password.expose_secret()),
            )),
            Auth::Bearer(token) => Ok(("Authorization", format!("Bearer {}", token.expose_secret()))),
            Auth::KeyProvider(provider) => {
                let key = provider.api_key().await?;
                Ok(("Authorization", basic_value(key.expose_secret(), "")))
            }
        }
    }
}

fn basic_value(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password)))
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::ApiKey(_) => write!(f, "Auth::ApiKey(****)"),
            Auth::Basic { username, .. } => write!(f, "Auth::Basic({}:****)", username),
            Auth::Bearer(_) => write!(f, "Auth::Bearer(****)"),
            Auth::KeyProvider(_) => write!(f, "Auth::KeyProvider(****)"),
        }
    }
}

/// Source of an API key that is looked up before every request
///
/// Useful when keys are rotated by an external secret manager.
#[async_trait]
pub trait KeyProvider: Send + Sync {
    /// Get the current API key
    ///
    /// Called once per request, so it should return quickly.
    async fn api_key(&self) -> Result<SecretString, Box<dyn std::error::Error + Send + Sync>>;

    /// Clone the provider
    ///
    /// Typically implemented as `Box::new(self.clone())`.
    fn clone_box(&self) -> Box<dyn KeyProvider>;
}

impl Clone for Box<dyn KeyProvider> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct FixedKey(&'static str);

    #[async_trait]
    impl KeyProvider for FixedKey {
        async fn api_key(&self) -> Result<SecretString, Box<dyn std::error::Error + Send + Sync>> {
            Ok(SecretString::new(self.0.to_string()))
        }

        fn clone_box(&self) -> Box<dyn KeyProvider> {
            Box::new(self.clone())
        }
    }

    #[tokio::test]
    async fn test_auth_headers() {
        // base64("key123:")
        let (header, value) = Auth::api_key("key123").get_header().await.unwrap();
        assert_eq!(header, "Authorization");
        assert_eq!(value, "Basic a2V5MTIzOg==");

        // base64("user:pass")
        let (_, value) = Auth::basic("user", "pass").get_header().await.unwrap();
        assert_eq!(value, "Basic dXNlcjpwYXNz");

        let (_, value) = Auth::bearer("token456").get_header().await.unwrap();
        assert_eq!(value, "Bearer token456");
    }

    #[tokio::test]
    async fn test_key_provider_matches_api_key() {
        let (_, from_provider) = Auth::key_provider(FixedKey("key123"))
            .get_header()
            .await
            .unwrap();
        let (_, from_key) = Auth::api_key("key123").get_header().await.unwrap();
        assert_eq!(from_provider, from_key);
    }

    #[test]
    fn test_auth_debug() {
        assert_eq!(format!("{:?}", Auth::api_key("secret")), "Auth::ApiKey(****)");
        assert_eq!(
            format!("{:?}", Auth::basic("app", "secret")),
            "Auth::Basic(app:****)"
        );
    }
}
