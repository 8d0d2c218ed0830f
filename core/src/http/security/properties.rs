//! Externalized security configuration.
//!
//! Property structs are plain serde values; a [`PropertyBinder`] fills them
//! from a configuration source under a key prefix.
//!
//! ```toml
//! [security]
//! strict_features = true
//!
//! [security.basic_auth]
//! realm = "api"
//!
//! [security.logout]
//! logout_url = "/signout"
//! ```

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::http::error::BindError;

/// Binds configuration values found under a prefix to a typed value.
pub trait PropertyBinder {
    fn bind<T: DeserializeOwned>(&self, prefix: &str) -> Result<T, BindError>;

    /// Like [`bind`](PropertyBinder::bind), but a missing prefix yields
    /// `T::default()`.
    fn bind_or_default<T: DeserializeOwned + Default>(&self, prefix: &str) -> Result<T, BindError> {
        match self.bind(prefix) {
            Err(BindError::NotFound { .. }) => Ok(T::default()),
            other => other,
        }
    }
}

/// [`PropertyBinder`] over a [`config::Config`].
#[derive(Debug, Clone)]
pub struct ConfigPropertyBinder {
    config: config::Config,
}

impl ConfigPropertyBinder {
    pub fn new(config: config::Config) -> Self {
        ConfigPropertyBinder { config }
    }
}

impl From<config::Config> for ConfigPropertyBinder {
    fn from(config: config::Config) -> Self {
        Self::new(config)
    }
}

impl PropertyBinder for ConfigPropertyBinder {
    fn bind<T: DeserializeOwned>(&self, prefix: &str) -> Result<T, BindError> {
        self.config.get::<T>(prefix).map_err(|e| match e {
            config::ConfigError::NotFound(_) => BindError::NotFound {
                prefix: prefix.to_string(),
            },
            other => BindError::Invalid {
                prefix: prefix.to_string(),
                reason: other.to_string(),
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BasicAuthProperties {
    pub realm: String,
    /// Challenge unauthenticated requests with `WWW-Authenticate`.
    pub entry_point: bool,
}

impl Default for BasicAuthProperties {
    fn default() -> Self {
        BasicAuthProperties {
            realm: "Restricted".to_string(),
            entry_point: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogoutProperties {
    pub logout_url: String,
    pub success_url: String,
    pub error_url: Option<String>,
}

impl Default for LogoutProperties {
    fn default() -> Self {
        LogoutProperties {
            logout_url: "/logout".to_string(),
            success_url: "/login".to_string(),
            error_url: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SecurityProperties {
    pub basic_auth: BasicAuthProperties,
    pub logout: LogoutProperties,
    /// Reject a feature registered twice instead of replacing it.
    pub strict_features: bool,
}

impl SecurityProperties {
    pub const PREFIX: &'static str = "security";

    pub fn bind(binder: &impl PropertyBinder) -> Result<Self, BindError> {
        binder.bind_or_default(Self::PREFIX)
    }
}
