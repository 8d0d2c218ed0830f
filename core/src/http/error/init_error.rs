use derive_more::{Display, Error};

/// Configuration error raised while registering or initializing security.
///
/// Every variant is fatal: the initializer has no partial or degraded mode.
#[derive(Debug, Display, Error)]
pub enum SecurityInitError {
    #[display("cannot {action}: security already initialized")]
    AlreadyInitialized { action: &'static str },

    #[display("cannot {action}: security already started initializing")]
    AlreadyInitializing { action: &'static str },

    #[display("security initializer cannot be initialized twice")]
    InitializeCalledTwice,

    #[display("unable to build security feature [{feature}]: no FeatureConfigurer found")]
    UnresolvedFeature { feature: String },

    #[display("FeatureConfigurer for [{feature}] is already registered")]
    DuplicateFeature { feature: String },

    #[display("FeatureConfigurer received feature [{feature}], expected {expected}")]
    UnexpectedFeature {
        feature: String,
        expected: &'static str,
    },

    #[display("invalid security feature [{feature}]: {reason}")]
    InvalidFeature { feature: String, reason: String },

    #[display("WebSecurity [{web_security}] is configured more than once")]
    DuplicateWebSecurity { web_security: String },

    #[display("no middleware were configured for WebSecurity [{web_security}]")]
    NoMiddleware { web_security: String },

    #[display("security configurer [{configurer}] failed: {reason}")]
    Configure { configurer: String, reason: String },

    #[display("unable to register security mapping: {source}")]
    Registration { source: RegistrationError },

    #[display("unable to bind security properties: {source}")]
    Binding { source: BindError },
}

impl SecurityInitError {
    pub fn invalid_feature(feature: impl ToString, reason: impl ToString) -> Self {
        SecurityInitError::InvalidFeature {
            feature: feature.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<RegistrationError> for SecurityInitError {
    fn from(source: RegistrationError) -> Self {
        SecurityInitError::Registration { source }
    }
}

impl From<BindError> for SecurityInitError {
    fn from(source: BindError) -> Self {
        SecurityInitError::Binding { source }
    }
}

/// Failure reported by a route registrar.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum RegistrationError {
    #[display("endpoint {method} {path} is already mapped by [{existing}]")]
    EndpointConflict {
        method: String,
        path: String,
        existing: String,
    },

    #[display("mapping [{name}] rejected: {reason}")]
    Rejected { name: String, reason: String },
}

/// Failure while binding configuration properties.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum BindError {
    #[display("no properties found under [{prefix}]")]
    NotFound { prefix: String },

    #[display("invalid properties under [{prefix}]: {reason}")]
    Invalid { prefix: String, reason: String },
}

/// A matcher could not inspect its subject.
///
/// Callers treat the subject as not matched; the error is kept for logging.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum MatchError {
    #[display("malformed {what}: {reason}")]
    Malformed { what: String, reason: String },
}

impl MatchError {
    pub fn malformed(what: impl Into<String>, reason: impl Into<String>) -> Self {
        MatchError::Malformed {
            what: what.into(),
            reason: reason.into(),
        }
    }
}
