//! Security features.
//!
//! A [`Feature`] is a bag of settings attached to a `WebSecurity`
//! (e.g. "HTTP Basic with realm X"). It has no behavior of its own: the
//! [`FeatureConfigurer`] registered for its [`FeatureIdentifier`] turns it
//! into handlers and middleware when the `WebSecurity` is built.
//!
//! # Spring Security Equivalent
//! `SecurityConfigurer` / `AbstractHttpConfigurer`

use std::any::Any;
use std::fmt;

use crate::http::error::SecurityInitError;
use crate::http::security::web::WebSecurity;

/// Identifies a feature type. Features of one `WebSecurity` are applied in
/// ascending `order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeatureIdentifier {
    name: &'static str,
    order: i32,
}

impl FeatureIdentifier {
    pub const fn new(name: &'static str, order: i32) -> Self {
        FeatureIdentifier { name, order }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn order(&self) -> i32 {
        self.order
    }
}

impl fmt::Display for FeatureIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

pub trait Feature: Any + Send + Sync {
    fn identifier(&self) -> FeatureIdentifier;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Applies one kind of feature to a `WebSecurity`.
///
/// Called at most once per `WebSecurity`.
pub trait FeatureConfigurer: Send + Sync {
    fn apply(&self, feature: &dyn Feature, web_security: &mut WebSecurity) -> Result<(), SecurityInitError>;
}

/// Downcasts a feature to its concrete type.
///
/// Fails with [`SecurityInitError::UnexpectedFeature`] when the configurer
/// registered for an identifier receives a foreign feature type.
pub fn downcast_feature<F: Feature>(feature: &dyn Feature) -> Result<&F, SecurityInitError> {
    feature
        .as_any()
        .downcast_ref::<F>()
        .ok_or_else(|| SecurityInitError::UnexpectedFeature {
            feature: feature.identifier().name().to_string(),
            expected: std::any::type_name::<F>(),
        })
}

/// Implements [`Feature`] for a type with an associated `IDENTIFIER` const.
#[macro_export]
macro_rules! impl_feature {
    ($feature:ty) => {
        impl $crate::http::security::feature::Feature for $feature {
            fn identifier(&self) -> $crate::http::security::feature::FeatureIdentifier {
                <$feature>::IDENTIFIER
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }
        }
    };
}
