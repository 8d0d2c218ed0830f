//! Declarative web security.
//!
//! # Spring Equivalent
//! `org.springframework.security.config.annotation.web` package
//!
//! # Module Structure
//!
//! - `initializer` - One-time assembly of configurers into mappings (Initializer)
//! - `configurer` - Route scoped security declarations (Configurer)
//! - `web` - Per-configurer build context (WebSecurity)
//! - `feature` - Pluggable feature contract (Feature, FeatureConfigurer)
//! - `mapping` - Middleware, endpoint and pre-processor mappings
//! - `registrar` - Collects mappings into a `SecurityChain`
//! - `middleware` - The Actix middleware running the chain
//! - `matcher`, `route`, `request` - Composable predicates
//! - `authentication`, `candidate` - What is being and has been authenticated
//! - `authenticator` - Composite authentication
//! - `password`, `account`, `crypto` - Username/password authentication
//! - `handler` - Success, error and access denied handlers
//! - `extractor` - Actix Web extractors (CurrentAuthentication, AuthenticatedPrincipal)
//! - `basic_auth`, `token_auth`, `anonymous`, `access`, `logout`,
//!   `error_handling` - Built-in features
//! - `properties` - Externalized configuration
//!
//! # Feature Flags
//! - `argon2`: Enables `Argon2PasswordEncoder`

// Re-exports for convenience
pub use access::{Access, AccessControlFeature};
pub use anonymous::AnonymousFeature;
pub use authentication::{Authentication, AuthenticationState, Permissions};
pub use authenticator::{AnonymousAuthenticator, Authenticator, AuthenticatorRef, CompositeAuthenticator};
pub use basic_auth::BasicAuthFeature;
pub use candidate::Candidate;
pub use configurer::{configurer_fn, Configurer};
#[cfg(feature = "argon2")]
pub use crypto::Argon2PasswordEncoder;
pub use crypto::{NoOpPasswordEncoder, PasswordEncoder};
pub use error_handling::ErrorHandlingFeature;
pub use extractor::{AuthenticatedPrincipal, CurrentAuthentication, SecurityExt};
pub use feature::{Feature, FeatureConfigurer, FeatureIdentifier};
pub use initializer::{Initializer, InitializerState};
pub use logout::LogoutFeature;
pub use mapping::{Flow, Mapping, RouteRegistrar};
pub use matcher::{Matcher, MatcherExt, MatcherRef};
pub use middleware::SecurityChain;
pub use password::PasswordAuthenticator;
pub use properties::{ConfigPropertyBinder, PropertyBinder, SecurityProperties};
pub use registrar::SecurityRegistrar;
pub use route::Route;
pub use token_auth::TokenAuthFeature;
pub use web::WebSecurity;

pub mod access;
pub mod account;
pub mod anonymous;
pub mod authentication;
pub mod authenticator;
pub mod basic_auth;
pub mod candidate;
pub mod configurer;
pub mod crypto;
pub mod error_handling;
pub mod extractor;
pub mod feature;
pub mod handler;
pub mod initializer;
pub mod logout;
pub mod mapping;
pub mod matcher;
pub mod middleware;
pub mod order;
pub mod password;
pub mod properties;
pub mod registrar;
pub mod request;
pub mod route;
pub mod token_auth;
pub mod web;
