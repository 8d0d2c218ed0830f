//! # Actix WebSecurity Core
//!
//! Declarative web security for Actix Web: route-scoped security
//! configurers, pluggable features, composite authentication and a
//! one-time initializer that turns all of it into middleware and endpoint
//! mappings.
//!
//! The main functionality lives in [`http::security`]; error types are in
//! [`http::error`].

pub mod http;
