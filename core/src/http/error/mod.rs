//! Error types.
//!
//! - [`AuthenticationError`] / [`AccessDeniedError`]: per-request failures,
//!   rendered as HTTP responses.
//! - [`SecurityInitError`] and friends: configuration failures raised while
//!   the security initializer runs. These are fatal to startup.

mod auth_error;
mod init_error;

pub use auth_error::{AccessDeniedError, AuthenticationError};
pub use init_error::{BindError, MatchError, RegistrationError, SecurityInitError};
