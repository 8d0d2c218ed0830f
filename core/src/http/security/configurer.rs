//! Application-provided security configuration.
//!
//! # Spring Security Equivalent
//! `SecurityFilterChain` beans / `WebSecurityConfigurerAdapter`

use crate::http::error::SecurityInitError;
use crate::http::security::web::WebSecurity;

/// Configures one `WebSecurity`.
///
/// Every registered configurer gets its own `WebSecurity`. Configurers with
/// an [`order`](Configurer::order) run first, lowest value first.
pub trait Configurer: Send + Sync {
    fn configure(&self, ws: &mut WebSecurity) -> Result<(), SecurityInitError>;

    fn order(&self) -> Option<i32> {
        None
    }

    /// Name of the `WebSecurity`, used to qualify its mapping names.
    fn name(&self) -> Option<&str> {
        None
    }
}

/// Configurer backed by a closure.
pub struct ConfigurerFn<F> {
    f: F,
    order: Option<i32>,
    name: Option<String>,
}

/// Wraps a closure as a [`Configurer`].
///
/// # Example
/// ```
/// use actix_websecurity_core::http::security::basic_auth::BasicAuthFeature;
/// use actix_websecurity_core::http::security::configurer::configurer_fn;
///
/// let configurer = configurer_fn(|ws| {
///     ws.with(BasicAuthFeature::new());
///     Ok(())
/// })
/// .with_name("api")
/// .with_order(10);
/// ```
pub fn configurer_fn<F>(f: F) -> ConfigurerFn<F>
where
    F: Fn(&mut WebSecurity) -> Result<(), SecurityInitError> + Send + Sync,
{
    ConfigurerFn {
        f,
        order: None,
        name: None,
    }
}

impl<F> ConfigurerFn<F> {
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl<F> Configurer for ConfigurerFn<F>
where
    F: Fn(&mut WebSecurity) -> Result<(), SecurityInitError> + Send + Sync,
{
    fn configure(&self, ws: &mut WebSecurity) -> Result<(), SecurityInitError> {
        (self.f)(ws)
    }

    fn order(&self) -> Option<i32> {
        self.order
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
