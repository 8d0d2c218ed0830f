//! Request matchers, used as `WebSecurity` conditions.
//!
//! # Spring Equivalent
//! `RequestMatcher`

use std::sync::Arc;

use actix_web::dev::ServiceRequest;
use actix_web::http::Method;

use crate::http::error::MatchError;
use crate::http::security::matcher::{Matcher, MatcherRef};
use crate::http::security::route::PathPattern;

struct PathMatcher(PathPattern);

impl Matcher<ServiceRequest> for PathMatcher {
    fn matches(&self, req: &ServiceRequest) -> Result<bool, MatchError> {
        Ok(self.0.is_match(req.path()))
    }
}

struct MethodMatcher(Method);

impl Matcher<ServiceRequest> for MethodMatcher {
    fn matches(&self, req: &ServiceRequest) -> Result<bool, MatchError> {
        Ok(*req.method() == self.0)
    }
}

struct HeaderMatcher {
    name: String,
    value: Option<String>,
}

impl Matcher<ServiceRequest> for HeaderMatcher {
    fn matches(&self, req: &ServiceRequest) -> Result<bool, MatchError> {
        let Some(header) = req.headers().get(self.name.as_str()) else {
            return Ok(false);
        };
        let Some(expected) = &self.value else {
            return Ok(true);
        };
        let actual = header
            .to_str()
            .map_err(|e| MatchError::malformed(format!("header {}", self.name), e.to_string()))?;
        Ok(actual == expected)
    }
}

struct QueryParamMatcher(String);

impl Matcher<ServiceRequest> for QueryParamMatcher {
    fn matches(&self, req: &ServiceRequest) -> Result<bool, MatchError> {
        Ok(req
            .query_string()
            .split('&')
            .filter_map(|pair| pair.split('=').next())
            .any(|key| key == self.0))
    }
}

/// Matches requests whose path matches an Ant-style pattern.
pub fn path(pattern: &str) -> Result<MatcherRef<ServiceRequest>, regex::Error> {
    Ok(Arc::new(PathMatcher(PathPattern::new(pattern)?)))
}

pub fn method(method: Method) -> MatcherRef<ServiceRequest> {
    Arc::new(MethodMatcher(method))
}

/// Matches requests carrying the header, whatever its value.
pub fn header(name: impl Into<String>) -> MatcherRef<ServiceRequest> {
    Arc::new(HeaderMatcher {
        name: name.into(),
        value: None,
    })
}

/// Matches requests whose header equals `value`.
///
/// A header value that is not visible ASCII is reported as a [`MatchError`].
pub fn header_value(name: impl Into<String>, value: impl Into<String>) -> MatcherRef<ServiceRequest> {
    Arc::new(HeaderMatcher {
        name: name.into(),
        value: Some(value.into()),
    })
}

pub fn query_param(name: impl Into<String>) -> MatcherRef<ServiceRequest> {
    Arc::new(QueryParamMatcher(name.into()))
}
