//! Route matchers.
//!
//! A [`Route`] is the (method, path) pair a security middleware is mapped
//! against. Paths are matched with Ant-style patterns:
//!
//! - `?` matches exactly one character
//! - `*` matches zero or more characters within a path segment
//! - `**` matches zero or more path segments
//! - `{name}` captures a named path variable
//!
//! # Spring Equivalent
//! `AntPathRequestMatcher`
//!
//! # Example
//! ```
//! use actix_websecurity_core::http::security::route::{PathPattern, Route};
//! use actix_web::http::Method;
//!
//! let pattern = PathPattern::new("/api/**").unwrap();
//! assert!(pattern.is_match("/api"));
//! assert!(pattern.is_match("/api/users/123"));
//! assert!(!pattern.is_match("/apis"));
//!
//! let users = PathPattern::new("/users/{id}/profile").unwrap();
//! let vars = users.extract_variables("/users/42/profile").unwrap();
//! assert_eq!(vars.get("id").map(String::as_str), Some("42"));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use actix_web::dev::ServiceRequest;
use actix_web::http::Method;
use regex::Regex;

use crate::http::error::MatchError;
use crate::http::security::matcher::{Matcher, MatcherRef};

/// The subject of route matchers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    method: Method,
    path: String,
}

impl Route {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Route {
            method,
            path: path.into(),
        }
    }

    pub fn from_request(req: &ServiceRequest) -> Self {
        Route::new(req.method().clone(), req.path())
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// A compiled Ant-style path pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
    pattern: String,
    regex: Regex,
}

impl PathPattern {
    /// Compiles the pattern. Fails when a `{name}` variable is not a valid
    /// identifier.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&Self::to_regex(pattern))?;
        Ok(PathPattern {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Returns the captured `{name}` variables when the path matches.
    pub fn extract_variables(&self, path: &str) -> Option<HashMap<String, String>> {
        let captures = self.regex.captures(path)?;
        Some(
            self.regex
                .capture_names()
                .flatten()
                .filter_map(|name| {
                    captures
                        .name(name)
                        .map(|m| (name.to_string(), m.as_str().to_string()))
                })
                .collect(),
        )
    }

    fn to_regex(pattern: &str) -> String {
        let mut regex = String::from("^");
        for segment in pattern.split('/').filter(|s| !s.is_empty()) {
            if segment == "**" {
                regex.push_str("(?:/[^/]*)*");
                continue;
            }
            regex.push('/');
            if segment.starts_with('{') && segment.ends_with('}') && segment.len() > 2 {
                regex.push_str(&format!("(?P<{}>[^/]+)", &segment[1..segment.len() - 1]));
                continue;
            }
            for ch in segment.chars() {
                match ch {
                    '*' => regex.push_str("[^/]*"),
                    '?' => regex.push_str("[^/]"),
                    other => regex.push_str(&regex::escape(&other.to_string())),
                }
            }
        }
        regex.push_str("/?$");
        regex
    }
}

impl Matcher<Route> for PathPattern {
    fn matches(&self, subject: &Route) -> Result<bool, MatchError> {
        Ok(self.is_match(subject.path()))
    }
}

struct MethodMatcher(Method);

impl Matcher<Route> for MethodMatcher {
    fn matches(&self, subject: &Route) -> Result<bool, MatchError> {
        Ok(subject.method() == &self.0)
    }
}

struct PrefixMatcher(String);

impl Matcher<Route> for PrefixMatcher {
    fn matches(&self, subject: &Route) -> Result<bool, MatchError> {
        Ok(subject.path().starts_with(&self.0))
    }
}

/// Route matcher for an Ant-style path pattern.
pub fn path(pattern: &str) -> Result<MatcherRef<Route>, regex::Error> {
    Ok(Arc::new(PathPattern::new(pattern)?))
}

/// Route matcher for a plain path prefix.
pub fn path_prefix(prefix: impl Into<String>) -> MatcherRef<Route> {
    Arc::new(PrefixMatcher(prefix.into()))
}

/// Route matcher for an HTTP method.
pub fn method(method: Method) -> MatcherRef<Route> {
    Arc::new(MethodMatcher(method))
}
