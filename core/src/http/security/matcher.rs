//! Composable matchers.
//!
//! A [`Matcher`] is a boolean predicate over a subject that may fail to
//! inspect it. Matchers compose with [`and`], [`or`] and [`not`] (or the
//! chainable [`MatcherExt`]) and evaluate lazily:
//!
//! - `and` stops at the first `false` or error
//! - `or` stops at the first `true` or error
//! - errors propagate immediately
//!
//! # Example
//! ```
//! use actix_websecurity_core::http::security::matcher::{self, MatcherExt, Matcher};
//!
//! let even = matcher::from_fn(|n: &i32| Ok(n % 2 == 0));
//! let positive = matcher::from_fn(|n: &i32| Ok(*n > 0));
//! let m = even.and(positive);
//!
//! assert_eq!(m.matches(&4), Ok(true));
//! assert_eq!(m.matches(&-4), Ok(false));
//! ```

use std::fmt;
use std::sync::Arc;

use crate::http::error::MatchError;

/// Boolean predicate over a subject of type `T`.
pub trait Matcher<T: ?Sized>: Send + Sync {
    fn matches(&self, subject: &T) -> Result<bool, MatchError>;
}

/// Shared, type-erased matcher.
pub type MatcherRef<T> = Arc<dyn Matcher<T>>;

/// Matches everything.
pub fn any<T: ?Sized + 'static>() -> MatcherRef<T> {
    Arc::new(Constant(true))
}

/// Matches nothing.
pub fn none<T: ?Sized + 'static>() -> MatcherRef<T> {
    Arc::new(Constant(false))
}

pub fn and<T: ?Sized + 'static>(left: MatcherRef<T>, right: MatcherRef<T>) -> MatcherRef<T> {
    Arc::new(AndMatcher {
        matchers: vec![left, right],
    })
}

pub fn or<T: ?Sized + 'static>(left: MatcherRef<T>, right: MatcherRef<T>) -> MatcherRef<T> {
    Arc::new(OrMatcher {
        matchers: vec![left, right],
    })
}

pub fn not<T: ?Sized + 'static>(matcher: MatcherRef<T>) -> MatcherRef<T> {
    Arc::new(NotMatcher { matcher })
}

/// Conjunction of any number of matchers. An empty list matches.
pub fn all_of<T: ?Sized + 'static>(matchers: Vec<MatcherRef<T>>) -> MatcherRef<T> {
    Arc::new(AndMatcher { matchers })
}

/// Disjunction of any number of matchers. An empty list never matches.
pub fn any_of<T: ?Sized + 'static>(matchers: Vec<MatcherRef<T>>) -> MatcherRef<T> {
    Arc::new(OrMatcher { matchers })
}

/// Wraps a closure as a matcher.
pub fn from_fn<T, F>(f: F) -> MatcherRef<T>
where
    T: ?Sized + 'static,
    F: Fn(&T) -> Result<bool, MatchError> + Send + Sync + 'static,
{
    Arc::new(FnMatcher { f })
}

/// Chainable combinators on [`MatcherRef`].
pub trait MatcherExt<T: ?Sized> {
    fn and(self, other: MatcherRef<T>) -> MatcherRef<T>;
    fn or(self, other: MatcherRef<T>) -> MatcherRef<T>;
    fn negate(self) -> MatcherRef<T>;
}

impl<T: ?Sized + 'static> MatcherExt<T> for MatcherRef<T> {
    fn and(self, other: MatcherRef<T>) -> MatcherRef<T> {
        and(self, other)
    }

    fn or(self, other: MatcherRef<T>) -> MatcherRef<T> {
        or(self, other)
    }

    fn negate(self) -> MatcherRef<T> {
        not(self)
    }
}

#[derive(Debug, Clone, Copy)]
struct Constant(bool);

impl<T: ?Sized> Matcher<T> for Constant {
    fn matches(&self, _subject: &T) -> Result<bool, MatchError> {
        Ok(self.0)
    }
}

struct AndMatcher<T: ?Sized> {
    matchers: Vec<MatcherRef<T>>,
}

impl<T: ?Sized> Matcher<T> for AndMatcher<T> {
    fn matches(&self, subject: &T) -> Result<bool, MatchError> {
        for matcher in &self.matchers {
            if !matcher.matches(subject)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

struct OrMatcher<T: ?Sized> {
    matchers: Vec<MatcherRef<T>>,
}

impl<T: ?Sized> Matcher<T> for OrMatcher<T> {
    fn matches(&self, subject: &T) -> Result<bool, MatchError> {
        for matcher in &self.matchers {
            if matcher.matches(subject)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

struct NotMatcher<T: ?Sized> {
    matcher: MatcherRef<T>,
}

impl<T: ?Sized> Matcher<T> for NotMatcher<T> {
    fn matches(&self, subject: &T) -> Result<bool, MatchError> {
        self.matcher.matches(subject).map(|matched| !matched)
    }
}

struct FnMatcher<F> {
    f: F,
}

impl<T, F> Matcher<T> for FnMatcher<F>
where
    T: ?Sized,
    F: Fn(&T) -> Result<bool, MatchError> + Send + Sync,
{
    fn matches(&self, subject: &T) -> Result<bool, MatchError> {
        (self.f)(subject)
    }
}

impl<T: ?Sized> fmt::Debug for AndMatcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "And({} matchers)", self.matchers.len())
    }
}

impl<T: ?Sized> fmt::Debug for OrMatcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Or({} matchers)", self.matchers.len())
    }
}
