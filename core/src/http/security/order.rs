//! Ordering helpers shared by configurers, features and middleware.
//!
//! Lower values have higher priority. Items without an order always sort
//! after ordered ones.

use std::cmp::Ordering;

pub const HIGHEST_PRECEDENCE: i32 = i32::MIN;
pub const LOWEST_PRECEDENCE: i32 = i32::MAX;

/// "Ordered first" comparison.
///
/// Ordered items come first, by ascending order value. Unordered items
/// compare equal to each other, so a stable sort keeps their insertion order.
pub fn ordered_first(left: Option<i32>, right: Option<i32>) -> Ordering {
    match (left, right) {
        (Some(l), Some(r)) => l.cmp(&r),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Middleware order slots used by the built-in features.
///
/// All security middleware run inside `[HIGHEST, LOWEST]`, ahead of any
/// application middleware.
pub mod middleware_order {
    pub const HIGHEST: i32 = -(1 << 18) + 1;
    pub const LOWEST: i32 = HIGHEST + 0xffff;

    pub const PRE_AUTH: i32 = HIGHEST + 0x100;
    pub const BASIC_AUTH: i32 = HIGHEST + 0x400;
    pub const TOKEN_AUTH: i32 = HIGHEST + 0x500;
    pub const ANONYMOUS: i32 = HIGHEST + 0x800;
    pub const ACCESS_CONTROL: i32 = LOWEST - 0x100;
}

/// Application order of the built-in features inside one `WebSecurity`.
pub mod feature_order {
    pub const ERROR_HANDLING: i32 = 100;
    pub const AUTHENTICATOR: i32 = 200;
    pub const ANONYMOUS: i32 = 300;
    pub const LOGOUT: i32 = 400;
    pub const ACCESS: i32 = 500;
}
