/// Router Module Index
///
/// Routing is split by access level, and access control is applied per module
/// with an axum layer rather than inside individual handlers.

/// Routes accessible to anyone (anonymous reads, registration and login).
pub mod public;

/// Routes behind the `require_auth` layer. Every handler receives a verified
/// `AuthUser`.
pub mod authenticated;
