/// Router Module Index
///
/// Splits the portal's routes by access requirement. The split mirrors the route table:
/// entries with `requires_auth` are registered by `protected` behind the route guard, the
/// rest by `public`, so a protected page can never be reached without passing the guard.

/// Page routes and JSON endpoints reachable without a session.
pub mod public;

/// Page routes wrapped by the route guard.
pub mod protected;

/// The static path → view mapping both routers are built from.
pub mod table;

/// Lazily loaded page views.
pub mod views;

/// Optional role-to-section restriction applied after the guard.
pub mod policy;
