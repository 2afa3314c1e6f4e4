//! Routing for Portico.
//!
//! # Key types
//!
//! - [`RouteTable`]: ordered routes, each with [`RouteMeta`] requirements
//! - [`Guard`] / [`decide`]: the pure allow/redirect decision
//! - [`Router`]: resolves a path, guards it, follows redirects
//! - [`Location`]: a normalized path plus query

mod error;
mod guard;
mod route;
mod router;
mod table;

pub use error::RouterError;
pub use guard::{Decision, Guard, REDIRECT_QUERY_KEY, decide};
pub use route::{Location, PathPattern, ResolvedRoute, Route, RouteMeta};
pub use router::{Navigation, Router};
pub use table::RouteTable;
