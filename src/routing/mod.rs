//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Request path + query
//!     → route.rs (parse once into a Route)
//!     → dispatcher.rs (registry lookup, fetch/aggregate, filter)
//!     → Document or ApiError
//! ```
//!
//! # Design Decisions
//! - One tagged enum per path shape; no handler inspects raw segments
//! - Registry tables are compiled in and immutable at runtime
//! - Deterministic: same path always yields the same route

pub mod dispatcher;
pub mod route;

pub use dispatcher::Dispatcher;
pub use route::Route;
