//! Read-mostly JSON document API over a flat object store.

pub mod config;
pub mod documents;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod registry;
pub mod routing;
pub mod storage;

pub use config::schema::ServiceConfig;
pub use error::ApiError;
pub use http::ApiServer;
pub use lifecycle::Shutdown;
