//! Document subsystem: everything between a storage key and a response body.
//!
//! # Data Flow
//! ```text
//! storage key
//!     → fetcher.rs (get bytes with deadline, decode JSON, classify failure)
//!     → aggregator.rs (many keys → one list, failures omitted)
//!     → range.rs (inclusive date window over records)
//!
//! POST /subscribe
//!     → subscriptions.rs (fetch list → append → write back)
//! ```

pub mod aggregator;
pub mod fetcher;
pub mod range;
pub mod subscriptions;

pub use aggregator::Aggregator;
pub use fetcher::{Document, DocumentFetcher, FetchError};
pub use range::{filter_by_date, DateRange, RangeError, RangeQuery};
pub use subscriptions::{SubscribeError, SubscribeRequest, Subscription, SubscriptionAppender};
