//! Typed client for the indicator document API.

mod client;

pub use client::{ClientError, ErrorBody, HealthStatus, IndicatorClient, SubscribeRequest};
