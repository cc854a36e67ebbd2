//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Construct the document components from configuration
//! - Create the Axum router with all handlers
//! - Wire up middleware (request ID, tracing, CORS, timeout)
//! - Serve on a listener until shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    error_handling::HandleErrorLayer,
    http::{HeaderValue, Method},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::{timeout::error::Elapsed, timeout::TimeoutLayer, BoxError, ServiceBuilder};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{CorsConfig, ServiceConfig};
use crate::documents::{Aggregator, DocumentFetcher, SubscriptionAppender};
use crate::error::ApiError;
use crate::http::handlers;
use crate::http::request::MakeRequestUuid;
use crate::registry::KeyRegistry;
use crate::routing::Dispatcher;
use crate::storage::ObjectStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub subscriptions: Arc<SubscriptionAppender>,
}

impl AppState {
    /// Build every component over one store.
    pub fn new(config: &ServiceConfig, registry: KeyRegistry, store: Arc<dyn ObjectStore>) -> Self {
        let fetcher = DocumentFetcher::new(store, Duration::from_secs(config.storage.timeout_secs));
        let aggregator = Aggregator::new(fetcher.clone(), config.aggregate.concurrency);
        let dispatcher = Dispatcher::new(Arc::new(registry), fetcher.clone(), aggregator);
        let subscriptions = SubscriptionAppender::new(fetcher, config.storage.subscriptions_key.clone());

        Self {
            dispatcher: Arc::new(dispatcher),
            subscriptions: Arc::new(subscriptions),
        }
    }
}

/// HTTP server for the document API.
pub struct ApiServer {
    router: Router,
    config: ServiceConfig,
}

impl ApiServer {
    /// Create a server over `store` with the built-in key registry.
    pub fn new(config: ServiceConfig, store: Arc<dyn ObjectStore>) -> Self {
        Self::with_registry(config, KeyRegistry::builtin(), store)
    }

    pub fn with_registry(config: ServiceConfig, registry: KeyRegistry, store: Arc<dyn ObjectStore>) -> Self {
        let state = AppState::new(&config, registry, store);
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        let limit = Duration::from_secs(config.timeouts.request_secs);
        let router = Router::new()
            .route("/healthz", get(handlers::health))
            .route("/subscribe", post(handlers::subscribe))
            .route("/", get(handlers::get_root))
            .route("/{*path}", get(handlers::get_document))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(HandleErrorLayer::new(move |err: BoxError| async move {
                        timeout_response(err, limit)
                    }))
                    .layer(TimeoutLayer::new(limit)),
            );

        let router = match cors_layer(&config.cors) {
            Some(cors) => router.layer(cors),
            None => router,
        };

        router
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires, then drain.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Render a middleware failure as the usual JSON error body.
fn timeout_response(err: BoxError, limit: Duration) -> Response {
    let details = if err.is::<Elapsed>() {
        format!("request timed out after {:?}", limit)
    } else {
        err.to_string()
    };
    tracing::warn!(details = %details, "Request aborted");
    ApiError::NotAvailable { details }.into_response()
}

fn cors_layer(config: &CorsConfig) -> Option<CorsLayer> {
    if !config.enabled {
        return None;
    }

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if config.allowed_origins.is_empty() {
        return Some(layer.allow_origin(Any));
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    Some(layer.allow_origin(AllowOrigin::list(origins)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn server(store: &MemoryStore) -> ApiServer {
        let mut config = ServiceConfig::default();
        config.observability.metrics_enabled = false;
        ApiServer::new(config, Arc::new(store.clone()))
    }

    async fn call(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_document_route() {
        let store = MemoryStore::new();
        store.insert_json("chart_data.json", &json!({"points": [1, 2]}));
        let router = server(&store).router();

        let request = Request::get("/chart").body(Body::empty()).unwrap();
        let (status, body) = call(router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"points": [1, 2]}));
    }

    #[tokio::test]
    async fn test_subscribe_route() {
        let store = MemoryStore::new();
        let router = server(&store).router();

        let request = Request::post("/subscribe")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name":" Ada ","email":"ada@example.com"}"#))
            .unwrap();
        let (status, body) = call(router.clone(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Subscription successful");

        let stored: Value = serde_json::from_slice(&store.snapshot("subscriptions.json").unwrap()).unwrap();
        assert_eq!(stored, json!([{"name": "Ada", "email": "ada@example.com", "subscribe": false}]));

        let request = Request::post("/subscribe")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name":"","email":"ada@example.com"}"#))
            .unwrap();
        let (status, _) = call(router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_bad_query_is_json_error() {
        let store = MemoryStore::new();
        let router = server(&store).router();

        let request = Request::get("/stocks/daily_ohlc/AAPL?from=2024/01/01")
            .body(Body::empty())
            .unwrap();
        let (status, body) = call(router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid 'from' date format. Expected YYYY-MM-DD.");
    }

    #[derive(Debug)]
    struct StalledStore;

    #[async_trait::async_trait]
    impl crate::storage::ObjectStore for StalledStore {
        async fn get(&self, _key: &str) -> crate::storage::StorageResult<Vec<u8>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(b"[]".to_vec())
        }

        async fn put(&self, _key: &str, _bytes: Vec<u8>) -> crate::storage::StorageResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_request_timeout_is_json_error() {
        let mut config = ServiceConfig::default();
        config.observability.metrics_enabled = false;
        config.timeouts.request_secs = 1;
        config.storage.timeout_secs = 30;
        let router = ApiServer::new(config, Arc::new(StalledStore)).router();

        let request = Request::get("/chart").body(Body::empty()).unwrap();
        let (status, body) = call(router, request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
        assert_eq!(body["details"], "request timed out after 1s");
    }

    #[test]
    fn test_cors_layer_disabled() {
        let config = CorsConfig {
            enabled: false,
            allowed_origins: vec![],
        };
        assert!(cors_layer(&config).is_none());
    }
}
