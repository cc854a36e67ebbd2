//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::json;
use tokio::net::TcpListener;

use indicator_api::config::ServiceConfig;
use indicator_api::http::ApiServer;
use indicator_api::lifecycle::Shutdown;
pub use indicator_api::storage::MemoryStore;

/// A running server bound to an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub store: MemoryStore,
    pub shutdown: Shutdown,
}

impl TestServer {
    #[allow(dead_code)]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    #[allow(dead_code)]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

#[allow(dead_code)]
pub fn test_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.observability.metrics_enabled = false;
    config.storage.timeout_secs = 2;
    config
}

/// Start a server over `store` with the default test config.
pub async fn start_server(store: MemoryStore) -> TestServer {
    start_server_with(test_config(), store).await
}

#[allow(dead_code)]
pub async fn start_server_with(config: ServiceConfig, store: MemoryStore) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = ApiServer::new(config, Arc::new(store.clone()));
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    TestServer { addr, store, shutdown }
}

/// Store seeded with a small, realistic bucket layout.
#[allow(dead_code)]
pub fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.insert_json(
        "api/fred/gdp.json",
        &json!([{"date": "2024-01-01", "value": 27956.998}, {"date": "2024-04-01", "value": 28269.174}]),
    );
    store.insert_json(
        "api/fred/consumer_price_index.json",
        &json!([{"date": "2024-05-01", "value": 313.225}]),
    );
    store.insert_json("api/fred/m2.json", &json!({"error": "not a list"}));
    store.insert_json(
        "api/bls/unemployment_rate.json",
        &json!([{"date": "2024-05-01", "value": 4.0}]),
    );
    store.insert_json(
        "articles.json",
        &json!([
            {"id": "a", "title": "Rates on hold"},
            {"id": "b", "title": "Payrolls beat"}
        ]),
    );
    store.insert_json("chart_data.json", &json!({"series": ["gdp", "m2"]}));
    store.insert_json(
        "api/stock_daily_bar/AAPL.json",
        &json!([
            {"date": "2024-01-02", "open": 187.15, "close": 185.64},
            {"date": "2024-01-03", "open": 184.22, "close": 184.25},
            {"date": "2024-01-04", "open": 182.15, "close": 181.91},
            {"date": "2024-01-05", "open": 181.99, "close": 181.18}
        ]),
    );
    store
}
