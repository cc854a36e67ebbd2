use reqwest::{Client, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error body returned by the service for every non-2xx response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base URL: {0}")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("service returned {status}: {}", .body.message)]
    Api { status: StatusCode, body: ErrorBody },
}

impl ClientError {
    /// HTTP status of an API error, if the service answered.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            Self::InvalidUrl(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeRequest {
    pub name: String,
    pub email: String,
    pub subscribe: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

pub struct IndicatorClient {
    client: Client,
    base: Url,
}

impl IndicatorClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self {
            client: Client::new(),
            base,
        })
    }

    /// One series, e.g. `series("fred", "gdp")`.
    pub async fn series(&self, provider: &str, id: &str) -> Result<Value, ClientError> {
        self.get(&[provider, id], &[]).await
    }

    /// Every registered series of a provider, in registry order.
    pub async fn aggregate(&self, provider: &str) -> Result<Value, ClientError> {
        self.get(&[provider], &[]).await
    }

    pub async fn category(&self, category: &str) -> Result<Value, ClientError> {
        self.get(&[category], &[]).await
    }

    pub async fn articles(&self) -> Result<Value, ClientError> {
        self.get(&["articles"], &[]).await
    }

    pub async fn article(&self, id: &str) -> Result<Value, ClientError> {
        self.get(&["articles", id], &[]).await
    }

    /// Daily bars for `symbol`, optionally bounded by `YYYY-MM-DD` dates.
    pub async fn daily_ohlc(
        &self,
        symbol: &str,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Value, ClientError> {
        let mut query = Vec::new();
        if let Some(from) = from {
            query.push(("from", from));
        }
        if let Some(to) = to {
            query.push(("to", to));
        }
        self.get(&["stocks", "daily_ohlc", symbol], &query).await
    }

    pub async fn subscribe(&self, req: &SubscribeRequest) -> Result<Value, ClientError> {
        let resp = self
            .client
            .post(self.endpoint(&["subscribe"])?)
            .json(req)
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let resp = self
            .client
            .get(self.endpoint(&["healthz"])?)
            .send()
            .await?;
        let value = decode(resp).await?;
        serde_json::from_value(value).map_err(|e| ClientError::Api {
            status: StatusCode::OK,
            body: ErrorBody {
                message: "unexpected health payload".to_string(),
                details: Some(e.to_string()),
            },
        })
    }

    /// Base URL with `segments` appended, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Value, ClientError> {
        let resp = self
            .client
            .get(self.endpoint(segments)?)
            .query(query)
            .send()
            .await?;
        decode(resp).await
    }
}

async fn decode(resp: Response) -> Result<Value, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json().await?);
    }

    let text = resp.text().await?;
    let body = serde_json::from_str::<ErrorBody>(&text).unwrap_or(ErrorBody {
        message: text,
        details: None,
    });
    Err(ClientError::Api { status, body })
}
