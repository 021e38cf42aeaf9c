//! Cryptocurrency price lookup tool

use crate::error::{Error, Result};
use crate::tools::{Tool, ToolCall, ToolResult};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

/// Default base URL of the price service
pub const DEFAULT_PRICE_API_BASE: &str = "https://api.coingecko.com/api/v3";

/// Error message surfaced to the model for any lookup failure
const LOOKUP_ERROR: &str = "Unable to fetch crypto data";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One quote entry in the price service response
#[derive(Debug, Deserialize)]
struct PriceQuote {
    usd: serde_json::Number,
    usd_24h_change: f64,
}

/// Tool that fetches spot price and 24h change for a coin identifier
pub struct CryptoInfoTool {
    client: reqwest::Client,
    base_url: String,
}

impl CryptoInfoTool {
    /// Build against the default price service
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_PRICE_API_BASE)
    }

    /// Build against a custom price service endpoint
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// One blocking lookup against the price service.
    ///
    /// `coin_id` is an opaque identifier understood by the service; it is
    /// not validated locally.
    async fn lookup(&self, coin_id: &str) -> Result<Value> {
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies=usd&include_24hr_change=true",
            self.base_url, coin_id
        );

        let quotes: HashMap<String, PriceQuote> = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let quote = quotes
            .get(coin_id)
            .ok_or_else(|| Error::Generic(format!("no quote for '{}' in response", coin_id)))?;

        Ok(json!({
            "coin": coin_id,
            "price_usd": quote.usd.clone(),
            "change_24h": round2(quote.usd_24h_change),
        }))
    }
}

impl Default for CryptoInfoTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Tool for CryptoInfoTool {
    fn name(&self) -> &str {
        "get_crypto_info"
    }

    fn description(&self) -> &str {
        "Get current price and 24h change for a cryptocurrency"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "coin_id": {
                    "type": "string",
                    "description": "The id of the cryptocurrency on CoinGecko, e.g., bitcoin",
                },
            },
            "required": ["coin_id"],
        })
    }

    async fn execute(&self, call: ToolCall) -> ToolResult {
        let coin_id: String = match call.get_parameter("coin_id") {
            Ok(coin_id) => coin_id,
            Err(e) => return ToolResult::error(call.id, e.to_string()),
        };

        match self.lookup(&coin_id).await {
            Ok(payload) => ToolResult::success(call.id, payload),
            Err(e) => {
                tracing::debug!(coin = %coin_id, error = %e, "price lookup failed");
                ToolResult::error(call.id, LOOKUP_ERROR)
            }
        }
    }
}

/// Round to 2 decimal places, half away from zero
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Spawn a one-shot HTTP responder returning a canned body, for tests that
/// need a live price endpoint on loopback.
#[cfg(test)]
pub(crate) async fn spawn_price_stub(status_line: &'static str, body: &'static str) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback listener");
    let addr = listener.local_addr().expect("listener address");

    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
        }
    });

    format!("http://{addr}")
}
