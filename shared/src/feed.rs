use std::time::Duration;

use serde_json::Value;
use tracing::warn;

/// JSON pointer to the nested numeric field the remote source serves the
/// current index price under.
const PRICE_FIELD: &str = "/result/index_price";

/// Client for the remote price source. Owns one `reqwest::Client`; the
/// request timeout bounds how long a single fetch (and therefore an
/// in-flight sampler tick) can take.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: reqwest::Client,
}

impl FeedClient {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(FeedClient { client })
    }

    /// Fetch one price from `endpoint`. Total over its failure space:
    /// transport errors, timeouts, non-2xx statuses, unparseable bodies,
    /// and bodies missing the price field all collapse to `None`, each
    /// logged where detected. Never returns an error that could unwind the
    /// sampling loop.
    pub async fn fetch_price(&self, endpoint: &str) -> Option<f64> {
        let response = match self.client.get(endpoint).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!("Error fetching price from {}: {}", endpoint, err);
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(
                "Unexpected status {} fetching price from {}",
                response.status(),
                endpoint
            );
            return None;
        }

        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(err) => {
                warn!("Invalid JSON from {}: {}", endpoint, err);
                return None;
            }
        };

        match body.pointer(PRICE_FIELD).and_then(Value::as_f64) {
            Some(price) => Some(price),
            None => {
                warn!("Price not found in response from {}", endpoint);
                None
            }
        }
    }
}
