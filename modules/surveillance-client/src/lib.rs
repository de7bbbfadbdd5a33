//! Client for the external surveillance REST API.
//!
//! Each operation is a one-to-one mapping from parameters to an HTTP
//! request, and the JSON body comes back unchanged. No caching, no
//! retries, no rate limiting — the API owns all of that.

pub mod error;

pub use error::{Result, SurveillanceApiError};

use serde_json::Value;
use tracing::debug;

/// HTTP handle for the surveillance API. Owns one pooled `reqwest::Client`
/// for its whole lifetime; construct it once at startup and let it drop
/// on shutdown.
pub struct SurveillanceClient {
    client: reqwest::Client,
    base_url: String,
}

impl SurveillanceClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /alerts?status&limit` — live alerts, optionally filtered by
    /// status (active, pending, closed).
    pub async fn get_real_time_alerts(&self, status: Option<&str>, limit: u32) -> Result<Value> {
        debug!(?status, limit, "get_real_time_alerts");

        let mut params: Vec<(&str, String)> = vec![("limit", limit.to_string())];
        if let Some(status) = status {
            params.push(("status", status.to_string()));
        }

        let resp = self
            .client
            .get(format!("{}/alerts", self.base_url))
            .query(&params)
            .send()
            .await?;

        Self::json_or_error(resp).await
    }

    /// `GET /traders/{id}` — trader profile by id or name.
    pub async fn get_trader_profile(&self, trader_id: &str) -> Result<Value> {
        debug!(trader_id, "get_trader_profile");

        let resp = self
            .client
            .get(format!("{}/traders/{}", self.base_url, trader_id))
            .send()
            .await?;

        Self::json_or_error(resp).await
    }

    /// `POST /alerts/{id}/feedback` — record a disposition with optional
    /// commentary. Returns a small success envelope rather than echoing
    /// the upstream body.
    pub async fn submit_alert_feedback(
        &self,
        alert_id: &str,
        disposition: &str,
        commentary: Option<&str>,
    ) -> Result<Value> {
        debug!(alert_id, disposition, "submit_alert_feedback");

        let payload = serde_json::json!({
            "disposition": disposition,
            "commentary": commentary.unwrap_or(""),
        });

        let resp = self
            .client
            .post(format!("{}/alerts/{}/feedback", self.base_url, alert_id))
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SurveillanceApiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(serde_json::json!({
            "success": true,
            "message": "Feedback submitted",
        }))
    }

    /// `GET /market-data?symbol&start_time&end_time` — market data for a
    /// symbol over an optional ISO-8601 time window.
    pub async fn get_market_data(
        &self,
        symbol: &str,
        start_time: Option<&str>,
        end_time: Option<&str>,
    ) -> Result<Value> {
        debug!(symbol, ?start_time, ?end_time, "get_market_data");

        let mut params: Vec<(&str, String)> = vec![("symbol", symbol.to_string())];
        if let Some(start_time) = start_time {
            params.push(("start_time", start_time.to_string()));
        }
        if let Some(end_time) = end_time {
            params.push(("end_time", end_time.to_string()));
        }

        let resp = self
            .client
            .get(format!("{}/market-data", self.base_url))
            .query(&params)
            .send()
            .await?;

        Self::json_or_error(resp).await
    }

    async fn json_or_error(resp: reqwest::Response) -> Result<Value> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SurveillanceApiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(resp.json().await?)
    }
}
