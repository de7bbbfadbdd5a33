//! Result records returned by the alert graph reader.
//!
//! These are denormalized read projections, not owned entities: the graph
//! is the system of record and this crate never writes to it. Joined
//! fields stay `Option` so a missing Workflow or Order yields null-valued
//! columns rather than a dropped row.

use serde::{Deserialize, Serialize};

/// One order collected under an alert. Every field is optional because
/// `collect(DISTINCT {..})` over an OPTIONAL MATCH produces a single
/// all-null entry when the alert has no orders at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: Option<String>,
    pub asset_type: Option<String>,
    pub venue: Option<String>,
    pub quantity: Option<f64>,
    pub placed_time: Option<String>,
    pub cancelled_time: Option<String>,
    pub executed_time: Option<String>,
    pub is_algo: Option<bool>,
}

/// Alert row as returned by `alerts_for_trader`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertSummary {
    pub alert_id: Option<String>,
    pub alert_type: Option<String>,
    pub created_date: Option<String>,
    pub status: Option<String>,
    pub commentary: Option<String>,
    pub disposition: Option<String>,
    pub orders: Vec<OrderRecord>,
}

/// Alert row as returned by `alerts_by_type` and `search_alerts_by_criteria`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypedAlert {
    pub alert_id: Option<String>,
    pub alert_type: Option<String>,
    pub created_date: Option<String>,
    pub status: Option<String>,
    pub commentary: Option<String>,
    pub disposition: Option<String>,
    pub traders: Vec<String>,
}

/// Full picture of one alert: workflow, orders, and involved traders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertDetail {
    pub alert_id: Option<String>,
    pub alert_type: Option<String>,
    pub created_date: Option<String>,
    pub status: Option<String>,
    pub commentary: Option<String>,
    pub disposition: Option<String>,
    pub supervisor: Option<String>,
    pub review_date: Option<String>,
    pub traders: Vec<String>,
    pub orders: Vec<OrderRecord>,
}

/// One trader reachable from the central trader, with the relationship
/// chain along the hop-minimal path that reached them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConnection {
    pub connected_trader: String,
    pub degrees_of_separation: i64,
    pub relationships: serde_json::Value,
}

/// Optional filters for the multi-criteria alert search. Absent criteria
/// impose no filter. Venue/asset/amount match existentially over the
/// alert's orders: at least one order must satisfy the filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchCriteria {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub asset_type: Option<String>,
    #[serde(default)]
    pub min_amount: Option<f64>,
}

impl SearchCriteria {
    pub fn is_empty(&self) -> bool {
        self.start_date.is_none()
            && self.end_date.is_none()
            && self.venue.is_none()
            && self.asset_type.is_none()
            && self.min_amount.is_none()
    }
}

// --- Response payloads, serialized into the tool text envelope ---

#[derive(Debug, Clone, Serialize)]
pub struct TraderAlertsPayload {
    pub trader_name: String,
    pub total_alerts: usize,
    pub alerts: Vec<AlertSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeAlertsPayload {
    pub misconduct_type: String,
    pub total_alerts: usize,
    pub alerts: Vec<TypedAlert>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkPayload {
    pub central_trader: String,
    pub network_depth: u8,
    pub connected_traders: Vec<NetworkConnection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchPayload {
    pub search_criteria: SearchCriteria,
    pub total_results: usize,
    pub alerts: Vec<TypedAlert>,
}
