//! Closed tool enumerations and their dispatchers.
//!
//! Each tool name maps to an enum variant; the variant owns both the
//! declarative descriptor and the typed argument struct its dispatch arm
//! deserializes. `list_tools` and `call_tool` therefore cannot drift
//! apart: they read the same enum.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use alertscope_common::MisconductType;
use alertscope_graph::{AlertGraphReader, SearchCriteria};
use surveillance_client::SurveillanceClient;

use crate::descriptor::ToolDescriptor;

/// Uniform dispatch surface exposed over the RPC transport.
///
/// `call_tool` never faults: every failure mode comes back as a
/// structured `{"error": ...}` payload.
#[async_trait]
pub trait ToolSet: Send + Sync {
    fn list_tools(&self) -> Vec<ToolDescriptor>;
    async fn call_tool(&self, name: &str, arguments: Value) -> Value;
}

fn unknown_tool(name: &str) -> Value {
    json!({ "error": format!("Unknown tool: {name}") })
}

fn parse_args<T: DeserializeOwned>(name: &str, arguments: Value) -> Result<T, Value> {
    // tools/call arguments may be omitted entirely; treat that as {}.
    let arguments = if arguments.is_null() { json!({}) } else { arguments };
    serde_json::from_value(arguments)
        .map_err(|e| json!({ "error": format!("Invalid arguments for {name}: {e}") }))
}

fn payload<T: serde::Serialize, E: std::fmt::Display>(result: Result<T, E>) -> Value {
    match result {
        Ok(value) => serde_json::to_value(value)
            .unwrap_or_else(|e| json!({ "error": format!("Serialization error: {e}") })),
        Err(e) => {
            warn!(error = %e, "tool call failed");
            json!({ "error": e.to_string() })
        }
    }
}

fn default_limit_10() -> i64 {
    10
}

fn default_limit_20() -> i64 {
    20
}

fn default_limit_20_u32() -> u32 {
    20
}

fn default_depth() -> i64 {
    2
}

// ---------------------------------------------------------------------------
// Graph tools
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphTool {
    AlertsForTrader,
    AlertWorkflow,
    AlertsByType,
    TraderNetwork,
    SearchAlertsByCriteria,
}

impl GraphTool {
    pub const ALL: [GraphTool; 5] = [
        GraphTool::AlertsForTrader,
        GraphTool::AlertWorkflow,
        GraphTool::AlertsByType,
        GraphTool::TraderNetwork,
        GraphTool::SearchAlertsByCriteria,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::AlertsForTrader => "get_alerts_for_trader",
            Self::AlertWorkflow => "get_alert_workflow",
            Self::AlertsByType => "get_alerts_by_type",
            Self::TraderNetwork => "get_trader_network",
            Self::SearchAlertsByCriteria => "search_alerts_by_criteria",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    pub fn descriptor(&self) -> ToolDescriptor {
        let input_schema = match self {
            Self::AlertsForTrader => json!({
                "type": "object",
                "properties": {
                    "trader_name": {
                        "type": "string",
                        "description": "Name of the trader to search for"
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of alerts to return",
                        "default": 10
                    }
                },
                "required": ["trader_name"]
            }),
            Self::AlertWorkflow => json!({
                "type": "object",
                "properties": {
                    "alert_id": {
                        "type": "string",
                        "description": "Alert ID to get workflow for"
                    }
                },
                "required": ["alert_id"]
            }),
            Self::AlertsByType => json!({
                "type": "object",
                "properties": {
                    "misconduct_type": {
                        "type": "string",
                        "description": "Type of misconduct (spoofing, wash_trading, layering, front_running)"
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of alerts to return",
                        "default": 10
                    }
                },
                "required": ["misconduct_type"]
            }),
            Self::TraderNetwork => json!({
                "type": "object",
                "properties": {
                    "trader_name": {
                        "type": "string",
                        "description": "Central trader name"
                    },
                    "depth": {
                        "type": "integer",
                        "description": "Network depth (degrees of separation), 1 to 6",
                        "default": 2
                    }
                },
                "required": ["trader_name"]
            }),
            Self::SearchAlertsByCriteria => json!({
                "type": "object",
                "properties": {
                    "start_date": {
                        "type": "string",
                        "description": "Start date (YYYY-MM-DD format)"
                    },
                    "end_date": {
                        "type": "string",
                        "description": "End date (YYYY-MM-DD format)"
                    },
                    "venue": {
                        "type": "string",
                        "description": "Venue MIC code"
                    },
                    "asset_type": {
                        "type": "string",
                        "description": "Asset type filter"
                    },
                    "min_amount": {
                        "type": "number",
                        "description": "Minimum USD amount"
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum results",
                        "default": 20
                    }
                },
                "required": []
            }),
        };

        let description = match self {
            Self::AlertsForTrader => "Get all surveillance alerts for a specific trader",
            Self::AlertWorkflow => "Get the complete workflow and commentary for a specific alert",
            Self::AlertsByType => "Get alerts filtered by misconduct type",
            Self::TraderNetwork => "Get network of traders connected to a specific trader",
            Self::SearchAlertsByCriteria => "Search alerts by multiple criteria",
        };

        ToolDescriptor {
            name: self.name().to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AlertsForTraderArgs {
    trader_name: String,
    #[serde(default = "default_limit_10")]
    limit: i64,
}

#[derive(Debug, Deserialize)]
struct AlertWorkflowArgs {
    alert_id: String,
}

#[derive(Debug, Deserialize)]
struct AlertsByTypeArgs {
    misconduct_type: String,
    #[serde(default = "default_limit_10")]
    limit: i64,
}

#[derive(Debug, Deserialize)]
struct TraderNetworkArgs {
    trader_name: String,
    #[serde(default = "default_depth")]
    depth: i64,
}

#[derive(Debug, Deserialize)]
struct SearchAlertsArgs {
    #[serde(flatten)]
    criteria: SearchCriteria,
    #[serde(default = "default_limit_20")]
    limit: i64,
}

/// Graph Query Service exposed as tools. Holds the reader handle it was
/// constructed with; nothing global.
pub struct GraphToolSet {
    reader: AlertGraphReader,
}

impl GraphToolSet {
    pub fn new(reader: AlertGraphReader) -> Self {
        Self { reader }
    }

    async fn dispatch(&self, tool: GraphTool, arguments: Value) -> Value {
        let name = tool.name();
        match tool {
            GraphTool::AlertsForTrader => {
                let args: AlertsForTraderArgs = match parse_args(name, arguments) {
                    Ok(args) => args,
                    Err(err) => return err,
                };
                payload(self.reader.alerts_for_trader(&args.trader_name, args.limit).await)
            }
            GraphTool::AlertWorkflow => {
                let args: AlertWorkflowArgs = match parse_args(name, arguments) {
                    Ok(args) => args,
                    Err(err) => return err,
                };
                match self.reader.alert_workflow(&args.alert_id).await {
                    Ok(Some(detail)) => payload::<_, alertscope_graph::GraphReadError>(Ok(detail)),
                    Ok(None) => json!({ "error": format!("Alert {} not found", args.alert_id) }),
                    Err(e) => payload::<Value, _>(Err(e)),
                }
            }
            GraphTool::AlertsByType => {
                let args: AlertsByTypeArgs = match parse_args(name, arguments) {
                    Ok(args) => args,
                    Err(err) => return err,
                };
                let misconduct_type = MisconductType::from_tag(&args.misconduct_type);
                payload(self.reader.alerts_by_type(&misconduct_type, args.limit).await)
            }
            GraphTool::TraderNetwork => {
                let args: TraderNetworkArgs = match parse_args(name, arguments) {
                    Ok(args) => args,
                    Err(err) => return err,
                };
                payload(self.reader.trader_network(&args.trader_name, args.depth).await)
            }
            GraphTool::SearchAlertsByCriteria => {
                let args: SearchAlertsArgs = match parse_args(name, arguments) {
                    Ok(args) => args,
                    Err(err) => return err,
                };
                payload(
                    self.reader
                        .search_alerts_by_criteria(&args.criteria, args.limit)
                        .await,
                )
            }
        }
    }
}

#[async_trait]
impl ToolSet for GraphToolSet {
    fn list_tools(&self) -> Vec<ToolDescriptor> {
        GraphTool::ALL.iter().map(GraphTool::descriptor).collect()
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Value {
        match GraphTool::from_name(name) {
            Some(tool) => self.dispatch(tool, arguments).await,
            None => unknown_tool(name),
        }
    }
}

// ---------------------------------------------------------------------------
// REST API tools
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiTool {
    RealTimeAlerts,
    TraderProfile,
    AlertFeedback,
    MarketData,
}

impl ApiTool {
    pub const ALL: [ApiTool; 4] = [
        ApiTool::RealTimeAlerts,
        ApiTool::TraderProfile,
        ApiTool::AlertFeedback,
        ApiTool::MarketData,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::RealTimeAlerts => "get_real_time_alerts",
            Self::TraderProfile => "get_trader_profile",
            Self::AlertFeedback => "submit_alert_feedback",
            Self::MarketData => "get_market_data",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    pub fn descriptor(&self) -> ToolDescriptor {
        let input_schema = match self {
            Self::RealTimeAlerts => json!({
                "type": "object",
                "properties": {
                    "status": {
                        "type": "string",
                        "description": "Alert status filter (active, pending, closed)"
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of alerts",
                        "default": 20
                    }
                },
                "required": []
            }),
            Self::TraderProfile => json!({
                "type": "object",
                "properties": {
                    "trader_id": {
                        "type": "string",
                        "description": "Trader ID or name"
                    }
                },
                "required": ["trader_id"]
            }),
            Self::AlertFeedback => json!({
                "type": "object",
                "properties": {
                    "alert_id": {
                        "type": "string",
                        "description": "Alert ID"
                    },
                    "disposition": {
                        "type": "string",
                        "description": "Alert disposition (dismissed, escalated, etc.)"
                    },
                    "commentary": {
                        "type": "string",
                        "description": "Commentary for the disposition"
                    }
                },
                "required": ["alert_id", "disposition"]
            }),
            Self::MarketData => json!({
                "type": "object",
                "properties": {
                    "symbol": {
                        "type": "string",
                        "description": "Asset symbol"
                    },
                    "start_time": {
                        "type": "string",
                        "description": "Start time (ISO format)"
                    },
                    "end_time": {
                        "type": "string",
                        "description": "End time (ISO format)"
                    }
                },
                "required": ["symbol"]
            }),
        };

        let description = match self {
            Self::RealTimeAlerts => "Get real-time surveillance alerts from the API",
            Self::TraderProfile => "Get detailed trader profile from the surveillance system",
            Self::AlertFeedback => "Submit feedback or disposition for an alert",
            Self::MarketData => "Get relevant market data for analysis",
        };

        ToolDescriptor {
            name: self.name().to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RealTimeAlertsArgs {
    #[serde(default)]
    status: Option<String>,
    #[serde(default = "default_limit_20_u32")]
    limit: u32,
}

#[derive(Debug, Deserialize)]
struct TraderProfileArgs {
    trader_id: String,
}

#[derive(Debug, Deserialize)]
struct AlertFeedbackArgs {
    alert_id: String,
    disposition: String,
    #[serde(default)]
    commentary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MarketDataArgs {
    symbol: String,
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    end_time: Option<String>,
}

/// Surveillance REST API exposed as tools.
pub struct ApiToolSet {
    client: SurveillanceClient,
}

impl ApiToolSet {
    pub fn new(client: SurveillanceClient) -> Self {
        Self { client }
    }

    async fn dispatch(&self, tool: ApiTool, arguments: Value) -> Value {
        let name = tool.name();
        match tool {
            ApiTool::RealTimeAlerts => {
                let args: RealTimeAlertsArgs = match parse_args(name, arguments) {
                    Ok(args) => args,
                    Err(err) => return err,
                };
                payload(
                    self.client
                        .get_real_time_alerts(args.status.as_deref(), args.limit)
                        .await,
                )
            }
            ApiTool::TraderProfile => {
                let args: TraderProfileArgs = match parse_args(name, arguments) {
                    Ok(args) => args,
                    Err(err) => return err,
                };
                payload(self.client.get_trader_profile(&args.trader_id).await)
            }
            ApiTool::AlertFeedback => {
                let args: AlertFeedbackArgs = match parse_args(name, arguments) {
                    Ok(args) => args,
                    Err(err) => return err,
                };
                payload(
                    self.client
                        .submit_alert_feedback(
                            &args.alert_id,
                            &args.disposition,
                            args.commentary.as_deref(),
                        )
                        .await,
                )
            }
            ApiTool::MarketData => {
                let args: MarketDataArgs = match parse_args(name, arguments) {
                    Ok(args) => args,
                    Err(err) => return err,
                };
                payload(
                    self.client
                        .get_market_data(
                            &args.symbol,
                            args.start_time.as_deref(),
                            args.end_time.as_deref(),
                        )
                        .await,
                )
            }
        }
    }
}

#[async_trait]
impl ToolSet for ApiToolSet {
    fn list_tools(&self) -> Vec<ToolDescriptor> {
        ApiTool::ALL.iter().map(ApiTool::descriptor).collect()
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Value {
        match ApiTool::from_name(name) {
            Some(tool) => self.dispatch(tool, arguments).await,
            None => unknown_tool(name),
        }
    }
}
