//! The fixed five-stage orchestration graph:
//!
//! parse_query -> {fetch_graph_data, fetch_rest_data} -> analyze_data
//! -> generate_insights
//!
//! The two fetch stages only depend on the parsed intent and run
//! concurrently; each returns its own JSON object, assigned to its own
//! state field after the join. Tool-level `{"error": ...}` payloads are
//! data, not faults — only an LLM failure aborts the run.

use anyhow::Result;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use ai_client::{ChatAgent, StructuredOutput};
use alertscope_tools::ToolTransport;

use crate::insights::parse_numbered_insights;
use crate::intent::QueryIntent;
use crate::state::PipelineState;

const PARSE_SYSTEM: &str = "You are a surveillance query parser. Extract from the user's query: \
    trader names mentioned, a specific alert identifier if one is named, misconduct types of \
    interest (spoofing, wash_trading, layering, front_running), asset symbols, and whether \
    market data is requested.";

const ANALYST_SYSTEM: &str = "You are an expert market surveillance analyst. Provide detailed \
    analysis of trading data and alert patterns.";

const INSIGHTS_SYSTEM: &str = "Generate clear, actionable surveillance insights that help the \
    compliance team prioritize their work.";

pub struct SurveillancePipeline<L, G, A> {
    llm: L,
    graph_tools: G,
    api_tools: A,
}

impl<L, G, A> SurveillancePipeline<L, G, A>
where
    L: ChatAgent,
    G: ToolTransport,
    A: ToolTransport,
{
    pub fn new(llm: L, graph_tools: G, api_tools: A) -> Self {
        Self {
            llm,
            graph_tools,
            api_tools,
        }
    }

    /// Run one query end to end. Always returns a state: a faulted run
    /// yields a terminal state with `error` set and a single synthetic
    /// insight.
    pub async fn run(&self, query: &str) -> PipelineState {
        let mut state = PipelineState::new(query);
        match self.execute(&mut state).await {
            Ok(()) => state,
            Err(e) => {
                warn!(error = %e, "pipeline run failed");
                PipelineState::failed(query, &e.to_string())
            }
        }
    }

    async fn execute(&self, state: &mut PipelineState) -> Result<()> {
        let intent = self.parse_query(state).await;
        info!(?intent, "parsed query intent");

        let (graph_data, api_data) = tokio::join!(
            self.fetch_graph_data(&intent),
            self.fetch_rest_data(&intent)
        );
        state.neo4j_data = graph_data;
        state.api_data = api_data;

        self.analyze_data(state).await?;
        self.generate_insights(state).await?;
        Ok(())
    }

    /// Stage 1: structured entity extraction. Falls back to the keyword
    /// scan when the model call or its JSON output is unusable, so the
    /// fetch stages always get one intent to share.
    async fn parse_query(&self, state: &mut PipelineState) -> QueryIntent {
        let user = format!("Parse this query: {}", state.query);

        match self
            .llm
            .extract(PARSE_SYSTEM, &user, QueryIntent::openai_schema())
            .await
        {
            Ok(raw) => {
                state.log("system", format!("Parsed query: {raw}"));
                serde_json::from_str(&raw).unwrap_or_else(|e| {
                    warn!(error = %e, "intent extraction returned unusable JSON, using keywords");
                    QueryIntent::from_keywords(&state.query)
                })
            }
            Err(e) => {
                warn!(error = %e, "intent extraction failed, using keywords");
                QueryIntent::from_keywords(&state.query)
            }
        }
    }

    /// Stage 2a: graph fetches driven by the intent. Zero or more tool
    /// calls; results keyed by what was fetched.
    async fn fetch_graph_data(&self, intent: &QueryIntent) -> Value {
        let mut data = Map::new();

        if let Some(ref trader) = intent.trader_name {
            let alerts = self
                .graph_tools
                .call_tool(
                    "get_alerts_for_trader",
                    json!({ "trader_name": trader, "limit": 20 }),
                )
                .await;
            data.insert("alerts".to_string(), alerts);

            let network = self
                .graph_tools
                .call_tool(
                    "get_trader_network",
                    json!({ "trader_name": trader, "depth": 2 }),
                )
                .await;
            data.insert("network".to_string(), network);
        }

        for misconduct_type in &intent.misconduct_types {
            let alerts = self
                .graph_tools
                .call_tool(
                    "get_alerts_by_type",
                    json!({ "misconduct_type": misconduct_type, "limit": 15 }),
                )
                .await;
            data.insert(format!("{misconduct_type}_alerts"), alerts);
        }

        if let Some(ref alert_id) = intent.alert_id {
            let workflow = self
                .graph_tools
                .call_tool("get_alert_workflow", json!({ "alert_id": alert_id }))
                .await;
            data.insert("alert_workflow".to_string(), workflow);
        }

        Value::Object(data)
    }

    /// Stage 2b: REST fetches. Live alerts always; profile and market
    /// data only when the intent asks for them.
    async fn fetch_rest_data(&self, intent: &QueryIntent) -> Value {
        let mut data = Map::new();

        let real_time = self
            .api_tools
            .call_tool(
                "get_real_time_alerts",
                json!({ "status": "active", "limit": 10 }),
            )
            .await;
        data.insert("real_time_alerts".to_string(), real_time);

        if let Some(ref trader) = intent.trader_name {
            let profile = self
                .api_tools
                .call_tool("get_trader_profile", json!({ "trader_id": trader }))
                .await;
            data.insert("trader_profile".to_string(), profile);
        }

        if intent.wants_market_data && !intent.symbols.is_empty() {
            let mut market = Map::new();
            for symbol in &intent.symbols {
                let series = self
                    .api_tools
                    .call_tool("get_market_data", json!({ "symbol": symbol }))
                    .await;
                market.insert(symbol.clone(), series);
            }
            data.insert("market_data".to_string(), Value::Object(market));
        }

        Value::Object(data)
    }

    /// Stage 3: analyst-persona review of everything fetched.
    async fn analyze_data(&self, state: &mut PipelineState) -> Result<()> {
        let prompt = format!(
            "Analyze the following surveillance data for patterns and insights:\n\n\
             Historical data from the graph store:\n{}\n\n\
             Real-time data from the API:\n{}\n\n\
             Provide a comprehensive analysis focusing on:\n\
             1. Alert patterns and trends\n\
             2. Risk assessment for traders involved\n\
             3. Notable findings or red flags\n\
             4. Behavioral patterns\n\
             5. Recommendations for the surveillance team",
            serde_json::to_string_pretty(&state.neo4j_data)?,
            serde_json::to_string_pretty(&state.api_data)?,
        );

        state.analysis = self.llm.chat(ANALYST_SYSTEM, &prompt).await?;
        Ok(())
    }

    /// Stage 4: numbered action list, filtered through the best-effort
    /// list parser.
    async fn generate_insights(&self, state: &mut PipelineState) -> Result<()> {
        let prompt = format!(
            "Based on this surveillance analysis:\n{}\n\n\
             Generate specific, actionable insights for the surveillance team:\n\
             1. Immediate risks requiring attention\n\
             2. Patterns that suggest coordinated activity\n\
             3. Recommended investigative actions\n\
             4. Priority levels for different alerts\n\
             5. Potential regulatory implications\n\n\
             Format as a numbered list of clear, actionable insights.",
            state.analysis,
        );

        let response = self.llm.chat(INSIGHTS_SYSTEM, &prompt).await?;
        state.insights = parse_numbered_insights(&response);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    /// Scripted LLM: one canned extraction result, a queue of chat
    /// replies.
    struct MockChat {
        extraction: Option<String>,
        chat_replies: Mutex<VecDeque<String>>,
        fail_chat: bool,
    }

    impl MockChat {
        fn new(extraction: Option<&str>, replies: &[&str]) -> Self {
            Self {
                extraction: extraction.map(str::to_string),
                chat_replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
                fail_chat: false,
            }
        }

        fn failing() -> Self {
            Self {
                extraction: None,
                chat_replies: Mutex::new(VecDeque::new()),
                fail_chat: true,
            }
        }
    }

    #[async_trait]
    impl ChatAgent for MockChat {
        async fn chat(&self, _system: &str, _user: &str) -> Result<String> {
            if self.fail_chat {
                return Err(anyhow!("model unavailable"));
            }
            self.chat_replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| anyhow!("no scripted reply left"))
        }

        async fn extract(&self, _system: &str, _user: &str, _schema: Value) -> Result<String> {
            self.extraction
                .clone()
                .ok_or_else(|| anyhow!("extraction unavailable"))
        }
    }

    /// Records every call; answers from a canned response table.
    struct MockTransport {
        calls: Mutex<Vec<(String, Value)>>,
        responses: HashMap<String, Value>,
    }

    impl MockTransport {
        fn new(responses: &[(&str, Value)]) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                responses: responses
                    .iter()
                    .map(|(name, value)| (name.to_string(), value.clone()))
                    .collect(),
            }
        }

        fn calls(&self) -> Vec<(String, Value)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ToolTransport for MockTransport {
        async fn call_tool(&self, name: &str, arguments: Value) -> Value {
            self.calls
                .lock()
                .unwrap()
                .push((name.to_string(), arguments));
            self.responses.get(name).cloned().unwrap_or(json!({}))
        }

        async fn list_tools(&self) -> Vec<Value> {
            Vec::new()
        }
    }

    fn spoofing_intent() -> String {
        json!({
            "trader_name": null,
            "alert_id": null,
            "misconduct_types": ["spoofing"],
            "symbols": [],
            "wants_market_data": false
        })
        .to_string()
    }

    #[tokio::test]
    async fn spoofing_query_end_to_end() {
        let intent = spoofing_intent();
        let llm = MockChat::new(
            Some(intent.as_str()),
            &[
                "Spoofing activity is concentrated on XNYS.",
                "1. Escalate the open spoofing alerts\n2. Review cancel ratios on XNYS",
            ],
        );
        let graph = MockTransport::new(&[(
            "get_alerts_by_type",
            json!({"misconduct_type": "spoofing", "total_alerts": 2, "alerts": []}),
        )]);
        let api = MockTransport::new(&[(
            "get_real_time_alerts",
            json!({"alerts": [{"alert_id": "RT-1"}]}),
        )]);

        let pipeline = SurveillancePipeline::new(llm, graph, api);
        let state = pipeline.run("Show me all spoofing alerts from last week").await;

        assert!(state.error.is_none());
        assert_eq!(
            state.neo4j_data["spoofing_alerts"]["total_alerts"],
            json!(2)
        );
        assert_eq!(
            state.api_data["real_time_alerts"]["alerts"][0]["alert_id"],
            "RT-1"
        );
        assert!(!state.analysis.is_empty());
        assert_eq!(state.insights.len(), 2);

        let graph_calls = pipeline.graph_tools.calls();
        assert_eq!(graph_calls.len(), 1);
        assert_eq!(graph_calls[0].0, "get_alerts_by_type");
        assert_eq!(
            graph_calls[0].1,
            json!({"misconduct_type": "spoofing", "limit": 15})
        );

        let api_calls = pipeline.api_tools.calls();
        assert_eq!(api_calls.len(), 1);
        assert_eq!(api_calls[0].1, json!({"status": "active", "limit": 10}));
    }

    #[tokio::test]
    async fn trader_query_fans_out_to_both_services() {
        let intent = json!({
            "trader_name": "Bill Lyons",
            "alert_id": null,
            "misconduct_types": [],
            "symbols": [],
            "wants_market_data": false
        })
        .to_string();

        let llm = MockChat::new(Some(intent.as_str()), &["analysis", "1. follow up"]);
        let graph = MockTransport::new(&[]);
        let api = MockTransport::new(&[]);

        let pipeline = SurveillancePipeline::new(llm, graph, api);
        let state = pipeline.run("Get all alerts for trader Bill Lyons").await;

        assert!(state.error.is_none());
        let graph_names: Vec<String> = pipeline
            .graph_tools
            .calls()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(graph_names, vec!["get_alerts_for_trader", "get_trader_network"]);

        let api_names: Vec<String> = pipeline
            .api_tools
            .calls()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(api_names, vec!["get_real_time_alerts", "get_trader_profile"]);
    }

    #[tokio::test]
    async fn tool_error_payload_is_data_not_a_fault() {
        let intent = spoofing_intent();
        let llm = MockChat::new(
            Some(intent.as_str()),
            &["could not reach the graph store", "1. Re-run once connectivity is restored"],
        );
        let graph = MockTransport::new(&[(
            "get_alerts_by_type",
            json!({"error": "Connection error: connection refused"}),
        )]);
        let api = MockTransport::new(&[]);

        let pipeline = SurveillancePipeline::new(llm, graph, api);
        let state = pipeline.run("spoofing alerts please").await;

        assert!(state.error.is_none());
        assert_eq!(
            state.neo4j_data["spoofing_alerts"]["error"],
            "Connection error: connection refused"
        );
        assert!(!state.analysis.is_empty());
    }

    #[tokio::test]
    async fn llm_fault_yields_terminal_error_state() {
        let pipeline = SurveillancePipeline::new(
            MockChat::failing(),
            MockTransport::new(&[]),
            MockTransport::new(&[]),
        );
        let state = pipeline.run("anything").await;

        assert!(state.error.as_deref().unwrap().starts_with("Error processing query:"));
        assert_eq!(state.insights.len(), 1);
        assert!(state.insights[0].starts_with("Failed to process query:"));
        assert!(state.analysis.is_empty());
    }

    #[tokio::test]
    async fn extraction_failure_falls_back_to_keywords() {
        // Extraction unavailable, chat still works: keyword intent drives
        // the fetches.
        let llm = MockChat::new(None, &["analysis", "1. check"]);
        let graph = MockTransport::new(&[]);
        let api = MockTransport::new(&[]);

        let pipeline = SurveillancePipeline::new(llm, graph, api);
        let state = pipeline
            .run("any wash trading involving trader Bill Lyons?")
            .await;

        assert!(state.error.is_none());
        let graph_calls = pipeline.graph_tools.calls();
        let names: Vec<&str> = graph_calls.iter().map(|(n, _)| n.as_str()).collect();
        assert!(names.contains(&"get_alerts_for_trader"));
        assert!(names.contains(&"get_alerts_by_type"));
    }
}
