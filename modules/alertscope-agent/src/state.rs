use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize)]
pub struct LogMessage {
    pub role: String,
    pub content: String,
}

/// The single record threaded through one pipeline run. Created per
/// query, returned to the caller, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineState {
    pub query: String,
    pub messages: Vec<LogMessage>,
    /// Graph-fetch results, keyed by what was fetched.
    pub neo4j_data: Value,
    /// REST-fetch results, keyed by what was fetched.
    pub api_data: Value,
    pub analysis: String,
    pub insights: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PipelineState {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            messages: Vec::new(),
            neo4j_data: json!({}),
            api_data: json!({}),
            analysis: String::new(),
            insights: Vec::new(),
            error: None,
        }
    }

    /// Terminal state for a run that faulted: an error and one synthetic
    /// diagnostic insight, nothing else.
    pub fn failed(query: impl Into<String>, message: &str) -> Self {
        Self {
            error: Some(format!("Error processing query: {message}")),
            insights: vec![format!("Failed to process query: {message}")],
            ..Self::new(query)
        }
    }

    pub fn log(&mut self, role: &str, content: impl Into<String>) {
        self.messages.push(LogMessage {
            role: role.to_string(),
            content: content.into(),
        });
    }
}
