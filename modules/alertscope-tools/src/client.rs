//! Caller side of the tool transport.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

/// What the orchestration pipeline needs from a tool server. `call_tool`
/// never fails: transport problems come back as `{"error": ...}` payloads
/// so downstream stages treat them as data.
#[async_trait]
pub trait ToolTransport: Send + Sync {
    async fn call_tool(&self, name: &str, arguments: Value) -> Value;
    async fn list_tools(&self) -> Vec<Value>;
}

/// HTTP client for one tool server's `/mcp` endpoint.
pub struct ToolClient {
    http: reqwest::Client,
    base_url: String,
}

impl ToolClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn post_rpc(&self, method: &str, params: Value) -> Result<Value, Value> {
        let envelope = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(format!("{}/mcp", self.base_url))
            .json(&envelope)
            .send()
            .await
            .map_err(|e| json!({ "error": format!("Connection error: {e}") }))?;

        // A non-200 status and a refused connection are different
        // conditions, but callers get the same structured-error shape.
        if response.status().as_u16() != 200 {
            return Err(json!({
                "error": format!("HTTP error: {}", response.status().as_u16())
            }));
        }

        response
            .json()
            .await
            .map_err(|e| json!({ "error": format!("Connection error: {e}") }))
    }
}

#[async_trait]
impl ToolTransport for ToolClient {
    async fn call_tool(&self, name: &str, arguments: Value) -> Value {
        debug!(tool = name, "call_tool");

        match self
            .post_rpc("tools/call", json!({ "name": name, "arguments": arguments }))
            .await
        {
            Ok(body) => unwrap_call_result(&body),
            Err(error_payload) => {
                warn!(tool = name, payload = %error_payload, "tool call failed");
                error_payload
            }
        }
    }

    async fn list_tools(&self) -> Vec<Value> {
        match self.post_rpc("tools/list", json!({})).await {
            Ok(body) => body["result"]["tools"]
                .as_array()
                .cloned()
                .unwrap_or_default(),
            Err(error_payload) => {
                warn!(payload = %error_payload, "list_tools failed");
                Vec::new()
            }
        }
    }
}

/// Pull the structured payload out of a `tools/call` response body:
/// take the first element of the result sequence, and decode its inner
/// JSON when it is a text content block.
pub fn unwrap_call_result(body: &Value) -> Value {
    let first = body
        .get("result")
        .and_then(|r| r.as_array())
        .and_then(|seq| seq.first());

    match first {
        None => json!({}),
        Some(element) => match element.get("text").and_then(|t| t.as_str()) {
            Some(text) => serde_json::from_str(text)
                .unwrap_or_else(|_| Value::String(text.to_string())),
            None => element.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwraps_text_content_block() {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": [{"type": "text", "text": "{\"total_alerts\":3}"}]
        });
        assert_eq!(unwrap_call_result(&body), json!({"total_alerts": 3}));
    }

    #[test]
    fn bare_object_elements_pass_through() {
        let body = json!({"result": [{"total_alerts": 0, "alerts": []}]});
        assert_eq!(
            unwrap_call_result(&body),
            json!({"total_alerts": 0, "alerts": []})
        );
    }

    #[test]
    fn empty_or_missing_result_yields_empty_object() {
        assert_eq!(unwrap_call_result(&json!({"result": []})), json!({}));
        assert_eq!(unwrap_call_result(&json!({"id": 1})), json!({}));
    }

    #[test]
    fn non_json_text_is_kept_as_string() {
        let body = json!({"result": [{"type": "text", "text": "not json"}]});
        assert_eq!(unwrap_call_result(&body), json!("not json"));
    }
}
