//! Axum transport for a tool set: one `/mcp` endpoint speaking the
//! JSON-RPC envelope, plus a health route.

use std::sync::Arc;

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::envelope::{
    rpc_error, rpc_result, text_content, CallParams, RpcRequest, INVALID_PARAMS, INVALID_REQUEST,
    METHOD_NOT_FOUND,
};
use crate::registry::ToolSet;

/// Build the router for one tool server.
pub fn tool_router<T: ToolSet + 'static>(toolset: Arc<T>) -> Router {
    Router::new()
        .route("/", get(|| async { "ok" }))
        .route("/mcp", post(rpc_handler::<T>))
        .with_state(toolset)
        .layer(TraceLayer::new_for_http())
}

async fn rpc_handler<T: ToolSet + 'static>(
    State(toolset): State<Arc<T>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let request: RpcRequest = match serde_json::from_value(body) {
        Ok(request) => request,
        Err(e) => {
            return Json(rpc_error(
                Value::Null,
                INVALID_REQUEST,
                &format!("Invalid request: {e}"),
            ));
        }
    };

    match request.method.as_str() {
        "tools/list" => {
            let tools = toolset.list_tools();
            Json(rpc_result(request.id, json!({ "tools": tools })))
        }
        "tools/call" => {
            let params: CallParams = match serde_json::from_value(request.params) {
                Ok(params) => params,
                Err(e) => {
                    return Json(rpc_error(
                        request.id,
                        INVALID_PARAMS,
                        &format!("Invalid params: {e}"),
                    ));
                }
            };

            info!(tool = %params.name, "tools/call");
            let result = toolset.call_tool(&params.name, params.arguments).await;

            // Results travel as a single-element text-content sequence.
            Json(rpc_result(request.id, json!([text_content(&result)])))
        }
        other => Json(rpc_error(
            request.id,
            METHOD_NOT_FOUND,
            &format!("Method not found: {other}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ToolDescriptor;
    use async_trait::async_trait;

    struct EchoToolSet;

    #[async_trait]
    impl ToolSet for EchoToolSet {
        fn list_tools(&self) -> Vec<ToolDescriptor> {
            vec![ToolDescriptor {
                name: "echo".into(),
                description: "Echo the arguments back".into(),
                input_schema: json!({"type": "object", "properties": {}, "required": []}),
            }]
        }

        async fn call_tool(&self, name: &str, arguments: Value) -> Value {
            if name == "echo" {
                json!({ "echoed": arguments })
            } else {
                json!({ "error": format!("Unknown tool: {name}") })
            }
        }
    }

    async fn send(body: Value) -> Value {
        let toolset = Arc::new(EchoToolSet);
        let Json(response) = rpc_handler(State(toolset), Json(body)).await;
        response
    }

    #[tokio::test]
    async fn list_returns_tools_object() {
        let response = send(json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"})).await;
        assert_eq!(response["result"]["tools"][0]["name"], "echo");
        assert_eq!(response["id"], 1);
    }

    #[tokio::test]
    async fn call_wraps_payload_in_text_content() {
        let response = send(json!({
            "jsonrpc": "2.0",
            "id": 2,
            "method": "tools/call",
            "params": {"name": "echo", "arguments": {"k": "v"}}
        }))
        .await;

        let result = response["result"].as_array().unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0]["type"], "text");
        let inner: Value = serde_json::from_str(result[0]["text"].as_str().unwrap()).unwrap();
        assert_eq!(inner["echoed"]["k"], "v");
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error_payload_not_a_fault() {
        let response = send(json!({
            "jsonrpc": "2.0",
            "id": 3,
            "method": "tools/call",
            "params": {"name": "nope"}
        }))
        .await;

        let result = response["result"].as_array().unwrap();
        let inner: Value = serde_json::from_str(result[0]["text"].as_str().unwrap()).unwrap();
        assert_eq!(inner["error"], "Unknown tool: nope");
    }

    #[tokio::test]
    async fn unknown_method_is_a_protocol_error() {
        let response = send(json!({"jsonrpc": "2.0", "id": 4, "method": "tools/burn"})).await;
        assert_eq!(response["error"]["code"], METHOD_NOT_FOUND);
    }
}
