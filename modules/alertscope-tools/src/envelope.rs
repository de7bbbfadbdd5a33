//! JSON-RPC-shaped request/response envelope for the tool transport.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_REQUEST: i64 = -32600;
pub const INVALID_PARAMS: i64 = -32602;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// Params of a `tools/call` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

pub fn rpc_result(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result,
    })
}

pub fn rpc_error(id: Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message },
    })
}

/// Wrap a structured payload in the uniform text envelope carried by
/// `tools/call` results.
pub fn text_content(payload: &Value) -> Value {
    json!({
        "type": "text",
        "text": payload.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_parses_with_defaulted_params() {
        let raw = json!({"jsonrpc": "2.0", "id": 7, "method": "tools/list"});
        let req: RpcRequest = serde_json::from_value(raw).unwrap();
        assert_eq!(req.method, "tools/list");
        assert_eq!(req.id, json!(7));
        assert!(req.params.is_null());
    }

    #[test]
    fn call_params_default_arguments_to_null() {
        let params: CallParams =
            serde_json::from_value(json!({"name": "get_alerts_for_trader"})).unwrap();
        assert_eq!(params.name, "get_alerts_for_trader");
        assert!(params.arguments.is_null());
    }

    #[test]
    fn text_content_json_encodes_payload() {
        let payload = json!({"total_alerts": 2});
        let content = text_content(&payload);
        assert_eq!(content["type"], "text");
        let inner: Value = serde_json::from_str(content["text"].as_str().unwrap()).unwrap();
        assert_eq!(inner, payload);
    }

    #[test]
    fn error_envelope_shape() {
        let err = rpc_error(json!(1), METHOD_NOT_FOUND, "Method not found");
        assert_eq!(err["error"]["code"], json!(METHOD_NOT_FOUND));
        assert_eq!(err["jsonrpc"], "2.0");
    }
}
