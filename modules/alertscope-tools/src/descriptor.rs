use serde::{Deserialize, Serialize};

/// Declarative description of one callable tool, as returned by
/// `tools/list`. The argument schema carries `properties`, `required`,
/// and per-property defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}
