use anyhow::Result;
use async_trait::async_trait;

/// The chat surface the orchestration layer depends on. Kept minimal so
/// tests can swap in a scripted fake instead of a live provider.
#[async_trait]
pub trait ChatAgent: Send + Sync {
    /// One system-primed completion. Returns the raw model text.
    async fn chat(&self, system: &str, user: &str) -> Result<String>;

    /// One completion constrained to the given JSON schema. Returns the
    /// raw JSON text; callers deserialize it themselves.
    async fn extract(&self, system: &str, user: &str, schema: serde_json::Value)
        -> Result<String>;
}
