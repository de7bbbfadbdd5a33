mod client;
pub(crate) mod schema;

pub use schema::StructuredOutput;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::traits::ChatAgent;
use client::{ChatRequest, OpenAiClient};

/// OpenAI agent handle. Cheap to clone; each call builds a request
/// against the configured model.
#[derive(Clone)]
pub struct OpenAi {
    api_key: String,
    model: String,
    base_url: Option<String>,
}

impl OpenAi {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
        }
    }

    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow!("OPENAI_API_KEY environment variable not set"))?;
        Ok(Self::new(api_key, model))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn client(&self) -> OpenAiClient {
        let client = OpenAiClient::new(&self.api_key);
        if let Some(ref url) = self.base_url {
            client.with_base_url(url)
        } else {
            client
        }
    }

    /// Simple system-primed chat completion.
    pub async fn chat_completion(
        &self,
        system: impl Into<String>,
        user: impl Into<String>,
    ) -> Result<String> {
        let request = ChatRequest::new(&self.model, system, user);
        self.client().chat(&request).await
    }

    /// Structured output with a raw JSON schema. Returns the JSON text.
    pub async fn structured_output(
        &self,
        system: impl Into<String>,
        user: impl Into<String>,
        schema: serde_json::Value,
    ) -> Result<String> {
        let request = ChatRequest::new(&self.model, system, user).with_json_schema(schema);
        self.client().chat(&request).await
    }

    /// Type-safe structured output extraction via strict JSON schema.
    pub async fn extract<T: StructuredOutput>(
        &self,
        system: impl Into<String>,
        user: impl Into<String>,
    ) -> Result<T> {
        let json_str = self
            .structured_output(system, user, T::openai_schema())
            .await?;

        serde_json::from_str(&json_str)
            .map_err(|e| anyhow!("Failed to deserialize response: {}", e))
    }
}

#[async_trait]
impl ChatAgent for OpenAi {
    async fn chat(&self, system: &str, user: &str) -> Result<String> {
        self.chat_completion(system, user).await
    }

    async fn extract(
        &self,
        system: &str,
        user: &str,
        schema: serde_json::Value,
    ) -> Result<String> {
        self.structured_output(system, user, schema).await
    }
}
