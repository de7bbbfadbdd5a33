use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use alertscope_common::Config;
use alertscope_tools::{tool_router, ApiToolSet};
use surveillance_client::SurveillanceClient;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("alertscope_tools=info".parse()?),
        )
        .init();

    let config = Config::from_env();

    info!(base_url = %config.surveillance_api_url, "Surveillance API client ready");
    let client = SurveillanceClient::new(config.surveillance_api_url.clone());

    let toolset = Arc::new(ApiToolSet::new(client));
    let app = tool_router(toolset);

    let addr = format!("{}:{}", config.api_tools_host, config.api_tools_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "API tool server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
