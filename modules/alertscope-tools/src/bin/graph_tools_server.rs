use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use alertscope_common::Config;
use alertscope_graph::{AlertGraphReader, GraphClient};
use alertscope_tools::{tool_router, GraphToolSet};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("alertscope_tools=info".parse()?)
                .add_directive("alertscope_graph=info".parse()?),
        )
        .init();

    let config = Config::from_env();

    info!(uri = %config.neo4j_uri, "Connecting to Neo4j");
    let client = GraphClient::connect(
        &config.neo4j_uri,
        &config.neo4j_username,
        &config.neo4j_password,
    )
    .await?;

    let toolset = Arc::new(GraphToolSet::new(AlertGraphReader::new(client)));
    let app = tool_router(toolset);

    let addr = format!("{}:{}", config.graph_tools_host, config.graph_tools_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "Graph tool server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
