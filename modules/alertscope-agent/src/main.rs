use std::io::{self, BufRead, Write};

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use ai_client::OpenAi;
use alertscope_agent::{PipelineState, SurveillancePipeline};
use alertscope_common::Config;
use alertscope_tools::ToolClient;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("alertscope_agent=info,alertscope_tools=info")),
        )
        .init();

    let config = Config::agent_from_env();

    let llm = OpenAi::new(&config.openai_api_key, &config.openai_model);
    let graph_tools = ToolClient::new(config.graph_tools_url());
    let api_tools = ToolClient::new(config.api_tools_url());
    let pipeline = SurveillancePipeline::new(llm, graph_tools, api_tools);

    // One-shot mode: the query is the command line. Otherwise read
    // queries interactively until EOF.
    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        let query = args.join(" ");
        let state = pipeline.run(&query).await;
        print_state(&state);
        return Ok(());
    }

    println!("Surveillance agent ready. Enter a query, or Ctrl-D to quit.");
    let stdin = io::stdin();
    loop {
        print!("query> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }

        let state = pipeline.run(query).await;
        print_state(&state);
    }

    Ok(())
}

fn print_state(state: &PipelineState) {
    if let Some(ref error) = state.error {
        eprintln!("{error}");
    }

    if !state.analysis.is_empty() {
        println!("\n=== Analysis ===\n{}", state.analysis);
    }

    if !state.insights.is_empty() {
        println!("\n=== Insights ===");
        for insight in &state.insights {
            println!("  {insight}");
        }
    }
    println!();
}
