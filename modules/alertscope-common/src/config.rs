use std::env;

/// Application configuration loaded from environment variables.
///
/// Every endpoint falls back to a localhost default so the whole stack
/// runs out of the box against a local Neo4j and a local surveillance API.
#[derive(Debug, Clone)]
pub struct Config {
    // Neo4j
    pub neo4j_uri: String,
    pub neo4j_username: String,
    pub neo4j_password: String,

    // External surveillance REST API
    pub surveillance_api_url: String,

    // Tool servers
    pub graph_tools_host: String,
    pub graph_tools_port: u16,
    pub api_tools_host: String,
    pub api_tools_port: u16,

    // LLM (only populated by agent_from_env)
    pub openai_api_key: String,
    pub openai_model: String,
}

impl Config {
    /// Load configuration for the tool servers. No LLM key needed.
    pub fn from_env() -> Self {
        Self {
            neo4j_uri: env_or("NEO4J_URI", "bolt://localhost:7687"),
            neo4j_username: env_or("NEO4J_USERNAME", "neo4j"),
            neo4j_password: env_or("NEO4J_PASSWORD", "password"),
            surveillance_api_url: env_or("SURVEILLANCE_API_URL", "http://localhost:8000/api"),
            graph_tools_host: env_or("GRAPH_TOOLS_HOST", "localhost"),
            graph_tools_port: port_env("GRAPH_TOOLS_PORT", 8001),
            api_tools_host: env_or("API_TOOLS_HOST", "localhost"),
            api_tools_port: port_env("API_TOOLS_PORT", 8002),
            openai_api_key: String::new(),
            openai_model: env_or("OPENAI_MODEL", "gpt-4"),
        }
    }

    /// Load configuration for the agent CLI.
    /// Panics with a clear message if OPENAI_API_KEY is missing.
    pub fn agent_from_env() -> Self {
        Self {
            openai_api_key: required_env("OPENAI_API_KEY"),
            ..Self::from_env()
        }
    }

    /// Base URL of the graph tool server as seen by the agent.
    pub fn graph_tools_url(&self) -> String {
        format!("http://{}:{}", self.graph_tools_host, self.graph_tools_port)
    }

    /// Base URL of the REST-API tool server as seen by the agent.
    pub fn api_tools_url(&self) -> String {
        format!("http://{}:{}", self.api_tools_host, self.api_tools_port)
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn port_env(key: &str, default: u16) -> u16 {
    match env::var(key) {
        Ok(v) => v.parse().unwrap_or_else(|_| panic!("{key} must be a port number")),
        Err(_) => default,
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_localhost() {
        for key in [
            "NEO4J_URI",
            "SURVEILLANCE_API_URL",
            "GRAPH_TOOLS_PORT",
            "API_TOOLS_PORT",
        ] {
            env::remove_var(key);
        }

        let config = Config::from_env();
        assert_eq!(config.neo4j_uri, "bolt://localhost:7687");
        assert_eq!(config.surveillance_api_url, "http://localhost:8000/api");
        assert_eq!(config.graph_tools_port, 8001);
        assert_eq!(config.api_tools_port, 8002);
    }

    #[test]
    fn tool_server_urls() {
        let mut config = Config::from_env();
        config.graph_tools_host = "localhost".into();
        config.graph_tools_port = 8001;
        assert_eq!(config.graph_tools_url(), "http://localhost:8001");
    }
}
