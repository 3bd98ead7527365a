use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub search: SearchSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Endpoint of the hosted web-search capability.
    pub api_url: String,
    /// Bearer token for the upstream; requests go out unauthenticated when empty.
    pub api_key: String,
    /// Fixed number of results requested per query.
    pub result_count: u32,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                workers: num_cpus::get(),
            },
            search: SearchSettings {
                api_url: "https://api.z.ai/v1/functions/web_search".to_string(),
                api_key: String::new(),
                result_count: 10,
                user_agent: format!("cyber-search/{}", env!("CARGO_PKG_VERSION")),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let mut config = Config::default();

        // Server configuration
        if let Ok(host) = env::var("HOST") {
            config.server.host = host;
        }
        if let Ok(port) = env::var("PORT") {
            config.server.port = port.parse()?;
        }
        if let Ok(workers) = env::var("WORKERS") {
            config.server.workers = workers.parse()?;
        }

        // Upstream search configuration
        if let Ok(api_url) = env::var("SEARCH_API_URL") {
            config.search.api_url = api_url;
        }
        if let Ok(api_key) = env::var("SEARCH_API_KEY") {
            config.search.api_key = api_key;
        }
        if let Ok(result_count) = env::var("SEARCH_RESULT_COUNT") {
            config.search.result_count = result_count.parse()?;
        }
        if let Ok(user_agent) = env::var("SEARCH_USER_AGENT") {
            config.search.user_agent = user_agent;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_request_ten_results() {
        let config = Config::default();
        assert_eq!(config.search.result_count, 10);
        assert!(config.search.api_key.is_empty());
    }
}
