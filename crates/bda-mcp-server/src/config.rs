use std::fmt;

use serde::Deserialize;

/// How the MCP server talks to its client.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    /// Newline-delimited JSON-RPC over stdin/stdout.
    #[default]
    Stdio,
    /// JSON-RPC over `POST /mcp`.
    Http,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Stdio => f.write_str("stdio"),
            Transport::Http => f.write_str("http"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default)]
    pub transport: Transport,
    #[serde(default = "ServerConfig::default_listen_addr")]
    pub listen_addr: String,
}

impl ServerConfig {
    pub const DEFAULT_LISTEN_ADDR: &'static str = "127.0.0.1:8080";

    fn default_listen_addr() -> String {
        Self::DEFAULT_LISTEN_ADDR.to_string()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: Transport::default(),
            listen_addr: Self::default_listen_addr(),
        }
    }
}
