use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// RSSHub JSON-feed URLs, one per channel
    pub feeds: Vec<String>,
    /// Prefix concatenated in front of every extracted thumbnail URL
    #[serde(default = "default_image_proxy")]
    pub image_proxy: String,
    /// Maximum number of videos returned by the HTTP surface
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Accepted but not applied to any item yet; the upstream feed data
    /// carries no shorts marker to filter on
    #[serde(default)]
    pub include_shorts: bool,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Deadline for one whole aggregation pass in seconds
    #[serde(default = "default_aggregation_deadline")]
    pub aggregation_deadline_secs: u64,
}

fn default_image_proxy() -> String {
    "//wsrv.nl/?url=".to_string()
}

fn default_limit() -> usize {
    25
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_aggregation_deadline() -> u64 {
    30
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}
