use serde::Deserialize;

/// Main configuration structure for Sitemap-Walker
///
/// Every section is optional; a missing config file is the same as an empty one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetcher: FetcherConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub checkpoint: CheckpointConfig,
}

/// HTTP fetch behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Minimum time between two consecutive requests (milliseconds)
    #[serde(rename = "request-interval-ms")]
    pub request_interval_ms: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            request_interval_ms: 2000,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SitemapWalker".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
            contact_email: "contact@example.com".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// Format: `Name/Version (+ContactURL; ContactEmail)`, or
    /// `Name/Version (+ContactEmail)` when no contact URL is configured.
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(url) => format!(
                "{}/{} (+{}; {})",
                self.crawler_name, self.crawler_version, url, self.contact_email
            ),
            None => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, self.contact_email
            ),
        }
    }
}

/// Checkpointing behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CheckpointConfig {
    /// Save the checkpoint after every N worklist items (0 disables per-item saves)
    pub every: u32,

    /// Delete the checkpoint once a run finishes with an empty worklist
    #[serde(rename = "remove-on-completion")]
    pub remove_on_completion: bool,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            every: 1,
            remove_on_completion: false,
        }
    }
}
