// ABOUTME: Client configuration: output ContentType, Options, and the fluent ClientBuilder.
// ABOUTME: Heuristics are shared through an Arc so one compiled set can serve many clients.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::client::Client;
use crate::heuristics::Heuristics;

/// Which extraction product `Extraction::content` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
    #[default]
    Html,
    Text,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContentType::Html => "html",
            ContentType::Text => "text",
        };
        write!(f, "{}", s)
    }
}

impl From<&str> for ContentType {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "text" | "txt" => ContentType::Text,
            _ => ContentType::Html,
        }
    }
}

/// Configuration options for the sift client.
#[derive(Debug, Clone)]
pub struct Options {
    pub timeout: Duration,
    pub user_agent: String,
    pub allow_private_networks: bool,
    pub content_type: ContentType,
    pub http_client: Option<reqwest::Client>,
    pub headers: HashMap<String, String>,
    pub heuristics: Option<Arc<Heuristics>>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: "sift/0.1".to_string(),
            allow_private_networks: false,
            content_type: ContentType::Html,
            http_client: None,
            headers: HashMap::new(),
            heuristics: None,
        }
    }
}

/// Builder for constructing Client instances with custom configuration.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    opts: Options,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            opts: Options::default(),
        }
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Allow or disallow requests to private networks.
    pub fn allow_private_networks(mut self, allow: bool) -> Self {
        self.opts.allow_private_networks = allow;
        self
    }

    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.opts.content_type = content_type;
        self
    }

    /// Use a custom HTTP client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Add a custom header to all requests.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.headers.insert(key.into(), value.into());
        self
    }

    /// Score and prune with a custom heuristics set instead of the builtin one.
    pub fn heuristics(mut self, heuristics: Arc<Heuristics>) -> Self {
        self.opts.heuristics = Some(heuristics);
        self
    }

    pub fn build(self) -> Client {
        Client::new(self.opts)
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
