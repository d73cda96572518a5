// ABOUTME: The Client that fetches pages and runs extraction, plus the network-free extract entry points.
// ABOUTME: Fetch failures are reported before tokenizing; extraction itself never fails.

use std::net::ToSocketAddrs;
use std::sync::Arc;

use tracing::debug;

use crate::builder::TreeBuilder;
use crate::error::SiftError;
use crate::heuristics::Heuristics;
use crate::options::{ClientBuilder, ContentType, Options};
use crate::resource::{fetch, is_private_ip, FetchOptions};
use crate::result::{word_count, Extraction};
use crate::select::top_node;
use crate::tokens::tokenize;
use crate::tree::Document;

/// Extract the main content of `html` with the builtin heuristics.
pub fn extract(html: &str) -> Extraction {
    extract_with(html, "", Heuristics::builtin())
}

/// Extract the main content of `html`; `url` only feeds the result's `url`/`domain`.
pub fn extract_with(html: &str, url: &str, heuristics: &Heuristics) -> Extraction {
    let doc = TreeBuilder::build(heuristics, tokenize(html));
    summarize(&doc, url)
}

/// Select the top node of a built document and render both views.
pub fn summarize(doc: &Document<'_>, url: &str) -> Extraction {
    let domain = url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
        .unwrap_or_default();

    let Some(top) = top_node(doc) else {
        debug!(%url, "no eligible node");
        return Extraction {
            url: url.to_string(),
            domain,
            ..Default::default()
        };
    };

    let text = doc.text(top);
    let element = doc.element(top);
    Extraction {
        url: url.to_string(),
        domain,
        tag: element.map(|el| el.tag.clone()),
        score: element.map(|el| el.score),
        html: doc.html(top),
        word_count: word_count(&text),
        text,
    }
}

fn redirect_policy(allow_private: bool) -> reqwest::redirect::Policy {
    reqwest::redirect::Policy::custom(move |attempt| {
        if allow_private {
            return attempt.follow();
        }
        let next = attempt.url().clone();
        let Some(host) = next.host_str() else {
            return attempt.follow();
        };
        let host = host.trim_start_matches('[').trim_end_matches(']');
        if let Ok(ip) = host.parse::<std::net::IpAddr>() {
            if is_private_ip(&ip) {
                return attempt.error("redirect to private IP blocked");
            }
            return attempt.follow();
        }

        // synchronous DNS resolution to avoid async in redirect policy
        let port = next.port_or_known_default().unwrap_or(80);
        match (host, port).to_socket_addrs() {
            Ok(mut addrs) => {
                if addrs.any(|sa| is_private_ip(&sa.ip())) {
                    attempt.error("redirect to private IP blocked")
                } else {
                    attempt.follow()
                }
            }
            Err(_) => attempt.error("DNS lookup failed during redirect"),
        }
    })
}

/// Fetches pages and extracts their main content.
pub struct Client {
    opts: Options,
    http_client: reqwest::Client,
    heuristics: Arc<Heuristics>,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a new Client with the given options.
    ///
    /// # Panics
    ///
    /// Panics if no custom HTTP client was supplied and the TLS backend
    /// cannot be initialized.
    pub fn new(opts: Options) -> Self {
        let http_client = opts.http_client.clone().unwrap_or_else(|| {
            reqwest::Client::builder()
                .redirect(redirect_policy(opts.allow_private_networks))
                .user_agent(&opts.user_agent)
                .timeout(opts.timeout)
                .cookie_store(true)
                .gzip(true)
                .brotli(true)
                .deflate(true)
                .build()
                .expect("failed to build HTTP client")
        });

        let heuristics = opts
            .heuristics
            .clone()
            .unwrap_or_else(|| Arc::new(Heuristics::default()));

        Self {
            opts,
            http_client,
            heuristics,
        }
    }

    pub fn content_type(&self) -> ContentType {
        self.opts.content_type
    }

    pub fn heuristics(&self) -> &Heuristics {
        &self.heuristics
    }

    /// Fetch `url` and extract its main content.
    pub async fn parse(&self, url: &str) -> Result<Extraction, SiftError> {
        let fetch_opts = FetchOptions {
            headers: self.opts.headers.clone(),
            allow_private_networks: self.opts.allow_private_networks,
        };

        let fetched = fetch(&self.http_client, url, &fetch_opts).await?;
        let html = fetched.text_utf8();
        Ok(extract_with(&html, &fetched.final_url, &self.heuristics))
    }

    /// Extract the main content of markup that is already in hand.
    pub fn parse_html(&self, html: &str, url: &str) -> Extraction {
        extract_with(html, url, &self.heuristics)
    }
}
