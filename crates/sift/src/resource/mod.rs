// ABOUTME: Fetches raw HTML over HTTP before any tokenizing happens.
// ABOUTME: Refuses private addresses, caps body size, and decodes using the declared or detected charset.

use std::collections::HashMap;
use std::net::IpAddr;

use bytes::Bytes;
use ipnet::{Ipv4Net, Ipv6Net};
use tracing::debug;

use crate::error::SiftError;

/// Maximum allowed content length (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

/// Options for fetching a resource.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub headers: HashMap<String, String>,
    pub allow_private_networks: bool,
}

/// Result of a successful fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub status: u16,
    pub url: String,
    pub final_url: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl FetchResult {
    /// Decode the body as text, using the charset from the content-type header when present.
    pub fn text_utf8(&self) -> String {
        decode_body(&self.body, self.content_type.as_deref())
    }
}

/// Check if an IP address is in a private/reserved range.
pub(crate) fn is_private_ip(addr: &IpAddr) -> bool {
    const V4_RANGES: &[&str] = &[
        "10.0.0.0/8",
        "172.16.0.0/12",
        "192.168.0.0/16",
        "127.0.0.0/8",
        "169.254.0.0/16",
    ];
    const V6_RANGES: &[&str] = &["fc00::/7", "fe80::/10"];

    match addr {
        IpAddr::V4(ip) => V4_RANGES
            .iter()
            .filter_map(|net| net.parse::<Ipv4Net>().ok())
            .any(|net| net.contains(ip)),
        IpAddr::V6(ip) => {
            ip.is_loopback()
                || V6_RANGES
                    .iter()
                    .filter_map(|net| net.parse::<Ipv6Net>().ok())
                    .any(|net| net.contains(ip))
        }
    }
}

/// Decode body bytes to a String using charset from content-type header or detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(charset) = content_type.and_then(extract_charset) {
        if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
            let (decoded, _, _) = encoding.decode(body);
            return decoded.into_owned();
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract charset value from Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    lower.split(';').find_map(|part| {
        part.trim()
            .strip_prefix("charset=")
            .map(|charset| charset.trim_matches('"').trim_matches('\'').to_string())
    })
}

/// Refuse hosts that are, or resolve to, private addresses.
async fn check_host(url: &str, target: &url::Url, op_detail: &str) -> Result<(), SiftError> {
    let Some(host) = target.host_str() else {
        return Ok(());
    };
    let host = host.trim_start_matches('[').trim_end_matches(']');

    if let Ok(ip) = host.parse::<IpAddr>() {
        if is_private_ip(&ip) {
            return Err(SiftError::ssrf(
                url,
                "Fetch",
                Some(anyhow::anyhow!("{} private IP address is not allowed", op_detail)),
            ));
        }
        return Ok(());
    }

    let port = target.port_or_known_default().unwrap_or(80);
    let addrs = tokio::net::lookup_host((host, port)).await.map_err(|e| {
        SiftError::fetch(
            url,
            "Fetch",
            Some(anyhow::anyhow!("DNS lookup failed: {}", e)),
        )
    })?;

    for socket_addr in addrs {
        if is_private_ip(&socket_addr.ip()) {
            return Err(SiftError::ssrf(
                url,
                "Fetch",
                Some(anyhow::anyhow!("{} private IP address is not allowed", op_detail)),
            ));
        }
    }
    Ok(())
}

fn request_error(url: &str, context: &str, err: reqwest::Error) -> SiftError {
    if err.is_timeout() {
        SiftError::timeout(url, "Fetch", Some(anyhow::anyhow!("{}: {}", context, err)))
    } else {
        SiftError::fetch(url, "Fetch", Some(anyhow::anyhow!("{}: {}", context, err)))
    }
}

/// Fetch a resource from the given URL.
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    opts: &FetchOptions,
) -> Result<FetchResult, SiftError> {
    if url.is_empty() {
        return Err(SiftError::invalid_url(url, "Fetch", None));
    }

    let parsed_url = url::Url::parse(url).map_err(|e| {
        SiftError::invalid_url(url, "Fetch", Some(anyhow::anyhow!("invalid URL: {}", e)))
    })?;

    let scheme = parsed_url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(SiftError::invalid_url(
            url,
            "Fetch",
            Some(anyhow::anyhow!("scheme must be http or https")),
        ));
    }

    if !opts.allow_private_networks {
        check_host(url, &parsed_url, "requesting").await?;
    }

    let mut request = client.get(url);
    for (key, value) in &opts.headers {
        request = request.header(key, value);
    }

    let response = request
        .send()
        .await
        .map_err(|e| request_error(url, "request failed", e))?;

    // Redirects may land somewhere private even when the first host was public
    if !opts.allow_private_networks {
        let final_url = response.url().clone();
        check_host(url, &final_url, "redirect to").await?;
    }

    if let Some(len) = response.content_length() {
        if len as usize > MAX_CONTENT_LENGTH {
            return Err(SiftError::fetch(
                url,
                "Fetch",
                Some(anyhow::anyhow!("content too large")),
            ));
        }
    }

    let status = response.status().as_u16();

    if status != 200 {
        return Err(SiftError::fetch(
            url,
            "Fetch",
            Some(anyhow::anyhow!("HTTP status {}", status)),
        ));
    }

    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_lowercase());

    let body = response
        .bytes()
        .await
        .map_err(|e| request_error(url, "failed to read body", e))?;

    if body.len() > MAX_CONTENT_LENGTH {
        return Err(SiftError::fetch(
            url,
            "Fetch",
            Some(anyhow::anyhow!("content too large")),
        ));
    }

    debug!(%url, %final_url, status, bytes = body.len(), "fetched document");

    Ok(FetchResult {
        status,
        url: url.to_string(),
        final_url,
        content_type,
        body,
    })
}
