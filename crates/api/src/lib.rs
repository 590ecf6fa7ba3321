//! Backend API client for the Safra farm-planning service.
//!
//! This crate provides a thin, pre-configured `reqwest` wrapper:
//!
//! - Constructing an HTTP client with sensible defaults (JSON Accept header,
//!   consistent User-Agent, 30 s timeout)
//! - Validating `SAFRA_API_BASE` for safety
//! - Holding the session cookie jar and resolving the anti-forgery token
//!   required by mutating endpoints
//!
//! The primary entry point is [`AgroClient`]. Create an instance via
//! [`AgroClient::from_env`], then build requests with [`AgroClient::request`].

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, RequestBuilder, header};
use tracing::debug;
use url::Url;

/// Environment variable overriding the backend base URL.
pub const API_BASE_ENV: &str = "SAFRA_API_BASE";
/// Environment variable overriding the anti-forgery token.
pub const CSRF_TOKEN_ENV: &str = "SAFRA_CSRF_TOKEN";
/// Environment variable carrying raw session cookies (`name=value; ...`)
/// to seed the jar with, e.g. copied from an authenticated browser session.
pub const COOKIE_ENV: &str = "SAFRA_COOKIE";

/// Default backend location for local development.
const DEFAULT_API_BASE: &str = "http://localhost:8000";
/// Cookie the backend issues for anti-forgery protection.
const CSRF_COOKIE_NAME: &str = "csrftoken";
/// Hostnames allowed with any scheme; everything else must use HTTPS.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

/// Thin wrapper around a configured `reqwest::Client` for backend access.
///
/// Requests are built against a validated base URL and share one cookie jar,
/// so the anti-forgery cookie set by the server on earlier responses is
/// available to later mutating calls.
#[derive(Debug, Clone)]
pub struct AgroClient {
    base_url: String,
    http: Client,
    jar: Arc<Jar>,
    user_agent: String,
}

impl AgroClient {
    /// Construct an [`AgroClient`] from environment variables.
    ///
    /// The base URL is taken from `SAFRA_API_BASE` (default
    /// `http://localhost:8000`). `SAFRA_COOKIE`, when set, seeds the cookie
    /// jar with session cookies for authenticated endpoints.
    pub fn from_env() -> Result<Self> {
        let base_url = env::var(API_BASE_ENV).unwrap_or_else(|_| DEFAULT_API_BASE.into());
        let client = Self::new(base_url)?;
        if let Ok(raw) = env::var(COOKIE_ENV) {
            client.seed_cookies(&raw)?;
        }
        Ok(client)
    }

    /// Construct an [`AgroClient`] against an explicit base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        validate_base_url(&base_url)?;

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let jar = Arc::new(Jar::default());
        let http = Client::builder()
            .default_headers(default_headers)
            .cookie_provider(jar.clone())
            .timeout(Duration::from_secs(30))
            .build()
            .context("build http client")?;

        Ok(Self {
            base_url,
            http,
            jar,
            user_agent: format!("safra/0.1; {}", env::consts::OS),
        })
    }

    /// The validated base URL this client targets.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a `reqwest::RequestBuilder` for a method and API-relative path.
    ///
    /// The resulting request includes the configured User-Agent and default
    /// headers, and is resolved against the base URL.
    pub fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "building request");

        self.http
            .request(method, url)
            .header(header::USER_AGENT, &self.user_agent)
    }

    /// Resolve the anti-forgery token for mutating requests.
    ///
    /// Resolution order: `SAFRA_CSRF_TOKEN` environment variable, then the
    /// `csrftoken` cookie currently in the jar. `None` means the mutating
    /// call must not be issued.
    pub fn csrf_token(&self) -> Option<String> {
        if let Ok(token) = env::var(CSRF_TOKEN_ENV)
            && !token.is_empty()
        {
            return Some(token);
        }
        let url = Url::parse(&self.base_url).ok()?;
        let header_value = self.jar.cookies(&url)?;
        parse_cookie_header(header_value.to_str().ok()?, CSRF_COOKIE_NAME)
    }

    /// Seed the cookie jar from a raw `Cookie:`-style string.
    fn seed_cookies(&self, raw: &str) -> Result<()> {
        let url = Url::parse(&self.base_url).context("parse base url for cookie seeding")?;
        for part in raw.split(';') {
            let part = part.trim();
            if !part.is_empty() {
                self.jar.add_cookie_str(part, &url);
            }
        }
        Ok(())
    }
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - `localhost` or `127.0.0.1`: any scheme is allowed
/// - otherwise: scheme must be HTTPS
fn validate_base_url(base: &str) -> Result<()> {
    let parsed = Url::parse(base).map_err(|e| anyhow!("Invalid {} URL '{}': {}", API_BASE_ENV, base, e))?;

    let host = parsed
        .host_str()
        .ok_or_else(|| anyhow!("{} must include a host", API_BASE_ENV))?;

    if LOCALHOST_DOMAINS.iter().any(|&allowed| host.eq_ignore_ascii_case(allowed)) {
        return Ok(());
    }

    if parsed.scheme() != "https" {
        return Err(anyhow!(
            "{} must use https for non-localhost hosts; got '{}://'",
            API_BASE_ENV,
            parsed.scheme()
        ));
    }

    Ok(())
}

/// Extract one cookie value from a `name=value; name2=value2` header string.
fn parse_cookie_header(raw: &str, name: &str) -> Option<String> {
    raw.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name && !value.is_empty()).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn localhost_allows_any_scheme() {
        assert!(validate_base_url("http://localhost:8000").is_ok());
        assert!(validate_base_url("http://127.0.0.1:8000").is_ok());
        assert!(validate_base_url("https://localhost").is_ok());
    }

    #[test]
    fn remote_hosts_require_https() {
        assert!(validate_base_url("https://agro.example.com").is_ok());
        assert!(validate_base_url("http://agro.example.com").is_err());
        assert!(validate_base_url("not a url").is_err());
    }

    #[test]
    fn cookie_header_parsing_picks_named_cookie() {
        let raw = "sessionid=abc123; csrftoken=tok456; theme=dark";
        assert_eq!(parse_cookie_header(raw, "csrftoken").as_deref(), Some("tok456"));
        assert_eq!(parse_cookie_header(raw, "sessionid").as_deref(), Some("abc123"));
        assert_eq!(parse_cookie_header(raw, "missing"), None);
        assert_eq!(parse_cookie_header("csrftoken=", "csrftoken"), None);
    }

    #[test]
    fn csrf_token_prefers_env_override() {
        temp_env::with_var(CSRF_TOKEN_ENV, Some("env-token"), || {
            let client = AgroClient::new("http://localhost:8000").unwrap();
            assert_eq!(client.csrf_token().as_deref(), Some("env-token"));
        });
    }

    #[test]
    fn csrf_token_reads_seeded_cookie_jar() {
        temp_env::with_var(CSRF_TOKEN_ENV, None::<&str>, || {
            let client = AgroClient::new("http://localhost:8000").unwrap();
            assert_eq!(client.csrf_token(), None);
            client.seed_cookies("sessionid=abc; csrftoken=jar-token").unwrap();
            assert_eq!(client.csrf_token().as_deref(), Some("jar-token"));
        });
    }

    #[test]
    fn trailing_slash_is_normalized_away() {
        let client = AgroClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }
}
