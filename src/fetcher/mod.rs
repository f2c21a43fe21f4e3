pub mod func_fetcher;
pub mod http_fetcher;

use std::error::Error as StdError;

use async_trait::async_trait;
use thiserror::Error;

use crate::app::{Result, RunnelError};
use crate::config::FetchConfig;
use crate::domain::{Credentials, Feed};
use crate::parser::Parser;

pub use func_fetcher::{FetchFuture, FnFetcher};
pub use http_fetcher::HttpFetcher;

/// Error texts TLS stacks use when the peer's chain ends in an untrusted root.
const UNKNOWN_AUTHORITY_MARKERS: &[&str] = &[
    "unknown authority",
    "unknownissuer",
    "unable to get local issuer certificate",
    "self signed certificate",
    "self-signed certificate",
];

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("certificate signed by unknown authority")]
    UnknownAuthority,

    #[error("credentials rejected: status {0}")]
    Unauthorized(u16),

    #[error("HTTP error: status {0}")]
    Status(u16),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Request failed: {0}")]
    Request(reqwest::Error),

    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Tag TLS trust failures at the boundary so callers can match on the
    /// variant instead of the message.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if is_unknown_authority(&err) {
            TransportError::UnknownAuthority
        } else {
            TransportError::Request(err)
        }
    }
}

/// Walk the source chain looking for an untrusted-issuer TLS failure.
pub fn is_unknown_authority(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        let message = e.to_string().to_ascii_lowercase();
        if UNKNOWN_AUTHORITY_MARKERS.iter().any(|m| message.contains(m)) {
            return true;
        }
        current = e.source();
    }
    false
}

/// Retrieves the raw bytes of a feed document.
#[async_trait]
pub trait Fetcher {
    async fn fetch(
        &self,
        url: &str,
        insecure: bool,
        credentials: &Credentials,
    ) -> std::result::Result<Vec<u8>, TransportError>;
}

/// Fetch `url` through `fetcher`, parse it, and classify failures.
///
/// A parse failure that looks like an HTML page tried as Atom, right after
/// a username was configured, is reported as [`RunnelError::AuthenticationFailure`]:
/// many servers answer a bad login with a login page instead of a 401.
///
/// Only 2xx bodies reach the parser. Any other status, including a 401
/// answered to a request without credentials, fails as
/// [`RunnelError::Transport`] rather than as a parse error.
///
/// The returned snapshot carries `url`, `insecure` and `credentials` so it can
/// be re-fetched on its own.
pub async fn fetch_feed(
    fetcher: &(dyn Fetcher + Send + Sync),
    parser: &Parser,
    url: &str,
    insecure: bool,
    credentials: &Credentials,
) -> Result<Feed> {
    tracing::debug!(url, insecure, "Fetching feed");

    let body = fetcher
        .fetch(url, insecure, credentials)
        .await
        .map_err(|e| {
            tracing::warn!(url, error = %e, "Feed transport failed");
            RunnelError::from(e)
        })?;

    let mut feed = match parser.parse(&body) {
        Ok(feed) => feed,
        Err(e) if credentials.supplied() && e.is_atom_root_mismatch() => {
            tracing::warn!(url, error = %e, "Login page returned instead of feed");
            return Err(RunnelError::AuthenticationFailure);
        }
        Err(e) => {
            tracing::warn!(url, error = %e, "Feed parsing failed");
            return Err(e.into());
        }
    };

    if feed.link.is_empty() {
        feed.link = url.to_string();
    }
    feed.update_url = url.to_string();
    feed.insecure = insecure;
    feed.credentials = credentials.clone();

    tracing::debug!(url, items = feed.items().len(), "Fetched feed");
    Ok(feed)
}

/// Fetch with a freshly built HTTP client.
pub async fn fetch(
    url: &str,
    insecure: bool,
    credentials: &Credentials,
    config: &FetchConfig,
) -> Result<Feed> {
    let fetcher = HttpFetcher::new(config)?;
    fetch_feed(&fetcher, &Parser::new(), url, insecure, credentials).await
}

/// Fetch with a caller-configured client (proxies, timeouts, roots). The
/// client is used as is; `insecure` is only recorded on the result.
pub async fn fetch_by_client(
    url: &str,
    client: reqwest::Client,
    insecure: bool,
    credentials: &Credentials,
) -> Result<Feed> {
    let fetcher = HttpFetcher::with_client(client);
    fetch_feed(&fetcher, &Parser::new(), url, insecure, credentials).await
}

/// Fetch through an injected function.
pub async fn fetch_by_func<F>(
    func: F,
    url: &str,
    insecure: bool,
    credentials: &Credentials,
) -> Result<Feed>
where
    F: Fn() -> FetchFuture + Send + Sync + 'static,
{
    let fetcher = FnFetcher::new(func);
    fetch_feed(&fetcher, &Parser::new(), url, insecure, credentials).await
}
