use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::domain::Credentials;
use crate::fetcher::{Fetcher, TransportError};

pub type FetchFuture = BoxFuture<'static, Result<Vec<u8>, TransportError>>;

/// Fetcher backed by a zero-argument function.
///
/// The function decides everything about the request; the URL, insecure
/// flag and credentials passed to [`Fetcher::fetch`] are ignored. Use it to
/// plug in deadlines, proxies, or canned responses in tests.
pub struct FnFetcher {
    func: Box<dyn Fn() -> FetchFuture + Send + Sync>,
}

impl FnFetcher {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn() -> FetchFuture + Send + Sync + 'static,
    {
        Self {
            func: Box::new(func),
        }
    }
}

#[async_trait]
impl Fetcher for FnFetcher {
    async fn fetch(
        &self,
        _url: &str,
        _insecure: bool,
        _credentials: &Credentials,
    ) -> Result<Vec<u8>, TransportError> {
        (self.func)().await
    }
}
