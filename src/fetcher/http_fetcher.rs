use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::config::FetchConfig;
use crate::domain::Credentials;
use crate::fetcher::{Fetcher, TransportError};

pub struct HttpFetcher {
    client: Client,
    insecure_client: Client,
}

impl HttpFetcher {
    /// Build a verifying client and one that skips certificate checks.
    pub fn new(config: &FetchConfig) -> Result<Self, TransportError> {
        Ok(Self {
            client: build_client(config, false)?,
            insecure_client: build_client(config, true)?,
        })
    }

    /// Use `client` for every request, whatever the insecure flag says.
    pub fn with_client(client: Client) -> Self {
        Self {
            insecure_client: client.clone(),
            client,
        }
    }
}

fn build_client(config: &FetchConfig, insecure: bool) -> Result<Client, TransportError> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .gzip(config.gzip)
        .brotli(config.gzip)
        .user_agent(config.user_agent.as_str())
        .danger_accept_invalid_certs(insecure)
        .build()
        .map_err(TransportError::Request)
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &str,
        insecure: bool,
        credentials: &Credentials,
    ) -> Result<Vec<u8>, TransportError> {
        let url = Url::parse(url)?;
        let client = if insecure {
            &self.insecure_client
        } else {
            &self.client
        };

        let mut request = client.get(url);
        if credentials.is_set() {
            request = request.basic_auth(&credentials.username, Some(&credentials.password));
        }

        let response = request.send().await.map_err(TransportError::from_reqwest)?;
        let status = response.status();

        if credentials.is_set() && matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(TransportError::Unauthorized(status.as_u16()));
        }
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(TransportError::from_reqwest)?;
        Ok(body.to_vec())
    }
}
