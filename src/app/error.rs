use thiserror::Error;

use crate::config::ConfigError;
use crate::fetcher::TransportError;
use crate::parser::ParseError;

#[derive(Error, Debug)]
pub enum RunnelError {
    #[error("feed has no URL")]
    NoUrl,

    #[error("certificate signed by unknown authority")]
    CertificateUntrusted,

    #[error("wrong login/password")]
    AuthenticationFailure,

    #[error("Transport error: {0}")]
    Transport(TransportError),

    #[error("Feed parsing error: {0}")]
    Parse(#[from] ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("State file error: {0}")]
    State(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Feed not found: {0}")]
    FeedNotFound(String),

    #[error("Update task failed: {0}")]
    TaskFailed(String),
}

impl From<TransportError> for RunnelError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::UnknownAuthority => RunnelError::CertificateUntrusted,
            TransportError::Unauthorized(_) => RunnelError::AuthenticationFailure,
            other => RunnelError::Transport(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, RunnelError>;
