use thiserror::Error;

/// Errors produced by the agents and the deployment CLI.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Invalid meeting URL: {0}")]
    InvalidUrl(String),
    #[error("Guest login failed: {0}")]
    Auth(String),
    #[error("Room join failed: {0}")]
    Join(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Decoder error: {0}")]
    Decoder(String),
    #[error("Stream error: {0}")]
    Stream(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Deploy error: {0}")]
    Deploy(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
