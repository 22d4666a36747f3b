use thiserror::Error;

/// Failure taxonomy for the live client. Nothing here is fatal: transport
/// errors recover through the reconnect loop, parse errors drop the single
/// offending frame, and pull errors leave the previous surface state
/// untouched.
#[derive(Debug, Error)]
pub enum DashError {
    #[error("transport: {0}")]
    Transport(String),

    #[error("frame parse: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("pull {url} returned status {status}")]
    PullStatus { url: String, status: u16 },

    #[error("pull request: {0}")]
    Pull(#[from] reqwest::Error),

    #[error("endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}
