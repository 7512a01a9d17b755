pub mod auth;
pub mod client;
pub mod types;

pub use auth::RequestTokenError;
pub use client::SpotifyClient;

#[derive(Debug, thiserror::Error)]
pub enum SpotifyError {
    #[error("Failed to get access token: {0}")]
    Token(#[from] RequestTokenError),
    #[error("Failed to send http request: {0}")]
    FailedToSendRequest(reqwest::Error),
    #[error("Nothing found at {url}")]
    NotFound { url: String },
    #[error("Spotify responded with {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
    #[error("Failed to parse response: {0}")]
    FailedToParseResponse(reqwest::Error),
}
