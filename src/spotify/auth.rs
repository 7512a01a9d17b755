use std::time::{Duration, Instant};

use base64::{
    Engine, alphabet,
    engine::{self, general_purpose},
};
use serde::Deserialize;

const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Tokens are refreshed this long before Spotify would reject them.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

const CUSTOM_ENGINE: engine::GeneralPurpose =
    engine::GeneralPurpose::new(&alphabet::STANDARD, general_purpose::PAD);

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyTokenResponse {
    pub access_token: String,
    pub expires_in: u64,
}

/// App credentials from the Spotify developer dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl SpotifyCredentials {
    fn basic_auth_header(&self) -> String {
        format!(
            "Basic {}",
            CUSTOM_ENGINE.encode(format!("{}:{}", self.client_id, self.client_secret))
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RequestTokenError {
    #[error("Invalid client credentials: {reason}")]
    InvalidCredentials { reason: String },
    #[error("Failed to send http request: {0}")]
    FailedToSendRequest(reqwest::Error),
    #[error("Failed to parse response: {0}")]
    FailedToParseResponse(reqwest::Error),
}

/// Request an app token with the client credentials flow.
/// https://developer.spotify.com/documentation/web-api/tutorials/client-credentials-flow
pub async fn request_client_token(
    client: &reqwest::Client,
    credentials: &SpotifyCredentials,
) -> Result<SpotifyTokenResponse, RequestTokenError> {
    let response = client
        .post(SPOTIFY_TOKEN_URL)
        // Serialized as x-www-form-urlencoded, as Spotify requires
        .form(&[("grant_type", "client_credentials")])
        .header("Authorization", credentials.basic_auth_header())
        .timeout(Duration::from_secs(10))
        .send()
        .await
        .map_err(RequestTokenError::FailedToSendRequest)?;

    if !response.status().is_success() {
        return Err(RequestTokenError::InvalidCredentials {
            reason: response
                .text()
                .await
                .unwrap_or("Failed to get error text".to_string()),
        });
    }

    response
        .json()
        .await
        .map_err(RequestTokenError::FailedToParseResponse)
}

/// An access token and the moment it should no longer be used.
#[derive(Debug, Clone)]
pub struct CachedToken {
    pub access_token: String,
    pub refresh_at: Instant,
}

impl CachedToken {
    pub fn from_response(response: SpotifyTokenResponse, received_at: Instant) -> Self {
        let lifetime = Duration::from_secs(response.expires_in).saturating_sub(EXPIRY_MARGIN);
        Self {
            access_token: response.access_token,
            refresh_at: received_at + lifetime,
        }
    }

    pub fn is_fresh(&self, now: Instant) -> bool {
        now < self.refresh_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(expires_in: u64) -> SpotifyTokenResponse {
        SpotifyTokenResponse {
            access_token: "token".to_string(),
            expires_in,
        }
    }

    #[test]
    fn test_basic_auth_header() {
        let credentials = SpotifyCredentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
        };
        // base64("id:secret")
        assert_eq!(credentials.basic_auth_header(), "Basic aWQ6c2VjcmV0");
    }

    #[test]
    fn test_cached_token_refreshes_before_expiry() {
        let now = Instant::now();
        let token = CachedToken::from_response(response(3600), now);
        assert!(token.is_fresh(now));
        assert!(token.is_fresh(now + Duration::from_secs(3539)));
        assert!(!token.is_fresh(now + Duration::from_secs(3540)));
    }

    #[test]
    fn test_short_lived_token_is_never_fresh() {
        let now = Instant::now();
        let token = CachedToken::from_response(response(30), now);
        assert!(!token.is_fresh(now));
    }

    #[test]
    fn test_token_response_parses() {
        let parsed: SpotifyTokenResponse = serde_json::from_str(
            r#"{"access_token":"abc","token_type":"Bearer","expires_in":3600}"#,
        )
        .unwrap();
        assert_eq!(parsed.access_token, "abc");
        assert_eq!(parsed.expires_in, 3600);
    }
}
