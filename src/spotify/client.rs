use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

use governor::{
    Quota, RateLimiter, clock::DefaultClock, state::InMemoryState, state::direct::NotKeyed,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use crate::model::{Album, Playlist, TrackEntry};
use crate::ports::spotify::SpotifyApi;
use crate::spotify::SpotifyError;
use crate::spotify::auth::{CachedToken, SpotifyCredentials, request_client_token};
use crate::spotify::types::{SpotifyAlbum, SpotifyPaging, SpotifyPlaylist, SpotifyTrack};

const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const REQUESTS_PER_SECOND: NonZeroU32 = NonZeroU32::new(10).unwrap();

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Spotify API client authenticated as the app itself (no user login).
pub struct SpotifyClient {
    credentials: SpotifyCredentials,
    client: reqwest::Client,
    token: Mutex<Option<CachedToken>>,
    rate_limiter: Arc<DirectRateLimiter>,
}

impl SpotifyClient {
    pub fn new(credentials: SpotifyCredentials) -> Self {
        Self {
            credentials,
            client: reqwest::Client::new(),
            token: Mutex::new(None),
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_second(REQUESTS_PER_SECOND))),
        }
    }

    /// Fetch a first token so bad credentials show up before any link is pasted.
    pub async fn connect(credentials: SpotifyCredentials) -> Result<Self, SpotifyError> {
        let client = Self::new(credentials);
        client.access_token().await?;
        Ok(client)
    }

    async fn access_token(&self) -> Result<String, SpotifyError> {
        let mut token = self.token.lock().await;
        if let Some(cached) = token.as_ref()
            && cached.is_fresh(Instant::now())
        {
            return Ok(cached.access_token.clone());
        }

        log::debug!("Requesting new Spotify access token");
        let response = request_client_token(&self.client, &self.credentials).await?;
        let cached = CachedToken::from_response(response, Instant::now());
        let access_token = cached.access_token.clone();
        *token = Some(cached);
        Ok(access_token)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SpotifyError> {
        self.rate_limiter.until_ready().await;
        let access_token = self.access_token().await?;

        log::trace!("GET {}", url);
        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(SpotifyError::FailedToSendRequest)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::BAD_REQUEST {
            return Err(SpotifyError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(SpotifyError::UnexpectedStatus {
                status: status.as_u16(),
                body: response
                    .text()
                    .await
                    .unwrap_or("Failed to get error text".to_string()),
            });
        }

        response
            .json()
            .await
            .map_err(SpotifyError::FailedToParseResponse)
    }

    /// Follow `next` links until every item of a paged listing is collected.
    async fn collect_pages<T: DeserializeOwned>(
        &self,
        first: SpotifyPaging<T>,
    ) -> Result<Vec<T>, SpotifyError> {
        let mut items = first.items;
        let mut next_url = first.next;

        while let Some(url) = next_url {
            let page: SpotifyPaging<T> = self.get_json(&url).await?;
            items.extend(page.items);
            next_url = page.next;
        }

        Ok(items)
    }
}

#[async_trait::async_trait]
impl SpotifyApi for SpotifyClient {
    async fn track(&self, id: &str) -> Result<TrackEntry, SpotifyError> {
        let url = format!("{}/tracks/{}", SPOTIFY_API_URL, id);
        let track: SpotifyTrack = self.get_json(&url).await?;
        track
            .into_entry(&[], None)
            .ok_or(SpotifyError::NotFound { url })
    }

    async fn album(&self, id: &str) -> Result<Album, SpotifyError> {
        let mut album: SpotifyAlbum = self
            .get_json(&format!("{}/albums/{}", SPOTIFY_API_URL, id))
            .await?;
        let first_page = std::mem::replace(
            &mut album.tracks,
            SpotifyPaging {
                items: Vec::new(),
                next: None,
            },
        );
        let tracks = self.collect_pages(first_page).await?;
        log::debug!("Album {} has {} tracks", id, tracks.len());
        Ok(album.into_album(tracks))
    }

    async fn playlist(&self, id: &str) -> Result<Playlist, SpotifyError> {
        let mut playlist: SpotifyPlaylist = self
            .get_json(&format!("{}/playlists/{}", SPOTIFY_API_URL, id))
            .await?;
        let first_page = std::mem::replace(
            &mut playlist.tracks,
            SpotifyPaging {
                items: Vec::new(),
                next: None,
            },
        );
        let items = self.collect_pages(first_page).await?;
        log::debug!("Playlist {} has {} items", id, items.len());
        Ok(playlist.into_playlist(items))
    }
}
