use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use super::{features, search, tracks};
use crate::{
    config,
    error::{FetchError, GatherError},
    gather::{FeatureSource, PageSource, SearchSource},
    types::Page,
};

/// Reqwest-backed Spotify API client.
///
/// Holds the base URL and an immutable bearer credential; the credential is
/// injected at construction and attached to every request, there is no
/// mutable token state. The client implements the gather-engine source
/// traits so the engine never sees HTTP details.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    pub(crate) http: Client,
    pub(crate) api_url: String,
    pub(crate) token: String,
}

impl SpotifyClient {
    pub fn new(api_url: String, token: String) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(config::request_timeout_secs()))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http,
            api_url,
            token,
        }
    }

    /// Builds a client from `SPOTIFY_API_URL` and `SPOTIFY_API_TOKEN`.
    /// A missing token is an authentication failure: nothing can be fetched
    /// without it.
    pub fn from_env() -> Result<Self, GatherError> {
        Ok(Self::new(config::spotify_apiurl(), config::spotify_token()?))
    }
}

impl SearchSource for SpotifyClient {
    const PAGE_CAP: u64 = search::PAGE_CAP;

    async fn search_page(&self, query: &str, offset: u64, limit: u64) -> Result<Page, FetchError> {
        search::search_playlists(self, query, offset, limit).await
    }
}

impl PageSource for SpotifyClient {
    const PAGE_CAP: u64 = tracks::PAGE_CAP;

    async fn fetch_page(
        &self,
        resource_id: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Page, FetchError> {
        tracks::playlist_tracks_page(self, resource_id, offset, limit).await
    }
}

impl FeatureSource for SpotifyClient {
    const BATCH_CAP: usize = features::BATCH_CAP;

    async fn fetch_features(&self, ids: &[String]) -> Result<Vec<Value>, FetchError> {
        features::audio_features_batch(self, ids).await
    }
}
