use serde::Deserialize;
use serde_json::Value;

/// One bounded slice of a paginated collection endpoint.
///
/// `items` preserves null placeholders the API emits for deleted entries;
/// filtering them is the accumulator's job. `total` is the collection size
/// as last reported by the server. It may change between pages if the
/// collection is mutated concurrently, so the most recently observed value
/// is authoritative.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub items: Vec<Value>,
    pub total: Option<u64>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchPlaylistsResponse {
    pub playlists: Page,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistTracksResponse {
    pub tracks: Page,
}

/// Response of the batch audio-features endpoint. Entries for ids the API
/// could not resolve come back as nulls.
#[derive(Debug, Clone, Deserialize)]
pub struct AudioFeaturesResponse {
    #[serde(default)]
    pub audio_features: Vec<Value>,
}
