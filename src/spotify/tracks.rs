use serde_json::Value;

use super::{SpotifyClient, send_with_retry};
use crate::{
    error::FetchError,
    types::{Page, PlaylistTracksResponse},
};

/// Item-listing endpoints cap a page at 100 entries.
pub const PAGE_CAP: u64 = 100;

/// Retrieves one page of a playlist's tracks.
///
/// Uses the `/playlists/{id}` endpoint with `offset` and `limit`. Each item
/// is unwrapped to its inner `track` object; tracks deleted since the
/// playlist was built come back as null placeholders and are kept in the
/// page so the accumulator can filter them.
pub async fn playlist_tracks_page(
    spotify: &SpotifyClient,
    playlist_id: &str,
    offset: u64,
    limit: u64,
) -> Result<Page, FetchError> {
    let url = format!(
        "{uri}/playlists/{id}",
        uri = &spotify.api_url,
        id = playlist_id
    );
    let request = spotify
        .http
        .get(&url)
        .bearer_auth(&spotify.token)
        .query(&[
            ("offset", offset.to_string()),
            ("limit", limit.min(PAGE_CAP).to_string()),
        ]);

    let response = send_with_retry(request).await?;
    let json = response
        .json::<PlaylistTracksResponse>()
        .await
        .map_err(|e| FetchError::network(e.to_string()))?;

    let mut page = json.tracks;
    page.items = page.items.into_iter().map(unwrap_track).collect();
    Ok(page)
}

fn unwrap_track(item: Value) -> Value {
    match item {
        Value::Object(mut map) => map.remove("track").unwrap_or(Value::Null),
        _ => Value::Null,
    }
}
