use super::{SpotifyClient, send_with_retry};
use crate::{
    error::FetchError,
    types::{Page, SearchPlaylistsResponse},
};

/// The search endpoint caps a page at 50 entries.
pub const PAGE_CAP: u64 = 50;

/// Retrieves one page of playlist search results.
///
/// Uses the `/search?type=playlist` endpoint. The returned page keeps the
/// raw playlist records; known API quirk: the item list can contain null
/// placeholders, which callers filter during accumulation.
pub async fn search_playlists(
    spotify: &SpotifyClient,
    query: &str,
    offset: u64,
    limit: u64,
) -> Result<Page, FetchError> {
    let url = format!("{uri}/search", uri = &spotify.api_url);
    let request = spotify
        .http
        .get(&url)
        .bearer_auth(&spotify.token)
        .query(&[
            ("q", query.to_string()),
            ("type", "playlist".to_string()),
            ("offset", offset.to_string()),
            ("limit", limit.min(PAGE_CAP).to_string()),
        ]);

    let response = send_with_retry(request).await?;
    let json = response
        .json::<SearchPlaylistsResponse>()
        .await
        .map_err(|e| FetchError::network(e.to_string()))?;

    Ok(json.playlists)
}
