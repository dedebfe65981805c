use serde_json::Value;

use super::{SpotifyClient, send_with_retry};
use crate::{error::FetchError, types::AudioFeaturesResponse};

/// The audio-features endpoint accepts at most 100 ids per request.
pub const BATCH_CAP: usize = 100;

/// Retrieves audio features for a batch of track ids in a single request.
///
/// Ids are comma-joined into the `ids` query parameter. The response holds
/// one entry per requested id, in order; ids the API could not resolve
/// (deleted or unavailable tracks) come back as nulls and are left for the
/// caller to drop.
pub async fn audio_features_batch(
    spotify: &SpotifyClient,
    ids: &[String],
) -> Result<Vec<Value>, FetchError> {
    let id_string = ids.join(",");
    let url = format!("{uri}/audio-features", uri = &spotify.api_url);
    let request = spotify
        .http
        .get(&url)
        .bearer_auth(&spotify.token)
        .query(&[("ids", id_string)]);

    let response = send_with_retry(request).await?;
    let json = response
        .json::<AudioFeaturesResponse>()
        .await
        .map_err(|e| FetchError::network(e.to_string()))?;

    Ok(json.audio_features)
}
