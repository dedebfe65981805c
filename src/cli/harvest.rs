use std::path::PathBuf;

use chrono::Utc;

use super::{playlists::write_table, spinner};
use crate::{
    error, gather, info,
    spotify::{SpotifyClient, features::BATCH_CAP},
    success,
    table::JoinKind,
};

/// Runs the full harvest: search playlists, accumulate every playlist's
/// tracks, optionally join audio features, and write the unified table to a
/// CSV file.
///
/// Rows whose track id is null (deleted tracks that survived as playlist
/// entries) are dropped before the feature join, since the batch joiner
/// rejects null identifiers by contract.
///
/// The nested `album` mapping is flattened into `album_*` columns, but
/// list-valued columns such as `artists` are carried through whole and land
/// in the CSV as JSON text.
pub async fn harvest(query: String, count: u64, features: bool, output: Option<PathBuf>) {
    let spotify = match SpotifyClient::from_env() {
        Ok(client) => client,
        Err(e) => {
            error!("Cannot build Spotify client: {}", e);
        }
    };

    let pb = spinner(&format!("Searching playlists for {query:?}..."));
    let playlists = match gather::search_playlists_table(&spotify, &query, count).await {
        Ok(table) => table,
        Err(e) => {
            pb.finish_and_clear();
            error!("Playlist search failed: {}", e);
        }
    };

    if playlists.is_empty() {
        pb.finish_and_clear();
        info!("No playlists found for {query:?}; nothing to harvest.");
        return;
    }

    pb.set_message(format!(
        "Found {} playlists. Fetching tracks...",
        playlists.len()
    ));
    let mut table = match gather::aggregate(&spotify, &playlists, JoinKind::Left).await {
        Ok(table) => table,
        Err(e) => {
            pb.finish_and_clear();
            error!("Track aggregation failed: {}", e);
        }
    };

    if table.is_empty() {
        pb.finish_and_clear();
        info!("Playlists matched but no tracks could be harvested.");
        return;
    }

    if features {
        pb.set_message(format!(
            "Harvested {} track rows. Fetching audio features...",
            table.len()
        ));
        let with_ids = match table.drop_null_rows("id_track") {
            Ok(filtered) => filtered,
            Err(e) => {
                pb.finish_and_clear();
                error!("Cannot prepare track ids for the feature join: {}", e);
            }
        };
        table = match gather::join_features(&spotify, &with_ids, "id_track", BATCH_CAP).await {
            Ok(joined) => joined,
            Err(e) => {
                pb.finish_and_clear();
                error!("Audio-feature join failed: {}", e);
            }
        };
    }

    pb.finish_and_clear();

    let path = output
        .unwrap_or_else(|| PathBuf::from(format!("harvest-{}.csv", Utc::now().date_naive())));
    match write_table(&table, &path) {
        Ok(_) => success!(
            "Wrote {} rows x {} columns to {}",
            table.len(),
            table.columns().len(),
            path.display()
        ),
        Err(e) => {
            error!("Cannot write {}: {}", path.display(), e);
        }
    }
}
