use serde_json::Value;

use super::{PageSource, accumulate};
use crate::{
    error::GatherError,
    flatten::flatten_records,
    table::{JoinKind, Suffixes, Table},
    warning,
};

/// Harvests the tracks of every playlist in `playlists` into one unified
/// table joined back onto the playlist metadata.
///
/// `playlists` must carry an `id` column. For each id, in input order, the
/// playlist's tracks are accumulated, flattened (the nested `album` mapping
/// becomes `album_*` columns), tagged with a `playlist_id` column, and
/// concatenated onto the running result. A playlist that fails to process
/// is logged with its id and skipped; the run continues with the rest.
///
/// The final join back onto `playlists` matches `playlist_id` against the
/// metadata `id`. Both tables carry `id` and `name` columns, so overlapping
/// names are disambiguated with the `_track` / `_playlist` suffixes. `join`
/// picks whether unmatched track rows survive (left) or not (inner).
pub async fn aggregate<S: PageSource>(
    source: &S,
    playlists: &Table,
    join: JoinKind,
) -> Result<Table, GatherError> {
    let ids: Vec<Value> = playlists
        .column("id")?
        .into_iter()
        .cloned()
        .collect();

    let mut unified = Table::new();
    for id in &ids {
        let Some(playlist_id) = id.as_str() else {
            warning!("Skipping playlist with non-string id {id}");
            continue;
        };

        match collect_playlist_tracks(source, playlist_id).await {
            Ok(tracks) => unified.concat(tracks),
            Err(err) => {
                warning!("Error with playlist {playlist_id}: {err}. Continuing.");
            }
        }
    }

    if unified.is_empty() {
        return Ok(unified);
    }

    unified.join(
        playlists,
        "playlist_id",
        "id",
        &Suffixes::new("_track", "_playlist"),
        join,
    )
}

/// One playlist's worth of tracks as a flat table tagged with the playlist
/// id. Zero tracks yield an explicitly empty table so concatenation and the
/// later metadata join stay total.
async fn collect_playlist_tracks<S: PageSource>(
    source: &S,
    playlist_id: &str,
) -> Result<Table, GatherError> {
    let records = accumulate(source, playlist_id).await;
    if records.is_empty() {
        return Ok(Table::new());
    }

    let mut table = flatten_records(&records, &["album"])?;
    table.tag("playlist_id", Value::String(playlist_id.to_string()));
    Ok(table)
}
