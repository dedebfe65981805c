use std::{fs::File, path::PathBuf};

use super::{preview, spinner};
use crate::{
    Res, error, gather, info, spotify::SpotifyClient, success, table::Table,
};

/// Searches playlists matching `query` and prints them as a table,
/// optionally writing the full result to a CSV file.
pub async fn playlists(query: String, count: u64, output: Option<PathBuf>) {
    let spotify = match SpotifyClient::from_env() {
        Ok(client) => client,
        Err(e) => {
            error!("Cannot build Spotify client: {}", e);
        }
    };

    let pb = spinner(&format!("Searching playlists for {query:?}..."));
    let table = match gather::search_playlists_table(&spotify, &query, count).await {
        Ok(table) => table,
        Err(e) => {
            pb.finish_and_clear();
            error!("Playlist search failed: {}", e);
        }
    };
    pb.finish_and_clear();

    if table.is_empty() {
        info!("No playlists found for {query:?}.");
        return;
    }

    println!("{}", preview(&table, 20));
    if table.len() > 20 {
        info!("Showing 20 of {} playlists.", table.len());
    }

    if let Some(path) = output {
        match write_table(&table, &path) {
            Ok(_) => success!("Wrote {} playlists to {}", table.len(), path.display()),
            Err(e) => {
                error!("Cannot write {}: {}", path.display(), e);
            }
        }
    }
}

pub(crate) fn write_table(table: &Table, path: &PathBuf) -> Res<()> {
    let file = File::create(path)?;
    table.write_csv(file)?;
    Ok(())
}
