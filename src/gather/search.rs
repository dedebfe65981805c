use serde_json::Value;

use super::SearchSource;
use crate::{error::GatherError, flatten::unravel, table::Table, warning};

/// Columns kept from a raw playlist record; everything else (images, owner,
/// collaborative flags) is noise for the harvest.
const PLAYLIST_COLUMNS: [&str; 4] = ["id", "name", "description", "tracks"];

/// Searches for up to `count` playlists matching `query` and returns them
/// as a table of `id`, `name`, `description` and the flattened `tracks`
/// pointer (`tracks_href`, `tracks_total`).
///
/// Pages through the search endpoint at the source's page cap. A failed page ends
/// the search with whatever was collected so far; a query with no results
/// yields an explicitly empty table.
pub async fn search_playlists_table<S: SearchSource>(
    source: &S,
    query: &str,
    count: u64,
) -> Result<Table, GatherError> {
    let mut found: Vec<Value> = Vec::new();
    let mut offset: u64 = 0;

    while offset < count {
        let limit = S::PAGE_CAP.min(count - offset);

        let page = match source.search_page(query, offset, limit).await {
            Ok(page) => page,
            Err(err) => {
                warning!(
                    "Playlist search for {query:?} failed at offset {offset}: {err}. Keeping the {count} playlists found so far.",
                    count = found.len()
                );
                break;
            }
        };

        let fetched = page.items.len();
        found.extend(page.items.into_iter().filter(|item| !item.is_null()));

        if fetched == 0 {
            // results exhausted short of the requested count
            break;
        }
        offset += limit;
    }

    if found.is_empty() {
        return Ok(Table::new());
    }

    let table = Table::from_records(&found).select(&PLAYLIST_COLUMNS)?;
    unravel(&table, &["tracks"])
}
