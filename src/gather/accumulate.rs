use serde_json::Value;

use super::PageSource;
use crate::warning;

/// Fetches every page of a collection and concatenates the surviving items.
///
/// The loop starts with an unknown total (a sentinel treated as larger than
/// any real collection, so the first fetch always proceeds) and re-reads the
/// reported total from every page: the most recently observed value is
/// authoritative, since the remote collection can be mutated while we page
/// through it. Null placeholder items, which the API emits for deleted
/// entries, are filtered out as pages arrive.
///
/// A page failure ends the loop: it is logged with the resource id and
/// offset, and whatever was accumulated so far is returned. An empty
/// collection yields an explicitly empty vector, never an error.
pub async fn accumulate<S: PageSource>(source: &S, resource_id: &str) -> Vec<Value> {
    let mut items: Vec<Value> = Vec::new();
    let mut offset: u64 = 0;
    // sentinel: unknown until the first page reports a total
    let mut total = u64::MAX;

    while offset < total {
        let limit = S::PAGE_CAP.min(total.saturating_sub(offset));

        let page = match source.fetch_page(resource_id, offset, limit).await {
            Ok(page) => page,
            Err(err) => {
                warning!(
                    "Failed to fetch page of {id} at offset {offset}: {err}. Keeping the {count} items fetched so far.",
                    id = resource_id,
                    count = items.len()
                );
                break;
            }
        };

        match page.total {
            Some(reported) => {
                if total != u64::MAX && reported < total && reported <= offset {
                    warning!(
                        "Collection {id} shrank from {total} to {reported} while paging; result may under-read.",
                        id = resource_id
                    );
                }
                total = reported;
            }
            // server did not report a size; this page is all we can trust
            None => total = offset + page.items.len() as u64,
        }

        items.extend(page.items.into_iter().filter(|item| !item.is_null()));
        offset += limit;
    }

    items
}
