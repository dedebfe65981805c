use std::collections::HashSet;

use serde_json::Value;

use super::FeatureSource;
use crate::{
    error::GatherError,
    table::{Suffixes, Table},
    warning,
};

/// Fetches supplemental audio features for every id in `id_column` and
/// left-joins them onto `table`.
///
/// Precondition: the identifier column must not contain nulls. Batch
/// boundaries in the underlying API are strict and a null would corrupt a
/// batch request, so this fails fast with
/// [`GatherError::NullIdentifier`] before any fetch is issued.
///
/// Ids are deduplicated (first occurrence wins, so each id is fetched at
/// most once) and partitioned into contiguous batches of at most
/// `batch_size`, clamped to the source's batch cap. A failed batch stops
/// further fetching; ids left unresolved simply get null attribute columns
/// through the left join, which preserves every row of the original table,
/// duplicates included.
pub async fn join_features<S: FeatureSource>(
    source: &S,
    table: &Table,
    id_column: &str,
    batch_size: usize,
) -> Result<Table, GatherError> {
    let ids = table.column(id_column)?;
    if ids.iter().any(|v| v.is_null()) {
        return Err(GatherError::NullIdentifier {
            column: id_column.to_string(),
        });
    }

    let mut seen = HashSet::new();
    let unique: Vec<String> = ids
        .iter()
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .filter(|id| seen.insert(id.clone()))
        .collect();

    let batch_size = batch_size.clamp(1, S::BATCH_CAP);
    let mut features: Vec<Value> = Vec::new();
    for batch in unique.chunks(batch_size) {
        match source.fetch_features(batch).await {
            Ok(batch_features) => {
                features.extend(batch_features.into_iter().filter(|f| !f.is_null()));
            }
            Err(err) => {
                warning!(
                    "Audio-feature batch of {len} ids failed: {err}. Joining the {got} feature rows fetched so far.",
                    len = batch.len(),
                    got = features.len()
                );
                break;
            }
        }
    }

    let mut feature_table = Table::from_records(&features);
    if !feature_table.is_empty() {
        // keep the caller's identifier column distinct from the API's own
        feature_table.rename("id", "feature_id")?;
    }

    table.left_join(
        &feature_table,
        id_column,
        "feature_id",
        &Suffixes::new("_track", "_feature"),
    )
}
