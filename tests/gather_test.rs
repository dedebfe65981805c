use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{Value, json};
use spogather::error::{FetchError, GatherError};
use spogather::gather::{self, FeatureSource, PageSource, SearchSource};
use spogather::table::{JoinKind, Table};
use spogather::types::Page;

// A collection served page by page, with an optional failure at a given offset.
struct FakeTracks {
    items: Vec<Value>,
    fail_at_offset: Option<u64>,
    calls: AtomicUsize,
}

impl FakeTracks {
    fn new(items: Vec<Value>) -> Self {
        Self {
            items,
            fail_at_offset: None,
            calls: AtomicUsize::new(0),
        }
    }

    fn failing_at(items: Vec<Value>, offset: u64) -> Self {
        Self {
            items,
            fail_at_offset: Some(offset),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PageSource for FakeTracks {
    const PAGE_CAP: u64 = 100;

    async fn fetch_page(
        &self,
        _resource_id: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Page, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_at_offset == Some(offset) {
            return Err(FetchError::status(503, "Service Unavailable"));
        }
        let start = (offset as usize).min(self.items.len());
        let end = (start + limit as usize).min(self.items.len());
        Ok(Page {
            items: self.items[start..end].to_vec(),
            total: Some(self.items.len() as u64),
            next: None,
        })
    }
}

fn track(id: &str) -> Value {
    json!({"id": id, "name": format!("track {id}"), "album": {"id": format!("al-{id}"), "name": "Album"}})
}

#[tokio::test]
async fn test_accumulate_issues_ceil_n_over_p_fetches() {
    // 250 items with a 100-item page cap: exactly 3 fetches
    let items: Vec<Value> = (0..250).map(|i| track(&format!("t{i}"))).collect();
    let source = FakeTracks::new(items);

    let accumulated = gather::accumulate(&source, "p1").await;

    assert_eq!(source.calls(), 3);
    assert_eq!(accumulated.len(), 250);
}

#[tokio::test]
async fn test_accumulate_returns_partial_result_on_page_failure() {
    // total=150, first page holds 100 items of which 3 are null placeholders,
    // second fetch (offset=100) fails with 503
    let mut items: Vec<Value> = (0..150).map(|i| track(&format!("t{i}"))).collect();
    items[10] = Value::Null;
    items[20] = Value::Null;
    items[30] = Value::Null;
    let source = FakeTracks::failing_at(items, 100);

    let accumulated = gather::accumulate(&source, "p1").await;

    assert_eq!(source.calls(), 2);
    assert_eq!(accumulated.len(), 97);
    assert!(accumulated.iter().all(|item| !item.is_null()));
}

// A collection whose reported total changes from page to page, as it does
// when the remote collection is mutated while we page through it.
struct ShiftingTracks {
    items: Vec<Value>,
    totals: Vec<Option<u64>>,
    calls: AtomicUsize,
}

impl ShiftingTracks {
    fn new(items: Vec<Value>, totals: Vec<Option<u64>>) -> Self {
        Self {
            items,
            totals,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PageSource for ShiftingTracks {
    const PAGE_CAP: u64 = 100;

    async fn fetch_page(
        &self,
        _resource_id: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Page, FetchError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let start = (offset as usize).min(self.items.len());
        let end = (start + limit as usize).min(self.items.len());
        Ok(Page {
            items: self.items[start..end].to_vec(),
            total: self.totals.get(call).copied().flatten(),
            next: None,
        })
    }
}

#[tokio::test]
async fn test_accumulate_follows_a_growing_total() {
    // the collection gains rows mid-loop: the first page claims 150, later
    // pages claim 250, and the latest claim wins
    let items: Vec<Value> = (0..250).map(|i| track(&format!("t{i}"))).collect();
    let source = ShiftingTracks::new(items, vec![Some(150), Some(250), Some(250)]);

    let accumulated = gather::accumulate(&source, "p1").await;

    assert_eq!(source.calls(), 3);
    assert_eq!(accumulated.len(), 250);
}

#[tokio::test]
async fn test_accumulate_stops_when_total_shrinks_below_offset() {
    // the collection shrinks to 80 after 200 items were already covered;
    // the loop ends instead of paging toward the stale larger total
    let items: Vec<Value> = (0..250).map(|i| track(&format!("t{i}"))).collect();
    let source = ShiftingTracks::new(items, vec![Some(250), Some(80)]);

    let accumulated = gather::accumulate(&source, "p1").await;

    assert_eq!(source.calls(), 2);
    assert_eq!(accumulated.len(), 200);
}

#[tokio::test]
async fn test_accumulate_without_reported_total_trusts_one_page() {
    // no total reported at all: the loop keeps the page it got and stops
    let items: Vec<Value> = (0..100).map(|i| track(&format!("t{i}"))).collect();
    let source = ShiftingTracks::new(items, vec![None]);

    let accumulated = gather::accumulate(&source, "p1").await;

    assert_eq!(source.calls(), 1);
    assert_eq!(accumulated.len(), 100);
}

#[tokio::test]
async fn test_accumulate_empty_collection() {
    let source = FakeTracks::new(Vec::new());
    let accumulated = gather::accumulate(&source, "p1").await;
    assert_eq!(accumulated, Vec::<Value>::new());
    assert_eq!(source.calls(), 1);
}

// Several collections addressed by resource id, for aggregation tests.
struct FakeLibrary {
    collections: HashMap<String, Vec<Value>>,
}

impl PageSource for FakeLibrary {
    const PAGE_CAP: u64 = 100;

    async fn fetch_page(
        &self,
        resource_id: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Page, FetchError> {
        let items = self.collections.get(resource_id).cloned().unwrap_or_default();
        let start = (offset as usize).min(items.len());
        let end = (start + limit as usize).min(items.len());
        Ok(Page {
            items: items[start..end].to_vec(),
            total: Some(items.len() as u64),
            next: None,
        })
    }
}

#[tokio::test]
async fn test_aggregate_skips_failing_collection_and_keeps_the_rest() {
    // c1's records have no album column anywhere, so flattening fails and
    // the collection is skipped; c2 survives
    let mut collections = HashMap::new();
    collections.insert(
        "c1".to_string(),
        vec![json!({"id": "x1", "name": "broken"})],
    );
    collections.insert("c2".to_string(), vec![track("t1"), track("t2")]);
    let source = FakeLibrary { collections };

    let playlists = Table::from_records(&[
        json!({"id": "c1", "name": "One", "description": "d1", "tracks_total": 1}),
        json!({"id": "c2", "name": "Two", "description": "d2", "tracks_total": 2}),
    ]);

    let result = gather::aggregate(&source, &playlists, JoinKind::Left)
        .await
        .unwrap();

    assert_eq!(result.len(), 2);
    let tags = result.column("playlist_id").unwrap();
    assert!(tags.iter().all(|t| *t == &json!("c2")));

    // metadata joined back in, overlapping names disambiguated
    assert_eq!(
        result.column("description").unwrap(),
        vec![&json!("d2"), &json!("d2")]
    );
    assert_eq!(
        result.column("name_playlist").unwrap(),
        vec![&json!("Two"), &json!("Two")]
    );
    assert_eq!(
        result.column("name_track").unwrap(),
        vec![&json!("track t1"), &json!("track t2")]
    );
    assert!(result.column_index("album_name").is_some());
}

#[tokio::test]
async fn test_aggregate_empty_collection_yields_empty_table() {
    let mut collections = HashMap::new();
    collections.insert("c1".to_string(), Vec::new());
    let source = FakeLibrary { collections };

    let playlists =
        Table::from_records(&[json!({"id": "c1", "name": "One", "description": "d1"})]);

    let result = gather::aggregate(&source, &playlists, JoinKind::Left)
        .await
        .unwrap();
    assert!(result.is_empty());
}

// Feature backend that records every batch it is asked for.
struct FakeFeatures {
    calls: AtomicUsize,
    batches: Mutex<Vec<Vec<String>>>,
    fail_on_call: Option<usize>,
    unresolved: Vec<String>,
}

impl FakeFeatures {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            batches: Mutex::new(Vec::new()),
            fail_on_call: None,
            unresolved: Vec::new(),
        }
    }

    fn failing_on_call(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::new()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FeatureSource for FakeFeatures {
    const BATCH_CAP: usize = 100;

    async fn fetch_features(&self, ids: &[String]) -> Result<Vec<Value>, FetchError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on_call == Some(call) {
            return Err(FetchError::status(502, "Bad Gateway"));
        }
        self.batches.lock().unwrap().push(ids.to_vec());
        Ok(ids
            .iter()
            .map(|id| {
                if self.unresolved.contains(id) {
                    Value::Null
                } else {
                    json!({"id": id, "tempo": 120.0})
                }
            })
            .collect())
    }
}

fn id_table(ids: &[Value]) -> Table {
    Table::from_parts(
        vec!["track_id".to_string()],
        ids.iter().map(|id| vec![id.clone()]).collect(),
    )
}

#[tokio::test]
async fn test_join_features_rejects_null_ids_before_any_call() {
    let table = id_table(&[json!("a"), json!("a"), json!("b"), Value::Null]);
    let source = FakeFeatures::new();

    let err = gather::join_features(&source, &table, "track_id", 100)
        .await
        .unwrap_err();

    assert!(matches!(err, GatherError::NullIdentifier { column } if column == "track_id"));
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn test_join_features_dedupes_and_batches_contiguously() {
    let table = id_table(&[json!("a"), json!("a"), json!("b"), json!("c")]);
    let source = FakeFeatures::new();

    let result = gather::join_features(&source, &table, "track_id", 2)
        .await
        .unwrap();

    // ceil(3 unique / 2) = 2 contiguous batches covering the deduped list
    let batches = source.batches.lock().unwrap().clone();
    assert_eq!(batches, vec![vec!["a", "b"], vec!["c"]]);

    // every original row preserved, duplicates included
    assert_eq!(result.len(), 4);
    let tempos = result.column("tempo").unwrap();
    assert!(tempos.iter().all(|t| *t == &json!(120.0)));
}

#[tokio::test]
async fn test_join_features_drops_unresolved_and_nulls_their_columns() {
    let table = id_table(&[json!("a"), json!("gone")]);
    let source = FakeFeatures {
        unresolved: vec!["gone".to_string()],
        ..FakeFeatures::new()
    };

    let result = gather::join_features(&source, &table, "track_id", 100)
        .await
        .unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(
        result.column("tempo").unwrap(),
        vec![&json!(120.0), &Value::Null]
    );
}

#[tokio::test]
async fn test_join_features_total_failure_still_preserves_rows() {
    let table = id_table(&[json!("a"), json!("b")]);
    let source = FakeFeatures::failing_on_call(0);

    let result = gather::join_features(&source, &table, "track_id", 100)
        .await
        .unwrap();

    // joining an empty feature table is the identity on the left side
    assert_eq!(result, table);
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_join_features_partial_batch_failure() {
    let table = id_table(&[json!("a"), json!("b"), json!("c")]);
    let source = FakeFeatures::failing_on_call(1);

    let result = gather::join_features(&source, &table, "track_id", 2)
        .await
        .unwrap();

    // second batch failed: its ids get nulls through the left join
    assert_eq!(result.len(), 3);
    assert_eq!(
        result.column("tempo").unwrap(),
        vec![&json!(120.0), &json!(120.0), &Value::Null]
    );
}

// Search results served page by page.
struct FakeSearch {
    playlists: Vec<Value>,
}

impl SearchSource for FakeSearch {
    const PAGE_CAP: u64 = 50;

    async fn search_page(
        &self,
        _query: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Page, FetchError> {
        let start = (offset as usize).min(self.playlists.len());
        let end = (start + limit as usize).min(self.playlists.len());
        Ok(Page {
            items: self.playlists[start..end].to_vec(),
            total: Some(self.playlists.len() as u64),
            next: None,
        })
    }
}

fn playlist(id: &str) -> Value {
    json!({
        "id": id,
        "name": format!("playlist {id}"),
        "description": "desc",
        "tracks": {"href": format!("https://example/{id}/tracks"), "total": 10},
        "owner": {"id": "someone"}
    })
}

#[tokio::test]
async fn test_search_playlists_table_selects_and_flattens() {
    let source = FakeSearch {
        playlists: vec![playlist("p1"), Value::Null, playlist("p2")],
    };

    let table = gather::search_playlists_table(&source, "deep house", 10)
        .await
        .unwrap();

    // null placeholder filtered, noise columns dropped, tracks flattened
    assert_eq!(table.len(), 2);
    assert!(table.column_index("owner").is_none());
    assert!(table.column_index("tracks").is_none());
    assert_eq!(
        table.column("tracks_total").unwrap(),
        vec![&json!(10), &json!(10)]
    );
    assert_eq!(
        table.column("id").unwrap(),
        vec![&json!("p1"), &json!("p2")]
    );
}

#[tokio::test]
async fn test_search_playlists_table_stops_when_results_run_out() {
    let source = FakeSearch {
        playlists: vec![playlist("p1")],
    };

    // asking for far more than exists must terminate with what is there
    let table = gather::search_playlists_table(&source, "rare genre", 500)
        .await
        .unwrap();
    assert_eq!(table.len(), 1);
}

#[tokio::test]
async fn test_search_playlists_table_empty_result() {
    let source = FakeSearch {
        playlists: Vec::new(),
    };
    let table = gather::search_playlists_table(&source, "nothing", 50)
        .await
        .unwrap();
    assert!(table.is_empty());
}
