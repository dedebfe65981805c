//! # The paginated bulk-fetch engine
//!
//! This module drives the whole harvest: it pages through rate-limited
//! collection endpoints, assembles the pages into tables, and enriches them
//! with batched supplemental attributes.
//!
//! - [`accumulate`] - fetches every page of one collection, tolerating
//!   per-page failures (Collection Accumulator)
//! - [`search_playlists_table`] - pages the playlist search endpoint until
//!   the requested number of playlists is collected
//! - [`aggregate`] - runs the accumulator over every playlist of a table and
//!   concatenates the tagged results (Multi-Collection Aggregator)
//! - [`join_features`] - batches track ids, fetches audio features, and
//!   left-joins them back (Batch Feature Joiner)
//!
//! ## Failure policy
//!
//! Every loop degrades to a partial result instead of propagating: a failed
//! page ends that collection's accumulation, a failed batch stops further
//! batches, a failed collection is skipped. Each failure is logged with the
//! resource id and offset so a run can be resumed manually. Only two things
//! halt a run: a missing credential, and null identifiers handed to the
//! batch joiner.
//!
//! The engine is generic over the three source traits below, so tests drive
//! it with in-memory fakes and the CLI drives it with
//! [`SpotifyClient`](crate::spotify::SpotifyClient).

mod accumulate;
mod aggregate;
mod features;
mod search;

pub use accumulate::accumulate;
pub use aggregate::aggregate;
pub use features::join_features;
pub use search::search_playlists_table;

use serde_json::Value;

use crate::{error::FetchError, types::Page};

/// Pages of one item collection, addressed by offset and limit.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    /// Largest `limit` a single [`fetch_page`](Self::fetch_page) honors.
    const PAGE_CAP: u64;

    async fn fetch_page(
        &self,
        resource_id: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Page, FetchError>;
}

/// Pages of playlist search results for a query.
#[allow(async_fn_in_trait)]
pub trait SearchSource {
    /// Largest `limit` a single [`search_page`](Self::search_page) honors.
    const PAGE_CAP: u64;

    async fn search_page(&self, query: &str, offset: u64, limit: u64) -> Result<Page, FetchError>;
}

/// Supplemental attributes for a batch of item ids, one entry per id with
/// nulls for ids the backend cannot resolve.
#[allow(async_fn_in_trait)]
pub trait FeatureSource {
    /// Most ids a single [`fetch_features`](Self::fetch_features) accepts.
    const BATCH_CAP: usize;

    async fn fetch_features(&self, ids: &[String]) -> Result<Vec<Value>, FetchError>;
}
