//! UAE Market Snapshot Engine
//!
//! Pulls market data for a fixed watchlist of UAE-listed instruments from
//! several heterogeneous web sources, merges the partial per-instrument
//! field maps under a defined precedence, and persists "latest" plus dated
//! JSON snapshots. Can be used as a library or through the gulfsnap binary.

pub mod extract;
pub mod fetch;
pub mod fields;
pub mod merge;
pub mod normalize;
pub mod page;
pub mod runner;
pub mod snapshot;
pub mod types;

// Re-export main types for easy access
pub use extract::{extractor_for, ExtractError, ExtractResult, Extractor};
pub use fetch::{FetchConfig, FetchError, FetchRequest, FetchResult, HttpFetcher, PageFetcher};
pub use fields::{classify_label, Field, FieldMap};
pub use merge::merge;
pub use page::PageDocument;
pub use runner::{RunConfig, RunSummary, SnapshotRunner};
pub use snapshot::{Snapshot, SnapshotError, SnapshotStore};
pub use types::{default_watchlist, Instrument, SourceKind, Symbol};
