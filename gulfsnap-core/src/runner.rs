//! Run orchestration: extract, merge and persist one snapshot

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::extract::{extractor_for, Extractor};
use crate::fetch::PageFetcher;
use crate::fields::FieldMap;
use crate::merge::merge;
use crate::snapshot::SnapshotStore;
use crate::types::{default_watchlist, Instrument, Symbol};

/// Orchestrator configuration.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub out_dir: PathBuf,
    pub watchlist: Vec<Instrument>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("data"),
            watchlist: default_watchlist(),
        }
    }
}

/// Statistics reported after a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub as_of: DateTime<Utc>,
    pub instruments: usize,
    pub strategies_run: usize,
    pub strategies_failed: usize,
    pub fields_updated: usize,
    pub latest_path: PathBuf,
    pub archive_path: PathBuf,
}

struct InstrumentOutcome {
    run: usize,
    failed: usize,
    fields: usize,
}

/// Drives one full extract-merge-persist cycle over the watchlist.
pub struct SnapshotRunner {
    config: RunConfig,
    store: SnapshotStore,
}

impl SnapshotRunner {
    pub fn new(config: RunConfig) -> Self {
        let store = SnapshotStore::new(config.out_dir.clone());
        Self { config, store }
    }

    /// Runs every configured instrument once and persists the result.
    ///
    /// Strategy failures are logged and contribute nothing; the instrument
    /// keeps its prior fields underneath whatever its other sources merged
    /// in. Only setup and persistence failures abort the run, and a run
    /// aborts before writing anything.
    pub async fn run(&self, fetcher: &dyn PageFetcher) -> anyhow::Result<RunSummary> {
        let mut snapshot = self.store.load_latest().await?;
        snapshot.as_of = Utc::now();

        let mut strategies_run = 0usize;
        let mut strategies_failed = 0usize;
        let mut fields_updated = 0usize;

        for instrument in &self.config.watchlist {
            let extractors: Vec<Box<dyn Extractor>> = instrument
                .sources
                .iter()
                .copied()
                .map(extractor_for)
                .collect();
            let prior = snapshot
                .stocks
                .get(&instrument.symbol)
                .cloned()
                .unwrap_or_default();

            let (merged, outcome) =
                merge_instrument(fetcher, &extractors, &instrument.symbol, prior).await;
            strategies_run += outcome.run;
            strategies_failed += outcome.failed;
            fields_updated += outcome.fields;
            snapshot.stocks.insert(instrument.symbol.clone(), merged);
        }

        let (latest_path, archive_path) = self.store.persist(&snapshot).await?;
        info!(
            "Snapshot written to {} and {}",
            latest_path.display(),
            archive_path.display()
        );

        Ok(RunSummary {
            as_of: snapshot.as_of,
            instruments: self.config.watchlist.len(),
            strategies_run,
            strategies_failed,
            fields_updated,
            latest_path,
            archive_path,
        })
    }
}

/// Runs one instrument's strategies in order and merges their contributions
/// onto its prior map. A failing strategy is recorded and skipped; it never
/// discards what a sibling extracted.
async fn merge_instrument(
    fetcher: &dyn PageFetcher,
    extractors: &[Box<dyn Extractor>],
    symbol: &Symbol,
    prior: FieldMap,
) -> (FieldMap, InstrumentOutcome) {
    let mut outcome = InstrumentOutcome {
        run: 0,
        failed: 0,
        fields: 0,
    };
    let mut overlays = Vec::new();

    for extractor in extractors {
        outcome.run += 1;
        match extractor.extract(fetcher, symbol).await {
            Ok(fields) => {
                info!("{}: {} yielded {} fields", symbol, extractor.kind(), fields.len());
                outcome.fields += fields.len();
                overlays.push(fields);
            }
            Err(err) => {
                outcome.failed += 1;
                warn!("{} scrape error via {}: {}", symbol, extractor.kind(), err);
            }
        }
    }

    (merge(prior, overlays), outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{ExtractError, ExtractResult};
    use crate::fetch::fixtures::FixtureFetcher;
    use crate::fetch::FetchError;
    use crate::fields::Field;
    use crate::types::SourceKind;

    fn fm(entries: &[(Field, Option<f64>)]) -> FieldMap {
        let mut map = FieldMap::new();
        for (field, value) in entries {
            map.insert(*field, *value);
        }
        map
    }

    struct StaticExtractor(FieldMap);

    #[async_trait::async_trait]
    impl Extractor for StaticExtractor {
        fn kind(&self) -> SourceKind {
            SourceKind::Mubasher
        }

        async fn extract(
            &self,
            _fetcher: &dyn PageFetcher,
            _symbol: &Symbol,
        ) -> ExtractResult<FieldMap> {
            Ok(self.0.clone())
        }
    }

    struct FailingExtractor;

    #[async_trait::async_trait]
    impl Extractor for FailingExtractor {
        fn kind(&self) -> SourceKind {
            SourceKind::DfmSummary
        }

        async fn extract(
            &self,
            _fetcher: &dyn PageFetcher,
            _symbol: &Symbol,
        ) -> ExtractResult<FieldMap> {
            Err(ExtractError::Fetch(FetchError::Timeout))
        }
    }

    #[tokio::test]
    async fn test_overlays_merge_onto_prior_in_order() {
        let extractors: Vec<Box<dyn Extractor>> = vec![
            Box::new(StaticExtractor(fm(&[
                (Field::Price, Some(12.0)),
                (Field::Open, Some(11.0)),
            ]))),
            Box::new(StaticExtractor(fm(&[
                (Field::Open, None),
                (Field::High, Some(13.0)),
            ]))),
        ];
        let prior = fm(&[(Field::Price, Some(10.0))]);

        let (merged, outcome) = merge_instrument(
            &FixtureFetcher::new(),
            &extractors,
            &Symbol::new("DEWA"),
            prior,
        )
        .await;

        assert_eq!(
            merged,
            fm(&[
                (Field::Price, Some(12.0)),
                (Field::Open, None),
                (Field::High, Some(13.0)),
            ])
        );
        assert_eq!(outcome.run, 2);
        assert_eq!(outcome.failed, 0);
    }

    #[tokio::test]
    async fn test_failing_strategy_keeps_sibling_contribution() {
        let extractors: Vec<Box<dyn Extractor>> = vec![
            Box::new(StaticExtractor(fm(&[(Field::Open, Some(11.0))]))),
            Box::new(FailingExtractor),
        ];
        let prior = fm(&[(Field::Price, Some(10.0))]);

        let (merged, outcome) = merge_instrument(
            &FixtureFetcher::new(),
            &extractors,
            &Symbol::new("DEWA"),
            prior,
        )
        .await;

        assert_eq!(
            merged,
            fm(&[(Field::Price, Some(10.0)), (Field::Open, Some(11.0))])
        );
        assert_eq!(outcome.failed, 1);
    }

    #[tokio::test]
    async fn test_all_strategies_failing_retains_prior_fields() {
        let extractors: Vec<Box<dyn Extractor>> = vec![Box::new(FailingExtractor)];
        let prior = fm(&[(Field::Price, Some(10.0))]);

        let (merged, outcome) = merge_instrument(
            &FixtureFetcher::new(),
            &extractors,
            &Symbol::new("DEWA"),
            prior.clone(),
        )
        .await;

        assert_eq!(merged, prior);
        assert_eq!(outcome.failed, 1);
    }

    #[tokio::test]
    async fn test_run_merges_fetched_fields_and_updates_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("latest.json"),
            r#"{"as_of":"2025-01-01T00:00:00Z","stocks":{"DEWA":{"price":10.0,"high":9.8}}}"#,
        )
        .unwrap();

        let page = r#"
            <div class="market-summary__last-price">12.0</div>
            <div class="market-summary__block-row">
                <span class="market-summary__block-text">Open</span>
                <span class="market-summary__block-number">11.0</span>
            </div>
        "#;
        let fetcher = FixtureFetcher::new()
            .with_page("https://english.mubasher.info/markets/DFM/stocks/DEWA", page);

        let config = RunConfig {
            out_dir: dir.path().to_path_buf(),
            watchlist: vec![Instrument::new("DEWA", vec![SourceKind::Mubasher])],
        };
        let runner = SnapshotRunner::new(config);
        let summary = runner.run(&fetcher).await.unwrap();

        assert_eq!(summary.instruments, 1);
        assert_eq!(summary.strategies_run, 1);
        assert_eq!(summary.strategies_failed, 0);

        let store = SnapshotStore::new(dir.path());
        let snapshot = store.load_latest().await.unwrap();
        let dewa = &snapshot.stocks[&Symbol::new("DEWA")];
        assert_eq!(dewa.get(Field::Price), Some(Some(12.0)));
        assert_eq!(dewa.get(Field::Open), Some(Some(11.0)));
        // Prior field no source touched this run survives the merge.
        assert_eq!(dewa.get(Field::High), Some(Some(9.8)));
        assert!(snapshot.as_of > chrono::DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z").unwrap());
        assert!(summary.archive_path.exists());
    }

    #[tokio::test]
    async fn test_malformed_prior_snapshot_aborts_before_any_write() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("latest.json"), "{ not json").unwrap();

        let config = RunConfig {
            out_dir: dir.path().to_path_buf(),
            watchlist: vec![Instrument::new("DEWA", vec![SourceKind::Mubasher])],
        };
        let runner = SnapshotRunner::new(config);
        assert!(runner.run(&FixtureFetcher::new()).await.is_err());

        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }
}
