//! Mubasher stock page extraction

use tracing::warn;

use super::{ExtractResult, Extractor};
use crate::fetch::{FetchRequest, PageFetcher};
use crate::fields::{classify_label, Field, FieldMap};
use crate::normalize::{clean, parse_change_percent, to_number};
use crate::page::{first_text_in, PageDocument};
use crate::types::{SourceKind, Symbol};

const PRICE_SELECTOR: &str = "div.market-summary__last-price";
const CHANGE_SELECTOR: &str = "div.market-summary__change-percentage";
const ROW_SELECTOR: &str = ".market-summary__block-row, .stock-overview__text-and-value-item";
const LABEL_SELECTOR: &str = ".market-summary__block-text, .stock-overview__text";
const VALUE_SELECTOR: &str = ".market-summary__block-number, .stock-overview__value";

/// Extracts the price feed page on english.mubasher.info.
#[derive(Debug)]
pub struct MubasherExtractor {
    base_url: String,
}

impl MubasherExtractor {
    pub fn new() -> Self {
        Self {
            base_url: "https://english.mubasher.info".to_string(),
        }
    }

    fn page_url(&self, symbol: &Symbol) -> String {
        format!("{}/markets/DFM/stocks/{}", self.base_url, symbol)
    }
}

#[async_trait::async_trait]
impl Extractor for MubasherExtractor {
    fn kind(&self) -> SourceKind {
        SourceKind::Mubasher
    }

    async fn extract(
        &self,
        fetcher: &dyn PageFetcher,
        symbol: &Symbol,
    ) -> ExtractResult<FieldMap> {
        let body = fetcher
            .fetch(&FetchRequest::new(self.page_url(symbol)))
            .await?;
        Ok(scrape(&PageDocument::parse(&body)))
    }
}

/// Runs the page's extraction phases. The price block, the change block and
/// the stats scan are independently guarded; a missing one never stops the
/// others.
fn scrape(doc: &PageDocument) -> FieldMap {
    let mut map = FieldMap::new();

    match doc.first_text(PRICE_SELECTOR) {
        Some(raw) => map.insert(Field::Price, to_number(Some(&raw))),
        None => warn!("Could not extract Mubasher price"),
    }

    match doc.first_text(CHANGE_SELECTOR) {
        Some(raw) => map.insert(Field::ChangePct, parse_change_percent(Some(&raw))),
        None => warn!("Could not extract Mubasher change %"),
    }

    // Forward scan, so a later row for the same field overwrites an earlier
    // one.
    for (label, value) in stat_rows(doc) {
        for field in classify_label(&label) {
            map.insert(field, to_number(Some(&value)));
        }
    }

    map
}

/// Cleaned (label, value) pairs from the summary blocks; rows missing either
/// side are skipped.
fn stat_rows(doc: &PageDocument) -> Vec<(String, String)> {
    doc.select(ROW_SELECTOR)
        .into_iter()
        .filter_map(|row| {
            let label = first_text_in(&row, LABEL_SELECTOR)?;
            let value = first_text_in(&row, VALUE_SELECTOR)?;
            Some((clean(&label), clean(&value)))
        })
        .collect()
}
