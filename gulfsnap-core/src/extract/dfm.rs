//! DFM trading summary extraction

use std::collections::HashMap;
use std::time::Duration;

use super::{ExtractResult, Extractor};
use crate::fetch::{FetchRequest, PageFetcher};
use crate::fields::{Field, FieldMap};
use crate::normalize::{clean, to_number};
use crate::page::{first_element_in, next_element, text_of, PageDocument};
use crate::types::{SourceKind, Symbol};

const ROOT_SELECTOR: &str = ".table-flex";
const COLUMN_SELECTOR: &str = ".table-flex .t-col";
const HEAD_SELECTOR: &str = ".t-head";

const WAIT_TIMEOUT: Duration = Duration::from_secs(15);

/// Extracts the trading summary table on dfm.ae.
#[derive(Debug)]
pub struct DfmExtractor {
    base_url: String,
}

impl DfmExtractor {
    pub fn new() -> Self {
        Self {
            base_url: "https://www.dfm.ae".to_string(),
        }
    }

    fn page_url(&self, symbol: &Symbol) -> String {
        format!(
            "{}/the-exchange/market-information/company/{}/trading/trading-summary",
            self.base_url, symbol
        )
    }
}

#[async_trait::async_trait]
impl Extractor for DfmExtractor {
    fn kind(&self) -> SourceKind {
        SourceKind::DfmSummary
    }

    async fn extract(
        &self,
        fetcher: &dyn PageFetcher,
        symbol: &Symbol,
    ) -> ExtractResult<FieldMap> {
        let request = FetchRequest::new(self.page_url(symbol))
            .wait_for(ROOT_SELECTOR)
            .wait_timeout(WAIT_TIMEOUT);
        let body = fetcher.fetch(&request).await?;
        Ok(scrape(&PageDocument::parse(&body)))
    }
}

/// Maps the table's head/value column pairs onto the canonical fields.
/// Every field the summary is expected to carry is set, `None` when its
/// label is missing, so this source always speaks for all seven.
fn scrape(doc: &PageDocument) -> FieldMap {
    let stats = column_stats(doc);
    let lookup = |label: &str| stats.get(label).map(String::as_str);

    let mut map = FieldMap::new();
    map.insert(Field::Open, to_number(lookup("Open Price")));
    map.insert(Field::High, to_number(lookup("High")));
    map.insert(Field::Low, to_number(lookup("Low")));
    map.insert(
        Field::Price,
        to_number(pick_candidate(&stats, &["Closing Price", "Last Price"])),
    );
    map.insert(Field::Turnover, to_number(lookup("Value")));
    map.insert(Field::MarketCap, to_number(lookup("Market Cap")));
    map.insert(Field::Volume, to_number(lookup("Volume")));
    map
}

/// Label-to-value lookup built from the `.t-col` columns; a later duplicate
/// label overwrites an earlier one.
fn column_stats(doc: &PageDocument) -> HashMap<String, String> {
    let mut stats = HashMap::new();
    for col in doc.select(COLUMN_SELECTOR) {
        let Some(head) = first_element_in(&col, HEAD_SELECTOR) else {
            continue;
        };
        let Some(value) = next_element(&head) else {
            continue;
        };
        stats.insert(clean(&text_of(&head)), clean(&text_of(&value)));
    }
    stats
}

/// First candidate label whose cell holds non-empty text wins; presence of
/// text decides, not parse success, so a literal "0" does not fall through.
fn pick_candidate<'a>(stats: &'a HashMap<String, String>, labels: &[&str]) -> Option<&'a str> {
    labels
        .iter()
        .find_map(|label| stats.get(*label).map(String::as_str).filter(|v| !v.is_empty()))
}
