//! ADX company profile extraction

use std::collections::HashMap;
use std::time::Duration;

use super::{ExtractResult, Extractor};
use crate::fetch::{FetchRequest, PageFetcher};
use crate::fields::{Field, FieldMap};
use crate::normalize::{clean, parse_change_percent, to_number};
use crate::page::{elements_in, first_text_in, next_element, own_text, text_of, PageDocument};
use crate::types::{SourceKind, Symbol};

const ROOT_SELECTOR: &str = ".adx-financials-chart_details";
const PRICE_SELECTOR: &str = ".price-info_count";
const CHANGE_SELECTOR: &str = ".price-info_change";
const TRADES_ROW_SELECTOR: &str = ".adx-recent-trades_table tbody tr";

const WAIT_TIMEOUT: Duration = Duration::from_secs(20);

/// Raw stat labels collected before field mapping.
const LAST_PRICE: &str = "Last Price";
const PREV_CLOSE: &str = "Prev. Close";
const CHANGE: &str = "Change %";

/// Extracts the company profile overview on adx.ae.
#[derive(Debug)]
pub struct AdxExtractor {
    base_url: String,
}

impl AdxExtractor {
    pub fn new() -> Self {
        Self {
            base_url: "https://www.adx.ae".to_string(),
        }
    }

    fn page_url(&self, symbol: &Symbol) -> String {
        format!(
            "{}/en/main-market/company-profile/overview?secCode={}&symbols={}",
            self.base_url, symbol, symbol
        )
    }
}

#[async_trait::async_trait]
impl Extractor for AdxExtractor {
    fn kind(&self) -> SourceKind {
        SourceKind::Adx
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

/// Maps the collected raw stats onto the canonical fields. `change_pct` is
/// only attempted when the price block carried a change, everything else is
/// always set.
fn scrape(doc: &PageDocument) -> FieldMap {
    let stats = collect_stats(doc);
    let lookup = |label: &str| stats.get(label).map(String::as_str);

    let mut map = FieldMap::new();
    map.insert(
        Field::Price,
        to_number(pick_candidate(&stats, &[LAST_PRICE, PREV_CLOSE])),
    );
    if let Some(raw) = lookup(CHANGE).filter(|v| !v.is_empty()) {
        map.insert(Field::ChangePct, parse_change_percent(Some(raw)));
    }
    map.insert(Field::Open, to_number(lookup("Open Price")));
    map.insert(Field::High, to_number(lookup("High")));
    map.insert(Field::Low, to_number(lookup("Low")));
    map.insert(Field::Volume, to_number(lookup("Volume")));
    map.insert(Field::Turnover, to_number(lookup("Turnover")));
    map.insert(Field::MarketCap, to_number(lookup("Market Cap")));
    map
}

/// Gathers raw label/value text from the three page regions: the price
/// block, the heading/sibling stats and the first recent-trades row.
fn collect_stats(doc: &PageDocument) -> HashMap<String, String> {
    let mut stats = HashMap::new();

    if let Some(price_el) = doc.select(PRICE_SELECTOR).first() {
        if let Some(own) = own_text(price_el) {
            stats.insert(LAST_PRICE.to_string(), own);
        }
        if let Some(change) = first_text_in(price_el, CHANGE_SELECTOR) {
            stats.insert(CHANGE.to_string(), clean(&change));
        }
    }

    for (label, heading) in [
        ("Market Cap", "MARKET CAP."),
        ("Open Price", "OPEN PRICE"),
        (PREV_CLOSE, "PREV CLOSE"),
    ] {
        if let Some(value) = find_stat(doc, heading) {
            stats.insert(label.to_string(), value);
        }
    }

    // First row of the recent trades table, positional: time, price, low,
    // high, trades, turnover, volume, ...
    if let Some(row) = doc.select(TRADES_ROW_SELECTOR).first() {
        let cells: Vec<String> = elements_in(row, "td")
            .into_iter()
            .map(|td| clean(&text_of(&td)))
            .collect();
        if cells.len() >= 8 {
            stats.insert("High".to_string(), cells[3].clone());
            stats.insert("Low".to_string(), cells[2].clone());
            stats.insert("Volume".to_string(), cells[6].clone());
            stats.insert("Turnover".to_string(), cells[5].clone());
        }
    }

    stats
}

/// Value of the element following the first h3 whose cleaned text equals
/// `heading` case-insensitively. The first matching h3 decides even when it
/// has no value sibling.
fn find_stat(doc: &PageDocument, heading: &str) -> Option<String> {
    doc.select("h3")
        .into_iter()
        .find(|h3| clean(&text_of(h3)).eq_ignore_ascii_case(heading))
        .and_then(|h3| next_element(&h3))
        .map(|value| clean(&text_of(&value)))
}

fn pick_candidate<'a>(stats: &'a HashMap<String, String>, labels: &[&str]) -> Option<&'a str> {
    labels
        .iter()
        .find_map(|label| stats.get(*label).map(String::as_str).filter(|v| !v.is_empty()))
}
