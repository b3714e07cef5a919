//! Instrument identity and source routing

use serde::{Deserialize, Serialize};
use std::fmt;

/// Instrument ticker symbol
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Symbol(pub String);

impl Symbol {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The sources an instrument can be scraped from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    Mubasher,
    DfmSummary,
    Adx,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Mubasher => write!(f, "Mubasher"),
            SourceKind::DfmSummary => write!(f, "DFM trading summary"),
            SourceKind::Adx => write!(f, "ADX"),
        }
    }
}

/// One instrument with its applicable sources, in merge order.
#[derive(Clone, Debug)]
pub struct Instrument {
    pub symbol: Symbol,
    pub sources: Vec<SourceKind>,
}

impl Instrument {
    pub fn new(symbol: impl Into<String>, sources: Vec<SourceKind>) -> Self {
        Self {
            symbol: Symbol::new(symbol),
            sources,
        }
    }
}

/// The instruments tracked by default, in run order.
pub fn default_watchlist() -> Vec<Instrument> {
    vec![
        Instrument::new("DEWA", vec![SourceKind::Mubasher, SourceKind::DfmSummary]),
        Instrument::new("SALIK", vec![SourceKind::Mubasher]),
        Instrument::new("TALABAT", vec![SourceKind::Mubasher, SourceKind::DfmSummary]),
        Instrument::new("NMDCENR", vec![SourceKind::Adx]),
    ]
}
