//! Source-specific field extraction strategies

mod adx;
mod dfm;
mod mubasher;

pub use adx::AdxExtractor;
pub use dfm::DfmExtractor;
pub use mubasher::MubasherExtractor;

use thiserror::Error;

use crate::fetch::{FetchError, PageFetcher};
use crate::fields::FieldMap;
use crate::types::{SourceKind, Symbol};

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),
}

pub type ExtractResult<T> = Result<T, ExtractError>;

/// One source's extraction strategy: fetch the instrument's page and map it
/// to whatever canonical fields the source exposes.
///
/// A strategy fails atomically on navigation errors or a missing root
/// selector; within a fetched page, individual field misses stay soft.
#[async_trait::async_trait]
pub trait Extractor: Send + Sync {
    fn kind(&self) -> SourceKind;
    async fn extract(&self, fetcher: &dyn PageFetcher, symbol: &Symbol)
        -> ExtractResult<FieldMap>;
}

/// Resolves the strategy for a configured source.
pub fn extractor_for(kind: SourceKind) -> Box<dyn Extractor> {
    match kind {
        SourceKind::Mubasher => Box::new(MubasherExtractor::new()),
        SourceKind::DfmSummary => Box::new(DfmExtractor::new()),
        SourceKind::Adx => Box::new(AdxExtractor::new()),
    }
}
