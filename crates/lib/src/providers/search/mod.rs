pub mod grounded;

use crate::{errors::AuditError, types::SearchResult};
use async_trait::async_trait;
use std::fmt::Debug;

/// The most results a provider hands back for one query.
pub const MAX_SEARCH_RESULTS: usize = 10;

/// A single-call, non-paginated organic search.
///
/// `Ok(vec![])` means the query found nothing; `Err` means the search itself failed.
#[async_trait]
pub trait SearchProvider: Send + Sync + Debug {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, AuditError>;
}
