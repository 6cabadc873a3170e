//! Driving port for the download transaction count.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{Error, TransactionFilters};

/// Count the transactions a download with these filters would contain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadCountRequest {
    /// Parsed filters.
    pub filters: TransactionFilters,
}

/// Transaction count compared against the download limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DownloadCountResponse {
    /// Matching transactions.
    pub calculated_transaction_count: u64,
    /// Largest download served.
    pub maximum_transaction_limit: u64,
    /// Whether the count exceeds the limit.
    pub transaction_rows_gt_limit: bool,
}

/// Domain use-case port for the download count.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DownloadCountQuery: Send + Sync {
    /// Count matching transactions.
    async fn count(&self, request: DownloadCountRequest) -> Result<DownloadCountResponse, Error>;
}
