//! Download transaction count service.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::Error;
use crate::domain::ports::{
    DownloadCountQuery, DownloadCountRequest, DownloadCountResponse, TransactionSearch,
};

/// Largest download served when no limit is configured.
pub const DEFAULT_DOWNLOAD_LIMIT: u64 = 500_000;

/// Counts the transactions a download request would export.
#[derive(Clone)]
pub struct DownloadCountService<S> {
    search: Arc<S>,
    maximum_transaction_limit: u64,
}

impl<S> DownloadCountService<S> {
    /// Create a new service comparing counts against `maximum_transaction_limit`.
    pub const fn new(search: Arc<S>, maximum_transaction_limit: u64) -> Self {
        Self {
            search,
            maximum_transaction_limit,
        }
    }
}

#[async_trait]
impl<S> DownloadCountQuery for DownloadCountService<S>
where
    S: TransactionSearch,
{
    async fn count(&self, request: DownloadCountRequest) -> Result<DownloadCountResponse, Error> {
        if request.filters.is_empty() {
            return Err(Error::unprocessable("Missing value: 'filters' must not be empty")
                .with_details(json!({ "field": "filters" })));
        }

        let calculated_transaction_count = self.search.count_transactions(&request.filters).await?;
        Ok(DownloadCountResponse {
            calculated_transaction_count,
            maximum_transaction_limit: self.maximum_transaction_limit,
            transaction_rows_gt_limit: calculated_transaction_count
                > self.maximum_transaction_limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockTransactionSearch, TransactionSearchError};
    use crate::domain::{AgencyFilter, AgencyRole, AgencyTier, ErrorCode, TransactionFilters};
    use rstest::{fixture, rstest};

    #[fixture]
    fn agency_filters() -> TransactionFilters {
        TransactionFilters {
            agencies: vec![AgencyFilter {
                role: AgencyRole::Awarding,
                tier: AgencyTier::Toptier,
                name: "Bureau of Things".to_owned(),
            }],
            ..TransactionFilters::default()
        }
    }

    #[rstest]
    #[case(1, false)]
    #[case(10, false)]
    #[case(11, true)]
    #[tokio::test]
    async fn compares_count_with_limit(
        agency_filters: TransactionFilters,
        #[case] count: u64,
        #[case] over: bool,
    ) {
        let mut search = MockTransactionSearch::new();
        search
            .expect_count_transactions()
            .times(1)
            .return_once(move |_| Ok(count));
        let service = DownloadCountService::new(Arc::new(search), 10);

        let response = service
            .count(DownloadCountRequest {
                filters: agency_filters,
            })
            .await
            .expect("count");
        assert_eq!(response.calculated_transaction_count, count);
        assert_eq!(response.maximum_transaction_limit, 10);
        assert_eq!(response.transaction_rows_gt_limit, over);
    }

    #[rstest]
    #[tokio::test]
    async fn rejects_empty_filters() {
        let mut search = MockTransactionSearch::new();
        search.expect_count_transactions().never();
        let service = DownloadCountService::new(Arc::new(search), DEFAULT_DOWNLOAD_LIMIT);

        let err = service
            .count(DownloadCountRequest::default())
            .await
            .expect_err("empty filters");
        assert_eq!(err.code(), ErrorCode::UnprocessableEntity);
    }

    #[rstest]
    #[case(TransactionSearchError::timeout("30s"), ErrorCode::ServiceUnavailable)]
    #[case(TransactionSearchError::decode("no count"), ErrorCode::InternalError)]
    #[tokio::test]
    async fn maps_search_failures(
        agency_filters: TransactionFilters,
        #[case] failure: TransactionSearchError,
        #[case] expected: ErrorCode,
    ) {
        let mut search = MockTransactionSearch::new();
        search
            .expect_count_transactions()
            .return_once(move |_| Err(failure));
        let service = DownloadCountService::new(Arc::new(search), DEFAULT_DOWNLOAD_LIMIT);

        let err = service
            .count(DownloadCountRequest {
                filters: agency_filters,
            })
            .await
            .expect_err("search failure");
        assert_eq!(err.code(), expected);
    }
}
