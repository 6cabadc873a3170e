//! Reqwest-backed transaction search adapter.
//!
//! This adapter owns transport details only: request serialisation, timeout and
//! HTTP error mapping, and JSON decoding into domain totals.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::dto::{CardinalityResponseDto, CountResponseDto, TotalsResponseDto};
use super::query::{cardinality_body, count_body, totals_body};
use crate::domain::TransactionFilters;
use crate::domain::ports::{
    RecipientGrouping, RecipientTotals, TransactionSearch, TransactionSearchError,
};

/// Transaction search adapter querying one Elasticsearch index over HTTP.
pub struct ElasticsearchTransactionSearch {
    client: Client,
    index_url: Url,
}

impl ElasticsearchTransactionSearch {
    /// Build an adapter for `index` on the cluster at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error when the index URL is invalid or the reqwest client
    /// cannot be constructed.
    pub fn new(
        base_url: &Url,
        index: &str,
        timeout: Duration,
    ) -> Result<Self, TransactionSearchError> {
        let index_url = base_url
            .join(&format!("{}/", index.trim_matches('/')))
            .map_err(|err| TransactionSearchError::connection(format!("invalid index url: {err}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| TransactionSearchError::connection(err.to_string()))?;
        Ok(Self { client, index_url })
    }

    async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &Value,
    ) -> Result<T, TransactionSearchError> {
        let url = self
            .index_url
            .join(endpoint)
            .map_err(|err| TransactionSearchError::query(err.to_string()))?;
        debug!(%url, "posting search request");
        let response = self
            .client
            .post(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, bytes.as_ref()));
        }
        decode(bytes.as_ref())
    }
}

#[async_trait]
impl TransactionSearch for ElasticsearchTransactionSearch {
    async fn count_transactions(
        &self,
        filters: &TransactionFilters,
    ) -> Result<u64, TransactionSearchError> {
        let response: CountResponseDto = self.post("_count", &count_body(filters)).await?;
        Ok(response.count)
    }

    async fn recipient_totals(
        &self,
        filters: &TransactionFilters,
        grouping: RecipientGrouping,
    ) -> Result<Vec<RecipientTotals>, TransactionSearchError> {
        let cardinality: CardinalityResponseDto = self
            .post("_search", &cardinality_body(filters, grouping))
            .await?;
        let bucket_count = cardinality.aggregations.unique_terms.value.unwrap_or(0);
        if bucket_count == 0 {
            return Ok(Vec::new());
        }

        let totals: TotalsResponseDto = self
            .post("_search", &totals_body(filters, grouping, bucket_count))
            .await?;
        let with_child_key = grouping == RecipientGrouping::Child;
        totals
            .aggregations
            .group_by_recipient
            .buckets
            .into_iter()
            .map(|bucket| bucket.into_totals(with_child_key))
            .collect::<Result<_, _>>()
            .map_err(TransactionSearchError::decode)
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, TransactionSearchError> {
    serde_json::from_slice(body).map_err(|error| {
        TransactionSearchError::decode(format!("invalid search JSON payload: {error}"))
    })
}

fn map_transport_error(error: reqwest::Error) -> TransactionSearchError {
    if error.is_timeout() {
        TransactionSearchError::timeout(error.to_string())
    } else {
        TransactionSearchError::connection(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> TransactionSearchError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            TransactionSearchError::timeout(message)
        }
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE => {
            TransactionSearchError::connection(message)
        }
        _ => TransactionSearchError::query(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
