//! Port for aggregations over the transaction search index.
use async_trait::async_trait;

use crate::domain::{Cents, TransactionFilters};

use super::define_port_error;

define_port_error! {
    /// Errors raised by search index adapters.
    pub enum TransactionSearchError {
        /// The search cluster could not be reached.
        Connection { message: String } => "transaction search connection failed: {message}"; service_unavailable,
        /// The search cluster did not answer in time.
        Timeout { message: String } => "transaction search timed out: {message}"; service_unavailable,
        /// The search cluster rejected the query.
        Query { message: String } => "transaction search query failed: {message}"; internal,
        /// The response did not have the expected shape.
        Decode { message: String } => "transaction search response invalid: {message}"; internal,
    }
}

/// Field recipient totals are grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientGrouping {
    /// One bucket per recipient hash.
    Recipient,
    /// One bucket per parent recipient hash.
    Parent,
    /// One bucket per child recipient, keyed by its aggregation key.
    Child,
}

/// Identity of a child recipient carried in its bucket key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildBucketKey {
    /// `<hash>-<level>` of the child.
    pub hash_with_level: Option<String>,
    /// Child DUNS.
    pub unique_id: Option<String>,
    /// Child name.
    pub name: Option<String>,
}

/// Totals of one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientTotals {
    /// Child identity, only for [`RecipientGrouping::Child`].
    pub child: Option<ChildBucketKey>,
    /// Sum of obligations.
    pub total_obligation_amount: Cents,
    /// Number of transactions.
    pub total_obligation_count: u64,
    /// Sum of loan face values over loan transactions.
    pub total_face_value_loan_amount: Cents,
    /// Number of loan transactions.
    pub total_face_value_loan_count: u64,
}

/// Read access to the transaction index.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionSearch: Send + Sync {
    /// Number of transactions matching `filters`.
    async fn count_transactions(
        &self,
        filters: &TransactionFilters,
    ) -> Result<u64, TransactionSearchError>;

    /// Obligation and loan totals of matching transactions, one entry per
    /// group.
    async fn recipient_totals(
        &self,
        filters: &TransactionFilters,
        grouping: RecipientGrouping,
    ) -> Result<Vec<RecipientTotals>, TransactionSearchError>;
}

/// Index with no transactions; used when no search cluster is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureTransactionSearch;

#[async_trait]
impl TransactionSearch for FixtureTransactionSearch {
    async fn count_transactions(
        &self,
        _filters: &TransactionFilters,
    ) -> Result<u64, TransactionSearchError> {
        Ok(0)
    }

    async fn recipient_totals(
        &self,
        _filters: &TransactionFilters,
        _grouping: RecipientGrouping,
    ) -> Result<Vec<RecipientTotals>, TransactionSearchError> {
        Ok(Vec::new())
    }
}
