//! Port for counting federal accounts with disaster spending.
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::ClosedSubmissionPeriods;

use super::define_port_error;

define_port_error! {
    /// Errors raised by federal account repositories.
    pub enum FederalAccountRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "federal account repository connection failed: {message}"; service_unavailable,
        /// Query failed during execution.
        Query { message: String } => "federal account repository query failed: {message}"; internal,
    }
}

/// Selection of File B rows that count towards a federal account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisasterSpendingFilter {
    /// DEFC codes to match.
    pub def_codes: Vec<String>,
    /// Earliest submission reporting period start.
    pub reporting_period_min: NaiveDate,
    /// Closed windows bounding quarterly and monthly submissions.
    pub closed_periods: ClosedSubmissionPeriods,
}

/// Counts distinct federal accounts over File B.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FederalAccountRepository: Send + Sync {
    /// Number of federal accounts with non-zero obligations or outlays
    /// matching `filter`.
    async fn count_with_disaster_spending(
        &self,
        filter: &DisasterSpendingFilter,
    ) -> Result<u64, FederalAccountRepositoryError>;
}

/// Repository returning a fixed count.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureFederalAccountRepository {
    /// Count returned for every filter.
    pub count: u64,
}

#[async_trait]
impl FederalAccountRepository for FixtureFederalAccountRepository {
    async fn count_with_disaster_spending(
        &self,
        filter: &DisasterSpendingFilter,
    ) -> Result<u64, FederalAccountRepositoryError> {
        let any_window =
            filter.closed_periods.quarterly.is_some() || filter.closed_periods.monthly.is_some();
        Ok(if any_window { self.count } else { 0 })
    }
}
