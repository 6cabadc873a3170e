//! Port for reference tables shared by several endpoints.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ClosedPeriod, ClosedSubmissionPeriods};

use super::define_port_error;

define_port_error! {
    /// Errors raised when reading reference data.
    pub enum ReferenceDataError {
        /// Repository connection could not be established.
        Connection { message: String } => "reference data connection failed: {message}"; service_unavailable,
        /// Query failed during execution.
        Query { message: String } => "reference data query failed: {message}"; internal,
    }
}

/// Read access to DEFC codes and the submission window schedule.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferenceDataRepository: Send + Sync {
    /// Every known disaster emergency fund code.
    async fn def_codes(&self) -> Result<Vec<String>, ReferenceDataError>;

    /// Latest quarterly and monthly windows revealed at or before `now`.
    async fn closed_submission_periods(
        &self,
        now: DateTime<Utc>,
    ) -> Result<ClosedSubmissionPeriods, ReferenceDataError>;
}

/// In-memory reference data used when no database is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureReferenceDataRepository;

#[async_trait]
impl ReferenceDataRepository for FixtureReferenceDataRepository {
    async fn def_codes(&self) -> Result<Vec<String>, ReferenceDataError> {
        Ok(["L", "M", "N", "O", "P", "U", "V"]
            .into_iter()
            .map(str::to_owned)
            .collect())
    }

    async fn closed_submission_periods(
        &self,
        _now: DateTime<Utc>,
    ) -> Result<ClosedSubmissionPeriods, ReferenceDataError> {
        Ok(ClosedSubmissionPeriods {
            quarterly: Some(ClosedPeriod {
                fiscal_year: 2021,
                period: 2,
            }),
            monthly: Some(ClosedPeriod {
                fiscal_year: 2021,
                period: 6,
            }),
        })
    }
}
