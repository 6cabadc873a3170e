//! Disaster federal account count service.
//!
//! Validates the requested DEFC codes against the reference table, bounds
//! the count by the latest closed submission windows and delegates the
//! distinct count to the federal account repository.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use mockable::Clock;
use serde_json::json;

use crate::domain::Error;
use crate::domain::ports::{
    DisasterSpendingFilter, FederalAccountCountQuery, FederalAccountCountRequest,
    FederalAccountCountResponse, FederalAccountRepository, ReferenceDataRepository,
};

/// Submissions reporting before this date never carry disaster spending.
pub const DISASTER_REPORTING_PERIOD_MIN: NaiveDate = match NaiveDate::from_ymd_opt(2020, 4, 1) {
    Some(date) => date,
    None => NaiveDate::MIN,
};

const DEF_CODES_FIELD: &str = "filter|def_codes";

/// Federal account count service implementing the driving port.
#[derive(Clone)]
pub struct FederalAccountCountService<R, F> {
    reference_data: Arc<R>,
    accounts: Arc<F>,
    clock: Arc<dyn Clock>,
}

impl<R, F> FederalAccountCountService<R, F> {
    /// Create a new service over the reference data and account repositories.
    pub fn new(reference_data: Arc<R>, accounts: Arc<F>, clock: Arc<dyn Clock>) -> Self {
        Self {
            reference_data,
            accounts,
            clock,
        }
    }
}

impl<R, F> FederalAccountCountService<R, F>
where
    R: ReferenceDataRepository,
    F: FederalAccountRepository,
{
    fn invalid_def_codes(message: String) -> Error {
        Error::unprocessable(message).with_details(json!({ "field": DEF_CODES_FIELD }))
    }

    async fn validated_def_codes(&self, requested: Option<Vec<String>>) -> Result<Vec<String>, Error> {
        let Some(codes) = requested else {
            return Err(Self::invalid_def_codes(format!(
                "Missing value: '{DEF_CODES_FIELD}' is a required field"
            )));
        };
        if codes.is_empty() {
            return Err(Self::invalid_def_codes(format!(
                "Field '{DEF_CODES_FIELD}' value '[]' is below min '1' items"
            )));
        }

        let known: BTreeSet<String> = self.reference_data.def_codes().await?.into_iter().collect();
        let wanted: BTreeSet<String> = codes.into_iter().collect();
        if !wanted.is_subset(&known) {
            let allowed: Vec<&String> = known.iter().collect();
            return Err(Self::invalid_def_codes(format!(
                "Field '{DEF_CODES_FIELD}' is outside valid values {allowed:?}"
            )));
        }
        Ok(wanted.into_iter().collect())
    }
}

#[async_trait]
impl<R, F> FederalAccountCountQuery for FederalAccountCountService<R, F>
where
    R: ReferenceDataRepository,
    F: FederalAccountRepository,
{
    async fn count(
        &self,
        request: FederalAccountCountRequest,
    ) -> Result<FederalAccountCountResponse, Error> {
        let def_codes = self.validated_def_codes(request.def_codes).await?;
        let closed_periods = self
            .reference_data
            .closed_submission_periods(self.clock.utc())
            .await?;
        if closed_periods.quarterly.is_none() && closed_periods.monthly.is_none() {
            return Ok(FederalAccountCountResponse { count: 0 });
        }

        let filter = DisasterSpendingFilter {
            def_codes,
            reporting_period_min: DISASTER_REPORTING_PERIOD_MIN,
            closed_periods,
        };
        let count = self.accounts.count_with_disaster_spending(&filter).await?;
        Ok(FederalAccountCountResponse { count })
    }
}

#[cfg(test)]
mod tests {
    //! Validation and windowing behaviour of the count service.

    use super::*;
    use crate::domain::ports::{
        FederalAccountRepositoryError, FixtureReferenceDataRepository,
        MockFederalAccountRepository, MockReferenceDataRepository, ReferenceDataError,
    };
    use crate::domain::{ClosedPeriod, ClosedSubmissionPeriods, ErrorCode};
    use chrono::{TimeZone, Utc};
    use mockable::MockClock;
    use rstest::rstest;

    fn clock() -> Arc<dyn Clock> {
        let mut clock = MockClock::new();
        clock.expect_utc().return_const(
            Utc.with_ymd_and_hms(2021, 5, 20, 12, 0, 0)
                .single()
                .expect("valid timestamp"),
        );
        Arc::new(clock)
    }

    fn codes(values: &[&str]) -> Option<Vec<String>> {
        Some(values.iter().map(|code| (*code).to_owned()).collect())
    }

    #[rstest]
    #[case(None, "Missing value: 'filter|def_codes' is a required field")]
    #[case(codes(&[]), "Field 'filter|def_codes' value '[]' is below min '1' items")]
    #[tokio::test]
    async fn rejects_missing_or_empty_codes(
        #[case] def_codes: Option<Vec<String>>,
        #[case] message: &str,
    ) {
        let service = FederalAccountCountService::new(
            Arc::new(FixtureReferenceDataRepository),
            Arc::new(MockFederalAccountRepository::new()),
            clock(),
        );

        let err = service
            .count(FederalAccountCountRequest { def_codes })
            .await
            .expect_err("invalid codes");
        assert_eq!(err.code(), ErrorCode::UnprocessableEntity);
        assert_eq!(err.message(), message);
        assert_eq!(err.details(), Some(&json!({ "field": "filter|def_codes" })));
    }

    #[rstest]
    #[tokio::test]
    async fn rejects_unknown_codes() {
        let service = FederalAccountCountService::new(
            Arc::new(FixtureReferenceDataRepository),
            Arc::new(MockFederalAccountRepository::new()),
            clock(),
        );

        let err = service
            .count(FederalAccountCountRequest {
                def_codes: codes(&["L", "ZZ"]),
            })
            .await
            .expect_err("unknown code");
        assert_eq!(err.code(), ErrorCode::UnprocessableEntity);
        assert!(err.message().contains("outside valid values"));
    }

    #[rstest]
    #[tokio::test]
    async fn counts_with_closed_windows() {
        let mut accounts = MockFederalAccountRepository::new();
        accounts
            .expect_count_with_disaster_spending()
            .withf(|filter| {
                filter.def_codes == ["L", "M"]
                    && filter.reporting_period_min == DISASTER_REPORTING_PERIOD_MIN
                    && filter.closed_periods.monthly
                        == Some(ClosedPeriod {
                            fiscal_year: 2021,
                            period: 6,
                        })
            })
            .times(1)
            .return_once(|_| Ok(4));
        let service = FederalAccountCountService::new(
            Arc::new(FixtureReferenceDataRepository),
            Arc::new(accounts),
            clock(),
        );

        let response = service
            .count(FederalAccountCountRequest {
                def_codes: codes(&["M", "L", "M"]),
            })
            .await
            .expect("count");
        assert_eq!(response, FederalAccountCountResponse { count: 4 });
    }

    #[rstest]
    #[tokio::test]
    async fn no_closed_window_counts_nothing() {
        let mut reference = MockReferenceDataRepository::new();
        reference
            .expect_def_codes()
            .return_once(|| Ok(vec!["L".to_owned()]));
        reference
            .expect_closed_submission_periods()
            .return_once(|_| Ok(ClosedSubmissionPeriods::default()));
        let mut accounts = MockFederalAccountRepository::new();
        accounts.expect_count_with_disaster_spending().never();
        let service =
            FederalAccountCountService::new(Arc::new(reference), Arc::new(accounts), clock());

        let response = service
            .count(FederalAccountCountRequest {
                def_codes: codes(&["L"]),
            })
            .await
            .expect("count");
        assert_eq!(response.count, 0);
    }

    #[rstest]
    #[case(ReferenceDataError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(ReferenceDataError::query("bad sql"), ErrorCode::InternalError)]
    #[tokio::test]
    async fn maps_repository_failures(
        #[case] failure: ReferenceDataError,
        #[case] expected: ErrorCode,
    ) {
        let mut reference = MockReferenceDataRepository::new();
        reference.expect_def_codes().return_once(move || Err(failure));
        let service = FederalAccountCountService::new(
            Arc::new(reference),
            Arc::new(MockFederalAccountRepository::new()),
            clock(),
        );

        let err = service
            .count(FederalAccountCountRequest {
                def_codes: codes(&["L"]),
            })
            .await
            .expect_err("repository failure");
        assert_eq!(err.code(), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn account_query_failures_are_internal() {
        let mut accounts = MockFederalAccountRepository::new();
        accounts
            .expect_count_with_disaster_spending()
            .return_once(|_| Err(FederalAccountRepositoryError::query("timeout")));
        let service = FederalAccountCountService::new(
            Arc::new(FixtureReferenceDataRepository),
            Arc::new(accounts),
            clock(),
        );

        let err = service
            .count(FederalAccountCountRequest {
                def_codes: codes(&["L"]),
            })
            .await
            .expect_err("query failure");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }
}
