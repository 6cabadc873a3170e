//! PostgreSQL-backed reference data adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ReferenceDataError, ReferenceDataRepository};
use crate::domain::{ClosedPeriod, ClosedSubmissionPeriods};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::SubmissionWindowRow;
use super::pool::DbPool;
use super::schema::{dabs_submission_window_schedule as windows, disaster_emergency_fund_code};

/// Diesel-backed reference data repository.
#[derive(Clone)]
pub struct DieselReferenceDataRepository {
    pool: DbPool,
}

impl DieselReferenceDataRepository {
    /// Create a new repository with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn query_error(operation: &'static str) -> impl FnOnce(diesel::result::Error) -> ReferenceDataError {
    move |error| {
        map_diesel_error(
            error,
            operation,
            ReferenceDataError::query,
            ReferenceDataError::connection,
        )
    }
}

#[async_trait]
impl ReferenceDataRepository for DieselReferenceDataRepository {
    async fn def_codes(&self) -> Result<Vec<String>, ReferenceDataError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, ReferenceDataError::connection))?;
        disaster_emergency_fund_code::table
            .select(disaster_emergency_fund_code::code)
            .order_by(disaster_emergency_fund_code::code)
            .load(&mut conn)
            .await
            .map_err(query_error("def code listing"))
    }

    async fn closed_submission_periods(
        &self,
        now: DateTime<Utc>,
    ) -> Result<ClosedSubmissionPeriods, ReferenceDataError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, ReferenceDataError::connection))?;

        let quarterly: Option<SubmissionWindowRow> = windows::table
            .filter(windows::is_quarter.eq(true))
            .filter(windows::submission_reveal_date.le(now))
            .order_by((
                windows::submission_fiscal_year.desc(),
                windows::submission_fiscal_quarter.desc(),
            ))
            .select(SubmissionWindowRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(query_error("closed quarterly window"))?;
        let monthly: Option<SubmissionWindowRow> = windows::table
            .filter(windows::is_quarter.eq(false))
            .filter(windows::submission_reveal_date.le(now))
            .order_by((
                windows::submission_fiscal_year.desc(),
                windows::submission_fiscal_month.desc(),
            ))
            .select(SubmissionWindowRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(query_error("closed monthly window"))?;

        Ok(ClosedSubmissionPeriods {
            quarterly: quarterly.map(|row| ClosedPeriod {
                fiscal_year: row.submission_fiscal_year,
                period: row.submission_fiscal_quarter,
            }),
            monthly: monthly.map(|row| ClosedPeriod {
                fiscal_year: row.submission_fiscal_year,
                period: row.submission_fiscal_month,
            }),
        })
    }
}
