//! PostgreSQL-backed federal account counter.

use async_trait::async_trait;
use diesel::sql_query;
use diesel::sql_types::{Array, Date, Int4, Nullable, Text};
use diesel_async::RunQueryDsl;

use crate::domain::ports::{
    DisasterSpendingFilter, FederalAccountRepository, FederalAccountRepositoryError,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::CountRow;
use super::pool::DbPool;

/// Diesel-backed implementation of the federal account count port.
#[derive(Clone)]
pub struct DieselFederalAccountRepository {
    pool: DbPool,
}

impl DieselFederalAccountRepository {
    /// Create a new repository with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

// A NULL window bound makes its branch false, so a kind of submission with
// no closed window never matches.
const COUNT_SQL: &str = r"
SELECT COUNT(*) AS count
FROM federal_account fa
WHERE EXISTS (
    SELECT 1
    FROM financial_accounts_by_program_activity_object_class faba
    JOIN treasury_appropriation_account taa
      ON taa.treasury_account_identifier = faba.treasury_account_id
    JOIN submission_attributes sa
      ON sa.submission_id = faba.submission_id
    WHERE taa.federal_account_id = fa.id
      AND faba.disaster_emergency_fund_code = ANY($1)
      AND sa.reporting_period_start >= $2
      AND (
            (sa.quarter_format_flag
             AND sa.reporting_fiscal_year <= $3
             AND sa.reporting_fiscal_quarter <= $4)
         OR (NOT sa.quarter_format_flag
             AND sa.reporting_fiscal_year <= $5
             AND sa.reporting_fiscal_period <= $6)
      )
      AND (faba.obligations_incurred_by_program_object_class_cpe <> 0
           OR faba.gross_outlay_amount_by_program_object_class_cpe <> 0)
)
";

#[async_trait]
impl FederalAccountRepository for DieselFederalAccountRepository {
    async fn count_with_disaster_spending(
        &self,
        filter: &DisasterSpendingFilter,
    ) -> Result<u64, FederalAccountRepositoryError> {
        let quarterly = filter.closed_periods.quarterly;
        let monthly = filter.closed_periods.monthly;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, FederalAccountRepositoryError::connection))?;

        let row: CountRow = sql_query(COUNT_SQL)
            .bind::<Array<Text>, _>(&filter.def_codes)
            .bind::<Date, _>(filter.reporting_period_min)
            .bind::<Nullable<Int4>, _>(quarterly.map(|window| window.fiscal_year))
            .bind::<Nullable<Int4>, _>(quarterly.map(|window| window.period))
            .bind::<Nullable<Int4>, _>(monthly.map(|window| window.fiscal_year))
            .bind::<Nullable<Int4>, _>(monthly.map(|window| window.period))
            .get_result(&mut conn)
            .await
            .map_err(|err| {
                map_diesel_error(
                    err,
                    "disaster federal account count",
                    FederalAccountRepositoryError::query,
                    FederalAccountRepositoryError::connection,
                )
            })?;

        u64::try_from(row.count).map_err(|_| {
            FederalAccountRepositoryError::query(format!("negative count {}", row.count))
        })
    }
}
