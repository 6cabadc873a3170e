//! PostgreSQL-backed agency reporting adapter.
//!
//! Overview rows aggregate several reporting tables per agency and period,
//! so they are read with one SQL statement; the smaller reads use the DSL.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Int4, Text};
use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::Deserialize;

use crate::domain::ports::{ReportingRepository, ReportingRepositoryError, ToptierAgency};
use crate::domain::{
    AgencyPeriodRecord, FiscalPeriod, SubmissionPublication, TasDifference, ToptierCode,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{AgencyPeriodRow, TasDifferenceRow, ToptierAgencyRow};
use super::pool::DbPool;
use super::schema::{reporting_agency_tas, submission_attributes, toptier_agency};

/// Diesel-backed implementation of the reporting port.
#[derive(Clone)]
pub struct DieselReportingRepository {
    pool: DbPool,
}

impl DieselReportingRepository {
    /// Create a new repository with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn conn(
        &self,
    ) -> Result<PooledConnection<'_, AsyncPgConnection>, ReportingRepositoryError> {
        self.pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, ReportingRepositoryError::connection))
    }
}

const AGENCY_PERIOD_SELECT: &str = r"
SELECT ta.name AS agency_name,
       ta.abbreviation,
       rao.toptier_code,
       (SELECT a.id FROM agency a
         WHERE a.toptier_agency_id = ta.toptier_agency_id AND a.toptier_flag
         ORDER BY a.id LIMIT 1) AS agency_id,
       rao.fiscal_year,
       rao.fiscal_period,
       rao.total_budgetary_resources::float8 AS total_budgetary_resources,
       rao.total_dollars_obligated_gtas::float8 AS gtas_obligation_total,
       (SELECT SUM(rat.appropriation_obligated_amount)::float8
          FROM reporting_agency_tas rat
         WHERE rat.toptier_code = rao.toptier_code
           AND rat.fiscal_year = rao.fiscal_year
           AND rat.fiscal_period = rao.fiscal_period) AS tas_accounts_total,
       (SELECT SUM(mt.obligated_amount)::float8
          FROM reporting_agency_missing_tas mt
         WHERE mt.toptier_code = rao.toptier_code
           AND mt.fiscal_year = rao.fiscal_year
           AND mt.fiscal_period = rao.fiscal_period) AS tas_obligation_not_in_gtas_total,
       (SELECT COUNT(*)
          FROM reporting_agency_missing_tas mt
         WHERE mt.toptier_code = rao.toptier_code
           AND mt.fiscal_year = rao.fiscal_year
           AND mt.fiscal_period = rao.fiscal_period) AS missing_tas_accounts_count,
       rao.total_diff_approp_ocpa_obligated_amounts::float8 AS obligation_difference,
       (COALESCE(rao.unlinked_procurement_c_awards, 0)
        + COALESCE(rao.unlinked_procurement_d_awards, 0))::int8 AS unlinked_contract_award_count,
       (COALESCE(rao.unlinked_assistance_c_awards, 0)
        + COALESCE(rao.unlinked_assistance_d_awards, 0))::int8 AS unlinked_assistance_award_count,
       sa.published_date AS recent_publication_date,
       sa.certified_date IS NOT NULL AS recent_publication_date_certified,
       (SELECT SUM(gtas.total_budgetary_resources_cpe)::float8
          FROM gtas_sf133_balances gtas
         WHERE gtas.fiscal_year = rao.fiscal_year
           AND gtas.fiscal_period = rao.fiscal_period) AS government_budgetary_resources
FROM reporting_agency_overview rao
JOIN toptier_agency ta ON ta.toptier_code = rao.toptier_code
LEFT JOIN submission_attributes sa
  ON sa.toptier_code = rao.toptier_code
 AND sa.reporting_fiscal_year = rao.fiscal_year
 AND sa.reporting_fiscal_period = rao.fiscal_period
";

/// One entry of `submission_attributes.history`.
#[derive(Debug, Deserialize)]
struct PublicationEntry {
    published_date: DateTime<Utc>,
    certified_date: Option<DateTime<Utc>>,
}

fn decode_history(history: serde_json::Value) -> Result<Vec<SubmissionPublication>, String> {
    let entries: Vec<PublicationEntry> =
        serde_json::from_value(history).map_err(|err| format!("invalid submission history: {err}"))?;
    Ok(entries
        .into_iter()
        .map(|entry| SubmissionPublication {
            publication_date: entry.published_date,
            certification_date: entry.certified_date,
        })
        .collect())
}

fn query_error(
    operation: &'static str,
) -> impl FnOnce(diesel::result::Error) -> ReportingRepositoryError {
    move |error| {
        map_diesel_error(
            error,
            operation,
            ReportingRepositoryError::query,
            ReportingRepositoryError::connection,
        )
    }
}

#[async_trait]
impl ReportingRepository for DieselReportingRepository {
    async fn find_agency(
        &self,
        code: &ToptierCode,
    ) -> Result<Option<ToptierAgency>, ReportingRepositoryError> {
        let mut conn = self.conn().await?;
        let row: Option<ToptierAgencyRow> = toptier_agency::table
            .filter(toptier_agency::toptier_code.eq(code.as_str()))
            .select(ToptierAgencyRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(query_error("toptier agency lookup"))?;
        Ok(row.map(ToptierAgency::from))
    }

    async fn agencies_for_period(
        &self,
        period: FiscalPeriod,
    ) -> Result<Vec<AgencyPeriodRecord>, ReportingRepositoryError> {
        let mut conn = self.conn().await?;
        let sql = format!(
            "{AGENCY_PERIOD_SELECT} WHERE rao.fiscal_year = $1 AND rao.fiscal_period = $2"
        );
        let rows: Vec<AgencyPeriodRow> = sql_query(sql)
            .bind::<Int4, _>(period.fiscal_year)
            .bind::<Int4, _>(i32::from(period.fiscal_period))
            .load(&mut conn)
            .await
            .map_err(query_error("agencies overview"))?;
        Ok(rows.into_iter().map(AgencyPeriodRecord::from).collect())
    }

    async fn periods_for_agency(
        &self,
        code: &ToptierCode,
    ) -> Result<Vec<AgencyPeriodRecord>, ReportingRepositoryError> {
        let mut conn = self.conn().await?;
        let sql = format!("{AGENCY_PERIOD_SELECT} WHERE rao.toptier_code = $1");
        let rows: Vec<AgencyPeriodRow> = sql_query(sql)
            .bind::<Text, _>(code.as_str())
            .load(&mut conn)
            .await
            .map_err(query_error("agency overview"))?;
        Ok(rows.into_iter().map(AgencyPeriodRecord::from).collect())
    }

    async fn tas_differences(
        &self,
        code: &ToptierCode,
        period: FiscalPeriod,
    ) -> Result<Vec<TasDifference>, ReportingRepositoryError> {
        let mut conn = self.conn().await?;
        let rows: Vec<TasDifferenceRow> = reporting_agency_tas::table
            .filter(reporting_agency_tas::toptier_code.eq(code.as_str()))
            .filter(reporting_agency_tas::fiscal_year.eq(period.fiscal_year))
            .filter(reporting_agency_tas::fiscal_period.eq(i32::from(period.fiscal_period)))
            .filter(reporting_agency_tas::diff_approp_ocpa_obligated_amounts.ne(BigDecimal::from(0)))
            .select(TasDifferenceRow::as_select())
            .load(&mut conn)
            .await
            .map_err(query_error("tas differences"))?;
        rows.into_iter()
            .map(TasDifferenceRow::into_domain)
            .collect::<Result<_, _>>()
            .map_err(ReportingRepositoryError::query)
    }

    async fn submission_publications(
        &self,
        code: &ToptierCode,
        period: FiscalPeriod,
    ) -> Result<Vec<SubmissionPublication>, ReportingRepositoryError> {
        let mut conn = self.conn().await?;
        let history: Option<Option<serde_json::Value>> = submission_attributes::table
            .filter(submission_attributes::toptier_code.eq(code.as_str()))
            .filter(submission_attributes::reporting_fiscal_year.eq(period.fiscal_year))
            .filter(
                submission_attributes::reporting_fiscal_period.eq(i32::from(period.fiscal_period)),
            )
            .select(submission_attributes::history)
            .first(&mut conn)
            .await
            .optional()
            .map_err(query_error("submission history"))?;
        history
            .flatten()
            .map_or_else(|| Ok(Vec::new()), decode_history)
            .map_err(ReportingRepositoryError::query)
    }
}
