//! Port for the agency reporting tables.
use async_trait::async_trait;

use crate::domain::{
    AgencyPeriodRecord, FiscalPeriod, SubmissionPublication, TasDifference, ToptierCode,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by reporting repositories.
    pub enum ReportingRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "reporting repository connection failed: {message}"; service_unavailable,
        /// Query failed during execution.
        Query { message: String } => "reporting repository query failed: {message}"; internal,
    }
}

/// A toptier agency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToptierAgency {
    /// Toptier code.
    pub toptier_code: String,
    /// Agency name.
    pub name: String,
    /// Agency abbreviation.
    pub abbreviation: Option<String>,
}

/// Read access to reporting overviews, differences and publications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportingRepository: Send + Sync {
    /// Toptier agency with `code`, if any.
    async fn find_agency(
        &self,
        code: &ToptierCode,
    ) -> Result<Option<ToptierAgency>, ReportingRepositoryError>;

    /// Every agency's record for one period.
    async fn agencies_for_period(
        &self,
        period: FiscalPeriod,
    ) -> Result<Vec<AgencyPeriodRecord>, ReportingRepositoryError>;

    /// Every period recorded for one agency, with government-wide budgetary
    /// resources filled in.
    async fn periods_for_agency(
        &self,
        code: &ToptierCode,
    ) -> Result<Vec<AgencyPeriodRecord>, ReportingRepositoryError>;

    /// TAS whose File A and File B obligations differ.
    async fn tas_differences(
        &self,
        code: &ToptierCode,
        period: FiscalPeriod,
    ) -> Result<Vec<TasDifference>, ReportingRepositoryError>;

    /// Publications of the agency's submission for the period.
    async fn submission_publications(
        &self,
        code: &ToptierCode,
        period: FiscalPeriod,
    ) -> Result<Vec<SubmissionPublication>, ReportingRepositoryError>;
}

/// Repository with no agencies; used when no database is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureReportingRepository;

#[async_trait]
impl ReportingRepository for FixtureReportingRepository {
    async fn find_agency(
        &self,
        _code: &ToptierCode,
    ) -> Result<Option<ToptierAgency>, ReportingRepositoryError> {
        Ok(None)
    }

    async fn agencies_for_period(
        &self,
        _period: FiscalPeriod,
    ) -> Result<Vec<AgencyPeriodRecord>, ReportingRepositoryError> {
        Ok(Vec::new())
    }

    async fn periods_for_agency(
        &self,
        _code: &ToptierCode,
    ) -> Result<Vec<AgencyPeriodRecord>, ReportingRepositoryError> {
        Ok(Vec::new())
    }

    async fn tas_differences(
        &self,
        _code: &ToptierCode,
        _period: FiscalPeriod,
    ) -> Result<Vec<TasDifference>, ReportingRepositoryError> {
        Ok(Vec::new())
    }

    async fn submission_publications(
        &self,
        _code: &ToptierCode,
        _period: FiscalPeriod,
    ) -> Result<Vec<SubmissionPublication>, ReportingRepositoryError> {
        Ok(Vec::new())
    }
}
