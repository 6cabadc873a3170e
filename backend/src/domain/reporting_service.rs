//! Agency reporting service.
//!
//! Reporting tables are small per agency and period, so rows are loaded in
//! full, filtered and ordered in memory, then paginated.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use mockable::Clock;
use pagination::PageRequest;
use url::Url;

use crate::domain::ports::{
    AgenciesOverviewRequest, AgencyOverviewRequest, AgencyOverviewRow, AgencyPeriodRow,
    AgencyReportingQuery, DifferenceRow, DifferencesRequest, ListingParams,
    ReferenceDataRepository, ReportingPage, ReportingRepository, SubmissionHistoryRequest,
    TasAccountDiscrepancies, ToptierAgency,
};
use crate::domain::{
    AgenciesOverviewSort, AgencyOverviewSort, AgencyPeriodRecord, DifferencesSort, Error,
    FiscalPeriod, SortOrder, SortValue, SubmissionHistorySort, SubmissionPublication,
    ToptierCode, assurance_statement_url, sort_rows,
};

/// Validated paging, ordering and sort key of one listing request.
struct Listing<K> {
    page: PageRequest,
    order: SortOrder,
    sort: K,
}

impl<K> Listing<K>
where
    K: FromStr<Err = Error> + Default,
{
    fn parse(params: &ListingParams) -> Result<Self, Error> {
        let page = PageRequest::new(params.page, params.limit)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let order = SortOrder::parse(params.order.as_deref())?;
        let sort = params
            .sort
            .as_deref()
            .map_or_else(|| Ok(K::default()), str::parse)?;
        Ok(Self { page, order, sort })
    }

    fn respond<T>(&self, mut rows: Vec<T>, key: impl Fn(&T, &K) -> SortValue) -> ReportingPage<T> {
        sort_rows(&mut rows, self.order, |row| key(row, &self.sort));
        ReportingPage {
            page: self.page.paginate(rows),
            messages: Vec::new(),
        }
    }
}

fn discrepancies(record: &AgencyPeriodRecord) -> TasAccountDiscrepancies {
    TasAccountDiscrepancies {
        gtas_obligation_total: record.gtas_obligation_total,
        tas_accounts_total: record.tas_accounts_total,
        tas_obligation_not_in_gtas_total: record.tas_obligation_not_in_gtas_total,
        missing_tas_accounts_count: record.missing_tas_accounts_count,
    }
}

fn agencies_overview_key(row: &AgencyOverviewRow, sort: &AgenciesOverviewSort) -> SortValue {
    let totals = &row.tas_account_discrepancies_totals;
    match sort {
        AgenciesOverviewSort::AgencyName => SortValue::Text(row.agency_name.clone()),
        AgenciesOverviewSort::Abbreviation => row.abbreviation.as_deref().into(),
        AgenciesOverviewSort::ToptierCode => SortValue::Text(row.toptier_code.clone()),
        AgenciesOverviewSort::AgencyId => row.agency_id.into(),
        AgenciesOverviewSort::CurrentTotalBudgetAuthorityAmount => {
            row.current_total_budget_authority_amount.into()
        }
        AgenciesOverviewSort::RecentPublicationDate => row.recent_publication_date.into(),
        AgenciesOverviewSort::RecentPublicationDateCertified => {
            row.recent_publication_date_certified.into()
        }
        AgenciesOverviewSort::MissingTasAccountsCount => totals.missing_tas_accounts_count.into(),
        AgenciesOverviewSort::TasObligationNotInGtasTotal => {
            totals.tas_obligation_not_in_gtas_total.into()
        }
        AgenciesOverviewSort::ObligationDifference => row.obligation_difference.into(),
        AgenciesOverviewSort::UnlinkedContractAwardCount => {
            row.unlinked_contract_award_count.into()
        }
        AgenciesOverviewSort::UnlinkedAssistanceAwardCount => {
            row.unlinked_assistance_award_count.into()
        }
    }
}

fn agency_overview_key(row: &AgencyPeriodRow, sort: &AgencyOverviewSort) -> SortValue {
    let totals = &row.tas_account_discrepancies_totals;
    match sort {
        AgencyOverviewSort::FiscalYear => i64::from(row.fiscal_year).into(),
        AgencyOverviewSort::FiscalPeriod => i64::from(row.fiscal_period).into(),
        AgencyOverviewSort::CurrentTotalBudgetAuthorityAmount => {
            row.current_total_budget_authority_amount.into()
        }
        AgencyOverviewSort::RecentPublicationDate => row.recent_publication_date.into(),
        AgencyOverviewSort::RecentPublicationDateCertified => {
            row.recent_publication_date_certified.into()
        }
        AgencyOverviewSort::MissingTasAccountsCount => totals.missing_tas_accounts_count.into(),
        AgencyOverviewSort::TasObligationNotInGtasTotal => {
            totals.tas_obligation_not_in_gtas_total.into()
        }
        AgencyOverviewSort::ObligationDifference => row.obligation_difference.into(),
        AgencyOverviewSort::UnlinkedContractAwardCount => row.unlinked_contract_award_count.into(),
        AgencyOverviewSort::UnlinkedAssistanceAwardCount => {
            row.unlinked_assistance_award_count.into()
        }
        AgencyOverviewSort::PercentOfTotalBudgetaryResources => {
            row.percent_of_total_budgetary_resources.into()
        }
    }
}

fn difference_key(row: &DifferenceRow, sort: &DifferencesSort) -> SortValue {
    match sort {
        DifferencesSort::Difference => row.difference.into(),
        DifferencesSort::FileAObligation => row.file_a_obligation.into(),
        DifferencesSort::FileBObligation => row.file_b_obligation.into(),
        DifferencesSort::Tas => SortValue::Text(row.tas.clone()),
    }
}

fn publication_key(row: &SubmissionPublication, sort: &SubmissionHistorySort) -> SortValue {
    match sort {
        SubmissionHistorySort::PublicationDate => Some(row.publication_date).into(),
        SubmissionHistorySort::CertificationDate => row.certification_date.into(),
    }
}

/// Agency reporting service implementing the driving port.
#[derive(Clone)]
pub struct AgencyReportingService<R, D> {
    reporting: Arc<R>,
    reference_data: Arc<D>,
    clock: Arc<dyn Clock>,
    files_base_url: Url,
}

impl<R, D> AgencyReportingService<R, D> {
    /// Create a new service; assurance statement links are built under
    /// `files_base_url`.
    pub fn new(
        reporting: Arc<R>,
        reference_data: Arc<D>,
        clock: Arc<dyn Clock>,
        files_base_url: Url,
    ) -> Self {
        Self {
            reporting,
            reference_data,
            clock,
            files_base_url,
        }
    }
}

impl<R, D> AgencyReportingService<R, D>
where
    R: ReportingRepository,
    D: ReferenceDataRepository,
{
    fn today(&self) -> NaiveDate {
        self.clock.utc().date_naive()
    }

    async fn agency(&self, raw_code: &str) -> Result<(ToptierCode, ToptierAgency), Error> {
        let missing = || {
            Error::not_found(format!(
                "Agency with a toptier code of '{raw_code}' does not exist"
            ))
        };
        let code = ToptierCode::new(raw_code).map_err(|_| missing())?;
        let agency = self.reporting.find_agency(&code).await?.ok_or_else(missing)?;
        Ok((code, agency))
    }

    fn required_period(
        &self,
        fiscal_year: Option<i32>,
        fiscal_period: Option<u8>,
    ) -> Result<FiscalPeriod, Error> {
        let fiscal_year = fiscal_year.ok_or_else(|| {
            Error::invalid_request("Missing value: 'fiscal_year' is a required field")
        })?;
        let fiscal_period = fiscal_period.ok_or_else(|| {
            Error::invalid_request("Missing value: 'fiscal_period' is a required field")
        })?;
        FiscalPeriod::new(fiscal_year, fiscal_period, self.today())
    }

    async fn latest_closed_period(&self) -> Result<Option<FiscalPeriod>, Error> {
        let closed = self
            .reference_data
            .closed_submission_periods(self.clock.utc())
            .await?;
        closed
            .monthly
            .map(|window| {
                u8::try_from(window.period)
                    .map(|fiscal_period| FiscalPeriod {
                        fiscal_year: window.fiscal_year,
                        fiscal_period,
                    })
                    .map_err(|_| {
                        Error::internal(format!("invalid submission window: {}", window.period))
                    })
            })
            .transpose()
    }

    fn assurance_url(&self, record: &AgencyPeriodRecord) -> Option<String> {
        record.recent_publication_date?;
        assurance_statement_url(
            &self.files_base_url,
            record.period(),
            &record.toptier_code,
            &record.agency_name,
            record.abbreviation.as_deref(),
        )
        .map(String::from)
    }

    fn overview_row(&self, record: AgencyPeriodRecord) -> AgencyOverviewRow {
        AgencyOverviewRow {
            assurance_statement_url: self.assurance_url(&record),
            tas_account_discrepancies_totals: discrepancies(&record),
            current_total_budget_authority_amount: record.total_budgetary_resources,
            agency_name: record.agency_name,
            abbreviation: record.abbreviation,
            toptier_code: record.toptier_code,
            agency_id: record.agency_id,
            recent_publication_date: record.recent_publication_date,
            recent_publication_date_certified: record.recent_publication_date_certified,
            obligation_difference: record.obligation_difference,
            unlinked_contract_award_count: record.unlinked_contract_award_count,
            unlinked_assistance_award_count: record.unlinked_assistance_award_count,
        }
    }

    fn period_row(&self, record: &AgencyPeriodRecord) -> AgencyPeriodRow {
        AgencyPeriodRow {
            fiscal_year: record.fiscal_year,
            fiscal_period: record.fiscal_period,
            current_total_budget_authority_amount: record.total_budgetary_resources,
            total_budgetary_resources: record.government_budgetary_resources,
            percent_of_total_budgetary_resources: record.percent_of_total_budgetary_resources(),
            recent_publication_date: record.recent_publication_date,
            recent_publication_date_certified: record.recent_publication_date_certified,
            tas_account_discrepancies_totals: discrepancies(record),
            obligation_difference: record.obligation_difference,
            unlinked_contract_award_count: record.unlinked_contract_award_count,
            unlinked_assistance_award_count: record.unlinked_assistance_award_count,
            assurance_statement_url: self.assurance_url(record),
        }
    }
}

fn matches_filter(record: &AgencyPeriodRecord, needle: &str) -> bool {
    let lowered = needle.to_lowercase();
    record.agency_name.to_lowercase().contains(&lowered)
        || record
            .abbreviation
            .as_deref()
            .is_some_and(|abbreviation| abbreviation.to_lowercase().contains(&lowered))
}

#[async_trait]
impl<R, D> AgencyReportingQuery for AgencyReportingService<R, D>
where
    R: ReportingRepository,
    D: ReferenceDataRepository,
{
    async fn agencies_overview(
        &self,
        request: AgenciesOverviewRequest,
    ) -> Result<ReportingPage<AgencyOverviewRow>, Error> {
        let listing = Listing::<AgenciesOverviewSort>::parse(&request.listing)?;
        let period = match (request.fiscal_year, request.fiscal_period) {
            (Some(fiscal_year), Some(fiscal_period)) => {
                Some(FiscalPeriod::new(fiscal_year, fiscal_period, self.today())?)
            }
            (None, None) => self.latest_closed_period().await?,
            _ => {
                return Err(Error::invalid_request(
                    "Fields 'fiscal_year' and 'fiscal_period' must be provided together",
                ));
            }
        };
        let Some(period) = period else {
            return Ok(listing.respond(Vec::new(), agencies_overview_key));
        };

        let rows = self
            .reporting
            .agencies_for_period(period)
            .await?
            .into_iter()
            .filter(|record| {
                request
                    .filter
                    .as_deref()
                    .is_none_or(|needle| matches_filter(record, needle))
            })
            .map(|record| self.overview_row(record))
            .collect();
        Ok(listing.respond(rows, agencies_overview_key))
    }

    async fn agency_overview(
        &self,
        request: AgencyOverviewRequest,
    ) -> Result<ReportingPage<AgencyPeriodRow>, Error> {
        let listing = Listing::<AgencyOverviewSort>::parse(&request.listing)?;
        let (code, _) = self.agency(&request.toptier_code).await?;
        let rows = self
            .reporting
            .periods_for_agency(&code)
            .await?
            .iter()
            .map(|record| self.period_row(record))
            .collect();
        Ok(listing.respond(rows, agency_overview_key))
    }

    async fn differences(
        &self,
        request: DifferencesRequest,
    ) -> Result<ReportingPage<DifferenceRow>, Error> {
        let listing = Listing::<DifferencesSort>::parse(&request.listing)?;
        let period = self.required_period(request.fiscal_year, request.fiscal_period)?;
        let (code, _) = self.agency(&request.toptier_code).await?;
        let rows = self
            .reporting
            .tas_differences(&code, period)
            .await?
            .into_iter()
            .map(|row| DifferenceRow {
                difference: row.difference(),
                tas: row.tas,
                file_a_obligation: row.file_a_obligation,
                file_b_obligation: row.file_b_obligation,
            })
            .collect();
        Ok(listing.respond(rows, difference_key))
    }

    async fn submission_history(
        &self,
        request: SubmissionHistoryRequest,
    ) -> Result<ReportingPage<SubmissionPublication>, Error> {
        let listing = Listing::<SubmissionHistorySort>::parse(&request.listing)?;
        let period = FiscalPeriod::new(request.fiscal_year, request.fiscal_period, self.today())?;
        let (code, _) = self.agency(&request.toptier_code).await?;
        let rows = self.reporting.submission_publications(&code, period).await?;
        Ok(listing.respond(rows, publication_key))
    }
}

#[cfg(test)]
#[path = "reporting_service_tests.rs"]
mod tests;
