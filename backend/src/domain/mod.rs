//! Domain primitives, ports and services.
//!
//! Purpose: Define strongly typed values used by the API and persistence
//! layers and the use cases that combine them. Domain types stay free of
//! HTTP and database concerns; adapters translate at the edges.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - TraceId: per-request correlation identifier.
//! - RecipientId, YearFilter, TransactionFilters: recipient and search
//!   selectors.
//! - FederalAccountCountService, RecipientService, DownloadCountService,
//!   AgencyReportingService: implementations of the driving ports.

pub mod amount;
pub mod business_categories;
mod download_count_service;
pub mod error;
mod federal_account_service;
pub mod filters;
pub mod location;
pub mod ports;
pub mod recipient;
mod recipient_service;
pub mod reporting;
mod reporting_service;
pub mod trace_id;

pub use self::amount::Cents;
pub use self::business_categories::{
    BusinessTypeFlag, categories_for_flags, flag_for_sam_code, flags_from_sam,
};
pub use self::download_count_service::{DEFAULT_DOWNLOAD_LIMIT, DownloadCountService};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::federal_account_service::{
    DISASTER_REPORTING_PERIOD_MIN, FederalAccountCountService,
};
pub use self::filters::{
    AgencyFilter, AgencyRole, AgencyTier, LOAN_AWARD_TYPES, TimePeriod, TransactionFilters,
    fiscal_year_of,
};
pub use self::location::RecipientLocation;
pub use self::recipient::{
    API_SEARCH_MIN_DATE, RecipientId, RecipientLevel, SPECIAL_CASES, YearFilter, is_special_case,
};
pub use self::recipient_service::RecipientService;
pub use self::reporting::{
    AgenciesOverviewSort, AgencyOverviewSort, AgencyPeriodRecord, ClosedPeriod,
    ClosedSubmissionPeriods, DifferencesSort, FIRST_REPORTING_FISCAL_YEAR, FiscalPeriod,
    FiscalPeriodLabel, SortOrder, SortValue, SubmissionHistorySort, SubmissionPublication,
    TasDifference, ToptierCode, assurance_statement_url, sort_rows,
};
pub use self::reporting_service::AgencyReportingService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use spending_api::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
