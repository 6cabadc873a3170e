//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, the search index, the response cache) expose
//! `define_port_error!` enums so adapters map their failures into predictable
//! variants. Driving ports are the use cases the HTTP adapter calls.

mod macros;
pub(crate) use macros::define_port_error;

mod agency_reporting_query;
mod cache_key;
mod download_count_query;
mod federal_account_count_query;
mod federal_account_repository;
mod recipient_query;
mod recipient_repository;
mod reference_data_repository;
mod reporting_repository;
mod response_cache;
mod transaction_search;

#[cfg(test)]
pub use agency_reporting_query::MockAgencyReportingQuery;
pub use agency_reporting_query::{
    AgenciesOverviewRequest, AgencyOverviewRequest, AgencyOverviewRow, AgencyPeriodRow,
    AgencyReportingQuery, DifferenceRow, DifferencesRequest, ListingParams, ReportingPage,
    SubmissionHistoryRequest, TasAccountDiscrepancies,
};
pub use cache_key::{ResponseCacheKey, ResponseCacheKeyValidationError};
#[cfg(test)]
pub use download_count_query::MockDownloadCountQuery;
pub use download_count_query::{DownloadCountQuery, DownloadCountRequest, DownloadCountResponse};
#[cfg(test)]
pub use federal_account_count_query::MockFederalAccountCountQuery;
pub use federal_account_count_query::{
    FederalAccountCountQuery, FederalAccountCountRequest, FederalAccountCountResponse,
};
#[cfg(test)]
pub use federal_account_repository::MockFederalAccountRepository;
pub use federal_account_repository::{
    DisasterSpendingFilter, FederalAccountRepository, FederalAccountRepositoryError,
    FixtureFederalAccountRepository,
};
#[cfg(test)]
pub use recipient_query::MockRecipientQuery;
pub use recipient_query::{
    ChildRecipient, ChildRecipientsRequest, RecipientOverview, RecipientOverviewRequest,
    RecipientParent, RecipientQuery,
};
#[cfg(test)]
pub use recipient_repository::MockRecipientRepository;
pub use recipient_repository::{
    ChildProfile, FixtureRecipientRepository, RecipientLookup, RecipientRepository,
    RecipientRepositoryError, SamBusinessTypes,
};
#[cfg(test)]
pub use reference_data_repository::MockReferenceDataRepository;
pub use reference_data_repository::{
    FixtureReferenceDataRepository, ReferenceDataError, ReferenceDataRepository,
};
#[cfg(test)]
pub use reporting_repository::MockReportingRepository;
pub use reporting_repository::{
    FixtureReportingRepository, ReportingRepository, ReportingRepositoryError, ToptierAgency,
};
#[cfg(test)]
pub use response_cache::MockResponseCache;
pub use response_cache::{NoOpResponseCache, ResponseCache, ResponseCacheError};
#[cfg(test)]
pub use transaction_search::MockTransactionSearch;
pub use transaction_search::{
    ChildBucketKey, FixtureTransactionSearch, RecipientGrouping, RecipientTotals,
    TransactionSearch, TransactionSearchError,
};

#[cfg(test)]
mod tests;
