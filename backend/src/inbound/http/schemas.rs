//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the structure of their corresponding domain
//! types but live in the inbound adapter layer where framework concerns belong.
#![expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The body is well-formed but semantically invalid.
    #[schema(rename = "unprocessable_entity")]
    UnprocessableEntity,
    /// A backing store could not be reached.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// API error response payload with machine-readable code and human-readable
/// message.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "Missing value: 'filters'")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(rename = "traceId", example = "00000000-0000-0000-0000-000000000000")]
    trace_id: Option<String>,
    /// Supplementary error details for clients.
    details: Option<serde_json::Value>,
}

/// Number of federal accounts matching a disaster filter.
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::FederalAccountCountResponse)]
pub struct FederalAccountCountResponseSchema {
    /// Distinct federal accounts.
    #[schema(example = 12)]
    count: u64,
}

/// Transaction count behind a prospective download.
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::DownloadCountResponse)]
pub struct DownloadCountResponseSchema {
    /// Matching transactions.
    #[schema(example = 1024)]
    calculated_transaction_count: u64,
    /// Largest download the service will build.
    #[schema(example = 500_000)]
    maximum_transaction_limit: u64,
    /// Whether the count exceeds the limit.
    transaction_rows_gt_limit: bool,
}

/// OpenAPI schema for [`crate::domain::RecipientLocation`].
#[derive(ToSchema)]
#[schema(as = crate::domain::RecipientLocation)]
pub struct RecipientLocationSchema {
    address_line1: Option<String>,
    address_line2: Option<String>,
    address_line3: Option<String>,
    foreign_province: Option<String>,
    city_name: Option<String>,
    county_name: Option<String>,
    #[schema(example = "VA")]
    state_code: Option<String>,
    zip: Option<String>,
    zip4: Option<String>,
    foreign_postal_code: Option<String>,
    country_name: Option<String>,
    #[schema(example = "USA")]
    country_code: Option<String>,
    congressional_code: Option<String>,
}

/// A parent organisation of a recipient.
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::RecipientParent)]
pub struct RecipientParentSchema {
    parent_id: Option<String>,
    parent_duns: Option<String>,
    parent_name: Option<String>,
    parent_uei: Option<String>,
}

/// Recipient level code.
#[derive(ToSchema)]
#[schema(as = crate::domain::RecipientLevel)]
pub enum RecipientLevelSchema {
    /// Parent organisation.
    #[schema(rename = "P")]
    Parent,
    /// Child of a parent.
    #[schema(rename = "C")]
    Child,
    /// Recipient without a parent.
    #[schema(rename = "R")]
    Recipient,
}

/// Recipient overview payload.
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::RecipientOverview)]
pub struct RecipientOverviewSchema {
    name: Option<String>,
    alternate_names: Vec<String>,
    #[schema(example = "001006360")]
    duns: Option<String>,
    uei: Option<String>,
    #[schema(example = "00077a9a-5a70-8919-fd19-330762af6b84-C")]
    recipient_id: String,
    recipient_level: RecipientLevelSchema,
    parent_id: Option<String>,
    parent_name: Option<String>,
    parent_duns: Option<String>,
    parent_uei: Option<String>,
    parents: Vec<RecipientParentSchema>,
    business_types: Vec<String>,
    location: RecipientLocationSchema,
    total_transaction_amount: f64,
    total_transactions: u64,
    total_face_value_loan_amount: f64,
    total_face_value_loan_transactions: u64,
}

/// One child of a parent recipient.
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::ChildRecipient)]
pub struct ChildRecipientSchema {
    recipient_id: String,
    name: Option<String>,
    duns: Option<String>,
    uei: Option<String>,
    /// Obligations in dollars.
    amount: f64,
    /// Omitted when the child has no lookup row.
    #[schema(required = false)]
    state_province: Option<String>,
}

/// Pagination metadata of every reporting listing.
#[derive(ToSchema)]
#[schema(as = pagination::PageMetadata)]
pub struct PageMetadataSchema {
    #[schema(example = 1)]
    page: u32,
    total: u64,
    #[schema(example = 10)]
    limit: u32,
    next: Option<u32>,
    previous: Option<u32>,
    #[schema(rename = "hasNext")]
    has_next: bool,
    #[schema(rename = "hasPrevious")]
    has_previous: bool,
}

/// GTAS versus File A discrepancy totals.
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::TasAccountDiscrepancies)]
pub struct TasAccountDiscrepanciesSchema {
    gtas_obligation_total: Option<f64>,
    tas_accounts_total: Option<f64>,
    tas_obligation_not_in_gtas_total: Option<f64>,
    missing_tas_accounts_count: i64,
}

/// One agency in the agencies overview.
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::AgencyOverviewRow)]
pub struct AgencyOverviewRowSchema {
    agency_name: String,
    abbreviation: Option<String>,
    #[schema(example = "020")]
    toptier_code: String,
    agency_id: Option<i32>,
    current_total_budget_authority_amount: Option<f64>,
    recent_publication_date: Option<String>,
    recent_publication_date_certified: bool,
    tas_account_discrepancies_totals: TasAccountDiscrepanciesSchema,
    obligation_difference: Option<f64>,
    unlinked_contract_award_count: i64,
    unlinked_assistance_award_count: i64,
    assurance_statement_url: Option<String>,
}

/// One reporting period of an agency.
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::AgencyPeriodRow)]
pub struct AgencyPeriodRowSchema {
    #[schema(example = 2020)]
    fiscal_year: i32,
    #[schema(example = 12)]
    fiscal_period: i32,
    current_total_budget_authority_amount: Option<f64>,
    total_budgetary_resources: Option<f64>,
    percent_of_total_budgetary_resources: Option<f64>,
    recent_publication_date: Option<String>,
    recent_publication_date_certified: bool,
    tas_account_discrepancies_totals: TasAccountDiscrepanciesSchema,
    obligation_difference: Option<f64>,
    unlinked_contract_award_count: i64,
    unlinked_assistance_award_count: i64,
    assurance_statement_url: Option<String>,
}

/// A TAS whose File A and File B obligations differ.
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::DifferenceRow)]
pub struct DifferenceRowSchema {
    #[schema(example = "011-X-8345-000")]
    tas: String,
    file_a_obligation: f64,
    file_b_obligation: f64,
    difference: f64,
}

/// One publication of a submission.
#[derive(ToSchema)]
#[schema(as = crate::domain::SubmissionPublication)]
pub struct SubmissionPublicationSchema {
    #[schema(example = "2020-10-11T11:59:21Z")]
    publication_date: String,
    certification_date: Option<String>,
}

macro_rules! reporting_page_schema {
    ($name:ident, $row:ty, $doc:literal) => {
        #[doc = $doc]
        #[derive(ToSchema)]
        pub struct $name {
            page_metadata: PageMetadataSchema,
            results: Vec<$row>,
            messages: Vec<String>,
        }
    };
}

reporting_page_schema!(
    AgenciesOverviewPageSchema,
    AgencyOverviewRowSchema,
    "Paginated agencies overview."
);
reporting_page_schema!(
    AgencyOverviewPageSchema,
    AgencyPeriodRowSchema,
    "Paginated per-period overview of one agency."
);
reporting_page_schema!(
    DifferencesPageSchema,
    DifferenceRowSchema,
    "Paginated File A and File B differences."
);
reporting_page_schema!(
    SubmissionHistoryPageSchema,
    SubmissionPublicationSchema,
    "Paginated publication history."
);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::PartialSchema;

    fn schema_to_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[test]
    fn error_schema_has_expected_name() {
        let schema_json = schema_to_json::<ErrorSchema>();
        // utoipa replaces :: with . in schema names
        assert_eq!(ErrorSchema::name(), "crate.domain.Error");
        assert!(schema_json.contains("message"));
        assert!(schema_json.contains("traceId"));
    }

    #[rstest]
    #[case("invalid_request")]
    #[case("not_found")]
    #[case("unprocessable_entity")]
    #[case("service_unavailable")]
    #[case("internal_error")]
    fn error_code_schema_variants_match_domain(#[case] code: &str) {
        let schema_json = schema_to_json::<ErrorCodeSchema>();
        assert!(schema_json.contains(code), "missing {code}");
        let parsed: crate::domain::ErrorCode =
            serde_json::from_value(serde_json::json!(code)).expect("domain code");
        assert_eq!(serde_json::to_value(parsed).expect("code"), serde_json::json!(code));
    }

    #[test]
    fn page_metadata_uses_camel_case_flags() {
        let schema_json = schema_to_json::<PageMetadataSchema>();
        assert!(schema_json.contains("hasNext"));
        assert!(schema_json.contains("hasPrevious"));
    }

    #[test]
    fn reporting_pages_flatten_metadata_and_messages() {
        let schema_json = schema_to_json::<DifferencesPageSchema>();
        for field in ["page_metadata", "results", "messages"] {
            assert!(schema_json.contains(field), "missing {field}");
        }
    }

    #[test]
    fn recipient_overview_lists_location() {
        let schema_json = schema_to_json::<RecipientOverviewSchema>();
        assert!(schema_json.contains("location"));
        assert!(schema_json.contains("total_face_value_loan_transactions"));
    }
}
