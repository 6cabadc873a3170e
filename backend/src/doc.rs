//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every `/api/v2` endpoint plus the health probes
//! - **Schemas**: domain type wrappers from
//!   [`crate::inbound::http::schemas`] that provide OpenAPI definitions
//!   without coupling domain types to the utoipa framework
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::disaster::{DisasterFilterBody, FederalAccountCountBody};
use crate::inbound::http::download::{
    AgencyFilterBody, DownloadCountBody, FiltersBody, TimePeriodBody,
};
use crate::inbound::http::schemas::{
    AgenciesOverviewPageSchema, AgencyOverviewPageSchema, AgencyOverviewRowSchema,
    AgencyPeriodRowSchema, ChildRecipientSchema, DifferenceRowSchema, DifferencesPageSchema,
    DownloadCountResponseSchema, ErrorCodeSchema, ErrorSchema, FederalAccountCountResponseSchema,
    PageMetadataSchema, RecipientLevelSchema, RecipientLocationSchema, RecipientOverviewSchema,
    RecipientParentSchema, SubmissionHistoryPageSchema, SubmissionPublicationSchema,
    TasAccountDiscrepanciesSchema,
};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Spending API",
        description = "Federal spending queries: disaster accounts, recipient profiles, download sizing and agency reporting.",
        license(
            name = "CC0-1.0",
            url = "https://creativecommons.org/publicdomain/zero/1.0/"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::disaster::federal_account_count,
        crate::inbound::http::recipient::recipient_overview,
        crate::inbound::http::recipient::recipient_children,
        crate::inbound::http::download::download_count,
        crate::inbound::http::reporting::agencies_overview,
        crate::inbound::http::reporting::agency_overview,
        crate::inbound::http::reporting::differences,
        crate::inbound::http::reporting::submission_history,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        FederalAccountCountBody,
        DisasterFilterBody,
        FederalAccountCountResponseSchema,
        DownloadCountBody,
        FiltersBody,
        TimePeriodBody,
        AgencyFilterBody,
        DownloadCountResponseSchema,
        RecipientOverviewSchema,
        RecipientParentSchema,
        RecipientLocationSchema,
        RecipientLevelSchema,
        ChildRecipientSchema,
        PageMetadataSchema,
        TasAccountDiscrepanciesSchema,
        AgencyOverviewRowSchema,
        AgencyPeriodRowSchema,
        DifferenceRowSchema,
        SubmissionPublicationSchema,
        AgenciesOverviewPageSchema,
        AgencyOverviewPageSchema,
        DifferencesPageSchema,
        SubmissionHistoryPageSchema,
    )),
    tags(
        (name = "disaster", description = "Disaster emergency fund spending"),
        (name = "recipient", description = "Recipient profiles and hierarchies"),
        (name = "download", description = "Download sizing"),
        (name = "reporting", description = "Agency submission reporting"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the registered paths and schema field structure.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // Note: utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";
    const OVERVIEW_SCHEMA_NAME: &str = "crate.domain.ports.RecipientOverview";

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("/api/v2/disaster/federal_account/count/")]
    #[case("/api/v2/recipient/{recipient_id}/")]
    #[case("/api/v2/recipient/children/{duns}/")]
    #[case("/api/v2/download/count/")]
    #[case("/api/v2/reporting/agencies/overview/")]
    #[case("/api/v2/reporting/agencies/{toptier_code}/overview/")]
    #[case("/api/v2/reporting/agencies/{toptier_code}/differences/")]
    #[case(
        "/api/v2/reporting/agencies/{toptier_code}/{fiscal_year}/{fiscal_period}/submission_history/"
    )]
    #[case("/health/ready")]
    #[case("/health/live")]
    fn openapi_registers_path(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[test]
    fn openapi_error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
    }

    #[test]
    fn openapi_recipient_overview_schema_has_totals() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let overview = schemas.get(OVERVIEW_SCHEMA_NAME).expect("overview schema");

        assert_object_schema_has_field(overview, "recipient_level");
        assert_object_schema_has_field(overview, "total_transaction_amount");
    }
}
