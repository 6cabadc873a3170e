//! Internal Diesel row structs.
//!
//! These types are implementation details of the persistence layer and never
//! reach the domain. Rows returned by raw SQL derive `QueryableByName`.

use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Bool, Double, Int4, Nullable, Text, Timestamptz};
use uuid::Uuid;

use crate::domain::ports::{ChildProfile, RecipientLookup, SamBusinessTypes, ToptierAgency};
use crate::domain::{AgencyPeriodRecord, RecipientLocation, TasDifference};

use super::schema::{
    dabs_submission_window_schedule, duns, recipient_lookup, recipient_profile,
    reporting_agency_tas, toptier_agency,
};

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

/// Closed submission window.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = dabs_submission_window_schedule)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SubmissionWindowRow {
    pub submission_fiscal_year: i32,
    pub submission_fiscal_quarter: i32,
    pub submission_fiscal_month: i32,
}

// ---------------------------------------------------------------------------
// Recipients
// ---------------------------------------------------------------------------

/// Name, identifiers and address of a recipient hash.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = recipient_lookup)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RecipientLookupRow {
    pub recipient_hash: Uuid,
    pub legal_business_name: Option<String>,
    pub duns: Option<String>,
    pub alternate_names: Option<Vec<String>>,
    pub address_line_1: Option<String>,
    pub address_line_2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip5: Option<String>,
    pub zip4: Option<String>,
    pub country_code: Option<String>,
    pub congressional_district: Option<String>,
}

impl From<RecipientLookupRow> for RecipientLookup {
    fn from(row: RecipientLookupRow) -> Self {
        Self {
            recipient_hash: row.recipient_hash,
            legal_business_name: row.legal_business_name,
            duns: row.duns,
            alternate_names: row.alternate_names.unwrap_or_default(),
            location: RecipientLocation {
                address_line1: row.address_line_1,
                address_line2: row.address_line_2,
                city_name: row.city,
                state_code: row.state,
                zip: row.zip5,
                zip4: row.zip4,
                country_code: row.country_code,
                congressional_code: row.congressional_district,
                ..RecipientLocation::default()
            },
        }
    }
}

/// Child profile listed under a parent.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = recipient_profile)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ChildProfileRow {
    pub recipient_hash: Uuid,
    pub recipient_name: Option<String>,
    pub recipient_unique_id: Option<String>,
    pub uei: Option<String>,
}

impl From<ChildProfileRow> for ChildProfile {
    fn from(row: ChildProfileRow) -> Self {
        Self {
            recipient_hash: row.recipient_hash,
            recipient_name: row.recipient_name,
            duns: row.recipient_unique_id,
            uei: row.uei,
        }
    }
}

/// Newest SAM registration columns.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = duns)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SamRegistrationRow {
    pub business_types_codes: Option<Vec<String>>,
    pub entity_structure: Option<String>,
}

impl From<SamRegistrationRow> for SamBusinessTypes {
    fn from(row: SamRegistrationRow) -> Self {
        Self {
            business_types_codes: row.business_types_codes.unwrap_or_default(),
            entity_structure: row.entity_structure,
        }
    }
}

// ---------------------------------------------------------------------------
// Agency reporting
// ---------------------------------------------------------------------------

/// Toptier agency.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = toptier_agency)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ToptierAgencyRow {
    pub toptier_code: String,
    pub name: String,
    pub abbreviation: Option<String>,
}

impl From<ToptierAgencyRow> for ToptierAgency {
    fn from(row: ToptierAgencyRow) -> Self {
        Self {
            toptier_code: row.toptier_code,
            name: row.name,
            abbreviation: row.abbreviation,
        }
    }
}

/// TAS obligations from File A and File B.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reporting_agency_tas)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TasDifferenceRow {
    pub tas_rendering_label: String,
    pub appropriation_obligated_amount: BigDecimal,
    pub object_class_pa_obligated_amount: BigDecimal,
}

impl TasDifferenceRow {
    /// Convert to the domain row; amounts outside `f64` range are rejected.
    pub(crate) fn into_domain(self) -> Result<TasDifference, String> {
        let amount = |value: &BigDecimal| {
            value
                .to_f64()
                .ok_or_else(|| {
                    format!("obligation {value} of {} out of range", self.tas_rendering_label)
                })
        };
        let file_a_obligation = amount(&self.appropriation_obligated_amount)?;
        let file_b_obligation = amount(&self.object_class_pa_obligated_amount)?;
        Ok(TasDifference {
            tas: self.tas_rendering_label,
            file_a_obligation,
            file_b_obligation,
        })
    }
}

/// One agency period with its reconciliation metrics, from raw SQL.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct AgencyPeriodRow {
    #[diesel(sql_type = Text)]
    pub agency_name: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub abbreviation: Option<String>,
    #[diesel(sql_type = Text)]
    pub toptier_code: String,
    #[diesel(sql_type = Nullable<Int4>)]
    pub agency_id: Option<i32>,
    #[diesel(sql_type = Int4)]
    pub fiscal_year: i32,
    #[diesel(sql_type = Int4)]
    pub fiscal_period: i32,
    #[diesel(sql_type = Nullable<Double>)]
    pub total_budgetary_resources: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub gtas_obligation_total: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub tas_accounts_total: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub tas_obligation_not_in_gtas_total: Option<f64>,
    #[diesel(sql_type = BigInt)]
    pub missing_tas_accounts_count: i64,
    #[diesel(sql_type = Nullable<Double>)]
    pub obligation_difference: Option<f64>,
    #[diesel(sql_type = BigInt)]
    pub unlinked_contract_award_count: i64,
    #[diesel(sql_type = BigInt)]
    pub unlinked_assistance_award_count: i64,
    #[diesel(sql_type = Nullable<Timestamptz>)]
    pub recent_publication_date: Option<DateTime<Utc>>,
    #[diesel(sql_type = Bool)]
    pub recent_publication_date_certified: bool,
    #[diesel(sql_type = Nullable<Double>)]
    pub government_budgetary_resources: Option<f64>,
}

impl From<AgencyPeriodRow> for AgencyPeriodRecord {
    fn from(row: AgencyPeriodRow) -> Self {
        Self {
            agency_name: row.agency_name,
            abbreviation: row.abbreviation,
            toptier_code: row.toptier_code,
            agency_id: row.agency_id,
            fiscal_year: row.fiscal_year,
            fiscal_period: row.fiscal_period,
            total_budgetary_resources: row.total_budgetary_resources,
            gtas_obligation_total: row.gtas_obligation_total,
            tas_accounts_total: row.tas_accounts_total,
            tas_obligation_not_in_gtas_total: row.tas_obligation_not_in_gtas_total,
            missing_tas_accounts_count: row.missing_tas_accounts_count,
            obligation_difference: row.obligation_difference,
            unlinked_contract_award_count: row.unlinked_contract_award_count,
            unlinked_assistance_award_count: row.unlinked_assistance_award_count,
            recent_publication_date: row.recent_publication_date,
            recent_publication_date_certified: row.recent_publication_date_certified,
            government_budgetary_resources: row.government_budgetary_resources,
        }
    }
}

/// Result of a `COUNT(*)` query.
#[derive(Debug, Clone, Copy, QueryableByName)]
pub(crate) struct CountRow {
    #[diesel(sql_type = BigInt)]
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[rstest]
    fn lookup_rows_map_address_columns() {
        let lookup = RecipientLookup::from(RecipientLookupRow {
            recipient_hash: Uuid::nil(),
            legal_business_name: Some("ACME".to_owned()),
            duns: Some("123456789".to_owned()),
            alternate_names: None,
            address_line_1: Some("1 Main St".to_owned()),
            address_line_2: None,
            city: Some("Springfield".to_owned()),
            state: Some("IL".to_owned()),
            zip5: Some("62701".to_owned()),
            zip4: None,
            country_code: Some("USA".to_owned()),
            congressional_district: Some("13".to_owned()),
        });

        assert!(lookup.alternate_names.is_empty());
        assert_eq!(lookup.location.address_line1.as_deref(), Some("1 Main St"));
        assert_eq!(lookup.location.city_name.as_deref(), Some("Springfield"));
        assert_eq!(lookup.location.state_code.as_deref(), Some("IL"));
        assert_eq!(lookup.location.zip.as_deref(), Some("62701"));
        assert_eq!(lookup.location.congressional_code.as_deref(), Some("13"));
        assert_eq!(lookup.location.county_name, None);
    }

    #[rstest]
    fn tas_rows_convert_numeric_amounts() {
        let row = TasDifferenceRow {
            tas_rendering_label: "020-X-0001-000".to_owned(),
            appropriation_obligated_amount: BigDecimal::from_str("10.25").expect("decimal"),
            object_class_pa_obligated_amount: BigDecimal::from_str("4.00").expect("decimal"),
        };

        let difference = row.into_domain().expect("in range");
        assert_eq!(difference.file_a_obligation, 10.25);
        assert_eq!(difference.file_b_obligation, 4.0);
        assert_eq!(difference.difference(), 6.25);
    }
}
