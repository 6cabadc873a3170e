//! Diesel table definitions for the spending database.
//!
//! The schema is owned by the loader that populates the database; only the
//! columns this service reads are declared. Aggregating queries that Diesel's
//! DSL cannot express cleanly live as SQL next to their repository.

diesel::table! {
    /// Disaster emergency fund codes.
    disaster_emergency_fund_code (code) {
        code -> Text,
        public_law -> Nullable<Text>,
    }
}

diesel::table! {
    /// Submission window schedule; a window is closed once revealed.
    dabs_submission_window_schedule (id) {
        id -> Int4,
        submission_fiscal_year -> Int4,
        submission_fiscal_quarter -> Int4,
        submission_fiscal_month -> Int4,
        is_quarter -> Bool,
        submission_reveal_date -> Timestamptz,
    }
}

diesel::table! {
    /// One row per recipient hash and hierarchy level.
    recipient_profile (id) {
        id -> Int4,
        recipient_level -> Text,
        recipient_hash -> Uuid,
        recipient_unique_id -> Nullable<Text>,
        recipient_name -> Nullable<Text>,
        uei -> Nullable<Text>,
        recipient_affiliations -> Array<Text>,
    }
}

diesel::table! {
    /// Canonical name, identifiers and address per recipient hash.
    recipient_lookup (id) {
        id -> Int8,
        recipient_hash -> Uuid,
        legal_business_name -> Nullable<Text>,
        duns -> Nullable<Text>,
        uei -> Nullable<Text>,
        alternate_names -> Nullable<Array<Text>>,
        address_line_1 -> Nullable<Text>,
        address_line_2 -> Nullable<Text>,
        city -> Nullable<Text>,
        state -> Nullable<Text>,
        zip5 -> Nullable<Text>,
        zip4 -> Nullable<Text>,
        country_code -> Nullable<Text>,
        congressional_district -> Nullable<Text>,
    }
}

diesel::table! {
    /// SAM registrations.
    duns (awardee_or_recipient_uniqu) {
        awardee_or_recipient_uniqu -> Text,
        legal_business_name -> Nullable<Text>,
        business_types_codes -> Nullable<Array<Text>>,
        entity_structure -> Nullable<Text>,
        update_date -> Date,
    }
}

diesel::table! {
    /// Country code reference.
    ref_country_code (country_code) {
        country_code -> Text,
        country_name -> Nullable<Text>,
    }
}

diesel::table! {
    /// Denormalised transactions.
    transaction_search (transaction_id) {
        transaction_id -> Int8,
        recipient_hash -> Nullable<Uuid>,
        action_date -> Nullable<Date>,
        business_categories -> Nullable<Array<Text>>,
    }
}

diesel::table! {
    /// Department-level agencies.
    toptier_agency (toptier_agency_id) {
        toptier_agency_id -> Int4,
        toptier_code -> Text,
        name -> Text,
        abbreviation -> Nullable<Text>,
    }
}

diesel::table! {
    /// File A / File B obligations per TAS and period.
    reporting_agency_tas (reporting_agency_tas_id) {
        reporting_agency_tas_id -> Int4,
        toptier_code -> Text,
        fiscal_year -> Int4,
        fiscal_period -> Int4,
        tas_rendering_label -> Text,
        appropriation_obligated_amount -> Numeric,
        object_class_pa_obligated_amount -> Numeric,
        diff_approp_ocpa_obligated_amounts -> Numeric,
    }
}

diesel::table! {
    /// Agency submissions and their publication history.
    submission_attributes (submission_id) {
        submission_id -> Int4,
        toptier_code -> Nullable<Text>,
        reporting_fiscal_year -> Int4,
        reporting_fiscal_period -> Int4,
        reporting_fiscal_quarter -> Int4,
        quarter_format_flag -> Bool,
        reporting_period_start -> Date,
        published_date -> Nullable<Timestamptz>,
        certified_date -> Nullable<Timestamptz>,
        history -> Nullable<Jsonb>,
    }
}
