//! Agency reporting value types.
//!
//! Agencies publish DATA Act submissions per fiscal period. These types
//! validate the period and agency selectors accepted by the reporting
//! endpoints, describe the rows read from the reporting tables and provide
//! the in-memory ordering used before pagination.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::{Error, fiscal_year_of};

/// First fiscal year with agency reporting data.
pub const FIRST_REPORTING_FISCAL_YEAR: i32 = 2017;

/// Toptier agency code: three or four digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ToptierCode(String);

impl ToptierCode {
    /// Validate a toptier code.
    ///
    /// # Errors
    ///
    /// Returns an invalid-request error unless `raw` is 3 or 4 ASCII digits.
    pub fn new(raw: impl Into<String>) -> Result<Self, Error> {
        let raw = raw.into();
        let well_formed =
            (3..=4).contains(&raw.len()) && raw.chars().all(|c| c.is_ascii_digit());
        if well_formed {
            Ok(Self(raw))
        } else {
            Err(Error::invalid_request(format!(
                "Invalid toptier code: '{raw}'"
            )))
        }
    }

    /// Borrow the code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ToptierCode {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ToptierCode> for String {
    fn from(value: ToptierCode) -> Self {
        value.0
    }
}

impl fmt::Display for ToptierCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated fiscal year and period (month 2 through 12).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FiscalPeriod {
    /// Federal fiscal year.
    pub fiscal_year: i32,
    /// Fiscal period; period 1 is always reported together with period 2.
    pub fiscal_period: u8,
}

impl FiscalPeriod {
    /// Validate a fiscal year and period against the reporting calendar.
    ///
    /// # Errors
    ///
    /// Returns an invalid-request error when the year precedes
    /// [`FIRST_REPORTING_FISCAL_YEAR`] or follows the fiscal year of `today`,
    /// or when the period lies outside `2..=12`.
    pub fn new(fiscal_year: i32, fiscal_period: u8, today: NaiveDate) -> Result<Self, Error> {
        let current = fiscal_year_of(today);
        if !(FIRST_REPORTING_FISCAL_YEAR..=current).contains(&fiscal_year) {
            return Err(Error::invalid_request(format!(
                "Field 'fiscal_year' must be between {FIRST_REPORTING_FISCAL_YEAR} and {current}"
            )));
        }
        if !(2..=12).contains(&fiscal_period) {
            return Err(Error::invalid_request(
                "Field 'fiscal_period' must be between 2 and 12",
            ));
        }
        Ok(Self {
            fiscal_year,
            fiscal_period,
        })
    }
}

/// Latest fiscal period whose submission window has closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedPeriod {
    /// Fiscal year of the closed window.
    pub fiscal_year: i32,
    /// Quarter (1-4) for quarterly windows, month (1-12) for monthly ones.
    pub period: i32,
}

/// Latest closed quarterly and monthly submission windows.
///
/// Either side is `None` when no window of that kind has been revealed yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedSubmissionPeriods {
    /// Latest closed quarterly window.
    pub quarterly: Option<ClosedPeriod>,
    /// Latest closed monthly window.
    pub monthly: Option<ClosedPeriod>,
}

/// Direction of a sort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    #[default]
    Desc,
}

impl SortOrder {
    /// Parse an optional `order` parameter; missing means descending.
    ///
    /// # Errors
    ///
    /// Returns an invalid-request error for values other than `asc`/`desc`.
    pub fn parse(raw: Option<&str>) -> Result<Self, Error> {
        match raw {
            None | Some("desc") => Ok(Self::Desc),
            Some("asc") => Ok(Self::Asc),
            Some(other) => Err(Error::invalid_request(format!(
                "Field 'order' is outside valid values ['asc', 'desc']: '{other}'"
            ))),
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

/// Declares a sort key enum whose variants map to request field names.
macro_rules! sort_keys {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $( $variant:ident => $key:literal ),+ $(,)?
        }
        default = $default:ident;
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( #[doc = concat!("Sort by `", $key, "`.")] $variant, )+
        }

        impl $name {
            /// Every accepted field name.
            pub const KEYS: &'static [&'static str] = &[$($key),+];

            /// Parse an optional `sort` parameter, falling back to the default key.
            ///
            /// # Errors
            ///
            /// Returns an invalid-request error naming the accepted keys.
            pub fn parse(raw: Option<&str>) -> Result<Self, Error> {
                raw.map_or(Ok(Self::$default), str::parse)
            }

            /// Request field name for this key.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $key, )+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                match raw {
                    $( $key => Ok(Self::$variant), )+
                    other => Err(Error::invalid_request(format!(
                        "Field 'sort' is outside valid values {:?}: '{other}'",
                        Self::KEYS
                    ))),
                }
            }
        }
    };
}

sort_keys! {
    /// Sort keys of the all-agencies overview.
    pub enum AgenciesOverviewSort {
        AgencyName => "agency_name",
        Abbreviation => "abbreviation",
        ToptierCode => "toptier_code",
        AgencyId => "agency_id",
        CurrentTotalBudgetAuthorityAmount => "current_total_budget_authority_amount",
        RecentPublicationDate => "recent_publication_date",
        RecentPublicationDateCertified => "recent_publication_date_certified",
        MissingTasAccountsCount => "missing_tas_accounts_count",
        TasObligationNotInGtasTotal => "tas_obligation_not_in_gtas_total",
        ObligationDifference => "obligation_difference",
        UnlinkedContractAwardCount => "unlinked_contract_award_count",
        UnlinkedAssistanceAwardCount => "unlinked_assistance_award_count",
    }
    default = CurrentTotalBudgetAuthorityAmount;
}

sort_keys! {
    /// Sort keys of a single agency's per-period overview.
    pub enum AgencyOverviewSort {
        FiscalYear => "fiscal_year",
        FiscalPeriod => "fiscal_period",
        CurrentTotalBudgetAuthorityAmount => "current_total_budget_authority_amount",
        RecentPublicationDate => "recent_publication_date",
        RecentPublicationDateCertified => "recent_publication_date_certified",
        MissingTasAccountsCount => "missing_tas_accounts_count",
        TasObligationNotInGtasTotal => "tas_obligation_not_in_gtas_total",
        ObligationDifference => "obligation_difference",
        UnlinkedContractAwardCount => "unlinked_contract_award_count",
        UnlinkedAssistanceAwardCount => "unlinked_assistance_award_count",
        PercentOfTotalBudgetaryResources => "percent_of_total_budgetary_resources",
    }
    default = FiscalYear;
}

sort_keys! {
    /// Sort keys of the File A / File B differences listing.
    pub enum DifferencesSort {
        Difference => "difference",
        FileAObligation => "file_a_obligation",
        FileBObligation => "file_b_obligation",
        Tas => "tas",
    }
    default = Tas;
}

sort_keys! {
    /// Sort keys of the submission history listing.
    pub enum SubmissionHistorySort {
        PublicationDate => "publication_date",
        CertificationDate => "certification_date",
    }
    default = PublicationDate;
}

/// One agency's reporting metrics for one fiscal period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgencyPeriodRecord {
    /// Agency display name.
    pub agency_name: String,
    /// Agency abbreviation.
    pub abbreviation: Option<String>,
    /// Toptier code.
    pub toptier_code: String,
    /// Internal agency id.
    pub agency_id: Option<i32>,
    /// Fiscal year.
    pub fiscal_year: i32,
    /// Fiscal period.
    pub fiscal_period: i32,
    /// Budgetary resources reported through GTAS.
    pub total_budgetary_resources: Option<f64>,
    /// Obligations reported through GTAS.
    pub gtas_obligation_total: Option<f64>,
    /// Obligations across the agency's TAS in File A.
    pub tas_accounts_total: Option<f64>,
    /// Obligations of TAS present in GTAS but missing from File A.
    pub tas_obligation_not_in_gtas_total: Option<f64>,
    /// Number of TAS present in GTAS but missing from File A.
    pub missing_tas_accounts_count: i64,
    /// File A minus File B obligations.
    pub obligation_difference: Option<f64>,
    /// Contract awards not linked to File C.
    pub unlinked_contract_award_count: i64,
    /// Assistance awards not linked to File C.
    pub unlinked_assistance_award_count: i64,
    /// Most recent publication of the period's submission.
    pub recent_publication_date: Option<DateTime<Utc>>,
    /// Whether the most recent publication was certified.
    pub recent_publication_date_certified: bool,
    /// Government-wide budgetary resources for the same period, when known.
    pub government_budgetary_resources: Option<f64>,
}

impl AgencyPeriodRecord {
    /// Agency share of the government-wide budgetary resources, in percent
    /// rounded to two decimals.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "percentages are derived from amounts")]
    pub fn percent_of_total_budgetary_resources(&self) -> Option<f64> {
        let agency = self.total_budgetary_resources?;
        let total = self.government_budgetary_resources?;
        if total == 0.0 {
            return None;
        }
        Some((agency / total * 10_000.0).round() / 100.0)
    }

    /// Fiscal period the record describes.
    #[must_use]
    pub fn period(&self) -> FiscalPeriodLabel {
        FiscalPeriodLabel {
            fiscal_year: self.fiscal_year,
            fiscal_period: self.fiscal_period,
        }
    }
}

/// Fiscal year and period as stored, without validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiscalPeriodLabel {
    /// Fiscal year.
    pub fiscal_year: i32,
    /// Fiscal period.
    pub fiscal_period: i32,
}

/// A TAS whose File A and File B obligations disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TasDifference {
    /// Treasury Account Symbol.
    pub tas: String,
    /// Obligations reported in File A.
    pub file_a_obligation: f64,
    /// Obligations reported in File B.
    pub file_b_obligation: f64,
}

impl TasDifference {
    /// File A minus File B.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "obligations are reported as floats")]
    pub fn difference(&self) -> f64 {
        self.file_a_obligation - self.file_b_obligation
    }
}

/// One publication of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionPublication {
    /// When the submission was published.
    pub publication_date: DateTime<Utc>,
    /// When it was certified, if it was.
    pub certification_date: Option<DateTime<Utc>>,
}

/// Build the assurance statement URL for a published period.
///
/// Returns `None` when `files_base` cannot carry path segments.
#[must_use]
pub fn assurance_statement_url(
    files_base: &Url,
    period: FiscalPeriodLabel,
    toptier_code: &str,
    agency_name: &str,
    abbreviation: Option<&str>,
) -> Option<Url> {
    let FiscalPeriodLabel {
        fiscal_year,
        fiscal_period,
    } = period;
    let agency = abbreviation.map_or_else(
        || agency_name.to_owned(),
        |abbreviation| format!("{agency_name} ({abbreviation})"),
    );
    let file_name = format!(
        "{fiscal_year}-P{fiscal_period:02}-{toptier_code}_{agency}-Assurance_Statement.txt"
    );
    let mut url = files_base.clone();
    url.path_segments_mut().ok()?.pop_if_empty().extend([
        "agency_submissions",
        "Raw DATA Act Files",
        &fiscal_year.to_string(),
        &format!("P{fiscal_period:02}"),
        toptier_code,
        &file_name,
    ]);
    Some(url)
}

/// Value a reporting row is ordered by.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    /// Null column; always ordered last.
    Missing,
    /// Floating point column.
    Number(f64),
    /// Integer column.
    Integer(i64),
    /// Text column.
    Text(String),
    /// Timestamp column.
    Timestamp(DateTime<Utc>),
    /// Boolean column.
    Flag(bool),
}

impl SortValue {
    fn rank(&self) -> u8 {
        match self {
            Self::Missing => 0,
            Self::Number(_) => 1,
            Self::Integer(_) => 2,
            Self::Text(_) => 3,
            Self::Timestamp(_) => 4,
            Self::Flag(_) => 5,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.cmp(b),
            (Self::Flag(a), Self::Flag(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl From<Option<f64>> for SortValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Missing, Self::Number)
    }
}

impl From<i64> for SortValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<Option<i32>> for SortValue {
    fn from(value: Option<i32>) -> Self {
        value.map_or(Self::Missing, |number| Self::Integer(i64::from(number)))
    }
}

impl From<f64> for SortValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for SortValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<Option<DateTime<Utc>>> for SortValue {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        value.map_or(Self::Missing, Self::Timestamp)
    }
}

impl From<Option<&str>> for SortValue {
    fn from(value: Option<&str>) -> Self {
        value.map_or(Self::Missing, |text| Self::Text(text.to_owned()))
    }
}

/// Stable sort of `rows` by `key`, keeping missing values last in both
/// directions.
pub fn sort_rows<T>(rows: &mut [T], order: SortOrder, key: impl Fn(&T) -> SortValue) {
    rows.sort_by(|left, right| {
        let (left, right) = (key(left), key(right));
        match (&left, &right) {
            (SortValue::Missing, SortValue::Missing) => Ordering::Equal,
            (SortValue::Missing, _) => Ordering::Greater,
            (_, SortValue::Missing) => Ordering::Less,
            _ => order.apply(left.compare(&right)),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 11, 3).expect("valid date")
    }

    #[rstest]
    #[case("020", true)]
    #[case("1601", true)]
    #[case("20", false)]
    #[case("12345", false)]
    #[case("02a", false)]
    fn validates_toptier_codes(#[case] raw: &str, #[case] valid: bool) {
        assert_eq!(ToptierCode::new(raw).is_ok(), valid);
    }

    #[rstest]
    #[case(2017, 2, true)]
    #[case(2022, 12, true)]
    #[case(2016, 6, false)]
    #[case(2023, 6, false)]
    #[case(2020, 1, false)]
    #[case(2020, 13, false)]
    fn validates_fiscal_periods(#[case] year: i32, #[case] period: u8, #[case] valid: bool) {
        let result = FiscalPeriod::new(year, period, today());
        match result {
            Ok(value) => {
                assert!(valid);
                assert_eq!(value.fiscal_year, year);
            }
            Err(err) => {
                assert!(!valid);
                assert_eq!(err.code(), ErrorCode::InvalidRequest);
            }
        }
    }

    #[rstest]
    fn parses_sort_keys_and_orders() {
        assert_eq!(
            AgenciesOverviewSort::parse(None).expect("default"),
            AgenciesOverviewSort::CurrentTotalBudgetAuthorityAmount
        );
        assert_eq!(
            DifferencesSort::parse(Some("difference")).expect("known key"),
            DifferencesSort::Difference
        );
        assert!(SubmissionHistorySort::parse(Some("tas")).is_err());
        assert_eq!(SortOrder::parse(Some("asc")).expect("asc"), SortOrder::Asc);
        assert!(SortOrder::parse(Some("up")).is_err());
    }

    #[rstest]
    #[case(SortOrder::Asc, vec![Some(1.0), Some(2.0), None])]
    #[case(SortOrder::Desc, vec![Some(2.0), Some(1.0), None])]
    fn missing_values_sort_last(#[case] order: SortOrder, #[case] expected: Vec<Option<f64>>) {
        let mut rows = vec![None, Some(2.0), Some(1.0)];
        sort_rows(&mut rows, order, |row| SortValue::from(*row));
        assert_eq!(rows, expected);
    }

    #[rstest]
    fn builds_encoded_assurance_url() {
        let base = Url::parse("https://files.usaspending.gov/").expect("base url");
        let url = assurance_statement_url(
            &base,
            FiscalPeriodLabel {
                fiscal_year: 2020,
                fiscal_period: 6,
            },
            "020",
            "Department of the Treasury",
            Some("TREAS"),
        )
        .expect("url");
        assert_eq!(
            url.as_str(),
            "https://files.usaspending.gov/agency_submissions/Raw%20DATA%20Act%20Files/2020/P06/020/\
             2020-P06-020_Department%20of%20the%20Treasury%20(TREAS)-Assurance_Statement.txt"
        );
    }

    #[rstest]
    fn computes_budget_share() {
        let record = AgencyPeriodRecord {
            agency_name: "Agency".to_owned(),
            abbreviation: None,
            toptier_code: "123".to_owned(),
            agency_id: Some(1),
            fiscal_year: 2020,
            fiscal_period: 6,
            total_budgetary_resources: Some(250.0),
            gtas_obligation_total: None,
            tas_accounts_total: None,
            tas_obligation_not_in_gtas_total: None,
            missing_tas_accounts_count: 0,
            obligation_difference: None,
            unlinked_contract_award_count: 0,
            unlinked_assistance_award_count: 0,
            recent_publication_date: None,
            recent_publication_date_certified: false,
            government_budgetary_resources: Some(3000.0),
        };
        assert_eq!(record.percent_of_total_budgetary_resources(), Some(8.33));
    }
}
