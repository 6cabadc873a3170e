//! Recipient identifiers and year filters.
//!
//! A recipient is addressed as `<hash>-<level>` where the hash is the UUID
//! derived from the recipient's DUNS/UEI and name, and the level says whether
//! the profile describes a parent, a child or a standalone recipient.

use std::fmt;
use std::str::FromStr;

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Error, TimePeriod};

/// Earliest action date served by search endpoints (start of FY2008).
pub const API_SEARCH_MIN_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2007, 10, 1) {
    Some(date) => date,
    None => NaiveDate::MIN,
};

/// Recipient names that aggregate many entities and carry no categories.
pub const SPECIAL_CASES: [&str; 6] = [
    "MULTIPLE RECIPIENTS",
    "REDACTED DUE TO PII",
    "MULTIPLE FOREIGN RECIPIENTS",
    "PRIVATE INDIVIDUAL",
    "INDIVIDUAL RECIPIENT",
    "MISCELLANEOUS FOREIGN AWARDEES",
];

/// Returns true when `name` is one of the aggregate placeholder recipients.
#[must_use]
pub fn is_special_case(name: &str) -> bool {
    SPECIAL_CASES.contains(&name)
}

/// Position of a recipient profile in the parent/child hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecipientLevel {
    /// Parent organisation (`P`).
    #[serde(rename = "P")]
    Parent,
    /// Child of a parent organisation (`C`).
    #[serde(rename = "C")]
    Child,
    /// Recipient without a parent (`R`).
    #[serde(rename = "R")]
    Recipient,
}

impl RecipientLevel {
    /// Single-letter code stored in `recipient_profile.recipient_level`.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Parent => "P",
            Self::Child => "C",
            Self::Recipient => "R",
        }
    }

    /// Parse the single-letter code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "P" => Some(Self::Parent),
            "C" => Some(Self::Child),
            "R" => Some(Self::Recipient),
            _ => None,
        }
    }
}

impl fmt::Display for RecipientLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Validated `<hash>-<level>` recipient identifier.
///
/// # Examples
/// ```
/// use spending_api::domain::{RecipientId, RecipientLevel};
///
/// let id: RecipientId = "00077a9a-5a70-8919-fd19-330762af6b84-C".parse().unwrap();
/// assert_eq!(id.level(), RecipientLevel::Child);
/// assert_eq!(id.to_string(), "00077a9a-5a70-8919-fd19-330762af6b84-C");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecipientId {
    hash: Uuid,
    level: RecipientLevel,
}

impl RecipientId {
    /// Build an identifier from its parts.
    #[must_use]
    pub const fn new(hash: Uuid, level: RecipientLevel) -> Self {
        Self { hash, level }
    }

    /// Recipient hash.
    #[must_use]
    pub const fn hash(&self) -> Uuid {
        self.hash
    }

    /// Hierarchy level.
    #[must_use]
    pub const fn level(&self) -> RecipientLevel {
        self.level
    }
}

impl FromStr for RecipientId {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let Some((hash_part, level_code)) = raw.rsplit_once('-') else {
            return Err(Error::invalid_request(format!(
                "ID ('{raw}') doesn't include Recipient-Level"
            )));
        };
        let level = RecipientLevel::from_code(level_code).ok_or_else(|| {
            Error::invalid_request(format!("Invalid Recipient-Level: '{level_code}'"))
        })?;
        let hash = Uuid::parse_str(hash_part).map_err(|_| {
            Error::invalid_request(format!("Recipient Hash not valid UUID: '{hash_part}'."))
        })?;
        Ok(Self { hash, level })
    }
}

impl fmt::Display for RecipientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.hash, self.level)
    }
}

/// Time window requested through the `year` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearFilter {
    /// The trailing twelve months.
    Latest,
    /// Everything since [`API_SEARCH_MIN_DATE`].
    All,
    /// One federal fiscal year (October through September).
    FiscalYear(i32),
}

impl YearFilter {
    /// Parse the `year` query parameter; a missing or blank value means latest.
    ///
    /// # Errors
    ///
    /// Returns an invalid-request error for values other than `latest`,
    /// `all` or a number.
    pub fn parse(raw: Option<&str>) -> Result<Self, Error> {
        match raw.unwrap_or_default() {
            "" | "latest" => Ok(Self::Latest),
            "all" => Ok(Self::All),
            digits if digits.chars().all(|c| c.is_ascii_digit()) => digits
                .parse()
                .map(Self::FiscalYear)
                .map_err(|_| Error::invalid_request(format!("Invalid year: {digits}."))),
            other => Err(Error::invalid_request(format!("Invalid year: {other}."))),
        }
    }

    /// Resolve the filter to concrete dates relative to `today`.
    ///
    /// # Errors
    ///
    /// Returns an invalid-request error when a fiscal year falls outside the
    /// supported calendar.
    pub fn time_period(self, today: NaiveDate) -> Result<TimePeriod, Error> {
        match self {
            Self::All => Ok(TimePeriod::new(API_SEARCH_MIN_DATE, today)),
            Self::Latest => {
                let start = today.checked_sub_months(Months::new(12)).unwrap_or(today);
                Ok(TimePeriod::new(start, today))
            }
            Self::FiscalYear(year) => {
                let start = NaiveDate::from_ymd_opt(year - 1, 10, 1);
                let end = NaiveDate::from_ymd_opt(year, 9, 30);
                match (start, end) {
                    (Some(start), Some(end)) => Ok(TimePeriod::new(start, end)),
                    _ => Err(Error::invalid_request(format!("Invalid year: {year}."))),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Identifier parsing and year window coverage.

    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    const HASH: &str = "00077a9a-5a70-8919-fd19-330762af6b84";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[rstest]
    #[case("P", RecipientLevel::Parent)]
    #[case("C", RecipientLevel::Child)]
    #[case("R", RecipientLevel::Recipient)]
    fn parses_each_level(#[case] code: &str, #[case] level: RecipientLevel) {
        let id: RecipientId = format!("{HASH}-{code}").parse().expect("valid id");
        assert_eq!(id.level(), level);
        assert_eq!(id.hash().to_string(), HASH);
    }

    #[rstest]
    #[case("nohyphen", "ID ('nohyphen') doesn't include Recipient-Level")]
    #[case(
        "00077a9a-5a70-8919-fd19-330762af6b84-X",
        "Invalid Recipient-Level: 'X'"
    )]
    #[case("not-a-uuid-P", "Recipient Hash not valid UUID: 'not-a-uuid'.")]
    fn rejects_malformed_ids(#[case] raw: &str, #[case] message: &str) {
        let err = raw.parse::<RecipientId>().expect_err("invalid id");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.message(), message);
    }

    #[rstest]
    #[case(None, YearFilter::Latest)]
    #[case(Some(""), YearFilter::Latest)]
    #[case(Some("latest"), YearFilter::Latest)]
    #[case(Some("all"), YearFilter::All)]
    #[case(Some("2020"), YearFilter::FiscalYear(2020))]
    fn parses_year_values(#[case] raw: Option<&str>, #[case] expected: YearFilter) {
        assert_eq!(YearFilter::parse(raw).expect("valid year"), expected);
    }

    #[rstest]
    #[case("20x0")]
    #[case("-2020")]
    #[case("99999999999")]
    fn rejects_invalid_years(#[case] raw: &str) {
        let err = YearFilter::parse(Some(raw)).expect_err("invalid year");
        assert_eq!(err.message(), format!("Invalid year: {raw}."));
    }

    #[rstest]
    #[case(YearFilter::FiscalYear(2020), date(2019, 10, 1), date(2020, 9, 30))]
    #[case(YearFilter::All, date(2007, 10, 1), date(2024, 2, 29))]
    #[case(YearFilter::Latest, date(2023, 2, 28), date(2024, 2, 29))]
    fn resolves_time_periods(
        #[case] filter: YearFilter,
        #[case] start: NaiveDate,
        #[case] end: NaiveDate,
    ) {
        let period = filter.time_period(date(2024, 2, 29)).expect("valid period");
        assert_eq!(period, TimePeriod::new(start, end));
    }

    #[rstest]
    fn special_cases_are_exact_matches() {
        assert!(is_special_case("REDACTED DUE TO PII"));
        assert!(!is_special_case("Redacted due to PII"));
    }
}
