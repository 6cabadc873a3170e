//! Transaction search filters shared by the recipient and download endpoints.
//!
//! Filters are plain data. The search adapter translates them into its own
//! query language; nothing here knows about Elasticsearch.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::{RecipientId, YearFilter};

/// Award type codes for loans; face value totals are computed over these.
pub const LOAN_AWARD_TYPES: [&str; 2] = ["07", "08"];

/// Inclusive date range over transaction action dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePeriod {
    /// First action date included.
    pub start_date: NaiveDate,
    /// Last action date included.
    pub end_date: NaiveDate,
}

impl TimePeriod {
    /// Build a period from its bounds.
    #[must_use]
    pub const fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
        }
    }
}

/// Federal fiscal year containing `date`; fiscal years start on October 1.
#[must_use]
pub fn fiscal_year_of(date: NaiveDate) -> i32 {
    if date.month() >= 10 {
        date.year() + 1
    } else {
        date.year()
    }
}

/// Whether an agency filter matches the awarding or funding agency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgencyRole {
    /// Agency that awarded the transaction.
    Awarding,
    /// Agency that funded the transaction.
    Funding,
}

/// Agency hierarchy level an agency filter applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgencyTier {
    /// Department level.
    Toptier,
    /// Bureau level.
    Subtier,
}

/// Restrict transactions to an awarding or funding agency by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgencyFilter {
    /// Awarding or funding.
    #[serde(rename = "type")]
    pub role: AgencyRole,
    /// Toptier or subtier.
    pub tier: AgencyTier,
    /// Exact agency name.
    pub name: String,
}

/// Conjunction of optional transaction filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilters {
    /// Action date windows; a transaction matches any of them.
    pub time_period: Vec<TimePeriod>,
    /// Agency restrictions; a transaction matches any of them.
    pub agencies: Vec<AgencyFilter>,
    /// Award type codes.
    pub award_type_codes: Vec<String>,
    /// Free-text keywords.
    pub keywords: Vec<String>,
    /// Disaster emergency fund codes.
    pub def_codes: Vec<String>,
    /// Single recipient, scoped by its hierarchy level.
    pub recipient_id: Option<RecipientId>,
}

impl TransactionFilters {
    /// Filters selecting one recipient's transactions within a year window.
    ///
    /// # Errors
    ///
    /// Propagates invalid fiscal years from [`YearFilter::time_period`].
    pub fn for_recipient(
        recipient_id: RecipientId,
        year: YearFilter,
        today: NaiveDate,
    ) -> Result<Self, crate::domain::Error> {
        Ok(Self {
            time_period: vec![year.time_period(today)?],
            recipient_id: Some(recipient_id),
            ..Self::default()
        })
    }

    /// True when no filter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.time_period.is_empty()
            && self.agencies.is_empty()
            && self.award_type_codes.is_empty()
            && self.keywords.is_empty()
            && self.def_codes.is_empty()
            && self.recipient_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RecipientLevel;
    use rstest::rstest;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[rstest]
    #[case(date(2020, 9, 30), 2020)]
    #[case(date(2020, 10, 1), 2021)]
    #[case(date(2021, 1, 15), 2021)]
    fn fiscal_year_rolls_over_in_october(#[case] day: NaiveDate, #[case] expected: i32) {
        assert_eq!(fiscal_year_of(day), expected);
    }

    #[rstest]
    fn recipient_filters_carry_period_and_id() {
        let id = RecipientId::new(Uuid::nil(), RecipientLevel::Parent);
        let filters =
            TransactionFilters::for_recipient(id, YearFilter::FiscalYear(2019), date(2024, 1, 1))
                .expect("valid filters");

        assert_eq!(
            filters.time_period,
            vec![TimePeriod::new(date(2018, 10, 1), date(2019, 9, 30))]
        );
        assert_eq!(filters.recipient_id, Some(id));
        assert!(!filters.is_empty());
        assert!(TransactionFilters::default().is_empty());
    }

    #[rstest]
    fn agency_filter_uses_type_key() {
        let filter: AgencyFilter = serde_json::from_value(serde_json::json!({
            "type": "awarding",
            "tier": "toptier",
            "name": "Bureau of Things",
        }))
        .expect("valid agency filter");
        assert_eq!(filter.role, AgencyRole::Awarding);
        assert_eq!(filter.tier, AgencyTier::Toptier);
    }
}
