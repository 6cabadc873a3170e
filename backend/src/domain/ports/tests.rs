//! Behaviour of the fixture adapters wired when backing services are absent.

use super::*;
use crate::domain::{RecipientId, RecipientLevel, ToptierCode, TransactionFilters};
use chrono::{NaiveDate, TimeZone, Utc};
use rstest::rstest;
use uuid::Uuid;

#[rstest]
#[tokio::test]
async fn fixture_reference_data_lists_codes_and_windows() {
    let repo = FixtureReferenceDataRepository;
    let codes = repo.def_codes().await.expect("codes");
    assert!(codes.iter().any(|code| code == "L"));

    let now = Utc.with_ymd_and_hms(2021, 5, 1, 0, 0, 0).single().expect("timestamp");
    let periods = repo.closed_submission_periods(now).await.expect("periods");
    assert!(periods.quarterly.is_some());
    assert!(periods.monthly.is_some());
}

#[rstest]
#[case(true, 7)]
#[case(false, 0)]
#[tokio::test]
async fn fixture_federal_accounts_need_a_closed_window(
    #[case] with_window: bool,
    #[case] expected: u64,
) {
    let repo = FixtureFederalAccountRepository { count: 7 };
    let mut filter = DisasterSpendingFilter {
        def_codes: vec!["L".to_owned()],
        reporting_period_min: NaiveDate::from_ymd_opt(2020, 4, 1).expect("date"),
        closed_periods: FixtureReferenceDataRepository
            .closed_submission_periods(Utc::now())
            .await
            .expect("periods"),
    };
    if !with_window {
        filter.closed_periods = crate::domain::ClosedSubmissionPeriods::default();
    }
    let count = repo
        .count_with_disaster_spending(&filter)
        .await
        .expect("count");
    assert_eq!(count, expected);
}

#[rstest]
#[tokio::test]
async fn fixture_recipients_and_reporting_are_empty() {
    let recipients = FixtureRecipientRepository;
    let id = RecipientId::new(Uuid::nil(), RecipientLevel::Parent);
    assert!(!recipients.profile_exists(&id).await.expect("exists"));
    assert!(recipients.affiliations(&id).await.expect("affiliations").is_none());

    let reporting = FixtureReportingRepository;
    let code = ToptierCode::new("020").expect("code");
    assert!(reporting.find_agency(&code).await.expect("agency").is_none());

    let search = FixtureTransactionSearch;
    let filters = TransactionFilters::default();
    assert_eq!(search.count_transactions(&filters).await.expect("count"), 0);
}
