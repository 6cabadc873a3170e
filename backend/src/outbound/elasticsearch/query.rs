//! Elasticsearch query bodies for transaction filters and recipient totals.
//!
//! Builders return `serde_json::Value` so tests can compare whole bodies
//! with `json!`.

use serde_json::{Value, json};

use crate::domain::ports::RecipientGrouping;
use crate::domain::{
    AgencyFilter, AgencyRole, AgencyTier, LOAN_AWARD_TYPES, RecipientId, RecipientLevel,
    TransactionFilters,
};

/// Name of the terms aggregation grouping recipients.
pub(super) const GROUP_AGG: &str = "group_by_recipient";
/// Name of the cardinality aggregation sizing [`GROUP_AGG`].
pub(super) const UNIQUE_TERMS_AGG: &str = "unique_terms";
/// Distinct values counted near-exactly when sizing [`GROUP_AGG`].
pub(super) const CARDINALITY_PRECISION_THRESHOLD: u32 = 11_000;

/// Keyword field recipient totals are grouped by.
pub(super) const fn group_field(grouping: RecipientGrouping) -> &'static str {
    match grouping {
        RecipientGrouping::Recipient => "recipient_hash",
        RecipientGrouping::Parent => "parent_recipient_hash",
        RecipientGrouping::Child => "recipient_agg_key",
    }
}

fn agency_field(filter: &AgencyFilter) -> String {
    let role = match filter.role {
        AgencyRole::Awarding => "awarding",
        AgencyRole::Funding => "funding",
    };
    let tier = match filter.tier {
        AgencyTier::Toptier => "toptier",
        AgencyTier::Subtier => "subtier",
    };
    format!("{role}_{tier}_agency_name.keyword")
}

fn any_of(clauses: Vec<Value>) -> Value {
    json!({ "bool": { "should": clauses, "minimum_should_match": 1 } })
}

fn recipient_clause(id: RecipientId) -> Value {
    let hash = id.hash().to_string();
    match id.level() {
        RecipientLevel::Parent => json!({ "term": { "parent_recipient_hash": hash } }),
        RecipientLevel::Child => json!({
            "bool": {
                "filter": [
                    { "term": { "recipient_hash": hash } },
                    { "exists": { "field": "parent_uei" } },
                ]
            }
        }),
        RecipientLevel::Recipient => json!({
            "bool": {
                "filter": [{ "term": { "recipient_hash": hash } }],
                "must_not": [{ "exists": { "field": "parent_uei" } }],
            }
        }),
    }
}

/// Translate filters into a `bool` query; every non-empty filter must match.
pub(super) fn filter_query(filters: &TransactionFilters) -> Value {
    let mut clauses = Vec::new();

    if !filters.time_period.is_empty() {
        clauses.push(any_of(
            filters
                .time_period
                .iter()
                .map(|period| {
                    json!({
                        "range": {
                            "action_date": {
                                "gte": period.start_date.to_string(),
                                "lte": period.end_date.to_string(),
                            }
                        }
                    })
                })
                .collect(),
        ));
    }
    if !filters.agencies.is_empty() {
        clauses.push(any_of(
            filters
                .agencies
                .iter()
                .map(|agency| json!({ "term": { agency_field(agency): agency.name } }))
                .collect(),
        ));
    }
    if !filters.award_type_codes.is_empty() {
        clauses.push(json!({ "terms": { "type": filters.award_type_codes } }));
    }
    if !filters.keywords.is_empty() {
        clauses.push(any_of(
            filters
                .keywords
                .iter()
                .map(|keyword| {
                    json!({
                        "query_string": {
                            "query": escape_query_string(keyword),
                            "default_operator": "AND",
                        }
                    })
                })
                .collect(),
        ));
    }
    if !filters.def_codes.is_empty() {
        clauses.push(json!({ "terms": { "disaster_emergency_fund_codes": filters.def_codes } }));
    }
    if let Some(id) = filters.recipient_id {
        clauses.push(recipient_clause(id));
    }

    json!({ "bool": { "filter": clauses } })
}

/// Escape Lucene query string operators so keywords match literally.
fn escape_query_string(raw: &str) -> String {
    const RESERVED: &[char] = &[
        '+', '-', '=', '&', '|', '>', '<', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*',
        '?', ':', '\\', '/',
    ];
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if RESERVED.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `_count` request body.
pub(super) fn count_body(filters: &TransactionFilters) -> Value {
    json!({ "query": filter_query(filters) })
}

/// Cardinality of `<field>.hash`, used to size the terms aggregation.
pub(super) fn cardinality_body(filters: &TransactionFilters, grouping: RecipientGrouping) -> Value {
    json!({
        "size": 0,
        "query": filter_query(filters),
        "aggs": {
            UNIQUE_TERMS_AGG: {
                "cardinality": {
                    "field": format!("{}.hash", group_field(grouping)),
                    "precision_threshold": CARDINALITY_PRECISION_THRESHOLD
                }
            }
        }
    })
}

fn scaled_sum(field: &str) -> Value {
    json!({ "sum": { "field": field, "script": { "source": "_value * 100" } } })
}

/// Per-recipient obligation and loan totals.
pub(super) fn totals_body(
    filters: &TransactionFilters,
    grouping: RecipientGrouping,
    bucket_count: u64,
) -> Value {
    json!({
        "size": 0,
        "query": filter_query(filters),
        "aggs": {
            GROUP_AGG: {
                "terms": { "field": group_field(grouping), "size": bucket_count },
                "aggs": {
                    "sum_obligation": scaled_sum("generated_pragmatic_obligation"),
                    "filter_loans": {
                        "filter": { "terms": { "type": LOAN_AWARD_TYPES } },
                        "aggs": {
                            "sum_face_value_loan": scaled_sum("face_value_loan_guarantee"),
                        }
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TimePeriod;
    use chrono::NaiveDate;
    use rstest::rstest;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[rstest]
    fn empty_filters_match_everything() {
        assert_eq!(
            filter_query(&TransactionFilters::default()),
            json!({ "bool": { "filter": [] } })
        );
    }

    #[rstest]
    fn combines_agency_period_and_codes() {
        let filters = TransactionFilters {
            time_period: vec![TimePeriod::new(date(2019, 10, 1), date(2020, 9, 30))],
            agencies: vec![AgencyFilter {
                role: AgencyRole::Funding,
                tier: AgencyTier::Subtier,
                name: "Bureau of Things".to_owned(),
            }],
            award_type_codes: vec!["A".to_owned(), "B".to_owned()],
            def_codes: vec!["L".to_owned()],
            ..TransactionFilters::default()
        };

        assert_eq!(
            filter_query(&filters),
            json!({
                "bool": {
                    "filter": [
                        {
                            "bool": {
                                "should": [{
                                    "range": {
                                        "action_date": { "gte": "2019-10-01", "lte": "2020-09-30" }
                                    }
                                }],
                                "minimum_should_match": 1
                            }
                        },
                        {
                            "bool": {
                                "should": [{
                                    "term": { "funding_subtier_agency_name.keyword": "Bureau of Things" }
                                }],
                                "minimum_should_match": 1
                            }
                        },
                        { "terms": { "type": ["A", "B"] } },
                        { "terms": { "disaster_emergency_fund_codes": ["L"] } }
                    ]
                }
            })
        );
    }

    #[rstest]
    #[case(RecipientLevel::Parent, json!({ "term": { "parent_recipient_hash": Uuid::nil().to_string() } }))]
    #[case(RecipientLevel::Recipient, json!({
        "bool": {
            "filter": [{ "term": { "recipient_hash": Uuid::nil().to_string() } }],
            "must_not": [{ "exists": { "field": "parent_uei" } }]
        }
    }))]
    fn scopes_recipient_by_level(#[case] level: RecipientLevel, #[case] expected: Value) {
        let filters = TransactionFilters {
            recipient_id: Some(RecipientId::new(Uuid::nil(), level)),
            ..TransactionFilters::default()
        };
        assert_eq!(
            filter_query(&filters),
            json!({ "bool": { "filter": [expected] } })
        );
    }

    #[rstest]
    fn escapes_keyword_operators() {
        assert_eq!(escape_query_string("a+b (c)"), r"a\+b \(c\)");
    }

    #[rstest]
    fn totals_group_children_by_aggregation_key() {
        let body = totals_body(&TransactionFilters::default(), RecipientGrouping::Child, 7);
        assert_eq!(
            body["aggs"][GROUP_AGG]["terms"],
            json!({ "field": "recipient_agg_key", "size": 7 })
        );
        assert_eq!(
            body["aggs"][GROUP_AGG]["aggs"]["filter_loans"]["filter"],
            json!({ "terms": { "type": ["07", "08"] } })
        );
        assert_eq!(
            body["aggs"][GROUP_AGG]["aggs"]["sum_obligation"],
            json!({
                "sum": {
                    "field": "generated_pragmatic_obligation",
                    "script": { "source": "_value * 100" }
                }
            })
        );
    }

    #[rstest]
    fn cardinality_uses_hash_subfield() {
        let body = cardinality_body(&TransactionFilters::default(), RecipientGrouping::Parent);
        assert_eq!(
            body["aggs"][UNIQUE_TERMS_AGG],
            json!({
                "cardinality": {
                    "field": "parent_recipient_hash.hash",
                    "precision_threshold": 11_000
                }
            })
        );
        assert_eq!(body["size"], json!(0));
    }

    #[rstest]
    #[case(RecipientGrouping::Recipient, "recipient_hash.hash")]
    #[case(RecipientGrouping::Child, "recipient_agg_key.hash")]
    fn cardinality_counts_exactly_past_the_default_threshold(
        #[case] grouping: RecipientGrouping,
        #[case] field: &str,
    ) {
        let body = cardinality_body(&TransactionFilters::default(), grouping);
        let cardinality = &body["aggs"][UNIQUE_TERMS_AGG]["cardinality"];
        assert_eq!(cardinality["field"], json!(field));
        assert_eq!(cardinality["precision_threshold"], json!(11_000));
    }
}
