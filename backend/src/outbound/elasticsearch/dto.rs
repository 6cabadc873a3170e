//! DTOs for decoding Elasticsearch responses.
//!
//! The adapter decodes into these transport DTOs first, then maps buckets into
//! domain totals in one pass.

use serde::Deserialize;

use crate::domain::Cents;
use crate::domain::ports::{ChildBucketKey, RecipientTotals};

#[derive(Debug, Deserialize)]
pub(super) struct CountResponseDto {
    pub(super) count: u64,
}

#[derive(Debug, Deserialize)]
pub(super) struct CardinalityResponseDto {
    pub(super) aggregations: CardinalityAggregationsDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct CardinalityAggregationsDto {
    pub(super) unique_terms: ValueDto<u64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ValueDto<T> {
    pub(super) value: Option<T>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TotalsResponseDto {
    pub(super) aggregations: TotalsAggregationsDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct TotalsAggregationsDto {
    pub(super) group_by_recipient: BucketsDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct BucketsDto {
    #[serde(default)]
    pub(super) buckets: Vec<RecipientBucketDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RecipientBucketDto {
    pub(super) key: serde_json::Value,
    pub(super) doc_count: u64,
    pub(super) sum_obligation: ValueDto<f64>,
    pub(super) filter_loans: LoanFilterDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct LoanFilterDto {
    pub(super) doc_count: u64,
    pub(super) sum_face_value_loan: ValueDto<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct ChildKeyDto {
    hash_with_level: Option<String>,
    unique_id: Option<String>,
    name: Option<String>,
}

impl From<ChildKeyDto> for ChildBucketKey {
    fn from(dto: ChildKeyDto) -> Self {
        Self {
            hash_with_level: dto.hash_with_level.filter(|value| !value.is_empty()),
            unique_id: dto.unique_id.filter(|value| !value.is_empty()),
            name: dto.name,
        }
    }
}

fn scaled(value: &ValueDto<f64>) -> Cents {
    value.value.map_or(Cents::ZERO, Cents::from_scaled_sum)
}

impl RecipientBucketDto {
    /// Convert into domain totals; `with_child_key` decodes the bucket key as
    /// a child identity.
    pub(super) fn into_totals(self, with_child_key: bool) -> Result<RecipientTotals, String> {
        let child = if with_child_key {
            Some(decode_child_key(&self.key)?)
        } else {
            None
        };
        Ok(RecipientTotals {
            child,
            total_obligation_amount: scaled(&self.sum_obligation),
            total_obligation_count: self.doc_count,
            total_face_value_loan_amount: scaled(&self.filter_loans.sum_face_value_loan),
            total_face_value_loan_count: self.filter_loans.doc_count,
        })
    }
}

fn decode_child_key(key: &serde_json::Value) -> Result<ChildBucketKey, String> {
    let raw = key
        .as_str()
        .ok_or_else(|| format!("child bucket key is not a string: {key}"))?;
    serde_json::from_str::<ChildKeyDto>(raw)
        .map(ChildBucketKey::from)
        .map_err(|err| format!("invalid child bucket key {raw:?}: {err}"))
}
