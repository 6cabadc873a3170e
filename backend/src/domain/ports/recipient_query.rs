//! Driving port for recipient overviews and child listings.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{Error, RecipientLevel, RecipientLocation};

/// Overview of one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientOverviewRequest {
    /// Raw `<hash>-<level>` path segment.
    pub recipient_id: String,
    /// Raw `year` query parameter.
    pub year: Option<String>,
}

/// Children of one parent DUNS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildRecipientsRequest {
    /// Parent DUNS path segment.
    pub duns: String,
    /// Raw `year` query parameter.
    pub year: Option<String>,
}

/// A parent organisation of a recipient.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecipientParent {
    /// `<hash>-P`, or null when the DUNS has no lookup row.
    pub parent_id: Option<String>,
    /// Parent DUNS.
    pub parent_duns: Option<String>,
    /// Parent name.
    pub parent_name: Option<String>,
    /// Parent UEI.
    pub parent_uei: Option<String>,
}

/// Recipient overview payload.
#[expect(missing_docs, reason = "field names are the JSON keys")]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipientOverview {
    pub name: Option<String>,
    pub alternate_names: Vec<String>,
    pub duns: Option<String>,
    pub uei: Option<String>,
    pub recipient_id: String,
    pub recipient_level: RecipientLevel,
    pub parent_id: Option<String>,
    pub parent_name: Option<String>,
    pub parent_duns: Option<String>,
    pub parent_uei: Option<String>,
    pub parents: Vec<RecipientParent>,
    pub business_types: Vec<String>,
    pub location: RecipientLocation,
    pub total_transaction_amount: f64,
    pub total_transactions: u64,
    pub total_face_value_loan_amount: f64,
    pub total_face_value_loan_transactions: u64,
}

/// One child of a parent recipient.
#[expect(missing_docs, reason = "field names are the JSON keys")]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChildRecipient {
    /// `<hash>-C`.
    pub recipient_id: String,
    pub name: Option<String>,
    pub duns: Option<String>,
    pub uei: Option<String>,
    /// Obligations in the requested window, in dollars.
    pub amount: f64,
    /// State from the lookup table; omitted when the child has no lookup row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_province: Option<Option<String>>,
}

/// Domain use-case port for recipient endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipientQuery: Send + Sync {
    /// Build the overview of a recipient.
    async fn overview(&self, request: RecipientOverviewRequest)
    -> Result<RecipientOverview, Error>;

    /// List the children of a parent DUNS with their obligations.
    async fn children(&self, request: ChildRecipientsRequest)
    -> Result<Vec<ChildRecipient>, Error>;
}
