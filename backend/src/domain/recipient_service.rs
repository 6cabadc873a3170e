//! Recipient overview and child listing service.
//!
//! Combines profile and lookup rows from the database with obligation totals
//! from the search index. All validation errors are invalid-request errors
//! carrying the offending identifier.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use mockable::Clock;
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{
    ChildBucketKey, ChildRecipient, ChildRecipientsRequest, RecipientGrouping, RecipientLookup,
    RecipientOverview, RecipientOverviewRequest, RecipientParent, RecipientQuery,
    RecipientRepository, RecipientTotals, TransactionSearch,
};
use crate::domain::{
    API_SEARCH_MIN_DATE, Error, RecipientId, RecipientLevel, RecipientLocation,
    TransactionFilters, YearFilter, categories_for_flags, flags_from_sam, is_special_case,
};

/// Recipient service implementing the driving port.
#[derive(Clone)]
pub struct RecipientService<R, S> {
    recipients: Arc<R>,
    search: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<R, S> RecipientService<R, S> {
    /// Create a new service over the recipient repository and search index.
    pub fn new(recipients: Arc<R>, search: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            recipients,
            search,
            clock,
        }
    }
}

impl<R, S> RecipientService<R, S>
where
    R: RecipientRepository,
    S: TransactionSearch,
{
    fn today(&self) -> NaiveDate {
        self.clock.utc().date_naive()
    }

    async fn totals(
        &self,
        id: RecipientId,
        year: YearFilter,
        grouping: RecipientGrouping,
    ) -> Result<Vec<RecipientTotals>, Error> {
        let filters = TransactionFilters::for_recipient(id, year, self.today())?;
        Ok(self.search.recipient_totals(&filters, grouping).await?)
    }

    async fn parents(
        &self,
        id: RecipientId,
        raw_id: &str,
        lookup: &RecipientLookup,
        uei: Option<&String>,
    ) -> Result<Vec<RecipientParent>, Error> {
        match id.level() {
            RecipientLevel::Recipient => Ok(Vec::new()),
            RecipientLevel::Parent => Ok(vec![RecipientParent {
                parent_id: Some(raw_id.to_owned()),
                parent_duns: lookup.duns.clone(),
                parent_name: lookup.legal_business_name.clone(),
                parent_uei: uei.cloned(),
            }]),
            RecipientLevel::Child => self.affiliated_parents(id).await,
        }
    }

    async fn affiliated_parents(&self, id: RecipientId) -> Result<Vec<RecipientParent>, Error> {
        let affiliations = self.recipients.affiliations(&id).await?.unwrap_or_default();
        let mut resolved = Vec::with_capacity(affiliations.len());
        for duns in affiliations {
            let parent = self.recipients.find_lookup_by_duns(&duns).await?;
            resolved.push((duns, parent));
        }

        let parent_hashes: Vec<Uuid> = resolved
            .iter()
            .filter_map(|(_, parent)| parent.as_ref().map(|p| p.recipient_hash))
            .collect();
        let ueis = if parent_hashes.is_empty() {
            Default::default()
        } else {
            self.recipients.profile_ueis(&parent_hashes).await?
        };

        Ok(resolved
            .into_iter()
            .map(|(duns, lookup)| {
                let Some(parent) = lookup else {
                    return RecipientParent {
                        parent_duns: Some(duns),
                        ..RecipientParent::default()
                    };
                };
                RecipientParent {
                    parent_id: Some(
                        RecipientId::new(parent.recipient_hash, RecipientLevel::Parent)
                            .to_string(),
                    ),
                    parent_duns: Some(duns),
                    parent_name: parent.legal_business_name,
                    // The parent's own profile UEI, not the child's.
                    parent_uei: ueis.get(&parent.recipient_hash).cloned(),
                }
            })
            .collect())
    }

    async fn location(&self, raw: RecipientLocation) -> Result<RecipientLocation, Error> {
        let mut location = raw.normalised();
        if let Some(code) = location.country_code_missing_name().map(str::to_owned) {
            location.country_name = self.recipients.country_name(&code).await?;
        }
        Ok(location)
    }

    async fn business_types(&self, lookup: &RecipientLookup) -> Result<Vec<String>, Error> {
        let name = lookup.legal_business_name.as_deref();
        if name.is_some_and(is_special_case) {
            return Ok(Vec::new());
        }

        let mut categories = BTreeSet::new();
        if let (Some(name), Some(duns)) = (name, lookup.duns.as_deref()) {
            if let Some(sam) = self.recipients.latest_sam_business_types(name, duns).await? {
                let flags = flags_from_sam(
                    sam.business_types_codes.iter().map(String::as_str),
                    sam.entity_structure.as_deref(),
                );
                categories.extend(categories_for_flags(&flags));
            }
        }
        categories.extend(
            self.recipients
                .latest_transaction_categories(lookup.recipient_hash, API_SEARCH_MIN_DATE)
                .await?,
        );
        Ok(categories.into_iter().collect())
    }

    fn child_row(key: &ChildBucketKey, amount: f64) -> Option<(Uuid, ChildRecipient)> {
        let hash_with_level = key.hash_with_level.as_deref()?;
        let hash = hash_with_level
            .rsplit_once('-')
            .and_then(|(hash, _)| Uuid::parse_str(hash).ok())?;
        Some((
            hash,
            ChildRecipient {
                recipient_id: RecipientId::new(hash, RecipientLevel::Child).to_string(),
                name: key.name.clone(),
                duns: key.unique_id.clone(),
                uei: None,
                amount,
                state_province: None,
            },
        ))
    }

    async fn children_without_totals(
        &self,
        duns: &str,
        parent_id: RecipientId,
        rows: &[(Uuid, ChildRecipient)],
    ) -> Result<Vec<(Uuid, ChildRecipient)>, Error> {
        let affiliations = self
            .recipients
            .affiliations(&parent_id)
            .await?
            .ok_or_else(|| {
                Error::invalid_request(format!("DUNS is not listed as a parent: '{duns}'."))
            })?;
        let found: HashSet<&str> = rows
            .iter()
            .filter_map(|(_, row)| row.duns.as_deref())
            .collect();
        let missing: Vec<String> = affiliations
            .into_iter()
            .filter(|child| !found.contains(child.as_str()))
            .collect();
        if missing.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self
            .recipients
            .child_profiles(&missing)
            .await?
            .into_iter()
            .map(|profile| {
                let row = ChildRecipient {
                    recipient_id: RecipientId::new(profile.recipient_hash, RecipientLevel::Child)
                        .to_string(),
                    name: profile.recipient_name,
                    duns: profile.duns,
                    uei: profile.uei,
                    amount: 0.0,
                    state_province: None,
                };
                (profile.recipient_hash, row)
            })
            .collect())
    }
}

#[async_trait]
impl<R, S> RecipientQuery for RecipientService<R, S>
where
    R: RecipientRepository,
    S: TransactionSearch,
{
    async fn overview(
        &self,
        request: RecipientOverviewRequest,
    ) -> Result<RecipientOverview, Error> {
        let year = YearFilter::parse(request.year.as_deref())?;
        let id: RecipientId = request.recipient_id.parse()?;
        if !self.recipients.profile_exists(&id).await? {
            return Err(Error::invalid_request(format!(
                "Recipient ID not found: '{}'.",
                request.recipient_id
            )));
        }
        let lookup = self
            .recipients
            .find_lookup(id.hash())
            .await?
            .filter(|lookup| lookup.legal_business_name.is_some() || lookup.duns.is_some())
            .ok_or_else(|| {
                Error::invalid_request(format!("Recipient Hash not found: '{}'.", id.hash()))
            })?;

        let uei = self.recipients.profile_ueis(&[id.hash()]).await?.remove(&id.hash());
        let parents = self
            .parents(id, &request.recipient_id, &lookup, uei.as_ref())
            .await?;
        let location = self.location(lookup.location.clone()).await?;
        let business_types = self.business_types(&lookup).await?;
        let grouping = match id.level() {
            RecipientLevel::Parent => RecipientGrouping::Parent,
            RecipientLevel::Child | RecipientLevel::Recipient => RecipientGrouping::Recipient,
        };
        let totals = self
            .totals(id, year, grouping)
            .await?
            .into_iter()
            .next()
            .unwrap_or_default();

        let mut alternate_names = lookup.alternate_names;
        alternate_names.sort();
        let first_parent = parents.first().cloned().unwrap_or_default();

        Ok(RecipientOverview {
            name: lookup.legal_business_name,
            alternate_names,
            duns: lookup.duns,
            uei,
            recipient_id: request.recipient_id,
            recipient_level: id.level(),
            parent_id: first_parent.parent_id,
            parent_name: first_parent.parent_name,
            parent_duns: first_parent.parent_duns,
            parent_uei: first_parent.parent_uei,
            parents,
            business_types,
            location,
            total_transaction_amount: totals.total_obligation_amount.to_dollars(),
            total_transactions: totals.total_obligation_count,
            total_face_value_loan_amount: totals.total_face_value_loan_amount.to_dollars(),
            total_face_value_loan_transactions: totals.total_face_value_loan_count,
        })
    }

    async fn children(
        &self,
        request: ChildRecipientsRequest,
    ) -> Result<Vec<ChildRecipient>, Error> {
        let year = YearFilter::parse(request.year.as_deref())?;
        let parent = self
            .recipients
            .find_lookup_by_duns(&request.duns)
            .await?
            .ok_or_else(|| {
                Error::invalid_request(format!("DUNS not found: '{}'.", request.duns))
            })?;
        let parent_id = RecipientId::new(parent.recipient_hash, RecipientLevel::Parent);

        let mut rows = Vec::new();
        for totals in self.totals(parent_id, year, RecipientGrouping::Child).await? {
            let key = totals.child.unwrap_or_default();
            match Self::child_row(&key, totals.total_obligation_amount.to_dollars()) {
                Some(row) => rows.push(row),
                None => warn!(
                    parent = %parent_id,
                    key = ?key.hash_with_level,
                    "child bucket without a recipient hash skipped"
                ),
            }
        }

        let with_totals: Vec<Uuid> = rows.iter().map(|(hash, _)| *hash).collect();
        if !with_totals.is_empty() {
            let ueis = self.recipients.profile_ueis(&with_totals).await?;
            for (hash, row) in &mut rows {
                row.uei = ueis.get(hash).cloned();
            }
        }

        if year != YearFilter::All {
            let extra = self
                .children_without_totals(&request.duns, parent_id, &rows)
                .await?;
            rows.extend(extra);
        }

        let listed: Vec<Uuid> = rows.iter().map(|(hash, _)| *hash).collect();
        let states = if listed.is_empty() {
            Default::default()
        } else {
            self.recipients.lookup_states(&listed).await?
        };
        Ok(rows
            .into_iter()
            .map(|(hash, mut row)| {
                row.state_province = states.get(&hash).cloned();
                if row.state_province.is_none() {
                    warn!(recipient_hash = %hash, "recipient hash not in state map");
                }
                row
            })
            .collect())
    }
}

#[cfg(test)]
#[path = "recipient_service_tests.rs"]
mod tests;
