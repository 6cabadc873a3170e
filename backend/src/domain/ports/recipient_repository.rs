//! Port for recipient profiles, lookups and their supporting tables.
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{RecipientId, RecipientLocation};

use super::define_port_error;

define_port_error! {
    /// Errors raised by recipient repositories.
    pub enum RecipientRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "recipient repository connection failed: {message}"; service_unavailable,
        /// Query failed during execution.
        Query { message: String } => "recipient repository query failed: {message}"; internal,
    }
}

/// One `recipient_lookup` row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientLookup {
    /// Recipient hash.
    pub recipient_hash: Uuid,
    /// Legal business name.
    pub legal_business_name: Option<String>,
    /// DUNS number.
    pub duns: Option<String>,
    /// Other names the recipient has reported.
    pub alternate_names: Vec<String>,
    /// Address columns, before cleanup.
    pub location: RecipientLocation,
}

/// A child profile listed under a parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildProfile {
    /// Child recipient hash.
    pub recipient_hash: Uuid,
    /// Child recipient name.
    pub recipient_name: Option<String>,
    /// Child DUNS.
    pub duns: Option<String>,
    /// Child UEI.
    pub uei: Option<String>,
}

/// Business type codes from the newest SAM registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SamBusinessTypes {
    /// SAM business type codes.
    pub business_types_codes: Vec<String>,
    /// SAM entity structure code.
    pub entity_structure: Option<String>,
}

/// Read access to recipient data.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipientRepository: Send + Sync {
    /// Whether a profile exists for the hash at the identifier's level.
    async fn profile_exists(&self, id: &RecipientId) -> Result<bool, RecipientRepositoryError>;

    /// Lookup row for a recipient hash.
    async fn find_lookup(
        &self,
        recipient_hash: Uuid,
    ) -> Result<Option<RecipientLookup>, RecipientRepositoryError>;

    /// First lookup row carrying `duns`.
    async fn find_lookup_by_duns(
        &self,
        duns: &str,
    ) -> Result<Option<RecipientLookup>, RecipientRepositoryError>;

    /// UEI recorded on a profile of each hash; hashes without one are absent.
    async fn profile_ueis(
        &self,
        recipient_hashes: &[Uuid],
    ) -> Result<HashMap<Uuid, String>, RecipientRepositoryError>;

    /// Affiliated DUNS of the profile; `None` when no such profile exists.
    async fn affiliations(
        &self,
        id: &RecipientId,
    ) -> Result<Option<Vec<String>>, RecipientRepositoryError>;

    /// Child-level profiles with any of the given DUNS.
    async fn child_profiles(
        &self,
        duns: &[String],
    ) -> Result<Vec<ChildProfile>, RecipientRepositoryError>;

    /// `recipient_lookup.state` of each hash that has a lookup row.
    async fn lookup_states(
        &self,
        recipient_hashes: &[Uuid],
    ) -> Result<HashMap<Uuid, Option<String>>, RecipientRepositoryError>;

    /// Name of a country code from `ref_country_code`.
    async fn country_name(&self, code: &str) -> Result<Option<String>, RecipientRepositoryError>;

    /// Newest SAM registration for the name and DUNS.
    async fn latest_sam_business_types(
        &self,
        legal_business_name: &str,
        duns: &str,
    ) -> Result<Option<SamBusinessTypes>, RecipientRepositoryError>;

    /// Business categories of the recipient's latest transaction on or after
    /// `since`.
    async fn latest_transaction_categories(
        &self,
        recipient_hash: Uuid,
        since: NaiveDate,
    ) -> Result<Vec<String>, RecipientRepositoryError>;
}

/// Repository with no recipients; used when no database is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRecipientRepository;

#[async_trait]
impl RecipientRepository for FixtureRecipientRepository {
    async fn profile_exists(&self, _id: &RecipientId) -> Result<bool, RecipientRepositoryError> {
        Ok(false)
    }

    async fn find_lookup(
        &self,
        _recipient_hash: Uuid,
    ) -> Result<Option<RecipientLookup>, RecipientRepositoryError> {
        Ok(None)
    }

    async fn find_lookup_by_duns(
        &self,
        _duns: &str,
    ) -> Result<Option<RecipientLookup>, RecipientRepositoryError> {
        Ok(None)
    }

    async fn profile_ueis(
        &self,
        _recipient_hashes: &[Uuid],
    ) -> Result<HashMap<Uuid, String>, RecipientRepositoryError> {
        Ok(HashMap::new())
    }

    async fn affiliations(
        &self,
        _id: &RecipientId,
    ) -> Result<Option<Vec<String>>, RecipientRepositoryError> {
        Ok(None)
    }

    async fn child_profiles(
        &self,
        _duns: &[String],
    ) -> Result<Vec<ChildProfile>, RecipientRepositoryError> {
        Ok(Vec::new())
    }

    async fn lookup_states(
        &self,
        _recipient_hashes: &[Uuid],
    ) -> Result<HashMap<Uuid, Option<String>>, RecipientRepositoryError> {
        Ok(HashMap::new())
    }

    async fn country_name(&self, _code: &str) -> Result<Option<String>, RecipientRepositoryError> {
        Ok(None)
    }

    async fn latest_sam_business_types(
        &self,
        _legal_business_name: &str,
        _duns: &str,
    ) -> Result<Option<SamBusinessTypes>, RecipientRepositoryError> {
        Ok(None)
    }

    async fn latest_transaction_categories(
        &self,
        _recipient_hash: Uuid,
        _since: NaiveDate,
    ) -> Result<Vec<String>, RecipientRepositoryError> {
        Ok(Vec::new())
    }
}
