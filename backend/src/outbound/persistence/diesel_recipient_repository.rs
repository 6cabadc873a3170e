//! PostgreSQL-backed recipient adapter.
//!
//! Reads `recipient_profile`, `recipient_lookup`, `duns`, `ref_country_code`
//! and `transaction_search`. Each method is one query; the service composes
//! them.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{
    ChildProfile, RecipientLookup, RecipientRepository, RecipientRepositoryError,
    SamBusinessTypes,
};
use crate::domain::{RecipientId, RecipientLevel};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{ChildProfileRow, RecipientLookupRow, SamRegistrationRow};
use super::pool::DbPool;
use super::schema::{
    duns, recipient_lookup, recipient_profile, ref_country_code, transaction_search,
};

/// Diesel-backed implementation of the recipient port.
#[derive(Clone)]
pub struct DieselRecipientRepository {
    pool: DbPool,
}

impl DieselRecipientRepository {
    /// Create a new repository with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn conn(
        &self,
    ) -> Result<PooledConnection<'_, AsyncPgConnection>, RecipientRepositoryError> {
        self.pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, RecipientRepositoryError::connection))
    }
}

fn query_error(
    operation: &'static str,
) -> impl FnOnce(diesel::result::Error) -> RecipientRepositoryError {
    move |error| {
        map_diesel_error(
            error,
            operation,
            RecipientRepositoryError::query,
            RecipientRepositoryError::connection,
        )
    }
}

#[async_trait]
impl RecipientRepository for DieselRecipientRepository {
    async fn profile_exists(&self, id: &RecipientId) -> Result<bool, RecipientRepositoryError> {
        let mut conn = self.conn().await?;
        diesel::select(diesel::dsl::exists(
            recipient_profile::table
                .filter(recipient_profile::recipient_hash.eq(id.hash()))
                .filter(recipient_profile::recipient_level.eq(id.level().code())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(query_error("recipient profile existence"))
    }

    async fn find_lookup(
        &self,
        recipient_hash: Uuid,
    ) -> Result<Option<RecipientLookup>, RecipientRepositoryError> {
        let mut conn = self.conn().await?;
        let row: Option<RecipientLookupRow> = recipient_lookup::table
            .filter(recipient_lookup::recipient_hash.eq(recipient_hash))
            .select(RecipientLookupRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(query_error("recipient lookup by hash"))?;
        Ok(row.map(RecipientLookup::from))
    }

    async fn find_lookup_by_duns(
        &self,
        duns: &str,
    ) -> Result<Option<RecipientLookup>, RecipientRepositoryError> {
        let mut conn = self.conn().await?;
        let row: Option<RecipientLookupRow> = recipient_lookup::table
            .filter(recipient_lookup::duns.eq(duns))
            .select(RecipientLookupRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(query_error("recipient lookup by duns"))?;
        Ok(row.map(RecipientLookup::from))
    }

    async fn profile_ueis(
        &self,
        recipient_hashes: &[Uuid],
    ) -> Result<HashMap<Uuid, String>, RecipientRepositoryError> {
        let mut conn = self.conn().await?;
        let rows: Vec<(Uuid, Option<String>)> = recipient_profile::table
            .filter(recipient_profile::recipient_hash.eq_any(recipient_hashes))
            .filter(recipient_profile::uei.is_not_null())
            .select((recipient_profile::recipient_hash, recipient_profile::uei))
            .order_by(recipient_profile::id.desc())
            .load(&mut conn)
            .await
            .map_err(query_error("recipient profile ueis"))?;

        // Later entries win, so the lowest profile id provides the UEI.
        Ok(rows
            .into_iter()
            .filter_map(|(hash, maybe_uei)| maybe_uei.map(|uei| (hash, uei)))
            .collect())
    }

    async fn affiliations(
        &self,
        id: &RecipientId,
    ) -> Result<Option<Vec<String>>, RecipientRepositoryError> {
        let mut conn = self.conn().await?;
        recipient_profile::table
            .filter(recipient_profile::recipient_hash.eq(id.hash()))
            .filter(recipient_profile::recipient_level.eq(id.level().code()))
            .select(recipient_profile::recipient_affiliations)
            .first(&mut conn)
            .await
            .optional()
            .map_err(query_error("recipient affiliations"))
    }

    async fn child_profiles(
        &self,
        duns: &[String],
    ) -> Result<Vec<ChildProfile>, RecipientRepositoryError> {
        let mut conn = self.conn().await?;
        let rows: Vec<ChildProfileRow> = recipient_profile::table
            .filter(recipient_profile::recipient_unique_id.eq_any(duns))
            .filter(recipient_profile::recipient_level.eq(RecipientLevel::Child.code()))
            .select(ChildProfileRow::as_select())
            .load(&mut conn)
            .await
            .map_err(query_error("child recipient profiles"))?;
        Ok(rows.into_iter().map(ChildProfile::from).collect())
    }

    async fn lookup_states(
        &self,
        recipient_hashes: &[Uuid],
    ) -> Result<HashMap<Uuid, Option<String>>, RecipientRepositoryError> {
        let mut conn = self.conn().await?;
        let rows: Vec<(Uuid, Option<String>)> = recipient_lookup::table
            .filter(recipient_lookup::recipient_hash.eq_any(recipient_hashes))
            .select((recipient_lookup::recipient_hash, recipient_lookup::state))
            .load(&mut conn)
            .await
            .map_err(query_error("recipient lookup states"))?;
        Ok(rows.into_iter().collect())
    }

    async fn country_name(&self, code: &str) -> Result<Option<String>, RecipientRepositoryError> {
        let mut conn = self.conn().await?;
        let name: Option<Option<String>> = ref_country_code::table
            .filter(ref_country_code::country_code.eq(code))
            .select(ref_country_code::country_name)
            .first(&mut conn)
            .await
            .optional()
            .map_err(query_error("country name"))?;
        Ok(name.flatten())
    }

    async fn latest_sam_business_types(
        &self,
        legal_business_name: &str,
        duns_number: &str,
    ) -> Result<Option<SamBusinessTypes>, RecipientRepositoryError> {
        let mut conn = self.conn().await?;
        let row: Option<SamRegistrationRow> = duns::table
            .filter(duns::legal_business_name.eq(legal_business_name))
            .filter(duns::awardee_or_recipient_uniqu.eq(duns_number))
            .order_by(duns::update_date.desc())
            .select(SamRegistrationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(query_error("latest SAM registration"))?;
        Ok(row.map(SamBusinessTypes::from))
    }

    async fn latest_transaction_categories(
        &self,
        recipient_hash: Uuid,
        since: NaiveDate,
    ) -> Result<Vec<String>, RecipientRepositoryError> {
        let mut conn = self.conn().await?;
        let categories: Option<Option<Vec<String>>> = transaction_search::table
            .filter(transaction_search::recipient_hash.eq(recipient_hash))
            .filter(transaction_search::action_date.ge(since))
            .order_by((
                transaction_search::action_date.desc(),
                transaction_search::transaction_id.desc(),
            ))
            .select(transaction_search::business_categories)
            .first(&mut conn)
            .await
            .optional()
            .map_err(query_error("latest transaction categories"))?;
        Ok(categories.flatten().unwrap_or_default())
    }
}
