//! PostgreSQL persistence adapters using Diesel.
//!
//! The spending database is read-only from this service's point of view.
//! Repositories translate Diesel rows into domain types and map database
//! failures into their port's error type; they hold no business logic.
//!
//! # Example
//!
//! ```no_run
//! use spending_api::outbound::persistence::{DbPool, DieselRecipientRepository, PoolConfig};
//!
//! # async fn build() -> Result<(), spending_api::outbound::persistence::PoolError> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/spending")).await?;
//! let recipients = DieselRecipientRepository::new(pool);
//! # let _ = recipients;
//! # Ok(())
//! # }
//! ```

mod diesel_error_mapping;
mod diesel_federal_account_repository;
mod diesel_recipient_repository;
mod diesel_reference_data_repository;
mod diesel_reporting_repository;
mod models;
mod pool;
mod schema;

pub use diesel_federal_account_repository::DieselFederalAccountRepository;
pub use diesel_recipient_repository::DieselRecipientRepository;
pub use diesel_reference_data_repository::DieselReferenceDataRepository;
pub use diesel_reporting_repository::DieselReportingRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
