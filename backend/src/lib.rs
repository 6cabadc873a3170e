//! Spending API library modules.
//!
//! Hexagonal layout: [`domain`] holds the use cases and the ports they
//! depend on, [`inbound`] adapts HTTP requests onto the driving ports and
//! [`outbound`] implements the driven ports against PostgreSQL,
//! Elasticsearch and Redis.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
