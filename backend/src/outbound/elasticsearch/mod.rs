//! Elasticsearch adapter for the transaction search port.
//!
//! Query bodies are built in `query`, responses decoded in `dto`, and HTTP
//! transport handled by [`ElasticsearchTransactionSearch`].

mod dto;
mod http_search;
mod query;

pub use http_search::ElasticsearchTransactionSearch;
