//! Driving port for the disaster federal account count.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::Error;

/// Count federal accounts with spending under the given DEFC codes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FederalAccountCountRequest {
    /// `filter.def_codes` exactly as submitted; `None` when absent.
    pub def_codes: Option<Vec<String>>,
}

/// Number of matching federal accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FederalAccountCountResponse {
    /// Distinct federal accounts.
    pub count: u64,
}

/// Domain use-case port for the disaster federal account count.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FederalAccountCountQuery: Send + Sync {
    /// Validate the DEFC codes and count matching federal accounts.
    async fn count(
        &self,
        request: FederalAccountCountRequest,
    ) -> Result<FederalAccountCountResponse, Error>;
}
