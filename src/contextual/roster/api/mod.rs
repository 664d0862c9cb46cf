//! Client side of the tenant management API.
//!
//! [`TenantApi`] is the seam between the reconciliation workflow and the
//! platform. [`http::HttpTenantClient`] talks to the real service; tests supply
//! an in-memory implementation.

pub mod http;
pub mod retry;

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::contextual::roster::model::TenantUser;

pub use http::HttpTenantClient;
pub use retry::RetryPolicy;

/// Failure of a single platform call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The platform answered 429 Too Many Requests.
    #[error("rate limited (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Any other non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never produced a response.
    #[error("request failed: {message}")]
    Transport { message: String, retryable: bool },

    /// The response body could not be decoded.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether repeating the same call may succeed: 5xx, rate limiting and
    /// connection-level failures.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::RateLimited { .. } => true,
            ApiError::Status { status, .. } => (500..600).contains(status),
            ApiError::Transport { retryable, .. } => *retryable,
            ApiError::Decode(_) => false,
        }
    }
}

/// Per-email result of one invitation batch. Only emails listed in `invited`
/// were accepted; an email in neither collection was dropped by the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InviteOutcome {
    pub invited: BTreeSet<String>,
    pub errors: BTreeMap<String, String>,
}

/// Operations the reconciliation workflow needs from the platform. The tenant
/// for listing and removal is implied by the credential.
pub trait TenantApi {
    /// Current membership of the tenant.
    fn list_members(&self) -> Result<Vec<TenantUser>, ApiError>;

    /// Invites one batch of users. Batch-level failures are returned as `Err`,
    /// per-email rejections inside [`InviteOutcome`].
    fn add_members(
        &self,
        tenant: &str,
        emails: &[String],
        admin: bool,
    ) -> Result<InviteOutcome, ApiError>;

    /// Removes a single user.
    fn remove_member(&self, email: &str) -> Result<(), ApiError>;
}
