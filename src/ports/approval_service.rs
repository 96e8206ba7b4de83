use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::request::{RequestGroup, RequestStatus};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApprovalServiceError {
    #[error("Could not load requests from the sheet")]
    Connectivity,
    #[error("Could not write the decision to the sheet")]
    Write,
    #[error("A request cannot be moved to '{0}'")]
    InvalidTransition(RequestStatus),
}

/// Result of one fetch-filter-group cycle.
#[derive(Debug, Clone)]
pub struct PendingOverview {
    pub groups: Vec<RequestGroup>,
    /// Data rows fetched, pending or not.
    pub total_rows: usize,
    /// Set when the sheet could not be read as requests (e.g. no status column).
    pub schema_problem: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

impl PendingOverview {
    /// No rows at all, or rows that cannot be interpreted.
    pub fn has_no_data(&self) -> bool {
        self.total_rows == 0 || self.schema_problem.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    Resolved { rows: usize },
    /// Nothing in the group was pending any more when the decision arrived.
    AlreadyResolved,
}

#[async_trait::async_trait]
pub trait ApprovalService: Send + Sync {
    async fn list_pending_groups(
        &self,
    ) -> error_stack::Result<Vec<RequestGroup>, ApprovalServiceError>;

    async fn resolve_group(
        &self,
        group: &RequestGroup,
        new_status: RequestStatus,
    ) -> error_stack::Result<(), ApprovalServiceError>;

    async fn resolve_pending_group(
        &self,
        group_id: &str,
        new_status: RequestStatus,
    ) -> error_stack::Result<ResolveOutcome, ApprovalServiceError>;

    async fn refresh(&self) -> error_stack::Result<PendingOverview, ApprovalServiceError>;

    async fn health_check(&self) -> error_stack::Result<String, ApprovalServiceError>;
}
