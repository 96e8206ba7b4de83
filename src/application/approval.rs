use std::sync::Arc;

use error_stack::{report, ResultExt};
use tracing::{info, instrument, warn};

use crate::domain::request::{group_pending, RequestGroup, RequestStatus};
use crate::ports::approval_service::{
    ApprovalService, ApprovalServiceError, PendingOverview, ResolveOutcome,
};
use crate::ports::request_repository::{RequestRepository, RequestRepositoryError};

/// Pending → approved/rejected workflow over grouped request rows.
pub struct ApprovalWorkflow {
    repository: Arc<dyn RequestRepository>,
}

impl std::fmt::Debug for ApprovalWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApprovalWorkflow")
            .field("repository", &"<RequestRepository>")
            .finish()
    }
}

impl ApprovalWorkflow {
    pub fn new(repository: Arc<dyn RequestRepository>) -> Self {
        Self { repository }
    }

    fn ensure_terminal(new_status: RequestStatus) -> error_stack::Result<(), ApprovalServiceError> {
        if new_status.is_terminal() {
            Ok(())
        } else {
            Err(report!(ApprovalServiceError::InvalidTransition(new_status)))
        }
    }
}

#[async_trait::async_trait]
impl ApprovalService for ApprovalWorkflow {
    #[instrument(skip(self))]
    async fn list_pending_groups(
        &self,
    ) -> error_stack::Result<Vec<RequestGroup>, ApprovalServiceError> {
        Ok(self.refresh().await?.groups)
    }

    #[instrument(skip(self, group), fields(group_id = %group.group_id, rows = group.len()))]
    async fn resolve_group(
        &self,
        group: &RequestGroup,
        new_status: RequestStatus,
    ) -> error_stack::Result<(), ApprovalServiceError> {
        Self::ensure_terminal(new_status)?;

        self.repository
            .write_statuses(&group.positions(), new_status)
            .await
            .change_context(ApprovalServiceError::Write)
            .attach_printable_lazy(|| {
                format!(
                    "Failed to mark group '{}' as {}",
                    group.group_id,
                    new_status.slug()
                )
            })?;

        info!(
            group_id = %group.group_id,
            status = new_status.slug(),
            "✅ Group resolved"
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn resolve_pending_group(
        &self,
        group_id: &str,
        new_status: RequestStatus,
    ) -> error_stack::Result<ResolveOutcome, ApprovalServiceError> {
        Self::ensure_terminal(new_status)?;

        let overview = self.refresh().await?;
        let Some(group) = overview
            .groups
            .into_iter()
            .find(|group| group.group_id == group_id)
        else {
            info!(group_id, "Group has no pending rows left, nothing to write");
            return Ok(ResolveOutcome::AlreadyResolved);
        };

        self.resolve_group(&group, new_status).await?;
        Ok(ResolveOutcome::Resolved { rows: group.len() })
    }

    #[instrument(skip(self))]
    async fn refresh(&self) -> error_stack::Result<PendingOverview, ApprovalServiceError> {
        let fetched_at = chrono::Utc::now();

        match self.repository.fetch_all().await {
            Ok(rows) => {
                let groups = group_pending(&rows);
                tracing::debug!(
                    total_rows = rows.len(),
                    pending_groups = groups.len(),
                    "Requests loaded"
                );
                Ok(PendingOverview {
                    groups,
                    total_rows: rows.len(),
                    schema_problem: None,
                    fetched_at,
                })
            }
            Err(report) => {
                if let RequestRepositoryError::Schema(column) = report.current_context() {
                    warn!(column = %column, "Request sheet layout not usable, showing no requests");
                    return Ok(PendingOverview {
                        groups: Vec::new(),
                        total_rows: 0,
                        schema_problem: Some(report.current_context().to_string()),
                        fetched_at,
                    });
                }
                Err(report.change_context(ApprovalServiceError::Connectivity))
            }
        }
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> error_stack::Result<String, ApprovalServiceError> {
        let overview = self.refresh().await?;
        let status = match &overview.schema_problem {
            Some(problem) => format!("🟡 Degraded: {problem}"),
            None => "🟢 Healthy".to_string(),
        };

        Ok(format!(
            "License Approval Service - {}\n\
             Rows in sheet: {}\n\
             Pending groups: {}",
            status,
            overview.total_rows,
            overview.groups.len()
        ))
    }
}
