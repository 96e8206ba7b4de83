use thiserror::Error;

use crate::domain::request::{RequestRow, RequestStatus};
use crate::domain::sheets::row::Row;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestRepositoryError {
    #[error("Could not reach the request sheet")]
    Connectivity,
    #[error("Request sheet is missing the '{0}' column")]
    Schema(String),
    #[error("Request sheet rejected the status update")]
    Write,
}

#[async_trait::async_trait]
pub trait RequestRepository: Send + Sync {
    /// Every data row of the sheet in sheet order, each carrying its current physical row.
    async fn fetch_all(&self) -> error_stack::Result<Vec<RequestRow>, RequestRepositoryError>;

    /// Writes `status` to the status cell of every row in `rows` with a single remote call.
    /// The batch is not atomic. An empty slice performs no call.
    async fn write_statuses(
        &self,
        rows: &[Row],
        status: RequestStatus,
    ) -> error_stack::Result<(), RequestRepositoryError>;

    async fn write_status(
        &self,
        row: Row,
        status: RequestStatus,
    ) -> error_stack::Result<(), RequestRepositoryError> {
        self.write_statuses(&[row], status).await
    }
}
