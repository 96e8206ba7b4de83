use std::sync::Arc;

use error_stack::{report, ResultExt};
use google_sheets4::api::ValueRange;
use tracing::instrument;

use crate::domain::request::{RequestRow, RequestStatus};
use crate::domain::sheets::{
    a1_notation::{self, A1Notation, ToA1Notation},
    cell_position::CellPosition,
    column::Column,
    row::Row,
    schema::{parse_records, RequestSheetSchema, SchemaError, SheetLayout},
};
use crate::ports::request_repository::{RequestRepository, RequestRepositoryError};

use super::{
    spreadsheet_manager::{SpreadsheetManager, SpreadsheetManagerError},
    value_range_factory::ValueRangeFactory,
};

/// Request rows stored in one Google sheet, header in row 1.
pub struct SpreadsheetRequestRepository {
    spreadsheet_manager: Arc<SpreadsheetManager>,
    schema: RequestSheetSchema,
    fixed_status_column: Option<Column>,
}

impl std::fmt::Debug for SpreadsheetRequestRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpreadsheetRequestRepository")
            .field("spreadsheet_manager", &self.spreadsheet_manager)
            .field("fixed_status_column", &self.fixed_status_column)
            .finish()
    }
}

impl SpreadsheetRequestRepository {
    pub fn new(
        spreadsheet_manager: Arc<SpreadsheetManager>,
        schema: RequestSheetSchema,
        fixed_status_column: Option<Column>,
    ) -> Self {
        Self {
            spreadsheet_manager,
            schema,
            fixed_status_column,
        }
    }

    /// Status column for the next write. Read from the header each time unless fixed.
    #[instrument(skip(self))]
    async fn status_column(
        &self,
        sheet_title: &str,
    ) -> error_stack::Result<Column, RequestRepositoryError> {
        if let Some(column) = self.fixed_status_column {
            return Ok(column);
        }

        let header = self
            .spreadsheet_manager
            .read_grid(&a1_notation::whole_row(sheet_title, Row::from_row(1)))
            .await
            .change_context(RequestRepositoryError::Write)?
            .into_iter()
            .next()
            .unwrap_or_default();

        SheetLayout::locate(&self.schema, &header, None)
            .map(|layout| layout.status_column())
            .map_err(|err| report!(schema_error(err)))
            .change_context(RequestRepositoryError::Write)
    }
}

fn schema_error(err: SchemaError) -> RequestRepositoryError {
    match err {
        SchemaError::MissingColumn(column) => RequestRepositoryError::Schema(column),
    }
}

fn fetch_error(err: SpreadsheetManagerError) -> RequestRepositoryError {
    match err {
        SpreadsheetManagerError::FailedToWriteRange => RequestRepositoryError::Write,
        _ => RequestRepositoryError::Connectivity,
    }
}

/// One single-cell value range per row, all in `status_column`.
pub fn status_value_ranges(
    sheet_title: &str,
    status_column: Column,
    rows: &[Row],
    status: RequestStatus,
) -> Vec<ValueRange> {
    rows.iter()
        .map(|&row| {
            let cell: A1Notation =
                CellPosition::new(status_column, row).to_a1_notation(Some(sheet_title));
            ValueRange::from_single_cell(&cell, status.as_ref())
        })
        .collect()
}

#[async_trait::async_trait]
impl RequestRepository for SpreadsheetRequestRepository {
    #[instrument(skip(self))]
    async fn fetch_all(&self) -> error_stack::Result<Vec<RequestRow>, RequestRepositoryError> {
        let sheet_title = self
            .spreadsheet_manager
            .sheet_title()
            .await
            .map_err(|report| {
                let context = fetch_error(report.current_context().clone());
                report.change_context(context)
            })?;

        let grid = self
            .spreadsheet_manager
            .read_grid(&a1_notation::whole_sheet(&sheet_title))
            .await
            .map_err(|report| {
                let context = fetch_error(report.current_context().clone());
                report.change_context(context)
            })?;

        let records = parse_records(&self.schema, &grid, self.fixed_status_column)
            .map_err(|err| report!(schema_error(err)))
            .attach_printable_lazy(|| format!("Sheet '{}'", sheet_title))?;

        tracing::debug!(rows = records.len(), sheet = %sheet_title, "Fetched request rows");
        Ok(records)
    }

    #[instrument(skip(self, rows), fields(rows = rows.len(), status = status.slug()))]
    async fn write_statuses(
        &self,
        rows: &[Row],
        status: RequestStatus,
    ) -> error_stack::Result<(), RequestRepositoryError> {
        if rows.is_empty() {
            return Ok(());
        }

        let sheet_title = self
            .spreadsheet_manager
            .sheet_title()
            .await
            .change_context(RequestRepositoryError::Write)?;
        let status_column = self.status_column(&sheet_title).await?;

        let value_ranges = status_value_ranges(&sheet_title, status_column, rows, status);
        let updated = self
            .spreadsheet_manager
            .batch_write(value_ranges)
            .await
            .change_context(RequestRepositoryError::Write)?;

        // The API may apply part of a batch; this is reported, not repaired.
        if updated != rows.len() {
            tracing::warn!(
                requested = rows.len(),
                updated,
                "Sheet reported a different number of updated status cells"
            );
        }
        Ok(())
    }
}
