use serde::Deserialize;
use thiserror::Error;

use super::{column::Column, row::Row};
use crate::domain::request::{RequestRow, RequestStatus};

/// Header names of the request sheet. Columns are located by name, never by letter.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RequestSheetSchema {
    pub group_id: String,
    pub sender: String,
    pub requested_at: String,
    pub name: String,
    pub primary_affiliation: String,
    pub secondary_affiliation: String,
    pub machine_id: String,
    pub status: String,
}

impl Default for RequestSheetSchema {
    fn default() -> Self {
        Self {
            group_id: "Message ID".to_string(),
            sender: "Sender".to_string(),
            requested_at: "요청일시".to_string(),
            name: "이름".to_string(),
            primary_affiliation: "1차 소속".to_string(),
            secondary_affiliation: "2차 소속".to_string(),
            machine_id: "머신 ID".to_string(),
            status: "상태".to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Column '{0}' is missing from the header row")]
    MissingColumn(String),
}

/// Where each field lives in one particular header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLayout {
    group_id: usize,
    status: usize,
    sender: Option<usize>,
    requested_at: Option<usize>,
    name: Option<usize>,
    primary_affiliation: Option<usize>,
    secondary_affiliation: Option<usize>,
    machine_id: Option<usize>,
}

impl SheetLayout {
    /// Locates the schema's columns in `header`. The group id column is required, and so is
    /// the status column unless `fixed_status` pins it to a letter; display columns that are
    /// absent read as empty strings.
    pub fn locate(
        schema: &RequestSheetSchema,
        header: &[String],
        fixed_status: Option<Column>,
    ) -> Result<Self, SchemaError> {
        let find = |name: &str| header.iter().position(|cell| cell.trim() == name.trim());
        let require =
            |name: &str| find(name).ok_or_else(|| SchemaError::MissingColumn(name.to_string()));

        let status = match fixed_status {
            Some(column) => {
                let position = column.index() as usize;
                if let Some(named) = find(&schema.status).filter(|&named| named != position) {
                    tracing::warn!(
                        fixed = %column,
                        header = %Column::for_header_position(named),
                        "Configured status column differs from the '{}' header, using {}",
                        schema.status,
                        column
                    );
                }
                position
            }
            None => require(&schema.status)?,
        };

        Ok(Self {
            group_id: require(&schema.group_id)?,
            status,
            sender: find(&schema.sender),
            requested_at: find(&schema.requested_at),
            name: find(&schema.name),
            primary_affiliation: find(&schema.primary_affiliation),
            secondary_affiliation: find(&schema.secondary_affiliation),
            machine_id: find(&schema.machine_id),
        })
    }

    pub fn status_column(&self) -> Column {
        Column::for_header_position(self.status)
    }

    fn record(&self, cells: &[String], position: Row) -> RequestRow {
        let cell = |index: usize| {
            cells
                .get(index)
                .map(|c| c.trim().to_string())
                .unwrap_or_default()
        };
        let optional = |index: Option<usize>| index.map(|i| cell(i)).unwrap_or_default();

        RequestRow {
            group_id: cell(self.group_id),
            sender: optional(self.sender),
            requested_at: optional(self.requested_at),
            name: optional(self.name),
            primary_affiliation: optional(self.primary_affiliation),
            secondary_affiliation: optional(self.secondary_affiliation),
            machine_id: optional(self.machine_id),
            status: RequestStatus::from_cell(&cell(self.status)),
            position,
        }
    }
}

/// Turns a sheet's cell grid (header first) into records with their physical positions.
///
/// Blank rows are kept so that positions line up with the sheet. A grid without a header
/// row has no records. Status is read from `fixed_status` when given, so reads and writes
/// always use the same column.
pub fn parse_records(
    schema: &RequestSheetSchema,
    grid: &[Vec<String>],
    fixed_status: Option<Column>,
) -> Result<Vec<RequestRow>, SchemaError> {
    let Some((header, data)) = grid.split_first() else {
        return Ok(Vec::new());
    };

    let layout = SheetLayout::locate(schema, header, fixed_status)?;
    Ok(data
        .iter()
        .enumerate()
        .map(|(index, cells)| layout.record(cells, Row::for_record(index)))
        .collect())
}
