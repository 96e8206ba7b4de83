use error_stack::{report, ResultExt};
use google_sheets4::{
    api::{BatchUpdateValuesRequest, ValueRange},
    Sheets,
};
use std::fmt::Debug;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::instrument;

use crate::adapters::config::sheets_config::SpreadsheetConfig;
use crate::domain::sheets::a1_notation::A1Notation;

use super::{
    auth,
    cell_values::IntoStringGrid,
    http_client::{self, HttpsConnector},
};

pub struct SpreadsheetManager {
    pub config: SpreadsheetConfig,
    hub: Sheets<HttpsConnector>,
    sheet_title_cache: RwLock<Option<String>>,
}

impl Debug for SpreadsheetManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SpreadsheetManager {{ config: {:?} }}", self.config)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpreadsheetManagerError {
    #[error("Failed to authenticate with the Sheets API")]
    Authentication,
    #[error("Failed to fetch sheet title")]
    FailedToFetchSheetTitle,
    #[error("Failed to fetch range")]
    FailedToFetchRange,
    #[error("Failed to write range")]
    FailedToWriteRange,
}

impl SpreadsheetManager {
    #[instrument(name = "SpreadsheetManager::new")]
    pub async fn new(
        config: SpreadsheetConfig,
    ) -> error_stack::Result<Self, SpreadsheetManagerError> {
        let client = http_client::http_client();
        let auth = auth::auth(&config, client.clone()).await?;
        let hub = Sheets::new(client, auth);

        Ok(Self::from_hub(config, hub))
    }

    /// Wraps an already authenticated hub.
    pub fn from_hub(config: SpreadsheetConfig, hub: Sheets<HttpsConnector>) -> Self {
        SpreadsheetManager {
            sheet_title_cache: RwLock::new(config.sheet_title.as_deref().map(str::to_owned)),
            config,
            hub,
        }
    }

    /// Title of the request sheet: the configured one, or the first sheet of the spreadsheet.
    #[instrument]
    pub async fn sheet_title(&self) -> error_stack::Result<String, SpreadsheetManagerError> {
        if let Some(title) = self.sheet_title_cache.read().await.clone() {
            return Ok(title);
        }

        let response = self
            .hub
            .spreadsheets()
            .get(&self.config.spreadsheet_id)
            .doit()
            .await
            .change_context(SpreadsheetManagerError::FailedToFetchSheetTitle)?;

        let sheets = response
            .1
            .sheets
            .ok_or(report!(SpreadsheetManagerError::FailedToFetchSheetTitle))
            .attach_printable("Spreadsheet has no sheets")?;

        let title = sheets
            .into_iter()
            .filter_map(|sheet| sheet.properties)
            .min_by_key(|props| props.index.unwrap_or(i32::MAX))
            .and_then(|props| props.title)
            .ok_or(report!(SpreadsheetManagerError::FailedToFetchSheetTitle))
            .attach_printable("First sheet has no title")?;

        tracing::debug!(title = %title, "Resolved request sheet title");
        self.sheet_title_cache.write().await.replace(title.clone());
        Ok(title)
    }

    /// Cells of `range` as strings, row by row. Rows keep their ragged shape.
    #[instrument]
    pub async fn read_grid(
        &self,
        range: &A1Notation,
    ) -> error_stack::Result<Vec<Vec<String>>, SpreadsheetManagerError> {
        let response = self
            .hub
            .spreadsheets()
            .values_get(&self.config.spreadsheet_id, range.as_ref())
            .doit()
            .await
            .change_context(SpreadsheetManagerError::FailedToFetchRange)
            .attach_printable_lazy(|| format!("Failed to fetch values for range {}", range))?;

        Ok(response
            .1
            .values
            .map(IntoStringGrid::into_string_grid)
            .unwrap_or_default())
    }

    /// Sends every value range in one `values:batchUpdate` call and returns the number of
    /// cells the API reports as updated.
    #[instrument(skip(value_ranges), fields(ranges = value_ranges.len()))]
    pub async fn batch_write(
        &self,
        value_ranges: Vec<ValueRange>,
    ) -> error_stack::Result<usize, SpreadsheetManagerError> {
        let ranges = value_ranges
            .iter()
            .filter_map(|value_range| value_range.range.clone())
            .collect::<Vec<_>>();

        let request = BatchUpdateValuesRequest {
            data: Some(value_ranges),
            value_input_option: Some("RAW".to_string()),
            ..Default::default()
        };

        let response = self
            .hub
            .spreadsheets()
            .values_batch_update(request, &self.config.spreadsheet_id)
            .doit()
            .await
            .change_context(SpreadsheetManagerError::FailedToWriteRange)
            .attach_printable_lazy(|| format!("Failed to write ranges {}", ranges.join(", ")))?;

        let updated = response.1.total_updated_cells.unwrap_or(0);
        Ok(usize::try_from(updated).unwrap_or(0))
    }
}
