#[derive(serde::Deserialize, Debug, Clone)]
pub struct SpreadsheetConfig {
    /// Path to the service account key (JSON) with read/write access to the spreadsheet.
    pub priv_key: Box<str>,
    pub spreadsheet_id: Box<str>,
    /// Sheet holding the requests. Defaults to the first sheet of the spreadsheet.
    #[serde(default)]
    pub sheet_title: Option<Box<str>>,
    /// Fixed status column letter (e.g. `"G"`). Located through the header row when unset.
    #[serde(default)]
    pub status_column: Option<Box<str>>,
}
