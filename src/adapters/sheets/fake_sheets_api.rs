//! Local stand-in for the Sheets v4 endpoints the adapter calls: spreadsheet metadata,
//! `values.get` and `values:batchUpdate`. Batch updates are applied to the in-memory grid.

use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use google_sheets4::{client::NoToken, Sheets};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::adapters::config::sheets_config::SpreadsheetConfig;
use crate::domain::sheets::column::parse_col;

use super::{http_client, spreadsheet_manager::SpreadsheetManager};

pub const SPREADSHEET_ID: &str = "spreadsheet-under-test";
pub const SHEET_TITLE: &str = "Requests";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Debug, Default)]
struct Inner {
    grid: Vec<Vec<String>>,
    fail_reads: bool,
    fail_writes: bool,
    reported_updated_cells: Option<usize>,
    requests: Vec<RecordedRequest>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeSheetsApi {
    inner: Arc<Mutex<Inner>>,
}

impl FakeSheetsApi {
    pub fn new(grid: &[&[&str]]) -> Self {
        let grid = grid
            .iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();
        Self {
            inner: Arc::new(Mutex::new(Inner {
                grid,
                ..Inner::default()
            })),
        }
    }

    fn inner(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    pub fn fail_reads(&self) {
        self.inner().fail_reads = true;
    }

    pub fn fail_writes(&self) {
        self.inner().fail_writes = true;
    }

    /// Makes `values:batchUpdate` report this many updated cells regardless of the request.
    pub fn report_updated_cells(&self, cells: usize) {
        self.inner().reported_updated_cells = Some(cells);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner().requests.clone()
    }

    /// Bodies of every `values:batchUpdate` call, in order.
    pub fn batch_updates(&self) -> Vec<Value> {
        self.requests()
            .into_iter()
            .filter(|request| request.method == Method::POST)
            .filter_map(|request| request.body)
            .collect()
    }

    /// Number of `values.get` calls.
    pub fn value_reads(&self) -> usize {
        self.requests()
            .iter()
            .filter(|request| request.path.contains("/values/"))
            .count()
    }

    pub fn cell(&self, a1: &str) -> Option<String> {
        let (col, row) = split_cell(a1)?;
        self.inner().grid.get(row)?.get(col).cloned()
    }

    /// Serves the fake on a random local port and returns a manager pointed at it.
    pub async fn start(&self, sheet_title: Option<&str>) -> Arc<SpreadsheetManager> {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().fallback(handle).with_state(self.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let mut hub = Sheets::new(http_client::plain_http_client(), NoToken);
        hub.base_url(format!("http://{addr}/"));

        let config = SpreadsheetConfig {
            priv_key: "unused.json".into(),
            spreadsheet_id: SPREADSHEET_ID.into(),
            sheet_title: sheet_title.map(Into::into),
            status_column: None,
        };
        Arc::new(SpreadsheetManager::from_hub(config, hub))
    }
}

/// `'Sheet'!H2` or `H2` to zero-based (column, row).
fn split_cell(a1: &str) -> Option<(usize, usize)> {
    let cell = a1.rsplit_once('!').map_or(a1, |(_, cell)| cell);
    let digits = cell.find(|c: char| c.is_ascii_digit())?;
    let col = parse_col(&cell[..digits]).ok()?.index() as usize;
    let row = cell[digits..].parse::<usize>().ok()?.checked_sub(1)?;
    Some((col, row))
}

fn server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": { "code": 500, "message": "backend error", "status": "INTERNAL" } })),
    )
        .into_response()
}

async fn handle(
    State(api): State<FakeSheetsApi>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let body = serde_json::from_slice::<Value>(&body).ok();
    let mut inner = api.inner();
    inner.requests.push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        body: body.clone(),
    });

    let Some(rest) = path.strip_prefix(&format!("/v4/spreadsheets/{SPREADSHEET_ID}")) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    if method == Method::GET && rest.is_empty() {
        if inner.fail_reads {
            return server_error();
        }
        return Json(json!({
            "spreadsheetId": SPREADSHEET_ID,
            "sheets": [
                { "properties": { "sheetId": 7, "title": "Archive", "index": 1 } },
                { "properties": { "sheetId": 0, "title": SHEET_TITLE, "index": 0 } },
            ],
        }))
        .into_response();
    }

    if method == Method::GET && rest.starts_with("/values/") {
        if inner.fail_reads {
            return server_error();
        }
        // A row range (`'Requests'!1:1`) has a `!`, the whole-sheet range does not.
        let range = &rest["/values/".len()..];
        let rows = if range.contains('!') || range.contains("%21") {
            inner.grid.iter().take(1).cloned().collect::<Vec<_>>()
        } else {
            inner.grid.clone()
        };
        return Json(json!({ "range": range, "majorDimension": "ROWS", "values": rows }))
            .into_response();
    }

    if method == Method::POST && (rest == "/values:batchUpdate" || rest == "/values%3AbatchUpdate") {
        if inner.fail_writes {
            return server_error();
        }
        let data = body
            .as_ref()
            .and_then(|body| body["data"].as_array().cloned())
            .unwrap_or_default();
        for value_range in &data {
            let cell = value_range["range"].as_str().and_then(split_cell);
            let value = value_range["values"][0][0].as_str();
            if let (Some((col, row)), Some(value)) = (cell, value) {
                if inner.grid.len() <= row {
                    inner.grid.resize(row + 1, Vec::new());
                }
                let cells = &mut inner.grid[row];
                if cells.len() <= col {
                    cells.resize(col + 1, String::new());
                }
                cells[col] = value.to_string();
            }
        }
        let updated = inner.reported_updated_cells.unwrap_or(data.len());
        return Json(json!({
            "spreadsheetId": SPREADSHEET_ID,
            "totalUpdatedCells": updated,
            "totalUpdatedRows": updated,
            "totalUpdatedColumns": 1,
            "totalUpdatedSheets": 1,
        }))
        .into_response();
    }

    StatusCode::NOT_FOUND.into_response()
}
