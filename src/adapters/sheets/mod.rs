pub mod auth;
pub mod cell_values;
#[cfg(test)]
pub mod fake_sheets_api;
pub mod http_client;
pub mod request_sheet_repository;
pub mod spreadsheet_manager;
pub mod value_range_factory;
