//! In-memory row store used by the workflow and web tests.

use std::sync::Mutex;

use error_stack::report;

use crate::domain::request::{RequestRow, RequestStatus};
use crate::domain::sheets::row::Row;
use crate::ports::request_repository::{RequestRepository, RequestRepositoryError};

#[derive(Debug, Default)]
struct State {
    rows: Vec<RequestRow>,
    missing_status_column: bool,
    fail_fetches: bool,
    fail_writes: bool,
    write_attempts: usize,
    write_batches: Vec<(Vec<Row>, RequestStatus)>,
}

#[derive(Debug, Default)]
pub struct InMemoryRequestRepository {
    state: Mutex<State>,
}

impl InMemoryRequestRepository {
    pub fn new(rows: Vec<RequestRow>) -> Self {
        Self {
            state: Mutex::new(State {
                rows,
                ..State::default()
            }),
        }
    }

    pub fn without_status_column() -> Self {
        Self {
            state: Mutex::new(State {
                missing_status_column: true,
                ..State::default()
            }),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn fail_fetches(&self, fail: bool) {
        self.state().fail_fetches = fail;
    }

    pub fn fail_writes(&self, fail: bool) {
        self.state().fail_writes = fail;
    }

    /// Inserts a row above all others, shifting every physical position down by one.
    pub fn insert_front(&self, row: RequestRow) {
        self.state().rows.insert(0, row);
    }

    pub fn write_batches(&self) -> Vec<(Vec<Row>, RequestStatus)> {
        self.state().write_batches.clone()
    }

    pub fn write_attempts(&self) -> usize {
        self.state().write_attempts
    }
}

#[async_trait::async_trait]
impl RequestRepository for InMemoryRequestRepository {
    async fn fetch_all(&self) -> error_stack::Result<Vec<RequestRow>, RequestRepositoryError> {
        let state = self.state();
        if state.fail_fetches {
            return Err(report!(RequestRepositoryError::Connectivity));
        }
        if state.missing_status_column {
            return Err(report!(RequestRepositoryError::Schema("상태".to_string())));
        }

        Ok(state
            .rows
            .iter()
            .enumerate()
            .map(|(index, row)| RequestRow {
                position: Row::for_record(index),
                ..row.clone()
            })
            .collect())
    }

    async fn write_statuses(
        &self,
        rows: &[Row],
        status: RequestStatus,
    ) -> error_stack::Result<(), RequestRepositoryError> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut state = self.state();
        state.write_attempts += 1;
        if state.fail_writes {
            return Err(report!(RequestRepositoryError::Write));
        }

        for row in rows {
            let record = (row.index() as usize)
                .checked_sub(1)
                .and_then(|index| state.rows.get_mut(index));
            let Some(record) = record else {
                return Err(report!(RequestRepositoryError::Write));
            };
            record.status = Some(status);
        }
        state.write_batches.push((rows.to_vec(), status));
        Ok(())
    }
}
