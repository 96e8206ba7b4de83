use std::{process::ExitCode, sync::Arc};

use error_stack::ResultExt;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::instrument;

use license_approval::adapters::config::app_config::AppConfig;
use license_approval::adapters::sheets::{
    request_sheet_repository::SpreadsheetRequestRepository,
    spreadsheet_manager::SpreadsheetManager,
};
use license_approval::adapters::web::server::{self, AppState};
use license_approval::application::approval::ApprovalWorkflow;
use license_approval::domain::sheets::column::Column;
use license_approval::ports::{approval_service::ApprovalService, request_repository::RequestRepository};
use license_approval::telemetry;

#[derive(Error, Debug)]
enum StartupError {
    #[error("Invalid status column in the sheets configuration")]
    StatusColumn,
    #[error("Failed to set up the Sheets client")]
    Sheets,
    #[error("Failed to bind the dashboard address")]
    Bind,
    #[error("Dashboard server stopped with an error")]
    Serve,
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[instrument(skip(config))]
async fn run(config: AppConfig) -> error_stack::Result<(), StartupError> {
    let fixed_status_column = config
        .sheets
        .status_column
        .as_deref()
        .map(str::parse::<Column>)
        .transpose()
        .change_context(StartupError::StatusColumn)?;

    let spreadsheet_manager = Arc::new(
        SpreadsheetManager::new(config.sheets.clone())
            .await
            .change_context(StartupError::Sheets)?,
    );

    let repository: Arc<dyn RequestRepository> = Arc::new(SpreadsheetRequestRepository::new(
        Arc::clone(&spreadsheet_manager),
        config.columns.clone(),
        fixed_status_column,
    ));
    let service: Arc<dyn ApprovalService> = Arc::new(ApprovalWorkflow::new(repository));

    let listener = TcpListener::bind(&config.server.bind)
        .await
        .change_context(StartupError::Bind)
        .attach_printable_lazy(|| format!("Address: {}", config.server.bind))?;

    let state = AppState::new(service, &config.auth);
    server::serve(listener, state, shutdown_signal())
        .await
        .change_context(StartupError::Serve)
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(report) => {
            eprintln!("❌ {report:?}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(report) = telemetry::init(&config.telemetry) {
        eprintln!("❌ {report:?}");
        return ExitCode::FAILURE;
    }

    tracing::trace!("Setting panic hook");
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("panic: {info}");
        opentelemetry::global::shutdown_tracer_provider();
    }));

    let result = run(config).await;
    opentelemetry::global::shutdown_tracer_provider();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            tracing::error!("❌ {report:?}");
            ExitCode::FAILURE
        }
    }
}
