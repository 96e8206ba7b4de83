use error_stack::ResultExt;
use google_sheets4::hyper;
use google_sheets4::oauth2::{self, authenticator::Authenticator};

use crate::adapters::config::sheets_config::SpreadsheetConfig;

use super::http_client::HttpsConnector;
use super::spreadsheet_manager::SpreadsheetManagerError;

pub async fn auth(
    config: &SpreadsheetConfig,
    client: hyper::Client<HttpsConnector>,
) -> error_stack::Result<Authenticator<HttpsConnector>, SpreadsheetManagerError> {
    let priv_key_path = config.priv_key.as_ref();
    let secret: oauth2::ServiceAccountKey = oauth2::read_service_account_key(priv_key_path)
        .await
        .change_context(SpreadsheetManagerError::Authentication)
        .attach_printable_lazy(|| {
            format!(
                "Could not read service account private key at '{}'. Please provide a valid service account key with access to the request spreadsheet.",
                priv_key_path
            )
        })?;

    oauth2::ServiceAccountAuthenticator::with_client(secret, client)
        .build()
        .await
        .change_context(SpreadsheetManagerError::Authentication)
        .attach_printable("Could not create an authenticator")
}
