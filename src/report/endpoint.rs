//! Endpoints for exporting a customer's records and downloading the PDF.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    alert::Alert,
    endpoints::{self, with_query},
    html::LINK_STYLE,
    record::load_customer_records,
    report::export::{EXPORT_FILE_SUFFIX, generate_report},
};

/// The state needed for exporting a customer's records.
#[derive(Debug, Clone)]
pub struct ExportState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub export_dir: PathBuf,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            export_dir: state.export_dir.clone(),
        }
    }
}

/// The form data for exporting a customer's records.
#[derive(Debug, Deserialize)]
pub struct ExportForm {
    #[serde(default)]
    pub name: String,
}

/// Write the customer's records to a PDF and respond with a link to download
/// it.
pub async fn export_endpoint(
    State(state): State<ExportState>,
    Form(form): Form<ExportForm>,
) -> Response {
    if form.name.trim().is_empty() {
        return Error::EmptyCustomerName.into_alert_response();
    }

    let records = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_alert_response();
            }
        };

        match load_customer_records(&form.name, &connection) {
            Ok(records) => records,
            Err(error) => {
                tracing::error!("Could not get records for {:?}: {error}", form.name);
                return error.into_alert_response();
            }
        }
    };

    if records.is_empty() {
        return Error::NothingToExport.into_alert_response();
    }

    let export_dir = state.export_dir.clone();
    let customer_name = form.name.clone();
    let result = tokio::task::spawn_blocking(move || {
        generate_report(&export_dir, &customer_name, &records)
    })
    .await
    .map_err(|error| Error::ReportError(error.to_string()))
    .and_then(|result| result);

    let path = match result {
        Ok(path) => path,
        Err(error) => {
            tracing::error!("Could not export records for {:?}: {error}", form.name);
            return error.into_alert_response();
        }
    };

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let download_url = with_query(endpoints::EXPORTS, &[("file", &file_name)]);
    let alert = Alert::SuccessSimple {
        message: format!("PDF saved as {file_name}"),
    };

    html! {
        p class="text-sm"
        {
            a href=(download_url) download=(file_name) class=(LINK_STYLE)
            {
                "Download " (file_name)
            }
        }

        (alert.into_oob_html())
    }
    .into_response()
}

/// The state needed for downloading exported reports.
#[derive(Debug, Clone)]
pub struct DownloadState {
    pub export_dir: PathBuf,
}

impl FromRef<AppState> for DownloadState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            export_dir: state.export_dir.clone(),
        }
    }
}

/// The query parameters for downloading an exported report.
#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    #[serde(default)]
    pub file: String,
}

/// Serve an exported report as an attachment.
///
/// # Errors
///
/// Returns [Error::NotFound] if `file` is not the name of an exported report.
pub async fn download_export_endpoint(
    State(state): State<DownloadState>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, Error> {
    if !is_export_file_name(&query.file) {
        tracing::debug!("Rejected download of {:?}", query.file);
        return Err(Error::NotFound);
    }

    let path = state.export_dir.join(&query.file);
    let bytes = tokio::fs::read(&path).await.map_err(|error| {
        tracing::debug!("Could not read {}: {error}", path.display());
        Error::NotFound
    })?;

    Ok((
        [
            (CONTENT_TYPE, "application/pdf".to_owned()),
            (
                CONTENT_DISPOSITION,
                format!(
                    "attachment; filename=\"{}\"",
                    query.file.replace('"', "\\\"")
                ),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Whether `file` could have been produced by
/// [export_file_name](crate::report::export_file_name).
fn is_export_file_name(file: &str) -> bool {
    file.len() > EXPORT_FILE_SUFFIX.len()
        && file.ends_with(EXPORT_FILE_SUFFIX)
        && !file.contains(['/', '\\', '\0'])
        && !file.chars().any(char::is_whitespace)
}
