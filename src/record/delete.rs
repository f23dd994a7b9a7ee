//! Record deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, Query, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    record::{
        RecordId, delete_record,
        page::{CustomerQuery, load_customer_records, records_section},
    },
};

/// The state needed for deleting a record.
#[derive(Debug, Clone)]
pub struct DeleteRecordState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteRecordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Delete a record and respond with the remaining records of the customer
/// named in the query.
///
/// A record that has already been deleted is not an error, the records are
/// rendered again so the page catches up with the database.
pub async fn delete_record_endpoint(
    Path(record_id): Path<RecordId>,
    Query(query): Query<CustomerQuery>,
    State(state): State<DeleteRecordState>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let rows_affected = match delete_record(record_id, &connection) {
        Ok(rows_affected) => rows_affected,
        Err(error) => {
            tracing::error!("Could not delete record {record_id}: {error}");
            return error.into_alert_response();
        }
    };

    if rows_affected == 0 {
        tracing::debug!("Record {record_id} was already deleted");
    }

    match load_customer_records(&query.name, &connection) {
        Ok(records) => {
            let alert = (rows_affected != 0).then(|| Alert::SuccessSimple {
                message: "Record deleted.".to_owned(),
            });

            html! {
                (records_section(&query.name, &records))

                @if let Some(alert) = alert {
                    (alert.into_oob_html())
                }
            }
            .into_response()
        }
        Err(error) => {
            tracing::error!("Could not get records after deleting record {record_id}: {error}");
            error.into_alert_response()
        }
    }
}
