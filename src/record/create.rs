//! Record creation endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;
use serde::{Deserialize, Deserializer};
use time::Date;

use crate::{
    AppState, Error,
    alert::Alert,
    record::{
        CustomerName, NewRecord, Shift, add_record, list_records_by_customer, page::records_section,
    },
};

/// The state needed for adding a record.
#[derive(Debug, Clone)]
pub struct CreateRecordState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateRecordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for adding a record.
#[derive(Debug, Deserialize)]
pub struct RecordForm {
    pub name: String,
    pub date: Date,
    pub shift: Shift,
    pub mound: f64,
    pub kg: f64,
    /// Left blank or zero when the rate is not known yet.
    #[serde(default, deserialize_with = "blank_as_zero")]
    pub rate: f64,
}

impl RecordForm {
    /// Validate the form and convert it into a record for the store.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyCustomerName] if the name is blank, or
    /// [Error::InvalidQuantity] if a quantity or the rate is negative or not a
    /// finite number.
    pub fn into_new_record(self) -> Result<NewRecord, Error> {
        let customer_name = CustomerName::new(&self.name)?;

        for (field, value) in [("Mound", self.mound), ("Kg", self.kg), ("Rate", self.rate)] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidQuantity(field));
            }
        }

        Ok(NewRecord {
            customer_name,
            date: self.date,
            shift: self.shift,
            quantity_mound: self.mound,
            quantity_kg: self.kg,
            rate: self.rate,
        })
    }
}

fn blank_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    let text = text.trim();

    if text.is_empty() {
        return Ok(0.0);
    }

    text.parse().map_err(serde::de::Error::custom)
}

/// Handle the record form submission.
///
/// Responds with the customer's updated records and a success alert, or an
/// error alert if the form is invalid or the record could not be saved.
pub async fn create_record_endpoint(
    State(state): State<CreateRecordState>,
    Form(form): Form<RecordForm>,
) -> Response {
    let new_record = match form.into_new_record() {
        Ok(new_record) => new_record,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let record = match add_record(&new_record, &connection) {
        Ok(record) => record,
        Err(error) => {
            tracing::error!("Could not add record {new_record:?}: {error}");
            return error.into_alert_response();
        }
    };

    tracing::info!(
        "Added record {} for customer {:?}",
        record.id,
        record.customer_name
    );

    match list_records_by_customer(&record.customer_name, &connection) {
        Ok(records) => {
            let alert = Alert::SuccessSimple {
                message: "Record added successfully.".to_owned(),
            };

            html! {
                (records_section(&record.customer_name, &records))
                (alert.into_oob_html())
            }
            .into_response()
        }
        Err(error) => {
            tracing::error!(
                "Could not get records after adding record {}: {error}",
                record.id
            );
            error.into_alert_response()
        }
    }
}


#[cfg(test)]
mod create_record_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Form, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use scraper::Selector;
    use time::macros::date;

    use crate::{
        initialize_db,
        record::{Shift, list_records_by_customer},
        test_utils::{assert_valid_html, parse_html_fragment},
    };

    use super::{CreateRecordState, RecordForm, create_record_endpoint};

    fn get_test_state() -> CreateRecordState {
        let connection = Connection::open_in_memory().unwrap();
        initialize_db(&connection).unwrap();

        CreateRecordState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn form(name: &str, shift: Shift, mound: f64, kg: f64, rate: f64) -> Form<RecordForm> {
        Form(RecordForm {
            name: name.to_owned(),
            date: date!(2024 - 05 - 01),
            shift,
            mound,
            kg,
            rate,
        })
    }

    #[tokio::test]
    async fn adds_record_and_renders_updated_records() {
        let state = get_test_state();

        let response = create_record_endpoint(
            State(state.clone()),
            form("Ali", Shift::Morning, 10.0, 900.0, 0.0),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let rows = html
            .select(&Selector::parse("#records li").unwrap())
            .count();
        assert_eq!(rows, 1);
        let alert = html
            .select(&Selector::parse("#alert-container p").unwrap())
            .next()
            .expect("success alert missing")
            .text()
            .collect::<String>();
        assert_eq!(alert, "Record added successfully.");

        let connection = state.db_connection.lock().unwrap();
        let records = list_records_by_customer("Ali", &connection).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].quantity_kg, 900.0);
    }

    #[tokio::test]
    async fn second_record_on_same_date_keeps_insertion_order() {
        let state = get_test_state();
        create_record_endpoint(
            State(state.clone()),
            form("Ali", Shift::Morning, 10.0, 900.0, 0.0),
        )
        .await;

        let response = create_record_endpoint(
            State(state.clone()),
            form("Ali", Shift::Evening, 5.0, 450.0, 20.5),
        )
        .await;

        let html = parse_html_fragment(response).await;
        let shifts = html
            .select(&Selector::parse("#records li strong").unwrap())
            .map(|strong| strong.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(shifts, vec!["Shift: Morning", "Shift: Evening"]);
    }

    #[tokio::test]
    async fn empty_name_is_rejected_without_touching_store() {
        let state = get_test_state();

        let response = create_record_endpoint(
            State(state.clone()),
            form("", Shift::Morning, 1.0, 1.0, 0.0),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = parse_html_fragment(response).await;
        let message = html
            .select(&Selector::parse("p").unwrap())
            .next()
            .expect("error message missing")
            .text()
            .collect::<String>();
        assert_eq!(message, "Please enter a customer name");

        let connection = state.db_connection.lock().unwrap();
        let count: i64 = connection
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn storage_failure_is_shown_as_alert() {
        let state = get_test_state();
        state
            .db_connection
            .lock()
            .unwrap()
            .execute("DROP TABLE records", [])
            .unwrap();

        let response =
            create_record_endpoint(State(state), form("Ali", Shift::Morning, 1.0, 1.0, 0.0)).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
    }
}
