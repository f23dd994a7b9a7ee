//! The record entry page and the records section shared by the record endpoints.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use axum_htmx::HxRequest;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error, endpoints,
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_CONTAINER_STYLE,
        FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, base, loading_spinner,
    },
    record::{
        Record, Shift, format_amount, format_optional_amount, grouping::group_records_by_date,
        list_records_by_customer,
    },
    timezone::today,
};

/// The state needed for the records page.
#[derive(Debug, Clone)]
pub struct RecordsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for RecordsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Selects whose records to show.
#[derive(Debug, Default, Deserialize)]
pub struct CustomerQuery {
    #[serde(default)]
    pub name: String,
}

/// Render the record entry form and the records of the customer in the query.
///
/// Requests made by htmx only get the records section.
pub async fn get_records_page(
    State(state): State<RecordsPageState>,
    HxRequest(is_htmx_request): HxRequest,
    Query(query): Query<CustomerQuery>,
) -> Result<Response, Error> {
    let today = today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let records = load_customer_records(&query.name, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve records: {error}"))?;

    if is_htmx_request {
        return Ok(records_section(&query.name, &records).into_response());
    }

    let page = records_page_view(&query.name, today, &records);

    Ok(page.into_response())
}

/// Get the records of `name`, or nothing if no name has been entered.
pub(crate) fn load_customer_records(
    name: &str,
    connection: &Connection,
) -> Result<Vec<Record>, Error> {
    if name.trim().is_empty() {
        return Ok(Vec::new());
    }

    list_records_by_customer(name, connection)
}

fn records_page_view(name: &str, today: Date, records: &[Record]) -> Markup {
    let content = html!(
        main class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-6" { "Dairy Entry" }

            div class=(FORM_CONTAINER_STYLE) { (record_form_view(name, today)) }

            (records_section(name, records))
        }
    );

    base("Records", &content)
}

fn record_form_view(name: &str, today: Date) -> Markup {
    html! {
        form
            hx-post=(endpoints::RECORDS_API)
            hx-target="#records"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Customer Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Customer Name"
                    value=(name)
                    required
                    autofocus
                    hx-get=(endpoints::RECORDS_VIEW)
                    hx-trigger="input changed delay:300ms"
                    hx-select="#records"
                    hx-target="#records"
                    hx-swap="outerHTML"
                    hx-push-url="true"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                input
                    id="date"
                    type="date"
                    name="date"
                    value=(today)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            fieldset class="space-y-2"
            {
                legend class=(FORM_LABEL_STYLE) { "Shift" }

                div class=(FORM_RADIO_GROUP_STYLE)
                {
                    @for shift in Shift::ALL {
                        @let id = format!("shift-{}", shift.as_str().to_lowercase());

                        div class="flex items-center gap-3"
                        {
                            input
                                name="shift"
                                id=(id)
                                type="radio"
                                value=(shift)
                                checked[shift == Shift::default()]
                                required
                                class=(FORM_RADIO_INPUT_STYLE);

                            label for=(id) class=(FORM_RADIO_LABEL_STYLE) { (shift) }
                        }
                    }
                }
            }

            (quantity_input("mound", "Mound", true))
            (quantity_input("kg", "Kg", true))
            (quantity_input("rate", "Rate (optional)", false))

            button type="submit" id="indicator" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="htmx-indicator" { (loading_spinner()) }
                "Add Entry"
            }
        }
    }
}

fn quantity_input(name: &str, label: &str, required: bool) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            input
                id=(name)
                type="number"
                name=(name)
                min="0"
                step="0.01"
                value="0.00"
                required[required]
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}

/// The records of one customer grouped by date.
///
/// Endpoints that change records respond with this section so the page always
/// shows what is in the database.
pub(crate) fn records_section(name: &str, records: &[Record]) -> Markup {
    html! {
        section id="records" class="w-full max-w-md mt-8 space-y-4"
        {
            @if name.trim().is_empty() {
                p class="text-gray-500 dark:text-gray-400"
                {
                    "Please enter a customer name to see records."
                }
            } @else if records.is_empty() {
                p class="text-gray-500 dark:text-gray-400"
                {
                    "No records found for this customer."
                }
            } @else {
                h2 class="text-xl font-bold" { "Saved Records for " (name) }

                @for day in group_records_by_date(records) {
                    div class="space-y-2"
                    {
                        h3 class="text-lg font-semibold" { "Date: " (day.date) }

                        ul class="space-y-1"
                        {
                            @for record in day.records {
                                (record_row(name, record))
                            }
                        }
                    }
                }

                (export_form(name))

                div id="export-result" {}
            }
        }
    }
}

fn record_row(name: &str, record: &Record) -> Markup {
    let delete_url = endpoints::format_endpoint(endpoints::DELETE_RECORD, record.id);
    let hx_vals = serde_json::json!({ "name": name }).to_string();

    html! {
        li class="flex justify-between gap-4" data-record-id=(record.id)
        {
            span
            {
                strong { "Shift: " (record.shift) }
                ", Mound: " (format_amount(record.quantity_mound))
                ", Kg: " (format_amount(record.quantity_kg))
                ", Rate: " (format_optional_amount(record.rate()))
            }

            button
                type="button"
                hx-delete=(delete_url)
                hx-vals=(hx_vals)
                hx-confirm="Are you sure you want to delete this record?"
                hx-target="#records"
                hx-swap="outerHTML"
                hx-target-error="#alert-container"
                class=(BUTTON_DELETE_STYLE)
            {
                "Delete"
            }
        }
    }
}

fn export_form(name: &str) -> Markup {
    html! {
        form
            hx-post=(endpoints::EXPORT_API)
            hx-target="#export-result"
            hx-target-error="#alert-container"
        {
            input type="hidden" name="name" value=(name);

            button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Export PDF" }
        }
    }
}
