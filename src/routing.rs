//! Application router configuration.

use axum::{
    Router,
    response::{IntoResponse, Redirect, Response},
    routing::{delete, get, post},
};

use crate::{
    AppState, Error, endpoints,
    record::{create_record_endpoint, delete_record_endpoint, get_records_page},
    report::{download_export_endpoint, export_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::RECORDS_VIEW, get(get_records_page))
        .route(endpoints::RECORDS_API, post(create_record_endpoint))
        .route(endpoints::DELETE_RECORD, delete(delete_record_endpoint))
        .route(endpoints::EXPORT_API, post(export_endpoint))
        .route(endpoints::EXPORTS, get(download_export_endpoint))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the records page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::RECORDS_VIEW)
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}
