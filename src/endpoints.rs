//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/records/{record_id}', use [format_endpoint].

/// The root route which redirects to the records page.
pub const ROOT: &str = "/";
/// The page for entering and viewing a customer's records.
pub const RECORDS_VIEW: &str = "/records";
/// The route for downloading an exported PDF report.
pub const EXPORTS: &str = "/exports";

/// The route to add a record.
pub const RECORDS_API: &str = "/api/records";
/// The route to delete a single record.
pub const DELETE_RECORD: &str = "/api/records/{record_id}";
/// The route to export a customer's records as a PDF report.
pub const EXPORT_API: &str = "/api/export";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/records/{record_id}', '{record_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

/// Append `params` to `endpoint_path` as a URL-encoded query string.
pub fn with_query(endpoint_path: &str, params: &[(&str, &str)]) -> String {
    match serde_urlencoded::to_string(params) {
        Ok(query) if !query.is_empty() => format!("{endpoint_path}?{query}"),
        Ok(_) => endpoint_path.to_owned(),
        Err(error) => {
            tracing::error!("could not encode query parameters {params:?}: {error}");
            endpoint_path.to_owned()
        }
    }
}
