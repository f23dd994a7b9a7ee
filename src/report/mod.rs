//! PDF reports of a customer's deliveries.

mod endpoint;
mod export;
mod model;
mod pdf;

pub use endpoint::{download_export_endpoint, export_endpoint};
pub use export::{export_file_name, generate_report};
pub use model::Report;
