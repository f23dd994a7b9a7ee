//! Dairy delivery records: the store, the entry page and its endpoints.

mod create;
mod db;
mod delete;
mod domain;
mod grouping;
mod page;

pub use create::create_record_endpoint;
pub use db::{
    add_record, create_record_table, delete_record, find_records_by_customer_and_date,
    list_records_by_customer,
};
pub use delete::delete_record_endpoint;
pub use domain::{
    CustomerName, NewRecord, Record, RecordId, Shift, format_amount, format_optional_amount,
};
pub use page::get_records_page;

pub(crate) use page::load_customer_records;
