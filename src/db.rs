//! Database initialization.

use rusqlite::Connection;

use crate::{Error, record::create_record_table};

/// Create the tables for the domain models if they do not already exist.
///
/// This is safe to call every time the server starts, existing data is left
/// untouched.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    create_record_table(connection)?;

    Ok(())
}
