//! Database operations for delivery records.

use rusqlite::{Connection, Row, params};
use time::Date;

use crate::{
    Error,
    record::{NewRecord, Record, RecordId},
};

/// The number of rows changed by a statement.
pub type RowsAffected = usize;

/// Create the record table and indexes.
///
/// `AUTOINCREMENT` stops SQLite from handing out the ID of a deleted record
/// again.
pub fn create_record_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT,
            date TEXT,
            shift TEXT,
            mound REAL,
            kg REAL,
            rate REAL
        );

        CREATE INDEX IF NOT EXISTS idx_records_name_date ON records(name, date);",
    )?;

    Ok(())
}

/// Add a record and return it with its generated ID.
///
/// No validation is done here beyond what the types enforce.
pub fn add_record(new_record: &NewRecord, connection: &Connection) -> Result<Record, Error> {
    connection.execute(
        "INSERT INTO records (name, date, shift, mound, kg, rate) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            new_record.customer_name.as_ref(),
            new_record.date,
            new_record.shift,
            new_record.quantity_mound,
            new_record.quantity_kg,
            new_record.rate,
        ],
    )?;

    let id = connection.last_insert_rowid();

    Ok(Record {
        id,
        customer_name: new_record.customer_name.to_string(),
        date: new_record.date,
        shift: new_record.shift,
        quantity_mound: new_record.quantity_mound,
        quantity_kg: new_record.quantity_kg,
        rate: new_record.rate,
    })
}

/// Retrieve the records of `customer_name` on exactly `date`, in the order
/// they were added.
pub fn find_records_by_customer_and_date(
    customer_name: &str,
    date: Date,
    connection: &Connection,
) -> Result<Vec<Record>, Error> {
    connection
        .prepare(
            "SELECT id, name, date, shift, mound, kg, rate FROM records
            WHERE name = ?1 AND date = ?2 ORDER BY id ASC",
        )?
        .query_map(params![customer_name, date], map_row)?
        .map(|maybe_record| maybe_record.map_err(Error::from))
        .collect()
}

/// Retrieve all records of `customer_name` ordered by date.
///
/// Records on the same date keep the order they were added in.
pub fn list_records_by_customer(
    customer_name: &str,
    connection: &Connection,
) -> Result<Vec<Record>, Error> {
    connection
        .prepare(
            "SELECT id, name, date, shift, mound, kg, rate FROM records
            WHERE name = ?1 ORDER BY date ASC, id ASC",
        )?
        .query_map([customer_name], map_row)?
        .map(|maybe_record| maybe_record.map_err(Error::from))
        .collect()
}

/// Delete a record by ID.
///
/// Deleting an ID that does not exist is not an error, zero rows are affected.
pub fn delete_record(id: RecordId, connection: &Connection) -> Result<RowsAffected, Error> {
    connection
        .execute("DELETE FROM records WHERE id = ?1", [id])
        .map_err(Error::from)
}

fn map_row(row: &Row) -> Result<Record, rusqlite::Error> {
    Ok(Record {
        id: row.get(0)?,
        customer_name: row.get(1)?,
        date: row.get(2)?,
        shift: row.get(3)?,
        quantity_mound: row.get(4)?,
        quantity_kg: row.get(5)?,
        rate: row.get(6)?,
    })
}

#[cfg(test)]
mod record_query_tests {
    use rusqlite::Connection;
    use time::{Date, macros::date};

    use crate::record::{CustomerName, NewRecord, Record, Shift};

    use super::{
        add_record, create_record_table, delete_record, find_records_by_customer_and_date,
        list_records_by_customer,
    };

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_record_table(&connection).expect("Could not create record table");
        connection
    }

    fn new_record(name: &str, date: Date, shift: Shift, mound: f64) -> NewRecord {
        NewRecord {
            customer_name: CustomerName::new_unchecked(name),
            date,
            shift,
            quantity_mound: mound,
            quantity_kg: mound * 90.0,
            rate: 0.0,
        }
    }

    #[track_caller]
    fn must_add(record: NewRecord, connection: &Connection) -> Record {
        add_record(&record, connection).expect("Could not add test record")
    }

    #[test]
    fn add_record_succeeds() {
        let connection = get_test_db_connection();
        let new = NewRecord {
            customer_name: CustomerName::new_unchecked("Ali"),
            date: date!(2024 - 05 - 01),
            shift: Shift::Evening,
            quantity_mound: 5.0,
            quantity_kg: 450.0,
            rate: 20.5,
        };

        let record = add_record(&new, &connection).expect("Could not add record");

        assert!(record.id > 0);
        assert_eq!(
            list_records_by_customer("Ali", &connection).unwrap(),
            vec![Record {
                id: record.id,
                customer_name: "Ali".to_owned(),
                date: date!(2024 - 05 - 01),
                shift: Shift::Evening,
                quantity_mound: 5.0,
                quantity_kg: 450.0,
                rate: 20.5,
            }]
        );
    }

    #[test]
    fn date_is_stored_as_iso_text() {
        let connection = get_test_db_connection();
        let record = must_add(
            new_record("Ali", date!(2024 - 05 - 01), Shift::Morning, 1.0),
            &connection,
        );

        let stored: String = connection
            .query_row("SELECT date FROM records WHERE id = ?1", [record.id], |row| {
                row.get(0)
            })
            .unwrap();

        assert_eq!(stored, "2024-05-01");
    }

    #[test]
    fn list_orders_by_date_then_insertion() {
        let connection = get_test_db_connection();
        let late = must_add(
            new_record("Ali", date!(2024 - 05 - 03), Shift::Morning, 1.0),
            &connection,
        );
        let evening = must_add(
            new_record("Ali", date!(2024 - 05 - 01), Shift::Evening, 2.0),
            &connection,
        );
        let morning = must_add(
            new_record("Ali", date!(2024 - 05 - 01), Shift::Morning, 3.0),
            &connection,
        );

        let records = list_records_by_customer("Ali", &connection).unwrap();

        assert_eq!(records, vec![evening, morning, late]);
    }

    #[test]
    fn list_only_returns_exact_customer() {
        let connection = get_test_db_connection();
        let ali = must_add(
            new_record("Ali", date!(2024 - 05 - 01), Shift::Morning, 1.0),
            &connection,
        );
        must_add(
            new_record("ali", date!(2024 - 05 - 01), Shift::Morning, 1.0),
            &connection,
        );
        must_add(
            new_record("Ali Khan", date!(2024 - 05 - 01), Shift::Morning, 1.0),
            &connection,
        );

        let records = list_records_by_customer("Ali", &connection).unwrap();

        assert_eq!(records, vec![ali]);
    }

    #[test]
    fn list_unknown_customer_is_empty() {
        let connection = get_test_db_connection();

        let records = list_records_by_customer("Nobody", &connection).unwrap();

        assert!(records.is_empty());
    }

    #[test]
    fn find_by_customer_and_date_matches_exactly() {
        let connection = get_test_db_connection();
        let first = must_add(
            new_record("Ali", date!(2024 - 05 - 01), Shift::Morning, 1.0),
            &connection,
        );
        must_add(
            new_record("Ali", date!(2024 - 05 - 02), Shift::Morning, 1.0),
            &connection,
        );
        must_add(
            new_record("Bilal", date!(2024 - 05 - 01), Shift::Morning, 1.0),
            &connection,
        );
        let second = must_add(
            new_record("Ali", date!(2024 - 05 - 01), Shift::Evening, 2.0),
            &connection,
        );

        let records =
            find_records_by_customer_and_date("Ali", date!(2024 - 05 - 01), &connection).unwrap();

        assert_eq!(records, vec![first, second]);
    }

    #[test]
    fn find_without_match_is_empty() {
        let connection = get_test_db_connection();
        must_add(
            new_record("Ali", date!(2024 - 05 - 01), Shift::Morning, 1.0),
            &connection,
        );

        let records =
            find_records_by_customer_and_date("Ali", date!(2024 - 06 - 01), &connection).unwrap();

        assert!(records.is_empty());
    }

    #[test]
    fn delete_record_removes_only_that_record() {
        let connection = get_test_db_connection();
        let keep = must_add(
            new_record("Ali", date!(2024 - 05 - 01), Shift::Morning, 1.0),
            &connection,
        );
        let remove = must_add(
            new_record("Ali", date!(2024 - 05 - 01), Shift::Evening, 2.0),
            &connection,
        );

        let rows_affected = delete_record(remove.id, &connection).unwrap();

        assert_eq!(rows_affected, 1);
        assert_eq!(
            list_records_by_customer("Ali", &connection).unwrap(),
            vec![keep]
        );
    }

    #[test]
    fn delete_missing_record_is_a_no_op() {
        let connection = get_test_db_connection();
        let record = must_add(
            new_record("Ali", date!(2024 - 05 - 01), Shift::Morning, 1.0),
            &connection,
        );

        let rows_affected = delete_record(9999, &connection).expect("delete should not fail");

        assert_eq!(rows_affected, 0);
        assert_eq!(
            list_records_by_customer("Ali", &connection).unwrap(),
            vec![record]
        );
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let connection = get_test_db_connection();
        let first = must_add(
            new_record("Ali", date!(2024 - 05 - 01), Shift::Morning, 1.0),
            &connection,
        );
        delete_record(first.id, &connection).unwrap();

        let second = must_add(
            new_record("Ali", date!(2024 - 05 - 01), Shift::Morning, 1.0),
            &connection,
        );

        assert!(second.id > first.id);
    }

    #[test]
    fn empty_name_is_accepted_by_store() {
        let connection = get_test_db_connection();

        let record = must_add(
            new_record("", date!(2024 - 05 - 01), Shift::Morning, 1.0),
            &connection,
        );

        assert_eq!(
            list_records_by_customer("", &connection).unwrap(),
            vec![record]
        );
    }
}
