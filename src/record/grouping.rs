//! Groups records under date headings for display.

use time::Date;

use crate::record::Record;

/// The records delivered on a single date.
#[derive(Debug, PartialEq)]
pub(crate) struct DayGroup<'a> {
    pub(crate) date: Date,
    pub(crate) records: Vec<&'a Record>,
}

/// Start a new group every time the date changes from the previous record.
///
/// `records` is expected to already be sorted by date. The order of the
/// records is kept as is, so unsorted input yields repeated dates.
pub(crate) fn group_records_by_date(records: &[Record]) -> Vec<DayGroup<'_>> {
    let mut days: Vec<DayGroup<'_>> = Vec::new();

    for record in records {
        match days.last_mut() {
            Some(current) if current.date == record.date => current.records.push(record),
            _ => days.push(DayGroup {
                date: record.date,
                records: vec![record],
            }),
        }
    }

    days
}
