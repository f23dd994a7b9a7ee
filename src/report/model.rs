//! The contents of a customer report, formatted and ready to lay out.

use crate::record::{Record, format_amount, format_optional_amount};

/// The title printed at the top of every report.
pub const REPORT_TITLE: &str = "Dairy Delivery Record";

/// The table column headings, in the order they are printed.
pub const COLUMN_HEADERS: [&str; 6] = ["Date", "Shift", "Mound", "Kg", "Rate", "Total"];

/// One table row of a report, every cell already formatted.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    /// The delivery date, "YYYY-MM-DD".
    pub date: String,
    /// "Morning" or "Evening".
    pub shift: String,
    /// The quantity in mounds.
    pub mound: String,
    /// The quantity in kilograms.
    pub kg: String,
    /// "N/A" when the rate has not been set.
    pub rate: String,
    /// "N/A" when the rate has not been set.
    pub total: String,
}

impl ReportRow {
    /// The cells in the order of [COLUMN_HEADERS].
    pub fn cells(&self) -> [&str; 6] {
        [
            self.date.as_str(),
            self.shift.as_str(),
            self.mound.as_str(),
            self.kg.as_str(),
            self.rate.as_str(),
            self.total.as_str(),
        ]
    }
}

impl From<&Record> for ReportRow {
    fn from(record: &Record) -> Self {
        Self {
            date: record.date.to_string(),
            shift: record.shift.to_string(),
            mound: format_amount(record.quantity_mound),
            kg: format_amount(record.quantity_kg),
            rate: format_optional_amount(record.rate()),
            total: format_optional_amount(record.total()),
        }
    }
}

/// A summary of one customer's deliveries.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// The customer name exactly as entered.
    pub customer_name: String,
    /// The rows in the same order as the records the report was built from.
    pub rows: Vec<ReportRow>,
    /// The sum of the mounds of every record.
    pub total_mound: f64,
    /// The sum of the kilograms of every record.
    pub total_kg: f64,
}

impl Report {
    /// Build a report from `records`.
    ///
    /// The records are not sorted, callers pass them in the order they should
    /// be printed.
    pub fn new(customer_name: &str, records: &[Record]) -> Self {
        Self {
            customer_name: customer_name.to_owned(),
            rows: records.iter().map(ReportRow::from).collect(),
            total_mound: records
                .iter()
                .fold(0.0, |sum, record| sum + record.quantity_mound),
            total_kg: records
                .iter()
                .fold(0.0, |sum, record| sum + record.quantity_kg),
        }
    }

    /// The line printed under the title.
    pub fn customer_line(&self) -> String {
        format!("Customer Name: {}", self.customer_name)
    }

    /// The totals printed after the table.
    pub fn summary_lines(&self) -> [String; 2] {
        [
            format!("Total Mound: {}", format_amount(self.total_mound)),
            format!("Total Kg: {}", format_amount(self.total_kg)),
        ]
    }
}
