//! Writing customer reports to the export directory.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use tempfile::Builder;

use crate::{
    Error,
    record::Record,
    report::{model::Report, pdf::render_report},
};

/// The suffix of every exported file name.
pub const EXPORT_FILE_SUFFIX: &str = "_dairy.pdf";

/// The name of the PDF file exported for `customer_name`.
///
/// Whitespace, path separators and NUL are replaced with underscores so the
/// name is a single path component.
pub fn export_file_name(customer_name: &str) -> String {
    let stem: String = customer_name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect();

    format!("{stem}{EXPORT_FILE_SUFFIX}")
}

/// Render a PDF report of `records` for `customer_name` into `export_dir`.
///
/// Records are printed in the order given. An existing report for the same
/// customer is replaced.
///
/// # Errors
///
/// Returns [Error::ReportError] if the directory or file could not be
/// written. No partial file is left behind in that case.
pub fn generate_report(
    export_dir: &Path,
    customer_name: &str,
    records: &[Record],
) -> Result<PathBuf, Error> {
    let report = Report::new(customer_name, records);
    let bytes = render_report(&report);
    let path = export_dir.join(export_file_name(customer_name));

    write_atomic_file(&path, &bytes)?;

    tracing::info!(
        "Exported {} records for customer {:?} to {}",
        records.len(),
        customer_name,
        path.display()
    );

    Ok(path)
}

/// Write `bytes` to a hidden temporary file next to `path`, then move it into
/// place.
///
/// Every call gets its own temporary file, so concurrent exports of the same
/// report do not interfere. The last one to finish wins.
fn write_atomic_file(path: &Path, bytes: &[u8]) -> Result<(), Error> {
    let parent = path
        .parent()
        .ok_or_else(|| Error::ReportError("export path has no parent directory".to_owned()))?;
    fs::create_dir_all(parent).map_err(|error| {
        Error::ReportError(format!(
            "could not create export directory {}: {error}",
            parent.display()
        ))
    })?;

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("report");

    // The temporary file is deleted when it is dropped without being persisted.
    let mut tmp = Builder::new()
        .prefix(&format!(".{file_name}."))
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(|error| Error::ReportError(format!("could not create report file: {error}")))?;

    tmp.write_all(bytes)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|error| Error::ReportError(format!("could not write report: {error}")))?;

    tmp.persist(path).map_err(|error| {
        Error::ReportError(format!("could not move report into place: {}", error.error))
    })?;

    Ok(())
}
