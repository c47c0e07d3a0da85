//! CSV output of records.

use crate::pipeline::error::PipelineError;
use crate::pipeline::record::Record;
use csv::WriterBuilder;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Returns `true` if every path exists as a non-empty file.
pub fn outputs_exist(paths: &[PathBuf]) -> bool {
    !paths.is_empty()
        && paths
            .iter()
            .all(|path| std::fs::metadata(path).is_ok_and(|meta| meta.is_file() && meta.len() > 0))
}

/// Writes records as CSV with a header row.
///
/// The columns are the union of all record fields in first-seen order;
/// fields a record lacks are left empty. Nothing but the header is known
/// for an empty slice, so no file content is written then.
pub fn write_records<W: Write>(out: W, records: &[Record]) -> Result<(), PipelineError> {
    let mut columns: Vec<&str> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !columns.contains(&key) {
                columns.push(key);
            }
        }
    }

    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(out);
    if columns.is_empty() {
        wtr.flush().map_err(csv::Error::from)?;
        return Ok(());
    }
    wtr.write_record(&columns)?;
    for record in records {
        wtr.write_record(
            columns
                .iter()
                .map(|column| record.get(column).map(ToString::to_string).unwrap_or_default()),
        )?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Writes records to a CSV file, creating its parent directory.
pub fn write_records_to_path<P: AsRef<Path>>(path: P, records: &[Record]) -> Result<(), PipelineError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }
    let file = std::fs::File::create(path).map_err(|e| PipelineError::io(path, e))?;
    write_records(std::io::BufWriter::new(file), records)
}
