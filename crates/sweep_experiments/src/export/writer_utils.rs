use std::fs::File;
use std::path::Path;

use crate::error::ExportError;
use crate::results::ResultsTable;

pub(crate) fn ensure_not_empty(table: &ResultsTable) -> Result<(), ExportError> {
    if table.is_empty() {
        return Err(ExportError::Empty);
    }

    Ok(())
}

pub(crate) fn create_output_file(path: impl AsRef<Path>) -> Result<File, ExportError> {
    Ok(File::create(path)?)
}
