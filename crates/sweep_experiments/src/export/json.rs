use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use super::SweepArchive;
use crate::error::ExportError;

pub(crate) fn save_archive_impl(archive: &SweepArchive, file: File) -> Result<(), ExportError> {
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, archive)?;
    writer.flush()?;
    Ok(())
}

pub(crate) fn load_archive_impl(file: File) -> Result<SweepArchive, ExportError> {
    Ok(serde_json::from_reader(BufReader::new(file))?)
}
