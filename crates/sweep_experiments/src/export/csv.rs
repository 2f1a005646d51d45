use crate::error::ExportError;
use crate::metrics::ResultRecord;
use crate::results::ResultsTable;

pub(crate) fn export_to_csv_impl(
    table: &ResultsTable,
    file: std::fs::File,
) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(file);

    let header = table
        .key_columns()
        .iter()
        .map(String::as_str)
        .chain(ResultRecord::COLUMNS);
    wtr.write_record(header)?;

    for row in table.rows() {
        let fields = row
            .key
            .iter()
            .map(ToString::to_string)
            .chain(row.record.field_strings());
        wtr.write_record(fields)?;
    }

    wtr.flush()?;
    Ok(())
}
