//! Delimited text export of the current view.
//!
//! Output is UTF-8 with a leading byte-order mark and `;` as the separator,
//! which spreadsheet software in Turkish locales opens with the right
//! characters and columns.

use rpt_core::ResultRow;
use std::io::Write;

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Write a header and one line per row; cells use the same text as search.
pub fn export_delimited<W: Write>(
    writer: W,
    columns: &[String],
    rows: &[&ResultRow],
) -> anyhow::Result<()> {
    let mut writer = writer;
    writer.write_all(BOM)?;

    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(writer);
    wtr.write_record(columns)?;
    for row in rows {
        wtr.write_record(columns.iter().map(|c| row.get(c).to_string()))?;
    }
    wtr.flush()?;
    log::info!(
        "[RPT Debug] export: wrote {} rows x {} columns",
        rows.len(),
        columns.len()
    );
    Ok(())
}

/// Export into an in-memory string.
pub fn export_delimited_string(columns: &[String], rows: &[&ResultRow]) -> anyhow::Result<String> {
    let mut buf = Vec::new();
    export_delimited(&mut buf, columns, rows)?;
    Ok(String::from_utf8(buf)?)
}
