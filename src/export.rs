use crate::table::MatchStatTable;
use anyhow::Result;
use csv::Writer;
use polars::prelude::ParquetWriter;
use std::fs::{self, File};
use std::path::Path;

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// One header line, then one line per row. Nulls are written as empty fields.
pub fn write_csv(table: &MatchStatTable, out_file: &Path) -> Result<()> {
    ensure_parent(out_file)?;

    let mut writer = Writer::from_path(out_file)?;
    writer.write_record(table.columns().iter().map(|c| c.name))?;

    for row in 0..table.row_count() {
        let record = table.columns().iter().map(|column| {
            column.values[row]
                .as_ref()
                .map(|cell| cell.to_string())
                .unwrap_or_default()
        });
        writer.write_record(record)?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_parquet(table: &MatchStatTable, out_parquet: &Path) -> Result<()> {
    ensure_parent(out_parquet)?;

    let mut df = table.to_dataframe()?;
    let mut file = File::create(out_parquet)?;
    ParquetWriter::new(&mut file).finish(&mut df)?;

    Ok(())
}
