// src/table/io.rs

use anyhow::{Context, Result};
use arrow::{compute::concat_batches, datatypes::Schema, record_batch::RecordBatch};
use parquet::{
    arrow::{arrow_reader::ParquetRecordBatchReaderBuilder, ArrowWriter},
    basic::Compression,
    file::properties::WriterProperties,
};
use serde::Serialize;
use std::{
    collections::HashMap,
    fs::{self, File},
    io::Write,
    path::Path,
    sync::Arc,
};
use tracing::info;

use super::FilingTable;

/// Schema metadata key recording which column is the row index.
pub const INDEX_METADATA_KEY: &str = "form990.index";

/// Write a table as one Snappy-compressed Parquet file, remembering its index.
pub fn write_parquet(table: &FilingTable, path: impl AsRef<Path>) -> Result<()> {
    let batch = table.batch();
    let mut metadata: HashMap<String, String> = batch.schema().metadata().clone();
    if let Some(index) = table.index_column() {
        metadata.insert(INDEX_METADATA_KEY.to_string(), index.to_string());
    }
    let schema = Schema::new_with_metadata(batch.schema().fields().clone(), metadata);
    let batch = batch
        .clone()
        .with_schema(Arc::new(schema))
        .context("attaching index metadata")?;
    write_batch_parquet(&batch, path)
}

/// Write any record batch as a Snappy-compressed Parquet file.
pub fn write_batch_parquet(batch: &RecordBatch, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
        .context("creating Arrow writer")?;
    writer.write(batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    info!(path = %path.display(), rows = batch.num_rows(), "wrote parquet");
    Ok(())
}

/// Read a table written by [`write_parquet`], restoring its index.
pub fn read_parquet(path: impl AsRef<Path>) -> Result<FilingTable> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .with_context(|| format!("reading parquet metadata from {}", path.display()))?;
    let schema = builder.schema().clone();
    let reader = builder.build().context("building parquet reader")?;

    let batches = reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("reading batches from {}", path.display()))?;
    let batch = concat_batches(&schema, &batches).context("concatenating batches")?;
    let index = schema.metadata().get(INDEX_METADATA_KEY).cloned();
    FilingTable::from_parts(batch, index)
}

/// One JSON object per line.
pub fn write_json_lines<T: Serialize, W: Write>(records: &[T], mut writer: W) -> Result<()> {
    for record in records {
        serde_json::to_writer(&mut writer, record).context("serializing record")?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
