// src/table/mod.rs

use anyhow::{anyhow, bail, Context, Result};
use arrow::{
    array::{Array, ArrayRef, Int32Array, Int64Builder, StringArray, StringBuilder},
    datatypes::{DataType, Field, Schema, SchemaRef},
    record_batch::RecordBatch,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::extract::fields::{columns, Contribution, FilingRecord, COL_BUSINESS_NAME, COL_TAX_YEAR};

pub mod check;
pub mod io;

pub use check::find_inconsistent_rows;

/// Composite key of a cleaned table: `<EIN>_<Tax Year>`.
pub const INDEX_COLUMN: &str = "EIN_YEAR";

/// Columns cast to integers by [`FilingTable::clean`], `EIN` through `Total`.
fn numeric_columns() -> impl Iterator<Item = &'static str> {
    columns().skip(1)
}

/// Filing rows as an Arrow batch, optionally keyed by one of its columns.
#[derive(Debug, Clone, PartialEq)]
pub struct FilingTable {
    batch: RecordBatch,
    index: Option<String>,
}

impl FilingTable {
    /// Schema of an uncleaned table: text everywhere except `Tax Year`.
    pub fn raw_schema() -> SchemaRef {
        let fields: Vec<Field> = columns()
            .map(|name| {
                let dt = if name == COL_TAX_YEAR {
                    DataType::Int32
                } else {
                    DataType::Utf8
                };
                Field::new(name, dt, true)
            })
            .collect();
        Arc::new(Schema::new(fields))
    }

    /// Schema after cleaning: key first, name as text, the rest as integers.
    pub fn clean_schema() -> SchemaRef {
        let mut fields = vec![
            Field::new(INDEX_COLUMN, DataType::Utf8, false),
            Field::new(COL_BUSINESS_NAME, DataType::Utf8, false),
        ];
        fields.extend(numeric_columns().map(|name| Field::new(name, DataType::Int64, false)));
        Arc::new(Schema::new(fields))
    }

    /// One row per extraction attempt; a failed extraction is an all-null row.
    pub fn from_records(rows: &[Option<FilingRecord>]) -> Result<Self> {
        let mut cols: Vec<ArrayRef> = vec![
            text_column(rows, |r| r.business_name.as_str()),
            text_column(rows, |r| r.ein.as_str()),
            Arc::new(
                rows.iter()
                    .map(|r| r.as_ref().and_then(|r| r.tax_year))
                    .collect::<Int32Array>(),
            ),
            text_column(rows, |r| r.zip_code.as_str()),
        ];
        for c in Contribution::ALL {
            cols.push(text_column(rows, move |r| &r.amounts[c]));
        }

        let batch = RecordBatch::try_new(Self::raw_schema(), cols)
            .context("building filing batch")?;
        Ok(Self { batch, index: None })
    }

    /// Wrap an existing batch, checking that the index column is a text column.
    pub fn from_parts(batch: RecordBatch, index: Option<String>) -> Result<Self> {
        if let Some(name) = &index {
            let col = batch
                .column_by_name(name)
                .ok_or_else(|| anyhow!("index column '{}' not in table", name))?;
            if col.data_type() != &DataType::Utf8 {
                bail!("index column '{}' is {}, expected Utf8", name, col.data_type());
            }
        }
        Ok(Self { batch, index })
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn into_batch(self) -> RecordBatch {
        self.batch
    }

    pub fn index_column(&self) -> Option<&str> {
        self.index.as_deref()
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    /// Row labels: the index column's values, or positions when unindexed.
    pub fn keys(&self) -> Result<Vec<String>> {
        match &self.index {
            Some(name) => Ok(string_column(&self.batch, name)?
                .iter()
                .map(|v| v.unwrap_or_default().to_string())
                .collect()),
            None => Ok((0..self.num_rows()).map(|i| i.to_string()).collect()),
        }
    }

    /// Drop rows with any missing value, cast `EIN` through `Total` to
    /// integers and key rows by `EIN_YEAR`.
    ///
    /// Rows whose numeric text does not parse as an integer are dropped too.
    pub fn clean(&self) -> Result<FilingTable> {
        if self.index.is_some() {
            bail!("table is already cleaned");
        }
        let batch = &self.batch;
        let names = string_column(batch, COL_BUSINESS_NAME)?;
        let years = batch
            .column_by_name(COL_TAX_YEAR)
            .and_then(|a| a.as_any().downcast_ref::<Int32Array>())
            .ok_or_else(|| anyhow!("column '{}' missing or not Int32", COL_TAX_YEAR))?;
        let text_numbers: Vec<(&str, &StringArray)> = numeric_columns()
            .filter(|name| *name != COL_TAX_YEAR)
            .map(|name| string_column(batch, name).map(|a| (name, a)))
            .collect::<Result<_>>()?;

        let mut key_b = StringBuilder::new();
        let mut name_b = StringBuilder::new();
        let mut number_b: Vec<Int64Builder> =
            numeric_columns().map(|_| Int64Builder::new()).collect();

        let mut dropped = 0usize;
        'rows: for row in 0..batch.num_rows() {
            if batch.columns().iter().any(|c| c.is_null(row)) {
                dropped += 1;
                continue;
            }
            let mut parsed = Vec::with_capacity(text_numbers.len());
            for (name, arr) in &text_numbers {
                match arr.value(row).trim().parse::<i64>() {
                    Ok(v) => parsed.push(v),
                    Err(_) => {
                        warn!(
                            row,
                            column = name,
                            value = arr.value(row),
                            "not an integer, dropping row"
                        );
                        dropped += 1;
                        continue 'rows;
                    }
                }
            }
            let year = i64::from(years.value(row));
            let ein = parsed[0];

            key_b.append_value(format!("{}_{}", ein, year));
            name_b.append_value(names.value(row));
            // numeric_columns order: EIN, Tax Year, Zipcode, amounts...
            number_b[0].append_value(ein);
            number_b[1].append_value(year);
            for (b, v) in number_b[2..].iter_mut().zip(&parsed[1..]) {
                b.append_value(*v);
            }
        }

        let mut cols: Vec<ArrayRef> = vec![Arc::new(key_b.finish()), Arc::new(name_b.finish())];
        cols.extend(
            number_b
                .iter_mut()
                .map(|b| Arc::new(b.finish()) as ArrayRef),
        );
        let cleaned = RecordBatch::try_new(Self::clean_schema(), cols)
            .context("building cleaned filing batch")?;

        info!(kept = cleaned.num_rows(), dropped, "cleaned filing table");
        Ok(FilingTable {
            batch: cleaned,
            index: Some(INDEX_COLUMN.to_string()),
        })
    }
}

fn text_column(rows: &[Option<FilingRecord>], f: impl Fn(&FilingRecord) -> &str) -> ArrayRef {
    Arc::new(
        rows.iter()
            .map(|r| r.as_ref().map(&f))
            .collect::<StringArray>(),
    )
}

pub(crate) fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|a| a.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| anyhow!("column '{}' missing or not Utf8", name))
}
