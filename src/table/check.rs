// src/table/check.rs

use anyhow::{anyhow, Context, Result};
use arrow::{
    array::{Array, Int64Array, StringArray},
    compute::cast,
    datatypes::DataType,
};

use super::FilingTable;
use crate::extract::Contribution;

/// Keys of rows whose six contribution categories do not add up to `Total`.
///
/// Works on raw (text) and cleaned (integer) tables alike. A missing
/// category counts as zero; a missing or non-numeric `Total` never matches.
pub fn find_inconsistent_rows(table: &FilingTable) -> Result<Vec<String>> {
    let categories: Vec<Int64Array> = Contribution::CATEGORIES
        .iter()
        .map(|c| as_int64(table, c.column()))
        .collect::<Result<_>>()?;
    let total = as_int64(table, Contribution::Total.column())?;
    let keys = table.keys()?;

    let mismatched = (0..table.num_rows())
        .filter(|&row| {
            let sum: i128 = categories
                .iter()
                .filter(|col| col.is_valid(row))
                .map(|col| i128::from(col.value(row)))
                .sum();
            !total.is_valid(row) || sum != i128::from(total.value(row))
        })
        .map(|row| keys[row].clone())
        .collect();
    Ok(mismatched)
}

fn as_int64(table: &FilingTable, name: &str) -> Result<Int64Array> {
    let col = table
        .batch()
        .column_by_name(name)
        .ok_or_else(|| anyhow!("column '{}' not in table", name))?;
    let cast_col = match col.as_any().downcast_ref::<StringArray>() {
        Some(text) => {
            let trimmed: StringArray = text.iter().map(|v| v.map(str::trim)).collect();
            cast(&trimmed, &DataType::Int64)
        }
        None => cast(col.as_ref(), &DataType::Int64),
    }
    .with_context(|| format!("casting '{}'", name))?;

    cast_col
        .as_any()
        .downcast_ref::<Int64Array>()
        .cloned()
        .ok_or_else(|| anyhow!("column '{}' did not cast to Int64", name))
}
