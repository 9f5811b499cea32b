//! LazyFrame materialization helpers with column validation
//!
//! Provides safe, explicit patterns for pulling typed columns out of Polars
//! frames so a table export with a missing or oddly-typed column fails loudly
//! at load time instead of producing silent nulls later.

use polars::prelude::*;
use anyhow::{Context, Result, anyhow};
use std::collections::HashSet;

/// Materialize LazyFrame with explicit column list and validation
///
/// # Arguments
/// * `lazy` - LazyFrame to materialize
/// * `columns` - Required column names
/// * `context` - Context for error messages (e.g., "dogs table")
///
/// # Errors
/// Returns error if materialization fails or any required column is missing.
pub fn materialize_with_columns(
    lazy: &LazyFrame,
    columns: &[&str],
    context: &str,
) -> Result<DataFrame> {
    let col_exprs: Vec<Expr> = columns.iter()
        .map(|&name| col(name))
        .collect();

    let df = lazy
        .clone()
        .select(&col_exprs)
        .collect()
        .with_context(|| format!("{}: Failed to materialize columns {:?}", context, columns))?;

    let actual_cols: HashSet<String> = df.get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    for &expected in columns {
        if !actual_cols.contains(expected) {
            return Err(anyhow!(
                "{}: Missing expected column '{}'. Available columns: {:?}",
                context, expected, actual_cols
            ));
        }
    }

    Ok(df)
}

/// Read a column as optional strings (non-string columns are cast)
pub fn str_values(df: &DataFrame, name: &str, context: &str) -> Result<Vec<Option<String>>> {
    let column = df.column(name)
        .with_context(|| format!("{}: Missing {} column", context, name))?;

    let casted = column.cast(&DataType::String)
        .with_context(|| format!("{}: Column '{}' cannot be read as text", context, name))?;

    Ok(casted.str()?
        .into_iter()
        .map(|opt| opt.map(|s| s.to_string()))
        .collect())
}

/// Read a column as optional f64 (integer and numeric-text columns are cast)
pub fn f64_values(df: &DataFrame, name: &str, context: &str) -> Result<Vec<Option<f64>>> {
    let column = df.column(name)
        .with_context(|| format!("{}: Missing {} column", context, name))?;

    let casted = column.cast(&DataType::Float64)
        .with_context(|| format!("{}: Column '{}' is not numeric", context, name))?;

    Ok(casted.f64()?.into_iter().collect())
}

/// Read a column as optional i64 ids
///
/// Float-encoded ids (common in CSV exports with nulls) are accepted when integral.
pub fn i64_values(df: &DataFrame, name: &str, context: &str) -> Result<Vec<Option<i64>>> {
    f64_values(df, name, context)?
        .into_iter()
        .map(|opt| match opt {
            Some(v) if v.fract() == 0.0 => Ok(Some(v as i64)),
            Some(v) => Err(anyhow!("{}: Column '{}' holds non-integer id {}", context, name, v)),
            None => Ok(None),
        })
        .collect()
}

/// Read a column as optional booleans
///
/// Handles native boolean columns, 0/1 integers and `true/false`, `t/f`,
/// `yes/no` text. Unrecognised text is treated as missing.
pub fn bool_values(df: &DataFrame, name: &str, context: &str) -> Result<Vec<Option<bool>>> {
    let column = df.column(name)
        .with_context(|| format!("{}: Missing {} column", context, name))?;

    if let Ok(bools) = column.bool() {
        return Ok(bools.into_iter().collect());
    }

    let numeric = matches!(
        column.dtype(),
        DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64
            | DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64
            | DataType::Float32 | DataType::Float64
    );
    if numeric {
        let casted = column.cast(&DataType::Float64)?;
        return Ok(casted.f64()?
            .into_iter()
            .map(|opt| opt.map(|v| v != 0.0))
            .collect());
    }

    Ok(str_values(df, name, context)?
        .into_iter()
        .map(|opt| opt.and_then(|s| parse_bool(&s)))
        .collect())
}

/// Lenient boolean parsing for text-encoded table columns
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Some(true),
        "false" | "f" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}
