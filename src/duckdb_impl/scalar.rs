//! Shared DuckDB scalar invoke helpers.
//!
//! These helpers centralize the per-row boilerplate of the movetext scalars:
//! flat vector access, NULL checks, `duckdb_string_t` decoding and output
//! insertion.
//!
//! # Safety
//! These helpers MUST only be called from within a DuckDB scalar `invoke()` while the
//! underlying vectors are valid.
//!
//! Callers MUST ensure the input/output column logical types match the helper being used
//! (`VARCHAR` inputs for `duckdb_string_t`, `UBIGINT` outputs for `u64`, etc.).

use std::error::Error;
use std::ffi::CString;

use duckdb::{
    Result,
    core::{DataChunkHandle, FlatVector, Inserter, LogicalTypeId},
    vtab::arrow::WritableVector,
};
use libduckdb_sys::duckdb_string_t;

use super::string::decode_movetext;

#[derive(Debug, Clone)]
pub enum VarcharOutput {
    Null,
    Value(String),
}

fn ensure_type(
    vec: &FlatVector,
    expected: LogicalTypeId,
    label: &str,
) -> Result<(), Box<dyn Error>> {
    let actual = vec.logical_type().id();
    if actual != expected {
        return Err(format!(
            "scalar helper type mismatch: {label} expected {expected:?}, got {actual:?}"
        )
        .into());
    }
    Ok(())
}

/// Invoke a unary `VARCHAR -> VARCHAR` scalar. NULL rows stay NULL.
pub fn invoke_unary_varchar_to_varchar<F>(
    input: &DataChunkHandle,
    output: &mut dyn WritableVector,
    mut f: F,
) -> Result<(), Box<dyn Error>>
where
    F: FnMut(&str) -> VarcharOutput,
{
    let len = input.len();
    let input_vec = input.flat_vector(0);
    ensure_type(&input_vec, LogicalTypeId::Varchar, "input[0]")?;
    let input_slice = input_vec.as_slice::<duckdb_string_t>();
    let mut output_vec = output.flat_vector();
    ensure_type(&output_vec, LogicalTypeId::Varchar, "output")?;

    for (i, s) in input_slice.iter().take(len).enumerate() {
        if input_vec.row_is_null(i as u64) {
            output_vec.set_null(i);
            continue;
        }

        // SAFETY: Row nullability is checked above.
        let movetext = unsafe { decode_movetext(s) };
        match f(&movetext) {
            VarcharOutput::Null => output_vec.set_null(i),
            VarcharOutput::Value(v) => output_vec.insert(i, CString::new(v)?),
        }
    }

    Ok(())
}

/// Invoke a unary `VARCHAR -> UBIGINT` scalar.
///
/// This helper outputs NULL when the input row is NULL or when `f` returns `None`.
pub fn invoke_unary_varchar_to_u64_nullable<F>(
    input: &DataChunkHandle,
    output: &mut dyn WritableVector,
    mut f: F,
) -> Result<(), Box<dyn Error>>
where
    F: FnMut(&str) -> Option<u64>,
{
    let len = input.len();
    let input_vec = input.flat_vector(0);
    ensure_type(&input_vec, LogicalTypeId::Varchar, "input[0]")?;
    let input_slice = input_vec.as_slice::<duckdb_string_t>();
    let mut output_vec = output.flat_vector();
    ensure_type(&output_vec, LogicalTypeId::UBigint, "output")?;

    for (i, s) in input_slice.iter().take(len).enumerate() {
        if input_vec.row_is_null(i as u64) {
            output_vec.set_null(i);
            continue;
        }

        // SAFETY: Row nullability is checked above.
        let movetext = unsafe { decode_movetext(s) };
        match f(&movetext) {
            Some(v) => output_vec.as_mut_slice::<u64>()[i] = v,
            None => output_vec.set_null(i),
        }
    }

    Ok(())
}

/// Invoke a `VARCHAR -> VARCHAR` scalar that optionally reads a per-row `BIGINT` argument from
/// column 1 if present. NULL movetext rows stay NULL; a NULL argument is passed as `None`.
pub fn invoke_unary_varchar_optional_i64_to_varchar<F>(
    input: &DataChunkHandle,
    output: &mut dyn WritableVector,
    mut f: F,
) -> Result<(), Box<dyn Error>>
where
    F: FnMut(&str, Option<i64>) -> VarcharOutput,
{
    let len = input.len();
    let input_vec = input.flat_vector(0);
    ensure_type(&input_vec, LogicalTypeId::Varchar, "input[0]")?;
    let input_slice = input_vec.as_slice::<duckdb_string_t>();
    let arg_vec = if input.num_columns() > 1 {
        Some(input.flat_vector(1))
    } else {
        None
    };
    if let Some(vec) = &arg_vec {
        ensure_type(vec, LogicalTypeId::Bigint, "input[1]")?;
    }
    let arg_slice = arg_vec.as_ref().map(|v| v.as_slice::<i64>());

    let mut output_vec = output.flat_vector();
    ensure_type(&output_vec, LogicalTypeId::Varchar, "output")?;

    for (i, s) in input_slice.iter().take(len).enumerate() {
        if input_vec.row_is_null(i as u64) {
            output_vec.set_null(i);
            continue;
        }

        // SAFETY: Row nullability is checked above.
        let movetext = unsafe { decode_movetext(s) };
        let arg = match (&arg_vec, &arg_slice) {
            (Some(vec), Some(slice)) if !vec.row_is_null(i as u64) => Some(slice[i]),
            _ => None,
        };

        match f(&movetext, arg) {
            VarcharOutput::Null => output_vec.set_null(i),
            VarcharOutput::Value(v) => output_vec.insert(i, CString::new(v)?),
        }
    }

    Ok(())
}
