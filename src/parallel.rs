//! Parallel batch decoding and encoding using Rayon.
//!
//! Every line (or record) is an independent task on Rayon's work-stealing
//! pool. Output order matches input order. On failure the error of the
//! lowest failing index is returned, so results are identical to the
//! sequential [`RecordCodec::decode_all`] and [`RecordCodec::encode_all`].
//!
//! # Examples
//!
//! ```
//! use fixcol::parallel::decode_all_parallel;
//! use fixcol::{ColumnSpec, ConverterRegistry, RecordCodec, RecordSchema, TypeKey};
//! use std::sync::Arc;
//!
//! let schema = RecordSchema::builder("Row")
//!     .column(ColumnSpec::new("n", TypeKey::Integer).position(0).length(4))
//!     .build()?;
//! let codec = RecordCodec::new(schema, Arc::new(ConverterRegistry::new()));
//!
//! let lines: Vec<String> = (0..1000).map(|i| format!("{i:>4}")).collect();
//! let records = decode_all_parallel(&codec, &lines)?;
//! assert_eq!(records[999].get("n").and_then(|v| v.as_i64()), Some(999));
//! # Ok::<(), fixcol::FixcolError>(())
//! ```

use crate::codec::RecordCodec;
use crate::error::Result;
use crate::record::Record;
use rayon::prelude::*;

/// Decode lines in parallel, preserving order.
///
/// # Errors
///
/// Returns the failure of the first bad line in input order.
pub fn decode_all_parallel<S>(codec: &RecordCodec, lines: &[S]) -> Result<Vec<Record>>
where
    S: AsRef<str> + Sync,
{
    let results: Vec<Result<Record>> = lines.par_iter().map(|line| codec.decode(line.as_ref())).collect();
    first_error(codec, results, "line")
}

/// Encode records in parallel, preserving order.
///
/// # Errors
///
/// Returns the failure of the first bad record in input order.
pub fn encode_all_parallel(codec: &RecordCodec, records: &[Record]) -> Result<Vec<String>> {
    let results: Vec<Result<String>> = records.par_iter().map(|record| codec.encode(record)).collect();
    first_error(codec, results, "record")
}

fn first_error<T>(codec: &RecordCodec, results: Vec<Result<T>>, unit: &str) -> Result<Vec<T>> {
    let mut out = Vec::with_capacity(results.len());
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(item) => out.push(item),
            Err(e) => {
                log::warn!(
                    "Parallel batch for {} failed at {unit} {}",
                    codec.schema().name(),
                    index + 1
                );
                return Err(e);
            },
        }
    }
    Ok(out)
}
