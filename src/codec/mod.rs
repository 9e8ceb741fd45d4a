//! Tabular codec module
//!
//! Converts between in-memory Arrow batches and the two on-storage forms:
//! legacy pipe-delimited text and Parquet.

mod columnar;
mod delimited;

pub use columnar::{decode_parquet, encode_parquet};
pub use delimited::{decode_delimited, encode_delimited, LEGACY_DELIMITER};
