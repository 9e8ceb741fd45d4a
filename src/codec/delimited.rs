//! Pipe-delimited legacy text
//!
//! Legacy files have no header row and exactly one record per line, with the
//! fields in schema order. Every column is decoded as nullable text; typing is
//! left to the cleaning engine.

use crate::error::{Error, Result};
use crate::schema::Schema;
use arrow::csv::{ReaderBuilder, WriterBuilder};
use arrow::record_batch::RecordBatch;
use std::io::Cursor;

/// Field delimiter of the legacy format
pub const LEGACY_DELIMITER: u8 = b'|';

const READ_BATCH_SIZE: usize = 64 * 1024;

/// Decode legacy text into an untyped batch
///
/// Empty fields become nulls. A line with the wrong number of fields, or
/// bytes that are not UTF-8, fail the whole payload.
pub fn decode_delimited(data: &[u8], schema: &Schema) -> Result<RecordBatch> {
    let arrow_schema = schema.raw_arrow_schema();

    let reader = ReaderBuilder::new(arrow_schema.clone())
        .with_header(false)
        .with_delimiter(LEGACY_DELIMITER)
        .with_batch_size(READ_BATCH_SIZE)
        .build(Cursor::new(data))
        .map_err(|e| Error::decode(format!("Failed to create legacy reader: {e}")))?;

    let mut batches = Vec::new();
    for batch in reader {
        let batch = batch.map_err(|e| Error::decode(format!("Malformed legacy record: {e}")))?;
        batches.push(batch);
    }

    arrow::compute::concat_batches(&arrow_schema, &batches)
        .map_err(|e| Error::decode(format!("Failed to assemble legacy batch: {e}")))
}

/// Encode a batch as headerless pipe-delimited text
///
/// Nulls are written as empty fields.
pub fn encode_delimited(batch: &RecordBatch) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut writer = WriterBuilder::new()
            .with_header(false)
            .with_delimiter(LEGACY_DELIMITER)
            .build(&mut buf);

        writer
            .write(batch)
            .map_err(|e| Error::encode(format!("Failed to write legacy text: {e}")))?;
    }
    Ok(buf)
}
