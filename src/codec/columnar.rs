//! Parquet interchange format
//!
//! Batches are encoded to and decoded from in-memory Parquet buffers; the
//! storage layer moves the bytes.

use crate::config::CompressionCodec;
use crate::error::{Error, Result};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;

impl From<CompressionCodec> for Compression {
    fn from(codec: CompressionCodec) -> Self {
        match codec {
            CompressionCodec::Snappy => Compression::SNAPPY,
            CompressionCodec::Zstd => Compression::ZSTD(ZstdLevel::default()),
            CompressionCodec::Gzip => Compression::GZIP(GzipLevel::default()),
            CompressionCodec::Uncompressed => Compression::UNCOMPRESSED,
        }
    }
}

/// Encode a batch to Parquet bytes in memory
pub fn encode_parquet(batch: &RecordBatch, codec: CompressionCodec) -> Result<Bytes> {
    let mut buf = Vec::new();
    let props = WriterProperties::builder()
        .set_compression(codec.into())
        .build();

    let mut writer = ArrowWriter::try_new(&mut buf, batch.schema(), Some(props))
        .map_err(|e| Error::encode(format!("Failed to create parquet writer: {e}")))?;

    writer
        .write(batch)
        .map_err(|e| Error::encode(format!("Failed to write parquet: {e}")))?;

    writer
        .close()
        .map_err(|e| Error::encode(format!("Failed to close parquet writer: {e}")))?;

    Ok(Bytes::from(buf))
}

/// Decode Parquet bytes into a single batch
///
/// Column names, order and types come from the schema stored in the file.
pub fn decode_parquet(data: Bytes) -> Result<RecordBatch> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(data)
        .map_err(|e| Error::decode(format!("Unreadable parquet payload: {e}")))?;
    let schema = builder.schema().clone();
    let reader = builder.build()?;

    let mut batches = Vec::new();
    for batch in reader {
        batches.push(batch?);
    }

    Ok(arrow::compute::concat_batches(&schema, &batches)?)
}
