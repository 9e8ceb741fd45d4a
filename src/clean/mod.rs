//! Cleaning rule engine
//!
//! Coerces every column of a raw batch to the type its schema field
//! declares. Rows are never dropped: a value that cannot be coerced becomes
//! null (text, float, date), `0` (integer) or `false` (boolean).
//!
//! Only structural problems fail a batch: a column set that differs from
//! the schema, or a column that cannot be read as text at all.
//!
//! # Example
//!
//! ```ignore
//! use procureflow::clean::CleaningEngine;
//!
//! let engine = CleaningEngine::legacy();
//! let (cleaned, stats) = engine.clean(&raw_batch)?;
//! ```

mod rules;

pub use rules::{
    clean_boolean, clean_date, clean_float, clean_integer, clean_text, parse_boolean, parse_date,
    parse_float, parse_integer, Coerced, TRUTH_SET,
};

use crate::error::Result;
use crate::schema::{Schema, SemanticType};
use arrow::array::ArrayRef;
use arrow::record_batch::RecordBatch;

/// Counts of cells that lost their original value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleaningStats {
    /// Rows in the batch
    pub rows: usize,
    /// Text cells replaced by null
    pub nulled_text: usize,
    /// Float cells replaced by null
    pub nulled_float: usize,
    /// Date cells replaced by null
    pub nulled_date: usize,
    /// Integer cells replaced by 0
    pub defaulted_integer: usize,
}

impl CleaningStats {
    /// Total replaced cells
    pub fn total_replaced(&self) -> usize {
        self.nulled_text + self.nulled_float + self.nulled_date + self.defaulted_integer
    }
}

/// Applies the per-type rules of a schema to whole batches
#[derive(Debug, Clone)]
pub struct CleaningEngine {
    schema: Schema,
}

impl CleaningEngine {
    /// Create an engine for a schema
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    /// Engine for the legacy transaction schema
    pub fn legacy() -> Self {
        Self::new(Schema::legacy_transactions().clone())
    }

    /// Schema this engine cleans against
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Clean a batch
    ///
    /// The output has the schema's cleaned Arrow types and the same row
    /// count as the input.
    pub fn clean(&self, batch: &RecordBatch) -> Result<(RecordBatch, CleaningStats)> {
        self.schema.check_columns(&batch.schema())?;

        let mut stats = CleaningStats {
            rows: batch.num_rows(),
            ..Default::default()
        };

        let mut columns: Vec<ArrayRef> = Vec::with_capacity(self.schema.len());
        for (field, column) in self.schema.fields().iter().zip(batch.columns()) {
            let coerced = match field.semantic_type {
                SemanticType::Text => clean_text(column)?,
                SemanticType::Float => clean_float(column)?,
                SemanticType::Integer => clean_integer(column)?,
                SemanticType::Date => clean_date(column)?,
                SemanticType::Boolean => clean_boolean(column)?,
            };

            match field.semantic_type {
                SemanticType::Text => stats.nulled_text += coerced.replaced,
                SemanticType::Float => stats.nulled_float += coerced.replaced,
                SemanticType::Integer => stats.defaulted_integer += coerced.replaced,
                SemanticType::Date => stats.nulled_date += coerced.replaced,
                SemanticType::Boolean => {}
            }

            if coerced.replaced > 0 {
                tracing::debug!(
                    column = %field.name,
                    semantic_type = %field.semantic_type,
                    replaced = coerced.replaced,
                    "Replaced malformed cells"
                );
            }
            columns.push(coerced.array);
        }

        let cleaned = RecordBatch::try_new(self.schema.clean_arrow_schema(), columns)?;
        Ok((cleaned, stats))
    }
}
