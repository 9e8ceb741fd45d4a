//! Schema registry module
//!
//! The canonical, ordered list of legacy transaction fields and their
//! semantic types. Every stage consumes the same [`Schema`].
//!
//! # Features
//!
//! - **Semantic Types**: text, integer, float, date, boolean
//! - **Arrow Mapping**: raw (all text) and cleaned Arrow schemas
//! - **Column Checks**: rejects batches whose column set differs

mod types;

pub use types::{FieldDef, Schema, SemanticType};

#[cfg(test)]
mod tests;
