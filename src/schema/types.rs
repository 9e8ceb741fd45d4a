//! Schema types

use crate::error::{Error, Result};
use arrow::datatypes::{DataType, Field, Schema as ArrowSchema, SchemaRef};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};

/// Semantic type of a legacy field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    Text,
    Integer,
    Float,
    Date,
    Boolean,
}

impl SemanticType {
    /// Arrow type a column has after cleaning
    pub fn clean_data_type(self) -> DataType {
        match self {
            SemanticType::Text => DataType::Utf8,
            SemanticType::Integer => DataType::Int64,
            SemanticType::Float => DataType::Float64,
            SemanticType::Date => DataType::Date32,
            SemanticType::Boolean => DataType::Boolean,
        }
    }

    /// Whether a cleaned column of this type can hold nulls
    ///
    /// Integer and boolean coercion substitute a default instead of null.
    pub fn is_nullable(self) -> bool {
        !matches!(self, SemanticType::Integer | SemanticType::Boolean)
    }
}

impl std::fmt::Display for SemanticType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SemanticType::Text => write!(f, "text"),
            SemanticType::Integer => write!(f, "integer"),
            SemanticType::Float => write!(f, "float"),
            SemanticType::Date => write!(f, "date"),
            SemanticType::Boolean => write!(f, "boolean"),
        }
    }
}

/// A named, typed field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Column name
    pub name: String,
    /// Semantic type
    #[serde(rename = "type")]
    pub semantic_type: SemanticType,
}

impl FieldDef {
    /// Create a new field definition
    pub fn new(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self {
            name: name.into(),
            semantic_type,
        }
    }
}

static LEGACY_TRANSACTIONS: LazyLock<Schema> = LazyLock::new(|| {
    use SemanticType::{Boolean, Date, Float, Integer, Text};

    Schema::new(vec![
        FieldDef::new("transaction_id", Text),
        FieldDef::new("customer_id", Text),
        FieldDef::new("customer_name", Text),
        FieldDef::new("customer_email", Text),
        FieldDef::new("customer_age", Integer),
        FieldDef::new("store_location", Text),
        FieldDef::new("product_category", Text),
        FieldDef::new("unit_price", Float),
        FieldDef::new("quantity", Integer),
        FieldDef::new("discount_rate", Float),
        FieldDef::new("tax_amount", Float),
        FieldDef::new("total_amount", Float),
        FieldDef::new("transaction_date", Date),
        FieldDef::new("payment_status", Text),
        FieldDef::new("return_flag", Boolean),
    ])
});

/// Ordered, immutable list of fields shared by every stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<FieldDef>,
}

impl Schema {
    /// Create a schema from an ordered field list
    pub fn new(fields: Vec<FieldDef>) -> Self {
        Self { fields }
    }

    /// The legacy transaction schema every stage works with
    pub fn legacy_transactions() -> &'static Schema {
        &LEGACY_TRANSACTIONS
    }

    /// Fields in declared order
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in declared order
    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Semantic type of a named field
    pub fn type_of(&self, name: &str) -> Option<SemanticType> {
        self.field(name).map(|f| f.semantic_type)
    }

    /// Arrow schema of an uncleaned batch: every column nullable text
    pub fn raw_arrow_schema(&self) -> SchemaRef {
        let fields: Vec<Field> = self
            .fields
            .iter()
            .map(|f| Field::new(&f.name, DataType::Utf8, true))
            .collect();
        Arc::new(ArrowSchema::new(fields))
    }

    /// Arrow schema of a cleaned batch
    pub fn clean_arrow_schema(&self) -> SchemaRef {
        let fields: Vec<Field> = self
            .fields
            .iter()
            .map(|f| {
                Field::new(
                    &f.name,
                    f.semantic_type.clean_data_type(),
                    f.semantic_type.is_nullable(),
                )
            })
            .collect();
        Arc::new(ArrowSchema::new(fields))
    }

    /// Verify a batch carries exactly this schema's columns, in order
    ///
    /// Column types are not compared; that is the cleaning engine's job.
    pub fn check_columns(&self, schema: &ArrowSchema) -> Result<()> {
        let found: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        let expected = self.names();
        if found == expected {
            Ok(())
        } else {
            Err(Error::schema_mismatch(&expected, &found))
        }
    }
}
