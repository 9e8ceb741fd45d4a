//! Tests for the schema registry

use super::*;
use crate::error::Error;
use arrow::datatypes::{DataType, Field, Schema as ArrowSchema};

#[test]
fn test_legacy_schema_order() {
    let schema = Schema::legacy_transactions();
    assert_eq!(schema.len(), 15);
    assert_eq!(
        schema.names(),
        vec![
            "transaction_id",
            "customer_id",
            "customer_name",
            "customer_email",
            "customer_age",
            "store_location",
            "product_category",
            "unit_price",
            "quantity",
            "discount_rate",
            "tax_amount",
            "total_amount",
            "transaction_date",
            "payment_status",
            "return_flag",
        ]
    );
}

#[test]
fn test_legacy_schema_types() {
    let schema = Schema::legacy_transactions();
    assert_eq!(schema.type_of("customer_age"), Some(SemanticType::Integer));
    assert_eq!(schema.type_of("quantity"), Some(SemanticType::Integer));
    assert_eq!(schema.type_of("unit_price"), Some(SemanticType::Float));
    assert_eq!(schema.type_of("total_amount"), Some(SemanticType::Float));
    assert_eq!(schema.type_of("transaction_date"), Some(SemanticType::Date));
    assert_eq!(schema.type_of("return_flag"), Some(SemanticType::Boolean));
    assert_eq!(schema.type_of("payment_status"), Some(SemanticType::Text));
    assert_eq!(schema.type_of("unknown"), None);

    let text_count = schema
        .fields()
        .iter()
        .filter(|f| f.semantic_type == SemanticType::Text)
        .count();
    assert_eq!(text_count, 7);
}

#[test]
fn test_raw_arrow_schema_is_all_text() {
    let arrow = Schema::legacy_transactions().raw_arrow_schema();
    assert_eq!(arrow.fields().len(), 15);
    assert!(arrow
        .fields()
        .iter()
        .all(|f| f.data_type() == &DataType::Utf8 && f.is_nullable()));
}

#[test]
fn test_clean_arrow_schema_types() {
    let arrow = Schema::legacy_transactions().clean_arrow_schema();

    let age = arrow.field_with_name("customer_age").unwrap();
    assert_eq!(age.data_type(), &DataType::Int64);
    assert!(!age.is_nullable());

    let flag = arrow.field_with_name("return_flag").unwrap();
    assert_eq!(flag.data_type(), &DataType::Boolean);
    assert!(!flag.is_nullable());

    let date = arrow.field_with_name("transaction_date").unwrap();
    assert_eq!(date.data_type(), &DataType::Date32);
    assert!(date.is_nullable());

    let price = arrow.field_with_name("unit_price").unwrap();
    assert_eq!(price.data_type(), &DataType::Float64);
}

#[test]
fn test_check_columns_accepts_matching() {
    let schema = Schema::legacy_transactions();
    assert!(schema.check_columns(&schema.raw_arrow_schema()).is_ok());
    assert!(schema.check_columns(&schema.clean_arrow_schema()).is_ok());
}

#[test]
fn test_check_columns_rejects_missing_column() {
    let schema = Schema::legacy_transactions();
    let fields: Vec<Field> = schema
        .raw_arrow_schema()
        .fields()
        .iter()
        .take(14)
        .map(|f| f.as_ref().clone())
        .collect();

    let err = schema.check_columns(&ArrowSchema::new(fields)).unwrap_err();
    assert!(matches!(err, Error::SchemaMismatch { .. }));
}

#[test]
fn test_check_columns_rejects_reordered() {
    let schema = Schema::legacy_transactions();
    let mut fields: Vec<Field> = schema
        .raw_arrow_schema()
        .fields()
        .iter()
        .map(|f| f.as_ref().clone())
        .collect();
    fields.swap(0, 1);

    assert!(schema.check_columns(&ArrowSchema::new(fields)).is_err());
}

#[test]
fn test_semantic_type_display() {
    assert_eq!(SemanticType::Text.to_string(), "text");
    assert_eq!(SemanticType::Boolean.to_string(), "boolean");
}

#[test]
fn test_schema_serde_roundtrip_names() {
    let json = serde_json::to_value(Schema::legacy_transactions()).unwrap();
    assert_eq!(json["fields"][4]["name"], "customer_age");
    assert_eq!(json["fields"][4]["type"], "integer");
}
