use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use std::sync::Arc;
use tlc_dataset::{ColumnType, SchemaDeclaration};


pub fn arrow_data_type(column_type: ColumnType) -> DataType {
    match column_type {
        ColumnType::Int64 => DataType::Int64,
        ColumnType::Float64 => DataType::Float64,
        ColumnType::Utf8 => DataType::Utf8
    }
}


/// Every column is nullable, empty CSV fields become nulls.
pub fn to_arrow_schema(declaration: &SchemaDeclaration) -> SchemaRef {
    let fields: Vec<Field> = declaration.columns().iter().map(|c| {
        Field::new(c.name, arrow_data_type(c.column_type), true)
    }).collect();
    Arc::new(Schema::new(fields))
}
