//! Database-agnostic cell decoding.
//!
//! Rows coming back from sqlx are turned into ordered `(column, cell)` lists
//! that hooks can inspect and rewrite before records are assigned.
//!
//! # Architecture
//!
//! Type conversion uses a two-phase approach:
//! 1. `TypeCategory` classifies column types into logical categories
//! 2. Database-specific decoders handle the actual value extraction

use crate::models::{Cell, DatabaseType, Row};
use serde_json::Value as JsonValue;
use sqlx::mysql::{MySqlRow, MySqlTypeInfo, MySqlValueRef};
use sqlx::postgres::{PgRow, PgTypeInfo, PgValueRef};
use sqlx::sqlite::SqliteRow;
use sqlx::types::chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::{Column, Decode, Type, TypeInfo};

// =============================================================================
// Type Classification
// =============================================================================

/// Logical category for database column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Integer,
    Float,
    Decimal,
    Boolean,
    Binary,
    Json,
    Unknown,
}

/// Classify a database type name into a logical category.
pub fn categorize_type(type_name: &str, db: DatabaseType) -> TypeCategory {
    let lower = type_name.to_lowercase();

    // Decimal/Numeric - check first as it overlaps with "numeric" in float checks
    if lower.contains("decimal") || lower.contains("numeric") {
        // SQLite's NUMERIC is actually a float
        if db == DatabaseType::SQLite && lower == "numeric" {
            return TypeCategory::Float;
        }
        return TypeCategory::Decimal;
    }

    if lower == "bool" || lower == "boolean" {
        return TypeCategory::Boolean;
    }

    if lower.contains("int") || lower.contains("serial") || lower.contains("tiny") {
        return TypeCategory::Integer;
    }

    if lower.contains("float")
        || lower.contains("double")
        || lower == "real"
        || lower == "float4"
        || lower == "float8"
    {
        return TypeCategory::Float;
    }

    if lower == "json" || lower == "jsonb" {
        return TypeCategory::Json;
    }

    if lower.contains("blob") || lower.contains("binary") || lower == "bytea" {
        return TypeCategory::Binary;
    }

    TypeCategory::Unknown
}

// =============================================================================
// Decimal Type Support
// =============================================================================

/// Wrapper type for raw DECIMAL/NUMERIC values as strings.
/// This preserves the exact database representation.
#[derive(Debug)]
pub struct RawDecimal(pub String);

impl Type<sqlx::MySql> for RawDecimal {
    fn type_info() -> MySqlTypeInfo {
        <String as Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &MySqlTypeInfo) -> bool {
        let name = ty.name().to_lowercase();
        name.contains("decimal") || name.contains("numeric")
    }
}

impl<'r> Decode<'r, sqlx::MySql> for RawDecimal {
    fn decode(value: MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<sqlx::MySql>>::decode(value)?;
        Ok(RawDecimal(s.to_string()))
    }
}

impl Type<sqlx::Postgres> for RawDecimal {
    fn type_info() -> PgTypeInfo {
        <String as Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        let name = ty.name().to_lowercase();
        name.contains("numeric") || name.contains("decimal")
    }
}

impl<'r> Decode<'r, sqlx::Postgres> for RawDecimal {
    fn decode(value: PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<sqlx::Postgres>>::decode(value)?;
        Ok(RawDecimal(s.to_string()))
    }
}

/// Encode binary data as a JSON cell: UTF-8 text when possible, base64 otherwise.
pub fn decode_binary_value(bytes: &[u8]) -> JsonValue {
    use base64::{Engine as _, engine::general_purpose::STANDARD};

    match std::str::from_utf8(bytes) {
        Ok(s) => JsonValue::String(s.to_string()),
        Err(_) => JsonValue::String(STANDARD.encode(bytes)),
    }
}

fn float_cell(v: f64) -> JsonValue {
    serde_json::Number::from_f64(v)
        .map(JsonValue::Number)
        .unwrap_or_else(|| JsonValue::String(v.to_string()))
}

// =============================================================================
// Row to Cells Trait
// =============================================================================

/// Trait for converting database rows into ordered cells.
pub trait RowToCells {
    fn to_cells(&self) -> Row;
}

macro_rules! impl_row_to_cells {
    ($row:ty, $db:expr, $decoder:path) => {
        impl RowToCells for $row {
            fn to_cells(&self) -> Row {
                use sqlx::Row as _;
                self.columns()
                    .iter()
                    .enumerate()
                    .map(|(idx, col)| {
                        let category = categorize_type(col.type_info().name(), $db);
                        (col.name().to_string(), $decoder(self, idx, category))
                    })
                    .collect()
            }
        }
    };
}

impl_row_to_cells!(MySqlRow, DatabaseType::MySQL, mysql::decode_column);
impl_row_to_cells!(PgRow, DatabaseType::PostgreSQL, postgres::decode_column);
impl_row_to_cells!(SqliteRow, DatabaseType::SQLite, sqlite::decode_column);

/// Try each decoder type in turn, returning the first non-null match.
macro_rules! try_decode {
    ($row:expr, $idx:expr, $($ty:ty => $map:expr),+ $(,)?) => {{
        use sqlx::Row as _;
        let mut cell: Option<Cell> = None;
        $(
            if cell.is_none() {
                if let Ok(value) = $row.try_get::<Option<$ty>, _>($idx) {
                    cell = Some(value.map($map).unwrap_or(JsonValue::Null));
                }
            }
        )+
        cell.unwrap_or(JsonValue::Null)
    }};
}

// =============================================================================
// Database-Specific Decoders
// =============================================================================

mod mysql {
    use super::*;

    pub fn decode_column(row: &MySqlRow, idx: usize, category: TypeCategory) -> Cell {
        match category {
            TypeCategory::Decimal => try_decode!(row, idx, RawDecimal => |v: RawDecimal| JsonValue::String(v.0)),
            TypeCategory::Integer => try_decode!(row, idx,
                i8 => |v: i8| JsonValue::from(v),
                i16 => |v: i16| JsonValue::from(v),
                i32 => |v: i32| JsonValue::from(v),
                i64 => |v: i64| JsonValue::from(v),
                u8 => |v: u8| JsonValue::from(v),
                u16 => |v: u16| JsonValue::from(v),
                u32 => |v: u32| JsonValue::from(v),
                u64 => |v: u64| JsonValue::from(v),
            ),
            TypeCategory::Boolean => try_decode!(row, idx, bool => JsonValue::Bool),
            TypeCategory::Float => try_decode!(row, idx,
                f64 => float_cell,
                f32 => |v: f32| float_cell(v as f64),
            ),
            TypeCategory::Binary => try_decode!(row, idx, Vec<u8> => |v: Vec<u8>| decode_binary_value(&v)),
            TypeCategory::Json => try_decode!(row, idx, JsonValue => |v: JsonValue| v),
            TypeCategory::Unknown => try_decode!(row, idx,
                String => JsonValue::String,
                NaiveDateTime => |v: NaiveDateTime| JsonValue::String(v.to_string()),
                NaiveDate => |v: NaiveDate| JsonValue::String(v.to_string()),
                NaiveTime => |v: NaiveTime| JsonValue::String(v.to_string()),
                Vec<u8> => |v: Vec<u8>| decode_binary_value(&v),
            ),
        }
    }
}

mod postgres {
    use super::*;

    pub fn decode_column(row: &PgRow, idx: usize, category: TypeCategory) -> Cell {
        match category {
            TypeCategory::Decimal => try_decode!(row, idx, RawDecimal => |v: RawDecimal| JsonValue::String(v.0)),
            TypeCategory::Integer => try_decode!(row, idx,
                i64 => |v: i64| JsonValue::from(v),
                i32 => |v: i32| JsonValue::from(v),
                i16 => |v: i16| JsonValue::from(v),
            ),
            TypeCategory::Boolean => try_decode!(row, idx, bool => JsonValue::Bool),
            TypeCategory::Float => try_decode!(row, idx,
                f64 => float_cell,
                f32 => |v: f32| float_cell(v as f64),
            ),
            TypeCategory::Binary => try_decode!(row, idx, Vec<u8> => |v: Vec<u8>| decode_binary_value(&v)),
            TypeCategory::Json => try_decode!(row, idx, JsonValue => |v: JsonValue| v),
            TypeCategory::Unknown => try_decode!(row, idx,
                String => JsonValue::String,
                DateTime<Utc> => |v: DateTime<Utc>| JsonValue::String(v.to_rfc3339()),
                NaiveDateTime => |v: NaiveDateTime| JsonValue::String(v.to_string()),
                NaiveDate => |v: NaiveDate| JsonValue::String(v.to_string()),
                NaiveTime => |v: NaiveTime| JsonValue::String(v.to_string()),
            ),
        }
    }
}

mod sqlite {
    use super::*;

    pub fn decode_column(row: &SqliteRow, idx: usize, category: TypeCategory) -> Cell {
        match category {
            TypeCategory::Integer => try_decode!(row, idx, i64 => |v: i64| JsonValue::from(v)),
            TypeCategory::Boolean => try_decode!(row, idx, bool => JsonValue::Bool),
            TypeCategory::Float | TypeCategory::Decimal => try_decode!(row, idx, f64 => float_cell),
            TypeCategory::Binary => try_decode!(row, idx, Vec<u8> => |v: Vec<u8>| decode_binary_value(&v)),
            // SQLite is dynamically typed: fall back through the storage classes
            TypeCategory::Json | TypeCategory::Unknown => try_decode!(row, idx,
                i64 => |v: i64| JsonValue::from(v),
                f64 => float_cell,
                String => JsonValue::String,
                Vec<u8> => |v: Vec<u8>| decode_binary_value(&v),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_type() {
        assert_eq!(
            categorize_type("BIGINT UNSIGNED", DatabaseType::MySQL),
            TypeCategory::Integer
        );
        assert_eq!(
            categorize_type("NUMERIC", DatabaseType::PostgreSQL),
            TypeCategory::Decimal
        );
        assert_eq!(
            categorize_type("numeric", DatabaseType::SQLite),
            TypeCategory::Float
        );
        assert_eq!(
            categorize_type("BOOLEAN", DatabaseType::SQLite),
            TypeCategory::Boolean
        );
        assert_eq!(
            categorize_type("jsonb", DatabaseType::PostgreSQL),
            TypeCategory::Json
        );
        assert_eq!(
            categorize_type("bytea", DatabaseType::PostgreSQL),
            TypeCategory::Binary
        );
        assert_eq!(
            categorize_type("VARCHAR", DatabaseType::MySQL),
            TypeCategory::Unknown
        );
    }

    #[test]
    fn test_decode_binary_value() {
        assert_eq!(decode_binary_value(b"hello"), JsonValue::String("hello".into()));
        assert_eq!(
            decode_binary_value(&[0xff, 0xfe]),
            JsonValue::String("//4=".into())
        );
    }
}
