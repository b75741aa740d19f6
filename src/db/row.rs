//! Row decoding and row-to-object mapping.
//!
//! Reading a row happens in two phases:
//! 1. `TypeCategory` classifies each column's declared type name
//! 2. Database-specific decoders extract a [`Value`] for that category
//!
//! Only SQL NULL decodes to [`Value::Null`]. A present value that cannot be
//! decoded is a [`MappingError::Schema`] naming the column.
//!
//! A [`RowSchema`] then maps the decoded columns onto target type descriptors
//! through the coercion engine.

use crate::convert::{Converter, TypeDescriptor, Value, convert_value};
use crate::error::{MappingError, MappingResult};
use crate::models::DatabaseType;
use serde_json::Value as JsonValue;
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgRow, PgTypeInfo, PgValueFormat, PgValueRef};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Decode, Row, Type, TypeInfo};
use std::collections::BTreeMap;
use std::str::FromStr;

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
    Text,
    Binary,
    Json,
    Uuid,
    Temporal,
    TextArray,
    IntegerArray,
    FloatArray,
    Unknown,
}

/// Classify a database type name into a logical category.
pub fn categorize_type(type_name: &str, db: DatabaseType) -> TypeCategory {
    let lower = type_name.to_lowercase();

    // PostgreSQL array types: "TEXT[]", "_text"
    if lower.ends_with("[]") || (db == DatabaseType::PostgreSQL && lower.starts_with('_')) {
        let element = lower.trim_end_matches("[]").trim_start_matches('_');
        return match element {
            "text" | "varchar" | "bpchar" | "char" | "name" => TypeCategory::TextArray,
            "int2" | "int4" | "int8" => TypeCategory::IntegerArray,
            "float4" | "float8" => TypeCategory::FloatArray,
            _ => TypeCategory::Unknown,
        };
    }

    // Decimal/Numeric - check first as it overlaps with "numeric" in float checks
    if lower.contains("decimal") || lower.contains("numeric") {
        // SQLite's NUMERIC is actually a float
        if db == DatabaseType::SQLite && lower == "numeric" {
            return TypeCategory::Float;
        }
        return TypeCategory::Decimal;
    }

    if lower == "date" || lower == "datetime" || lower.starts_with("time") {
        return TypeCategory::Temporal;
    }

    if is_integer_type(&lower, db) {
        return TypeCategory::Integer;
    }

    if lower == "bool" || lower == "boolean" {
        return TypeCategory::Boolean;
    }

    if lower.contains("float") || lower.contains("double") || lower == "real" {
        return TypeCategory::Float;
    }

    if lower == "json" || lower == "jsonb" {
        return TypeCategory::Json;
    }

    if lower == "uuid" {
        return TypeCategory::Uuid;
    }

    if lower.contains("blob") || lower.contains("binary") || lower == "bytea" {
        return TypeCategory::Binary;
    }

    if lower.contains("char") || lower.contains("text") || lower == "name" {
        return TypeCategory::Text;
    }

    // SQLite reports NULL for untyped expression columns.
    TypeCategory::Unknown
}

fn is_integer_type(lower: &str, db: DatabaseType) -> bool {
    match db {
        // SQLite affinity: any declared type containing "INT".
        DatabaseType::SQLite => lower.contains("int"),
        // "interval" and "point" also contain "int".
        DatabaseType::PostgreSQL => {
            matches!(
                lower,
                "int2" | "int4" | "int8" | "smallint" | "integer" | "bigint"
            ) || lower.contains("serial")
        }
    }
}

// =============================================================================
// Decimal Type Support
// =============================================================================

/// NUMERIC value kept in its exact decimal text form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDecimal(pub String);

impl Type<sqlx::Postgres> for RawDecimal {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("NUMERIC")
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        let name = ty.name().to_lowercase();
        name.contains("numeric") || name.contains("decimal")
    }
}

impl<'r> Decode<'r, sqlx::Postgres> for RawDecimal {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        match value.format() {
            PgValueFormat::Text => Ok(RawDecimal(value.as_str()?.to_string())),
            PgValueFormat::Binary => numeric_to_string(value.as_bytes()?).map(RawDecimal),
        }
    }
}

const NUMERIC_NEG: u16 = 0x4000;
const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_PINF: u16 = 0xD000;
const NUMERIC_NINF: u16 = 0xF000;

/// Render the binary NUMERIC wire form as decimal text.
///
/// The wire form is `ndigits, weight, sign, dscale` followed by `ndigits`
/// base-10000 digits, all big-endian 16-bit. Digit `k` carries the weight
/// `weight - k`.
fn numeric_to_string(buf: &[u8]) -> Result<String, BoxDynError> {
    let read = |pos: usize| -> Result<u16, BoxDynError> {
        buf.get(pos..pos + 2)
            .map(|b| u16::from_be_bytes([b[0], b[1]]))
            .ok_or_else(|| "truncated NUMERIC value".into())
    };

    let ndigits = usize::from(read(0)?);
    let weight = i32::from(read(2)? as i16);
    let sign = read(4)?;
    let dscale = usize::from(read(6)?);
    let digits = (0..ndigits)
        .map(|k| read(8 + 2 * k))
        .collect::<Result<Vec<_>, _>>()?;

    match sign {
        NUMERIC_NAN => return Ok("NaN".to_string()),
        NUMERIC_PINF => return Ok("Infinity".to_string()),
        NUMERIC_NINF => return Ok("-Infinity".to_string()),
        _ => {}
    }

    let digit_at = |k: i32| -> u16 {
        usize::try_from(k)
            .ok()
            .and_then(|k| digits.get(k))
            .copied()
            .unwrap_or(0)
    };

    let mut out = String::new();
    if sign == NUMERIC_NEG {
        out.push('-');
    }
    if weight < 0 {
        out.push('0');
    } else {
        out.push_str(&digit_at(0).to_string());
        for k in 1..=weight {
            out.push_str(&format!("{:04}", digit_at(k)));
        }
    }
    if dscale > 0 {
        let mut fraction = String::with_capacity(dscale + 4);
        let mut k = weight + 1;
        while fraction.len() < dscale {
            fraction.push_str(&format!("{:04}", digit_at(k)));
            k += 1;
        }
        fraction.truncate(dscale);
        out.push('.');
        out.push_str(&fraction);
    }
    Ok(out)
}

// =============================================================================
// Decoded Rows
// =============================================================================

/// Column values of one row, in select-list order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedRow {
    columns: Vec<(String, Value)>,
}

impl DecodedRow {
    pub fn new(columns: Vec<(String, Value)>) -> Self {
        Self { columns }
    }

    /// First column with the given name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> &[(String, Value)] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Render as a JSON object keyed by column name.
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(
            self.columns
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        )
    }
}

/// Trait for decoding driver rows into [`Value`]s.
pub trait RowToValues {
    fn to_values(&self) -> MappingResult<DecodedRow>;
}

impl RowToValues for PgRow {
    fn to_values(&self) -> MappingResult<DecodedRow> {
        self.columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let type_name = col.type_info().name();
                let category = categorize_type(type_name, DatabaseType::PostgreSQL);
                let value = postgres::decode_column(self, idx, category)
                    .map_err(|e| decode_error(col.name(), type_name, e))?;
                Ok((col.name().to_string(), value))
            })
            .collect::<MappingResult<Vec<_>>>()
            .map(DecodedRow::new)
    }
}

impl RowToValues for SqliteRow {
    fn to_values(&self) -> MappingResult<DecodedRow> {
        self.columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let type_name = col.type_info().name();
                let category = categorize_type(type_name, DatabaseType::SQLite);
                let value = sqlite::decode_column(self, idx, category)
                    .map_err(|e| decode_error(col.name(), type_name, e))?;
                Ok((col.name().to_string(), value))
            })
            .collect::<MappingResult<Vec<_>>>()
            .map(DecodedRow::new)
    }
}

fn decode_error(column: &str, type_name: &str, err: sqlx::Error) -> MappingError {
    tracing::debug!(column, type_name, error = %err, "Column value is not decodable");
    let message = match err {
        sqlx::Error::ColumnDecode { source, .. } => {
            format!("Cannot decode {} value: {}", type_name, source)
        }
        other => format!("Cannot decode {} value: {}", type_name, other),
    };
    MappingError::schema(message, column)
}

// =============================================================================
// Database-Specific Decoders
// =============================================================================

mod postgres {
    use super::*;
    use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

    pub fn decode_column(
        row: &PgRow,
        idx: usize,
        category: TypeCategory,
    ) -> Result<Value, sqlx::Error> {
        match category {
            TypeCategory::Decimal => Ok(row
                .try_get::<Option<RawDecimal>, _>(idx)?
                .map_or(Value::Null, |v| Value::String(v.0))),
            TypeCategory::Integer => decode_integer(row, idx),
            TypeCategory::Boolean => Ok(row.try_get::<Option<bool>, _>(idx)?.into()),
            TypeCategory::Float => decode_float(row, idx),
            TypeCategory::Binary => Ok(row.try_get::<Option<Vec<u8>>, _>(idx)?.into()),
            TypeCategory::Json => Ok(row
                .try_get::<Option<JsonValue>, _>(idx)?
                .map_or(Value::Null, Value::Json)),
            TypeCategory::Uuid => Ok(row
                .try_get::<Option<uuid::Uuid>, _>(idx)?
                .map_or(Value::Null, |v| Value::String(v.to_string()))),
            TypeCategory::Temporal => decode_temporal(row, idx),
            TypeCategory::TextArray => Ok(sequence(
                row.try_get::<Option<Vec<Option<String>>>, _>(idx)?,
                Value::String,
            )),
            TypeCategory::IntegerArray => decode_integer_array(row, idx),
            TypeCategory::FloatArray => decode_float_array(row, idx),
            TypeCategory::Text | TypeCategory::Unknown => {
                Ok(row.try_get::<Option<String>, _>(idx)?.into())
            }
        }
    }

    fn decode_integer(row: &PgRow, idx: usize) -> Result<Value, sqlx::Error> {
        if let Ok(v) = row.try_get::<Option<i16>, _>(idx) {
            return Ok(v.map_or(Value::Null, Value::I16));
        }
        if let Ok(v) = row.try_get::<Option<i32>, _>(idx) {
            return Ok(v.map_or(Value::Null, Value::I32));
        }
        Ok(row.try_get::<Option<i64>, _>(idx)?.map_or(Value::Null, Value::I64))
    }

    fn decode_float(row: &PgRow, idx: usize) -> Result<Value, sqlx::Error> {
        if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
            return Ok(v.map_or(Value::Null, Value::F64));
        }
        Ok(row.try_get::<Option<f32>, _>(idx)?.map_or(Value::Null, Value::F32))
    }

    /// Dates and times render as ISO 8601 text.
    fn decode_temporal(row: &PgRow, idx: usize) -> Result<Value, sqlx::Error> {
        if let Ok(v) = row.try_get::<Option<DateTime<Utc>>, _>(idx) {
            return Ok(v.map_or(Value::Null, |v| Value::String(v.to_rfc3339())));
        }
        if let Ok(v) = row.try_get::<Option<NaiveDateTime>, _>(idx) {
            return Ok(v.map_or(Value::Null, |v| {
                Value::String(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
            }));
        }
        if let Ok(v) = row.try_get::<Option<NaiveDate>, _>(idx) {
            return Ok(v.map_or(Value::Null, |v| Value::String(v.to_string())));
        }
        Ok(row
            .try_get::<Option<NaiveTime>, _>(idx)?
            .map_or(Value::Null, |v| Value::String(v.to_string())))
    }

    /// NULL elements stay `Null` inside the sequence.
    fn sequence<T>(items: Option<Vec<Option<T>>>, wrap: fn(T) -> Value) -> Value {
        items.map_or(Value::Null, |items| {
            Value::Sequence(
                items
                    .into_iter()
                    .map(|item| item.map_or(Value::Null, wrap))
                    .collect(),
            )
        })
    }

    fn decode_integer_array(row: &PgRow, idx: usize) -> Result<Value, sqlx::Error> {
        if let Ok(v) = row.try_get::<Option<Vec<Option<i16>>>, _>(idx) {
            return Ok(sequence(v, Value::I16));
        }
        if let Ok(v) = row.try_get::<Option<Vec<Option<i32>>>, _>(idx) {
            return Ok(sequence(v, Value::I32));
        }
        Ok(sequence(row.try_get::<Option<Vec<Option<i64>>>, _>(idx)?, Value::I64))
    }

    fn decode_float_array(row: &PgRow, idx: usize) -> Result<Value, sqlx::Error> {
        if let Ok(v) = row.try_get::<Option<Vec<Option<f64>>>, _>(idx) {
            return Ok(sequence(v, Value::F64));
        }
        Ok(sequence(row.try_get::<Option<Vec<Option<f32>>>, _>(idx)?, Value::F32))
    }
}

mod sqlite {
    use super::*;

    pub fn decode_column(
        row: &SqliteRow,
        idx: usize,
        category: TypeCategory,
    ) -> Result<Value, sqlx::Error> {
        let typed = match category {
            TypeCategory::Integer => row.try_get::<Option<i64>, _>(idx).map(Value::from),
            TypeCategory::Boolean => row.try_get::<Option<bool>, _>(idx).map(Value::from),
            TypeCategory::Float | TypeCategory::Decimal => {
                row.try_get::<Option<f64>, _>(idx).map(Value::from)
            }
            TypeCategory::Binary => row.try_get::<Option<Vec<u8>>, _>(idx).map(Value::from),
            TypeCategory::Text => row.try_get::<Option<String>, _>(idx).map(Value::from),
            TypeCategory::Json => decode_json_text(row, idx),
            _ => return decode_dynamic(row, idx),
        };
        // The declared type is only an affinity; each value keeps its own storage class.
        typed.or_else(|_| decode_dynamic(row, idx))
    }

    fn decode_json_text(row: &SqliteRow, idx: usize) -> Result<Value, sqlx::Error> {
        Ok(match row.try_get::<Option<String>, _>(idx)? {
            Some(text) => serde_json::from_str::<JsonValue>(&text)
                .map(Value::Json)
                .unwrap_or(Value::String(text)),
            None => Value::Null,
        })
    }

    /// Decode by the value's storage class.
    fn decode_dynamic(row: &SqliteRow, idx: usize) -> Result<Value, sqlx::Error> {
        if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
            return Ok(v.into());
        }
        if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
            return Ok(v.into());
        }
        if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
            return Ok(v.into());
        }
        Ok(row.try_get::<Option<Vec<u8>>, _>(idx)?.into())
    }
}

// =============================================================================
// Row Schema
// =============================================================================

/// Ordered list of columns and the type each one maps to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSchema {
    fields: Vec<(String, TypeDescriptor)>,
}

impl RowSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.fields.push((name.into(), ty));
        self
    }

    pub fn fields(&self) -> &[(String, TypeDescriptor)] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromStr for RowSchema {
    type Err = MappingError;

    /// Parse `name:type,name:type`. Commas inside `array<...>` do not split.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut schema = RowSchema::new();
        for entry in split_top_level(s) {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let (name, ty) = entry.split_once(':').ok_or_else(|| {
                MappingError::config(format!("schema entry '{}' must be name:type", entry))
            })?;
            let name = name.trim();
            if name.is_empty() {
                return Err(MappingError::config(format!(
                    "schema entry '{}' has no column name",
                    entry
                )));
            }
            let ty = ty
                .parse::<TypeDescriptor>()
                .map_err(|e| MappingError::schema(e.to_string(), name))?;
            schema = schema.field(name, ty);
        }
        if schema.is_empty() {
            return Err(MappingError::config("schema has no fields"));
        }
        Ok(schema)
    }
}

fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Map a decoded row onto `schema`, producing a struct value.
///
/// Every schema field must be present in the row; extra row columns are ignored.
pub fn map_row<C>(row: &DecodedRow, schema: &RowSchema, converter: &C) -> MappingResult<Value>
where
    C: Converter + ?Sized,
{
    let mut fields = BTreeMap::new();
    for (name, ty) in schema.fields() {
        let value = row
            .get(name)
            .ok_or_else(|| MappingError::schema("Column missing from result set", name.as_str()))?;
        let converted = convert_value(value, ty, converter)?;
        fields.insert(name.clone(), converted);
    }
    Ok(Value::Struct(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{BinaryKind, PrimitiveKind, StandardConverter};
    use crate::error::ConversionError;

    #[test]
    fn test_categorize_type_integer() {
        assert_eq!(
            categorize_type("INT8", DatabaseType::PostgreSQL),
            TypeCategory::Integer
        );
        assert_eq!(
            categorize_type("INTEGER", DatabaseType::SQLite),
            TypeCategory::Integer
        );
        assert_eq!(
            categorize_type("SERIAL", DatabaseType::PostgreSQL),
            TypeCategory::Integer
        );
    }

    #[test]
    fn test_categorize_type_decimal() {
        assert_eq!(
            categorize_type("NUMERIC", DatabaseType::PostgreSQL),
            TypeCategory::Decimal
        );
        // SQLite NUMERIC is a float
        assert_eq!(
            categorize_type("numeric", DatabaseType::SQLite),
            TypeCategory::Float
        );
    }

    #[test]
    fn test_categorize_type_binary_and_arrays() {
        assert_eq!(
            categorize_type("BYTEA", DatabaseType::PostgreSQL),
            TypeCategory::Binary
        );
        assert_eq!(
            categorize_type("BLOB", DatabaseType::SQLite),
            TypeCategory::Binary
        );
        assert_eq!(
            categorize_type("TEXT[]", DatabaseType::PostgreSQL),
            TypeCategory::TextArray
        );
        assert_eq!(
            categorize_type("_text", DatabaseType::PostgreSQL),
            TypeCategory::TextArray
        );
        assert_eq!(
            categorize_type("INT4[]", DatabaseType::PostgreSQL),
            TypeCategory::IntegerArray
        );
        assert_eq!(
            categorize_type("_float8", DatabaseType::PostgreSQL),
            TypeCategory::FloatArray
        );
        assert_eq!(
            categorize_type("UUID[]", DatabaseType::PostgreSQL),
            TypeCategory::Unknown
        );
    }

    #[test]
    fn test_categorize_type_uuid_and_temporal() {
        assert_eq!(
            categorize_type("UUID", DatabaseType::PostgreSQL),
            TypeCategory::Uuid
        );
        for name in ["DATE", "TIME", "TIMESTAMP", "TIMESTAMPTZ"] {
            assert_eq!(
                categorize_type(name, DatabaseType::PostgreSQL),
                TypeCategory::Temporal,
                "{name}"
            );
        }
        assert_eq!(
            categorize_type("DATETIME", DatabaseType::SQLite),
            TypeCategory::Temporal
        );
    }

    #[test]
    fn test_categorize_type_postgres_int_lookalikes() {
        assert_eq!(
            categorize_type("INTERVAL", DatabaseType::PostgreSQL),
            TypeCategory::Unknown
        );
        assert_eq!(
            categorize_type("POINT", DatabaseType::PostgreSQL),
            TypeCategory::Unknown
        );
        // SQLite affinity still applies.
        assert_eq!(
            categorize_type("UNSIGNED BIG INT", DatabaseType::SQLite),
            TypeCategory::Integer
        );
    }

    /// Build the binary NUMERIC wire form.
    fn numeric_bytes(weight: i16, sign: u16, dscale: u16, digits: &[u16]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(digits.len() as u16).to_be_bytes());
        buf.extend_from_slice(&weight.to_be_bytes());
        buf.extend_from_slice(&sign.to_be_bytes());
        buf.extend_from_slice(&dscale.to_be_bytes());
        for digit in digits {
            buf.extend_from_slice(&digit.to_be_bytes());
        }
        buf
    }

    #[test]
    fn test_numeric_to_string() {
        let cases = [
            (numeric_bytes(0, 0, 1, &[1, 5000]), "1.5"),
            (numeric_bytes(1, 0, 0, &[12, 3456]), "123456"),
            (numeric_bytes(1, 0, 0, &[1]), "10000"),
            (numeric_bytes(0, NUMERIC_NEG, 2, &[42, 500]), "-42.05"),
            (numeric_bytes(-1, 0, 3, &[1230]), "0.123"),
            (numeric_bytes(-2, 0, 5, &[5000]), "0.00005"),
            (numeric_bytes(0, 0, 0, &[]), "0"),
            (numeric_bytes(0, 0, 2, &[]), "0.00"),
            (numeric_bytes(0, NUMERIC_NAN, 0, &[]), "NaN"),
            (numeric_bytes(0, NUMERIC_NINF, 0, &[]), "-Infinity"),
        ];
        for (bytes, expected) in cases {
            assert_eq!(numeric_to_string(&bytes).unwrap(), expected);
        }
    }

    #[test]
    fn test_numeric_to_string_truncated() {
        assert!(numeric_to_string(&[0, 1, 0]).is_err());
        // Header promises two digits, only one present.
        let mut bytes = numeric_bytes(0, 0, 0, &[7]);
        bytes[1] = 2;
        assert!(numeric_to_string(&bytes).is_err());
    }

    async fn sqlite_row(setup: &[&str], query: &str) -> SqliteRow {
        use sqlx::{Connection, SqliteConnection};

        let mut conn = SqliteConnection::connect("sqlite::memory:").await.unwrap();
        for sql in setup {
            sqlx::query(sql).execute(&mut conn).await.unwrap();
        }
        sqlx::query(query).fetch_one(&mut conn).await.unwrap()
    }

    #[tokio::test]
    async fn test_sqlite_value_keeps_storage_class_over_declared_type() {
        let row = sqlite_row(
            &[
                "CREATE TABLE t (n INTEGER, b BOOLEAN, r REAL)",
                "INSERT INTO t VALUES ('abc', 'yes', 'n/a')",
            ],
            "SELECT n, b, r FROM t",
        )
        .await;
        let decoded = row.to_values().unwrap();

        assert_eq!(decoded.get("n"), Some(&Value::String("abc".to_string())));
        assert_eq!(decoded.get("b"), Some(&Value::String("yes".to_string())));
        assert_eq!(decoded.get("r"), Some(&Value::String("n/a".to_string())));
    }

    #[tokio::test]
    async fn test_sqlite_only_sql_null_decodes_to_null() {
        let row = sqlite_row(
            &[
                "CREATE TABLE t (n INTEGER, b BOOLEAN, s TEXT)",
                "INSERT INTO t VALUES (7.5, NULL, 12)",
            ],
            "SELECT n, b, s FROM t",
        )
        .await;
        let decoded = row.to_values().unwrap();

        assert_eq!(decoded.get("n"), Some(&Value::F64(7.5)));
        assert_eq!(decoded.get("b"), Some(&Value::Null));
        // TEXT affinity stores the number as text.
        assert_eq!(decoded.get("s"), Some(&Value::String("12".to_string())));
    }

    #[test]
    fn test_decode_error_names_column() {
        let err = decode_error(
            "price",
            "NUMERIC",
            sqlx::Error::ColumnDecode {
                index: "0".to_string(),
                source: "mismatched types".into(),
            },
        );
        match err {
            MappingError::Schema { message, column } => {
                assert_eq!(column, "price");
                assert!(message.contains("NUMERIC"));
                assert!(message.contains("mismatched types"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_categorize_type_text_and_unknown() {
        assert_eq!(
            categorize_type("VARCHAR", DatabaseType::PostgreSQL),
            TypeCategory::Text
        );
        assert_eq!(
            categorize_type("NULL", DatabaseType::SQLite),
            TypeCategory::Unknown
        );
        assert_eq!(
            categorize_type("jsonb", DatabaseType::PostgreSQL),
            TypeCategory::Json
        );
    }

    #[test]
    fn test_schema_parse_with_nested_commas() {
        let schema: RowSchema = "id:i64, tags:array<string>, payload:bytes".parse().unwrap();
        assert_eq!(
            schema.fields(),
            &[
                ("id".to_string(), TypeDescriptor::Primitive(PrimitiveKind::I64)),
                (
                    "tags".to_string(),
                    TypeDescriptor::sequence_of(TypeDescriptor::String)
                ),
                (
                    "payload".to_string(),
                    TypeDescriptor::Binary(BinaryKind::Bytes)
                ),
            ]
        );
    }

    #[test]
    fn test_schema_parse_errors() {
        assert!("".parse::<RowSchema>().is_err());
        assert!("id".parse::<RowSchema>().is_err());
        assert!(":i64".parse::<RowSchema>().is_err());
        assert!(matches!(
            "id:uint".parse::<RowSchema>(),
            Err(MappingError::Schema { .. })
        ));
    }

    #[test]
    fn test_map_row() {
        let row = DecodedRow::new(vec![
            ("id".to_string(), Value::I64(7)),
            ("score".to_string(), Value::String("2.5".to_string())),
            ("extra".to_string(), Value::Null),
        ]);
        let schema: RowSchema = "id:i32,score:f64?".parse().unwrap();
        let mapped = map_row(&row, &schema, &StandardConverter).unwrap();

        let mut expected = BTreeMap::new();
        expected.insert("id".to_string(), Value::I32(7));
        expected.insert("score".to_string(), Value::F64(2.5));
        assert_eq!(mapped, Value::Struct(expected));
    }

    #[test]
    fn test_map_row_missing_column() {
        let row = DecodedRow::new(vec![("id".to_string(), Value::I64(1))]);
        let schema: RowSchema = "name:string".parse().unwrap();
        assert!(matches!(
            map_row(&row, &schema, &StandardConverter),
            Err(MappingError::Schema { .. })
        ));
    }

    #[test]
    fn test_map_row_null_into_primitive() {
        let row = DecodedRow::new(vec![("age".to_string(), Value::Null)]);
        let schema: RowSchema = "age:i32".parse().unwrap();
        match map_row(&row, &schema, &StandardConverter) {
            Err(MappingError::Conversion(err)) => {
                assert_eq!(err, ConversionError::null_to_primitive("i32"))
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_decoded_row_to_json() {
        let row = DecodedRow::new(vec![
            ("b".to_string(), Value::Bytes(vec![0xFF])),
            ("n".to_string(), Value::Null),
        ]);
        assert_eq!(row.to_json(), serde_json::json!({ "b": "/w==", "n": null }));
        assert_eq!(row.get("n"), Some(&Value::Null));
        assert_eq!(row.get("missing"), None);
    }
}
