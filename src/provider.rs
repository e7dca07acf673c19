//! Collaborator interfaces consumed during resolution.
//!
//! Resolution needs two things from its embedding: a lookup from logical
//! types to the conversions a decoder should apply, and a way to turn a
//! reader field's declared default literal into an in-memory value. Both
//! are supplied through [`ResolverData`]; [`StandardData`] is the stock
//! implementation used by the convenience entry point.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::SchemaError;
use crate::schema::{AvroSchema, FieldSchema, LogicalTypeName};
use crate::value::AvroValue;

/// A value transform associated with a logical type.
///
/// The resolver treats conversions as opaque: it looks one up per resolved
/// node whose reader schema carries a logical type and caches it on the
/// produced action for the decoder to apply.
pub trait Conversion: fmt::Debug + Send + Sync {
    /// The logical type this conversion handles.
    fn logical_type(&self) -> &LogicalTypeName;
}

/// Supplies conversions and default values during resolution.
pub trait ResolverData {
    /// Look up the conversion registered for a logical type.
    ///
    /// Called once per resolved node whose reader schema carries a logical
    /// type; the result is cached on the produced action.
    fn conversion_for(&self, logical_type: &LogicalTypeName) -> Option<Arc<dyn Conversion>>;

    /// Materialize a reader field's declared default into an in-memory
    /// value.
    ///
    /// Called exactly once per reader-only defaulted field. Must be
    /// deterministic and side-effect-free.
    fn default_value_of(&self, field: &FieldSchema) -> Result<AvroValue, SchemaError>;
}

/// Stock [`ResolverData`]: no registered conversions, default literals
/// materialized per the Avro JSON encoding rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardData;

impl ResolverData for StandardData {
    fn conversion_for(&self, _logical_type: &LogicalTypeName) -> Option<Arc<dyn Conversion>> {
        None
    }

    fn default_value_of(&self, field: &FieldSchema) -> Result<AvroValue, SchemaError> {
        let default = field.default.as_ref().ok_or_else(|| {
            SchemaError::InvalidDefault(format!("field '{}' has no default value", field.name))
        })?;
        json_to_avro_value(default, &field.schema)
    }
}

/// Convert a JSON default literal to an [`AvroValue`] under a schema.
///
/// Follows the Avro JSON encoding for defaults: bytes and fixed defaults
/// are ISO-8859-1 strings, enum defaults are symbol names, and a union
/// default is typed by the union's first branch.
pub fn json_to_avro_value(json: &Value, schema: &AvroSchema) -> Result<AvroValue, SchemaError> {
    match (json, schema) {
        (Value::Null, AvroSchema::Null) => Ok(AvroValue::Null),

        (Value::Bool(b), AvroSchema::Boolean) => Ok(AvroValue::Boolean(*b)),

        (Value::Number(n), AvroSchema::Int) => {
            let v = n.as_i64().ok_or_else(|| {
                SchemaError::InvalidDefault(format!("cannot convert {} to int", n))
            })?;
            if v < i32::MIN as i64 || v > i32::MAX as i64 {
                return Err(SchemaError::InvalidDefault(format!(
                    "value {} out of range for int",
                    v
                )));
            }
            Ok(AvroValue::Int(v as i32))
        }
        (Value::Number(n), AvroSchema::Long) => {
            let v = n.as_i64().ok_or_else(|| {
                SchemaError::InvalidDefault(format!("cannot convert {} to long", n))
            })?;
            Ok(AvroValue::Long(v))
        }

        (Value::Number(n), AvroSchema::Float) => {
            let v = n.as_f64().ok_or_else(|| {
                SchemaError::InvalidDefault(format!("cannot convert {} to float", n))
            })?;
            Ok(AvroValue::Float(v as f32))
        }
        (Value::Number(n), AvroSchema::Double) => {
            let v = n.as_f64().ok_or_else(|| {
                SchemaError::InvalidDefault(format!("cannot convert {} to double", n))
            })?;
            Ok(AvroValue::Double(v))
        }

        (Value::String(s), AvroSchema::String) => Ok(AvroValue::String(s.clone())),

        // Bytes defaults are encoded as ISO-8859-1 strings in JSON
        (Value::String(s), AvroSchema::Bytes) => {
            Ok(AvroValue::Bytes(s.chars().map(|c| c as u8).collect()))
        }

        (Value::String(s), AvroSchema::Fixed(fixed)) => {
            let bytes: Vec<u8> = s.chars().map(|c| c as u8).collect();
            if bytes.len() != fixed.size {
                return Err(SchemaError::InvalidDefault(format!(
                    "fixed default has wrong size: expected {}, got {}",
                    fixed.size,
                    bytes.len()
                )));
            }
            Ok(AvroValue::Fixed(bytes))
        }

        (Value::String(s), AvroSchema::Enum(enum_schema)) => {
            let index = enum_schema.symbol_index(s).ok_or_else(|| {
                SchemaError::InvalidDefault(format!(
                    "unknown enum symbol '{}' for enum '{}'",
                    s,
                    enum_schema.name.as_deref().unwrap_or("<anonymous>")
                ))
            })?;
            Ok(AvroValue::Enum(index as i32, s.clone()))
        }

        (Value::Array(arr), AvroSchema::Array(item_schema)) => {
            let items: Result<Vec<AvroValue>, SchemaError> = arr
                .iter()
                .map(|item| json_to_avro_value(item, item_schema))
                .collect();
            Ok(AvroValue::Array(items?))
        }

        (Value::Object(obj), AvroSchema::Map(value_schema)) => {
            let entries: Result<Vec<(String, AvroValue)>, SchemaError> = obj
                .iter()
                .map(|(k, v)| Ok((k.clone(), json_to_avro_value(v, value_schema)?)))
                .collect();
            Ok(AvroValue::Map(entries?))
        }

        (Value::Object(obj), AvroSchema::Record(record_schema)) => {
            let fields: Result<Vec<(String, AvroValue)>, SchemaError> = record_schema
                .fields
                .iter()
                .map(|field| {
                    let value = match obj.get(&field.name) {
                        Some(v) => json_to_avro_value(v, &field.schema)?,
                        None => match &field.default {
                            Some(default) => json_to_avro_value(default, &field.schema)?,
                            None => {
                                return Err(SchemaError::InvalidDefault(format!(
                                    "missing required field '{}' in default value",
                                    field.name
                                )));
                            }
                        },
                    };
                    Ok((field.name.clone(), value))
                })
                .collect();
            Ok(AvroValue::Record(fields?))
        }

        // A union default is always typed by the first branch
        (json, AvroSchema::Union(branches)) => {
            let first = branches.first().ok_or_else(|| {
                SchemaError::InvalidDefault("empty union in default value".to_string())
            })?;
            let value = json_to_avro_value(json, first)?;
            Ok(AvroValue::Union(0, Box::new(value)))
        }

        (json, AvroSchema::Logical(logical)) => {
            let base_value = json_to_avro_value(json, &logical.base)?;
            Ok(to_logical_value(base_value, &logical.logical_type))
        }

        (json, schema) => Err(SchemaError::InvalidDefault(format!(
            "cannot convert JSON {:?} to schema {:?}",
            json, schema
        ))),
    }
}

/// Lift a base value into its logical form.
fn to_logical_value(value: AvroValue, logical_type: &LogicalTypeName) -> AvroValue {
    match (value, logical_type) {
        (AvroValue::Int(days), LogicalTypeName::Date) => AvroValue::Date(days),
        (AvroValue::Int(millis), LogicalTypeName::TimeMillis) => AvroValue::TimeMillis(millis),
        (AvroValue::Long(micros), LogicalTypeName::TimeMicros) => AvroValue::TimeMicros(micros),
        (AvroValue::Long(millis), LogicalTypeName::TimestampMillis) => {
            AvroValue::TimestampMillis(millis)
        }
        (AvroValue::Long(micros), LogicalTypeName::TimestampMicros) => {
            AvroValue::TimestampMicros(micros)
        }
        (AvroValue::Long(millis), LogicalTypeName::LocalTimestampMillis) => {
            AvroValue::TimestampMillis(millis)
        }
        (AvroValue::Long(micros), LogicalTypeName::LocalTimestampMicros) => {
            AvroValue::TimestampMicros(micros)
        }
        (AvroValue::String(s), LogicalTypeName::Uuid) => AvroValue::Uuid(s),
        (AvroValue::Bytes(b), LogicalTypeName::Decimal { precision, scale })
        | (AvroValue::Fixed(b), LogicalTypeName::Decimal { precision, scale }) => {
            AvroValue::Decimal {
                unscaled: b,
                precision: *precision,
                scale: *scale,
            }
        }
        (AvroValue::Fixed(b), LogicalTypeName::Duration) if b.len() == 12 => {
            let months = u32::from_le_bytes([b[0], b[1], b[2], b[3]]);
            let days = u32::from_le_bytes([b[4], b[5], b[6], b[7]]);
            let milliseconds = u32::from_le_bytes([b[8], b[9], b[10], b[11]]);
            AvroValue::Duration {
                months,
                days,
                milliseconds,
            }
        }
        // Pass through if no lifting applies
        (value, _) => value,
    }
}
