//! JSON schema parser.
//!
//! Parses Avro schema JSON into the [`AvroSchema`] type hierarchy. Named
//! types are registered as they are defined so later occurrences of the same
//! name (including recursive self-references) parse as [`AvroSchema::Named`]
//! references.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::SchemaError;
use crate::schema::{
    AvroSchema, EnumSchema, FieldSchema, FixedSchema, LogicalType, LogicalTypeName, RecordSchema,
};

/// Parse an Avro schema from a JSON string.
///
/// # Example
/// ```
/// use flightplan::schema::parse_schema;
///
/// let schema = parse_schema(r#""string""#).unwrap();
/// ```
pub fn parse_schema(json: &str) -> Result<AvroSchema, SchemaError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| SchemaError::ParseError(format!("Invalid JSON: {}", e)))?;

    let mut parser = SchemaParser::new();
    parser.parse(&value)
}

/// Schema parser with named type resolution context.
///
/// Maintains a registry of named types (records, enums, fixed) so that type
/// references encountered later in the document resolve to the definitions
/// parsed earlier.
#[derive(Debug, Default)]
pub struct SchemaParser {
    /// Registry of named types by their fully qualified name
    named_types: HashMap<String, AvroSchema>,
    /// Current namespace for resolving unqualified names
    current_namespace: Option<String>,
}

impl SchemaParser {
    /// Create a new SchemaParser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON value into an AvroSchema.
    pub fn parse(&mut self, value: &Value) -> Result<AvroSchema, SchemaError> {
        match value {
            Value::String(s) => self.parse_string_schema(s),
            Value::Object(obj) => self.parse_object_schema(obj),
            Value::Array(arr) => self.parse_union_schema(arr),
            _ => Err(SchemaError::InvalidSchema(format!(
                "Expected string, object, or array, found: {:?}",
                value
            ))),
        }
    }

    /// Get a named type from the registry.
    pub fn get_named_type(&self, name: &str) -> Option<&AvroSchema> {
        self.named_types.get(name)
    }

    /// Get all registered named types.
    pub fn named_types(&self) -> &HashMap<String, AvroSchema> {
        &self.named_types
    }

    /// Parse a primitive type or named type reference from a string.
    fn parse_string_schema(&self, s: &str) -> Result<AvroSchema, SchemaError> {
        match s {
            "null" => Ok(AvroSchema::Null),
            "boolean" => Ok(AvroSchema::Boolean),
            "int" => Ok(AvroSchema::Int),
            "long" => Ok(AvroSchema::Long),
            "float" => Ok(AvroSchema::Float),
            "double" => Ok(AvroSchema::Double),
            "bytes" => Ok(AvroSchema::Bytes),
            "string" => Ok(AvroSchema::String),
            // Anything else is a named type reference; it may refer to a
            // definition not parsed yet (recursive context), so no existence
            // check happens here.
            name => Ok(AvroSchema::Named(self.resolve_name(name))),
        }
    }

    /// Parse a complex type from a JSON object.
    fn parse_object_schema(
        &mut self,
        obj: &serde_json::Map<String, Value>,
    ) -> Result<AvroSchema, SchemaError> {
        if let Some(logical_type) = obj.get("logicalType") {
            return self.parse_logical_type(obj, logical_type);
        }

        let type_str = obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or_else(|| SchemaError::InvalidSchema("Missing 'type' field".to_string()))?;

        match type_str {
            "null" => Ok(AvroSchema::Null),
            "boolean" => Ok(AvroSchema::Boolean),
            "int" => Ok(AvroSchema::Int),
            "long" => Ok(AvroSchema::Long),
            "float" => Ok(AvroSchema::Float),
            "double" => Ok(AvroSchema::Double),
            "bytes" => Ok(AvroSchema::Bytes),
            "string" => Ok(AvroSchema::String),

            "record" => self.parse_record_schema(obj),
            "enum" => self.parse_enum_schema(obj),
            "array" => self.parse_array_schema(obj),
            "map" => self.parse_map_schema(obj),
            "fixed" => self.parse_fixed_schema(obj),

            other => {
                let fullname = self.resolve_name(other);
                if self.named_types.contains_key(&fullname) {
                    Ok(AvroSchema::Named(fullname))
                } else {
                    Err(SchemaError::InvalidSchema(format!(
                        "Unknown type: {}",
                        other
                    )))
                }
            }
        }
    }

    /// Parse a union schema from a JSON array.
    fn parse_union_schema(&mut self, arr: &[Value]) -> Result<AvroSchema, SchemaError> {
        if arr.is_empty() {
            return Err(SchemaError::InvalidSchema(
                "Union schema cannot be empty".to_string(),
            ));
        }

        let branches: Result<Vec<AvroSchema>, SchemaError> =
            arr.iter().map(|v| self.parse(v)).collect();

        Ok(AvroSchema::Union(branches?))
    }

    /// Parse a record schema.
    fn parse_record_schema(
        &mut self,
        obj: &serde_json::Map<String, Value>,
    ) -> Result<AvroSchema, SchemaError> {
        let (name, namespace, fullname) = self.named_type_header(obj, "Record")?;

        // Register a placeholder before parsing fields so recursive
        // references to the enclosing record parse as Named.
        self.named_types
            .insert(fullname.clone(), AvroSchema::Named(fullname.clone()));

        let prev_namespace = self.current_namespace.clone();
        if namespace.is_some() {
            self.current_namespace = namespace.clone();
        }

        let fields_value = obj
            .get("fields")
            .and_then(|v| v.as_array())
            .ok_or_else(|| {
                SchemaError::InvalidSchema("Record missing 'fields' array".to_string())
            })?;

        let fields: Result<Vec<FieldSchema>, SchemaError> = fields_value
            .iter()
            .map(|f| self.parse_field_schema(f))
            .collect();

        self.current_namespace = prev_namespace;

        let record = RecordSchema {
            name: Some(name),
            namespace,
            fields: fields?,
            doc: doc_of(obj),
            aliases: aliases_of(obj),
        };

        let schema = AvroSchema::Record(record);
        self.named_types.insert(fullname, schema.clone());

        Ok(schema)
    }

    /// Parse a field schema within a record.
    fn parse_field_schema(&mut self, value: &Value) -> Result<FieldSchema, SchemaError> {
        let obj = value
            .as_object()
            .ok_or_else(|| SchemaError::InvalidSchema("Field must be an object".to_string()))?;

        let name = obj
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| SchemaError::InvalidSchema("Field missing 'name'".to_string()))?
            .to_string();

        let type_value = obj
            .get("type")
            .ok_or_else(|| SchemaError::InvalidSchema("Field missing 'type'".to_string()))?;

        let schema = self.parse(type_value)?;

        Ok(FieldSchema {
            name,
            schema,
            default: obj.get("default").cloned(),
            doc: doc_of(obj),
            aliases: aliases_of(obj),
        })
    }

    /// Parse an enum schema.
    fn parse_enum_schema(
        &mut self,
        obj: &serde_json::Map<String, Value>,
    ) -> Result<AvroSchema, SchemaError> {
        let (name, namespace, fullname) = self.named_type_header(obj, "Enum")?;

        let symbols = obj
            .get("symbols")
            .and_then(|v| v.as_array())
            .ok_or_else(|| SchemaError::InvalidSchema("Enum missing 'symbols' array".to_string()))?
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect::<Vec<_>>();

        if symbols.is_empty() {
            return Err(SchemaError::InvalidSchema(
                "Enum must have at least one symbol".to_string(),
            ));
        }

        let default = obj
            .get("default")
            .and_then(|v| v.as_str())
            .map(String::from);

        let enum_schema = EnumSchema {
            name: Some(name),
            namespace,
            symbols,
            doc: doc_of(obj),
            aliases: aliases_of(obj),
            default,
        };

        let schema = AvroSchema::Enum(enum_schema);
        self.named_types.insert(fullname, schema.clone());

        Ok(schema)
    }

    /// Parse an array schema.
    fn parse_array_schema(
        &mut self,
        obj: &serde_json::Map<String, Value>,
    ) -> Result<AvroSchema, SchemaError> {
        let items = obj
            .get("items")
            .ok_or_else(|| SchemaError::InvalidSchema("Array missing 'items' field".to_string()))?;

        let item_schema = self.parse(items)?;
        Ok(AvroSchema::Array(Box::new(item_schema)))
    }

    /// Parse a map schema.
    fn parse_map_schema(
        &mut self,
        obj: &serde_json::Map<String, Value>,
    ) -> Result<AvroSchema, SchemaError> {
        let values = obj
            .get("values")
            .ok_or_else(|| SchemaError::InvalidSchema("Map missing 'values' field".to_string()))?;

        let value_schema = self.parse(values)?;
        Ok(AvroSchema::Map(Box::new(value_schema)))
    }

    /// Parse a fixed schema.
    fn parse_fixed_schema(
        &mut self,
        obj: &serde_json::Map<String, Value>,
    ) -> Result<AvroSchema, SchemaError> {
        let (name, namespace, fullname) = self.named_type_header(obj, "Fixed")?;

        let size =
            obj.get("size").and_then(|v| v.as_u64()).ok_or_else(|| {
                SchemaError::InvalidSchema("Fixed missing 'size' field".to_string())
            })? as usize;

        let fixed_schema = FixedSchema {
            name: Some(name),
            namespace,
            size,
            doc: doc_of(obj),
            aliases: aliases_of(obj),
        };

        let schema = AvroSchema::Fixed(fixed_schema);
        self.named_types.insert(fullname, schema.clone());

        Ok(schema)
    }

    /// Parse a logical type annotation.
    fn parse_logical_type(
        &mut self,
        obj: &serde_json::Map<String, Value>,
        logical_type_value: &Value,
    ) -> Result<AvroSchema, SchemaError> {
        let logical_type_name = logical_type_value.as_str().ok_or_else(|| {
            SchemaError::InvalidSchema("logicalType must be a string".to_string())
        })?;

        let type_str = obj.get("type").and_then(|v| v.as_str()).ok_or_else(|| {
            SchemaError::InvalidSchema("Logical type missing 'type' field".to_string())
        })?;

        let base_schema = match type_str {
            "null" => AvroSchema::Null,
            "boolean" => AvroSchema::Boolean,
            "int" => AvroSchema::Int,
            "long" => AvroSchema::Long,
            "float" => AvroSchema::Float,
            "double" => AvroSchema::Double,
            "bytes" => AvroSchema::Bytes,
            "string" => AvroSchema::String,
            "fixed" => self.parse_fixed_schema(obj)?,
            other => {
                return Err(SchemaError::InvalidSchema(format!(
                    "Invalid base type for logical type: {}",
                    other
                )))
            }
        };

        let logical_type = match logical_type_name {
            "decimal" => {
                let precision = obj
                    .get("precision")
                    .and_then(|v| v.as_u64())
                    .ok_or_else(|| {
                        SchemaError::InvalidSchema("Decimal missing 'precision'".to_string())
                    })? as u32;

                let scale = obj.get("scale").and_then(|v| v.as_u64()).unwrap_or(0) as u32;

                LogicalTypeName::Decimal { precision, scale }
            }
            "uuid" => LogicalTypeName::Uuid,
            "date" => LogicalTypeName::Date,
            "time-millis" => LogicalTypeName::TimeMillis,
            "time-micros" => LogicalTypeName::TimeMicros,
            "timestamp-millis" => LogicalTypeName::TimestampMillis,
            "timestamp-micros" => LogicalTypeName::TimestampMicros,
            "duration" => LogicalTypeName::Duration,
            "local-timestamp-millis" => LogicalTypeName::LocalTimestampMillis,
            "local-timestamp-micros" => LogicalTypeName::LocalTimestampMicros,
            // Unknown logical types are ignored and the base type used as-is
            _other => return Ok(base_schema),
        };

        Ok(AvroSchema::Logical(LogicalType::new(
            base_schema,
            logical_type,
        )))
    }

    /// Extract name, namespace, and fully qualified name for a named type.
    fn named_type_header(
        &self,
        obj: &serde_json::Map<String, Value>,
        context: &str,
    ) -> Result<(String, Option<String>, String), SchemaError> {
        let raw_name = obj
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                SchemaError::InvalidSchema(format!("{} missing 'name' field", context))
            })?
            .to_string();

        // A dotted name carries its own namespace
        let (name, explicit_ns) = match raw_name.rsplit_once('.') {
            Some((ns, short)) => (short.to_string(), Some(ns.to_string())),
            None => (raw_name, None),
        };

        let namespace = explicit_ns
            .or_else(|| {
                obj.get("namespace")
                    .and_then(|v| v.as_str())
                    .map(String::from)
            })
            .or_else(|| self.current_namespace.clone());

        let fullname = match &namespace {
            Some(ns) => format!("{}.{}", ns, name),
            None => name.clone(),
        };

        Ok((name, namespace, fullname))
    }

    /// Resolve a type name to its fully qualified form.
    fn resolve_name(&self, name: &str) -> String {
        if name.contains('.') {
            name.to_string()
        } else if let Some(ns) = &self.current_namespace {
            format!("{}.{}", ns, name)
        } else {
            name.to_string()
        }
    }
}

fn doc_of(obj: &serde_json::Map<String, Value>) -> Option<String> {
    obj.get("doc").and_then(|v| v.as_str()).map(String::from)
}

fn aliases_of(obj: &serde_json::Map<String, Value>) -> Vec<String> {
    obj.get("aliases")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}
