//! Registry of named types, used to dereference `Named` schema references.
//!
//! The resolver never rewrites a schema tree to eliminate references;
//! instead it dereferences them on demand through a registry. The registry
//! owns exactly one instance per fully qualified name, so every dereference
//! of the same name yields the same `&AvroSchema` address — the property the
//! resolver's identity-keyed memoization relies on.

use std::collections::HashMap;

use crate::error::SchemaError;
use crate::schema::AvroSchema;

/// Registry of named types (records, enums, fixed) by fully qualified name.
#[derive(Debug, Clone, Default)]
pub struct NameRegistry {
    named_types: HashMap<String, AvroSchema>,
}

impl NameRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named type.
    pub fn register(&mut self, name: String, schema: AvroSchema) {
        self.named_types.insert(name, schema);
    }

    /// Get a named type.
    pub fn get(&self, name: &str) -> Option<&AvroSchema> {
        self.named_types.get(name)
    }

    /// Check if a named type exists.
    pub fn contains(&self, name: &str) -> bool {
        self.named_types.contains_key(name)
    }

    /// Build a registry by extracting all named types from a schema.
    pub fn build_from_schema(schema: &AvroSchema) -> Self {
        let mut registry = Self::new();
        registry.extract_named_types(schema);
        registry
    }

    /// Dereference a schema: `Named` references resolve to their registered
    /// definition, anything else passes through unchanged.
    pub fn deref<'a>(&'a self, schema: &'a AvroSchema) -> Result<&'a AvroSchema, SchemaError> {
        match schema {
            AvroSchema::Named(name) => self
                .named_types
                .get(name)
                .ok_or_else(|| SchemaError::UnresolvedReference(name.clone())),
            other => Ok(other),
        }
    }

    /// The canonical instance for a schema: for a registered named type this
    /// is the registry's instance (so that recursive references resolve to
    /// the same address), otherwise the schema itself.
    pub fn canonical<'a>(&'a self, schema: &'a AvroSchema) -> &'a AvroSchema {
        if let Some(fullname) = schema.fullname() {
            if let Some(registered) = self.named_types.get(&fullname) {
                return registered;
            }
        }
        schema
    }

    fn extract_named_types(&mut self, schema: &AvroSchema) {
        match schema {
            AvroSchema::Record(record) => {
                if let Some(fullname) = record.fullname() {
                    // First definition wins; a re-registration would move
                    // the instance other parts of the tree already refer to.
                    if self.named_types.contains_key(&fullname) {
                        return;
                    }
                    self.named_types.insert(fullname, schema.clone());
                }
                for field in &record.fields {
                    self.extract_named_types(&field.schema);
                }
            }
            AvroSchema::Enum(enum_schema) => {
                if let Some(fullname) = enum_schema.fullname() {
                    self.named_types.entry(fullname).or_insert_with(|| schema.clone());
                }
            }
            AvroSchema::Fixed(fixed_schema) => {
                if let Some(fullname) = fixed_schema.fullname() {
                    self.named_types.entry(fullname).or_insert_with(|| schema.clone());
                }
            }
            AvroSchema::Array(item_schema) => {
                self.extract_named_types(item_schema);
            }
            AvroSchema::Map(value_schema) => {
                self.extract_named_types(value_schema);
            }
            AvroSchema::Union(branches) => {
                for branch in branches {
                    self.extract_named_types(branch);
                }
            }
            AvroSchema::Logical(logical) => {
                self.extract_named_types(&logical.base);
            }
            // Primitives and Named references define nothing
            _ => {}
        }
    }
}
