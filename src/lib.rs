//! Avro reader/writer schema resolution planner.
//!
//! This library computes the plan for reading data written under one Avro
//! schema (the writer schema) as another (the reader schema): which fields
//! to skip, reorder, or fill from defaults, which primitives to widen,
//! which union branches match, and which enum symbols to remap. The output
//! is an immutable action graph that a decoder walks while consuming
//! bytes; no bytes are read or written here.
//!
//! # Example
//! ```
//! use flightplan::{parse_schema, resolve, ActionKind};
//!
//! let writer = parse_schema(r#""int""#).unwrap();
//! let reader = parse_schema(r#""long""#).unwrap();
//! let plan = resolve(&writer, &reader).unwrap();
//! assert!(matches!(plan.root().kind, ActionKind::Promote));
//! ```

pub mod error;
pub mod provider;
pub mod resolve;
pub mod schema;
pub mod value;

// Re-export main types
pub use error::SchemaError;
pub use provider::{json_to_avro_value, Conversion, ResolverData, StandardData};
pub use resolve::{
    is_promotable, resolve, resolve_with, Action, ActionKind, ActionRef, EnumAdjust, ErrorKind,
    RecordAdjust, ResolutionPlan,
};
pub use schema::{
    apply_aliases, parse_schema, AvroSchema, EnumSchema, FieldSchema, FixedSchema, LogicalType,
    LogicalTypeName, NameRegistry, RecordSchema, SchemaKind, SchemaParser,
};
pub use value::AvroValue;
