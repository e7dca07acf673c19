//! Primitive promotion rules.

use crate::schema::AvroSchema;

/// Whether a value written as `writer` may be widened to `reader`.
///
/// The relation is asymmetric: `int` promotes to `long`, `float`, and
/// `double`; `long` to `float` and `double`; `float` to `double`; `string`
/// and `bytes` promote to each other. Everything else is incompatible.
///
/// Only meaningful for schemas of differing kinds; callers dispatch
/// equal-kind pairs elsewhere.
pub fn is_promotable(writer: &AvroSchema, reader: &AvroSchema) -> bool {
    debug_assert!(
        writer.kind() != reader.kind(),
        "promotion is only defined between differing schema kinds"
    );
    matches!(
        (writer.base(), reader.base()),
        (AvroSchema::Int, AvroSchema::Long)
            | (AvroSchema::Int, AvroSchema::Float)
            | (AvroSchema::Int, AvroSchema::Double)
            | (AvroSchema::Long, AvroSchema::Float)
            | (AvroSchema::Long, AvroSchema::Double)
            | (AvroSchema::Float, AvroSchema::Double)
            | (AvroSchema::String, AvroSchema::Bytes)
            | (AvroSchema::Bytes, AvroSchema::String)
    )
}
