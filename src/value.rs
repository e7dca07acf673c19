//! In-memory value representation.
//!
//! Within this crate, values appear in exactly one place: materialized
//! default values carried by record realignment actions, to be injected by
//! a decoder for reader fields the writer never wrote.

/// A materialized Avro value.
#[derive(Debug, Clone, PartialEq)]
pub enum AvroValue {
    /// Null value
    Null,
    /// Boolean value
    Boolean(bool),
    /// 32-bit signed integer
    Int(i32),
    /// 64-bit signed integer
    Long(i64),
    /// 32-bit floating point
    Float(f32),
    /// 64-bit floating point
    Double(f64),
    /// Byte array
    Bytes(Vec<u8>),
    /// UTF-8 string
    String(String),
    /// Record with named fields
    Record(Vec<(String, AvroValue)>),
    /// Enum variant (index and symbol name)
    Enum(i32, String),
    /// Array of values
    Array(Vec<AvroValue>),
    /// Map with string keys
    Map(Vec<(String, AvroValue)>),
    /// Union variant (branch index and value)
    Union(i32, Box<AvroValue>),
    /// Fixed-size byte array
    Fixed(Vec<u8>),

    // Logical type values
    /// Decimal value (unscaled bytes, precision, scale)
    Decimal {
        /// The unscaled value as big-endian two's complement bytes
        unscaled: Vec<u8>,
        /// The precision (total number of digits)
        precision: u32,
        /// The scale (number of digits after decimal point)
        scale: u32,
    },
    /// UUID value (as string)
    Uuid(String),
    /// Date value (days since Unix epoch, 1970-01-01)
    Date(i32),
    /// Time in milliseconds since midnight
    TimeMillis(i32),
    /// Time in microseconds since midnight
    TimeMicros(i64),
    /// Timestamp in milliseconds since Unix epoch
    TimestampMillis(i64),
    /// Timestamp in microseconds since Unix epoch
    TimestampMicros(i64),
    /// Duration (months, days, milliseconds)
    Duration {
        /// Number of months
        months: u32,
        /// Number of days
        days: u32,
        /// Number of milliseconds
        milliseconds: u32,
    },
}
