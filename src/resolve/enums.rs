//! Enum symbol remapping.

use crate::provider::ResolverData;
use crate::resolve::action::{Action, ActionKind, EnumAdjust, ErrorKind};
use crate::schema::{AvroSchema, EnumSchema};

/// Build the action resolving two enum schemas.
///
/// A symbol's adjustment is its index in the reader's symbol list; a symbol
/// the reader lacks falls back to the reader's default symbol, and when the
/// reader declares no default the adjustment is empty, deferring the
/// failure to decode time (the symbol may never occur in the data).
pub(crate) fn resolve(
    writer_enum: &EnumSchema,
    reader_enum: &EnumSchema,
    writer: &AvroSchema,
    reader: &AvroSchema,
    data: &dyn ResolverData,
) -> Action {
    let writer_name = writer_enum.fullname();
    if writer_name.is_some() && writer_name != reader_enum.fullname() {
        return Action::new(
            writer.clone(),
            Some(reader.clone()),
            data,
            ActionKind::Error(ErrorKind::NamesDontMatch),
        );
    }

    let default_index = reader_enum
        .default
        .as_ref()
        .and_then(|d| reader_enum.symbol_index(d));

    let adjustments: Vec<Option<usize>> = writer_enum
        .symbols
        .iter()
        .map(|symbol| reader_enum.symbol_index(symbol).or(default_index))
        .collect();

    Action::new(
        writer.clone(),
        Some(reader.clone()),
        data,
        ActionKind::EnumAdjust(EnumAdjust::new(adjustments, reader_enum.symbols.len())),
    )
}
