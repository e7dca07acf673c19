//! Reader/writer schema resolution.
//!
//! Given the schema data was written with and the schema a consumer wants
//! to read it as, [`resolve`] computes a [`ResolutionPlan`]: an immutable
//! graph of actions a decoder walks while consuming bytes. Resolution
//! itself never touches bytes, and schema mismatches never fail the build;
//! they are embedded as error actions that only surface if data actually
//! reaches them (a mismatched union branch or record field may simply
//! never occur in the data).

mod action;
mod enums;
mod promote;
mod record;
mod union;

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::error::SchemaError;
use crate::provider::{ResolverData, StandardData};
use crate::schema::{apply_aliases, AvroSchema, NameRegistry};

pub use action::{Action, ActionKind, ActionRef, EnumAdjust, ErrorKind, RecordAdjust, ResolutionPlan};
pub use promote::is_promotable;

/// Compute the resolution plan for a writer/reader schema pair, using the
/// stock [`StandardData`] provider.
pub fn resolve(writer: &AvroSchema, reader: &AvroSchema) -> Result<ResolutionPlan, SchemaError> {
    resolve_with(writer, reader, &StandardData)
}

/// Compute the resolution plan for a writer/reader schema pair.
///
/// The reader's declared aliases are applied to the writer schema exactly
/// once, up front; everything downstream matches by the rewritten names.
/// An `Err` is returned only for structurally invalid input (an
/// unresolvable named reference, a malformed default literal); shape
/// mismatches between the two schemas become error actions inside the
/// plan instead.
pub fn resolve_with(
    writer: &AvroSchema,
    reader: &AvroSchema,
    data: &dyn ResolverData,
) -> Result<ResolutionPlan, SchemaError> {
    let writer = apply_aliases(writer, reader);
    let writer_names = NameRegistry::build_from_schema(&writer);
    let reader_names = NameRegistry::build_from_schema(reader);

    debug!(
        writer = writer.fullname().as_deref().unwrap_or("<unnamed>"),
        reader = reader.fullname().as_deref().unwrap_or("<unnamed>"),
        "building resolution plan"
    );

    let mut resolver = Resolver {
        data,
        writer_names: &writer_names,
        reader_names: &reader_names,
        actions: Vec::new(),
        seen: HashMap::new(),
    };

    // Start from the registry's instances so that recursive references,
    // which dereference through the registry, land on the root's own memo
    // entry rather than a second expansion.
    let writer_root = writer_names.canonical(&writer);
    let reader_root = reader_names.canonical(reader);
    let root = resolver.resolve(writer_root, reader_root)?;

    trace!(actions = resolver.actions.len(), "resolution plan built");
    Ok(ResolutionPlan::new(resolver.actions, root))
}

/// Identity of a schema node: its address. Two structurally equal but
/// distinct instances are distinct cache keys.
pub(crate) fn schema_id(schema: &AvroSchema) -> usize {
    schema as *const AvroSchema as usize
}

/// One resolution pass: the action arena under construction plus the
/// per-call memoization of record pairs, keyed by schema identity. Lives
/// only for the duration of a single top-level `resolve` call.
pub(crate) struct Resolver<'a> {
    pub(crate) data: &'a dyn ResolverData,
    pub(crate) writer_names: &'a NameRegistry,
    pub(crate) reader_names: &'a NameRegistry,
    pub(crate) actions: Vec<Action>,
    pub(crate) seen: HashMap<(usize, usize), ActionRef>,
}

impl<'a> Resolver<'a> {
    pub(crate) fn push(&mut self, action: Action) -> ActionRef {
        self.actions.push(action);
        ActionRef(self.actions.len() - 1)
    }

    /// Pair a writer and reader node and build the action resolving them.
    pub(crate) fn resolve(
        &mut self,
        writer: &'a AvroSchema,
        reader: &'a AvroSchema,
    ) -> Result<ActionRef, SchemaError> {
        let writer = self.writer_names.deref(writer)?;
        let reader = self.reader_names.deref(reader)?;
        let data = self.data;

        // A writer union takes this path no matter what the reader is.
        if matches!(writer, AvroSchema::Union(_)) {
            return self.resolve_writer_union(writer, reader);
        }

        match (writer.base(), reader.base()) {
            (AvroSchema::Null, AvroSchema::Null)
            | (AvroSchema::Boolean, AvroSchema::Boolean)
            | (AvroSchema::Int, AvroSchema::Int)
            | (AvroSchema::Long, AvroSchema::Long)
            | (AvroSchema::Float, AvroSchema::Float)
            | (AvroSchema::Double, AvroSchema::Double)
            | (AvroSchema::Bytes, AvroSchema::Bytes)
            | (AvroSchema::String, AvroSchema::String) => {
                let action =
                    Action::new(writer.clone(), Some(reader.clone()), data, ActionKind::DoNothing);
                Ok(self.push(action))
            }

            (AvroSchema::Fixed(w_fixed), AvroSchema::Fixed(r_fixed)) => {
                let writer_name = w_fixed.fullname();
                let kind = if writer_name.is_some() && writer_name != r_fixed.fullname() {
                    ActionKind::Error(ErrorKind::NamesDontMatch)
                } else if w_fixed.size != r_fixed.size {
                    ActionKind::Error(ErrorKind::SizesDontMatch)
                } else {
                    ActionKind::DoNothing
                };
                let action = Action::new(writer.clone(), Some(reader.clone()), data, kind);
                Ok(self.push(action))
            }

            (AvroSchema::Array(w_items), AvroSchema::Array(r_items)) => {
                let element = self.resolve(w_items, r_items)?;
                let action = Action::new(
                    writer.clone(),
                    Some(reader.clone()),
                    data,
                    ActionKind::Container { element },
                );
                Ok(self.push(action))
            }

            (AvroSchema::Map(w_values), AvroSchema::Map(r_values)) => {
                let element = self.resolve(w_values, r_values)?;
                let action = Action::new(
                    writer.clone(),
                    Some(reader.clone()),
                    data,
                    ActionKind::Container { element },
                );
                Ok(self.push(action))
            }

            (AvroSchema::Enum(w_enum), AvroSchema::Enum(r_enum)) => {
                let action = enums::resolve(w_enum, r_enum, writer, reader, data);
                Ok(self.push(action))
            }

            (AvroSchema::Record(_), AvroSchema::Record(_)) => self.resolve_record(writer, reader),

            // Kinds differ from here on. A reader union absorbs any
            // non-union writer; otherwise only promotion can reconcile.
            (_, AvroSchema::Union(_)) => self.resolve_reader_union(writer, reader),

            _ => {
                let kind = if is_promotable(writer, reader) {
                    ActionKind::Promote
                } else {
                    ActionKind::Error(ErrorKind::IncompatibleSchemaTypes)
                };
                let action = Action::new(writer.clone(), Some(reader.clone()), data, kind);
                Ok(self.push(action))
            }
        }
    }
}
