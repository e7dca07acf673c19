//! Union resolution, in both directions.
//!
//! A writer union resolves branch-by-branch, positionally when the reader
//! is a structurally equivalent union and against the whole reader schema
//! otherwise. A reader union (with a non-union writer) is searched for the
//! branch the writer matches, with a two-phase scan kept behaviorally
//! compatible with earlier generations of this resolver: an exact
//! full-name hit wins immediately, then a record structure match, then the
//! first branch the writer promotes into.

use std::collections::HashMap;

use crate::error::SchemaError;
use crate::resolve::action::{Action, ActionKind, ActionRef, ErrorKind};
use crate::resolve::{promote, schema_id, Resolver};
use crate::schema::{AvroSchema, SchemaKind};

impl<'a> Resolver<'a> {
    /// Resolve a writer union against any reader schema.
    pub(super) fn resolve_writer_union(
        &mut self,
        writer: &'a AvroSchema,
        reader: &'a AvroSchema,
    ) -> Result<ActionRef, SchemaError> {
        let data = self.data;
        let union_equivalent = self.union_equivalent(writer, reader)?;

        let writer_branches = match writer {
            AvroSchema::Union(branches) => branches,
            _ => {
                return Err(SchemaError::InvalidSchema(
                    "writer-union resolution invoked on non-union writer".to_string(),
                ))
            }
        };
        // Equivalence implies the reader is a union of the same arity.
        let reader_branches = match (union_equivalent, reader) {
            (true, AvroSchema::Union(branches)) => Some(branches),
            _ => None,
        };

        let mut branch_actions = Vec::with_capacity(writer_branches.len());
        for (i, branch) in writer_branches.iter().enumerate() {
            let target = match reader_branches {
                Some(rb) => &rb[i],
                None => reader,
            };
            branch_actions.push(self.resolve(branch, target)?);
        }

        let action = Action::new(
            writer.clone(),
            Some(reader.clone()),
            data,
            ActionKind::WriterUnion {
                branch_actions,
                union_equivalent,
            },
        );
        Ok(self.push(action))
    }

    /// Resolve a non-union writer against a reader union.
    pub(super) fn resolve_reader_union(
        &mut self,
        writer: &'a AvroSchema,
        reader: &'a AvroSchema,
    ) -> Result<ActionRef, SchemaError> {
        debug_assert!(
            !matches!(writer, AvroSchema::Union(_)),
            "writer unions resolve through resolve_writer_union"
        );
        let data = self.data;
        let reader_branches = match reader {
            AvroSchema::Union(branches) => branches,
            _ => {
                return Err(SchemaError::InvalidSchema(
                    "reader-union resolution invoked on non-union reader".to_string(),
                ))
            }
        };

        match self.first_matching_branch(writer, reader_branches)? {
            Some(index) => {
                let actual = self.resolve(writer, &reader_branches[index])?;
                let action = Action::new(
                    writer.clone(),
                    Some(reader.clone()),
                    data,
                    ActionKind::ReaderUnion {
                        first_match: index,
                        actual,
                    },
                );
                Ok(self.push(action))
            }
            None => {
                let action = Action::new(
                    writer.clone(),
                    Some(reader.clone()),
                    data,
                    ActionKind::Error(ErrorKind::NoMatchingBranch),
                );
                Ok(self.push(action))
            }
        }
    }

    fn first_matching_branch(
        &mut self,
        writer: &'a AvroSchema,
        branches: &'a [AvroSchema],
    ) -> Result<Option<usize>, SchemaError> {
        let writer_kind = writer.kind();
        let mut structure_match: Option<usize> = None;

        for (j, branch) in branches.iter().enumerate() {
            let branch = self.reader_names.deref(branch)?;
            if branch.kind() != writer_kind {
                continue;
            }
            match writer_kind {
                SchemaKind::Record | SchemaKind::Enum | SchemaKind::Fixed => {
                    let writer_name = writer.fullname();
                    if writer_name.is_some() && writer_name == branch.fullname() {
                        return Ok(Some(j));
                    }
                    if writer_kind == SchemaKind::Record {
                        // Trial resolution; shares the memo, so a later real
                        // resolution of the same pair reuses the result.
                        let trial = self.resolve_record(writer, branch)?;
                        if !self.has_match_error(trial) {
                            // Keep the first structural candidate, but a later
                            // candidate whose short name matches the writer's
                            // takes precedence.
                            let writer_short = writer.name();
                            if structure_match.is_none()
                                || (writer_short.is_some() && writer_short == branch.name())
                            {
                                structure_match = Some(j);
                            }
                        }
                    }
                }
                _ => return Ok(Some(j)),
            }
        }

        if structure_match.is_some() {
            return Ok(structure_match);
        }

        for (j, branch) in branches.iter().enumerate() {
            let branch = self.reader_names.deref(branch)?;
            if branch.kind() != writer_kind && promote::is_promotable(writer, branch) {
                return Ok(Some(j));
            }
        }
        Ok(None)
    }

    /// Whether a trial record resolution failed outright or carries an
    /// error in any of its direct field actions.
    fn has_match_error(&self, aref: ActionRef) -> bool {
        match &self.actions[aref.0].kind {
            ActionKind::Error(_) => true,
            ActionKind::RecordAdjust(adjust) => adjust
                .field_actions
                .iter()
                .any(|fa| self.actions[fa.0].is_error()),
            _ => false,
        }
    }

    /// Whether writer and reader are structurally equivalent, enabling
    /// positional branch resolution for unions.
    pub(super) fn union_equivalent(
        &self,
        writer: &'a AvroSchema,
        reader: &'a AvroSchema,
    ) -> Result<bool, SchemaError> {
        let mut seen = HashMap::new();
        self.union_equiv(writer, reader, &mut seen)
    }

    fn union_equiv(
        &self,
        writer: &'a AvroSchema,
        reader: &'a AvroSchema,
        seen: &mut HashMap<(usize, usize), bool>,
    ) -> Result<bool, SchemaError> {
        let writer = self.writer_names.deref(writer)?;
        let reader = self.reader_names.deref(reader)?;

        if writer.kind() != reader.kind() {
            return Ok(false);
        }
        if writer.base().is_named() {
            let writer_name = writer.fullname();
            if writer_name.is_some() && writer_name != reader.fullname() {
                return Ok(false);
            }
        }

        match (writer.base(), reader.base()) {
            (AvroSchema::Null, AvroSchema::Null)
            | (AvroSchema::Boolean, AvroSchema::Boolean)
            | (AvroSchema::Int, AvroSchema::Int)
            | (AvroSchema::Long, AvroSchema::Long)
            | (AvroSchema::Float, AvroSchema::Float)
            | (AvroSchema::Double, AvroSchema::Double)
            | (AvroSchema::Bytes, AvroSchema::Bytes)
            | (AvroSchema::String, AvroSchema::String) => Ok(true),

            (AvroSchema::Array(w_items), AvroSchema::Array(r_items)) => {
                self.union_equiv(w_items, r_items, seen)
            }
            (AvroSchema::Map(w_values), AvroSchema::Map(r_values)) => {
                self.union_equiv(w_values, r_values, seen)
            }

            (AvroSchema::Fixed(w_fixed), AvroSchema::Fixed(r_fixed)) => {
                Ok(w_fixed.size == r_fixed.size)
            }

            (AvroSchema::Enum(w_enum), AvroSchema::Enum(r_enum)) => {
                Ok(w_enum.symbols == r_enum.symbols)
            }

            (AvroSchema::Union(w_branches), AvroSchema::Union(r_branches)) => {
                if w_branches.len() != r_branches.len() {
                    return Ok(false);
                }
                for (w_branch, r_branch) in w_branches.iter().zip(r_branches) {
                    if !self.union_equiv(w_branch, r_branch, seen)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }

            (AvroSchema::Record(w_record), AvroSchema::Record(r_record)) => {
                let key = (schema_id(writer), schema_id(reader));
                if let Some(&known) = seen.get(&key) {
                    return Ok(known);
                }
                // Optimistic while checking, so recursive references
                // terminate; corrected below if a field pair differs.
                seen.insert(key, true);
                let mut equivalent = w_record.fields.len() == r_record.fields.len();
                if equivalent {
                    for (w_field, r_field) in w_record.fields.iter().zip(&r_record.fields) {
                        if !self.union_equiv(&w_field.schema, &r_field.schema, seen)? {
                            equivalent = false;
                            break;
                        }
                    }
                }
                seen.insert(key, equivalent);
                Ok(equivalent)
            }

            _ => Ok(false),
        }
    }
}
