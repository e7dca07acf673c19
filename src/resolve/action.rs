//! The resolution plan: an arena of actions tied together by index.
//!
//! Resolving two recursive record schemas yields a resolution relation that
//! is a graph, not a tree. Rather than attempt recursive value
//! construction, actions live in a flat arena and refer to each other by
//! [`ActionRef`]; a self-referential record's field action simply holds the
//! ref of the enclosing record's own slot. Once built, the plan is
//! immutable and safe to share across any number of concurrent decoders.

use std::sync::Arc;

use crate::provider::{Conversion, ResolverData};
use crate::schema::{AvroSchema, LogicalTypeName};
use crate::value::AvroValue;

/// Index of an action within its [`ResolutionPlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionRef(pub(crate) usize);

/// A complete resolution plan for one writer/reader schema pair.
#[derive(Debug)]
pub struct ResolutionPlan {
    actions: Vec<Action>,
    root: ActionRef,
}

impl ResolutionPlan {
    pub(crate) fn new(actions: Vec<Action>, root: ActionRef) -> Self {
        Self { actions, root }
    }

    /// The root action of the plan.
    pub fn root(&self) -> &Action {
        &self.actions[self.root.0]
    }

    /// The root action's ref.
    pub fn root_ref(&self) -> ActionRef {
        self.root
    }

    /// Look up an action by ref.
    pub fn action(&self, aref: ActionRef) -> &Action {
        &self.actions[aref.0]
    }

    /// Whether any action reachable from the root is an error.
    ///
    /// Walks the plan graph with a visited set; self-referential plans are
    /// cyclic, so a plain recursive walk would not terminate.
    pub fn has_errors(&self) -> bool {
        let mut visited = vec![false; self.actions.len()];
        let mut stack = vec![self.root];
        while let Some(aref) = stack.pop() {
            if visited[aref.0] {
                continue;
            }
            visited[aref.0] = true;
            match &self.actions[aref.0].kind {
                ActionKind::Error(_) => return true,
                ActionKind::Container { element } => stack.push(*element),
                ActionKind::RecordAdjust(ra) => stack.extend(&ra.field_actions),
                ActionKind::WriterUnion { branch_actions, .. } => stack.extend(branch_actions),
                ActionKind::ReaderUnion { actual, .. } => stack.push(*actual),
                _ => {}
            }
        }
        false
    }
}

/// One step of a resolution plan.
///
/// Every action records the writer and reader schemas it resolves. The
/// reader schema is absent only for [`ActionKind::Skip`], where a writer
/// field has no reader counterpart and thus no reader schema to resolve to.
/// If the reader schema carries a logical type, the type and the provider's
/// conversion for it are cached here for fast decoder access.
#[derive(Debug)]
pub struct Action {
    /// The writer schema this action resolves.
    pub writer: AvroSchema,
    /// The reader schema this action resolves to. `None` only for `Skip`.
    pub reader: Option<AvroSchema>,
    /// The reader schema's logical type, if any.
    pub logical_type: Option<LogicalTypeName>,
    /// The conversion registered for that logical type, if any.
    pub conversion: Option<Arc<dyn Conversion>>,
    /// What the decoder must do here.
    pub kind: ActionKind,
}

impl Action {
    pub(crate) fn new(
        writer: AvroSchema,
        reader: Option<AvroSchema>,
        data: &dyn ResolverData,
        kind: ActionKind,
    ) -> Self {
        let logical_type = reader.as_ref().and_then(|r| r.logical_type().cloned());
        let conversion = logical_type.as_ref().and_then(|lt| data.conversion_for(lt));
        Self {
            writer,
            reader,
            logical_type,
            conversion,
            kind,
        }
    }

    /// Whether this action is an error leaf.
    pub fn is_error(&self) -> bool {
        matches!(self.kind, ActionKind::Error(_))
    }

    /// A decoder-facing description of this action's error, naming the
    /// schemas involved; `None` if the action is not an error.
    pub fn error_description(&self) -> Option<String> {
        let kind = match &self.kind {
            ActionKind::Error(kind) => kind,
            _ => return None,
        };
        let found = type_label(&self.writer);
        let expected = self.reader.as_ref().map(type_label).unwrap_or_default();
        match kind {
            ErrorKind::MissingRequiredField => {
                let field = self.missing_field_name().unwrap_or("<unknown>");
                Some(format!(
                    "Found {}, expecting {}, missing required field {}",
                    found, expected, field
                ))
            }
            _ => Some(format!("Found {}, expecting {}", found, expected)),
        }
    }

    /// The first reader field with neither a writer counterpart nor a
    /// default, recomputed by scanning the two record schemas.
    fn missing_field_name(&self) -> Option<&str> {
        let writer = match self.writer.base() {
            AvroSchema::Record(r) => r,
            _ => return None,
        };
        let reader = match self.reader.as_ref().map(|r| r.base()) {
            Some(AvroSchema::Record(r)) => r,
            _ => return None,
        };
        reader
            .fields
            .iter()
            .find(|rf| writer.field(&rf.name).is_none() && rf.default.is_none())
            .map(|rf| rf.name.as_str())
    }
}

/// A human-readable label for a schema: its full name when it has one,
/// otherwise its type name.
fn type_label(schema: &AvroSchema) -> String {
    if let Some(fullname) = schema.fullname() {
        return fullname;
    }
    match schema.base() {
        AvroSchema::Null => "null",
        AvroSchema::Boolean => "boolean",
        AvroSchema::Int => "int",
        AvroSchema::Long => "long",
        AvroSchema::Float => "float",
        AvroSchema::Double => "double",
        AvroSchema::Bytes => "bytes",
        AvroSchema::String => "string",
        AvroSchema::Array(_) => "array",
        AvroSchema::Map(_) => "map",
        AvroSchema::Union(_) => "union",
        AvroSchema::Record(_) => "record",
        AvroSchema::Enum(_) => "enum",
        AvroSchema::Fixed(_) => "fixed",
        AvroSchema::Named(_) | AvroSchema::Logical(_) => "schema",
    }
    .to_string()
}

/// The kinds of resolution action.
#[derive(Debug)]
pub enum ActionKind {
    /// Writer and reader are primitively identical; decode as written.
    /// Produced only for primitive and fixed schemas.
    DoNothing,
    /// Resolution is impossible here. Embedded in the plan rather than
    /// raised, so the failure only surfaces if data actually reaches it.
    Error(ErrorKind),
    /// The written value must be widened to the reader's primitive type.
    Promote,
    /// Array or map; wraps the resolution of the element/value schema.
    Container {
        /// Action for the element (array) or value (map) schema.
        element: ActionRef,
    },
    /// Enum symbol remapping.
    EnumAdjust(EnumAdjust),
    /// A writer field with no reader counterpart: consume and discard.
    Skip,
    /// Record field realignment.
    RecordAdjust(RecordAdjust),
    /// The writer is a union.
    WriterUnion {
        /// One action per writer branch. When `union_equivalent`, branch
        /// `i` resolves against reader branch `i`; otherwise each branch
        /// resolves against the entire reader schema.
        branch_actions: Vec<ActionRef>,
        /// True when the reader is a structurally equivalent union.
        union_equivalent: bool,
    },
    /// The reader is a union and the writer is not: decode as if the
    /// writer had written branch `first_match`.
    ReaderUnion {
        /// Index of the matched reader branch.
        first_match: usize,
        /// Resolution of the writer against that branch.
        actual: ActionRef,
    },
}

/// Why a resolution is impossible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Writer and reader types differ with no promotion path, e.g.
    /// resolving "int" against "enum".
    IncompatibleSchemaTypes,
    /// Named types of the same kind with differing full names where the
    /// comparison is mandatory.
    NamesDontMatch,
    /// Two fixed types whose names match but whose sizes don't.
    SizesDontMatch,
    /// A reader record field with no default and no writer counterpart.
    MissingRequiredField,
    /// A reader union with no branch compatible with the writer.
    NoMatchingBranch,
}

/// Instructions for remapping enum symbols.
///
/// `adjustments[i]` maps the writer symbol at index `i`: `Some(j)` means
/// the reader represents it at index `j` (which may be the reader
/// default's index, when the symbol itself is unknown to the reader);
/// `None` means the reader cannot represent it at all, which is an error
/// detectable only when that symbol actually appears in the data.
#[derive(Debug)]
pub struct EnumAdjust {
    /// Per-writer-symbol reader index, in writer symbol order.
    pub adjustments: Vec<Option<usize>>,
    /// True when every adjustment is the identity and the writer has no
    /// more symbols than the reader; lets decoders skip remapping.
    pub no_adjustments_needed: bool,
}

impl EnumAdjust {
    pub(crate) fn new(adjustments: Vec<Option<usize>>, reader_symbol_count: usize) -> Self {
        let no_adjustments_needed = adjustments.len() <= reader_symbol_count
            && adjustments.iter().enumerate().all(|(i, a)| *a == Some(i));
        Self {
            adjustments,
            no_adjustments_needed,
        }
    }
}

/// Instructions for realigning the fields of two record schemas.
#[derive(Debug, Default)]
pub struct RecordAdjust {
    /// An action for each writer field, in writer order. Fields the reader
    /// does not have get a `Skip`.
    pub field_actions: Vec<ActionRef>,
    /// Indices of the reader's fields in output order: the first
    /// `first_default` of these are filled from the writer's data, in
    /// writer order; the rest are filled from default values.
    pub reader_order: Vec<usize>,
    /// Position in `reader_order` of the first field whose value comes
    /// from a default. Equal to `reader_order.len()` if there are none.
    pub first_default: usize,
    /// Default values for `reader_order[first_default..]`, in that order.
    pub defaults: Vec<AvroValue>,
}

impl RecordAdjust {
    /// True iff the reader field at output position `i` is the reader's
    /// own field `i` for every position: no reordering is needed.
    pub fn no_reorder(&self) -> bool {
        self.reader_order.iter().enumerate().all(|(i, &pos)| i == pos)
    }
}
