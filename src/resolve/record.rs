//! Record field realignment.

use crate::error::SchemaError;
use crate::resolve::action::{Action, ActionKind, ActionRef, ErrorKind, RecordAdjust};
use crate::resolve::{schema_id, Resolver};
use crate::schema::AvroSchema;

impl<'a> Resolver<'a> {
    /// Build the action realigning two record schemas.
    ///
    /// Records are the only construct that can close a cycle in the
    /// resolution relation, so this is the one memoized path: the result
    /// slot is allocated and published under the schema pair's identity
    /// *before* any field schema is descended into, which makes a field
    /// that recursively references the enclosing pair resolve to the very
    /// slot still being filled in.
    pub(super) fn resolve_record(
        &mut self,
        writer: &'a AvroSchema,
        reader: &'a AvroSchema,
    ) -> Result<ActionRef, SchemaError> {
        let key = (schema_id(writer), schema_id(reader));
        if let Some(&cached) = self.seen.get(&key) {
            return Ok(cached);
        }

        let data = self.data;
        let (writer_record, reader_record) = match (writer, reader) {
            (AvroSchema::Record(w), AvroSchema::Record(r)) => (w, r),
            _ => {
                return Err(SchemaError::InvalidSchema(
                    "record resolution invoked on non-record schemas".to_string(),
                ))
            }
        };

        // Record-level names are deliberately not compared; two records
        // align purely by field-name overlap.

        let first_default = writer_record
            .fields
            .iter()
            .filter(|wf| reader_record.field(&wf.name).is_some())
            .count();

        let slot = self.push(Action::new(
            writer.clone(),
            Some(reader.clone()),
            data,
            ActionKind::RecordAdjust(RecordAdjust {
                first_default,
                ..Default::default()
            }),
        ));
        self.seen.insert(key, slot);

        let mut field_actions = Vec::with_capacity(writer_record.fields.len());
        let mut reader_order = Vec::with_capacity(reader_record.fields.len());

        for writer_field in &writer_record.fields {
            match reader_record.field_index(&writer_field.name) {
                Some(reader_index) => {
                    reader_order.push(reader_index);
                    let field_schema = &reader_record.fields[reader_index].schema;
                    field_actions.push(self.resolve(&writer_field.schema, field_schema)?);
                }
                None => {
                    let skip =
                        Action::new(writer_field.schema.clone(), None, data, ActionKind::Skip);
                    field_actions.push(self.push(skip));
                }
            }
        }

        let mut defaults = Vec::with_capacity(reader_record.fields.len() - first_default);
        for (reader_index, reader_field) in reader_record.fields.iter().enumerate() {
            if writer_record.field(&reader_field.name).is_none() {
                if reader_field.default.is_none() {
                    // The whole record resolution becomes an error. The slot
                    // is overwritten in place, so recursive references that
                    // already hold this ref observe the error too.
                    self.actions[slot.0] = Action::new(
                        writer.clone(),
                        Some(reader.clone()),
                        data,
                        ActionKind::Error(ErrorKind::MissingRequiredField),
                    );
                    return Ok(slot);
                }
                defaults.push(data.default_value_of(reader_field)?);
                reader_order.push(reader_index);
            }
        }

        if let ActionKind::RecordAdjust(adjust) = &mut self.actions[slot.0].kind {
            adjust.field_actions = field_actions;
            adjust.reader_order = reader_order;
            adjust.defaults = defaults;
        }
        Ok(slot)
    }
}
