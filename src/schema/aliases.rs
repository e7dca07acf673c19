//! Alias pre-processing.
//!
//! Rewrites a writer schema so that type names and field names the reader
//! declares aliases for carry the reader's canonical names. Resolution
//! proper never looks at aliases: the public entry point applies this
//! rewrite to the writer exactly once, before any recursive resolution
//! begins, and everything downstream matches by (rewritten) name only.

use std::collections::HashMap;

use crate::schema::{AvroSchema, EnumSchema, FieldSchema, FixedSchema, RecordSchema};

/// Rewrite `writer` using the aliases declared in `reader`.
///
/// Returns the writer unchanged (cloned) when the reader declares no
/// aliases at all.
pub fn apply_aliases(writer: &AvroSchema, reader: &AvroSchema) -> AvroSchema {
    let mut renames = Renames::default();
    collect_renames(reader, &mut renames);

    if renames.is_empty() {
        return writer.clone();
    }

    rewrite(writer, &renames)
}

/// Type and field renames harvested from the reader schema.
#[derive(Debug, Default)]
struct Renames {
    /// alias fullname -> reader type (name, namespace)
    types: HashMap<String, (Option<String>, Option<String>)>,
    /// (reader record fullname, field alias) -> reader field name
    fields: HashMap<(String, String), String>,
}

impl Renames {
    fn is_empty(&self) -> bool {
        self.types.is_empty() && self.fields.is_empty()
    }
}

/// Qualify an alias with the namespace of the type declaring it, unless the
/// alias is already dotted.
fn qualify(alias: &str, namespace: &Option<String>) -> String {
    match namespace {
        Some(ns) if !alias.contains('.') => format!("{}.{}", ns, alias),
        _ => alias.to_string(),
    }
}

fn collect_renames(reader: &AvroSchema, renames: &mut Renames) {
    match reader {
        AvroSchema::Record(record) => {
            let fullname = record.fullname();
            if let Some(fullname) = &fullname {
                for alias in &record.aliases {
                    renames.types.insert(
                        qualify(alias, &record.namespace),
                        (record.name.clone(), record.namespace.clone()),
                    );
                }
                for field in &record.fields {
                    for alias in &field.aliases {
                        renames
                            .fields
                            .insert((fullname.clone(), alias.clone()), field.name.clone());
                    }
                }
            }
            for field in &record.fields {
                collect_renames(&field.schema, renames);
            }
        }
        AvroSchema::Enum(e) => {
            for alias in &e.aliases {
                renames.types.insert(
                    qualify(alias, &e.namespace),
                    (e.name.clone(), e.namespace.clone()),
                );
            }
        }
        AvroSchema::Fixed(f) => {
            for alias in &f.aliases {
                renames.types.insert(
                    qualify(alias, &f.namespace),
                    (f.name.clone(), f.namespace.clone()),
                );
            }
        }
        AvroSchema::Array(items) => collect_renames(items, renames),
        AvroSchema::Map(values) => collect_renames(values, renames),
        AvroSchema::Union(branches) => {
            for branch in branches {
                collect_renames(branch, renames);
            }
        }
        AvroSchema::Logical(lt) => collect_renames(&lt.base, renames),
        _ => {}
    }
}

fn rewrite(writer: &AvroSchema, renames: &Renames) -> AvroSchema {
    match writer {
        AvroSchema::Record(record) => {
            let (name, namespace) = renamed_identity(
                record.fullname(),
                &record.name,
                &record.namespace,
                renames,
            );
            // Field renames key on the record's post-rename fullname, since
            // that is the name the reader knows it by.
            let new_fullname = match (&name, &namespace) {
                (Some(n), Some(ns)) => Some(format!("{}.{}", ns, n)),
                (Some(n), None) => Some(n.clone()),
                _ => None,
            };
            let fields = record
                .fields
                .iter()
                .map(|field| {
                    let field_name = new_fullname
                        .as_ref()
                        .and_then(|fullname| {
                            renames
                                .fields
                                .get(&(fullname.clone(), field.name.clone()))
                                .cloned()
                        })
                        .unwrap_or_else(|| field.name.clone());
                    FieldSchema {
                        name: field_name,
                        schema: rewrite(&field.schema, renames),
                        default: field.default.clone(),
                        doc: field.doc.clone(),
                        aliases: field.aliases.clone(),
                    }
                })
                .collect();
            AvroSchema::Record(RecordSchema {
                name,
                namespace,
                fields,
                doc: record.doc.clone(),
                aliases: record.aliases.clone(),
            })
        }
        AvroSchema::Enum(e) => {
            let (name, namespace) = renamed_identity(e.fullname(), &e.name, &e.namespace, renames);
            AvroSchema::Enum(EnumSchema {
                name,
                namespace,
                symbols: e.symbols.clone(),
                doc: e.doc.clone(),
                aliases: e.aliases.clone(),
                default: e.default.clone(),
            })
        }
        AvroSchema::Fixed(f) => {
            let (name, namespace) = renamed_identity(f.fullname(), &f.name, &f.namespace, renames);
            AvroSchema::Fixed(FixedSchema {
                name,
                namespace,
                size: f.size,
                doc: f.doc.clone(),
                aliases: f.aliases.clone(),
            })
        }
        AvroSchema::Named(n) => match renames.types.get(n) {
            Some((name, namespace)) => {
                let renamed = match (name, namespace) {
                    (Some(name), Some(ns)) => format!("{}.{}", ns, name),
                    (Some(name), None) => name.clone(),
                    _ => n.clone(),
                };
                AvroSchema::Named(renamed)
            }
            None => writer.clone(),
        },
        AvroSchema::Array(items) => AvroSchema::Array(Box::new(rewrite(items, renames))),
        AvroSchema::Map(values) => AvroSchema::Map(Box::new(rewrite(values, renames))),
        AvroSchema::Union(branches) => {
            AvroSchema::Union(branches.iter().map(|b| rewrite(b, renames)).collect())
        }
        AvroSchema::Logical(lt) => AvroSchema::Logical(crate::schema::LogicalType::new(
            rewrite(&lt.base, renames),
            lt.logical_type.clone(),
        )),
        other => other.clone(),
    }
}

fn renamed_identity(
    fullname: Option<String>,
    name: &Option<String>,
    namespace: &Option<String>,
    renames: &Renames,
) -> (Option<String>, Option<String>) {
    match fullname.and_then(|f| renames.types.get(&f)) {
        Some((new_name, new_ns)) => (new_name.clone(), new_ns.clone()),
        None => (name.clone(), namespace.clone()),
    }
}
