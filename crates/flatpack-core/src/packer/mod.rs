//! Graph → normalized document.
//!
//! Traversal is depth-first over an explicit frame stack. An entity is
//! marked visited the first time it is reached; later references to it only
//! contribute its identifier. Records are appended to their bucket once all
//! of their children have been visited, so children precede parents within
//! the document.


use crate::{
    casing,
    document::{Buckets, Document, DocumentValue, Record},
    error::InternalError,
    graph::{Entity, EntityKey, Graph},
    types::EntityId,
    value::Value,
};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

///
/// Packer
///
/// Holds formatting and diagnostic options only; all traversal state lives
/// in one call.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct Packer {
    pretty: bool,
    verbose: bool,
}

impl Packer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pretty: false,
            verbose: false,
        }
    }

    /// Pretty-print serialized output.
    #[must_use]
    pub const fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Emit `debug` events while packing.
    #[must_use]
    pub const fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    #[must_use]
    pub const fn is_pretty(&self) -> bool {
        self.pretty
    }

    #[must_use]
    pub const fn is_verbose(&self) -> bool {
        self.verbose
    }

    fn debug_log(&self, s: impl AsRef<str>) {
        if self.verbose {
            tracing::debug!(target: "flatpack::pack", "{}", s.as_ref());
        }
    }

    /// Pack the graph reachable from `root`.
    ///
    /// An absent root, or a key that does not resolve in `graph`, yields an
    /// empty document.
    #[must_use]
    pub fn pack(&self, graph: &Graph, root: Option<EntityKey>) -> Document {
        let Some(root) = root.filter(|key| graph.contains(*key)) else {
            self.debug_log("no root; packing an empty document");
            return Document::new();
        };

        let mut run = PackRun::new(graph);
        run.visit_from(root);

        let doc = Document {
            data: run.into_buckets(),
            value: Some(DocumentValue::One(Some(graph[root].id()))),
        };
        self.log_document(&doc);

        doc
    }

    /// Pack several roots into one document with a shared visited set.
    ///
    /// Keys that do not resolve are skipped; the document value lists the
    /// remaining roots in order.
    #[must_use]
    pub fn pack_many(&self, graph: &Graph, roots: &[EntityKey]) -> Document {
        let mut run = PackRun::new(graph);
        let mut ids = Vec::with_capacity(roots.len());

        for &root in roots {
            let Some(entity) = graph.get(root) else {
                self.debug_log(format!("skipping unknown root {}", root.index()));
                continue;
            };
            ids.push(Some(entity.id()));
            run.visit_from(root);
        }

        let doc = Document {
            data: run.into_buckets(),
            value: Some(DocumentValue::Many(ids)),
        };
        self.log_document(&doc);

        doc
    }

    /// Pack and serialize according to the configured options.
    pub fn pack_to_string(
        &self,
        graph: &Graph,
        root: Option<EntityKey>,
    ) -> Result<String, InternalError> {
        let doc = self.pack(graph, root);
        let json = doc.to_json_string(self.pretty)?;

        if self.verbose {
            match doc.to_json_string(true) {
                Ok(pretty) => self.debug_log(pretty),
                Err(err) => self.debug_log(format!("document not printable: {err}")),
            }
        }

        Ok(json)
    }

    fn log_document(&self, doc: &Document) {
        if !self.verbose {
            return;
        }

        for (name, records) in doc.data.iter() {
            self.debug_log(format!("bucket {name}: {} record(s)", records.len()));
        }
    }
}

// ─────────────────────────────────────────────
// Traversal
// ─────────────────────────────────────────────

// An entity whose record is being built; popped once its children are done.
struct Frame {
    id: EntityId,
    type_name: String,
    record: Record,
    children: Vec<EntityKey>,
    next: usize,
}

struct PackRun<'g> {
    graph: &'g Graph,
    visited: HashMap<EntityId, EntityKey>,
    buckets: Buckets,
    stack: Vec<Frame>,
}

impl<'g> PackRun<'g> {
    fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            visited: HashMap::new(),
            buckets: Buckets::new(),
            stack: Vec::new(),
        }
    }

    fn into_buckets(self) -> Buckets {
        self.buckets
    }

    // Depth-first walk from one root; the stack is empty on entry and exit.
    fn visit_from(&mut self, root: EntityKey) {
        self.enter(root);

        while let Some(frame) = self.stack.last_mut() {
            if let Some(&child) = frame.children.get(frame.next) {
                frame.next += 1;
                self.enter(child);
                continue;
            }

            if let Some(done) = self.stack.pop() {
                self.buckets.push(&done.type_name, done.record);
            }
        }
    }

    // Mark an entity visited and push its frame; a no-op for visited entities.
    fn enter(&mut self, key: EntityKey) {
        let graph = self.graph;
        let Some(entity) = graph.get(key) else {
            return;
        };

        let id = entity.id();
        if self.visited.contains_key(&id) {
            return;
        }
        self.visited.insert(id, key);

        let mut children = Vec::new();
        let mut record = Record::new();

        for (name, value) in flat_properties(entity) {
            self.emit(&mut record, &mut children, name, value);
        }
        record.insert(casing::ID_FIELD.to_string(), JsonValue::from(id));

        if let Some(parent) = self.stack.last() {
            record.insert(
                format!("{}{}", parent.type_name, casing::REFERENCE_FIELD_SUFFIX),
                JsonValue::from(parent.id),
            );
        }

        self.stack.push(Frame {
            id,
            type_name: entity.type_name(),
            record,
            children,
            next: 0,
        });
    }

    fn emit(
        &self,
        record: &mut Record,
        children: &mut Vec<EntityKey>,
        name: &str,
        value: &Value,
    ) {
        match value {
            Value::Ref(key) => {
                let Some(child) = self.graph.get(*key) else {
                    tracing::trace!(
                        target: "flatpack::pack",
                        field = name,
                        "dropping dangling reference"
                    );
                    return;
                };
                children.push(*key);
                record.insert(casing::reference_field_name(name), JsonValue::from(child.id()));
            }
            Value::RefList(keys) => {
                let ids = keys
                    .iter()
                    .map(|&key| match key.and_then(|k| self.graph.get(k).map(|e| (k, e))) {
                        Some((key, child)) => {
                            children.push(key);
                            JsonValue::from(child.id())
                        }
                        None => JsonValue::Null,
                    })
                    .collect();
                record.insert(casing::reference_field_name(name), JsonValue::Array(ids));
            }
            scalar => match scalar.to_json_scalar() {
                Some(json) => {
                    record.insert(casing::field_name(name), json);
                }
                None => {
                    tracing::trace!(
                        target: "flatpack::pack",
                        field = name,
                        "dropping value with no flat form"
                    );
                }
            },
        }
    }
}

// Declared properties with each embedded value's properties folded in.
// An embedded field that repeats an owner field name replaces its value.
fn flat_properties(entity: &Entity) -> Vec<(&'static str, &Value)> {
    let mut fields = entity.declared_properties();

    for (_, embedded) in entity.embedded_properties() {
        for (name, value) in embedded.declared_properties() {
            match fields.iter_mut().find(|(existing, _)| *existing == name) {
                Some(slot) => slot.1 = value,
                None => fields.push((name, value)),
            }
        }
    }

    fields
}
