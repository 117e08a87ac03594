//! Normalized document → graph.
//!
//! Reconstruction runs in two passes over the document. The first allocates
//! an identity-only stub for every record whose bucket resolves to a model,
//! so every identifier is known before any reference is followed. The second
//! fills the stubs in, resolving references against the identities the first
//! pass registered and rebuilding reciprocal collections from back-references.
//!
//! Placeholders synthesized for missing scalar referents live apart from the
//! allocated identities: list elements and root values never resolve to them.

#[cfg(test)]
mod tests;

use crate::{
    casing,
    document::{Document, DocumentValue, Record},
    error::InternalError,
    graph::{Entity, EntityKey, Graph},
    model::{entity::EntityModel, registry::EntityRegistry},
    types::EntityId,
    value::Value,
};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

///
/// Unpacker
///
/// Holds the registry used for type resolution plus diagnostic options.
/// Identity bookkeeping is local to each call.
///

#[derive(Clone, Debug)]
pub struct Unpacker<'r> {
    registry: &'r EntityRegistry,
    verbose: bool,
    entity_namespace: Option<String>,
}

impl<'r> Unpacker<'r> {
    #[must_use]
    pub const fn new(registry: &'r EntityRegistry) -> Self {
        Self {
            registry,
            verbose: false,
            entity_namespace: None,
        }
    }

    /// Emit `debug` events while unpacking.
    #[must_use]
    pub const fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Scope bucket-name resolution to a namespace (`shop` → `shop::Merchant`).
    #[must_use]
    pub fn entity_namespace(mut self, namespace: Option<String>) -> Self {
        self.entity_namespace = namespace.filter(|ns| !ns.is_empty());
        self
    }

    #[must_use]
    pub const fn is_verbose(&self) -> bool {
        self.verbose
    }

    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.entity_namespace.as_deref()
    }

    fn debug_log(&self, s: impl AsRef<str>) {
        if self.verbose {
            tracing::debug!(target: "flatpack::unpack", "{}", s.as_ref());
        }
    }

    /// Parse a JSON document and unpack it.
    pub fn unpack_str(&self, json: &str) -> Result<Unpacked, InternalError> {
        let doc = Document::from_json_str(json)?;

        Ok(self.unpack(&doc))
    }

    /// Unpack an already-parsed JSON document.
    pub fn unpack_value(&self, json: JsonValue) -> Result<Unpacked, InternalError> {
        let doc = Document::from_json_value(json)?;

        Ok(self.unpack(&doc))
    }

    /// Reconstruct the graph a document describes.
    ///
    /// Never fails: unknown buckets, records without a usable identity and
    /// unresolvable references are dropped.
    #[must_use]
    pub fn unpack(&self, doc: &Document) -> Unpacked {
        let mut run = UnpackRun::new(self);

        run.allocate(doc);
        run.ingest();

        let root = match &doc.value {
            None => UnpackedRoot::One(None),
            Some(DocumentValue::One(id)) => UnpackedRoot::One(id.and_then(|id| run.lookup(id))),
            Some(DocumentValue::Many(ids)) => UnpackedRoot::Many(
                ids.iter()
                    .map(|id| id.and_then(|id| run.lookup(id)))
                    .collect(),
            ),
        };

        self.debug_log(format!("unpacked {} entities", run.graph.len()));

        Unpacked {
            graph: run.graph,
            root,
        }
    }
}

///
/// UnpackedRoot
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum UnpackedRoot {
    One(Option<EntityKey>),
    Many(Vec<Option<EntityKey>>),
}

///
/// Unpacked
/// A reconstructed graph and the key(s) of its logical root(s).
///

#[derive(Debug)]
pub struct Unpacked {
    pub graph: Graph,
    pub root: UnpackedRoot,
}

impl Unpacked {
    /// The single root; `None` for list-valued documents.
    #[must_use]
    pub const fn root_key(&self) -> Option<EntityKey> {
        match self.root {
            UnpackedRoot::One(key) => key,
            UnpackedRoot::Many(_) => None,
        }
    }

    #[must_use]
    pub fn root_entity(&self) -> Option<&Entity> {
        self.root_key().and_then(|key| self.graph.get(key))
    }

    /// All roots in document order; a single root becomes a one-element list.
    #[must_use]
    pub fn roots(&self) -> Vec<Option<EntityKey>> {
        match &self.root {
            UnpackedRoot::One(key) => vec![*key],
            UnpackedRoot::Many(keys) => keys.clone(),
        }
    }

    /// Key of the reconstructed entity carrying `id`.
    #[must_use]
    pub fn find(&self, id: EntityId) -> Option<EntityKey> {
        self.graph.find(id)
    }
}

// ─────────────────────────────────────────────
// Reconstruction
// ─────────────────────────────────────────────

struct UnpackRun<'u, 'r, 'd> {
    unpacker: &'u Unpacker<'r>,
    graph: Graph,
    identities: HashMap<EntityId, EntityKey>,
    placeholders: HashMap<EntityId, EntityKey>,
    pending: Vec<(EntityId, &'d Record)>,
    positions: HashMap<EntityId, usize>,
}

impl<'u, 'r, 'd> UnpackRun<'u, 'r, 'd> {
    fn new(unpacker: &'u Unpacker<'r>) -> Self {
        Self {
            unpacker,
            graph: Graph::new(),
            identities: HashMap::new(),
            placeholders: HashMap::new(),
            pending: Vec::new(),
            positions: HashMap::new(),
        }
    }

    // Identities allocated from document records; placeholders excluded.
    fn lookup(&self, id: EntityId) -> Option<EntityKey> {
        self.identities.get(&id).copied()
    }

    // Pass one: a stub per resolvable record, in document order. A repeated
    // identity keeps its first position but its latest record.
    fn allocate(&mut self, doc: &'d Document) {
        let unpacker = self.unpacker;
        let namespace = unpacker.namespace();

        for (bucket, records) in doc.data.iter() {
            let Some(model) = unpacker.registry.resolve(bucket, namespace) else {
                tracing::trace!(
                    target: "flatpack::unpack",
                    bucket,
                    "skipping unresolved bucket"
                );
                unpacker.debug_log(format!(
                    "no model for bucket {bucket}; skipped {} record(s)",
                    records.len()
                ));
                continue;
            };

            for record in records {
                let Some(id) = record.get(casing::ID_FIELD).and_then(EntityId::from_json) else {
                    tracing::trace!(
                        target: "flatpack::unpack",
                        bucket,
                        "skipping record without identity"
                    );
                    continue;
                };

                self.identities
                    .entry(id)
                    .or_insert_with(|| self.graph.insert(Entity::with_id(model, id)));

                match self.positions.get(&id) {
                    Some(&at) => self.pending[at].1 = record,
                    None => {
                        self.positions.insert(id, self.pending.len());
                        self.pending.push((id, record));
                    }
                }
            }

            unpacker.debug_log(format!(
                "bucket {bucket} → {}: {} record(s)",
                model.path,
                records.len()
            ));
        }
    }

    // Pass two: populate every allocated stub from its record.
    fn ingest(&mut self) {
        for (id, record) in std::mem::take(&mut self.pending) {
            let Some(key) = self.lookup(id) else {
                continue;
            };
            let owner = self.graph[key].model();

            let mut properties = Vec::with_capacity(record.len());
            for (field, raw) in record {
                let name = casing::property_name(field);
                if name == casing::ID_FIELD {
                    continue;
                }

                if let Some(stem) = casing::strip_reference_suffix(&name) {
                    if let Some(value) = self.reify_reference(key, owner, stem, raw) {
                        properties.push((stem.to_string(), value));
                    }
                    continue;
                }

                let timestamp = casing::is_timestamp_property(&name);
                match Value::from_json_scalar(raw, timestamp) {
                    Some(value) => properties.push((name, value)),
                    None => {
                        tracing::trace!(
                            target: "flatpack::unpack",
                            field = field.as_str(),
                            "dropping value with no scalar form"
                        );
                    }
                }
            }

            let entity = &mut self.graph[key];
            for (name, value) in properties {
                let applied = match value {
                    Value::RefList(keys) => entity.merge_reference_list(&name, keys),
                    value => entity.set(&name, value),
                };
                if !applied {
                    tracing::trace!(
                        target: "flatpack::unpack",
                        property = name.as_str(),
                        path = owner.path,
                        "ignoring undeclared property"
                    );
                }
            }
        }
    }

    // Resolve a `<name>Uuid` field owned by the entity at `key`.
    fn reify_reference(
        &mut self,
        key: EntityKey,
        owner: &'static EntityModel,
        name: &str,
        raw: &JsonValue,
    ) -> Option<Value> {
        if let JsonValue::Array(items) = raw {
            let keys = items
                .iter()
                .map(|item| EntityId::from_json(item).and_then(|id| self.lookup(id)))
                .collect();

            return Some(Value::RefList(keys));
        }

        let Some(id) = EntityId::from_json(raw) else {
            tracing::trace!(
                target: "flatpack::unpack",
                property = name,
                "dropping malformed reference"
            );
            return None;
        };

        let referent = match self.lookup(id).or_else(|| self.placeholders.get(&id).copied()) {
            Some(referent) => referent,
            None => self.repair(owner, name, id)?,
        };

        let collection = owner.collection_property_name();
        if !self.graph[referent].push_to_collection(&collection, key) {
            tracing::trace!(
                target: "flatpack::unpack",
                collection = collection.as_str(),
                path = self.graph[referent].model().path,
                "referent has no reciprocal collection"
            );
        }

        Some(Value::Ref(referent))
    }

    // Stand in for a referenced record the document does not carry, using
    // the target type the owner declares for the property.
    fn repair(
        &mut self,
        owner: &'static EntityModel,
        name: &str,
        id: EntityId,
    ) -> Option<EntityKey> {
        let Some(target) = owner.declared_type_for(name) else {
            tracing::trace!(
                target: "flatpack::unpack",
                property = name,
                path = owner.path,
                "dropping unresolved reference"
            );
            return None;
        };

        let placeholder = self.graph.insert(Entity::with_id(target, id));
        self.placeholders.insert(id, placeholder);
        self.unpacker
            .debug_log(format!("placeholder {} for {}.{name} → {id}", target.path, owner.path));

        Some(placeholder)
    }
}
