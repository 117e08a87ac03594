use crate::{
    graph::EntityKey,
    model::{
        entity::EntityModel,
        field::{FieldKind, FieldModel},
    },
    types::EntityId,
    value::Value,
};
use std::{cell::OnceCell, collections::BTreeMap};

///
/// Entity
///
/// One identity-bearing record. The identity is assigned lazily on first
/// read, so freshly built entities only get an id once something packs or
/// inspects them. Properties are addressed by canonical (snake_case) name
/// and must be declared on the model chain; undeclared names are ignored.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    model: &'static EntityModel,
    id: OnceCell<EntityId>,
    values: BTreeMap<&'static str, Value>,
}

impl Entity {
    #[must_use]
    pub const fn new(model: &'static EntityModel) -> Self {
        Self {
            model,
            id: OnceCell::new(),
            values: BTreeMap::new(),
        }
    }

    /// Stub carrying only an identity.
    #[must_use]
    pub fn with_id(model: &'static EntityModel, id: EntityId) -> Self {
        Self {
            model,
            id: OnceCell::from(id),
            values: BTreeMap::new(),
        }
    }

    /// Builder form of [`Entity::set`].
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value.into());
        self
    }

    #[must_use]
    pub const fn model(&self) -> &'static EntityModel {
        self.model
    }

    #[must_use]
    pub fn type_name(&self) -> String {
        self.model.type_name()
    }

    /// Identity, generated and stored on first access.
    #[must_use]
    pub fn id(&self) -> EntityId {
        *self.id.get_or_init(EntityId::generate)
    }

    /// Identity if one has been assigned.
    #[must_use]
    pub fn peek_id(&self) -> Option<EntityId> {
        self.id.get().copied()
    }

    /// True for stubs that carry nothing but an identity.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Text property shortcut.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_text)
    }

    /// Embedded value held under `name`, if set.
    #[must_use]
    pub fn embedded(&self, name: &str) -> Option<&Self> {
        self.get(name).and_then(Value::as_embedded)
    }

    /// Set a property by canonical name.
    ///
    /// A name not declared on the model chain is routed into the first
    /// embedded field whose model declares it, creating the embedded value
    /// on demand. Returns false when nothing declares the name.
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        let model = self.model;

        if let Some(field) = model.field(name) {
            self.values.insert(field.name, value);
            return true;
        }

        for field in model.embedded_fields() {
            let FieldKind::Embedded(target) = field.kind else {
                continue;
            };
            if target.field(name).is_none() {
                continue;
            }

            let slot = self
                .values
                .entry(field.name)
                .or_insert_with(|| Value::embedded(Self::new(target)));

            return match slot {
                Value::Embedded(embedded) => embedded.set(name, value),
                _ => false,
            };
        }

        false
    }

    /// Set properties that are set, in declared order: own fields first,
    /// then each ancestor's. Embedded fields are reported by
    /// [`Entity::embedded_properties`] instead.
    #[must_use]
    pub fn declared_properties(&self) -> Vec<(&'static str, &Value)> {
        self.model
            .declared_fields()
            .filter(|field| !field.is_embedded())
            .filter_map(|field| self.values.get(field.name).map(|value| (field.name, value)))
            .collect()
    }

    #[must_use]
    pub fn embedded_property_names(&self) -> Vec<&'static str> {
        self.model.embedded_fields().map(|field| field.name).collect()
    }

    /// Embedded values that are set, in declared order.
    #[must_use]
    pub fn embedded_properties(&self) -> Vec<(&'static str, &Self)> {
        self.model
            .embedded_fields()
            .filter_map(|field| {
                self.embedded(field.name)
                    .map(|embedded| (field.name, embedded))
            })
            .collect()
    }

    /// Append `key` to the collection slot `name`, initializing it if unset.
    ///
    /// Only fields declared as collections qualify. A key already present is
    /// not added twice. Returns false when there is no such slot.
    pub fn push_to_collection(&mut self, name: &str, key: EntityKey) -> bool {
        let Some(field) = self.model.field(name).filter(|f| f.is_collection()) else {
            return false;
        };

        match self
            .values
            .entry(field.name)
            .or_insert_with(|| Value::RefList(Vec::new()))
        {
            Value::RefList(keys) => {
                if !keys.contains(&Some(key)) {
                    keys.push(Some(key));
                }
                true
            }
            _ => false,
        }
    }

    /// Set a reference list, keeping entries already collected under `name`
    /// that the new list does not mention (appended after it).
    pub fn merge_reference_list(&mut self, name: &str, keys: Vec<Option<EntityKey>>) -> bool {
        let merged = match self.values.get(name) {
            Some(Value::RefList(existing)) => {
                let mut merged = keys;
                for key in existing {
                    if key.is_some() && !merged.contains(key) {
                        merged.push(*key);
                    }
                }
                merged
            }
            _ => keys,
        };

        self.set(name, Value::RefList(merged))
    }

    /// Declared field metadata for `name`, if any.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldModel> {
        self.model.field(name)
    }
}
