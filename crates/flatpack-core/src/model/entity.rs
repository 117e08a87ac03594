use crate::{casing, model::field::FieldModel};
use std::{fmt, iter};

///
/// EntityModel
/// Minimal runtime model for one entity type.
///

pub struct EntityModel {
    /// Type path, `Namespace::TypeName` or a bare `TypeName`.
    pub path: &'static str,
    /// Ancestor model; its fields follow this model's own fields.
    pub parent: Option<&'static EntityModel>,
    /// Own declared fields, in declaration order.
    pub fields: &'static [FieldModel],
    /// Override for the pluralized reciprocal collection name.
    pub collection_name: Option<&'static str>,
}

impl EntityModel {
    #[must_use]
    pub const fn new(path: &'static str, fields: &'static [FieldModel]) -> Self {
        Self {
            path,
            parent: None,
            fields,
            collection_name: None,
        }
    }

    #[must_use]
    pub const fn extends(mut self, parent: &'static Self) -> Self {
        self.parent = Some(parent);
        self
    }

    #[must_use]
    pub const fn with_collection_name(mut self, name: &'static str) -> Self {
        self.collection_name = Some(name);
        self
    }

    /// Simple type name, the last path segment.
    #[must_use]
    pub fn simple_name(&self) -> &'static str {
        casing::simple_name(self.path)
    }

    /// Bucket key for instances of this type.
    #[must_use]
    pub fn type_name(&self) -> String {
        casing::type_name(self.path)
    }

    /// Property name other entities use to collect instances of this type.
    #[must_use]
    pub fn collection_property_name(&self) -> String {
        match self.collection_name {
            Some(name) => name.to_string(),
            None => casing::collection_property_name(&self.type_name()),
        }
    }

    /// This model followed by each ancestor, most-derived first.
    pub fn chain(&self) -> impl Iterator<Item = &Self> {
        iter::successors(Some(self), |model| model.parent)
    }

    /// Declared fields across the chain, most-derived first.
    /// A name redeclared by a descendant shadows the ancestor's field.
    pub fn declared_fields(&self) -> impl Iterator<Item = &'static FieldModel> + '_ {
        let mut seen: Vec<&'static str> = Vec::new();

        self.chain()
            .flat_map(|model| model.fields.iter())
            .filter(move |field| {
                if seen.contains(&field.name) {
                    false
                } else {
                    seen.push(field.name);
                    true
                }
            })
    }

    /// Look up a declared field by canonical name, walking outward.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldModel> {
        self.declared_fields().find(|field| field.name == name)
    }

    /// Embedded fields across the chain, in declared order.
    pub fn embedded_fields(&self) -> impl Iterator<Item = &'static FieldModel> + '_ {
        self.declared_fields().filter(|field| field.is_embedded())
    }

    /// Target model declared for a reference property, if any.
    #[must_use]
    pub fn declared_type_for(&self, name: &str) -> Option<&'static Self> {
        self.field(name).and_then(FieldModel::target)
    }

    /// True when `other` is this model or one of its ancestors.
    #[must_use]
    pub fn is_a(&self, other: &Self) -> bool {
        self.chain().any(|model| model.path == other.path)
    }
}

impl PartialEq for EntityModel {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for EntityModel {}

// Models reference each other cyclically, so Debug prints paths only.
impl fmt::Debug for EntityModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityModel")
            .field("path", &self.path)
            .field("parent", &self.parent.map(|parent| parent.path))
            .field("fields", &self.fields.len())
            .finish()
    }
}

///
/// TESTS
///
