use crate::model::entity::EntityModel;

///
/// FieldModel
/// Runtime field metadata consulted by the packer and unpacker.
///

#[derive(Debug)]
pub struct FieldModel {
    /// Canonical (snake_case) property name.
    pub name: &'static str,
    /// Field shape.
    pub kind: FieldKind,
}

impl FieldModel {
    /// Untyped slot: scalars, single references, or reference lists.
    #[must_use]
    pub const fn plain(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Plain,
        }
    }

    /// Single reference, with the model to instantiate for dangling ids.
    #[must_use]
    pub const fn relation(name: &'static str, target: Option<&'static EntityModel>) -> Self {
        Self {
            name,
            kind: FieldKind::Relation { target },
        }
    }

    /// Ordered reference list. Also serves as a reciprocal collection slot.
    #[must_use]
    pub const fn collection(name: &'static str, target: Option<&'static EntityModel>) -> Self {
        Self {
            name,
            kind: FieldKind::Collection { target },
        }
    }

    /// Embedded value folded into the owner's flat record.
    #[must_use]
    pub const fn embedded(name: &'static str, model: &'static EntityModel) -> Self {
        Self {
            name,
            kind: FieldKind::Embedded(model),
        }
    }

    #[must_use]
    pub const fn is_embedded(&self) -> bool {
        matches!(self.kind, FieldKind::Embedded(_))
    }

    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self.kind, FieldKind::Collection { .. })
    }

    /// Declared target model for reference-shaped fields.
    #[must_use]
    pub const fn target(&self) -> Option<&'static EntityModel> {
        match self.kind {
            FieldKind::Relation { target } | FieldKind::Collection { target } => target,
            FieldKind::Plain | FieldKind::Embedded(_) => None,
        }
    }
}

///
/// FieldKind
///
/// Minimal shape surface needed by the codec.
/// Values are not validated against it; it only drives embedding, repair
/// of dangling references, and reciprocal collections.
///

#[derive(Debug)]
pub enum FieldKind {
    Plain,
    Relation {
        target: Option<&'static EntityModel>,
    },
    Collection {
        target: Option<&'static EntityModel>,
    },
    Embedded(&'static EntityModel),
}
