//! Core runtime for Flatpack: entity models, the arena graph, values, the
//! normalized document, and the packer/unpacker pair that converts between
//! them.

// public exports are one module level down
pub mod casing;
pub mod document;
pub mod error;
pub mod graph;
pub mod model;
pub mod packer;
pub mod serialize;
pub mod types;
pub mod unpacker;
pub mod value;


///
/// Prelude
///
/// Domain vocabulary only; errors and serializers stay in their modules.
///

pub mod prelude {
    pub use crate::{
        document::{Document, DocumentValue},
        graph::{Entity, EntityKey, Graph},
        model::{
            entity::EntityModel,
            field::{FieldKind, FieldModel},
            registry::EntityRegistry,
        },
        packer::Packer,
        types::{EntityId, Timestamp},
        unpacker::{Unpacked, UnpackedRoot, Unpacker},
        value::Value,
    };
}
