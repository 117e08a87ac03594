//! Flatpack: normalized, identity-deduplicated JSON for typed entity graphs.
//!
//! This is the public meta-crate. It re-exports the runtime from
//! `flatpack-core` and adds [`Flatpack`], a configured packer/unpacker pair.
//!
//! ```ignore
//! let registry = EntityRegistry::with_models(&[&MERCHANT, &MERCHANT_LOCATION])?;
//! let flatpack = Flatpack::new(FlatpackConfig::new().entity_namespace("shop"), &registry);
//!
//! let json = flatpack.pack_to_string(&graph, Some(merchant))?;
//! let unpacked = flatpack.unpack_str(&json)?;
//! ```

mod config;

pub use config::FlatpackConfig;
pub use flatpack_core as core;

use flatpack_core::{
    document::Document,
    graph::{EntityKey, Graph},
    model::registry::EntityRegistry,
    packer::Packer,
    unpacker::{Unpacked, Unpacker},
};
use serde_json::Value as JsonValue;

///
/// Error
///

pub type Error = flatpack_core::error::InternalError;

pub type Result<T> = std::result::Result<T, Error>;

//
// Prelude
//

pub mod prelude {
    pub use crate::{Flatpack, FlatpackConfig};
    pub use flatpack_core::prelude::*;
}

///
/// Flatpack
///
/// One packer and one unpacker sharing a config and a model registry.
///

#[derive(Clone, Debug)]
pub struct Flatpack<'r> {
    config: FlatpackConfig,
    packer: Packer,
    unpacker: Unpacker<'r>,
}

impl<'r> Flatpack<'r> {
    #[must_use]
    pub fn new(config: FlatpackConfig, registry: &'r EntityRegistry) -> Self {
        let packer = Packer::new()
            .pretty(config.pretty)
            .verbose(config.verbose);
        let unpacker = Unpacker::new(registry)
            .verbose(config.verbose)
            .entity_namespace(config.entity_namespace.clone());

        if config.verbose {
            tracing::debug!(
                target: "flatpack",
                models = registry.len(),
                namespace = config.entity_namespace.as_deref().unwrap_or_default(),
                "flatpack configured"
            );
        }

        Self {
            config,
            packer,
            unpacker,
        }
    }

    /// Default options over `registry`.
    #[must_use]
    pub fn with_registry(registry: &'r EntityRegistry) -> Self {
        Self::new(FlatpackConfig::default(), registry)
    }

    #[must_use]
    pub const fn config(&self) -> &FlatpackConfig {
        &self.config
    }

    #[must_use]
    pub const fn packer(&self) -> &Packer {
        &self.packer
    }

    #[must_use]
    pub const fn unpacker(&self) -> &Unpacker<'r> {
        &self.unpacker
    }

    // ─────────────────────────────────────────────
    // Packing
    // ─────────────────────────────────────────────

    #[must_use]
    pub fn pack(&self, graph: &Graph, root: Option<EntityKey>) -> Document {
        self.packer.pack(graph, root)
    }

    #[must_use]
    pub fn pack_many(&self, graph: &Graph, roots: &[EntityKey]) -> Document {
        self.packer.pack_many(graph, roots)
    }

    pub fn pack_to_string(&self, graph: &Graph, root: Option<EntityKey>) -> Result<String> {
        self.packer.pack_to_string(graph, root)
    }

    pub fn pack_to_value(&self, graph: &Graph, root: Option<EntityKey>) -> Result<JsonValue> {
        self.packer.pack(graph, root).to_json_value()
    }

    // ─────────────────────────────────────────────
    // Unpacking
    // ─────────────────────────────────────────────

    #[must_use]
    pub fn unpack(&self, doc: &Document) -> Unpacked {
        self.unpacker.unpack(doc)
    }

    pub fn unpack_str(&self, json: &str) -> Result<Unpacked> {
        self.unpacker.unpack_str(json)
    }

    pub fn unpack_value(&self, json: JsonValue) -> Result<Unpacked> {
        self.unpacker.unpack_value(json)
    }
}
