use crate::Error;
use serde::{Deserialize, Serialize};

///
/// FlatpackConfig
///
/// Options for one packer/unpacker pair. Unknown keys are ignored and the
/// camelCase spellings used by other flatpack implementations are accepted.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct FlatpackConfig {
    /// Pretty-print packed JSON.
    #[serde(alias = "prettyPrint")]
    pub pretty: bool,

    /// Emit `debug` events while packing and unpacking.
    #[serde(alias = "verboseLogging")]
    pub verbose: bool,

    /// Namespace bucket names resolve under (`shop` → `shop::Merchant`).
    #[serde(
        alias = "typeNamespace",
        alias = "entityModule",
        skip_serializing_if = "Option::is_none"
    )]
    pub entity_namespace: Option<String>,
}

impl FlatpackConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON config object.
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|e| Error::config_deserialize(e.to_string()))
    }

    #[must_use]
    pub const fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    #[must_use]
    pub const fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    #[must_use]
    pub fn entity_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.entity_namespace = Some(namespace.into());
        self
    }
}

///
/// TESTS
///
