use crate::{
    casing,
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::entity::EntityModel,
};
use std::collections::HashMap;
use thiserror::Error as ThisError;

///
/// RegistryError
///

#[derive(Debug, ThisError)]
pub enum RegistryError {
    #[error("entity model '{0}' not found")]
    ModelNotFound(String),

    #[error("entity model '{0}' already registered")]
    ModelAlreadyRegistered(String),
}

impl RegistryError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::ModelNotFound(_) => ErrorClass::NotFound,
            Self::ModelAlreadyRegistered(_) => ErrorClass::Conflict,
        }
    }
}

impl From<RegistryError> for InternalError {
    fn from(err: RegistryError) -> Self {
        Self::new(err.class(), ErrorOrigin::Registry, err.to_string())
    }
}

///
/// EntityRegistry
///
/// Type resolver for the unpacker: maps type paths to entity models.
/// Bucket names resolve through `casing::type_path`, optionally scoped by a
/// namespace, so `merchantLocation` under `shop` finds `shop::MerchantLocation`.
///

#[derive(Debug, Default)]
pub struct EntityRegistry {
    models: HashMap<&'static str, &'static EntityModel>,
}

impl EntityRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a model list; duplicates are rejected.
    pub fn with_models(models: &[&'static EntityModel]) -> Result<Self, InternalError> {
        let mut registry = Self::new();
        for model in models {
            registry.register(model)?;
        }

        Ok(registry)
    }

    /// Register one model under its path.
    pub fn register(&mut self, model: &'static EntityModel) -> Result<(), InternalError> {
        if self.models.contains_key(model.path) {
            return Err(RegistryError::ModelAlreadyRegistered(model.path.to_string()).into());
        }

        self.models.insert(model.path, model);
        Ok(())
    }

    /// Look up a model by exact path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&'static EntityModel> {
        self.models.get(path).copied()
    }

    /// Look up a model by exact path, failing when it is not registered.
    pub fn try_get(&self, path: &str) -> Result<&'static EntityModel, InternalError> {
        self.get(path)
            .ok_or_else(|| RegistryError::ModelNotFound(path.to_string()).into())
    }

    /// Resolve a bucket name to a model. Unresolvable names are not an error.
    #[must_use]
    pub fn resolve(&self, bucket: &str, namespace: Option<&str>) -> Option<&'static EntityModel> {
        self.get(&casing::type_path(bucket, namespace))
    }

    /// Iterate registered models.
    pub fn iter(&self) -> impl Iterator<Item = &'static EntityModel> + '_ {
        self.models.values().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

///
/// TESTS
///
