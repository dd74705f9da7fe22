// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(missing_debug_implementations)] // loader closures are not debug printable

use alloc::collections::BTreeSet;
use alloc::sync::Arc;

use dashmap::DashMap;
use lazy_static::lazy_static;
use log::debug;
use parking_lot::Mutex;

use crate::capture::Model;
use crate::error::{PathError, Result};
use crate::schema::{ModelSchema, PropertyInfo};

type Loader = dyn Fn(&str) -> Option<ModelSchema> + Send + Sync;

/// Thread-safe cache of model schemas keyed by qualified type name.
///
/// Lookups are lock free. Construction on a miss (through the loader, or by
/// describing a statically declared model) is serialized so that concurrent
/// first access builds each schema once.
#[derive(Default)]
pub struct SchemaCatalog {
    inner: DashMap<String, Arc<ModelSchema>>,
    loader: Option<Box<Loader>>,
    construct: Mutex<()>,
}

lazy_static! {
    /// Process-wide catalog used when no explicit catalog is supplied.
    static ref GLOBAL_CATALOG: Arc<SchemaCatalog> = Arc::new(SchemaCatalog::new());
}

impl SchemaCatalog {
    /// Create a new, empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog that asks `loader` for schemas it has not seen yet.
    ///
    /// The loader runs while the construction lock is held and must not call
    /// back into the same catalog.
    pub fn with_loader<F>(loader: F) -> Self
    where
        F: Fn(&str) -> Option<ModelSchema> + Send + Sync + 'static,
    {
        Self {
            loader: Some(Box::new(loader)),
            ..Self::default()
        }
    }

    /// The process-wide catalog.
    pub fn global() -> Arc<SchemaCatalog> {
        Arc::clone(&GLOBAL_CATALOG)
    }

    /// Register a schema under its type name. Returns true if it replaced an
    /// existing schema.
    pub fn register(&self, schema: ModelSchema) -> bool {
        let name = schema.type_name().to_string();
        let replaced = self.inner.insert(name.clone(), Arc::new(schema)).is_some();
        if replaced {
            debug!("schema for {name} replaced");
        }
        replaced
    }

    /// Register one schema document, or an array of them. Returns the number
    /// of schemas registered. Nothing is registered if any document is invalid.
    pub fn register_json(&self, json: &str) -> Result<usize> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| PathError::invalid(format!("Failed to parse schema: {e}")))?;
        let schemas = match value {
            serde_json::Value::Array(documents) => documents
                .into_iter()
                .map(ModelSchema::from_serde_json_value)
                .collect::<Result<Vec<_>>>()?,
            document => vec![ModelSchema::from_serde_json_value(document)?],
        };
        let count = schemas.len();
        for schema in schemas {
            self.register(schema);
        }
        Ok(count)
    }

    /// Retrieve a cached schema by name, if it exists.
    pub fn get(&self, type_name: &str) -> Option<Arc<ModelSchema>> {
        self.inner.get(type_name).map(|entry| Arc::clone(entry.value()))
    }

    /// Resolve a qualified type name, constructing the schema through the
    /// loader on a miss.
    pub fn resolve(&self, type_name: &str) -> Result<Arc<ModelSchema>> {
        if type_name.trim().is_empty() {
            return Err(PathError::invalid("model type name must not be empty"));
        }
        if let Some(schema) = self.get(type_name) {
            return Ok(schema);
        }

        let Some(loader) = &self.loader else {
            return Err(PathError::type_not_found(type_name));
        };

        let _guard = self.construct.lock();
        // Another thread may have constructed it while we waited.
        if let Some(schema) = self.get(type_name) {
            return Ok(schema);
        }
        match loader(type_name) {
            Some(schema) => {
                debug!("constructed schema {schema}");
                let schema = Arc::new(schema);
                self.inner
                    .insert(type_name.to_string(), Arc::clone(&schema));
                Ok(schema)
            }
            None => Err(PathError::type_not_found(type_name)),
        }
    }

    /// Get the schema of a statically declared model, constructing it and the
    /// schemas of every model it references on first use.
    pub fn model<M: Model>(&self) -> Arc<ModelSchema> {
        if let Some(schema) = self.get(M::TYPE_NAME) {
            return schema;
        }

        let _guard = self.construct.lock();
        if let Some(schema) = self.get(M::TYPE_NAME) {
            return schema;
        }
        let mut closure = SchemaClosure::new(self);
        M::collect_schemas(&mut closure);
        closure.commit();

        self.get(M::TYPE_NAME).unwrap_or_else(|| {
            let schema = Arc::new(M::describe());
            self.inner
                .insert(M::TYPE_NAME.to_string(), Arc::clone(&schema));
            schema
        })
    }

    /// Schema reached by descending into `property`: present when the property
    /// references a model (directly or as array items) that has properties of
    /// its own.
    pub fn descend(&self, property: &PropertyInfo) -> Option<Arc<ModelSchema>> {
        let model = property.kind.model_name()?;
        match self.resolve(model) {
            Ok(schema) if !schema.is_empty() => Some(schema),
            Ok(_) => None,
            Err(err) => {
                debug!("cannot descend into {}: {err}", property.name);
                None
            }
        }
    }

    /// Remove a schema by name. Returns the removed schema if it existed.
    pub fn remove(&self, type_name: &str) -> Option<Arc<ModelSchema>> {
        self.inner.remove(type_name).map(|(_, v)| v)
    }

    /// Check if a schema with the given name is cached.
    pub fn contains(&self, type_name: &str) -> bool {
        self.inner.contains_key(type_name)
    }

    /// List all cached type names, sorted.
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Get the number of cached schemas.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Clear all schemas from the catalog.
    pub fn clear(&self) {
        self.inner.clear();
    }
}

/// The set of schemas a statically declared model needs, gathered before any
/// of them is published so that readers never see a model whose nested models
/// are still missing.
pub struct SchemaClosure<'a> {
    catalog: &'a SchemaCatalog,
    seen: BTreeSet<&'static str>,
    pending: Vec<ModelSchema>,
}

impl<'a> SchemaClosure<'a> {
    fn new(catalog: &'a SchemaCatalog) -> Self {
        Self {
            catalog,
            seen: BTreeSet::new(),
            pending: Vec::new(),
        }
    }

    /// Record the model `type_name` unless it is already known. Returns true if
    /// the caller should go on to visit the model's property types.
    pub fn visit(&mut self, type_name: &'static str, describe: fn() -> ModelSchema) -> bool {
        if self.seen.contains(type_name) || self.catalog.contains(type_name) {
            return false;
        }
        self.seen.insert(type_name);
        self.pending.push(describe());
        true
    }

    fn commit(self) {
        // Referenced models first, the requested model last.
        for schema in self.pending.into_iter().rev() {
            debug!("constructed schema {schema}");
            self.catalog.register(schema);
        }
    }
}
