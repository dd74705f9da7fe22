// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(missing_debug_implementations)] // registry internals are not debug logged

use alloc::sync::Arc;
use std::path::Path;

use anyhow::Context;
use dashmap::DashMap;
use log::debug;

use crate::error::{PathError, Result};
use crate::schema::catalog::SchemaCatalog;
use crate::set::NamedPropertySet;

mod load;

pub use load::{parse_entries, RegistryEntry};


/// Thread-safe registry of named property sets.
///
/// Keys are the names of the stored [`NamedPropertySet`]s.
#[derive(Clone)]
pub struct SetRegistry {
    inner: DashMap<String, Arc<NamedPropertySet>>,
    name: String,
}

impl SetRegistry {
    /// Create a new, empty registry with a given name.
    pub fn new(registry_name: impl Into<String>) -> Self {
        Self {
            inner: DashMap::new(),
            name: registry_name.into(),
        }
    }

    /// Get the name of this registry.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if a set with the given name exists.
    pub fn contains_set(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    /// Retrieve a set by name.
    pub fn get_set(&self, name: &str) -> Result<Arc<NamedPropertySet>> {
        self.inner
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| PathError::NotFound {
                name: name.to_string(),
            })
    }

    /// Store a set under its own name. Returns true if it replaced an existing
    /// set of the same name.
    pub fn put_set(&self, set: impl Into<Arc<NamedPropertySet>>) -> bool {
        let set = set.into();
        let name = set.name().to_string();
        let replaced = self.inner.insert(name.clone(), set).is_some();
        if replaced {
            debug!("{}: replaced property set {name}", self.name);
        }
        replaced
    }

    /// Remove a set by name. Returns the removed set if it existed.
    pub fn remove_set(&self, name: &str) -> Option<Arc<NamedPropertySet>> {
        self.inner.remove(name).map(|(_, v)| v)
    }

    /// Store every set in `sets`, replacing sets with the same names.
    pub fn add_all<I, S>(&self, sets: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<NamedPropertySet>>,
    {
        for set in sets {
            self.put_set(set);
        }
    }

    /// List all registered set names, sorted.
    pub fn list_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Get all registered sets as a vector.
    pub fn list_sets(&self) -> Vec<Arc<NamedPropertySet>> {
        self.inner
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Get the number of registered sets.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Clear all sets from the registry.
    pub fn clear(&self) {
        self.inner.clear();
    }

    /// Load sets from `name=QualifiedType:prop1,prop2` entries.
    ///
    /// Every entry is parsed and validated before any is stored, so a failing
    /// load leaves the registry untouched. Returns the number of sets loaded.
    pub fn load_str(&self, text: &str, catalog: &Arc<SchemaCatalog>) -> Result<usize> {
        let sets = load::build_sets(parse_entries(text)?, catalog)?;
        let count = sets.len();
        self.add_all(sets);
        debug!("{}: loaded {count} property sets", self.name);
        Ok(count)
    }

    /// Like [`Self::load_str`], reading the entries from a file.
    pub fn load_file(
        &self,
        path: impl AsRef<Path>,
        catalog: &Arc<SchemaCatalog>,
    ) -> anyhow::Result<usize> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read property sets from {}", path.display()))?;
        let count = self
            .load_str(&text, catalog)
            .with_context(|| format!("failed to load property sets from {}", path.display()))?;
        Ok(count)
    }
}

/// Registry visible to every unit of work in the process.
pub mod instances {
    use super::*;

    lazy_static::lazy_static! {
        /// Global singleton instance of the shared property set registry.
        pub static ref SHARED_SET_REGISTRY: Arc<SetRegistry> =
            Arc::new(SetRegistry::new("SHARED_SET_REGISTRY"));
    }
}

/// Handle to the process-wide registry.
pub fn shared() -> Arc<SetRegistry> {
    Arc::clone(&instances::SHARED_SET_REGISTRY)
}

/// Macro to generate free functions that forward to a registry instance.
///
/// # Arguments
/// * `$registry` - Expression evaluating to the registry to wrap
/// * `$description` - Human-readable description of the registry (e.g., "shared")
macro_rules! generate_registry_helpers {
    ($registry:expr, $description:literal) => {
        #[doc = concat!("Check if the ", $description, " registry holds a set with the given name.")]
        pub fn contains_set(name: &str) -> bool {
            $registry.contains_set(name)
        }

        #[doc = concat!("Retrieve a set from the ", $description, " registry.")]
        pub fn get_set(name: &str) -> Result<Arc<NamedPropertySet>> {
            $registry.get_set(name)
        }

        #[doc = concat!("Store a set in the ", $description, " registry.")]
        pub fn put_set(set: impl Into<Arc<NamedPropertySet>>) -> bool {
            $registry.put_set(set)
        }

        #[doc = concat!("Remove a set from the ", $description, " registry.")]
        pub fn remove_set(name: &str) -> Option<Arc<NamedPropertySet>> {
            $registry.remove_set(name)
        }

        #[doc = concat!("List the set names of the ", $description, " registry.")]
        pub fn list_names() -> Vec<String> {
            $registry.list_names()
        }

        #[doc = concat!("Load entries into the ", $description, " registry.")]
        pub fn load_str(text: &str, catalog: &Arc<SchemaCatalog>) -> Result<usize> {
            $registry.load_str(text, catalog)
        }

        #[doc = concat!("Clear the ", $description, " registry.")]
        pub fn clear() {
            $registry.clear();
        }
    };
}

/// Helper functions for the shared registry.
pub mod shared_sets {
    use super::*;

    generate_registry_helpers!(instances::SHARED_SET_REGISTRY, "shared");
}

/// The registries one unit of work sees: the shared registry, plus a private
/// registry no other unit of work can observe.
///
/// The two are never consulted implicitly for one another.
#[derive(Clone)]
pub struct RegistryContext {
    shared: Arc<SetRegistry>,
    local: Arc<SetRegistry>,
}

impl RegistryContext {
    /// A fresh unit of work over the process-wide shared registry.
    pub fn new(unit_name: impl Into<String>) -> Self {
        Self::with_shared(shared(), unit_name)
    }

    /// A fresh unit of work over an explicitly supplied shared registry.
    pub fn with_shared(shared: Arc<SetRegistry>, unit_name: impl Into<String>) -> Self {
        Self {
            shared,
            local: Arc::new(SetRegistry::new(unit_name)),
        }
    }

    pub fn shared(&self) -> &SetRegistry {
        &self.shared
    }

    pub fn local(&self) -> &SetRegistry {
        &self.local
    }
}
