// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use alloc::collections::{btree_set, BTreeSet};
use alloc::sync::Arc;
use core::fmt;
use core::ops::{Deref, DerefMut};

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::capture::Model;
use crate::config::PathConfig;
use crate::error::{PathError, Result};
use crate::path;
use crate::schema::catalog::SchemaCatalog;
use crate::schema::ModelSchema;
use crate::validate::PathValidator;


/// A set of property paths, all valid against one root model.
///
/// Paths are validated on insertion, so a `PropertySet` never holds a path
/// that does not resolve. Iteration is in lexicographic order.
#[derive(Clone)]
pub struct PropertySet {
    catalog: Arc<SchemaCatalog>,
    root: Arc<ModelSchema>,
    config: PathConfig,
    paths: BTreeSet<String>,
}

impl PropertySet {
    /// Create an empty set rooted at `root_type`, resolved in the global catalog.
    pub fn new(root_type: &str) -> Result<Self> {
        Self::with_catalog(SchemaCatalog::global(), root_type)
    }

    /// Create an empty set rooted at `root_type`, resolved in `catalog`.
    pub fn with_catalog(catalog: Arc<SchemaCatalog>, root_type: &str) -> Result<Self> {
        let root = catalog.resolve(root_type)?;
        Ok(Self::from_schema(catalog, root))
    }

    /// Create an empty set rooted at a statically declared model.
    pub fn for_model<M: Model>() -> Self {
        let catalog = SchemaCatalog::global();
        let root = catalog.model::<M>();
        Self::from_schema(catalog, root)
    }

    pub fn from_schema(catalog: Arc<SchemaCatalog>, root: Arc<ModelSchema>) -> Self {
        Self {
            catalog,
            root,
            config: PathConfig::default(),
            paths: BTreeSet::new(),
        }
    }

    pub fn with_config(mut self, config: PathConfig) -> Self {
        self.config = config;
        self
    }

    /// Qualified type name of the root model.
    pub fn root_type(&self) -> &str {
        self.root.type_name()
    }

    pub fn schema(&self) -> &Arc<ModelSchema> {
        &self.root
    }

    pub fn catalog(&self) -> &Arc<SchemaCatalog> {
        &self.catalog
    }

    pub fn config(&self) -> PathConfig {
        self.config
    }

    /// Add a path. Returns false if it was already present.
    pub fn add(&mut self, path: &str) -> Result<bool> {
        if path::is_blank(path) {
            return Err(PathError::invalid("property path must not be empty"));
        }
        let validator = PathValidator::with_config(&self.catalog, self.config);
        if !validator.validate_from(&self.root, path)? {
            return Err(PathError::invalid(format!(
                "'{path}' is not a valid property path of {}",
                self.root.type_name()
            )));
        }
        Ok(self.paths.insert(path.to_string()))
    }

    /// Add every path in `paths`. Returns true if at least one was new.
    ///
    /// An empty input is not an error. The first invalid path fails the call,
    /// and paths added before it stay in the set.
    pub fn add_all<I, S>(&mut self, paths: I) -> Result<bool>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut changed = false;
        for path in paths {
            changed |= self.add(path.as_ref())?;
        }
        Ok(changed)
    }

    /// Insert a path the caller has already resolved against the root.
    pub(crate) fn insert_resolved(&mut self, path: String) -> bool {
        self.paths.insert(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn remove(&mut self, path: &str) -> bool {
        self.paths.remove(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, String> {
        self.paths.iter()
    }

    pub fn paths(&self) -> &BTreeSet<String> {
        &self.paths
    }

    fn fmt_fields(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "modelRoot={}, properties=[", self.root.type_name())?;
        for (idx, path) in self.paths.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            f.write_str(path)?;
        }
        f.write_str("]")
    }
}

impl PartialEq for PropertySet {
    fn eq(&self, other: &Self) -> bool {
        self.root.type_name() == other.root.type_name() && self.paths == other.paths
    }
}

impl Eq for PropertySet {}

impl fmt::Debug for PropertySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertySet")
            .field("root", &self.root.type_name())
            .field("paths", &self.paths)
            .finish()
    }
}

impl fmt::Display for PropertySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PropertySet [")?;
        self.fmt_fields(f)?;
        f.write_str("]")
    }
}

impl Serialize for PropertySet {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("PropertySet", 2)?;
        state.serialize_field("modelRoot", self.root.type_name())?;
        state.serialize_field("properties", &self.paths)?;
        state.end()
    }
}

impl<'a> IntoIterator for &'a PropertySet {
    type Item = &'a String;
    type IntoIter = btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

/// A [`PropertySet`] registered under a unique name.
#[derive(Clone, PartialEq, Eq)]
pub struct NamedPropertySet {
    name: String,
    set: PropertySet,
}

impl NamedPropertySet {
    pub fn new(name: impl Into<String>, set: PropertySet) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(PathError::invalid(
                "property set name must not be empty or whitespace-only",
            ));
        }
        Ok(Self { name, set })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set(&self) -> &PropertySet {
        &self.set
    }

    pub fn into_set(self) -> PropertySet {
        self.set
    }
}

impl Deref for NamedPropertySet {
    type Target = PropertySet;

    fn deref(&self) -> &PropertySet {
        &self.set
    }
}

impl DerefMut for NamedPropertySet {
    fn deref_mut(&mut self) -> &mut PropertySet {
        &mut self.set
    }
}

impl fmt::Debug for NamedPropertySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedPropertySet")
            .field("name", &self.name)
            .field("root", &self.set.root_type())
            .field("paths", self.set.paths())
            .finish()
    }
}

impl fmt::Display for NamedPropertySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NamedPropertySet [name={}, ", self.name)?;
        self.set.fmt_fields(f)?;
        f.write_str("]")
    }
}

impl Serialize for NamedPropertySet {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("NamedPropertySet", 3)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("modelRoot", self.set.root_type())?;
        state.serialize_field("properties", self.set.paths())?;
        state.end()
    }
}
