// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(missing_debug_implementations)]

use alloc::sync::Arc;

use log::trace;

use crate::config::PathConfig;
use crate::error::{PathError, Result};
use crate::path;
use crate::schema::catalog::SchemaCatalog;
use crate::schema::{ModelSchema, PropertyInfo};


/// The property a path resolves to, together with the schema that declares it.
#[derive(Debug, Clone)]
pub struct ResolvedPath {
    pub owner: Arc<ModelSchema>,
    pub property: PropertyInfo,
}

/// Checks dotted property paths against model schemas.
pub struct PathValidator<'a> {
    catalog: &'a SchemaCatalog,
    config: PathConfig,
}

impl<'a> PathValidator<'a> {
    pub fn new(catalog: &'a SchemaCatalog) -> Self {
        Self {
            catalog,
            config: PathConfig::default(),
        }
    }

    pub fn with_config(catalog: &'a SchemaCatalog, config: PathConfig) -> Self {
        Self { catalog, config }
    }

    /// Validates `path` against the model `root_type`.
    ///
    /// Returns `Ok(false)` when the path is malformed or does not resolve.
    /// Fails with `InvalidArgument` for a blank path or root type, and with
    /// `TypeNotFound` when the root type is unknown.
    pub fn validate(&self, root_type: &str, path: &str) -> Result<bool> {
        if root_type.trim().is_empty() {
            return Err(PathError::invalid("root model type must not be empty"));
        }
        let root = self.catalog.resolve(root_type)?;
        self.validate_from(&root, path)
    }

    /// Validates `path` relative to `schema`.
    pub fn validate_from(&self, schema: &Arc<ModelSchema>, path: &str) -> Result<bool> {
        Ok(self.resolve_from(schema, path)?.is_some())
    }

    /// Resolves `path` relative to `schema`, returning the final property.
    pub fn resolve_from(
        &self,
        schema: &Arc<ModelSchema>,
        path: &str,
    ) -> Result<Option<ResolvedPath>> {
        self.resolve_within(schema, path, self.config.max_path_depth)
    }

    /// Like [`Self::resolve_from`], with an explicit segment budget.
    pub(crate) fn resolve_within(
        &self,
        schema: &Arc<ModelSchema>,
        path: &str,
        max_depth: usize,
    ) -> Result<Option<ResolvedPath>> {
        if path::is_blank(path) {
            return Err(PathError::invalid("property path must not be empty"));
        }
        if !path::is_well_formed(path) {
            trace!("'{path}' is not a well formed property path");
            return Ok(None);
        }
        if path::depth(path) > max_depth {
            trace!("'{path}' exceeds the maximum path depth of {max_depth}");
            return Ok(None);
        }

        let mut current = Arc::clone(schema);
        let mut segments = path::segments(path).peekable();
        while let Some(segment) = segments.next() {
            let Some(property) = current.lookup(segment) else {
                trace!("{} has no property '{segment}'", current.type_name());
                return Ok(None);
            };
            if segments.peek().is_none() {
                return Ok(Some(ResolvedPath {
                    owner: Arc::clone(&current),
                    property: property.clone(),
                }));
            }
            let Some(next) = self.catalog.descend(property) else {
                trace!(
                    "{}.{segment} is terminal; cannot continue '{path}'",
                    current.type_name()
                );
                return Ok(None);
            };
            current = next;
        }

        // `is_well_formed` guarantees at least one segment.
        Ok(None)
    }
}
