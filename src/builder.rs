// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Stack-based composition of property paths.
//!
//! A [`PathBuilder`] keeps a stack of relative prefixes. Pushing `child` makes
//! subsequent `add_property("y")` calls commit `child.y`, so several properties
//! of a nested model can be added without repeating the prefix:
//!
//! ```rust
//! let mut builder = PathBuilder::new("com.example.Root")?;
//! builder
//!     .add_property("x")?
//!     .push_path("child")?
//!     .add_property("y")?;
//! assert_eq!(builder.build().len(), 2);
//! ```

use alloc::sync::Arc;

use log::trace;

use crate::capture::Model;
use crate::config::PathConfig;
use crate::error::{PathError, Result};
use crate::path;
use crate::schema::catalog::SchemaCatalog;
use crate::schema::ModelSchema;
use crate::set::{NamedPropertySet, PropertySet};
use crate::validate::PathValidator;


#[derive(Debug, Clone)]
struct Frame {
    /// The path as passed to `push_path`.
    fragment: String,
    /// Root-relative prefix including `fragment`.
    prefix: String,
    depth: usize,
    schema: Arc<ModelSchema>,
}

/// Accumulates validated property paths into a [`PropertySet`].
///
/// The bottom frame of the path stack is the root and is never popped.
#[derive(Debug, Clone)]
pub struct PathBuilder {
    set: PropertySet,
    stack: Vec<Frame>,
}

impl PathBuilder {
    /// Builder for `root_type`, resolved in the global catalog.
    pub fn new(root_type: &str) -> Result<Self> {
        Ok(Self::from_set(PropertySet::new(root_type)?))
    }

    /// Builder for `root_type`, resolved in `catalog`.
    pub fn with_catalog(catalog: Arc<SchemaCatalog>, root_type: &str) -> Result<Self> {
        Ok(Self::from_set(PropertySet::with_catalog(catalog, root_type)?))
    }

    /// Builder for a statically declared model.
    pub fn for_model<M: Model>() -> Self {
        Self::from_set(PropertySet::for_model::<M>())
    }

    /// Builder that keeps adding to an existing set.
    pub fn from_set(set: PropertySet) -> Self {
        let root = Frame {
            fragment: String::new(),
            prefix: String::new(),
            depth: 0,
            schema: Arc::clone(set.schema()),
        };
        Self {
            set,
            stack: vec![root],
        }
    }

    pub fn with_config(mut self, config: PathConfig) -> Self {
        self.set = self.set.with_config(config);
        self
    }

    pub fn catalog(&self) -> &Arc<SchemaCatalog> {
        self.set.catalog()
    }

    pub fn config(&self) -> PathConfig {
        self.set.config()
    }

    pub fn root_type(&self) -> &str {
        self.set.root_type()
    }

    fn top(&self) -> &Frame {
        // The root frame is never popped.
        &self.stack[self.stack.len() - 1]
    }

    fn remaining_depth(&self) -> usize {
        self.config().max_path_depth.saturating_sub(self.top().depth)
    }

    /// Push `path`, relative to the current prefix. Every segment must lead
    /// into a nested model.
    pub fn push_path(&mut self, path: &str) -> Result<&mut Self> {
        let top = self.top();
        let validator = PathValidator::with_config(self.set.catalog(), self.set.config());
        let resolved = validator
            .resolve_within(&top.schema, path, self.remaining_depth())?
            .ok_or_else(|| self.unresolved(path))?;
        let schema = self
            .set
            .catalog()
            .descend(&resolved.property)
            .ok_or_else(|| {
                PathError::invalid(format!(
                    "'{}' is not a nested model and cannot be pushed",
                    path::join(&top.prefix, path)
                ))
            })?;

        let frame = Frame {
            fragment: path.to_string(),
            prefix: path::join(&top.prefix, path),
            depth: top.depth + path::depth(path),
            schema,
        };
        trace!("push {} -> '{}'", frame.fragment, frame.prefix);
        self.stack.push(frame);
        Ok(self)
    }

    /// Pop the most recent push. A no-op at the root.
    pub fn pop_path(&mut self) -> &mut Self {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
        self
    }

    /// The fragment passed to the most recent `push_path`, or `None` at root.
    pub fn peek(&self) -> Option<&str> {
        if self.stack.len() > 1 {
            Some(&self.top().fragment)
        } else {
            None
        }
    }

    /// The full root-relative prefix; empty at root.
    pub fn current_path(&self) -> &str {
        &self.top().prefix
    }

    /// Schema of the model the current prefix points into.
    pub fn current_schema(&self) -> &Arc<ModelSchema> {
        &self.top().schema
    }

    /// Number of frames pushed above the root.
    pub fn stack_depth(&self) -> usize {
        self.stack.len() - 1
    }

    /// Pop every frame above the root.
    pub fn reset_path_stack(&mut self) -> &mut Self {
        self.stack.truncate(1);
        self
    }

    /// Commit `path`, relative to the current prefix.
    pub fn add_property(&mut self, path: &str) -> Result<&mut Self> {
        let top = self.top();
        let validator = PathValidator::with_config(self.set.catalog(), self.set.config());
        if validator
            .resolve_within(&top.schema, path, self.remaining_depth())?
            .is_none()
        {
            return Err(self.unresolved(path));
        }
        let full = path::join(&top.prefix, path);
        trace!("commit '{full}' on {}", self.set.root_type());
        self.set.insert_resolved(full);
        Ok(self)
    }

    /// Commit every path in `paths`, relative to the current prefix.
    pub fn add_properties<I, S>(&mut self, paths: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for path in paths {
            self.add_property(path.as_ref())?;
        }
        Ok(self)
    }

    /// A copy of everything committed so far. The builder stays usable.
    pub fn build(&self) -> PropertySet {
        self.set.clone()
    }

    pub fn build_named(&self, name: impl Into<String>) -> Result<NamedPropertySet> {
        NamedPropertySet::new(name, self.build())
    }

    pub fn into_set(self) -> PropertySet {
        self.set
    }

    fn unresolved(&self, path: &str) -> PathError {
        let top = self.top();
        if top.prefix.is_empty() {
            PathError::invalid(format!(
                "'{path}' does not resolve from {}",
                top.schema.type_name()
            ))
        } else {
            PathError::invalid(format!(
                "'{path}' does not resolve from '{}' ({})",
                top.prefix,
                top.schema.type_name()
            ))
        }
    }
}
