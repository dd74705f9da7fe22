// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// Use README.md as crate documentation.
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

extern crate alloc;

pub mod builder;
pub mod capture;
pub mod config;
mod error;
pub mod path;
pub mod registry;
pub mod schema;
pub mod set;
pub mod validate;

#[cfg(test)]
mod test_utils;

pub use builder::PathBuilder;
pub use capture::{
    Captured, DynamicBuilder, DynamicProxy, Model, ModelProxy, PropertyType, TypeSafeBuilder,
};
pub use config::PathConfig;
pub use error::{PathError, Result};
pub use registry::{RegistryContext, SetRegistry};
pub use schema::catalog::SchemaCatalog;
pub use schema::{ModelSchema, PropertyInfo, PropertyKind};
pub use set::{NamedPropertySet, PropertySet};
pub use validate::PathValidator;
