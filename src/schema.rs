// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(clippy::pattern_type_mismatch)]

/// Model schemas describe the named, typed properties of a model type.
///
/// A model is identified by its qualified type name (for example `com.example.Root`).
/// Each property has a [`PropertyKind`]. Kinds are either terminal (numbers, booleans,
/// characters, strings, bytes, enums) or reference another model by its qualified name,
/// directly or as the item type of an array. Nested models are never embedded; they are
/// resolved on demand through a [`catalog::SchemaCatalog`], which keeps recursive models
/// (a `Node` with a `parent: Node`) representable without cycles of ownership.
///
/// Schemas come from two places:
///     1. Statically declared models, via the `model!` macro, which derives the schema from
///        the struct's fields.
///     2. JSON documents, for models that only exist as metadata:
///
/// ```json
/// {
///   "name": "com.example.Root",
///   "properties": {
///     "x": { "type": "integer" },
///     "label": { "type": "string" },
///     "kind": { "type": "enum", "variants": ["Small", "Large"] },
///     "child": { "type": "model", "model": "com.example.Child" },
///     "children": { "type": "array", "items": { "type": "model", "model": "com.example.Child" } }
///   }
/// }
/// ```
///
/// Schemas are immutable once built and shared behind `Arc`, so the same schema can be
/// used to validate paths from several threads at once.
///
/// `deny_unknown_fields` is used throughout so that a misspelled attribute in a schema
/// document raises an error instead of being silently ignored.
use alloc::collections::BTreeMap;
use core::fmt;

use serde::{Deserialize, Deserializer};

use crate::error::{PathError, Result};
use crate::path;

pub mod catalog;


/// The declared type of a property.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
// Use `type` when deserializing to discriminate between different kinds.
#[serde(tag = "type")]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub enum PropertyKind {
    Boolean,
    Integer,
    Number,
    Char,
    String,
    Bytes,

    /// A closed set of named constants. The first variant doubles as the
    /// placeholder returned during path capture.
    Enum { variants: Vec<String> },

    /// Another model, referenced by qualified type name.
    Model { model: String },

    /// A sequence of `items`. Path descent goes through the item type.
    Array { items: Box<PropertyKind> },
}

impl PropertyKind {
    pub fn model(type_name: impl Into<String>) -> Self {
        PropertyKind::Model {
            model: type_name.into(),
        }
    }

    pub fn array(items: PropertyKind) -> Self {
        PropertyKind::Array {
            items: Box::new(items),
        }
    }

    /// Qualified name of the model reached by descending into this kind, if any.
    pub fn model_name(&self) -> Option<&str> {
        match self {
            PropertyKind::Model { model } => Some(model),
            PropertyKind::Array { items } => items.model_name(),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, PropertyKind::Array { .. })
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKind::Boolean => f.write_str("boolean"),
            PropertyKind::Integer => f.write_str("integer"),
            PropertyKind::Number => f.write_str("number"),
            PropertyKind::Char => f.write_str("char"),
            PropertyKind::String => f.write_str("string"),
            PropertyKind::Bytes => f.write_str("bytes"),
            PropertyKind::Enum { variants } => write!(f, "enum[{}]", variants.join("|")),
            PropertyKind::Model { model } => write!(f, "model({model})"),
            PropertyKind::Array { items } => write!(f, "array<{items}>"),
        }
    }
}

/// A named property of a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyInfo {
    pub name: String,
    pub kind: PropertyKind,
}

/// The schema of one model type.
///
/// Construction validates the type name and the property names; a schema
/// without properties is legal. Such a model is treated as terminal by path
/// descent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSchema {
    type_name: String,
    properties: BTreeMap<String, PropertyInfo>,
    constructible: bool,
}

impl ModelSchema {
    /// Start describing the model `type_name`.
    pub fn builder(type_name: impl Into<String>) -> ModelSchemaBuilder {
        ModelSchemaBuilder {
            type_name: type_name.into(),
            properties: Vec::new(),
            constructible: true,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Look up a property by name.
    pub fn lookup(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.get(name)
    }

    pub fn properties(&self) -> impl Iterator<Item = &PropertyInfo> {
        self.properties.values()
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Whether a default instance of this model can be produced.
    /// Abstract models set this to false.
    pub fn is_constructible(&self) -> bool {
        self.constructible
    }

    /// Parse a JSON schema document into a `ModelSchema`.
    pub fn from_serde_json_value(schema: serde_json::Value) -> Result<Self> {
        serde_json::from_value::<ModelSchema>(schema)
            .map_err(|e| PathError::invalid(format!("Failed to parse schema: {e}")))
    }

    /// Parse a JSON schema document from a string into a `ModelSchema`.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(s)
            .map_err(|e| PathError::invalid(format!("Failed to parse schema: {e}")))?;
        Self::from_serde_json_value(value)
    }
}

impl fmt::Display for ModelSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.type_name)?;
        for (idx, property) in self.properties.values().enumerate() {
            let sep = if idx == 0 { " " } else { ", " };
            write!(f, "{sep}{}: {}", property.name, property.kind)?;
        }
        if self.properties.is_empty() {
            f.write_str("}")
        } else {
            f.write_str(" }")
        }
    }
}

/// Incremental construction of a [`ModelSchema`].
#[derive(Debug, Clone)]
pub struct ModelSchemaBuilder {
    type_name: String,
    properties: Vec<PropertyInfo>,
    constructible: bool,
}

impl ModelSchemaBuilder {
    pub fn property(mut self, name: impl Into<String>, kind: PropertyKind) -> Self {
        self.properties.push(PropertyInfo {
            name: name.into(),
            kind,
        });
        self
    }

    /// Mark the model as abstract: no placeholder instance can be made for it.
    pub fn abstract_type(mut self) -> Self {
        self.constructible = false;
        self
    }

    pub fn build(self) -> Result<ModelSchema> {
        if self.type_name.trim().is_empty() {
            return Err(PathError::invalid("model type name must not be empty"));
        }
        let mut properties = BTreeMap::new();
        for property in self.properties {
            if !path::is_identifier(&property.name) {
                return Err(PathError::invalid(format!(
                    "'{}' is not a valid property name of {}",
                    property.name, self.type_name
                )));
            }
            if let Some(previous) = properties.insert(property.name.clone(), property) {
                return Err(PathError::invalid(format!(
                    "property '{}' is declared twice on {}",
                    previous.name, self.type_name
                )));
            }
        }
        Ok(ModelSchema {
            type_name: self.type_name,
            properties,
            constructible: self.constructible,
        })
    }

    /// Build without validating names. Used by `model!`, which strips the `r#`
    /// prefix of raw field identifiers before declaring them.
    #[doc(hidden)]
    pub fn build_unchecked(self) -> ModelSchema {
        debug_assert!(
            self.properties.iter().all(|p| path::is_identifier(&p.name)),
            "model {} declares a property that is not a path identifier",
            self.type_name
        );
        ModelSchema {
            type_name: self.type_name,
            properties: self
                .properties
                .into_iter()
                .map(|p| (p.name.clone(), p))
                .collect(),
            constructible: self.constructible,
        }
    }
}

fn constructible_default() -> bool {
    true
}

impl<'de> Deserialize<'de> for ModelSchema {
    /// Deserializes a schema document.
    ///
    /// The document must carry a `name`; `properties` defaults to empty and
    /// `constructible` to true. Property names are checked to be identifiers so
    /// that every property is addressable by a path.
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        #[serde(rename_all = "camelCase")]
        struct Document {
            name: String,
            #[serde(default)]
            properties: BTreeMap<String, PropertyKind>,
            #[serde(default = "constructible_default")]
            constructible: bool,
            // Accepted for documentation purposes only.
            #[allow(dead_code)]
            description: Option<String>,
        }

        let doc: Document = Deserialize::deserialize(deserializer)?;
        let mut builder = ModelSchema::builder(doc.name);
        for (name, kind) in doc.properties {
            builder = builder.property(name, kind);
        }
        if !doc.constructible {
            builder = builder.abstract_type();
        }
        builder
            .build()
            .map_err(|e| serde::de::Error::custom(format!("{e}")))
    }
}
