// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(clippy::expect_used, dead_code)]

//! Shared model fixtures for unit tests.

use alloc::sync::Arc;

use crate::schema::catalog::SchemaCatalog;

pub const ROOT: &str = "com.example.Root";
pub const CHILD: &str = "com.example.Child";
pub const GRANDCHILD: &str = "com.example.GrandChild";
pub const NODE: &str = "com.example.Node";
pub const SHAPE: &str = "com.example.Shape";
pub const MARKER: &str = "com.example.Marker";

pub const FIXTURE_SCHEMAS: &str = r#"[
  {
    "name": "com.example.Root",
    "properties": {
      "x": { "type": "integer" },
      "name": { "type": "string" },
      "active": { "type": "boolean" },
      "ratio": { "type": "number" },
      "initial": { "type": "char" },
      "payload": { "type": "bytes" },
      "kind": { "type": "enum", "variants": ["Small", "Large"] },
      "child": { "type": "model", "model": "com.example.Child" },
      "children": { "type": "array", "items": { "type": "model", "model": "com.example.Child" } },
      "tags": { "type": "array", "items": { "type": "string" } },
      "shape": { "type": "model", "model": "com.example.Shape" },
      "marker": { "type": "model", "model": "com.example.Marker" }
    }
  },
  {
    "name": "com.example.Child",
    "properties": {
      "y": { "type": "string" },
      "grandChild": { "type": "model", "model": "com.example.GrandChild" }
    }
  },
  {
    "name": "com.example.GrandChild",
    "properties": {
      "z": { "type": "integer" }
    }
  },
  {
    "name": "com.example.Node",
    "properties": {
      "value": { "type": "integer" },
      "parent": { "type": "model", "model": "com.example.Node" }
    }
  },
  { "name": "com.example.Shape", "constructible": false },
  { "name": "com.example.Marker" }
]"#;

/// A fresh catalog holding the fixture schemas.
pub fn fixture_catalog() -> Arc<SchemaCatalog> {
    let catalog = SchemaCatalog::new();
    catalog
        .register_json(FIXTURE_SCHEMAS)
        .expect("fixture schemas should be valid");
    Arc::new(catalog)
}

crate::enum_property! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Size {
        Small,
        Large,
    }
}

crate::model! {
    #[derive(Debug, Default)]
    pub struct Leaf as "test.typed.Leaf", proxy LeafPath {
        pub z: i64,
    }
}

crate::model! {
    #[derive(Debug, Default)]
    pub struct Branch as "test.typed.Branch", proxy BranchPath {
        pub y: String,
        pub leaf: Leaf,
        pub enabled: bool,
    }
}

crate::model! {
    pub struct Tree as "test.typed.Tree", proxy TreePath {
        pub x: i32,
        pub label: Option<String>,
        pub size: Size,
        pub branch: Branch,
        pub branches: Vec<Branch>,
        pub scores: Vec<f64>,
        pub parent: Option<Box<Tree>>,
    }
}
