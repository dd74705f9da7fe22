// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use std::sync::Arc;

use anyhow::Result;
use propset::*;

const SCHEMAS: &str = r#"[
  { "name": "com.example.Root",
    "properties": {
      "x": { "type": "integer" },
      "child": { "type": "model", "model": "com.example.Child" } } },
  { "name": "com.example.Child",
    "properties": {
      "y": { "type": "string" },
      "z": { "type": "integer" } } }
]"#;

fn catalog() -> Result<Arc<SchemaCatalog>> {
    let catalog = Arc::new(SchemaCatalog::new());
    catalog.register_json(SCHEMAS)?;
    Ok(catalog)
}

#[test]
fn push_then_add() -> Result<()> {
    let mut builder = PathBuilder::with_catalog(catalog()?, "com.example.Root")?;
    builder
        .add_property("x")?
        .push_path("child")?
        .add_property("y")?;
    let set = builder.build();

    let mut expected = PropertySet::with_catalog(catalog()?, "com.example.Root")?;
    expected.add_all(["x", "child.y"])?;
    assert_eq!(set, expected);
    Ok(())
}

#[test]
fn validator_rejects_missing_nested_property() -> Result<()> {
    let catalog = catalog()?;
    let validator = PathValidator::new(&catalog);
    assert!(validator.validate("com.example.Root", "child.y")?);
    assert!(!validator.validate("com.example.Root", "child.w")?);
    assert!(!validator.validate("com.example.Root", "x.y")?);
    Ok(())
}

#[test]
fn pop_beyond_root_is_harmless() -> Result<()> {
    let mut builder = PathBuilder::with_catalog(catalog()?, "com.example.Root")?;
    builder.pop_path();
    assert_eq!(builder.peek(), None);
    builder.push_path("child")?;
    assert_eq!(builder.peek(), Some("child"));
    builder.pop_path().pop_path().pop_path();
    builder.add_property("x")?;
    assert_eq!(builder.build().iter().collect::<Vec<_>>(), ["x"]);
    Ok(())
}

#[test]
fn adding_twice_is_idempotent() -> Result<()> {
    let mut set = PropertySet::with_catalog(catalog()?, "com.example.Root")?;
    assert!(set.add("child.z")?);
    assert!(!set.add("child.z")?);
    assert_eq!(set.len(), 1);
    Ok(())
}

#[test]
fn builder_errors_surface_as_path_errors() -> Result<()> {
    let mut builder = PathBuilder::with_catalog(catalog()?, "com.example.Root")?;
    for bad in ["", "child..y", ".x", "x.", "nope"] {
        assert!(
            matches!(
                builder.add_property(bad),
                Err(PathError::InvalidArgument(_))
            ),
            "{bad:?}"
        );
    }
    assert!(builder.build().is_empty());

    assert!(matches!(
        PathBuilder::with_catalog(catalog()?, "com.example.Nope"),
        Err(PathError::TypeNotFound { .. })
    ));
    Ok(())
}

#[test]
fn named_sets_round_trip_through_registry() -> Result<()> {
    let mut builder = PathBuilder::with_catalog(catalog()?, "com.example.Root")?;
    builder.push_path("child")?.add_properties(["y", "z"])?;
    let named = builder.build_named("childFields")?;

    let registry = SetRegistry::new("builder-tests");
    registry.put_set(named);
    let stored = registry.get_set("childFields")?;
    assert_eq!(
        serde_json::to_value(&*stored)?,
        serde_json::json!({
            "name": "childFields",
            "modelRoot": "com.example.Root",
            "properties": ["child.y", "child.z"]
        })
    );
    Ok(())
}

#[test]
fn config_from_json() -> Result<()> {
    let config = PathConfig::from_json_str(r#"{ "maxPathDepth": 1 }"#)?;
    let mut builder =
        PathBuilder::with_catalog(catalog()?, "com.example.Root")?.with_config(config);
    builder.add_property("x")?;
    assert!(builder.add_property("child.y").is_err());
    Ok(())
}
