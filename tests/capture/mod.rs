// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use std::sync::Arc;

use anyhow::Result;
use propset::*;

propset::enum_property! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Status {
        Active,
        Retired,
    }
}

propset::model! {
    #[derive(Debug, Default)]
    pub struct Address as "it.capture.Address", proxy AddressPath {
        pub street: String,
        pub zip: u32,
    }
}

propset::model! {
    /// A person with an address and some friends.
    pub struct Person as "it.capture.Person", proxy PersonPath {
        pub name: String,
        pub age: u8,
        pub verified: bool,
        pub status: Status,
        pub address: Address,
        pub previous: Option<Address>,
        pub friends: Vec<Person>,
        pub nicknames: Vec<String>,
    }
}

#[test]
fn typed_capture_matches_strings() -> Result<()> {
    let mut builder = TypeSafeBuilder::<Person>::new();
    let model = builder.model();
    builder
        .add_property(model.name())?
        .add_property(model.address().zip())?;

    let mut expected = PropertySet::for_model::<Person>();
    expected.add_all(["name", "address.zip"])?;
    assert_eq!(builder.build(), expected);
    Ok(())
}

#[test]
fn typed_capture_through_collections() -> Result<()> {
    let mut builder = TypeSafeBuilder::<Person>::default();
    let model = builder.model();
    let friend = model.friends()[0].clone();
    builder
        .add_property(friend.address().street())?
        .add_property(friend.friends()[0].name())?
        .add_property(model.previous().street())?
        .add_property(model.nicknames())?
        .add_property(model.status())?
        .add_property(model.verified())?;

    assert_eq!(
        builder.build().iter().collect::<Vec<_>>(),
        [
            "friends.address.street",
            "friends.friends.name",
            "nicknames",
            "previous.street",
            "status",
            "verified",
        ]
    );
    Ok(())
}

#[test]
fn typed_schema_is_registered() {
    let catalog = Arc::new(SchemaCatalog::new());
    let schema = catalog.model::<Person>();
    assert_eq!(
        schema.lookup("friends").map(|p| p.kind.to_string()),
        Some("array<model(it.capture.Person)>".to_string())
    );
    assert!(catalog.contains("it.capture.Address"));
    assert_eq!(
        schema.lookup("status").map(|p| p.kind.to_string()),
        Some("enum[Active|Retired]".to_string())
    );
}

#[test]
fn typed_and_dynamic_agree() -> Result<()> {
    let catalog = Arc::new(SchemaCatalog::new());

    let mut typed = TypeSafeBuilder::<Person>::with_catalog(Arc::clone(&catalog));
    let model = typed.model();
    typed
        .add_property(model.address().street())?
        .add_property(model.age())?;

    let mut dynamic = DynamicBuilder::with_catalog(catalog, Person::TYPE_NAME)?;
    let root = dynamic.model();
    dynamic
        .add_property(root.invoke("getAddress", &[])?.invoke("getStreet", &[])?)?
        .add_property(root.invoke("getAge", &[])?)?;

    assert_eq!(typed.build(), dynamic.build());
    Ok(())
}

#[test]
fn dynamic_capture_of_schema_only_models() -> Result<()> {
    let catalog = Arc::new(SchemaCatalog::new());
    catalog.register_json(
        r#"[
          { "name": "com.example.Root",
            "properties": {
              "x": { "type": "integer" },
              "enabled": { "type": "boolean" },
              "child": { "type": "model", "model": "com.example.Child" } } },
          { "name": "com.example.Child",
            "properties": { "y": { "type": "string" } } }
        ]"#,
    )?;

    let mut builder = DynamicBuilder::with_catalog(catalog, "com.example.Root")?;
    let model = builder.model();
    builder
        .add_property(model.invoke("getX", &[])?)?
        .add_property(model.invoke("getChild", &[])?.invoke("getY", &[])?)?
        .add_property(model.invoke("isEnabled", &[])?)?;

    let named = builder.build_named("captured")?;
    assert_eq!(
        named.to_string(),
        "NamedPropertySet [name=captured, modelRoot=com.example.Root, properties=[child.y, enabled, x]]"
    );
    Ok(())
}

#[test]
fn capture_requires_an_accessor_call() {
    let mut builder = TypeSafeBuilder::<Person>::new();
    assert!(matches!(
        builder.add_property("name"),
        Err(PathError::InvalidArgument(_))
    ));
}
