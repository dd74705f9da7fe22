// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{bail, Result};
use propset::*;
use serde::{Deserialize, Serialize};
use test_generator::test_resources;

#[derive(Serialize, Deserialize, PartialEq, Debug)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ExpectedSet {
    model_root: String,
    properties: Vec<String>,
}

#[derive(Serialize, Deserialize, PartialEq, Debug)]
#[serde(deny_unknown_fields)]
struct Case {
    pub note: String,
    pub text: String,
    pub sets: Option<BTreeMap<String, ExpectedSet>>,
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, PartialEq, Debug)]
#[serde(deny_unknown_fields)]
struct Test {
    schemas: Vec<serde_json::Value>,
    cases: Vec<Case>,
}

fn yaml_test_impl(file: &str) -> Result<()> {
    println!("\nrunning {file}");

    let yaml = std::fs::read_to_string(file)?;
    let test: Test = serde_yaml::from_str(&yaml)?;

    let catalog = Arc::new(SchemaCatalog::new());
    catalog.register_json(&serde_json::to_string(&test.schemas)?)?;

    for case in &test.cases {
        print!("case {} ", case.note);

        let registry = SetRegistry::new(case.note.as_str());
        match (registry.load_str(&case.text, &catalog), &case.error) {
            (Ok(count), None) => {
                let Some(expected) = &case.sets else {
                    bail!("case {} must specify sets or error", case.note);
                };
                assert_eq!(count, expected.len(), "{}", case.note);
                for (name, set) in expected {
                    let actual = registry.get_set(name)?;
                    assert_eq!(actual.root_type(), set.model_root, "{}", case.note);
                    assert_eq!(
                        actual.iter().collect::<Vec<_>>(),
                        set.properties.iter().collect::<Vec<_>>(),
                        "{}",
                        case.note
                    );
                }
                assert_eq!(
                    registry.list_names(),
                    expected.keys().cloned().collect::<Vec<_>>()
                );
            }
            (Ok(count), Some(expected)) => {
                bail!("expected error containing `{expected}`, loaded {count} sets")
            }
            (Err(actual), Some(expected)) => {
                let actual = actual.to_string();
                if !actual.contains(expected.as_str()) {
                    bail!("Error message\n`{actual}\n`\ndoes not contain `{expected}`");
                }
                assert!(registry.is_empty(), "{}", case.note);
            }
            (Err(actual), None) => return Err(actual.into()),
        }

        println!("passed");
    }
    println!("{} cases passed.", test.cases.len());
    Ok(())
}

fn yaml_test(file: &str) -> Result<()> {
    match yaml_test_impl(file) {
        Ok(_) => Ok(()),
        Err(e) => {
            // If Err is returned, it doesn't always get printed by cargo test.
            // Therefore, panic with the error.
            panic!("{}", e);
        }
    }
}

#[test_resources("tests/registry/cases/*.yaml")]
fn run(path: &str) {
    yaml_test(path).unwrap()
}

#[test]
fn shared_and_unit_scopes() -> Result<()> {
    let catalog = Arc::new(SchemaCatalog::new());
    catalog.register_json(
        r#"[{ "name": "com.example.Scoped", "properties": { "x": { "type": "integer" } } }]"#,
    )?;

    let unit = RegistryContext::new("request-1");
    unit.local()
        .load_str("scoped_local=com.example.Scoped:x", &catalog)?;
    assert!(unit.local().contains_set("scoped_local"));
    assert!(!unit.shared().contains_set("scoped_local"));

    let other = RegistryContext::new("request-2");
    assert!(!other.local().contains_set("scoped_local"));

    unit.local().clear();
    assert!(unit.local().is_empty());
    Ok(())
}

#[test]
fn load_from_file() -> Result<()> {
    let catalog = Arc::new(SchemaCatalog::new());
    catalog.register_json(
        r#"{ "name": "com.example.Filed", "properties": { "id": { "type": "string" } } }"#,
    )?;

    let path = std::env::temp_dir().join(format!("propset-it-{}.properties", std::process::id()));
    std::fs::write(&path, "# sets\nbyId=com.example.Filed:id\n")?;

    let registry = SetRegistry::new("file");
    let loaded = registry.load_file(&path, &catalog);
    std::fs::remove_file(&path)?;

    assert_eq!(loaded?, 1);
    assert!(registry.get_set("byId")?.contains("id"));
    Ok(())
}
