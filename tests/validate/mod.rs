// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(test)]

use std::sync::Arc;

use anyhow::{bail, Result};
use propset::*;
use serde::{Deserialize, Serialize};
use test_generator::test_resources;

#[derive(Serialize, Deserialize, PartialEq, Debug)]
#[serde(deny_unknown_fields)]
struct Case {
    pub note: String,
    pub root: String,
    pub path: String,
    pub valid: Option<bool>,
    pub max_path_depth: Option<usize>,
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

        let config = match case.max_path_depth {
            Some(depth) => PathConfig::default().with_max_path_depth(depth),
            None => PathConfig::default(),
        };
        let validator = PathValidator::with_config(&catalog, config);

        match (validator.validate(&case.root, &case.path), &case.error) {
            (Ok(actual), None) => {
                let Some(expected) = case.valid else {
                    bail!("case {} must specify valid or error", case.note);
                };
                if actual != expected {
                    bail!(
                        "'{}' on {}: expected valid={expected}, got {actual}",
                        case.path,
                        case.root
                    );
                }

                // A set accepts exactly the paths the validator accepts.
                let mut set = PropertySet::with_catalog(Arc::clone(&catalog), &case.root)?
                    .with_config(config);
                assert_eq!(set.add(&case.path).is_ok(), expected, "{}", case.note);
            }
            (Ok(actual), Some(expected)) => {
                bail!("expected error containing `{expected}`, got valid={actual}")
            }
            (Err(actual), Some(expected)) => {
                let actual = actual.to_string();
                if !actual.contains(expected.as_str()) {
                    bail!("Error message\n`{actual}\n`\ndoes not contain `{expected}`");
                }
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

#[test_resources("tests/validate/cases/*.yaml")]
fn run(path: &str) {
    yaml_test(path).unwrap()
}
