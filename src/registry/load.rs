// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Parsing of the bulk-load format.
//!
//! Each logical line is `name=QualifiedType:prop1, prop2, ...`. Blank lines and
//! lines starting with `#` or `!` are skipped. A line ending in an odd number of
//! backslashes continues on the next line.

use alloc::collections::BTreeMap;
use alloc::sync::Arc;

use log::debug;

use crate::error::{PathError, Result};
use crate::schema::catalog::SchemaCatalog;
use crate::set::{NamedPropertySet, PropertySet};

/// One parsed `name=Type:props` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub name: String,
    pub type_name: String,
    pub properties: Vec<String>,
    /// 1-based line on which the entry starts.
    pub line: usize,
}

/// Split `text` into logical lines, joining continuations.
fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut current: Option<(usize, String)> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = raw.trim_start();
        let (start, mut buf) = match current.take() {
            Some(partial) => partial,
            None => {
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                    continue;
                }
                (line_no, String::new())
            }
        };

        let trailing = trimmed.len() - trimmed.trim_end_matches('\\').len();
        if trailing % 2 == 1 {
            buf.push_str(&trimmed[..trimmed.len() - 1]);
            current = Some((start, buf));
        } else {
            buf.push_str(trimmed);
            lines.push((start, buf));
        }
    }

    // A continuation on the last line just ends the entry.
    if let Some(partial) = current {
        lines.push(partial);
    }
    lines
}

/// Parse every entry in `text`. Any malformed entry fails the whole parse.
pub fn parse_entries(text: &str) -> Result<Vec<RegistryEntry>> {
    logical_lines(text)
        .into_iter()
        .map(|(line, content)| parse_entry(line, &content))
        .collect()
}

fn parse_entry(line: usize, content: &str) -> Result<RegistryEntry> {
    let malformed =
        |reason: &str| PathError::invalid(format!("line {line}: {reason}: '{content}'"));

    let (name, value) = content
        .split_once('=')
        .ok_or_else(|| malformed("expected name=Type:properties"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(malformed("missing set name"));
    }
    let value = value.trim();
    if value.is_empty() {
        return Err(malformed("empty value"));
    }
    let (type_name, properties) = value
        .split_once(':')
        .ok_or_else(|| malformed("missing ':' between type and properties"))?;
    let type_name = type_name.trim();
    if type_name.is_empty() {
        return Err(malformed("missing model type"));
    }
    let properties = properties
        .split(',')
        .map(str::trim)
        .map(|p| {
            if p.is_empty() {
                Err(malformed("empty property in list"))
            } else {
                Ok(p.to_string())
            }
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(RegistryEntry {
        name: name.to_string(),
        type_name: type_name.to_string(),
        properties,
        line,
    })
}

/// Resolve and validate parsed entries. Later entries with the same name win.
pub(crate) fn build_sets(
    entries: Vec<RegistryEntry>,
    catalog: &Arc<SchemaCatalog>,
) -> Result<Vec<NamedPropertySet>> {
    let mut sets = BTreeMap::new();
    for entry in entries {
        let mut set = PropertySet::with_catalog(Arc::clone(catalog), &entry.type_name)?;
        set.add_all(&entry.properties).map_err(|e| match e {
            PathError::InvalidArgument(msg) => PathError::invalid(format!(
                "line {}: set '{}': {msg}",
                entry.line, entry.name
            )),
            other => other,
        })?;
        let named = NamedPropertySet::new(entry.name.clone(), set)?;
        if sets.insert(entry.name.clone(), named).is_some() {
            debug!("line {}: set '{}' defined again", entry.line, entry.name);
        }
    }
    Ok(sets.into_values().collect())
}
