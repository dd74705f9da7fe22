// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(clippy::expect_used)] // patterns are static

//! Syntax of property paths: identifier segments joined by single dots.

use lazy_static::lazy_static;
use regex::Regex;

/// One segment: a letter, letter number, connector (`_`) or currency symbol
/// (`$`), followed by any of those, digits or combining marks.
const SEGMENT: &str = r"[\p{L}\p{Nl}\p{Pc}\p{Sc}][\p{L}\p{N}\p{M}\p{Pc}\p{Sc}]*";

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(&format!("^{SEGMENT}$"))
        .expect("identifier pattern should compile");
    static ref PROPERTY_PATH: Regex = Regex::new(&format!(r"^{SEGMENT}(\.{SEGMENT})*$"))
        .expect("property path pattern should compile");
}

pub const SEPARATOR: char = '.';

/// Check that `name` can be a single path segment.
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// Check that `path` is `segment ("." segment)*` with identifier segments.
/// Leading, trailing or doubled dots are rejected.
pub fn is_well_formed(path: &str) -> bool {
    PROPERTY_PATH.is_match(path)
}

/// Split a path into its segments. Does not check well-formedness.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(SEPARATOR)
}

/// Number of segments in a well-formed path.
pub fn depth(path: &str) -> usize {
    if path.is_empty() {
        0
    } else {
        segments(path).count()
    }
}

/// Join a root-relative prefix and a relative path.
pub fn join(prefix: &str, path: &str) -> String {
    if prefix.is_empty() {
        path.to_string()
    } else if path.is_empty() {
        prefix.to_string()
    } else {
        format!("{prefix}{SEPARATOR}{path}")
    }
}

/// Check that `path` is blank: empty or whitespace only.
pub(crate) fn is_blank(path: &str) -> bool {
    path.trim().is_empty()
}
