// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Tunables shared by validators, builders and capture.

use serde::Deserialize;

use crate::error::{PathError, Result};

/// Default limit on the number of segments in a property path.
pub const DEFAULT_MAX_PATH_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct PathConfig {
    /// Paths with more segments than this are rejected. Recursive models
    /// would otherwise admit unbounded paths.
    #[serde(default = "default_max_path_depth")]
    pub max_path_depth: usize,
}

fn default_max_path_depth() -> usize {
    DEFAULT_MAX_PATH_DEPTH
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            max_path_depth: DEFAULT_MAX_PATH_DEPTH,
        }
    }
}

impl PathConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: PathConfig = serde_json::from_str(s)
            .map_err(|e| PathError::invalid(format!("failed to parse path config: {e}")))?;
        if config.max_path_depth == 0 {
            return Err(PathError::invalid("maxPathDepth must be at least 1"));
        }
        Ok(config)
    }

    pub fn with_max_path_depth(mut self, max_path_depth: usize) -> Self {
        self.max_path_depth = max_path_depth;
        self
    }
}
