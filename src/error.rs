// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use thiserror::Error;

/// Errors raised by schema lookups, path validation, builders and registries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// Malformed or semantically invalid input supplied by the caller.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A named lookup failed.
    #[error("no property set named '{name}' is registered")]
    NotFound { name: String },

    /// A qualified model type name could not be resolved to a schema.
    #[error("model type '{type_name}' not found")]
    TypeNotFound { type_name: String },
}

impl PathError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        PathError::InvalidArgument(msg.into())
    }

    pub(crate) fn type_not_found(type_name: impl Into<String>) -> Self {
        PathError::TypeNotFound {
            type_name: type_name.into(),
        }
    }
}

pub type Result<T> = core::result::Result<T, PathError>;
