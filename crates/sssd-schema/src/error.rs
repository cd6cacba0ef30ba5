//! Error types for schema loading, value coercion and provider composition

use crate::types::OptionType;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a schema description
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The description file is not valid INI text
    #[error("{file}: {source}")]
    Parse {
        file: String,
        #[source]
        source: sssd_ini::Error,
    },

    /// An option declaration or section name that cannot be understood
    #[error("{file}: [{section}] {option}: {message}")]
    InvalidDeclaration {
        file: String,
        section: String,
        option: String,
        message: String,
    },

    /// The same scope declared twice with different option sets
    #[error("{file}: [{section}] conflicts with an earlier declaration")]
    Conflict { file: String, section: String },

    /// A scope every schema must declare is absent
    #[error("schema does not declare a [{section}] section")]
    MissingSection { section: String },

    /// A description file or directory could not be read
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for schema loading
pub type SchemaResult<T> = Result<T, SchemaError>;

/// A raw value that does not fit the declared option type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoercionError {
    #[error("option '{option}' expects {expected}, got '{value}'")]
    InvalidValueType {
        option: String,
        expected: OptionType,
        value: String,
    },
}

/// Provider catalog violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The backend is not part of the provider catalog
    #[error("no such provider backend '{backend}'")]
    NoSuchProvider { backend: String },

    /// The backend exists but does not declare this subtype
    #[error("provider backend '{backend}' has no '{subtype}' subtype")]
    NoSuchProviderSubtype { backend: String, subtype: String },

    /// The domain already has a provider for this subtype
    #[error("a '{subtype}' provider ('{backend}') is already attached")]
    ProviderSubtypeInUse { subtype: String, backend: String },
}
