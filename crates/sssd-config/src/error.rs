use sssd_ini::ValueError;
use sssd_schema::{CoercionError, ProviderError, SchemaError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by the configuration API.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The schema or a configuration document is malformed or does not
    /// match the schema.
    #[error("parsing error: {message}")]
    Parsing { message: String },

    #[error("configuration has not been created or imported")]
    NotInitialized,

    #[error("configuration has already been created or imported")]
    AlreadyInitialized,

    #[error("no such service: {name}")]
    NoService { name: String },

    #[error("no such domain: {name}")]
    NoDomain { name: String },

    /// The schema does not describe a service of this name
    #[error("service not recognized: {name}")]
    ServiceNotRecognized { name: String },

    #[error("service already exists: {name}")]
    ServiceAlreadyExists { name: String },

    #[error("domain already exists: {name}")]
    DomainAlreadyExists { name: String },

    /// The name cannot appear both in a `[domain/<name>]` header and as an
    /// entry of the `domains` list
    #[error("invalid domain name '{name}'")]
    InvalidDomainName { name: String },

    #[error("[{section}] has no option '{option}'")]
    NoOption { section: String, option: String },

    #[error(transparent)]
    InvalidValueType(#[from] CoercionError),

    #[error("no such provider backend '{backend}'")]
    NoSuchProvider { backend: String },

    #[error("provider backend '{backend}' has no '{subtype}' subtype")]
    NoSuchProviderSubtype { backend: String, subtype: String },

    #[error("a '{subtype}' provider ('{backend}') is already attached")]
    ProviderSubtypeInUse { subtype: String, backend: String },

    /// The entity was created against a different schema instance
    #[error("'{name}' is bound to a different schema")]
    SchemaMismatch { name: String },

    #[error("[{section}] requires option '{option}'")]
    MissingRequiredOption { section: String, option: String },

    /// The value would not read back unchanged from the document
    #[error("[{section}] option '{option}' cannot be written: {source}")]
    UnwritableValue {
        section: String,
        option: String,
        #[source]
        source: ValueError,
    },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    pub(crate) fn parsing(message: impl Into<String>) -> Self {
        ConfigError::Parsing {
            message: message.into(),
        }
    }

    pub(crate) fn no_option(section: &str, option: &str) -> Self {
        ConfigError::NoOption {
            section: section.to_string(),
            option: option.to_string(),
        }
    }
}

impl From<ProviderError> for ConfigError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NoSuchProvider { backend } => ConfigError::NoSuchProvider { backend },
            ProviderError::NoSuchProviderSubtype { backend, subtype } => {
                ConfigError::NoSuchProviderSubtype { backend, subtype }
            }
            ProviderError::ProviderSubtypeInUse { subtype, backend } => {
                ConfigError::ProviderSubtypeInUse { subtype, backend }
            }
        }
    }
}

/// Missing files stay I/O errors; everything else about a bad schema is a
/// parsing error.
impl From<SchemaError> for ConfigError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::Io { path, source } => ConfigError::Io { path, source },
            other => ConfigError::parsing(other.to_string()),
        }
    }
}
