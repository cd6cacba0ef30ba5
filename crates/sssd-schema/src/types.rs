//! Schema type definitions
//!
//! An [`OptionSpec`] describes one option: its name, declared type, whether
//! it is required and its default. Option specs are grouped into scopes:
//! one [`ServiceSpec`] per known service, a single [`DomainSpec`] template,
//! and one [`BackendSpec`] per provider backend holding its global options
//! and a [`ProviderTypeSpec`] for each subtype it implements.

use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Element type of a scalar option or of a list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    #[serde(rename = "int")]
    Integer,
    #[serde(rename = "str")]
    String,
    #[serde(rename = "bool")]
    Boolean,
}

impl ScalarType {
    /// Keyword used in schema descriptions
    pub fn keyword(self) -> &'static str {
        match self {
            ScalarType::Integer => "int",
            ScalarType::String => "str",
            ScalarType::Boolean => "bool",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "int" => Some(ScalarType::Integer),
            "str" => Some(ScalarType::String),
            "bool" => Some(ScalarType::Boolean),
            _ => None,
        }
    }
}

/// Declared type of an option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    #[serde(rename = "int")]
    Integer,
    #[serde(rename = "str")]
    String,
    #[serde(rename = "bool")]
    Boolean,
    List(ScalarType),
}

impl OptionType {
    pub fn keyword(self) -> &'static str {
        match self {
            OptionType::Integer => "int",
            OptionType::String => "str",
            OptionType::Boolean => "bool",
            OptionType::List(_) => "list",
        }
    }

    /// Element type for lists, `None` for scalars
    pub fn subtype(self) -> Option<ScalarType> {
        match self {
            OptionType::List(elem) => Some(elem),
            _ => None,
        }
    }

    pub fn is_list(self) -> bool {
        matches!(self, OptionType::List(_))
    }
}

impl From<ScalarType> for OptionType {
    fn from(scalar: ScalarType) -> Self {
        match scalar {
            ScalarType::Integer => OptionType::Integer,
            ScalarType::String => OptionType::String,
            ScalarType::Boolean => OptionType::Boolean,
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::List(elem) => write!(f, "list<{}>", elem.keyword()),
            other => f.write_str(other.keyword()),
        }
    }
}

/// Descriptor of a single option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSpec {
    pub name: String,

    #[serde(rename = "type")]
    pub option_type: OptionType,

    #[serde(default)]
    pub required: bool,

    /// Already coerced to `option_type`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl OptionSpec {
    pub fn new(name: impl Into<String>, option_type: OptionType) -> Self {
        Self {
            name: name.into(),
            option_type,
            required: false,
            default: None,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// Options of one scope, in declaration order, shared between the schema
/// and every entity bound to it
pub type OptionMap = IndexMap<String, Arc<OptionSpec>>;

/// A capability a provider backend can fill for a domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderSubtype {
    Id,
    Auth,
    Access,
    Chpass,
}

impl ProviderSubtype {
    pub const ALL: [ProviderSubtype; 4] = [
        ProviderSubtype::Id,
        ProviderSubtype::Auth,
        ProviderSubtype::Access,
        ProviderSubtype::Chpass,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderSubtype::Id => "id",
            ProviderSubtype::Auth => "auth",
            ProviderSubtype::Access => "access",
            ProviderSubtype::Chpass => "chpass",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }

    /// Domain option that names the backend filling this subtype
    pub fn option_name(self) -> &'static str {
        match self {
            ProviderSubtype::Id => "id_provider",
            ProviderSubtype::Auth => "auth_provider",
            ProviderSubtype::Access => "access_provider",
            ProviderSubtype::Chpass => "chpass_provider",
        }
    }

    /// Inverse of [`ProviderSubtype::option_name`]
    pub fn from_option_name(option: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.option_name() == option)
    }
}

impl fmt::Display for ProviderSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options of a known service, its own followed by the common ones
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSpec {
    pub name: String,
    pub options: OptionMap,
}

/// Intrinsic options every domain has
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainSpec {
    pub options: OptionMap,
}

/// Options contributed by one (backend, subtype) pair
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderTypeSpec {
    pub backend: String,
    pub subtype: ProviderSubtype,
    pub options: OptionMap,
}

/// A provider backend: its global options and the subtypes it implements
#[derive(Debug, Clone, PartialEq)]
pub struct BackendSpec {
    pub name: String,
    pub global: OptionMap,
    pub subtypes: BTreeMap<ProviderSubtype, ProviderTypeSpec>,
}

impl BackendSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            global: OptionMap::new(),
            subtypes: BTreeMap::new(),
        }
    }

    pub fn supports(&self, subtype: ProviderSubtype) -> bool {
        self.subtypes.contains_key(&subtype)
    }
}
