//! Schema model for SSSD configuration.
//!
//! This crate describes which sections and options an SSSD configuration may
//! contain, with their types, defaults and required-ness. It provides:
//!
//! - [`Schema`]: option catalogs for services, the domain template and the
//!   provider backends, loaded from `sssd.api.conf` plus `sssd.api.d/*.conf`
//! - [`coerce`]: reconciliation of raw values against a declared type
//! - [`ProviderSet`] and [`effective_options`]: a domain's option set as a
//!   function of its attached providers
//!
//! # Example
//!
//! ```
//! use sssd_schema::{ProviderSet, Schema, Value, coerce, effective_options};
//!
//! let schema = Schema::bundled().unwrap();
//! let mut providers = ProviderSet::new();
//! providers.attach(&schema, "krb5", "auth").unwrap();
//!
//! let options = effective_options(&schema, &providers);
//! let timeout = &options["krb5_auth_timeout"];
//! assert_eq!(coerce(timeout, &Value::from("30")).unwrap(), Value::Integer(30));
//! ```

pub mod coerce;
pub mod error;
mod loader;
pub mod provider;
pub mod schema;
pub mod types;
pub mod value;

pub use coerce::{coerce, parse_text, render};
pub use error::{CoercionError, ProviderError, SchemaError, SchemaResult};
pub use provider::{AttachedProvider, ProviderSet, effective_options, provider_options};
pub use schema::{DEFAULT_CONFIG_FILE_VERSION, Schema, SchemaPaths};
pub use types::{
    BackendSpec, DomainSpec, OptionMap, OptionSpec, OptionType, ProviderSubtype, ProviderTypeSpec,
    ScalarType, ServiceSpec,
};
pub use value::Value;
