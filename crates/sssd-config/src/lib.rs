//! Schema-driven editing of SSSD configuration files.
//!
//! [`Config`] owns a configuration document and validates every change
//! against a shared [`Schema`]. Services and domains are edited as
//! [`Service`] and [`Domain`] values and written back with
//! [`Config::save_service`] and [`Config::save_domain`]. Comments, blank
//! lines and untouched options survive a round trip unchanged.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use sssd_config::{Config, Schema, Value};
//!
//! let mut config = Config::new(Arc::new(Schema::bundled().unwrap()));
//! config.new_config().unwrap();
//!
//! let mut local = config.new_domain("LOCAL").unwrap();
//! local.add_provider("local", "id").unwrap();
//! local.set_option("default_shell", Value::from("/bin/zsh")).unwrap();
//! local.set_active(true);
//! config.save_domain(&local).unwrap();
//!
//! assert_eq!(config.list_active_domains().unwrap(), ["LOCAL"]);
//! assert_eq!(config.get("domain/LOCAL", "default_shell").unwrap(), Some("/bin/zsh"));
//! ```

mod config;
mod domain;
mod error;
mod options;
mod service;

pub use config::Config;
pub use domain::{DOMAIN_PREFIX, Domain};
pub use error::{ConfigError, ConfigResult};
pub use options::OptionValues;
pub use service::Service;

pub use sssd_ini::{Document, Entry};
pub use sssd_schema::{OptionMap, OptionSpec, OptionType, ProviderSubtype, Schema, SchemaPaths, Value};
