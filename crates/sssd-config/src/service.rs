//! Services bound to a schema.

use crate::error::{ConfigError, ConfigResult};
use crate::options::{self, OptionValues};
use sssd_ini::Section;
use sssd_schema::{OptionMap, Schema, Value};
use std::sync::Arc;

/// A service section (`sssd`, `nss`, `pam`, ...) with validated values.
///
/// Every stored value belongs to the service's option spec and is already
/// coerced to its declared type.
#[derive(Debug, Clone)]
pub struct Service {
    name: String,
    schema: Arc<Schema>,
    options: OptionMap,
    values: OptionValues,
}

impl Service {
    /// Create a service holding every option that has a schema default.
    pub fn new(name: &str, schema: Arc<Schema>) -> ConfigResult<Self> {
        let mut service = Self::empty(name, schema)?;
        service.values = options::defaults(&service.options);
        Ok(service)
    }

    fn empty(name: &str, schema: Arc<Schema>) -> ConfigResult<Self> {
        let options = schema
            .service_spec(name)
            .map(|spec| spec.options.clone())
            .ok_or_else(|| ConfigError::ServiceNotRecognized {
                name: name.to_string(),
            })?;
        Ok(Self {
            name: name.to_string(),
            schema,
            options,
            values: OptionValues::new(),
        })
    }

    /// Load a service from its document section.
    pub(crate) fn from_section(schema: Arc<Schema>, section: &Section) -> ConfigResult<Self> {
        let mut service = Self::empty(section.name(), schema)?;
        service.values = options::read_section(section.name(), &service.options, section)?;
        Ok(service)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Every option this service accepts
    pub fn list_options(&self) -> &OptionMap {
        &self.options
    }

    pub fn get_option(&self, name: &str) -> ConfigResult<Value> {
        options::lookup(&self.name, &self.options, &self.values, name)
    }

    /// Set `name` to `value`, or remove it when `value` is `None`.
    pub fn set_option(&mut self, name: &str, value: impl Into<Option<Value>>) -> ConfigResult<()> {
        match value.into() {
            Some(raw) => {
                let value = options::coerce_for(&self.name, &self.options, name, &raw)?;
                self.values.insert(name.to_string(), value);
            }
            None => {
                if !self.options.contains_key(name) {
                    return Err(ConfigError::no_option(&self.name, name));
                }
                self.values.shift_remove(name);
            }
        }
        Ok(())
    }

    /// Remove a value; unset or unknown names are ignored.
    pub fn remove_option(&mut self, name: &str) {
        self.values.shift_remove(name);
    }

    /// Values that are set, defaults excluded
    pub fn get_all_options(&self) -> &OptionValues {
        &self.values
    }

    pub(crate) fn check_required(&self) -> ConfigResult<()> {
        options::check_required(&self.name, &self.options, &self.values)
    }
}
