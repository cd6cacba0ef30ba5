//! Domains bound to a schema.
//!
//! A domain's legal options depend on the providers attached to it, so the
//! effective option set is recomputed whenever a provider is added or
//! removed, and values that fall out of it are dropped.

use crate::error::{ConfigError, ConfigResult};
use crate::options::{self, OptionValues};
use sssd_ini::Section;
use sssd_schema::{
    OptionMap, ProviderSet, ProviderSubtype, Schema, Value, coerce, effective_options, parse_text,
    provider_options,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

/// Document section prefix of domains
pub const DOMAIN_PREFIX: &str = "domain/";

/// An authentication domain with its attached providers.
#[derive(Debug, Clone)]
pub struct Domain {
    name: String,
    schema: Arc<Schema>,
    active: bool,
    providers: ProviderSet,
    options: OptionMap,
    values: OptionValues,
}

impl Domain {
    /// Create an inactive domain with no providers. Options of the domain
    /// template that have a default start out set to it.
    pub fn new(name: &str, schema: Arc<Schema>) -> Self {
        let mut domain = Self::empty(name, schema);
        domain.values = options::defaults(&domain.schema.domain_spec().options);
        domain
    }

    fn empty(name: &str, schema: Arc<Schema>) -> Self {
        let providers = ProviderSet::new();
        let options = effective_options(&schema, &providers);
        Self {
            name: name.to_string(),
            schema,
            active: false,
            providers,
            options,
            values: OptionValues::new(),
        }
    }

    /// Load a domain from its document section.
    ///
    /// Providers come from the `<subtype>_provider` options; every other
    /// option must belong to the resulting effective set.
    pub(crate) fn from_section(name: &str, schema: Arc<Schema>, section: &Section) -> ConfigResult<Self> {
        let mut domain = Self::empty(name, schema);
        for subtype in ProviderSubtype::ALL {
            if let Some(backend) = section.get(subtype.option_name()) {
                domain.providers.attach(&domain.schema, backend, subtype.as_str())?;
            }
        }
        domain.options = effective_options(&domain.schema, &domain.providers);
        domain.values = options::read_section(&domain.section_name(), &domain.options, section)?;
        Ok(domain)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Name of the document section holding this domain
    pub fn section_name(&self) -> String {
        format!("{DOMAIN_PREFIX}{}", self.name)
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub(crate) fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The effective option set for the attached providers
    pub fn list_options(&self) -> &OptionMap {
        &self.options
    }

    pub fn get_option(&self, name: &str) -> ConfigResult<Value> {
        options::lookup(&self.section_name(), &self.options, &self.values, name)
    }

    /// Set `name` to `value`, or remove it when `value` is `None`.
    ///
    /// Setting `<subtype>_provider` replaces the provider for that subtype;
    /// clearing it detaches the provider.
    pub fn set_option(&mut self, name: &str, value: impl Into<Option<Value>>) -> ConfigResult<()> {
        let section = self.section_name();
        let spec = self
            .options
            .get(name)
            .ok_or_else(|| ConfigError::no_option(&section, name))?;

        let value = match value.into() {
            Some(raw) => Some(coerce(spec, &raw)?),
            None => None,
        };

        if let Some(subtype) = ProviderSubtype::from_option_name(name) {
            return match value {
                Some(backend) => self.replace_provider(subtype, &backend.to_string()),
                None => {
                    self.remove_provider(subtype.as_str());
                    Ok(())
                }
            };
        }

        match value {
            Some(value) => {
                self.values.insert(name.to_string(), value);
            }
            None => {
                self.values.shift_remove(name);
            }
        }
        Ok(())
    }

    /// Remove a value; unset or unknown names are ignored.
    pub fn remove_option(&mut self, name: &str) {
        if let Some(subtype) = ProviderSubtype::from_option_name(name) {
            self.remove_provider(subtype.as_str());
        } else {
            self.values.shift_remove(name);
        }
    }

    /// Values that are set, defaults excluded
    pub fn get_all_options(&self) -> &OptionValues {
        &self.values
    }

    /// Attach `backend` as the provider for `subtype`.
    pub fn add_provider(&mut self, backend: &str, subtype: &str) -> ConfigResult<()> {
        let attached = self.providers.attach(&self.schema, backend, subtype)?;
        self.values
            .insert(attached.option_name().to_string(), Value::from(backend));
        self.refresh();
        Ok(())
    }

    /// Detach the provider for `subtype`, dropping values of options that
    /// are no longer legal. Anything else is a no-op.
    pub fn remove_provider(&mut self, subtype: &str) {
        if let Some(removed) = self.providers.detach(subtype) {
            self.values.shift_remove(removed.subtype.option_name());
            self.refresh();
        }
    }

    fn replace_provider(&mut self, subtype: ProviderSubtype, backend: &str) -> ConfigResult<()> {
        if self.providers.backend_for(subtype) == Some(backend) {
            return Ok(());
        }
        let mut providers = self.providers.clone();
        providers.detach(subtype.as_str());
        providers.attach(&self.schema, backend, subtype.as_str())?;

        debug!(domain = %self.name, backend, %subtype, "replaced provider");
        self.providers = providers;
        self.values
            .insert(subtype.option_name().to_string(), Value::from(backend));
        self.refresh();
        Ok(())
    }

    fn refresh(&mut self) {
        self.options = effective_options(&self.schema, &self.providers);
        let options = &self.options;
        self.values.retain(|name, _| options.contains_key(name));
    }

    /// Every backend in the schema with the subtypes it implements
    pub fn list_providers(&self) -> BTreeMap<String, BTreeSet<ProviderSubtype>> {
        self.schema.known_providers()
    }

    /// Options a backend contributes, for one subtype or for all of them
    pub fn list_provider_options(&self, backend: &str, subtype: Option<&str>) -> ConfigResult<OptionMap> {
        Ok(provider_options(&self.schema, backend, subtype)?)
    }

    pub fn providers(&self) -> &ProviderSet {
        &self.providers
    }

    pub(crate) fn check_required(&self) -> ConfigResult<()> {
        options::check_required(&self.section_name(), &self.options, &self.values)
    }
}

/// Parse the `sssd.domains` list as written in a document.
/// Reject names that would end a `[domain/<name>]` header early or split
/// into several entries of the `domains` list.
pub(crate) fn check_domain_name(name: &str) -> ConfigResult<()> {
    let valid = !name.is_empty()
        && name.trim() == name
        && !name.contains([']', ','])
        && sssd_ini::check_value(name).is_ok();
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidDomainName {
            name: name.to_string(),
        })
    }
}

pub(crate) fn parse_domain_list(schema: &Schema, text: &str) -> Vec<String> {
    let parsed = schema
        .service_spec("sssd")
        .and_then(|sssd| sssd.options.get("domains"))
        .and_then(|spec| parse_text(spec, text).ok());
    match parsed {
        Some(Value::List(items)) => items.iter().map(ToString::to_string).collect(),
        _ => text
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect(),
    }
}
