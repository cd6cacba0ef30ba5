//! The configuration façade and its lifecycle.

use crate::domain::{DOMAIN_PREFIX, Domain, check_domain_name, parse_domain_list};
use crate::error::{ConfigError, ConfigResult};
use crate::options::write_section;
use crate::service::Service;
use sssd_ini::{Document, Entry};
use sssd_schema::{Schema, SchemaPaths};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, trace};

/// Services every new configuration starts with
const INITIAL_SERVICES: [&str; 3] = ["sssd", "nss", "pam"];

const MONITOR: &str = "sssd";
const DOMAINS_OPTION: &str = "domains";
const VERSION_OPTION: &str = "config_file_version";

#[derive(Debug, Clone)]
enum State {
    Uninitialized,
    Populated(Document),
}

/// An SSSD configuration validated against a [`Schema`].
///
/// A `Config` starts out empty and must be populated exactly once, with
/// [`Config::new_config`] or [`Config::import_config`]. Every other operation
/// fails with [`ConfigError::NotInitialized`] until then.
///
/// Services and domains are handed out as detached copies; changes become
/// part of the document when they are passed back to
/// [`Config::save_service`] or [`Config::save_domain`].
#[derive(Debug, Clone)]
pub struct Config {
    schema: Arc<Schema>,
    state: State,
}

impl Config {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            state: State::Uninitialized,
        }
    }

    /// Load the schema from disk and wrap it in an empty configuration.
    pub fn from_paths(main: impl AsRef<Path>, extension_dir: impl AsRef<Path>) -> ConfigResult<Self> {
        Ok(Self::new(Arc::new(Schema::load(main, extension_dir)?)))
    }

    /// Load the schema from its installed location.
    pub fn system() -> ConfigResult<Self> {
        Ok(Self::new(Arc::new(Schema::load_paths(&SchemaPaths::default())?)))
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.state, State::Populated(_))
    }

    pub fn document(&self) -> ConfigResult<&Document> {
        match &self.state {
            State::Populated(doc) => Ok(doc),
            State::Uninitialized => Err(ConfigError::NotInitialized),
        }
    }

    fn document_mut(&mut self) -> ConfigResult<&mut Document> {
        match &mut self.state {
            State::Populated(doc) => Ok(doc),
            State::Uninitialized => Err(ConfigError::NotInitialized),
        }
    }

    fn ensure_uninitialized(&self) -> ConfigResult<()> {
        match self.state {
            State::Uninitialized => Ok(()),
            State::Populated(_) => Err(ConfigError::AlreadyInitialized),
        }
    }

    // Lifecycle

    /// Start a configuration holding the `sssd`, `nss` and `pam` services
    /// with their schema defaults.
    pub fn new_config(&mut self) -> ConfigResult<()> {
        self.ensure_uninitialized()?;
        let mut doc = Document::new();
        for name in INITIAL_SERVICES {
            let service = Service::new(name, self.schema.clone())?;
            write_section(&mut doc, name, service.list_options(), service.get_all_options())?;
        }
        debug!("created new configuration");
        self.state = State::Populated(doc);
        Ok(())
    }

    /// Read and validate a configuration file.
    pub fn import_config(&mut self, path: impl AsRef<Path>) -> ConfigResult<()> {
        self.ensure_uninitialized()?;
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.import_config_str(&text)?;
        debug!(path = %path.display(), "imported configuration");
        Ok(())
    }

    /// Validate configuration text and adopt it as the document.
    pub fn import_config_str(&mut self, text: &str) -> ConfigResult<()> {
        self.ensure_uninitialized()?;
        let doc = sssd_ini::parse(text).map_err(|err| ConfigError::parsing(err.to_string()))?;
        self.validate(&doc)?;
        self.state = State::Populated(doc);
        Ok(())
    }

    fn validate(&self, doc: &Document) -> ConfigResult<()> {
        for section in doc.sections() {
            let name = section.name();
            trace!(section = %name, "validating section");
            let in_section = |err: ConfigError| {
                if matches!(err, ConfigError::Parsing { .. }) {
                    err
                } else {
                    ConfigError::parsing(format!("[{name}] {err}"))
                }
            };

            if let Some(domain_name) = name.strip_prefix(DOMAIN_PREFIX) {
                check_domain_name(domain_name).map_err(in_section)?;
                Domain::from_section(domain_name, self.schema.clone(), section)
                    .and_then(|domain| domain.check_required())
                    .map_err(in_section)?;
            } else if self.schema.service_spec(name).is_some() {
                Service::from_section(self.schema.clone(), section)
                    .and_then(|service| service.check_required())
                    .map_err(in_section)?;
            } else {
                return Err(ConfigError::parsing(format!("unknown section [{name}]")));
            }
        }

        let monitor = doc
            .section(MONITOR)
            .ok_or_else(|| ConfigError::parsing(format!("missing [{MONITOR}] section")))?;
        let version = monitor
            .get(VERSION_OPTION)
            .ok_or_else(|| ConfigError::parsing(format!("[{MONITOR}] has no {VERSION_OPTION}")))?;
        let expected = self.schema.config_file_version();
        if version.parse::<i64>().ok() != Some(expected) {
            return Err(ConfigError::parsing(format!(
                "{VERSION_OPTION} {version} is not supported, expected {expected}"
            )));
        }
        Ok(())
    }

    // Document access

    pub fn has_section(&self, name: &str) -> ConfigResult<bool> {
        Ok(self.document()?.has_section(name))
    }

    pub fn has_option(&self, section: &str, option: &str) -> ConfigResult<bool> {
        Ok(self.document()?.has_option(section, option))
    }

    /// Section names in document order
    pub fn sections(&self) -> ConfigResult<Vec<String>> {
        Ok(self.document()?.section_names().map(str::to_string).collect())
    }

    /// Entries of a section, comments and blank lines included; empty for
    /// an absent section
    pub fn options(&self, section: &str) -> ConfigResult<&[Entry]> {
        Ok(self.document()?.options(section).unwrap_or_default())
    }

    /// Raw text of an option
    pub fn get(&self, section: &str, option: &str) -> ConfigResult<Option<&str>> {
        Ok(self.document()?.get(section, option))
    }

    pub fn serialize(&self) -> ConfigResult<String> {
        Ok(sssd_ini::serialize(self.document()?))
    }

    /// Write the document to `path`, replacing any existing file.
    pub fn write(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        let text = self.serialize()?;
        std::fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "wrote configuration");
        Ok(())
    }

    // Services

    /// Services present in the document
    pub fn list_services(&self) -> ConfigResult<Vec<String>> {
        Ok(self
            .document()?
            .section_names()
            .filter(|name| self.schema.service_spec(name).is_some())
            .map(str::to_string)
            .collect())
    }

    pub fn get_service(&self, name: &str) -> ConfigResult<Service> {
        let doc = self.document()?;
        match doc.section(name) {
            Some(section) if self.schema.service_spec(name).is_some() => {
                Service::from_section(self.schema.clone(), section)
            }
            _ => Err(ConfigError::NoService {
                name: name.to_string(),
            }),
        }
    }

    /// Create a service with schema defaults. It becomes part of the
    /// document once saved.
    pub fn new_service(&self, name: &str) -> ConfigResult<Service> {
        let doc = self.document()?;
        if self.schema.service_spec(name).is_none() {
            return Err(ConfigError::ServiceNotRecognized {
                name: name.to_string(),
            });
        }
        if doc.has_section(name) {
            return Err(ConfigError::ServiceAlreadyExists {
                name: name.to_string(),
            });
        }
        Service::new(name, self.schema.clone())
    }

    /// Remove a service section; absent services are ignored.
    pub fn delete_service(&mut self, name: &str) -> ConfigResult<()> {
        let known = self.schema.service_spec(name).is_some();
        let doc = self.document_mut()?;
        if known && doc.remove_section(name).is_some() {
            debug!(service = %name, "deleted service");
        }
        Ok(())
    }

    pub fn save_service(&mut self, service: &Service) -> ConfigResult<()> {
        self.document()?;
        self.ensure_same_schema(service.schema(), service.name())?;
        service.check_required()?;

        let doc = self.document_mut()?;
        write_section(doc, service.name(), service.list_options(), service.get_all_options())?;
        debug!(service = %service.name(), "saved service");
        Ok(())
    }

    // Domains

    /// Domains present in the document, in document order
    pub fn list_domains(&self) -> ConfigResult<Vec<String>> {
        Ok(self
            .document()?
            .section_names()
            .filter_map(|name| name.strip_prefix(DOMAIN_PREFIX))
            .map(str::to_string)
            .collect())
    }

    /// Domains listed in `sssd.domains`
    pub fn list_active_domains(&self) -> ConfigResult<Vec<String>> {
        let active = self.active_domain_names()?;
        Ok(self
            .list_domains()?
            .into_iter()
            .filter(|name| active.contains(name))
            .collect())
    }

    /// Domains not listed in `sssd.domains`
    pub fn list_inactive_domains(&self) -> ConfigResult<Vec<String>> {
        let active = self.active_domain_names()?;
        Ok(self
            .list_domains()?
            .into_iter()
            .filter(|name| !active.contains(name))
            .collect())
    }

    fn active_domain_names(&self) -> ConfigResult<Vec<String>> {
        Ok(self
            .document()?
            .get(MONITOR, DOMAINS_OPTION)
            .map(|text| parse_domain_list(&self.schema, text))
            .unwrap_or_default())
    }

    pub fn get_domain(&self, name: &str) -> ConfigResult<Domain> {
        let section_name = format!("{DOMAIN_PREFIX}{name}");
        let section = self
            .document()?
            .section(&section_name)
            .ok_or_else(|| ConfigError::NoDomain {
                name: name.to_string(),
            })?;
        let active = self.active_domain_names()?.iter().any(|d| d == name);
        Ok(Domain::from_section(name, self.schema.clone(), section)?.with_active(active))
    }

    /// Create an inactive domain. It becomes part of the document once
    /// saved.
    pub fn new_domain(&self, name: &str) -> ConfigResult<Domain> {
        check_domain_name(name)?;
        if self.document()?.has_section(&format!("{DOMAIN_PREFIX}{name}")) {
            return Err(ConfigError::DomainAlreadyExists {
                name: name.to_string(),
            });
        }
        Ok(Domain::new(name, self.schema.clone()))
    }

    /// Remove a domain section and its `sssd.domains` entry; absent
    /// domains are ignored.
    pub fn delete_domain(&mut self, name: &str) -> ConfigResult<()> {
        let doc = self.document_mut()?;
        if doc.remove_section(&format!("{DOMAIN_PREFIX}{name}")).is_some() {
            debug!(domain = %name, "deleted domain");
        }
        self.set_domain_membership(name, false)
    }

    /// Write a domain's options and reconcile its `sssd.domains` entry
    /// with its active flag.
    pub fn save_domain(&mut self, domain: &Domain) -> ConfigResult<()> {
        self.document()?;
        check_domain_name(domain.name())?;
        self.ensure_same_schema(domain.schema(), domain.name())?;
        domain.check_required()?;

        let section = domain.section_name();
        let doc = self.document_mut()?;
        write_section(doc, &section, domain.list_options(), domain.get_all_options())?;
        self.set_domain_membership(domain.name(), domain.is_active())?;
        debug!(domain = %domain.name(), active = domain.is_active(), "saved domain");
        Ok(())
    }

    fn set_domain_membership(&mut self, name: &str, active: bool) -> ConfigResult<()> {
        let mut domains = self.active_domain_names()?;
        let listed = domains.iter().any(|d| d == name);
        if active == listed {
            return Ok(());
        }
        if active {
            domains.push(name.to_string());
        } else {
            domains.retain(|d| d != name);
        }

        let doc = self.document_mut()?;
        if domains.is_empty() {
            doc.remove_option(MONITOR, DOMAINS_OPTION);
        } else {
            doc.set(MONITOR, DOMAINS_OPTION, domains.join(", "))
                .map_err(|source| ConfigError::UnwritableValue {
                    section: MONITOR.to_string(),
                    option: DOMAINS_OPTION.to_string(),
                    source,
                })?;
        }
        Ok(())
    }

    fn ensure_same_schema(&self, schema: &Arc<Schema>, name: &str) -> ConfigResult<()> {
        if Arc::ptr_eq(&self.schema, schema) {
            Ok(())
        } else {
            Err(ConfigError::SchemaMismatch {
                name: name.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::new(Arc::new(Schema::bundled().unwrap()))
    }

    #[test]
    fn test_uninitialized_guard() {
        let mut config = config();
        assert!(!config.is_initialized());
        assert!(matches!(config.list_services(), Err(ConfigError::NotInitialized)));
        assert!(matches!(config.get_service("sssd"), Err(ConfigError::NotInitialized)));
        assert!(matches!(config.new_service("sssd"), Err(ConfigError::NotInitialized)));
        assert!(matches!(config.delete_service("sssd"), Err(ConfigError::NotInitialized)));
        assert!(matches!(config.list_domains(), Err(ConfigError::NotInitialized)));
        assert!(matches!(config.list_active_domains(), Err(ConfigError::NotInitialized)));
        assert!(matches!(config.list_inactive_domains(), Err(ConfigError::NotInitialized)));
        assert!(matches!(config.get_domain("IPA"), Err(ConfigError::NotInitialized)));
        assert!(matches!(config.new_domain("x"), Err(ConfigError::NotInitialized)));
        assert!(matches!(config.delete_domain("IPA"), Err(ConfigError::NotInitialized)));
        assert!(matches!(config.has_section("sssd"), Err(ConfigError::NotInitialized)));
        assert!(matches!(config.serialize(), Err(ConfigError::NotInitialized)));

        let service = Service::new("sssd", config.schema().clone()).unwrap();
        assert!(matches!(config.save_service(&service), Err(ConfigError::NotInitialized)));
        let domain = Domain::new("IPA", config.schema().clone());
        assert!(matches!(config.save_domain(&domain), Err(ConfigError::NotInitialized)));
    }

    #[test]
    fn test_second_transition_fails() {
        let mut config = config();
        config.new_config().unwrap();
        assert!(matches!(config.new_config(), Err(ConfigError::AlreadyInitialized)));
        assert!(matches!(
            config.import_config_str("[sssd]\nconfig_file_version = 2\n"),
            Err(ConfigError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_new_config_contents() {
        let mut config = config();
        config.new_config().unwrap();
        assert_eq!(config.sections().unwrap(), ["sssd", "nss", "pam"]);
        insta::assert_snapshot!(config.serialize().unwrap(), @r"
        [sssd]
        config_file_version = 2
        services = nss, pam
        debug_level = 0
        reconnection_retries = 3

        [nss]
        debug_level = 0
        reconnection_retries = 3

        [pam]
        debug_level = 0
        reconnection_retries = 3
        ");
    }

    #[test]
    fn test_schema_mismatch() {
        let mut config = config();
        config.new_config().unwrap();
        let other = Arc::new(Schema::bundled().unwrap());
        let service = Service::new("nss", other.clone()).unwrap();
        assert!(matches!(
            config.save_service(&service),
            Err(ConfigError::SchemaMismatch { .. })
        ));
        let domain = Domain::new("LOCAL", other);
        assert!(matches!(
            config.save_domain(&domain),
            Err(ConfigError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_options_of_absent_section_is_empty() {
        let mut config = config();
        config.new_config().unwrap();
        assert!(config.options("dp").unwrap().is_empty());
        assert_eq!(config.get("nss", "debug_level").unwrap(), Some("0"));
        assert_eq!(config.get("nss", "bogus").unwrap(), None);
    }
}
