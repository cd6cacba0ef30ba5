//! Building a [`Schema`] from description files.
//!
//! Description files are INI documents read with `sssd-ini`. Section names
//! select the scope an option belongs to:
//!
//! - `[service]`: options every service accepts
//! - `[domain]`: the domain template
//! - `[provider/<backend>]`: options global to a backend
//! - `[provider/<backend>/<subtype>]`: options of one (backend, subtype) pair
//! - any other name: a service
//!
//! Options are declared as `name = type, subtype, required[, default]`.

use crate::coerce::parse_text;
use crate::error::{SchemaError, SchemaResult};
use crate::schema::{DEFAULT_CONFIG_FILE_VERSION, Schema};
use crate::types::{
    BackendSpec, DomainSpec, OptionMap, OptionSpec, OptionType, ProviderSubtype, ProviderTypeSpec,
    ScalarType, ServiceSpec,
};
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

const COMMON_SECTION: &str = "service";
const DOMAIN_SECTION: &str = "domain";
const PROVIDER_PREFIX: &str = "provider/";

/// Where a description section lands in the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope<'a> {
    Common,
    Domain,
    Service(&'a str),
    Backend(&'a str),
    Provider(&'a str, ProviderSubtype),
}

fn classify<'a>(file: &str, section: &'a str) -> SchemaResult<Scope<'a>> {
    let invalid = |message: &str| SchemaError::InvalidDeclaration {
        file: file.to_string(),
        section: section.to_string(),
        option: String::new(),
        message: message.to_string(),
    };

    if section == COMMON_SECTION {
        return Ok(Scope::Common);
    }
    if section == DOMAIN_SECTION {
        return Ok(Scope::Domain);
    }
    let Some(rest) = section.strip_prefix(PROVIDER_PREFIX) else {
        if section.contains('/') {
            return Err(invalid("unknown section kind"));
        }
        return Ok(Scope::Service(section));
    };

    let mut parts = rest.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(backend), None, None) if !backend.is_empty() => Ok(Scope::Backend(backend)),
        (Some(backend), Some(subtype), None) if !backend.is_empty() => {
            ProviderSubtype::from_name(subtype)
                .map(|subtype| Scope::Provider(backend, subtype))
                .ok_or_else(|| invalid(&format!("unknown provider subtype '{subtype}'")))
        }
        _ => Err(invalid("expected provider/<backend> or provider/<backend>/<subtype>")),
    }
}

/// Parse the right-hand side of an option declaration.
fn parse_declaration(file: &str, section: &str, name: &str, text: &str) -> SchemaResult<OptionSpec> {
    let invalid = |message: String| SchemaError::InvalidDeclaration {
        file: file.to_string(),
        section: section.to_string(),
        option: name.to_string(),
        message,
    };

    let mut parts = text.splitn(4, ',').map(str::trim);
    let (Some(type_kw), Some(subtype_kw), Some(required_kw)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid("expected 'type, subtype, required[, default]'".into()));
    };
    let default_text = parts.next().filter(|text| !text.is_empty());

    let option_type = if type_kw == "list" {
        let elem = ScalarType::from_keyword(subtype_kw)
            .ok_or_else(|| invalid(format!("list needs a scalar subtype, got '{subtype_kw}'")))?;
        OptionType::List(elem)
    } else {
        let scalar = ScalarType::from_keyword(type_kw)
            .ok_or_else(|| invalid(format!("unknown type '{type_kw}'")))?;
        if !(subtype_kw.is_empty() || subtype_kw == "None") {
            return Err(invalid(format!("scalar type '{type_kw}' cannot have subtype '{subtype_kw}'")));
        }
        scalar.into()
    };

    let required = if required_kw.eq_ignore_ascii_case("true") {
        true
    } else if required_kw.eq_ignore_ascii_case("false") {
        false
    } else {
        return Err(invalid(format!("required flag must be true or false, got '{required_kw}'")));
    };

    let mut spec = OptionSpec::new(name, option_type).required(required);
    if let Some(text) = default_text {
        let default = parse_text(&spec, text).map_err(|err| invalid(format!("bad default: {err}")))?;
        spec = spec.with_default(default);
    }
    Ok(spec)
}

/// Accumulates description files, then assembles the [`Schema`].
#[derive(Debug, Default)]
pub(crate) struct SchemaBuilder {
    scopes: IndexMap<String, OptionMap>,
}

impl SchemaBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add one description file.
    ///
    /// A section already seen in an earlier file must declare exactly the
    /// same options, otherwise the file is rejected with
    /// [`SchemaError::Conflict`].
    pub(crate) fn add_source(&mut self, file: &str, text: &str) -> SchemaResult<()> {
        let doc = sssd_ini::parse(text).map_err(|source| SchemaError::Parse {
            file: file.to_string(),
            source,
        })?;

        for section in doc.sections() {
            classify(file, section.name())?;

            let mut options = OptionMap::new();
            for opt in section.options() {
                let spec = parse_declaration(file, section.name(), opt.name(), opt.value())?;
                options.insert(opt.name().to_string(), Arc::new(spec));
            }

            match self.scopes.get(section.name()) {
                Some(existing) if *existing == options => {
                    debug!(file, section = %section.name(), "identical redeclaration ignored");
                }
                Some(_) => {
                    return Err(SchemaError::Conflict {
                        file: file.to_string(),
                        section: section.name().to_string(),
                    });
                }
                None => {
                    self.scopes.insert(section.name().to_string(), options);
                }
            }
        }

        debug!(file, sections = doc.section_names().count(), "loaded schema description");
        Ok(())
    }

    pub(crate) fn build(self) -> SchemaResult<Schema> {
        let mut common = OptionMap::new();
        let mut domain = None;
        let mut service_scopes = Vec::new();
        let mut backends: BTreeMap<String, BackendSpec> = BTreeMap::new();

        for (section, options) in &self.scopes {
            // Every section was classified when it was added
            match classify("", section)? {
                Scope::Common => common = options.clone(),
                Scope::Domain => domain = Some(options.clone()),
                Scope::Service(name) => service_scopes.push((name, options)),
                Scope::Backend(backend) => {
                    backends
                        .entry(backend.to_string())
                        .or_insert_with(|| BackendSpec::new(backend))
                        .global = options.clone();
                }
                Scope::Provider(backend, subtype) => {
                    backends
                        .entry(backend.to_string())
                        .or_insert_with(|| BackendSpec::new(backend))
                        .subtypes
                        .insert(
                            subtype,
                            ProviderTypeSpec {
                                backend: backend.to_string(),
                                subtype,
                                options: options.clone(),
                            },
                        );
                }
            }
        }

        let mut domain_options = domain.ok_or_else(|| SchemaError::MissingSection {
            section: DOMAIN_SECTION.to_string(),
        })?;
        for subtype in ProviderSubtype::ALL {
            domain_options
                .entry(subtype.option_name().to_string())
                .or_insert_with(|| Arc::new(OptionSpec::new(subtype.option_name(), OptionType::String)));
        }

        let services: IndexMap<String, ServiceSpec> = service_scopes
            .into_iter()
            .map(|(name, own)| {
                let mut options = own.clone();
                for (opt, spec) in &common {
                    options.entry(opt.clone()).or_insert_with(|| spec.clone());
                }
                (
                    name.to_string(),
                    ServiceSpec {
                        name: name.to_string(),
                        options,
                    },
                )
            })
            .collect();

        let config_file_version = services
            .get("sssd")
            .and_then(|sssd| sssd.options.get("config_file_version"))
            .and_then(|spec| spec.default.as_ref())
            .and_then(|default| default.as_integer())
            .unwrap_or(DEFAULT_CONFIG_FILE_VERSION);

        debug!(
            services = services.len(),
            backends = backends.len(),
            config_file_version,
            "schema assembled"
        );

        Ok(Schema {
            services,
            domain: DomainSpec {
                options: domain_options,
            },
            backends,
            config_file_version,
        })
    }
}
