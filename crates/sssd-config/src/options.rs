//! Option-bag rules shared by services and domains.

use crate::error::{ConfigError, ConfigResult};
use indexmap::IndexMap;
use sssd_ini::{Document, Section};
use sssd_schema::{OptionMap, Value, coerce, parse_text, render};

/// Option name → canonical value
pub type OptionValues = IndexMap<String, Value>;

/// Every option of `specs` that declares a default.
pub(crate) fn defaults(specs: &OptionMap) -> OptionValues {
    specs
        .iter()
        .filter_map(|(name, spec)| Some((name.clone(), spec.default.clone()?)))
        .collect()
}

/// A set value, else the declared default.
pub(crate) fn lookup(section: &str, specs: &OptionMap, values: &OptionValues, name: &str) -> ConfigResult<Value> {
    let spec = specs.get(name).ok_or_else(|| ConfigError::no_option(section, name))?;
    values
        .get(name)
        .or(spec.default.as_ref())
        .cloned()
        .ok_or_else(|| ConfigError::no_option(section, name))
}

/// Validate and coerce a value for `name`; unknown names fail before
/// coercion is attempted.
pub(crate) fn coerce_for(section: &str, specs: &OptionMap, name: &str, value: &Value) -> ConfigResult<Value> {
    let spec = specs.get(name).ok_or_else(|| ConfigError::no_option(section, name))?;
    Ok(coerce(spec, value)?)
}

/// Read a section's options into canonical values.
pub(crate) fn read_section(section_name: &str, specs: &OptionMap, section: &Section) -> ConfigResult<OptionValues> {
    let mut values = OptionValues::new();
    for opt in section.options() {
        let spec = specs
            .get(opt.name())
            .ok_or_else(|| ConfigError::no_option(section_name, opt.name()))?;
        values.insert(opt.name().to_string(), parse_text(spec, opt.value())?);
    }
    Ok(values)
}

pub(crate) fn check_required(section: &str, specs: &OptionMap, values: &OptionValues) -> ConfigResult<()> {
    match specs
        .values()
        .find(|spec| spec.required && spec.default.is_none() && !values.contains_key(&spec.name))
    {
        Some(spec) => Err(ConfigError::MissingRequiredOption {
            section: section.to_string(),
            option: spec.name.clone(),
        }),
        None => Ok(()),
    }
}

/// Write `values` into `section`, creating it if needed.
///
/// Lines whose text already coerces to the stored value are left alone, so
/// unchanged options keep their formatting and comments. Options of the
/// section that have no value are removed.
pub(crate) fn write_section(
    doc: &mut Document,
    section: &str,
    specs: &OptionMap,
    values: &OptionValues,
) -> ConfigResult<()> {
    if !doc.has_section(section) {
        doc.add_section(section);
    }

    let stale: Vec<String> = doc
        .section(section)
        .map(|s| {
            s.option_names()
                .filter(|name| !values.contains_key(*name))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    for name in &stale {
        doc.remove_option(section, name);
    }

    for (name, value) in values {
        let unchanged = match (doc.get(section, name), specs.get(name)) {
            (Some(text), Some(spec)) => parse_text(spec, text).as_ref() == Ok(value),
            _ => false,
        };
        if !unchanged {
            doc.set(section, name, render(value))
                .map_err(|source| ConfigError::UnwritableValue {
                    section: section.to_string(),
                    option: name.clone(),
                    source,
                })?;
        }
    }
    Ok(())
}
