//! Provider composition.
//!
//! A domain's effective option set is the union of the domain's intrinsic
//! options, the options of every attached (backend, subtype) pair, and the
//! global options of each distinct attached backend. When two scopes declare
//! the same name the first declaration wins, in that order.

use crate::error::ProviderError;
use crate::schema::Schema;
use crate::types::{OptionMap, ProviderSubtype};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A (backend, subtype) pair attached to a domain
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttachedProvider {
    pub backend: String,
    pub subtype: ProviderSubtype,
}

/// Ordered set of attached providers, at most one per subtype.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderSet {
    attached: Vec<AttachedProvider>,
}

impl ProviderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `backend` as the provider for `subtype`.
    ///
    /// Checks, in order: the backend is known, it implements the subtype,
    /// and the subtype is not already filled.
    pub fn attach(&mut self, schema: &Schema, backend: &str, subtype: &str) -> Result<ProviderSubtype, ProviderError> {
        let backend_spec = schema.backend(backend).ok_or_else(|| ProviderError::NoSuchProvider {
            backend: backend.to_string(),
        })?;

        let parsed = ProviderSubtype::from_name(subtype)
            .filter(|parsed| backend_spec.supports(*parsed))
            .ok_or_else(|| ProviderError::NoSuchProviderSubtype {
                backend: backend.to_string(),
                subtype: subtype.to_string(),
            })?;

        if let Some(current) = self.get(parsed) {
            return Err(ProviderError::ProviderSubtypeInUse {
                subtype: parsed.to_string(),
                backend: current.backend.clone(),
            });
        }

        debug!(backend, subtype = %parsed, "attaching provider");
        self.attached.push(AttachedProvider {
            backend: backend.to_string(),
            subtype: parsed,
        });
        Ok(parsed)
    }

    /// Detach the provider occupying `subtype`.
    ///
    /// Anything that does not name an occupied subtype is a no-op, which
    /// includes backend names.
    pub fn detach(&mut self, subtype: &str) -> Option<AttachedProvider> {
        let parsed = ProviderSubtype::from_name(subtype)?;
        let idx = self.attached.iter().position(|p| p.subtype == parsed)?;
        let removed = self.attached.remove(idx);
        debug!(backend = %removed.backend, subtype = %parsed, "detached provider");
        Some(removed)
    }

    pub fn get(&self, subtype: ProviderSubtype) -> Option<&AttachedProvider> {
        self.attached.iter().find(|p| p.subtype == subtype)
    }

    pub fn backend_for(&self, subtype: ProviderSubtype) -> Option<&str> {
        self.get(subtype).map(|p| p.backend.as_str())
    }

    /// Attached pairs in attachment order
    pub fn iter(&self) -> impl Iterator<Item = &AttachedProvider> {
        self.attached.iter()
    }

    /// Distinct attached backends, first attachment first
    pub fn backends(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for p in &self.attached {
            if !seen.contains(&p.backend.as_str()) {
                seen.push(&p.backend);
            }
        }
        seen
    }

    pub fn len(&self) -> usize {
        self.attached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }
}

/// Effective option set of a domain with the given providers attached.
pub fn effective_options(schema: &Schema, providers: &ProviderSet) -> OptionMap {
    let mut options = schema.domain_spec().options.clone();
    for attached in providers.iter() {
        if let Some(pair) = schema.provider_spec(&attached.backend, attached.subtype) {
            merge_into(&mut options, &pair.options);
        }
    }
    for backend in providers.backends() {
        if let Some(global) = schema.provider_global_options(backend) {
            merge_into(&mut options, global);
        }
    }
    options
}

/// Options a provider contributes.
///
/// The backend-global options come first, followed by that pair's options
/// when a subtype is given, or by every subtype's options when it is not.
pub fn provider_options(schema: &Schema, backend: &str, subtype: Option<&str>) -> Result<OptionMap, ProviderError> {
    let backend_spec = schema.backend(backend).ok_or_else(|| ProviderError::NoSuchProvider {
        backend: backend.to_string(),
    })?;

    let mut options = backend_spec.global.clone();
    match subtype {
        Some(name) => {
            let pair = ProviderSubtype::from_name(name)
                .and_then(|parsed| backend_spec.subtypes.get(&parsed))
                .ok_or_else(|| ProviderError::NoSuchProviderSubtype {
                    backend: backend.to_string(),
                    subtype: name.to_string(),
                })?;
            merge_into(&mut options, &pair.options);
        }
        None => {
            for pair in backend_spec.subtypes.values() {
                merge_into(&mut options, &pair.options);
            }
        }
    }
    Ok(options)
}

fn merge_into(target: &mut OptionMap, source: &OptionMap) {
    for (name, spec) in source {
        target.entry(name.clone()).or_insert_with(|| spec.clone());
    }
}
