//! The loaded schema and its lookups.

use crate::error::{SchemaError, SchemaResult};
use crate::loader::SchemaBuilder;
use crate::types::{BackendSpec, DomainSpec, OptionMap, ProviderSubtype, ProviderTypeSpec, ServiceSpec};
use include_dir::{Dir, include_dir};
use indexmap::IndexMap;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration file version assumed when the schema does not declare one
pub const DEFAULT_CONFIG_FILE_VERSION: i64 = 2;

/// Schema description shipped with this crate.
static BUNDLED_SCHEMA: Dir = include_dir!("$CARGO_MANIFEST_DIR/schema");

const MAIN_FILE: &str = "sssd.api.conf";
const EXTENSION_DIR: &str = "sssd.api.d";
const EXTENSION_SUFFIX: &str = "conf";

/// Locations of the schema description on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaPaths {
    pub main: PathBuf,
    pub extensions: PathBuf,
}

impl SchemaPaths {
    pub fn new(main: impl Into<PathBuf>, extensions: impl Into<PathBuf>) -> Self {
        Self {
            main: main.into(),
            extensions: extensions.into(),
        }
    }
}

impl Default for SchemaPaths {
    /// The locations SSSD installs its schema to
    fn default() -> Self {
        Self::new("/usr/share/sssd/sssd.api.conf", "/usr/share/sssd/sssd.api.d")
    }
}

/// Option catalogs for services, domains and providers.
///
/// Read-only once built. Share it with `Arc<Schema>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub(crate) services: IndexMap<String, ServiceSpec>,
    pub(crate) domain: DomainSpec,
    pub(crate) backends: BTreeMap<String, BackendSpec>,
    pub(crate) config_file_version: i64,
}

impl Schema {
    /// Load the primary description and every `*.conf` file of
    /// `extension_dir`, in lexical order.
    pub fn load(main: impl AsRef<Path>, extension_dir: impl AsRef<Path>) -> SchemaResult<Self> {
        let main = main.as_ref();
        let extension_dir = extension_dir.as_ref();

        let mut builder = SchemaBuilder::new();
        builder.add_source(&main.display().to_string(), &read(main)?)?;

        let entries = std::fs::read_dir(extension_dir).map_err(|source| SchemaError::Io {
            path: extension_dir.to_path_buf(),
            source,
        })?;
        let mut files = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|source| SchemaError::Io {
                    path: extension_dir.to_path_buf(),
                    source,
                })?
                .path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == EXTENSION_SUFFIX) {
                files.push(path);
            }
        }
        files.sort();

        for path in &files {
            builder.add_source(&path.display().to_string(), &read(path)?)?;
        }
        debug!(main = %main.display(), extensions = files.len(), "schema loaded from disk");
        builder.build()
    }

    pub fn load_paths(paths: &SchemaPaths) -> SchemaResult<Self> {
        Self::load(&paths.main, &paths.extensions)
    }

    /// Build a schema from in-memory `(file name, text)` pairs.
    ///
    /// Extensions are applied in the order given.
    pub fn from_sources<'a>(
        main: (&str, &str),
        extensions: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> SchemaResult<Self> {
        let mut builder = SchemaBuilder::new();
        builder.add_source(main.0, main.1)?;
        for (file, text) in extensions {
            builder.add_source(file, text)?;
        }
        builder.build()
    }

    /// The schema compiled into this crate.
    pub fn bundled() -> SchemaResult<Self> {
        let main = BUNDLED_SCHEMA
            .get_file(MAIN_FILE)
            .and_then(|f| f.contents_utf8())
            .ok_or_else(|| SchemaError::Io {
                path: PathBuf::from(MAIN_FILE),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not bundled"),
            })?;

        let mut extensions: Vec<(String, &str)> = BUNDLED_SCHEMA
            .get_dir(EXTENSION_DIR)
            .into_iter()
            .flat_map(|dir| dir.files())
            .filter(|f| f.path().extension().is_some_and(|ext| ext == EXTENSION_SUFFIX))
            .filter_map(|f| Some((f.path().display().to_string(), f.contents_utf8()?)))
            .collect();
        extensions.sort();

        Self::from_sources(
            (MAIN_FILE, main),
            extensions.iter().map(|(file, text)| (file.as_str(), *text)),
        )
    }

    pub fn service_spec(&self, name: &str) -> Option<&ServiceSpec> {
        self.services.get(name)
    }

    /// Known services, in declaration order
    pub fn services(&self) -> impl Iterator<Item = &ServiceSpec> {
        self.services.values()
    }

    pub fn domain_spec(&self) -> &DomainSpec {
        &self.domain
    }

    pub fn backend(&self, backend: &str) -> Option<&BackendSpec> {
        self.backends.get(backend)
    }

    pub fn provider_spec(&self, backend: &str, subtype: ProviderSubtype) -> Option<&ProviderTypeSpec> {
        self.backends.get(backend)?.subtypes.get(&subtype)
    }

    /// Backend-global options; empty for a backend that declares none
    pub fn provider_global_options(&self, backend: &str) -> Option<&OptionMap> {
        self.backends.get(backend).map(|b| &b.global)
    }

    /// Every backend with the subtypes it implements
    pub fn known_providers(&self) -> BTreeMap<String, BTreeSet<ProviderSubtype>> {
        self.backends
            .values()
            .map(|b| (b.name.clone(), b.subtypes.keys().copied().collect()))
            .collect()
    }

    pub fn config_file_version(&self) -> i64 {
        self.config_file_version
    }
}

fn read(path: &Path) -> SchemaResult<String> {
    std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.to_path_buf(),
        source,
    })
}
