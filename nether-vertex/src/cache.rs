//! Named vertex format cache
//!
//! [`FormatCache`] maps format names to shared [`VertexFormat`]s. Formats not
//! yet cached are loaded on demand from a [`DefinitionSource`], which resolves
//! a resource path derived from the [`CacheConfig`].
//!
//! The cache is an ordinary value: the host creates one and hands it (usually
//! behind an `Arc`) to whatever needs formats.

use crate::definition::FormatDefinition;
use crate::format::VertexFormat;
use crate::vertices::VertexLayout;
use anyhow::{Context, Result};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

// ============================================================================
// Configuration
// ============================================================================

/// Where format definitions live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory of definition files, relative to the source root
    /// (default: "system/data/vertex_formats")
    #[serde(default = "default_formats_dir")]
    pub formats_dir: String,
    /// Definition file extension (default: "xml")
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_formats_dir() -> String {
    "system/data/vertex_formats".to_string()
}

fn default_extension() -> String {
    "xml".to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            formats_dir: default_formats_dir(),
            extension: default_extension(),
        }
    }
}

impl CacheConfig {
    /// Parses a config from TOML. Missing fields take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Resource path of the definition for format `name`.
    pub fn resource_path(&self, name: &str) -> String {
        format!("{}/{}.{}", self.formats_dir, name, self.extension)
    }
}

// ============================================================================
// Definition sources
// ============================================================================

/// Resolves definition resources.
pub trait DefinitionSource: Send + Sync {
    /// Loads the definition at `resource`.
    ///
    /// Returns `Ok(None)` if there is no such resource, and an error if it
    /// exists but cannot be read or parsed.
    fn load(&self, resource: &str) -> Result<Option<FormatDefinition>>;
}

/// Reads definition files below a root directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

impl DefinitionSource for DirectorySource {
    fn load(&self, resource: &str) -> Result<Option<FormatDefinition>> {
        let path = self.root.join(resource);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("Failed to read format definition: {}", path.display())
                });
            }
        };

        let definition = FormatDefinition::from_xml(&text)
            .with_context(|| format!("Failed to parse format definition: {}", path.display()))?;
        Ok(Some(definition))
    }
}

/// Definitions held in memory, keyed by resource path.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    definitions: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers definition text under `resource`, replacing any previous one.
    pub fn insert(&mut self, resource: impl Into<String>, text: impl Into<String>) {
        self.definitions.insert(resource.into(), text.into());
    }
}

impl DefinitionSource for MemorySource {
    fn load(&self, resource: &str) -> Result<Option<FormatDefinition>> {
        self.definitions
            .get(resource)
            .map(|text| {
                FormatDefinition::from_xml(text)
                    .with_context(|| format!("Failed to parse format definition: {resource}"))
            })
            .transpose()
    }
}

// ============================================================================
// Cache
// ============================================================================

/// Thread-safe name → format cache with load-on-miss.
pub struct FormatCache {
    config: CacheConfig,
    source: Box<dyn DefinitionSource>,
    formats: Mutex<HashMap<String, Arc<VertexFormat>>>,
}

impl std::fmt::Debug for FormatCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatCache")
            .field("config", &self.config)
            .field("formats", &self.lock().len())
            .finish_non_exhaustive()
    }
}

impl FormatCache {
    pub fn new(config: CacheConfig, source: impl DefinitionSource + 'static) -> Self {
        Self {
            config,
            source: Box::new(source),
            formats: Mutex::new(HashMap::new()),
        }
    }

    /// Cache reading definitions from files below `root`.
    pub fn from_directory(config: CacheConfig, root: impl Into<PathBuf>) -> Self {
        Self::new(config, DirectorySource::new(root))
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Number of cached formats.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<VertexFormat>>> {
        // The map is only ever mutated by single inserts, so it stays usable
        // even if a holder panicked.
        self.formats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Looks `name` up without loading anything.
    pub fn find(&self, name: &str) -> Option<Arc<VertexFormat>> {
        self.lock().get(name).cloned()
    }

    /// Returns the format called `name`, loading its definition on a miss.
    ///
    /// Returns `None` if no definition exists or it fails to load; failures
    /// are logged.
    pub fn get(&self, name: &str) -> Option<Arc<VertexFormat>> {
        if let Some(format) = self.find(name) {
            return Some(format);
        }

        let format = self.load(name)?;
        // Another thread may have loaded the same format meanwhile; keep the first.
        let mut formats = self.lock();
        let entry = formats
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(format));
        Some(Arc::clone(entry))
    }

    fn load(&self, name: &str) -> Option<VertexFormat> {
        let resource = self.config.resource_path(name);
        let definition = match self.source.load(&resource) {
            Ok(Some(definition)) => definition,
            Ok(None) => {
                tracing::debug!(format = name, "No definition at {resource}");
                return None;
            }
            Err(err) => {
                tracing::warn!(format = name, "Failed to load vertex format: {err:#}");
                return None;
            }
        };

        match definition.build(name) {
            Ok(format) => {
                tracing::debug!(
                    format = name,
                    streams = format.stream_count(),
                    elements = format.count_elements(),
                    "Loaded vertex format"
                );
                Some(format)
            }
            Err(err) => {
                tracing::warn!(format = name, "Invalid vertex format definition: {err}");
                None
            }
        }
    }

    /// Inserts a programmatically built format under `name`.
    ///
    /// The format is renamed to `name`. Returns false, leaving the cache
    /// unchanged, if `name` is already taken.
    pub fn add(&self, name: &str, mut format: VertexFormat) -> bool {
        let mut formats = self.lock();
        if formats.contains_key(name) {
            tracing::warn!(format = name, "Vertex format already cached");
            return false;
        }
        format.set_name(name);
        formats.insert(name.to_string(), Arc::new(format));
        tracing::debug!(format = name, "Added vertex format");
        true
    }

    /// Resolves the format `source` declares for `target`.
    ///
    /// Without a declaration, returns `source` itself if `fallback_to_source`
    /// is set. A declared target that cannot be loaded yields `None`.
    pub fn get_target(
        &self,
        source: &Arc<VertexFormat>,
        target: &str,
        fallback_to_source: bool,
    ) -> Option<Arc<VertexFormat>> {
        match source.target_format_name(target) {
            Some(name) => {
                tracing::debug!(
                    format = source.name(),
                    target,
                    "Resolving target format {name}"
                );
                self.get(name)
            }
            None => fallback_to_source.then(|| Arc::clone(source)),
        }
    }

    /// Returns the format describing `V`, registering it on first use.
    ///
    /// The layout comes from the Rust type, never from a definition file.
    pub fn get_for<V: VertexLayout>(&self) -> Option<Arc<VertexFormat>> {
        if let Some(format) = self.find(V::FORMAT_NAME) {
            return Some(format);
        }

        let format = V::format()
            .inspect_err(|err| {
                tracing::warn!(format = V::FORMAT_NAME, "Invalid vertex layout: {err}");
            })
            .ok()?;
        let mut formats = self.lock();
        let entry = formats
            .entry(V::FORMAT_NAME.to_string())
            .or_insert_with(|| Arc::new(format));
        Some(Arc::clone(entry))
    }
}
