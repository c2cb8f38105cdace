//! Metadata cache
//!
//! Maps `(package path, version)` to the metadata a [`PackageLoader`]
//! produced for it. Entries are never evicted; a second `set` for the same
//! key replaces the first.

use crate::error::{Error, Result};
use crate::spec::Spec;
use selspec_meta::PackageMeta;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

/// Parses a package at a version into metadata. Fetching and parsing are
/// entirely the loader's business, including any retries.
pub trait PackageLoader: Send + Sync {
    fn load(&self, path: &str, version: &str) -> eyre::Result<PackageMeta>;
}

impl<F> PackageLoader for F
where
    F: Fn(&str, &str) -> eyre::Result<PackageMeta> + Send + Sync,
{
    fn load(&self, path: &str, version: &str) -> eyre::Result<PackageMeta> {
        self(path, version)
    }
}

type Key = (String, String);

#[derive(Debug, Default)]
pub struct MetaCache {
    entries: RwLock<HashMap<Key, Arc<PackageMeta>>>,
}

impl MetaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str, version: &str) -> Option<Arc<PackageMeta>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(path.to_string(), version.to_string()))
            .cloned()
    }

    /// Like [`MetaCache::get`], but a missing entry is a reference error
    pub fn require(&self, path: &str, version: &str) -> Result<Arc<PackageMeta>> {
        self.get(path, version)
            .ok_or_else(|| Error::source_not_found(path, version))
    }

    /// Store metadata for `(path, version)`, dropping transient parse-time data
    pub fn set(&self, path: &str, version: &str, mut meta: PackageMeta) {
        meta.strip_transient();
        let elements = meta.len();
        let previous = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((path.to_string(), version.to_string()), Arc::new(meta));
        if previous.is_some() {
            debug!("Replaced cached metadata for {}@{}", path, version);
        } else {
            debug!(
                "Cached metadata for {}@{} ({} elements)",
                path, version, elements
            );
        }
    }

    pub fn contains(&self, path: &str, version: &str) -> bool {
        self.get(path, version).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Load every module the spec references that is not cached yet.
    ///
    /// Each distinct `(path, version)` is loaded once. Returns how many
    /// modules were loaded. The first loader failure aborts.
    pub fn populate(&self, spec: &Spec, loader: &dyn PackageLoader) -> Result<usize> {
        let missing: Vec<Key> = spec
            .module_refs()
            .into_iter()
            .filter(|(path, version)| !self.contains(path, version))
            .collect();

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            missing
                .par_iter()
                .try_for_each(|(path, version)| self.load_one(loader, path, version))?;
        }

        #[cfg(not(feature = "parallel"))]
        {
            for (path, version) in &missing {
                self.load_one(loader, path, version)?;
            }
        }

        if !missing.is_empty() {
            info!(
                "Loaded {} modules for spec {} ({} cached)",
                missing.len(),
                spec.name,
                self.len()
            );
        }
        Ok(missing.len())
    }

    fn load_one(&self, loader: &dyn PackageLoader, path: &str, version: &str) -> Result<()> {
        let meta = loader.load(path, version).map_err(|e| Error::Loader {
            path: path.to_string(),
            version: version.to_string(),
            message: format!("{e:#}"),
        })?;
        self.set(path, version, meta);
        Ok(())
    }
}
