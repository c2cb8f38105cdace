//! The processing pipeline.
//!
//! An [`Engine`] owns the config, the model-kind registry and the metadata
//! cache. A host builds one at startup and shares it; every spec goes
//! through `prepare`, `populate`, then enrichment and grouping.

use crate::cache::{MetaCache, PackageLoader};
use crate::config::Config;
use crate::enrich;
use crate::error::Result;
use crate::grouping::{self, FuncGroups, StructGroups, TypeGroups};
use crate::registry::Registry;
use crate::spec::{Method, Spec};
use crate::validate;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone)]
pub struct Engine {
    config: Arc<Config>,
    registry: Arc<Registry>,
    cache: Arc<MetaCache>,
}

impl Engine {
    pub fn new(config: Config, registry: Registry, cache: MetaCache) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            cache: Arc::new(cache),
        }
    }

    /// An engine with the built-in handlers and an empty cache
    pub fn with_builtins(config: Config) -> Result<Self> {
        Ok(Self::new(config, Registry::with_builtins()?, MetaCache::new()))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn cache(&self) -> &MetaCache {
        &self.cache
    }

    /// Normalize, validate and prune a spec. Returns the number of pruned selectors.
    pub fn prepare(&self, spec: &mut Spec) -> Result<usize> {
        validate::prepare(spec, &self.registry)
    }

    /// Load every module the spec references that is not cached yet
    pub fn populate(&self, spec: &Spec, loader: &dyn PackageLoader) -> Result<usize> {
        self.cache.populate(spec, loader)
    }

    pub fn add_meta(&self, spec: &mut Spec) -> Result<()> {
        enrich::add_meta(spec, &self.cache)
    }

    pub fn remove_meta(&self, spec: &mut Spec) {
        enrich::remove_meta(spec)
    }

    /// Prepare, populate and enrich in one go
    pub fn process(&self, spec: &mut Spec, loader: &dyn PackageLoader) -> Result<()> {
        let pruned = self.prepare(spec)?;
        let loaded = self.populate(spec, loader)?;
        self.add_meta(spec)?;
        info!(
            "Processed spec {}: {} models, {} selectors ({} pruned, {} modules loaded)",
            spec.name,
            spec.models.len(),
            spec.selector_count(),
            pruned,
            loaded
        );
        Ok(())
    }

    pub fn group_func_selectors(&self, method: &Method) -> Result<FuncGroups> {
        grouping::group_func_selectors(method, &self.cache, &self.config)
    }

    pub fn group_struct_selectors(&self, method: &Method) -> Result<StructGroups> {
        grouping::group_struct_selectors(method, &self.cache, &self.config)
    }

    pub fn group_type_selectors(&self, method: &Method) -> Result<TypeGroups> {
        grouping::group_type_selectors(method, &self.cache, &self.config)
    }
}
