//! The selection document: a spec owns models, a model owns methods,
//! a method owns selectors.

use crate::error::Error;
use crate::qualifier::Selector;
use crate::registry::Registry;
use crate::validate::normalize_name;
use eyre::WrapErr;
use facet::Facet;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Security-modeling category of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Facet)]
#[repr(u8)]
pub enum Kind {
    /// A call that writes an HTTP response header
    HeaderWrite,
    /// A call that issues an HTTP redirect
    Redirect,
    /// A call that writes an HTTP response body
    ResponseBody,
    /// A function that propagates taint from inputs to outputs
    TaintTracking,
    /// Elements that carry untrusted input
    UntrustedFlowSource,
}

impl Kind {
    pub const ALL: [Kind; 5] = [
        Kind::HeaderWrite,
        Kind::Redirect,
        Kind::ResponseBody,
        Kind::TaintTracking,
        Kind::UntrustedFlowSource,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::HeaderWrite => "HeaderWrite",
            Kind::Redirect => "Redirect",
            Kind::ResponseBody => "ResponseBody",
            Kind::TaintTracking => "TaintTracking",
            Kind::UntrustedFlowSource => "UntrustedFlowSource",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Kind::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named role within a model, holding the selectors that fill it
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct Method {
    pub name: String,
    /// Selects whole elements rather than a named sub-role
    #[facet(default)]
    pub is_self: bool,
    #[facet(default)]
    pub selectors: Vec<Selector>,
}

impl Method {
    pub fn new(name: impl Into<String>, is_self: bool) -> Self {
        Self {
            name: name.into(),
            is_self,
            selectors: Vec::new(),
        }
    }

    pub fn push_selector(&mut self, selector: impl Into<Selector>) {
        self.selectors.push(selector.into());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct Model {
    pub name: String,
    pub kind: Kind,
    #[facet(default)]
    pub methods: Vec<Method>,
}

impl Model {
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn method_mut(&mut self, name: &str) -> Option<&mut Method> {
        self.methods.iter_mut().find(|m| m.name == name)
    }
}

/// A selection document
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct Spec {
    pub name: String,
    #[facet(default)]
    pub models: Vec<Model>,
}

impl Spec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            models: Vec::new(),
        }
    }

    /// Parse a spec document from JSON
    pub fn from_json(json: &str) -> eyre::Result<Self> {
        facet_json::from_str(json).wrap_err("Failed to parse spec JSON")
    }

    /// Load a spec document from a local file
    pub fn load(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read spec from {}", path.display()))?;
        Self::from_json(&content)
            .wrap_err_with(|| format!("Failed to parse spec from {}", path.display()))
    }

    /// Serialize to pretty JSON.
    ///
    /// Call [`crate::remove_meta`] first to get the canonical persisted form.
    pub fn to_json(&self) -> eyre::Result<String> {
        facet_json::to_string_pretty(self)
            .map_err(|e| eyre::eyre!("Failed to serialize spec {:?}: {}", self.name, e))
    }

    /// Add a model of the given kind, with its method skeleton filled in.
    ///
    /// The name is normalized first. Nothing is added if the name is empty,
    /// already taken, or the kind has no handler.
    pub fn push_model(
        &mut self,
        registry: &Registry,
        name: &str,
        kind: Kind,
    ) -> Result<&mut Model, Error> {
        let name = normalize_name("model", name)?;
        if self.model(&name).is_some() {
            return Err(Error::DuplicateModel {
                spec: self.name.clone(),
                model: name,
            });
        }
        let handler = registry.handler(kind)?;

        debug!("Adding model {} ({}) to spec {}", name, kind, self.name);
        self.models.push(Model {
            name,
            kind,
            methods: handler.scavenge_methods(),
        });
        let last = self.models.len() - 1;
        Ok(&mut self.models[last])
    }

    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.iter().find(|m| m.name == name)
    }

    pub fn model_mut(&mut self, name: &str) -> Option<&mut Model> {
        self.models.iter_mut().find(|m| m.name == name)
    }

    /// Iterate every selector in document order
    pub fn selectors(&self) -> impl Iterator<Item = &Selector> {
        self.models
            .iter()
            .flat_map(|m| &m.methods)
            .flat_map(|m| &m.selectors)
    }

    pub fn selectors_mut(&mut self) -> impl Iterator<Item = &mut Selector> {
        self.models
            .iter_mut()
            .flat_map(|m| &mut m.methods)
            .flat_map(|m| &mut m.selectors)
    }

    pub fn selector_count(&self) -> usize {
        self.selectors().count()
    }

    /// Distinct `(path, version)` pairs referenced by any selector, sorted
    pub fn module_refs(&self) -> BTreeSet<(String, String)> {
        self.selectors()
            .map(|s| {
                let basic = s.basic();
                (basic.path.clone(), basic.version.clone())
            })
            .collect()
    }
}

/// A spec shared between threads.
///
/// Structural changes go through the write lock; readers see either the
/// state before or after a change, never a partial one.
#[derive(Debug, Clone)]
pub struct SharedSpec(Arc<RwLock<Spec>>);

impl SharedSpec {
    pub fn new(spec: Spec) -> Self {
        Self(Arc::new(RwLock::new(spec)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Spec> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Spec> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a model under the write lock. Returns the normalized model name.
    pub fn push_model(&self, registry: &Registry, name: &str, kind: Kind) -> Result<String, Error> {
        let mut spec = self.write();
        let model = spec.push_model(registry, name, kind)?;
        Ok(model.name.clone())
    }

    /// Clone the current state
    pub fn snapshot(&self) -> Spec {
        self.read().clone()
    }
}
