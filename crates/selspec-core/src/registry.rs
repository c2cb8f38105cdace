//! Model-kind registry
//!
//! Maps each [`Kind`] to the [`Handler`] that knows its method skeleton and
//! how to validate a model of that kind. A registry is built once by the
//! host and passed to whatever needs it.

use crate::error::{Error, Result};
use crate::handlers;
use crate::qualifier::{AddressingMode, Selector};
use crate::spec::{Kind, Method, Model};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Name and role of one method in a kind's skeleton
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodShape {
    pub name: &'static str,
    pub is_self: bool,
}

impl MethodShape {
    pub const fn named(name: &'static str) -> Self {
        Self {
            name,
            is_self: false,
        }
    }

    pub const fn whole(name: &'static str) -> Self {
        Self {
            name,
            is_self: true,
        }
    }
}

/// Per-kind behavior
pub trait Handler: Send + Sync {
    fn kind(&self) -> Kind;

    /// How function selectors of this kind address callables
    fn addressing_mode(&self) -> AddressingMode;

    /// The fixed method shape of this kind
    fn shapes(&self) -> &'static [MethodShape];

    /// The kind's methods, with no selectors
    fn scavenge_methods(&self) -> Vec<Method> {
        self.shapes()
            .iter()
            .map(|shape| Method::new(shape.name, shape.is_self))
            .collect()
    }

    /// Check a model against this kind's skeleton and rules
    fn validate(&self, model: &Model) -> Result<()>;
}

/// Check method count, names, order and roles against the skeleton
pub fn check_skeleton(handler: &dyn Handler, model: &Model) -> Result<()> {
    let shapes = handler.shapes();
    if model.methods.len() != shapes.len() {
        return Err(Error::MethodCountMismatch {
            model: model.name.clone(),
            kind: handler.kind(),
            expected: shapes.len(),
            found: model.methods.len(),
        });
    }
    for (index, (method, shape)) in model.methods.iter().zip(shapes).enumerate() {
        if method.name != shape.name || method.is_self != shape.is_self {
            return Err(Error::MethodMismatch {
                model: model.name.clone(),
                kind: handler.kind(),
                index,
                expected: describe(shape.name, shape.is_self),
                found: describe(&method.name, method.is_self),
            });
        }
    }
    Ok(())
}

fn describe(name: &str, is_self: bool) -> String {
    if is_self {
        format!("{name} (self)")
    } else {
        name.to_string()
    }
}

/// Check every function selector uses the handler's addressing mode
pub fn check_addressing(handler: &dyn Handler, model: &Model) -> Result<()> {
    let expected = handler.addressing_mode();
    for method in &model.methods {
        let wrong = method.selectors.iter().any(|s| match s {
            Selector::Func(q) => q.mode() != expected,
            Selector::Struct(_) | Selector::Type(_) => false,
        });
        if wrong {
            return Err(Error::WrongAddressingMode {
                model: model.name.clone(),
                method: method.name.clone(),
                expected,
            });
        }
    }
    Ok(())
}

/// Registered handlers, keyed by kind
#[derive(Default)]
pub struct Registry {
    handlers: RwLock<HashMap<Kind, Arc<dyn Handler>>>,
    initialized: AtomicBool,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

impl Registry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in kind registered
    pub fn with_builtins() -> Result<Self> {
        let registry = Self::new();
        registry.init_builtins()?;
        Ok(registry)
    }

    /// Register the built-in handlers. Fails if called twice.
    pub fn init_builtins(&self) -> Result<()> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return Err(Error::AlreadyInitialized);
        }
        for handler in handlers::builtins() {
            self.register(handler.kind(), handler)?;
        }
        Ok(())
    }

    /// Register `handler` for `kind`. A kind can only be registered once.
    pub fn register(&self, kind: Kind, handler: Arc<dyn Handler>) -> Result<()> {
        if handler.kind() != kind {
            return Err(Error::HandlerKindMismatch {
                key: kind,
                actual: handler.kind(),
            });
        }
        let mut handlers = self
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if handlers.contains_key(&kind) {
            return Err(Error::DuplicateHandler(kind));
        }
        handlers.insert(kind, handler);
        debug!("Registered handler for {}", kind);
        Ok(())
    }

    pub fn get(&self, kind: Kind) -> Option<Arc<dyn Handler>> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .cloned()
    }

    /// Like [`Registry::get`], but an unregistered kind is an error
    pub fn handler(&self, kind: Kind) -> Result<Arc<dyn Handler>> {
        self.get(kind).ok_or(Error::UnregisteredKind(kind))
    }

    pub fn kinds(&self) -> BTreeSet<Kind> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect()
    }
}
