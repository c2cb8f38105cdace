//! Grouping of a method's selectors for generation
//!
//! Selectors are grouped by their package's clean path-version key (see
//! [`Config::clean_path_version`]). Function selectors are further split by
//! callable shape, and methods by receiver type. Maps are ordered by key and
//! every list is sorted by element ID, so the same method always groups the
//! same way.

use crate::cache::MetaCache;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::positions::{PositionSplit, resolve_flow_block, resolve_positions};
use crate::qualifier::{BasicQualifier, FuncQualifier, Selector, StructQualifier, TypeQualifier};
use crate::spec::Method;
use selspec_meta::{Callable, CallableShape, Func, Lengths, NamedType, Receiver, Struct};
use std::collections::BTreeMap;
use tracing::debug;

/// A function selector resolved against its package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncEntry {
    pub qualifier: FuncQualifier,
    pub shape: CallableShape,
    pub func: Func,
    pub receiver: Option<Receiver>,
}

impl FuncEntry {
    pub fn lengths(&self) -> Lengths {
        Lengths::new(
            self.receiver.is_some(),
            self.func.params.len(),
            self.func.results.len(),
        )
    }

    /// Split of the position bitmap, for position-mode selectors
    pub fn positions(&self) -> Result<Option<PositionSplit>> {
        self.qualifier
            .positions()
            .map(|pos| resolve_positions(self.lengths(), pos))
            .transpose()
    }

    /// Input and output splits of every flow block, for flow-mode selectors
    pub fn flow_blocks(&self) -> Result<Vec<(PositionSplit, PositionSplit)>> {
        let lengths = self.lengths();
        self.qualifier
            .flows()
            .map(|flows| flows.blocks.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|block| resolve_flow_block(lengths, block))
            .collect()
    }
}

/// Function selectors grouped by package key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FuncGroups {
    /// Free functions
    pub funcs: BTreeMap<String, Vec<FuncEntry>>,
    /// Methods on named types, by receiver type ID
    pub type_methods: BTreeMap<String, BTreeMap<String, Vec<FuncEntry>>>,
    /// Interface methods, by receiver interface ID
    pub interface_methods: BTreeMap<String, BTreeMap<String, Vec<FuncEntry>>>,
}

impl FuncGroups {
    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty() && self.type_methods.is_empty() && self.interface_methods.is_empty()
    }

    /// Every package key with at least one entry, ascending
    pub fn package_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .funcs
            .keys()
            .chain(self.type_methods.keys())
            .chain(self.interface_methods.keys())
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }

    fn sort(&mut self) {
        self.funcs.values_mut().for_each(sort_funcs);
        for by_receiver in self
            .type_methods
            .values_mut()
            .chain(self.interface_methods.values_mut())
        {
            by_receiver.values_mut().for_each(sort_funcs);
        }
    }
}

fn sort_funcs(entries: &mut Vec<FuncEntry>) {
    entries.sort_by(|a, b| a.qualifier.basic.id.cmp(&b.qualifier.basic.id));
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructEntry {
    pub qualifier: StructQualifier,
    pub meta: Struct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeEntry {
    pub qualifier: TypeQualifier,
    pub meta: NamedType,
}

/// Struct selectors by package key
pub type StructGroups = BTreeMap<String, Vec<StructEntry>>;

/// Type selectors by package key
pub type TypeGroups = BTreeMap<String, Vec<TypeEntry>>;

fn package_key(config: &Config, basic: &BasicQualifier) -> String {
    config.clean_path_version(&basic.path, &basic.version)
}

fn not_found(basic: &BasicQualifier) -> Error {
    Error::element_not_found(&basic.path, &basic.version, &basic.id)
}

/// Group the function selectors of `method`
pub fn group_func_selectors(
    method: &Method,
    cache: &MetaCache,
    config: &Config,
) -> Result<FuncGroups> {
    let mut groups = FuncGroups::default();

    for selector in &method.selectors {
        let Selector::Func(q) = selector else {
            continue;
        };
        let pkg = cache.require(&q.basic.path, &q.basic.version)?;
        let callable = pkg.callable(&q.basic.id).ok_or_else(|| not_found(&q.basic))?;
        let entry = FuncEntry {
            qualifier: q.clone(),
            shape: callable.shape(),
            func: callable.underlying_func().clone(),
            receiver: callable.receiver().cloned(),
        };
        let key = package_key(config, &q.basic);

        let receiver_type = entry.receiver.as_ref().map(|r| r.type_id.clone());

        match (entry.shape, receiver_type) {
            (CallableShape::TypeMethod, Some(type_id)) => {
                groups
                    .type_methods
                    .entry(key)
                    .or_default()
                    .entry(type_id)
                    .or_default()
                    .push(entry);
            }
            (CallableShape::InterfaceMethod, Some(type_id)) => {
                groups
                    .interface_methods
                    .entry(key)
                    .or_default()
                    .entry(type_id)
                    .or_default()
                    .push(entry);
            }
            _ => groups.funcs.entry(key).or_default().push(entry),
        }
    }

    groups.sort();
    debug!(
        "Grouped func selectors of {} into {} packages",
        method.name,
        groups.package_keys().len()
    );
    Ok(groups)
}

/// Group the struct selectors of `method`
pub fn group_struct_selectors(
    method: &Method,
    cache: &MetaCache,
    config: &Config,
) -> Result<StructGroups> {
    let mut groups = StructGroups::new();

    for selector in &method.selectors {
        let Selector::Struct(q) = selector else {
            continue;
        };
        let pkg = cache.require(&q.basic.path, &q.basic.version)?;
        let meta = pkg
            .struct_by_id(&q.basic.id)
            .ok_or_else(|| not_found(&q.basic))?;
        groups
            .entry(package_key(config, &q.basic))
            .or_default()
            .push(StructEntry {
                qualifier: q.clone(),
                meta: meta.clone(),
            });
    }

    for entries in groups.values_mut() {
        entries.sort_by(|a, b| a.qualifier.basic.id.cmp(&b.qualifier.basic.id));
    }
    Ok(groups)
}

/// Group the type selectors of `method`
pub fn group_type_selectors(
    method: &Method,
    cache: &MetaCache,
    config: &Config,
) -> Result<TypeGroups> {
    let mut groups = TypeGroups::new();

    for selector in &method.selectors {
        let Selector::Type(q) = selector else {
            continue;
        };
        let pkg = cache.require(&q.basic.path, &q.basic.version)?;
        let meta = pkg
            .named_type(&q.basic.id)
            .ok_or_else(|| not_found(&q.basic))?;
        groups
            .entry(package_key(config, &q.basic))
            .or_default()
            .push(TypeEntry {
                qualifier: q.clone(),
                meta: meta.clone(),
            });
    }

    for entries in groups.values_mut() {
        entries.sort_by(|a, b| a.qualifier.basic.id.cmp(&b.qualifier.basic.id));
    }
    Ok(groups)
}
