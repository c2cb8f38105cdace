//! Metadata enrichment
//!
//! [`add_meta`] fills the derived fields of every qualifier from the metadata
//! cache; [`remove_meta`] clears them again, leaving the minimal document
//! that gets persisted. Authoritative fields are never touched by either.

use crate::cache::MetaCache;
use crate::error::{Error, Result};
use crate::qualifier::{
    BasicQualifier, Element, FuncElements, FuncQualifier, FuncSelection, Selector,
    StructQualifier, TypeQualifier,
};
use crate::spec::Spec;
use selspec_meta::{Callable, CallableRef, ElementKind, PackageMeta};
use tracing::debug;

/// Populate derived fields of every selector.
///
/// Any selector that does not resolve against the cache fails the whole
/// call, and `spec` is left unchanged.
pub fn add_meta(spec: &mut Spec, cache: &MetaCache) -> Result<()> {
    let mut enriched = spec.clone();
    for selector in enriched.selectors_mut() {
        let basic = selector.basic().clone();
        let pkg = cache.require(&basic.path, &basic.version)?;
        match selector {
            Selector::Func(q) => enrich_func(q, &pkg)?,
            Selector::Struct(q) => enrich_struct(q, &pkg)?,
            Selector::Type(q) => enrich_type(q, &pkg)?,
        }
    }
    debug!(
        "Enriched {} selectors of spec {}",
        enriched.selector_count(),
        enriched.name
    );
    *spec = enriched;
    Ok(())
}

/// Clear derived fields of every selector
pub fn remove_meta(spec: &mut Spec) {
    for selector in spec.selectors_mut() {
        selector.clear_meta();
    }
}

fn not_found(basic: &BasicQualifier) -> Error {
    Error::element_not_found(&basic.path, &basic.version, &basic.id)
}

fn enrich_func(q: &mut FuncQualifier, pkg: &PackageMeta) -> Result<()> {
    let callable = pkg.callable(&q.basic.id).ok_or_else(|| not_found(&q.basic))?;
    let expected = callable.lengths().total();

    let found = match &q.selection {
        FuncSelection::Positions(pos) => Some(pos.len()).filter(|&n| n != expected),
        FuncSelection::Flows(flows) => flows
            .blocks
            .iter()
            .flat_map(|b| [b.inp.len(), b.out.len()])
            .find(|&n| n != expected),
    };
    if let Some(found) = found {
        return Err(Error::PositionCountMismatch {
            path: q.basic.path.clone(),
            version: q.basic.version.clone(),
            id: q.basic.id.clone(),
            expected,
            found,
        });
    }

    q.name = callable.underlying_func().name.clone();
    q.elements = Some(func_elements(&callable));
    Ok(())
}

/// Resolve every addressable position of a callable
pub fn func_elements(callable: &CallableRef<'_>) -> FuncElements {
    let func = callable.underlying_func();
    let mut elements = FuncElements::default();

    for absolute in 0..callable.lengths().total() {
        let Some(rel) = callable.relative_element(absolute) else {
            continue;
        };
        match rel.kind {
            ElementKind::Receiver => {
                if let Some(recv) = callable.receiver() {
                    elements.receiver = Some(Element {
                        kind: rel.kind,
                        absolute,
                        relative: rel.relative,
                        name: recv.name.clone(),
                        type_string: recv.type_string.clone(),
                        type_kind: recv.kind.clone(),
                    });
                }
            }
            ElementKind::Parameter | ElementKind::Result => {
                let (list, target) = if rel.kind == ElementKind::Parameter {
                    (&func.params, &mut elements.params)
                } else {
                    (&func.results, &mut elements.results)
                };
                let param = &list[rel.relative];
                target.push(Element {
                    kind: rel.kind,
                    absolute,
                    relative: rel.relative,
                    name: param.name.clone(),
                    type_string: param.type_string.clone(),
                    type_kind: param.kind.clone(),
                });
            }
        }
    }
    elements
}

fn enrich_struct(q: &mut StructQualifier, pkg: &PackageMeta) -> Result<()> {
    let st = pkg
        .struct_by_id(&q.basic.id)
        .ok_or_else(|| not_found(&q.basic))?;

    let basic = &q.basic;
    for (name, meta) in &mut q.fields {
        let field = st.field(name).ok_or_else(|| Error::FieldNotFound {
            path: basic.path.clone(),
            version: basic.version.clone(),
            id: basic.id.clone(),
            field: name.clone(),
        })?;
        meta.type_string = field.type_string.clone();
        meta.kind = field.kind.clone();
    }

    q.name = st.name.clone();
    q.total = st.fields.len();
    q.left = q.total.saturating_sub(q.fields.len());
    Ok(())
}

fn enrich_type(q: &mut TypeQualifier, pkg: &PackageMeta) -> Result<()> {
    let ty = pkg
        .named_type(&q.basic.id)
        .ok_or_else(|| not_found(&q.basic))?;
    q.name = ty.name.clone();
    q.type_string = ty.type_string.clone();
    q.kind = ty.kind.clone();
    Ok(())
}
