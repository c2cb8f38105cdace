//! selspec-core - Core library for security selection specs
//!
//! A spec marks which functions, methods, struct fields and types of a
//! package (at a version) take part in a security-modeling concern: where a
//! redirect URL enters, which call writes a response header, which fields
//! carry untrusted input, how taint flows through a function.
//!
//! This crate provides:
//! - The spec tree: [`Spec`] → [`Model`] → [`Method`] → [`Selector`]
//! - The [`Registry`] of per-[`Kind`] handlers that fix each model's methods
//! - Normalization, validation and pruning ([`prepare`])
//! - The [`MetaCache`] of parsed package metadata, filled by a [`PackageLoader`]
//! - Enrichment of selectors from that metadata ([`add_meta`] / [`remove_meta`])
//! - Position resolution ([`resolve_positions`])
//! - Deterministic grouping for code generators ([`group_func_selectors`] and friends)
//!
//! # Features
//!
//! - `parallel` - Load distinct modules in parallel in [`MetaCache::populate`] (brings in `rayon`)
//!
//! # Example
//!
//! ```
//! use selspec_core::{BasicQualifier, FuncQualifier, Kind, MetaCache, Registry, Spec};
//! use selspec_meta::{Func, PackageMeta, Param};
//!
//! let registry = Registry::with_builtins().unwrap();
//! let mut spec = Spec::new("web");
//! let model = spec.push_model(&registry, "redirects", Kind::Redirect).unwrap();
//! model.methods[0].push_selector(FuncQualifier::with_positions(
//!     BasicQualifier::new("example.com/web", "v1.0.0", "Redirect"),
//!     vec![true],
//! ));
//! selspec_core::prepare(&mut spec, &registry).unwrap();
//!
//! let mut pkg = PackageMeta::new("example.com/web", "v1.0.0");
//! pkg.funcs.push(Func {
//!     id: "Redirect".into(),
//!     name: "Redirect".into(),
//!     pkg_path: "example.com/web".into(),
//!     params: vec![Param::new("url", "string", "basic")],
//!     results: vec![],
//!     variadic: false,
//!     doc: None,
//!     span: None,
//! });
//! let cache = MetaCache::new();
//! cache.set("example.com/web", "v1.0.0", pkg);
//!
//! let groups = selspec_core::group_func_selectors(
//!     &spec.models[0].methods[0],
//!     &cache,
//!     &selspec_core::Config::default(),
//! )
//! .unwrap();
//! assert_eq!(groups.funcs["example.com/web@v1.0.0"].len(), 1);
//! ```

mod cache;
mod config;
mod engine;
mod enrich;
mod error;
mod grouping;
pub mod handlers;
mod positions;
mod qualifier;
mod registry;
mod spec;
mod validate;

pub use cache::{MetaCache, PackageLoader};
pub use config::{Config, is_standard_library};
pub use engine::Engine;
pub use enrich::{add_meta, func_elements, remove_meta};
pub use error::{Error, ErrorCategory, QualifierError, Result};
pub use grouping::{
    FuncEntry, FuncGroups, StructEntry, StructGroups, TypeEntry, TypeGroups,
    group_func_selectors, group_struct_selectors, group_type_selectors,
};
pub use positions::{
    ParamMatch, PositionSplit, resolve_callable, resolve_flow_block, resolve_positions,
};
pub use qualifier::{
    AddressingMode, BasicQualifier, Element, FieldMeta, FlowBlock, FlowSpec, FuncElements,
    FuncQualifier, FuncSelection, Selector, SelectorKind, StructQualifier, TypeQualifier,
};
pub use registry::{Handler, MethodShape, Registry, check_addressing, check_skeleton};
pub use spec::{Kind, Method, Model, SharedSpec, Spec};
pub use validate::{cleanup, normalize, normalize_name, prepare, validate};
