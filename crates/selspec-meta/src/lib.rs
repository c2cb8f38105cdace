//! selspec-meta - Parsed package metadata
//!
//! This crate contains the metadata types a package loader produces after
//! parsing a Go package at a given version: free functions, methods on named
//! types, interface methods, structs and named types. selspec never parses
//! source itself; it only reads these types.
//!
//! Every element carries an `id` that is stable within its package and is
//! what selections refer to.
//!
//! ```
//! use selspec_meta::{Callable, Func, PackageMeta, Param};
//!
//! let mut pkg = PackageMeta::new("example.com/web", "v1.2.0");
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
//!
//! let callable = pkg.callable("Redirect").unwrap();
//! assert_eq!(callable.lengths().total(), 1);
//! ```

mod callable;

pub use callable::{Callable, CallableRef, CallableShape, ElementKind, Lengths, RelativeElement};

use eyre::{Result, WrapErr};
use facet::Facet;

/// Location of an element in the parsed source. Only meaningful while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct SourceSpan {
    /// File the element was parsed from (relative to the module root)
    pub file: String,
    /// 1-indexed line
    pub line: usize,
}

/// A parameter or result of a function signature
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct Param {
    /// Declared name (empty for unnamed parameters)
    pub name: String,
    /// Type as written, e.g. `[]byte` or `*http.Request`
    pub type_string: String,
    /// Underlying kind, e.g. `basic`, `slice`, `pointer`, `interface`
    pub kind: String,
}

impl Param {
    pub fn new(
        name: impl Into<String>,
        type_string: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            type_string: type_string.into(),
            kind: kind.into(),
        }
    }
}

/// The receiver of a method: the named type or interface it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct Receiver {
    /// Receiver variable name (may be empty)
    pub name: String,
    /// ID of the receiver type within the package
    pub type_id: String,
    /// Type as written, e.g. `*Writer`
    pub type_string: String,
    /// Underlying kind of the receiver type
    pub kind: String,
}

/// A function signature together with its identity
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct Func {
    pub id: String,
    pub name: String,
    /// Import path of the declaring package
    pub pkg_path: String,
    pub params: Vec<Param>,
    pub results: Vec<Param>,
    /// Whether the last parameter is variadic (`...T`)
    #[facet(default)]
    pub variadic: bool,
    /// Doc comment (transient)
    #[facet(default)]
    pub doc: Option<String>,
    /// Declaration site (transient)
    #[facet(default)]
    pub span: Option<SourceSpan>,
}

/// A method declared on a named (non-interface) type
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct TypeMethod {
    pub id: String,
    pub receiver: Receiver,
    pub func: Func,
}

/// A method declared in an interface
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct InterfaceMethod {
    pub id: String,
    pub receiver: Receiver,
    pub func: Func,
}

/// A struct field
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct Field {
    pub name: String,
    pub type_string: String,
    pub kind: String,
    /// Doc comment (transient)
    #[facet(default)]
    pub doc: Option<String>,
}

/// A named struct type
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct Struct {
    pub id: String,
    pub name: String,
    pub type_string: String,
    pub fields: Vec<Field>,
    #[facet(default)]
    pub doc: Option<String>,
    #[facet(default)]
    pub span: Option<SourceSpan>,
}

impl Struct {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A named type addressed as a whole
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct NamedType {
    pub id: String,
    pub name: String,
    pub type_string: String,
    pub kind: String,
    #[facet(default)]
    pub doc: Option<String>,
    #[facet(default)]
    pub span: Option<SourceSpan>,
}

/// Everything a loader extracted from one package at one version
#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
pub struct PackageMeta {
    /// Import path of the package
    pub path: String,
    /// Module version the package was loaded at
    pub version: String,
    #[facet(default)]
    pub funcs: Vec<Func>,
    #[facet(default)]
    pub type_methods: Vec<TypeMethod>,
    #[facet(default)]
    pub interface_methods: Vec<InterfaceMethod>,
    #[facet(default)]
    pub structs: Vec<Struct>,
    #[facet(default)]
    pub types: Vec<NamedType>,
}

impl PackageMeta {
    pub fn new(path: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    /// Parse package metadata from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        facet_json::from_str(json).wrap_err("Failed to parse package metadata JSON")
    }

    /// Find any callable (free function, type method or interface method) by ID
    pub fn callable(&self, id: &str) -> Option<CallableRef<'_>> {
        if let Some(f) = self.func(id) {
            return Some(CallableRef::Func(f));
        }
        if let Some(m) = self.type_method(id) {
            return Some(CallableRef::TypeMethod(m));
        }
        self.interface_method(id).map(CallableRef::InterfaceMethod)
    }

    pub fn func(&self, id: &str) -> Option<&Func> {
        self.funcs.iter().find(|f| f.id == id)
    }

    pub fn type_method(&self, id: &str) -> Option<&TypeMethod> {
        self.type_methods.iter().find(|m| m.id == id)
    }

    pub fn interface_method(&self, id: &str) -> Option<&InterfaceMethod> {
        self.interface_methods.iter().find(|m| m.id == id)
    }

    pub fn struct_by_id(&self, id: &str) -> Option<&Struct> {
        self.structs.iter().find(|s| s.id == id)
    }

    pub fn named_type(&self, id: &str) -> Option<&NamedType> {
        self.types.iter().find(|t| t.id == id)
    }

    /// Drop doc comments and source spans.
    ///
    /// These are only useful while the loader is parsing; a cached package
    /// does not keep them.
    pub fn strip_transient(&mut self) {
        fn strip_func(f: &mut Func) {
            f.doc = None;
            f.span = None;
        }

        self.funcs.iter_mut().for_each(strip_func);
        self.type_methods.iter_mut().for_each(|m| strip_func(&mut m.func));
        self.interface_methods
            .iter_mut()
            .for_each(|m| strip_func(&mut m.func));
        for s in &mut self.structs {
            s.doc = None;
            s.span = None;
            for field in &mut s.fields {
                field.doc = None;
            }
        }
        for t in &mut self.types {
            t.doc = None;
            t.span = None;
        }
    }

    /// Total number of addressable elements in this package
    pub fn len(&self) -> usize {
        self.funcs.len()
            + self.type_methods.len()
            + self.interface_methods.len()
            + self.structs.len()
            + self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
