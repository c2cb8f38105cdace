//! Uniform view over the three callable shapes
//!
//! A callable's addressable positions are laid out flat: the receiver first
//! (if there is one), then the parameters, then the results. Every absolute
//! position maps to exactly one `(ElementKind, relative index)` pair and back.

use crate::{Func, InterfaceMethod, Receiver, TypeMethod};
use facet::Facet;

/// Which part of a callable an addressable position belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Facet)]
#[repr(u8)]
pub enum ElementKind {
    Receiver,
    Parameter,
    Result,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Receiver => "receiver",
            ElementKind::Parameter => "parameter",
            ElementKind::Result => "result",
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Element counts of a callable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Lengths {
    pub has_receiver: bool,
    pub params: usize,
    pub results: usize,
}

impl Lengths {
    pub fn new(has_receiver: bool, params: usize, results: usize) -> Self {
        Self {
            has_receiver,
            params,
            results,
        }
    }

    /// Number of addressable positions (receiver + parameters + results)
    pub fn total(&self) -> usize {
        usize::from(self.has_receiver) + self.params + self.results
    }

    /// Number of elements of the given kind
    pub fn count(&self, kind: ElementKind) -> usize {
        match kind {
            ElementKind::Receiver => usize::from(self.has_receiver),
            ElementKind::Parameter => self.params,
            ElementKind::Result => self.results,
        }
    }

    /// Map an absolute position to its kind and index within that kind.
    pub fn relative(&self, absolute: usize) -> Option<RelativeElement> {
        let offset = usize::from(self.has_receiver);
        if self.has_receiver && absolute == 0 {
            return Some(RelativeElement::new(ElementKind::Receiver, absolute, 0));
        }
        let rest = absolute.checked_sub(offset)?;
        if rest < self.params {
            return Some(RelativeElement::new(ElementKind::Parameter, absolute, rest));
        }
        let rest = rest - self.params;
        if rest < self.results {
            return Some(RelativeElement::new(ElementKind::Result, absolute, rest));
        }
        None
    }

    /// Inverse of [`Lengths::relative`].
    pub fn absolute(&self, kind: ElementKind, relative: usize) -> Option<usize> {
        if relative >= self.count(kind) {
            return None;
        }
        let offset = usize::from(self.has_receiver);
        Some(match kind {
            ElementKind::Receiver => 0,
            ElementKind::Parameter => offset + relative,
            ElementKind::Result => offset + self.params + relative,
        })
    }
}

/// One addressable position, resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelativeElement {
    pub kind: ElementKind,
    /// Position in the flat receiver + parameters + results layout
    pub absolute: usize,
    /// Index within the element's own list
    pub relative: usize,
}

impl RelativeElement {
    pub fn new(kind: ElementKind, absolute: usize, relative: usize) -> Self {
        Self {
            kind,
            absolute,
            relative,
        }
    }
}

/// The three callable shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallableShape {
    Func,
    TypeMethod,
    InterfaceMethod,
}

/// Capability shared by free functions, type methods and interface methods
pub trait Callable {
    /// Element ID within the declaring package
    fn id(&self) -> &str;

    /// The signature, without the receiver
    fn underlying_func(&self) -> &Func;

    /// The receiver, for methods
    fn receiver(&self) -> Option<&Receiver>;

    fn shape(&self) -> CallableShape;

    fn lengths(&self) -> Lengths {
        let func = self.underlying_func();
        Lengths::new(
            self.receiver().is_some(),
            func.params.len(),
            func.results.len(),
        )
    }

    fn relative_element(&self, absolute: usize) -> Option<RelativeElement> {
        self.lengths().relative(absolute)
    }

    fn absolute_index(&self, kind: ElementKind, relative: usize) -> Option<usize> {
        self.lengths().absolute(kind, relative)
    }
}

impl Callable for Func {
    fn id(&self) -> &str {
        &self.id
    }

    fn underlying_func(&self) -> &Func {
        self
    }

    fn receiver(&self) -> Option<&Receiver> {
        None
    }

    fn shape(&self) -> CallableShape {
        CallableShape::Func
    }
}

impl Callable for TypeMethod {
    fn id(&self) -> &str {
        &self.id
    }

    fn underlying_func(&self) -> &Func {
        &self.func
    }

    fn receiver(&self) -> Option<&Receiver> {
        Some(&self.receiver)
    }

    fn shape(&self) -> CallableShape {
        CallableShape::TypeMethod
    }
}

impl Callable for InterfaceMethod {
    fn id(&self) -> &str {
        &self.id
    }

    fn underlying_func(&self) -> &Func {
        &self.func
    }

    fn receiver(&self) -> Option<&Receiver> {
        Some(&self.receiver)
    }

    fn shape(&self) -> CallableShape {
        CallableShape::InterfaceMethod
    }
}

/// A borrowed callable of any shape
#[derive(Debug, Clone, Copy)]
pub enum CallableRef<'a> {
    Func(&'a Func),
    TypeMethod(&'a TypeMethod),
    InterfaceMethod(&'a InterfaceMethod),
}

impl CallableRef<'_> {
    fn inner(&self) -> &dyn Callable {
        match *self {
            CallableRef::Func(f) => f,
            CallableRef::TypeMethod(m) => m,
            CallableRef::InterfaceMethod(m) => m,
        }
    }
}

impl Callable for CallableRef<'_> {
    fn id(&self) -> &str {
        self.inner().id()
    }

    fn underlying_func(&self) -> &Func {
        self.inner().underlying_func()
    }

    fn receiver(&self) -> Option<&Receiver> {
        self.inner().receiver()
    }

    fn shape(&self) -> CallableShape {
        self.inner().shape()
    }
}
