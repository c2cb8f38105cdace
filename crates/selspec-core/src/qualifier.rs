//! Qualifiers: what a selector points at, and which parts of it are selected

use crate::error::QualifierError;
use facet::Facet;
use selspec_meta::ElementKind;
use std::collections::BTreeMap;

/// Identifies an element inside a package at a version
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Facet)]
pub struct BasicQualifier {
    /// Package import path
    pub path: String,
    /// Module version
    pub version: String,
    /// Element ID within the package metadata
    pub id: String,
}

impl BasicQualifier {
    pub fn new(
        path: impl Into<String>,
        version: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            version: version.into(),
            id: id.into(),
        }
    }

    pub fn validate(&self) -> Result<(), QualifierError> {
        if self.path.is_empty() {
            return Err(QualifierError::EmptyPath);
        }
        if self.version.is_empty() {
            return Err(QualifierError::EmptyVersion);
        }
        if self.id.is_empty() {
            return Err(QualifierError::EmptyId);
        }
        Ok(())
    }
}

/// How a function selector addresses the parts of a callable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    /// A single bitmap over receiver, parameters and results
    Positions,
    /// Input to output blocks for taint propagation
    Flows,
}

impl std::fmt::Display for AddressingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            AddressingMode::Positions => "position",
            AddressingMode::Flows => "flow",
        })
    }
}

/// One taint step: data entering at any `inp` position flows to every `out` position
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct FlowBlock {
    pub inp: Vec<bool>,
    pub out: Vec<bool>,
}

impl FlowBlock {
    pub fn new(inp: Vec<bool>, out: Vec<bool>) -> Self {
        Self { inp, out }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
pub struct FlowSpec {
    #[facet(default)]
    pub blocks: Vec<FlowBlock>,
    /// Whether generation should emit these flows
    #[facet(default)]
    pub enabled: bool,
}

impl FlowSpec {
    pub fn validate(&self) -> Result<(), QualifierError> {
        for (block, b) in self.blocks.iter().enumerate() {
            if b.inp.len() != b.out.len() {
                return Err(QualifierError::FlowLengthMismatch {
                    block,
                    inp: b.inp.len(),
                    out: b.out.len(),
                });
            }
            if !b.inp.iter().any(|&set| set) {
                return Err(QualifierError::FlowInputEmpty { block });
            }
            if !b.out.iter().any(|&set| set) {
                return Err(QualifierError::FlowOutputEmpty { block });
            }
        }
        Ok(())
    }
}

/// The addressing payload of a [`FuncQualifier`]
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
#[repr(u8)]
pub enum FuncSelection {
    /// Receiver (if any), then parameters, then results
    Positions(Vec<bool>),
    Flows(FlowSpec),
}

impl FuncSelection {
    pub fn mode(&self) -> AddressingMode {
        match self {
            FuncSelection::Positions(_) => AddressingMode::Positions,
            FuncSelection::Flows(_) => AddressingMode::Flows,
        }
    }
}

/// A resolved element of a callable (derived)
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct Element {
    pub kind: ElementKind,
    pub absolute: usize,
    pub relative: usize,
    pub name: String,
    pub type_string: String,
    pub type_kind: String,
}

/// All elements of a callable, split by kind (derived)
#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
pub struct FuncElements {
    #[facet(default)]
    pub receiver: Option<Element>,
    #[facet(default)]
    pub params: Vec<Element>,
    #[facet(default)]
    pub results: Vec<Element>,
}

impl FuncElements {
    /// Look up an element by its absolute position
    pub fn at(&self, absolute: usize) -> Option<&Element> {
        self.receiver
            .iter()
            .chain(&self.params)
            .chain(&self.results)
            .find(|e| e.absolute == absolute)
    }
}

/// Selects a free function, a type method or an interface method
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct FuncQualifier {
    pub basic: BasicQualifier,
    pub selection: FuncSelection,

    /// Callable name (derived)
    #[facet(default)]
    pub name: String,
    /// Resolved elements (derived)
    #[facet(default)]
    pub elements: Option<FuncElements>,
}

impl FuncQualifier {
    pub fn with_positions(basic: BasicQualifier, pos: Vec<bool>) -> Self {
        Self {
            basic,
            selection: FuncSelection::Positions(pos),
            name: String::new(),
            elements: None,
        }
    }

    pub fn with_flows(basic: BasicQualifier, flows: FlowSpec) -> Self {
        Self {
            basic,
            selection: FuncSelection::Flows(flows),
            name: String::new(),
            elements: None,
        }
    }

    pub fn mode(&self) -> AddressingMode {
        self.selection.mode()
    }

    pub fn positions(&self) -> Option<&[bool]> {
        match &self.selection {
            FuncSelection::Positions(pos) => Some(pos),
            FuncSelection::Flows(_) => None,
        }
    }

    pub fn flows(&self) -> Option<&FlowSpec> {
        match &self.selection {
            FuncSelection::Flows(flows) => Some(flows),
            FuncSelection::Positions(_) => None,
        }
    }

    pub fn validate(&self) -> Result<(), QualifierError> {
        self.basic.validate()?;
        if let FuncSelection::Flows(flows) = &self.selection {
            flows.validate()?;
        }
        Ok(())
    }

    /// Nothing selected: an all-false bitmap, or no flow blocks
    pub fn is_empty(&self) -> bool {
        match &self.selection {
            FuncSelection::Positions(pos) => !pos.iter().any(|&set| set),
            FuncSelection::Flows(flows) => flows.blocks.is_empty(),
        }
    }

    pub fn clear_meta(&mut self) {
        self.name.clear();
        self.elements = None;
    }
}

/// Type information for a selected struct field (derived)
#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
pub struct FieldMeta {
    #[facet(default)]
    pub type_string: String,
    #[facet(default)]
    pub kind: String,
}

/// Selects fields of a struct
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct StructQualifier {
    pub basic: BasicQualifier,
    /// Selected fields, by name
    #[facet(default)]
    pub fields: BTreeMap<String, FieldMeta>,

    /// Struct name (derived)
    #[facet(default)]
    pub name: String,
    /// Number of fields the struct declares (derived)
    #[facet(default)]
    pub total: usize,
    /// Number of fields not selected (derived)
    #[facet(default)]
    pub left: usize,
}

impl StructQualifier {
    pub fn new(basic: BasicQualifier) -> Self {
        Self {
            basic,
            fields: BTreeMap::new(),
            name: String::new(),
            total: 0,
            left: 0,
        }
    }

    /// Mark a field as selected
    pub fn select(mut self, field: impl Into<String>) -> Self {
        self.fields.insert(field.into(), FieldMeta::default());
        self
    }

    pub fn validate(&self) -> Result<(), QualifierError> {
        self.basic.validate()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn clear_meta(&mut self) {
        self.name.clear();
        self.total = 0;
        self.left = 0;
        for meta in self.fields.values_mut() {
            *meta = FieldMeta::default();
        }
    }
}

/// Selects a named type as a whole
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct TypeQualifier {
    pub basic: BasicQualifier,
    #[facet(default)]
    pub value: bool,

    /// Type name (derived)
    #[facet(default)]
    pub name: String,
    /// Type as written (derived)
    #[facet(default)]
    pub type_string: String,
    /// Underlying kind (derived)
    #[facet(default)]
    pub kind: String,
}

impl TypeQualifier {
    pub fn new(basic: BasicQualifier, value: bool) -> Self {
        Self {
            basic,
            value,
            name: String::new(),
            type_string: String::new(),
            kind: String::new(),
        }
    }

    pub fn validate(&self) -> Result<(), QualifierError> {
        self.basic.validate()
    }

    pub fn is_empty(&self) -> bool {
        !self.value
    }

    pub fn clear_meta(&mut self) {
        self.name.clear();
        self.type_string.clear();
        self.kind.clear();
    }
}

/// Discriminant of a [`Selector`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorKind {
    Func,
    Struct,
    Type,
}

impl std::fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SelectorKind::Func => "function",
            SelectorKind::Struct => "struct",
            SelectorKind::Type => "type",
        })
    }
}

/// A single marked code element
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
#[repr(u8)]
pub enum Selector {
    Func(FuncQualifier),
    Struct(StructQualifier),
    Type(TypeQualifier),
}

impl Selector {
    pub fn kind(&self) -> SelectorKind {
        match self {
            Selector::Func(_) => SelectorKind::Func,
            Selector::Struct(_) => SelectorKind::Struct,
            Selector::Type(_) => SelectorKind::Type,
        }
    }

    pub fn basic(&self) -> &BasicQualifier {
        match self {
            Selector::Func(q) => &q.basic,
            Selector::Struct(q) => &q.basic,
            Selector::Type(q) => &q.basic,
        }
    }

    pub fn validate(&self) -> Result<(), QualifierError> {
        match self {
            Selector::Func(q) => q.validate(),
            Selector::Struct(q) => q.validate(),
            Selector::Type(q) => q.validate(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Selector::Func(q) => q.is_empty(),
            Selector::Struct(q) => q.is_empty(),
            Selector::Type(q) => q.is_empty(),
        }
    }

    pub fn clear_meta(&mut self) {
        match self {
            Selector::Func(q) => q.clear_meta(),
            Selector::Struct(q) => q.clear_meta(),
            Selector::Type(q) => q.clear_meta(),
        }
    }
}

impl From<FuncQualifier> for Selector {
    fn from(q: FuncQualifier) -> Self {
        Selector::Func(q)
    }
}

impl From<StructQualifier> for Selector {
    fn from(q: StructQualifier) -> Self {
        Selector::Struct(q)
    }
}

impl From<TypeQualifier> for Selector {
    fn from(q: TypeQualifier) -> Self {
        Selector::Type(q)
    }
}
