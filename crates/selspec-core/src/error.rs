//! Error types

use crate::qualifier::{AddressingMode, SelectorKind};
use crate::spec::Kind;

/// Broad class of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The document itself is malformed
    Structural,
    /// A selection does not resolve against loaded metadata
    Reference,
    /// The registry was wired incorrectly
    Configuration,
}

/// Problems a qualifier can detect on its own, without context
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QualifierError {
    #[error("qualifier has an empty package path")]
    EmptyPath,
    #[error("qualifier has an empty version")]
    EmptyVersion,
    #[error("qualifier has an empty element ID")]
    EmptyId,
    #[error("flow block {block}: input has {inp} positions but output has {out}")]
    FlowLengthMismatch { block: usize, inp: usize, out: usize },
    #[error("flow block {block}: no input position selected")]
    FlowInputEmpty { block: usize },
    #[error("flow block {block}: no output position selected")]
    FlowOutputEmpty { block: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Structural
    #[error("{what} name {raw:?} is empty after normalization")]
    EmptyName { what: &'static str, raw: String },

    #[error("spec {spec:?} already has a model named {model:?}")]
    DuplicateModel { spec: String, model: String },

    #[error("model {model:?} has more than one method named {method:?}")]
    DuplicateMethod { model: String, method: String },

    #[error("model {model:?} of kind {kind} must have {expected} methods, found {found}")]
    MethodCountMismatch {
        model: String,
        kind: Kind,
        expected: usize,
        found: usize,
    },

    #[error("model {model:?} of kind {kind}: method {index} should be {expected}, found {found}")]
    MethodMismatch {
        model: String,
        kind: Kind,
        index: usize,
        expected: String,
        found: String,
    },

    #[error("model {model:?}, method {method:?}, selector {index}: {source}")]
    InvalidSelector {
        model: String,
        method: String,
        index: usize,
        #[source]
        source: QualifierError,
    },

    #[error("model {model:?}, method {method:?}: func selectors must use {expected} addressing")]
    WrongAddressingMode {
        model: String,
        method: String,
        expected: AddressingMode,
    },

    #[error("model {model:?}, method {method:?}: {kind} selectors are not supported here")]
    UnsupportedSelector {
        model: String,
        method: String,
        kind: SelectorKind,
    },

    #[error("position bitmap of length {found} does not fit a position list of length {expected}")]
    PositionLengthMismatch { expected: usize, found: usize },

    // Reference
    #[error("source not found: {path}@{version}")]
    SourceNotFound { path: String, version: String },

    #[error("element not found: {id:?} in {path}@{version}")]
    ElementNotFound {
        path: String,
        version: String,
        id: String,
    },

    #[error("field {field:?} not found on struct {id:?} in {path}@{version}")]
    FieldNotFound {
        path: String,
        version: String,
        id: String,
        field: String,
    },

    #[error("selection on {id:?} in {path}@{version} has {found} positions, expected {expected}")]
    PositionCountMismatch {
        path: String,
        version: String,
        id: String,
        expected: usize,
        found: usize,
    },

    #[error("failed to load {path}@{version}: {message}")]
    Loader {
        path: String,
        version: String,
        message: String,
    },

    // Configuration
    #[error("a handler for kind {0} is already registered")]
    DuplicateHandler(Kind),

    #[error("handler for kind {actual} registered under kind {key}")]
    HandlerKindMismatch { key: Kind, actual: Kind },

    #[error("model-kind registry is already initialized")]
    AlreadyInitialized,

    #[error("no handler registered for kind {0}")]
    UnregisteredKind(Kind),
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::EmptyName { .. }
            | Error::DuplicateModel { .. }
            | Error::DuplicateMethod { .. }
            | Error::MethodCountMismatch { .. }
            | Error::MethodMismatch { .. }
            | Error::InvalidSelector { .. }
            | Error::WrongAddressingMode { .. }
            | Error::UnsupportedSelector { .. }
            | Error::PositionLengthMismatch { .. } => ErrorCategory::Structural,

            Error::SourceNotFound { .. }
            | Error::ElementNotFound { .. }
            | Error::FieldNotFound { .. }
            | Error::PositionCountMismatch { .. }
            | Error::Loader { .. } => ErrorCategory::Reference,

            Error::DuplicateHandler(_)
            | Error::HandlerKindMismatch { .. }
            | Error::AlreadyInitialized
            | Error::UnregisteredKind(_) => ErrorCategory::Configuration,
        }
    }

    pub(crate) fn element_not_found(path: &str, version: &str, id: &str) -> Self {
        Error::ElementNotFound {
            path: path.to_string(),
            version: version.to_string(),
            id: id.to_string(),
        }
    }

    pub(crate) fn source_not_found(path: &str, version: &str) -> Self {
        Error::SourceNotFound {
            path: path.to_string(),
            version: version.to_string(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
