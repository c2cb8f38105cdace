//! Built-in handlers, one per [`Kind`]

use crate::error::{Error, Result};
use crate::qualifier::{AddressingMode, Selector, SelectorKind};
use crate::registry::{Handler, MethodShape, check_addressing, check_skeleton};
use crate::spec::{Kind, Model};
use std::sync::Arc;

/// Every built-in handler, in [`Kind::ALL`] order
pub fn builtins() -> Vec<Arc<dyn Handler>> {
    vec![
        Arc::new(HeaderWriteHandler),
        Arc::new(RedirectHandler),
        Arc::new(ResponseBodyHandler),
        Arc::new(TaintTrackingHandler),
        Arc::new(UntrustedFlowSourceHandler),
    ]
}

/// Calls that set an HTTP response header
#[derive(Debug, Clone, Copy)]
pub struct HeaderWriteHandler;

impl HeaderWriteHandler {
    const SHAPES: &'static [MethodShape] = &[
        MethodShape::named("GetName"),
        MethodShape::named("GetValue"),
        MethodShape::named("GetResponseWriter"),
    ];
}

impl Handler for HeaderWriteHandler {
    fn kind(&self) -> Kind {
        Kind::HeaderWrite
    }

    fn addressing_mode(&self) -> AddressingMode {
        AddressingMode::Positions
    }

    fn shapes(&self) -> &'static [MethodShape] {
        Self::SHAPES
    }

    fn validate(&self, model: &Model) -> Result<()> {
        check_skeleton(self, model)?;
        check_addressing(self, model)
    }
}

/// Calls that issue an HTTP redirect
#[derive(Debug, Clone, Copy)]
pub struct RedirectHandler;

impl RedirectHandler {
    const SHAPES: &'static [MethodShape] = &[
        MethodShape::named("GetUrl"),
        MethodShape::named("GetResponseWriter"),
    ];
}

impl Handler for RedirectHandler {
    fn kind(&self) -> Kind {
        Kind::Redirect
    }

    fn addressing_mode(&self) -> AddressingMode {
        AddressingMode::Positions
    }

    fn shapes(&self) -> &'static [MethodShape] {
        Self::SHAPES
    }

    fn validate(&self, model: &Model) -> Result<()> {
        check_skeleton(self, model)?;
        check_addressing(self, model)
    }
}

/// Calls that write an HTTP response body
#[derive(Debug, Clone, Copy)]
pub struct ResponseBodyHandler;

impl ResponseBodyHandler {
    const SHAPES: &'static [MethodShape] = &[
        MethodShape::whole("Body"),
        MethodShape::named("GetAContentType"),
        MethodShape::named("GetResponseWriter"),
    ];
}

impl Handler for ResponseBodyHandler {
    fn kind(&self) -> Kind {
        Kind::ResponseBody
    }

    fn addressing_mode(&self) -> AddressingMode {
        AddressingMode::Positions
    }

    fn shapes(&self) -> &'static [MethodShape] {
        Self::SHAPES
    }

    fn validate(&self, model: &Model) -> Result<()> {
        check_skeleton(self, model)?;
        check_addressing(self, model)
    }
}

/// Functions through which taint propagates
#[derive(Debug, Clone, Copy)]
pub struct TaintTrackingHandler;

impl TaintTrackingHandler {
    const SHAPES: &'static [MethodShape] = &[MethodShape::whole("Steps")];
}

impl Handler for TaintTrackingHandler {
    fn kind(&self) -> Kind {
        Kind::TaintTracking
    }

    fn addressing_mode(&self) -> AddressingMode {
        AddressingMode::Flows
    }

    fn shapes(&self) -> &'static [MethodShape] {
        Self::SHAPES
    }

    fn validate(&self, model: &Model) -> Result<()> {
        check_skeleton(self, model)?;
        // Flow blocks only make sense on callables
        for method in &model.methods {
            let unsupported = method
                .selectors
                .iter()
                .map(Selector::kind)
                .find(|&kind| kind != SelectorKind::Func);
            if let Some(kind) = unsupported {
                return Err(Error::UnsupportedSelector {
                    model: model.name.clone(),
                    method: method.name.clone(),
                    kind,
                });
            }
        }
        check_addressing(self, model)
    }
}

/// Functions, fields and types that yield untrusted data
#[derive(Debug, Clone, Copy)]
pub struct UntrustedFlowSourceHandler;

impl UntrustedFlowSourceHandler {
    const SHAPES: &'static [MethodShape] = &[MethodShape::whole("Sources")];
}

impl Handler for UntrustedFlowSourceHandler {
    fn kind(&self) -> Kind {
        Kind::UntrustedFlowSource
    }

    fn addressing_mode(&self) -> AddressingMode {
        AddressingMode::Positions
    }

    fn shapes(&self) -> &'static [MethodShape] {
        Self::SHAPES
    }

    fn validate(&self, model: &Model) -> Result<()> {
        check_skeleton(self, model)?;
        check_addressing(self, model)
    }
}
