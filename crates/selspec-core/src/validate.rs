//! Name normalization, structural validation and pruning

use crate::error::{Error, Result};
use crate::registry::Registry;
use crate::spec::Spec;
use std::collections::HashSet;
use tracing::{debug, info};

/// Canonical identifier form of a name.
///
/// Everything that is not an ASCII letter or digit separates words; each
/// word gets an upper-case first letter and the words are joined. Anything
/// before the first letter is dropped. `"get url"` becomes `"GetUrl"`,
/// `"http-header_write"` becomes `"HttpHeaderWrite"`.
///
/// `what` names the kind of node for the error message.
pub fn normalize_name(what: &'static str, raw: &str) -> Result<String> {
    let trimmed = raw.trim_start_matches(|c: char| !c.is_ascii_alphabetic());
    let mut out = String::with_capacity(trimmed.len());
    for word in trimmed.split(|c: char| !c.is_ascii_alphanumeric()) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
        }
    }
    if out.is_empty() {
        return Err(Error::EmptyName {
            what,
            raw: raw.to_string(),
        });
    }
    Ok(out)
}

/// Normalize the names of the spec, its models and their methods in place.
///
/// Every name is computed before any is assigned, so on error the spec is
/// left as it was.
pub fn normalize(spec: &mut Spec) -> Result<()> {
    let spec_name = normalize_name("spec", &spec.name)?;
    let model_names = spec
        .models
        .iter()
        .map(|model| {
            let methods = model
                .methods
                .iter()
                .map(|method| normalize_name("method", &method.name))
                .collect::<Result<Vec<_>>>()?;
            Ok((normalize_name("model", &model.name)?, methods))
        })
        .collect::<Result<Vec<_>>>()?;

    spec.name = spec_name;
    for (model, (name, methods)) in spec.models.iter_mut().zip(model_names) {
        model.name = name;
        for (method, name) in model.methods.iter_mut().zip(methods) {
            method.name = name;
        }
    }
    Ok(())
}

/// Check a normalized spec: unique names, per-kind rules, qualifiers.
pub fn validate(spec: &Spec, registry: &Registry) -> Result<()> {
    if spec.name.is_empty() {
        return Err(Error::EmptyName {
            what: "spec",
            raw: String::new(),
        });
    }

    let mut seen_models = HashSet::new();
    for model in &spec.models {
        if !seen_models.insert(model.name.as_str()) {
            return Err(Error::DuplicateModel {
                spec: spec.name.clone(),
                model: model.name.clone(),
            });
        }
    }

    for model in &spec.models {
        let mut seen_methods = HashSet::new();
        for method in &model.methods {
            if !seen_methods.insert(method.name.as_str()) {
                return Err(Error::DuplicateMethod {
                    model: model.name.clone(),
                    method: method.name.clone(),
                });
            }
        }

        registry.handler(model.kind)?.validate(model)?;

        for method in &model.methods {
            for (index, selector) in method.selectors.iter().enumerate() {
                selector
                    .validate()
                    .map_err(|source| Error::InvalidSelector {
                        model: model.name.clone(),
                        method: method.name.clone(),
                        index,
                        source,
                    })?;
            }
        }
    }

    debug!(
        "Spec {} is valid ({} models, {} selectors)",
        spec.name,
        spec.models.len(),
        spec.selector_count()
    );
    Ok(())
}

/// Remove selectors that select nothing. Returns how many were removed.
pub fn cleanup(spec: &mut Spec) -> usize {
    let mut pruned = 0;
    for model in &mut spec.models {
        for method in &mut model.methods {
            let before = method.selectors.len();
            method.selectors.retain(|s| !s.is_empty());
            let removed = before - method.selectors.len();
            if removed > 0 {
                debug!(
                    "Pruned {} empty selectors from {}.{}",
                    removed, model.name, method.name
                );
            }
            pruned += removed;
        }
    }
    if pruned > 0 {
        info!("Pruned {} empty selectors from spec {}", pruned, spec.name);
    }
    pruned
}

/// Normalize, validate, then prune. Returns the number of pruned selectors.
///
/// The spec is only changed when every step succeeds.
pub fn prepare(spec: &mut Spec, registry: &Registry) -> Result<usize> {
    let mut prepared = spec.clone();
    normalize(&mut prepared)?;
    validate(&prepared, registry)?;
    let pruned = cleanup(&mut prepared);
    *spec = prepared;
    Ok(pruned)
}
