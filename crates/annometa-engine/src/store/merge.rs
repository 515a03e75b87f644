//! Meta-annotation flattening
//!
//! Expands the declared entries of an element into the `all` partition by a
//! breadth-first walk over the meta-annotations declared on each annotation
//! type. Closer sources win: an identity keeps the values of its shallowest
//! occurrence and only gains attributes it did not have yet. Among sources
//! at the same depth the first one discovered wins, which follows the
//! declaration order of the element's annotations and then of each
//! contract's meta-annotations.

use std::collections::VecDeque;
use std::fmt;

use annometa_types::{
    AnnotationContract, AnnotationName, AttributeValues, ContractRegistry, MetaAnnotation,
};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::entry::AnnotationEntry;
use crate::config::EngineConfig;

/// Why a meta-annotation chain was cut short
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The chain leads back to an annotation already on it
    Cycle,
    /// The chain exceeds the configured depth limit
    DepthLimit,
}

/// A build-time defect found while flattening meta-annotations
///
/// Recorded on the metadata and logged; never surfaced as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaDiagnostic {
    /// What happened
    pub kind: DiagnosticKind,
    /// Chain of identities, ending with the one that was not followed
    pub chain: Vec<AnnotationName>,
}

impl fmt::Display for MetaDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chain = self
            .chain
            .iter()
            .map(AnnotationName::as_str)
            .collect::<Vec<_>>()
            .join(" -> ");
        match self.kind {
            DiagnosticKind::Cycle => write!(f, "cyclic meta-annotation: {}", chain),
            DiagnosticKind::DepthLimit => write!(f, "meta-annotation chain truncated: {}", chain),
        }
    }
}

/// Flattened `all` partition and the diagnostics produced on the way
pub(crate) struct Resolution {
    pub all: IndexMap<AnnotationName, AnnotationEntry>,
    pub diagnostics: Vec<MetaDiagnostic>,
}

/// Flatten `declared` through the meta-annotations registered in `registry`
pub(crate) fn resolve(
    declared: &IndexMap<AnnotationName, AnnotationEntry>,
    registry: &ContractRegistry,
    config: &EngineConfig,
) -> Resolution {
    let mut all = declared.clone();
    let mut diagnostics = Vec::new();
    let mut queue: VecDeque<Vec<AnnotationName>> =
        declared.keys().map(|name| vec![name.clone()]).collect();

    while let Some(path) = queue.pop_front() {
        let Some(parent) = path.last() else {
            continue;
        };
        let Some(contract) = registry.get(parent) else {
            continue;
        };
        // Depth of the meta-annotations about to be discovered
        let depth = path.len();

        for meta in &contract.meta_annotations {
            if path.contains(&meta.name) {
                let diagnostic = truncated(DiagnosticKind::Cycle, &path, &meta.name);
                warn!("{}", diagnostic);
                diagnostics.push(diagnostic);
                continue;
            }
            if depth > config.max_meta_depth {
                let diagnostic = truncated(DiagnosticKind::DepthLimit, &path, &meta.name);
                warn!(limit = config.max_meta_depth, "{}", diagnostic);
                diagnostics.push(diagnostic);
                continue;
            }

            let values = contributed_values(contract, meta, all.get(parent));
            match all.get_mut(&meta.name) {
                Some(existing) => existing.fill_missing(values),
                None => {
                    let mut child = path.clone();
                    child.push(meta.name.clone());
                    all.insert(
                        meta.name.clone(),
                        AnnotationEntry::meta(meta.name.clone(), values, child.clone()),
                    );
                    queue.push_back(child);
                }
            }
        }
    }

    Resolution { all, diagnostics }
}

/// Values `parent` contributes to `meta`: the values declared on the
/// meta-annotation, overridden by aliased attributes explicitly set on the
/// parent entry.
fn contributed_values(
    parent: &AnnotationContract,
    meta: &MetaAnnotation,
    parent_entry: Option<&AnnotationEntry>,
) -> AttributeValues {
    let mut values = meta.values.clone();
    if let Some(entry) = parent_entry {
        for (own, target) in parent.aliases_for(meta.name.as_str()) {
            if let Some(value) = entry.get(own) {
                values.insert(target.to_string(), value.clone());
            }
        }
    }
    values
}

fn truncated(
    kind: DiagnosticKind,
    path: &[AnnotationName],
    next: &AnnotationName,
) -> MetaDiagnostic {
    let mut chain = path.to_vec();
    chain.push(next.clone());
    MetaDiagnostic { kind, chain }
}

/// Map each stereotype in `all` to the annotations in `all` whose
/// meta-annotation closure contains it, in `all` order.
pub(crate) fn stereotype_index(
    all: &IndexMap<AnnotationName, AnnotationEntry>,
    registry: &ContractRegistry,
) -> IndexMap<AnnotationName, Vec<AnnotationName>> {
    let mut index: IndexMap<AnnotationName, Vec<AnnotationName>> = IndexMap::new();
    for name in all.keys() {
        for stereotype in meta_closure(name, registry) {
            if all.contains_key(&stereotype) {
                index.entry(stereotype).or_default().push(name.clone());
            }
        }
    }
    index
}

/// Every annotation reachable from `root` through meta-annotations,
/// excluding `root` itself, in breadth-first order.
fn meta_closure(root: &AnnotationName, registry: &ContractRegistry) -> Vec<AnnotationName> {
    let mut seen = FxHashSet::default();
    seen.insert(root.clone());
    let mut closure = Vec::new();
    let mut queue = VecDeque::from([root.clone()]);

    while let Some(name) = queue.pop_front() {
        let Some(contract) = registry.get(&name) else {
            continue;
        };
        for meta in &contract.meta_annotations {
            if seen.insert(meta.name.clone()) {
                closure.push(meta.name.clone());
                queue.push_back(meta.name.clone());
            }
        }
    }
    closure
}
