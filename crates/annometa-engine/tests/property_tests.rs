//! Property-based tests for meta-annotation resolution.
//!
//! Random meta-annotation graphs (cycles and self-loops included) are
//! resolved and checked against an independent breadth-first walk.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;

use proptest::prelude::*;

use annometa_engine::{ElementMetadata, MetadataBuilder, Scope, SynthesisEngine};
use annometa_types::{
    AnnotationContract, AttributeSpec, AttributeType, AttributeValue, ContractRegistry,
};

const NODES: usize = 6;

fn node(i: usize) -> String {
    format!("com.acme.N{}", i)
}

/// Strategy for meta-annotation edges: `edges[i]` lists the metas of node `i`.
fn meta_graph() -> impl Strategy<Value = Vec<Vec<usize>>> {
    prop::collection::vec(prop::collection::vec(0..NODES, 0..4), NODES)
}

/// Strategy for declared annotations and their `x` values.
fn declarations() -> impl Strategy<Value = BTreeMap<usize, i64>> {
    prop::collection::btree_map(0..NODES, -1000i64..1000, 1..4)
}

fn registry(edges: &[Vec<usize>]) -> Arc<ContractRegistry> {
    let mut registry = ContractRegistry::new();
    for (i, metas) in edges.iter().enumerate() {
        let mut contract = AnnotationContract::new(node(i))
            .attribute(AttributeSpec::new("x", AttributeType::Long).with_default(i as i64));
        for &j in metas {
            let values = [("x".to_string(), AttributeValue::Int((i * 10 + j) as i64))]
                .into_iter()
                .collect();
            contract = contract.annotated_with_values(node(j), values);
        }
        registry.register(contract).unwrap();
    }
    Arc::new(registry)
}

fn build(edges: &[Vec<usize>], declared: &BTreeMap<usize, i64>) -> ElementMetadata {
    declared
        .iter()
        .fold(MetadataBuilder::new(), |builder, (&i, &x)| {
            builder.declare_with(node(i), [("x", x)])
        })
        .build(registry(edges))
        .unwrap()
}

/// Shortest meta-annotation distance from any declared node.
fn distances(edges: &[Vec<usize>], declared: &BTreeMap<usize, i64>) -> BTreeMap<usize, usize> {
    let mut distance: BTreeMap<usize, usize> = declared.keys().map(|&i| (i, 0)).collect();
    let mut queue: VecDeque<usize> = declared.keys().copied().collect();
    while let Some(i) = queue.pop_front() {
        let next = distance[&i] + 1;
        for &j in &edges[i] {
            if !distance.contains_key(&j) {
                distance.insert(j, next);
                queue.push_back(j);
            }
        }
    }
    distance
}

proptest! {
    /// `all` holds exactly the reachable annotations, each once.
    #[test]
    fn all_is_reachable_closure(edges in meta_graph(), declared in declarations()) {
        let metadata = build(&edges, &declared);
        let expected: BTreeSet<String> =
            distances(&edges, &declared).keys().map(|&i| node(i)).collect();
        let actual: BTreeSet<String> = metadata
            .get_annotation_names()
            .iter()
            .map(|n| n.to_string())
            .collect();

        prop_assert_eq!(actual.len(), metadata.len(Scope::All));
        prop_assert_eq!(actual, expected);
    }

    /// Every declared annotation is in `all` with its declared value.
    #[test]
    fn declared_values_win(edges in meta_graph(), declared in declarations()) {
        let metadata = build(&edges, &declared);
        prop_assert_eq!(metadata.len(Scope::Declared), declared.len());
        for (&i, &x) in &declared {
            prop_assert!(metadata.is_declared_annotation_present(&node(i)));
            prop_assert!(metadata.is_annotation_present(&node(i)));
            prop_assert_eq!(metadata.long_value(&node(i), "x").unwrap(), Some(x));
        }
    }

    /// Meta entries sit at their shortest distance from the element.
    #[test]
    fn entries_at_shortest_depth(edges in meta_graph(), declared in declarations()) {
        let metadata = build(&edges, &declared);
        for (i, depth) in distances(&edges, &declared) {
            let entry = metadata.entry(&node(i)).unwrap();
            prop_assert_eq!(entry.depth(), depth);
            prop_assert_eq!(entry.is_declared(), depth == 0);
        }
    }

    /// Truncations within the depth limit are always cycles.
    #[test]
    fn only_cycles_are_truncated(edges in meta_graph(), declared in declarations()) {
        let metadata = build(&edges, &declared);
        for diagnostic in metadata.diagnostics() {
            prop_assert_eq!(diagnostic.kind, annometa_engine::DiagnosticKind::Cycle);
            let last = diagnostic.chain.last().unwrap();
            prop_assert!(diagnostic.chain[..diagnostic.chain.len() - 1].contains(last));
        }
    }

    /// Synthesis yields one instance per entry, in order, and is idempotent.
    #[test]
    fn synthesize_all_follows_all(edges in meta_graph(), declared in declarations()) {
        let metadata = build(&edges, &declared);
        let engine = SynthesisEngine::default();
        let first = engine.synthesize_all(&metadata).unwrap();
        let second = engine.synthesize_all(&metadata).unwrap();

        let names: Vec<_> = first.iter().map(|a| a.annotation_type().clone()).collect();
        prop_assert_eq!(names, metadata.get_annotation_names());
        prop_assert_eq!(first, second);
        prop_assert_eq!(engine.cache_len(), metadata.len(Scope::All));
    }

    /// Snapshots restore both partitions in order.
    #[test]
    fn snapshot_roundtrip(edges in meta_graph(), declared in declarations()) {
        let metadata = build(&edges, &declared);
        let json = metadata.to_json().unwrap();
        let restored = ElementMetadata::from_json(&json, registry(&edges)).unwrap();
        prop_assert_eq!(restored.snapshot(), metadata.snapshot());
    }
}
