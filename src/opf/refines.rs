//! `refines` cycle detection (§9 "Refines graph"): meta-element IDs are
//! nodes, `refines` targets are edges. Built as a flat `petgraph::DiGraph`
//! rather than a hand-rolled stack — this crate already depends on
//! `petgraph` for the same kind of cycle-bearing relation elsewhere, and
//! `petgraph::algo::is_cyclic_directed` is the off-the-shelf equivalent of
//! the DFS-with-on-stack-set the spec describes.

use std::collections::HashMap;

use petgraph::graph::DiGraph;
use petgraph::algo::is_cyclic_directed;

use crate::diagnostic::Location;
use crate::message_registry::emit;
use crate::opf::types::MetaElement;
use crate::Diagnostic;

/// Emits OPF-065 once if the `refines` relation among `meta_elements`
/// contains a cycle. Meta elements without an `id`, or whose `refines` does
/// not target a known id, are not graph edges (a dangling `refines` is not a
/// cycle and is left to other rules).
pub fn detect_refines_cycle(
    meta_elements: &[MetaElement],
    location: &Location,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut graph = DiGraph::<&str, ()>::new();
    let mut index_of = HashMap::new();
    for meta in meta_elements {
        if let Some(id) = &meta.id {
            index_of.entry(id.as_str()).or_insert_with(|| graph.add_node(id.as_str()));
        }
    }
    for meta in meta_elements {
        let (Some(id), Some(refines)) = (&meta.id, &meta.refines) else {
            continue;
        };
        let target = refines.strip_prefix('#').unwrap_or(refines);
        if let (Some(&from), Some(&to)) = (index_of.get(id.as_str()), index_of.get(target)) {
            graph.add_edge(from, to, ());
        }
    }
    if is_cyclic_directed(&graph) {
        emit(
            diagnostics,
            "OPF-065",
            "refines relation among metadata elements contains a cycle",
            Some(location.clone()),
            None,
            None,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(id: &str, refines: Option<&str>) -> MetaElement {
        MetaElement {
            property: Some("role".to_string()),
            scheme: None,
            refines: refines.map(str::to_string),
            id: Some(id.to_string()),
            value: String::new(),
            name: None,
            content: None,
            location: Location::new("content.opf"),
        }
    }

    #[test]
    fn no_cycle_for_acyclic_refines_chain() {
        let metas = vec![meta("m1", None), meta("m2", Some("#m1"))];
        let mut diags = Vec::new();
        detect_refines_cycle(&metas, &Location::new("content.opf"), &mut diags);
        assert!(diags.is_empty());
    }

    #[test]
    fn detects_two_node_cycle() {
        let metas = vec![meta("m1", Some("#m2")), meta("m2", Some("#m1"))];
        let mut diags = Vec::new();
        detect_refines_cycle(&metas, &Location::new("content.opf"), &mut diags);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].id, "OPF-065");
    }

    #[test]
    fn dangling_refines_target_is_not_a_cycle() {
        let metas = vec![meta("m1", Some("#missing"))];
        let mut diags = Vec::new();
        detect_refines_cycle(&metas, &Location::new("content.opf"), &mut diags);
        assert!(diags.is_empty());
    }
}
