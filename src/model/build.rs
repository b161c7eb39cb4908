use indexmap::IndexMap;
use indexmap::map::Entry;
use tracing::{debug, info, warn};

use crate::records::RelationRecord;

use super::{Category, Edge, Graph, GraphError, Node};

fn register_node(nodes: &mut IndexMap<String, Node>, id: &str, category: Category) {
    match nodes.get(id) {
        Some(existing) if existing.category != category => {
            debug!(
                id,
                kept = existing.category.label(),
                seen = category.label(),
                "node appears on both sides of relations"
            );
        }
        Some(_) => {}
        None => {
            nodes.insert(
                id.to_owned(),
                Node {
                    id: id.to_owned(),
                    category,
                },
            );
        }
    }
}

pub fn build(records: &[RelationRecord]) -> Result<Graph, GraphError> {
    if records.is_empty() {
        return Err(GraphError::EmptyInput);
    }

    let mut nodes = IndexMap::new();
    let mut grouped: IndexMap<(String, String, String), Edge> = IndexMap::new();
    let mut skipped = 0usize;

    for record in records {
        let source = record.source.trim();
        let target = record.target.trim();
        let label = record.label.trim();
        if source.is_empty() || target.is_empty() || label.is_empty() {
            skipped += 1;
            continue;
        }

        register_node(&mut nodes, source, Category::Source);
        register_node(&mut nodes, target, Category::Target);

        let key = (source.to_owned(), target.to_owned(), label.to_owned());
        let edge = match grouped.entry(key) {
            Entry::Occupied(entry) => {
                let edge = entry.into_mut();
                edge.weight += 1;
                edge
            }
            Entry::Vacant(entry) => entry.insert(Edge {
                source: source.to_owned(),
                target: target.to_owned(),
                label: label.to_owned(),
                weight: 1,
                attributes: Vec::new(),
            }),
        };
        if let Some(attribute) = record.attribute() {
            edge.attributes.push(attribute);
        }
    }

    if skipped > 0 {
        warn!(skipped, "skipped relation records with a blank source, target or label");
    }

    if grouped.is_empty() {
        return Err(GraphError::EmptyInput);
    }

    let graph = Graph {
        nodes,
        edges: grouped.into_values().collect(),
    };
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        records = records.len(),
        "built relation graph"
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(source: &str, target: &str, label: &str) -> RelationRecord {
        RelationRecord::new(source, target, label)
    }

    #[test]
    fn collapses_repeated_relations_into_weighted_edges() {
        let records = vec![
            record("A", "X", "win"),
            record("A", "X", "win"),
            record("B", "X", "loss"),
        ];

        let graph = build(&records).unwrap();
        let ids = graph.nodes.keys().cloned().collect::<Vec<_>>();
        assert_eq!(ids, vec!["A", "X", "B"]);
        assert_eq!(graph.edges.len(), 2);
        assert_eq!(
            (graph.edges[0].source.as_str(), graph.edges[0].target.as_str()),
            ("A", "X")
        );
        assert_eq!(graph.edges[0].label, "win");
        assert_eq!(graph.edges[0].weight, 2);
        assert_eq!(graph.edges[1].label, "loss");
        assert_eq!(graph.edges[1].weight, 1);
    }

    #[test]
    fn weights_match_record_counts_per_triple() {
        let triples = [
            ("A", "X", "win"),
            ("B", "Y", "win"),
            ("A", "X", "loss"),
            ("A", "X", "win"),
            ("B", "Y", "win"),
            ("C", "X", "draw"),
            ("A", "X", "win"),
        ];
        let records = triples
            .iter()
            .map(|(s, t, l)| record(s, t, l))
            .collect::<Vec<_>>();

        let graph = build(&records).unwrap();
        for edge in &graph.edges {
            let expected = triples
                .iter()
                .filter(|(s, t, l)| *s == edge.source && *t == edge.target && *l == edge.label)
                .count();
            assert_eq!(edge.weight as usize, expected);
        }
        let total: u32 = graph.edges.iter().map(|edge| edge.weight).sum();
        assert_eq!(total as usize, triples.len());
    }

    #[test]
    fn attributes_follow_input_order() {
        let records = vec![
            record("A", "X", "win").with_detail("Alice").with_detail("Opening"),
            record("B", "X", "win").with_detail("Bob"),
            record("A", "X", "win"),
            record("A", "X", "win").with_detail("Carol"),
        ];

        let graph = build(&records).unwrap();
        assert_eq!(graph.edges[0].attributes, vec!["Alice / Opening", "Carol"]);
        assert_eq!(graph.edges[0].weight, 3);
        assert_eq!(graph.edges[1].attributes, vec!["Bob"]);
    }

    #[test]
    fn categories_follow_first_appearance() {
        let records = vec![record("A", "X", "win"), record("X", "B", "win")];

        let graph = build(&records).unwrap();
        assert_eq!(graph.node("A").unwrap().category, Category::Source);
        assert_eq!(graph.node("X").unwrap().category, Category::Target);
        assert_eq!(graph.node("B").unwrap().category, Category::Target);
    }

    #[test]
    fn build_is_deterministic() {
        let records = vec![
            record("A", "X", "win"),
            record("B", "Y", "loss"),
            record("A", "Y", "win"),
            record("B", "Y", "loss"),
        ];
        assert_eq!(build(&records).unwrap(), build(&records).unwrap());
    }

    #[test]
    fn empty_input_is_reported() {
        assert_eq!(build(&[]), Err(GraphError::EmptyInput));
        assert_eq!(build(&[record(" ", "X", "win")]), Err(GraphError::EmptyInput));
    }
}
