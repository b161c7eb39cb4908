use std::collections::HashSet;

use super::{Graph, GraphError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterParameters {
    pub node_focus: Option<String>,
    pub secondary_focus: Option<String>,
    pub label_filter: Option<String>,
    pub min_weight: u32,
    pub hide_disconnected: bool,
}

impl Default for FilterParameters {
    fn default() -> Self {
        Self {
            node_focus: None,
            secondary_focus: None,
            label_filter: None,
            min_weight: 1,
            hide_disconnected: false,
        }
    }
}

impl FilterParameters {
    /// Reports focus ids that do not exist in `graph`. Filtering with them is
    /// still valid and simply yields no edges.
    pub fn check(&self, graph: &Graph) -> Result<(), GraphError> {
        for focus in [&self.node_focus, &self.secondary_focus]
            .into_iter()
            .flatten()
        {
            if !graph.contains(focus) {
                return Err(GraphError::UnknownFocus(focus.clone()));
            }
        }
        Ok(())
    }
}

pub fn filter(graph: &Graph, params: &FilterParameters) -> Graph {
    let min_weight = params.min_weight.max(1);

    let edges = graph
        .edges
        .iter()
        .filter(|edge| edge.weight >= min_weight)
        .filter(|edge| {
            params
                .label_filter
                .as_deref()
                .is_none_or(|label| edge.label == label)
        })
        .filter(|edge| params.node_focus.as_deref().is_none_or(|id| edge.touches(id)))
        .filter(|edge| {
            params
                .secondary_focus
                .as_deref()
                .is_none_or(|id| edge.touches(id))
        })
        .cloned()
        .collect::<Vec<_>>();

    let nodes = if params.hide_disconnected {
        let touched = edges
            .iter()
            .flat_map(|edge| [edge.source.as_str(), edge.target.as_str()])
            .collect::<HashSet<_>>();
        graph
            .nodes
            .iter()
            .filter(|(id, _)| touched.contains(id.as_str()))
            .map(|(id, node)| (id.clone(), node.clone()))
            .collect()
    } else {
        graph.nodes.clone()
    };

    Graph { nodes, edges }
}
