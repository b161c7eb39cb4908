mod build;
mod filter;

use indexmap::{IndexMap, IndexSet};
use thiserror::Error;

pub use build::build;
pub use filter::{FilterParameters, filter};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Source,
    Target,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Target => "target",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub category: Category,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub label: String,
    pub weight: u32,
    pub attributes: Vec<String>,
}

impl Edge {
    pub fn touches(&self, id: &str) -> bool {
        self.source == id || self.target == id
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("no relation records to build a graph from")]
    EmptyInput,
    #[error("focus node {0:?} is not part of the graph")]
    UnknownFocus(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Graph {
    pub nodes: IndexMap<String, Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn labels(&self) -> Vec<String> {
        self.edges
            .iter()
            .map(|edge| edge.label.as_str())
            .collect::<IndexSet<_>>()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    pub fn max_weight(&self) -> u32 {
        self.edges.iter().map(|edge| edge.weight).max().unwrap_or(1)
    }

    pub fn degree(&self, id: &str) -> usize {
        self.edges.iter().filter(|edge| edge.touches(id)).count()
    }
}
