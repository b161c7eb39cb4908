use eframe::egui::Vec2;
use tracing::debug;

use crate::config::Settings;
use crate::layout::{LayoutSolver, SolverState};
use crate::model::{Category, FilterParameters, Graph, GraphError, filter};

#[derive(Clone, Debug, PartialEq)]
pub struct NodeView {
    pub id: String,
    pub category: Category,
    pub position: Vec2,
    pub radius: f32,
    pub pinned: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeView {
    pub source: Vec2,
    pub target: Vec2,
    pub label: String,
    pub weight: u32,
    pub attributes: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderSnapshot {
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
    pub node_count: usize,
    pub edge_count: usize,
}

/// Owns the full graph, the filter parameters, the derived visible subgraph
/// and the solver. The visible subgraph is recomputed lazily when either
/// input's generation moves past the one it was derived from.
pub struct GraphEngine {
    full: Graph,
    full_generation: u64,
    params: FilterParameters,
    params_generation: u64,
    visible: Graph,
    derived_from: Option<(u64, u64)>,
    solver: LayoutSolver,
}

impl GraphEngine {
    pub fn new(settings: &Settings) -> Self {
        Self {
            full: Graph::default(),
            full_generation: 0,
            params: FilterParameters::default(),
            params_generation: 0,
            visible: Graph::default(),
            derived_from: None,
            solver: LayoutSolver::new(settings.layout, settings.radius),
        }
    }

    pub fn load(&mut self, graph: Graph) {
        self.full = graph;
        self.full_generation = self.full_generation.wrapping_add(1);
    }

    pub fn full_graph(&self) -> &Graph {
        &self.full
    }

    pub fn visible_graph(&self) -> &Graph {
        &self.visible
    }

    pub fn params(&self) -> &FilterParameters {
        &self.params
    }

    pub fn set_params(&mut self, params: FilterParameters) {
        if params != self.params {
            self.params = params;
            self.params_generation = self.params_generation.wrapping_add(1);
        }
    }

    pub fn update_params(&mut self, update: impl FnOnce(&mut FilterParameters)) {
        let mut params = self.params.clone();
        update(&mut params);
        self.set_params(params);
    }

    pub fn focus_problem(&self) -> Option<GraphError> {
        self.params.check(&self.full).err()
    }

    pub fn is_stale(&self) -> bool {
        self.derived_from != Some((self.full_generation, self.params_generation))
    }

    pub fn refresh(&mut self) -> bool {
        if !self.is_stale() {
            return false;
        }

        self.visible = filter(&self.full, &self.params);
        self.derived_from = Some((self.full_generation, self.params_generation));
        debug!(
            nodes = self.visible.node_count(),
            edges = self.visible.edge_count(),
            full_generation = self.full_generation,
            params_generation = self.params_generation,
            "visible subgraph recomputed"
        );
        self.solver.restart(&self.visible);
        true
    }

    pub fn tick(&mut self) -> bool {
        self.refresh();
        self.solver.tick()
    }

    pub fn solver(&self) -> &LayoutSolver {
        &self.solver
    }

    pub fn solver_mut(&mut self) -> &mut LayoutSolver {
        &mut self.solver
    }

    pub fn state(&self) -> SolverState {
        self.solver.state()
    }

    pub fn shutdown(&mut self) {
        self.solver.stop();
        self.derived_from = None;
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        let solver_nodes = self.solver.nodes();
        let nodes = solver_nodes
            .iter()
            .map(|node| NodeView {
                id: node.id.clone(),
                category: node.category,
                position: node.position,
                radius: node.radius,
                pinned: node.pin.is_some(),
            })
            .collect::<Vec<_>>();

        let edges = self
            .solver
            .edges()
            .iter()
            .filter_map(|sim| {
                let edge = self.visible.edges.get(sim.origin)?;
                Some(EdgeView {
                    source: solver_nodes.get(sim.source)?.position,
                    target: solver_nodes.get(sim.target)?.position,
                    label: sim.label.clone(),
                    weight: sim.weight,
                    attributes: edge.attributes.clone(),
                })
            })
            .collect::<Vec<_>>();

        RenderSnapshot {
            node_count: nodes.len(),
            edge_count: edges.len(),
            nodes,
            edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::build;
    use crate::records::RelationRecord;

    fn engine_with_example() -> GraphEngine {
        let records = vec![
            RelationRecord::new("A", "X", "win").with_detail("Alice"),
            RelationRecord::new("A", "X", "win").with_detail("Anna"),
            RelationRecord::new("B", "X", "loss"),
        ];
        let mut engine = GraphEngine::new(&Settings::default());
        engine.load(build(&records).unwrap());
        engine
    }

    #[test]
    fn first_refresh_derives_and_later_ones_are_free() {
        let mut engine = engine_with_example();
        assert!(engine.is_stale());
        assert!(engine.refresh());
        assert!(!engine.refresh());
        assert_eq!(engine.state(), SolverState::Running);

        engine.set_params(FilterParameters::default());
        assert!(!engine.is_stale());

        engine.update_params(|params| params.min_weight = 2);
        assert!(engine.is_stale());
        assert!(engine.refresh());
    }

    #[test]
    fn snapshot_reflects_filtered_subgraph() {
        let mut engine = engine_with_example();
        engine.set_params(FilterParameters {
            min_weight: 2,
            hide_disconnected: true,
            ..Default::default()
        });
        engine.tick();

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.node_count, 2);
        assert_eq!(snapshot.edge_count, 1);
        let ids = snapshot.nodes.iter().map(|node| node.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["A", "X"]);

        let edge = &snapshot.edges[0];
        assert_eq!(edge.label, "win");
        assert_eq!(edge.weight, 2);
        assert_eq!(edge.attributes, vec!["Alice", "Anna"]);
        assert_eq!(edge.source, snapshot.nodes[0].position);
        assert_eq!(edge.target, snapshot.nodes[1].position);
    }

    #[test]
    fn filter_change_keeps_surviving_positions() {
        let mut engine = engine_with_example();
        for _ in 0..30 {
            engine.tick();
        }
        let a_before = engine.solver().position("A").unwrap();
        let x_before = engine.solver().position("X").unwrap();

        engine.update_params(|params| params.label_filter = Some("win".into()));
        assert!(engine.refresh());
        assert_eq!(engine.solver().position("A"), Some(a_before));
        assert_eq!(engine.solver().position("X"), Some(x_before));
        assert_eq!(engine.visible_graph().edge_count(), 1);
        // Without pruning, B stays as an isolated node.
        assert_eq!(engine.snapshot().node_count, 3);
    }

    #[test]
    fn unknown_focus_renders_nothing_but_is_reported() {
        let mut engine = engine_with_example();
        engine.update_params(|params| {
            params.node_focus = Some("Z".into());
            params.hide_disconnected = true;
        });
        engine.tick();

        assert_eq!(engine.snapshot(), RenderSnapshot::default());
        assert_eq!(engine.state(), SolverState::Idle);
        assert_eq!(engine.focus_problem(), Some(GraphError::UnknownFocus("Z".into())));
    }

    #[test]
    fn reloading_the_graph_invalidates_the_subgraph() {
        let mut engine = engine_with_example();
        engine.refresh();

        engine.load(build(&[RelationRecord::new("C", "Y", "draw")]).unwrap());
        assert!(engine.is_stale());
        engine.refresh();
        assert_eq!(engine.snapshot().node_count, 2);
        assert!(engine.solver().index_of("A").is_none());
    }

    #[test]
    fn shutdown_stops_the_solver() {
        let mut engine = engine_with_example();
        engine.tick();
        engine.shutdown();
        engine.shutdown();
        assert_eq!(engine.state(), SolverState::Idle);
        assert!(engine.snapshot().nodes.is_empty());
    }
}
