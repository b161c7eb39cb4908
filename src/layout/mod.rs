mod forces;
mod quadtree;

use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};
use tracing::{debug, warn};

use crate::config::{LayoutConfig, RadiusConfig};
use crate::model::{Category, Graph};
use crate::util::stable_pair;

use forces::{
    ChargeParams, CollisionParams, accumulate_charge, accumulate_collisions, accumulate_links,
};
use quadtree::QuadNode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolverState {
    Idle,
    Running,
    Cooling,
    Settled,
}

impl SolverState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Cooling => "cooling",
            Self::Settled => "settled",
        }
    }

    fn is_ticking(self) -> bool {
        matches!(self, Self::Running | Self::Cooling)
    }
}

#[derive(Clone, Debug)]
pub struct SimNode {
    pub id: String,
    pub category: Category,
    pub position: Vec2,
    pub velocity: Vec2,
    pub pin: Option<Vec2>,
    pub radius: f32,
    pub degree: usize,
}

#[derive(Clone, Debug)]
pub struct SimEdge {
    pub origin: usize,
    pub source: usize,
    pub target: usize,
    pub weight: u32,
    pub label: String,
}

/// Requests from the interaction layer. Indices address the solver's
/// current node arena; stale indices are ignored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PinCommand {
    Grab { index: usize },
    Drag { index: usize, position: Vec2 },
    Release { index: usize },
}

#[derive(Default)]
struct Scratch {
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    radii: Vec<f32>,
    degrees: Vec<usize>,
    deltas: Vec<Vec2>,
}

pub struct LayoutSolver {
    config: LayoutConfig,
    radius: RadiusConfig,
    nodes: Vec<SimNode>,
    edges: Vec<SimEdge>,
    index_by_id: HashMap<String, usize>,
    energy: f32,
    energy_target: f32,
    state: SolverState,
    ticks: u64,
    scratch: Scratch,
}

impl LayoutSolver {
    pub fn new(config: LayoutConfig, radius: RadiusConfig) -> Self {
        Self {
            config,
            radius,
            nodes: Vec::new(),
            edges: Vec::new(),
            index_by_id: HashMap::new(),
            energy: 0.0,
            energy_target: 0.0,
            state: SolverState::Idle,
            ticks: 0,
            scratch: Scratch::default(),
        }
    }

    pub fn state(&self) -> SolverState {
        self.state
    }

    pub fn energy(&self) -> f32 {
        self.energy
    }

    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[SimEdge] {
        &self.edges
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[cfg(test)]
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    #[cfg(test)]
    pub fn position(&self, id: &str) -> Option<Vec2> {
        self.index_of(id).map(|index| self.nodes[index].position)
    }

    pub fn positions_by_id(&self) -> HashMap<String, (Vec2, Vec2)> {
        self.nodes
            .iter()
            .map(|node| (node.id.clone(), (node.position, node.velocity)))
            .collect()
    }

    pub fn restart(&mut self, graph: &Graph) {
        let prior = self.positions_by_id();
        self.start(graph, &prior);
    }

    /// Builds a fresh arena for `graph`. Nodes found in `prior` resume from
    /// their recorded position and velocity; the rest are seeded around the
    /// origin.
    pub fn start(&mut self, graph: &Graph, prior: &HashMap<String, (Vec2, Vec2)>) {
        self.stop();

        let node_count = graph.node_count();
        if node_count == 0 {
            debug!("layout restart with empty graph; staying idle");
            return;
        }

        self.index_by_id = graph
            .nodes
            .keys()
            .enumerate()
            .map(|(index, id)| (id.clone(), index))
            .collect();

        let mut degrees = vec![0usize; node_count];
        let mut edges = Vec::with_capacity(graph.edge_count());
        for (origin, edge) in graph.edges.iter().enumerate() {
            let (Some(&source), Some(&target)) = (
                self.index_by_id.get(&edge.source),
                self.index_by_id.get(&edge.target),
            ) else {
                warn!(
                    source = %edge.source,
                    target = %edge.target,
                    "edge endpoint missing from node set; skipping"
                );
                continue;
            };
            degrees[source] += 1;
            degrees[target] += 1;
            edges.push(SimEdge {
                origin,
                source,
                target,
                weight: edge.weight,
                label: edge.label.clone(),
            });
        }

        let spread = self.config.seed_radius * (node_count as f32).sqrt().max(1.0);
        let mut carried = 0usize;
        self.nodes = graph
            .nodes
            .values()
            .zip(degrees)
            .map(|(node, degree)| {
                let (position, velocity) = match prior.get(&node.id) {
                    Some(&state) => {
                        carried += 1;
                        state
                    }
                    None => {
                        let (jx, jy) = stable_pair(&node.id);
                        (vec2(jx, jy) * spread, Vec2::ZERO)
                    }
                };

                SimNode {
                    id: node.id.clone(),
                    category: node.category,
                    position,
                    velocity,
                    pin: None,
                    radius: self.radius.profile(node.category).radius(degree),
                    degree,
                }
            })
            .collect();
        self.edges = edges;

        self.energy = self.config.initial_energy;
        self.energy_target = 0.0;
        self.state = SolverState::Running;
        debug!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            carried,
            "layout restarted"
        );
    }

    pub fn stop(&mut self) {
        if self.state != SolverState::Idle {
            debug!(ticks = self.ticks, "layout stopped");
        }
        self.nodes = Vec::new();
        self.edges = Vec::new();
        self.index_by_id = HashMap::new();
        self.scratch = Scratch::default();
        self.energy = 0.0;
        self.energy_target = 0.0;
        self.ticks = 0;
        self.state = SolverState::Idle;
    }

    pub fn reheat(&mut self) {
        if self.nodes.is_empty() {
            return;
        }
        self.energy = self.energy.max(self.config.reheat_energy);
        self.state = SolverState::Running;
    }

    pub fn apply(&mut self, command: PinCommand) {
        match command {
            PinCommand::Grab { index } => {
                let Some(node) = self.nodes.get_mut(index) else {
                    debug!(index, "grab for unknown node ignored");
                    return;
                };
                node.pin = Some(node.position);
                node.velocity = Vec2::ZERO;
                self.energy_target = self.config.drag_energy_target;
                self.reheat();
            }
            PinCommand::Drag { index, position } => {
                let Some(node) = self.nodes.get_mut(index) else {
                    return;
                };
                if node.pin.is_none() || !position.is_finite() {
                    return;
                }
                node.pin = Some(position);
                node.position = position;
                node.velocity = Vec2::ZERO;
            }
            PinCommand::Release { index } => {
                if let Some(node) = self.nodes.get_mut(index) {
                    node.pin = None;
                }
                if self.nodes.iter().all(|node| node.pin.is_none()) {
                    self.energy_target = 0.0;
                }
            }
        }
    }

    pub fn tick_n(&mut self, ticks: usize) -> bool {
        let mut moved = false;
        for _ in 0..ticks {
            if !self.state.is_ticking() {
                break;
            }
            moved |= self.tick();
        }
        moved
    }

    pub fn tick(&mut self) -> bool {
        if !self.state.is_ticking() {
            return false;
        }

        self.energy += (self.energy_target - self.energy) * self.config.energy_decay;
        if self.energy < self.config.energy_min && self.energy_target < self.config.energy_min {
            self.state = SolverState::Settled;
            debug!(ticks = self.ticks, "layout settled");
            return false;
        }
        self.state = if self.energy < self.config.cooling_threshold {
            SolverState::Cooling
        } else {
            SolverState::Running
        };
        self.ticks += 1;

        self.sanitize();
        self.fill_scratch();

        let config = self.config;
        let energy = self.energy;
        let scratch = &mut self.scratch;

        accumulate_links(
            &self.edges,
            &scratch.positions,
            &scratch.velocities,
            &scratch.degrees,
            config.link_distance,
            config.link_strength * energy,
            &mut scratch.deltas,
        );

        if let Some(tree) = QuadNode::build(&scratch.positions, &scratch.radii) {
            let charge = ChargeParams {
                strength: config.charge_strength * energy,
                min_distance_sq: config.charge_min_distance * config.charge_min_distance,
                theta: config.barnes_hut_theta,
            };
            let collision = CollisionParams {
                padding: config.collision_padding,
                strength: config.collision_strength,
            };
            for index in 0..scratch.positions.len() {
                accumulate_charge(
                    &tree,
                    index,
                    &scratch.positions,
                    charge,
                    &mut scratch.deltas[index],
                );
                accumulate_collisions(
                    &tree,
                    index,
                    &scratch.positions,
                    &scratch.radii,
                    collision,
                    &mut scratch.deltas,
                );
            }
        }

        self.integrate()
    }

    fn sanitize(&mut self) {
        let mut repaired = 0usize;
        for node in &mut self.nodes {
            if !node.position.is_finite() {
                node.position = Vec2::ZERO;
                repaired += 1;
            }
            if !node.velocity.is_finite() {
                node.velocity = Vec2::ZERO;
                repaired += 1;
            }
            if node.pin.is_some_and(|pin| !pin.is_finite()) {
                node.pin = Some(Vec2::ZERO);
                repaired += 1;
            }
        }
        if repaired > 0 {
            warn!(repaired, "replaced non-finite simulation values with zero");
        }
    }

    fn fill_scratch(&mut self) {
        let scratch = &mut self.scratch;
        scratch.positions.clear();
        scratch.velocities.clear();
        scratch.radii.clear();
        scratch.degrees.clear();
        for node in &self.nodes {
            scratch.positions.push(node.position);
            scratch.velocities.push(node.velocity);
            scratch.radii.push(node.radius);
            scratch.degrees.push(node.degree);
        }
        scratch.deltas.clear();
        scratch.deltas.resize(self.nodes.len(), Vec2::ZERO);
    }

    fn integrate(&mut self) -> bool {
        let damping = self.config.velocity_damping.clamp(0.0, 1.0);
        let max_speed = self.config.max_speed.max(0.0);
        let max_speed_sq = max_speed * max_speed;
        let mut moved = false;

        for (node, delta) in self.nodes.iter_mut().zip(&self.scratch.deltas) {
            if let Some(pin) = node.pin {
                node.position = pin;
                node.velocity = Vec2::ZERO;
                continue;
            }

            let mut velocity = (node.velocity + *delta) * damping;
            if !velocity.is_finite() {
                velocity = Vec2::ZERO;
            }
            let speed_sq = velocity.length_sq();
            if speed_sq > max_speed_sq {
                velocity *= max_speed / speed_sq.sqrt();
            }

            node.velocity = velocity;
            node.position += velocity;
            moved |= velocity.length_sq() > 1e-6;
        }

        // A held pin anchors the layout, so recentering waits for release.
        let centering = self.config.center_strength.clamp(0.0, 1.0);
        if centering > 0.0 && self.nodes.iter().all(|node| node.pin.is_none()) {
            let centroid = self
                .nodes
                .iter()
                .fold(Vec2::ZERO, |sum, node| sum + node.position)
                / self.nodes.len() as f32;
            if centroid.length_sq() > 1e-6 {
                let shift = centroid * centering;
                for node in &mut self.nodes {
                    node.position -= shift;
                }
            }
        }

        moved
    }
}
