use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use super::SimEdge;
use super::quadtree::QuadNode;

fn tie_break(a: usize, b: usize) -> Vec2 {
    let angle = ((a as f32) * 0.618_034 + (b as f32) * 0.414_214) * TAU;
    vec2(angle.cos(), angle.sin())
}

#[derive(Clone, Copy)]
pub(super) struct ChargeParams {
    pub(super) strength: f32,
    pub(super) min_distance_sq: f32,
    pub(super) theta: f32,
}

pub(super) fn accumulate_charge(
    cell: &QuadNode,
    index: usize,
    positions: &[Vec2],
    params: ChargeParams,
    velocity: &mut Vec2,
) {
    if cell.count == 0 {
        return;
    }

    let point = positions[index];

    if cell.is_leaf() {
        for &other in &cell.members {
            if other == index {
                continue;
            }
            let mut delta = point - positions[other];
            let mut distance_sq = delta.length_sq();
            if distance_sq < 1e-8 {
                delta = tie_break(index, other);
                distance_sq = 1.0;
            }
            *velocity += delta * (params.strength / distance_sq.max(params.min_distance_sq));
        }
        return;
    }

    let delta = point - cell.centroid;
    let distance_sq = delta.length_sq();
    let side = cell.square.half_extent * 2.0;
    let far_enough = !cell.square.contains(point)
        && side * side < params.theta * params.theta * distance_sq
        && cell.count > 1;

    if far_enough {
        *velocity +=
            delta * (params.strength * cell.count as f32 / distance_sq.max(params.min_distance_sq));
        return;
    }

    for child in cell.children() {
        accumulate_charge(child, index, positions, params, velocity);
    }
}

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) padding: f32,
    pub(super) strength: f32,
}

pub(super) fn accumulate_collisions(
    cell: &QuadNode,
    index: usize,
    positions: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    velocities: &mut [Vec2],
) {
    let point = positions[index];
    let reach = radii[index] + cell.max_radius + params.padding;
    if cell.square.gap_sq(point) > reach * reach {
        return;
    }

    if !cell.is_leaf() {
        for child in cell.children() {
            accumulate_collisions(child, index, positions, radii, params, velocities);
        }
        return;
    }

    for &other in &cell.members {
        if other <= index {
            continue;
        }

        let min_distance = radii[index] + radii[other] + params.padding;
        let delta = point - positions[other];
        let distance_sq = delta.length_sq();
        if distance_sq >= min_distance * min_distance {
            continue;
        }

        let distance = distance_sq.sqrt();
        let direction = if distance > 1e-4 {
            delta / distance
        } else {
            tie_break(index, other)
        };

        // Larger nodes give way less; the push is a fraction of the overlap
        // so dense clusters relax over several ticks.
        let overlap = (min_distance - distance) * params.strength;
        let r_self = radii[index] * radii[index];
        let r_other = radii[other] * radii[other];
        let share = if r_self + r_other > 0.0 {
            r_other / (r_self + r_other)
        } else {
            0.5
        };
        velocities[index] += direction * overlap * share;
        velocities[other] -= direction * overlap * (1.0 - share);
    }
}

// Edge weight does not enter the spring.
pub(super) fn accumulate_links(
    edges: &[SimEdge],
    positions: &[Vec2],
    velocities: &[Vec2],
    degrees: &[usize],
    distance: f32,
    strength: f32,
    deltas: &mut [Vec2],
) {
    for edge in edges {
        let (source, target) = (edge.source, edge.target);
        if source == target || source >= positions.len() || target >= positions.len() {
            continue;
        }

        let mut delta =
            (positions[target] + velocities[target]) - (positions[source] + velocities[source]);
        let mut length = delta.length();
        if length < 1e-4 {
            delta = tie_break(source, target) * 1e-3;
            length = 1e-3;
        }

        let pull = (length - distance) / length * strength;
        let shift = delta * pull;

        let source_degree = degrees[source].max(1) as f32;
        let target_degree = degrees[target].max(1) as f32;
        let bias = source_degree / (source_degree + target_degree);

        deltas[target] -= shift * bias;
        deltas[source] += shift * (1.0 - bias);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(source: usize, target: usize) -> SimEdge {
        SimEdge {
            origin: 0,
            source,
            target,
            weight: 1,
            label: String::new(),
        }
    }

    #[test]
    fn stretched_link_pulls_endpoints_together() {
        let positions = vec![vec2(0.0, 0.0), vec2(200.0, 0.0)];
        let velocities = vec![Vec2::ZERO; 2];
        let mut deltas = vec![Vec2::ZERO; 2];

        accumulate_links(
            &[edge(0, 1)],
            &positions,
            &velocities,
            &[1, 1],
            50.0,
            0.5,
            &mut deltas,
        );

        assert!(deltas[0].x > 0.0);
        assert!(deltas[1].x < 0.0);
        assert!((deltas[0].x + deltas[1].x).abs() < 1e-4);
    }

    #[test]
    fn heavier_edges_pull_the_same() {
        let positions = vec![vec2(0.0, 0.0), vec2(120.0, 40.0)];
        let velocities = vec![Vec2::ZERO; 2];
        let mut light = vec![Vec2::ZERO; 2];
        let mut heavy = vec![Vec2::ZERO; 2];
        let mut heavy_edge = edge(0, 1);
        heavy_edge.weight = 40;

        accumulate_links(&[edge(0, 1)], &positions, &velocities, &[1, 1], 50.0, 0.5, &mut light);
        accumulate_links(&[heavy_edge], &positions, &velocities, &[1, 1], 50.0, 0.5, &mut heavy);

        assert_eq!(light, heavy);
    }

    #[test]
    fn charge_pushes_points_apart() {
        let positions = vec![vec2(-1.0, 0.0), vec2(1.0, 0.0)];
        let radii = vec![1.0, 1.0];
        let tree = QuadNode::build(&positions, &radii).unwrap();
        let params = ChargeParams {
            strength: 100.0,
            min_distance_sq: 1.0,
            theta: 0.72,
        };

        let mut left = Vec2::ZERO;
        let mut right = Vec2::ZERO;
        accumulate_charge(&tree, 0, &positions, params, &mut left);
        accumulate_charge(&tree, 1, &positions, params, &mut right);

        assert!(left.x < 0.0);
        assert!(right.x > 0.0);
    }

    #[test]
    fn overlapping_nodes_are_separated_and_distant_ones_ignored() {
        let positions = vec![vec2(0.0, 0.0), vec2(4.0, 0.0), vec2(500.0, 0.0)];
        let radii = vec![5.0, 5.0, 5.0];
        let tree = QuadNode::build(&positions, &radii).unwrap();
        let params = CollisionParams {
            padding: 1.0,
            strength: 0.5,
        };
        let mut velocities = vec![Vec2::ZERO; 3];

        for index in 0..3 {
            accumulate_collisions(&tree, index, &positions, &radii, params, &mut velocities);
        }

        assert!(velocities[0].x < 0.0);
        assert!(velocities[1].x > 0.0);
        assert_eq!(velocities[2], Vec2::ZERO);
        // overlap 7, strength 0.5, equal radii → 1.75 each way
        assert!((velocities[1].x - 1.75).abs() < 1e-4);
    }
}
