use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: usize = 12;

#[derive(Clone, Copy, Debug)]
pub(super) struct Square {
    pub(super) center: Vec2,
    pub(super) half_extent: f32,
}

impl Square {
    fn enclosing(points: &[Vec2]) -> Option<Self> {
        let (min, max) = points.iter().fold(
            (
                vec2(f32::INFINITY, f32::INFINITY),
                vec2(f32::NEG_INFINITY, f32::NEG_INFINITY),
            ),
            |(min, max), point| (min.min(*point), max.max(*point)),
        );

        if !(min.x.is_finite() && min.y.is_finite() && max.x.is_finite() && max.y.is_finite()) {
            return None;
        }

        let span = (max - min).max_elem().max(1.0);
        Some(Self {
            center: (min + max) * 0.5,
            half_extent: span * 0.5 + 1.0,
        })
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        let offset = (point - self.center).abs();
        offset.x <= self.half_extent && offset.y <= self.half_extent
    }

    pub(super) fn gap_sq(self, point: Vec2) -> f32 {
        let outside = ((point - self.center).abs() - Vec2::splat(self.half_extent)).max(Vec2::ZERO);
        outside.length_sq()
    }

    fn quadrant(self, index: usize) -> Self {
        let quarter = self.half_extent * 0.5;
        let sign = vec2(
            if index & 1 == 0 { -1.0 } else { 1.0 },
            if index & 2 == 0 { -1.0 } else { 1.0 },
        );
        Self {
            center: self.center + sign * quarter,
            half_extent: quarter,
        }
    }

    fn quadrant_of(self, point: Vec2) -> usize {
        usize::from(point.x >= self.center.x) | (usize::from(point.y >= self.center.y) << 1)
    }
}

/// Region quadtree carrying the aggregates both pairwise passes need: point
/// count and centroid for charge, largest radius for collision pruning.
pub(super) struct QuadNode {
    pub(super) square: Square,
    pub(super) centroid: Vec2,
    pub(super) count: usize,
    pub(super) max_radius: f32,
    pub(super) members: Vec<usize>,
    pub(super) children: [Option<Box<QuadNode>>; 4],
}

impl QuadNode {
    pub(super) fn build(positions: &[Vec2], radii: &[f32]) -> Option<Self> {
        let square = Square::enclosing(positions)?;
        let members = (0..positions.len()).collect();
        Some(Self::subdivide(square, members, positions, radii, 0))
    }

    fn subdivide(
        square: Square,
        members: Vec<usize>,
        positions: &[Vec2],
        radii: &[f32],
        depth: usize,
    ) -> Self {
        let count = members.len();
        let mut centroid = Vec2::ZERO;
        let mut max_radius = 0.0_f32;
        for &index in &members {
            centroid += positions[index];
            max_radius = max_radius.max(radii.get(index).copied().unwrap_or(0.0));
        }
        if count > 0 {
            centroid /= count as f32;
        }

        let mut node = Self {
            square,
            centroid,
            count,
            max_radius,
            members,
            children: [None, None, None, None],
        };

        if depth >= MAX_DEPTH || node.members.len() <= LEAF_CAPACITY {
            return node;
        }

        let mut buckets: [Vec<usize>; 4] = Default::default();
        for &index in &node.members {
            buckets[square.quadrant_of(positions[index])].push(index);
        }

        // Coincident points would otherwise recurse to MAX_DEPTH for nothing.
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() <= 1
            && let Some(&first) = node.members.first()
            && node.members.iter().all(|&index| positions[index] == positions[first])
        {
            return node;
        }

        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if !bucket.is_empty() {
                node.children[quadrant] = Some(Box::new(Self::subdivide(
                    square.quadrant(quadrant),
                    bucket,
                    positions,
                    radii,
                    depth + 1,
                )));
            }
        }
        node.members.clear();
        node
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    pub(super) fn children(&self) -> impl Iterator<Item = &QuadNode> {
        self.children.iter().filter_map(|child| child.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregates_cover_every_point() {
        let positions = (0..40)
            .map(|i| vec2((i % 7) as f32 * 13.0, (i / 7) as f32 * 11.0))
            .collect::<Vec<_>>();
        let radii = (0..40).map(|i| i as f32 * 0.5).collect::<Vec<_>>();

        let tree = QuadNode::build(&positions, &radii).unwrap();
        assert_eq!(tree.count, 40);
        assert_eq!(tree.max_radius, 19.5);
        assert!(!tree.is_leaf());

        fn leaf_members(node: &QuadNode, out: &mut Vec<usize>) {
            out.extend(&node.members);
            for child in node.children() {
                leaf_members(child, out);
            }
        }
        let mut seen = Vec::new();
        leaf_members(&tree, &mut seen);
        seen.sort_unstable();
        assert_eq!(seen, (0..40).collect::<Vec<_>>());
        for position in &positions {
            assert!(tree.square.contains(*position));
        }
    }

    #[test]
    fn coincident_points_stay_in_one_leaf() {
        let positions = vec![vec2(5.0, 5.0); 30];
        let radii = vec![1.0; 30];

        let tree = QuadNode::build(&positions, &radii).unwrap();
        assert!(tree.is_leaf());
        assert_eq!(tree.members.len(), 30);
    }

    #[test]
    fn clustered_points_keep_splitting() {
        let mut positions = vec![vec2(0.0, 0.0)];
        for i in 0..4 {
            for j in 0..4 {
                positions.push(vec2(90.0 + i as f32, 90.0 + j as f32));
            }
        }
        let radii = vec![1.0; positions.len()];

        fn largest_leaf(node: &QuadNode) -> usize {
            node.children()
                .map(largest_leaf)
                .max()
                .unwrap_or(node.members.len())
        }
        let tree = QuadNode::build(&positions, &radii).unwrap();
        assert!(largest_leaf(&tree) <= LEAF_CAPACITY);
    }

    #[test]
    fn gap_is_zero_inside_and_positive_outside() {
        let square = Square {
            center: Vec2::ZERO,
            half_extent: 10.0,
        };
        assert_eq!(square.gap_sq(vec2(3.0, -4.0)), 0.0);
        assert_eq!(square.gap_sq(vec2(13.0, 0.0)), 9.0);
        assert_eq!(square.gap_sq(vec2(13.0, 14.0)), 25.0);
    }
}
