use eframe::egui::{Pos2, Rect, Vec2};

use crate::config::ViewConfig;
use crate::layout::{LayoutSolver, PinCommand, SimEdge, SimNode};

/// Screen = viewport center + translate + world × scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    pub scale: f32,
    pub translate: Vec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate: Vec2::ZERO,
        }
    }
}

impl ViewTransform {
    pub fn world_to_screen(&self, rect: Rect, world: Vec2) -> Pos2 {
        rect.center() + self.translate + world * self.scale
    }

    pub fn screen_to_world(&self, rect: Rect, screen: Pos2) -> Vec2 {
        (screen - rect.center() - self.translate) / self.scale
    }
}

fn distance_to_segment(point: Pos2, start: Pos2, end: Pos2) -> f32 {
    let segment = end - start;
    let length_sq = segment.length_sq();
    if length_sq <= f32::EPSILON {
        return point.distance(start);
    }
    let t = ((point - start).dot(segment) / length_sq).clamp(0.0, 1.0);
    point.distance(start + segment * t)
}

pub struct InteractionController {
    config: ViewConfig,
    view: ViewTransform,
    dragging: Option<usize>,
}

impl InteractionController {
    pub fn new(config: ViewConfig) -> Self {
        Self {
            config,
            view: ViewTransform::default(),
            dragging: None,
        }
    }

    pub fn view(&self) -> ViewTransform {
        self.view
    }

    pub fn dragging(&self) -> Option<usize> {
        self.dragging
    }

    pub fn cancel_drag(&mut self) {
        self.dragging = None;
    }

    pub fn node_at(&self, nodes: &[SimNode], rect: Rect, screen: Pos2) -> Option<usize> {
        nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                let center = self.view.world_to_screen(rect, node.position);
                let distance = center.distance(screen);
                let reach = node.radius * self.view.scale + self.config.hit_padding;
                (distance <= reach).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    pub fn edge_at(
        &self,
        nodes: &[SimNode],
        edges: &[SimEdge],
        rect: Rect,
        screen: Pos2,
    ) -> Option<usize> {
        edges
            .iter()
            .enumerate()
            .filter_map(|(index, edge)| {
                let start = nodes.get(edge.source)?.position;
                let end = nodes.get(edge.target)?.position;
                let distance = distance_to_segment(
                    screen,
                    self.view.world_to_screen(rect, start),
                    self.view.world_to_screen(rect, end),
                );
                (distance <= self.config.hit_padding + 1.0).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    pub fn pointer_down(&mut self, solver: &mut LayoutSolver, rect: Rect, screen: Pos2) -> bool {
        let Some(index) = self.node_at(solver.nodes(), rect, screen) else {
            return false;
        };
        solver.apply(PinCommand::Grab { index });
        self.dragging = Some(index);
        true
    }

    pub fn pointer_move(&mut self, solver: &mut LayoutSolver, rect: Rect, screen: Pos2) {
        if let Some(index) = self.dragging {
            let position = self.view.screen_to_world(rect, screen);
            solver.apply(PinCommand::Drag { index, position });
        }
    }

    pub fn pointer_up(&mut self, solver: &mut LayoutSolver) {
        if let Some(index) = self.dragging.take() {
            solver.apply(PinCommand::Release { index });
        }
    }

    pub fn pan(&mut self, delta: Vec2) {
        if delta.is_finite() {
            self.view.translate += delta;
        }
    }

    /// Multiplies the scale by `factor`, keeping the world point under
    /// `focal` fixed on screen.
    pub fn zoom(&mut self, factor: f32, focal: Pos2, rect: Rect) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let world_before = self.view.screen_to_world(rect, focal);
        let (min_scale, max_scale) = self.scale_bounds();
        self.view.scale = (self.view.scale * factor).clamp(min_scale, max_scale);
        self.view.translate = focal - rect.center() - world_before * self.view.scale;
    }

    pub fn wheel(&mut self, scroll: f32, focal: Pos2, rect: Rect) {
        if scroll.abs() <= f32::EPSILON {
            return;
        }
        let factor = (1.0 + scroll * self.config.zoom_sensitivity).clamp(0.85, 1.15);
        self.zoom(factor, focal, rect);
    }

    pub fn scroll_or_pinch(&mut self, scroll: f32, pinch: f32, focal: Pos2, rect: Rect) {
        // A ctrl+wheel gesture shows up in both deltas.
        if (pinch - 1.0).abs() > f32::EPSILON {
            self.zoom(pinch, focal, rect);
        } else {
            self.wheel(scroll, focal, rect);
        }
    }

    pub fn fit(&mut self, nodes: &[SimNode], rect: Rect) {
        let Some(bounds) = nodes.iter().fold(None::<Rect>, |bounds, node| {
            let around = Rect::from_center_size(
                node.position.to_pos2(),
                Vec2::splat(node.radius * 2.0),
            );
            Some(bounds.map_or(around, |bounds| bounds.union(around)))
        }) else {
            self.view = ViewTransform::default();
            return;
        };

        let (min_scale, max_scale) = self.scale_bounds();
        let margin = 0.9;
        let scale_x = rect.width() * margin / bounds.width().max(1.0);
        let scale_y = rect.height() * margin / bounds.height().max(1.0);
        self.view.scale = scale_x.min(scale_y).clamp(min_scale, max_scale);
        self.view.translate = -bounds.center().to_vec2() * self.view.scale;
    }

    fn scale_bounds(&self) -> (f32, f32) {
        let min_scale = self.config.min_scale.max(f32::EPSILON);
        (min_scale, self.config.max_scale.max(min_scale))
    }
}
