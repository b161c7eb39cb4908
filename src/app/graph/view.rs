use eframe::egui::{Align2, Color32, FontId, Sense, Stroke, Ui, vec2};

use crate::engine::RenderSnapshot;
use crate::util::truncate_label;

use super::super::ViewModel;
use super::super::render_utils::{
    category_color, circle_visible, draw_background, edge_width, highlight_color, segment_visible,
};

const MAX_LISTED_ATTRIBUTES: usize = 6;

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        if self.engine.refresh() {
            self.interaction.cancel_drag();
            self.hovered_node = None;
            self.hovered_edge = None;
        }

        self.handle_graph_input(ui, rect, &response);

        let moved = self.live_physics && self.engine.tick();

        if std::mem::take(&mut self.fit_requested) {
            self.interaction.fit(self.engine.solver().nodes(), rect);
        }

        let view = self.interaction.view();
        draw_background(&painter, rect, view);

        let snapshot = self.engine.snapshot();
        if snapshot.node_count == 0 {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No nodes match the current filters.",
                FontId::proportional(15.0),
                Color32::from_gray(200),
            );
            return;
        }

        for (index, edge) in snapshot.edges.iter().enumerate() {
            let start = view.world_to_screen(rect, edge.source);
            let end = view.world_to_screen(rect, edge.target);
            let width = edge_width(edge.weight, view.scale);
            if !segment_visible(rect, start, end, width) {
                continue;
            }
            let color = if self.hovered_edge == Some(index) {
                Color32::from_rgb(245, 206, 93)
            } else {
                Color32::from_rgba_unmultiplied(150, 160, 175, 120)
            };
            painter.line_segment([start, end], Stroke::new(width, color));
        }

        for (index, node) in snapshot.nodes.iter().enumerate() {
            let position = view.world_to_screen(rect, node.position);
            let radius = (node.radius * view.scale).max(1.5);
            if !circle_visible(rect, position, radius) {
                continue;
            }

            let hovered = self.hovered_node == Some(index);
            let base = category_color(node.category);
            let color = if hovered { highlight_color(base, 0.35) } else { base };
            painter.circle_filled(position, radius, color);

            let outline = if node.pinned {
                Stroke::new(2.2, Color32::from_rgb(245, 206, 93))
            } else {
                Stroke::new(1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 190))
            };
            painter.circle_stroke(position, radius, outline);

            if hovered || node.pinned || radius > 14.0 || view.scale > 1.35 {
                painter.text(
                    position + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    truncate_label(&node.id, 28),
                    FontId::proportional(12.0),
                    Color32::from_gray(238),
                );
            }
        }

        if let Some(text) = self.hover_text(&snapshot) {
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                text,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        if moved || self.interaction.dragging().is_some() || response.dragged() {
            ui.ctx().request_repaint();
        }
    }

    fn hover_text(&self, snapshot: &RenderSnapshot) -> Option<String> {
        if let Some(node) = self.hovered_node.and_then(|index| snapshot.nodes.get(index)) {
            let degree = self.engine.visible_graph().degree(&node.id);
            return Some(format!(
                "{}  |  {}  |  degree {degree}",
                node.id,
                node.category.label()
            ));
        }

        let edge = self.hovered_edge.and_then(|index| snapshot.edges.get(index))?;
        let mut text = format!("{}  |  weight {}", edge.label, edge.weight);
        for attribute in edge.attributes.iter().take(MAX_LISTED_ATTRIBUTES) {
            text.push_str("\n  ");
            text.push_str(&truncate_label(attribute, 60));
        }
        if edge.attributes.len() > MAX_LISTED_ATTRIBUTES {
            text.push_str(&format!(
                "\n  ... {} more",
                edge.attributes.len() - MAX_LISTED_ATTRIBUTES
            ));
        }
        Some(text)
    }
}
