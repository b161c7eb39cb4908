use eframe::egui::{self, PointerButton, Rect, Ui};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn handle_graph_input(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if response.drag_started_by(PointerButton::Primary)
            && let Some(pointer) = response.interact_pointer_pos()
        {
            self.interaction
                .pointer_down(self.engine.solver_mut(), rect, pointer);
        }

        if response.dragged_by(PointerButton::Primary) {
            match (self.interaction.dragging(), response.interact_pointer_pos()) {
                (Some(_), Some(pointer)) => {
                    self.interaction
                        .pointer_move(self.engine.solver_mut(), rect, pointer);
                }
                (None, _) => self.interaction.pan(response.drag_delta()),
                _ => {}
            }
        }

        if response.dragged_by(PointerButton::Secondary)
            || response.dragged_by(PointerButton::Middle)
        {
            self.interaction.pan(response.drag_delta());
        }

        if response.drag_stopped() {
            self.interaction.pointer_up(self.engine.solver_mut());
        }

        if response.hovered() {
            let focal = response.hover_pos().unwrap_or_else(|| rect.center());
            let (scroll, pinch) = ui.input(|input| (input.raw_scroll_delta.y, input.zoom_delta()));
            self.interaction.scroll_or_pinch(scroll, pinch, focal, rect);
        }

        let solver = self.engine.solver();
        match response.hover_pos() {
            Some(pointer) if self.interaction.dragging().is_none() => {
                self.hovered_node = self.interaction.node_at(solver.nodes(), rect, pointer);
                self.hovered_edge = if self.hovered_node.is_none() {
                    self.interaction
                        .edge_at(solver.nodes(), solver.edges(), rect, pointer)
                } else {
                    None
                };
            }
            Some(_) => {
                self.hovered_node = self.interaction.dragging();
                self.hovered_edge = None;
            }
            None => {
                self.hovered_node = None;
                self.hovered_edge = None;
            }
        }
    }
}
