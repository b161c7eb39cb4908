use eframe::egui::{self, Align, Context, Layout};

use crate::engine::GraphEngine;
use crate::interaction::InteractionController;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn new(engine: GraphEngine, interaction: InteractionController) -> Self {
        let full = engine.full_graph();
        let mut node_ids = full.nodes.keys().cloned().collect::<Vec<_>>();
        node_ids.sort_by_key(|id| id.to_lowercase());
        let labels = full.labels();
        let max_weight = full.max_weight();

        Self {
            engine,
            interaction,
            live_physics: true,
            fit_requested: true,
            focus_search: String::new(),
            secondary_search: String::new(),
            node_ids,
            labels,
            max_weight,
            hovered_node: None,
            hovered_edge: None,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        records_path: &str,
        reload_requested: &mut bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("relgraph");
                    ui.separator();
                    ui.label(format!("records: {records_path}"));
                    let full = self.engine.full_graph();
                    ui.label(format!("nodes: {}", full.node_count()));
                    ui.label(format!("edges: {}", full.edge_count()));
                    if ui.button("Reload").clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.status_text());
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));
    }

    fn status_text(&self) -> String {
        let visible = self.engine.visible_graph();
        let state = self.engine.state();
        format!(
            "visible {} nodes / {} edges  |  layout {} ({:.3}, tick {})",
            visible.node_count(),
            visible.edge_count(),
            state.label(),
            self.engine.solver().energy(),
            self.engine.solver().ticks()
        )
    }
}
