use eframe::egui::{self, RichText, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::util::truncate_label;

use super::super::ViewModel;

const MAX_SUGGESTIONS: usize = 8;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

fn suggestions<'a>(node_ids: &'a [String], query: &str) -> Vec<&'a str> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let mut scored = node_ids
        .iter()
        .filter_map(|id| fuzzy_match_score(&matcher, id, query).map(|score| (score, id.as_str())))
        .collect::<Vec<_>>();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, id)| id)
        .collect()
}

fn focus_picker(
    ui: &mut Ui,
    title: &str,
    search: &mut String,
    current: Option<&str>,
    node_ids: &[String],
) -> Option<Option<String>> {
    let mut picked = None;

    ui.label(RichText::new(title).strong());
    ui.horizontal(|ui| {
        match current {
            Some(id) => {
                ui.label(truncate_label(id, 32));
                if ui.small_button("clear").clicked() {
                    picked = Some(None);
                }
            }
            None => {
                ui.weak("none");
            }
        }
    });
    ui.add(egui::TextEdit::singleline(search).hint_text("search nodes"));

    for id in suggestions(node_ids, search) {
        if ui
            .selectable_label(current == Some(id), truncate_label(id, 40))
            .clicked()
        {
            picked = Some(Some(id.to_owned()));
        }
    }

    if picked.is_some() {
        search.clear();
    }
    picked
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        let mut params = self.engine.params().clone();

        ui.heading("Filters");
        ui.add_space(6.0);

        if let Some(focus) = focus_picker(
            ui,
            "Focus node",
            &mut self.focus_search,
            params.node_focus.as_deref(),
            &self.node_ids,
        ) {
            params.node_focus = focus;
        }
        ui.add_space(6.0);

        if let Some(focus) = focus_picker(
            ui,
            "Secondary focus",
            &mut self.secondary_search,
            params.secondary_focus.as_deref(),
            &self.node_ids,
        ) {
            params.secondary_focus = focus;
        }
        ui.add_space(6.0);

        ui.label(RichText::new("Relation label").strong());
        egui::ComboBox::from_id_salt("label_filter")
            .selected_text(params.label_filter.as_deref().unwrap_or("any"))
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut params.label_filter, None, "any");
                for label in &self.labels {
                    ui.selectable_value(&mut params.label_filter, Some(label.clone()), label);
                }
            });
        ui.add_space(6.0);

        ui.add(
            egui::Slider::new(&mut params.min_weight, 1..=self.max_weight.max(1))
                .text("min weight"),
        );
        ui.checkbox(&mut params.hide_disconnected, "Hide disconnected nodes");

        if let Some(problem) = self.engine.focus_problem() {
            ui.colored_label(egui::Color32::from_rgb(240, 170, 90), problem.to_string());
        }

        self.engine.set_params(params);

        ui.separator();
        ui.heading("Layout");
        ui.checkbox(&mut self.live_physics, "Live physics");
        ui.horizontal(|ui| {
            if ui.button("Reheat").clicked() {
                self.engine.solver_mut().reheat();
            }
            if ui.button("Fit to view").clicked() {
                self.fit_requested = true;
            }
        });
        ui.horizontal(|ui| {
            if ui.button("Clear focus").clicked() {
                self.engine.update_params(|params| {
                    params.node_focus = None;
                    params.secondary_focus = None;
                });
            }
            if ui.button("Reset filters").clicked() {
                self.engine.set_params(Default::default());
            }
        });

        ui.separator();
        let visible = self.engine.visible_graph();
        ui.label(format!(
            "Showing {} of {} nodes, {} of {} edges",
            visible.node_count(),
            self.engine.full_graph().node_count(),
            visible.edge_count(),
            self.engine.full_graph().edge_count(),
        ));
        if visible.edge_count() == 0 {
            ui.weak("No relations match the current filters.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestions_rank_closer_matches_first() {
        let ids = ["Alpha Group", "Beta", "alphabet soup", "Gamma"]
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>();

        let found = suggestions(&ids, "alph");
        assert_eq!(found.len(), 2);
        assert!(found.contains(&"Alpha Group"));
        assert!(found.contains(&"alphabet soup"));
        assert!(suggestions(&ids, "   ").is_empty());
    }
}
