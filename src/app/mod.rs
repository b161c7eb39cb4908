use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context};
use tracing::{error, info};

use crate::config::Settings;
use crate::engine::GraphEngine;
use crate::interaction::InteractionController;
use crate::model::{GraphError, build};
use crate::records::{RelationRecord, load_records};

mod graph;
mod render_utils;
mod ui;

type LoadResult = Result<Vec<RelationRecord>, String>;

pub struct RelGraphApp {
    records_path: String,
    settings: Settings,
    warmup_ticks: usize,
    state: AppState,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    NoData,
    Error(String),
}

struct ViewModel {
    engine: GraphEngine,
    interaction: InteractionController,
    live_physics: bool,
    fit_requested: bool,
    focus_search: String,
    secondary_search: String,
    node_ids: Vec<String>,
    labels: Vec<String>,
    max_weight: u32,
    hovered_node: Option<usize>,
    hovered_edge: Option<usize>,
}

impl RelGraphApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        records_path: String,
        settings: Settings,
        warmup_ticks: usize,
    ) -> Self {
        let state = Self::start_load(records_path.clone());
        Self {
            records_path,
            settings,
            warmup_ticks,
            state,
        }
    }

    fn start_load(records_path: String) -> AppState {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_records(&records_path).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        AppState::Loading { rx }
    }

    fn ready_state(&self, records: Vec<RelationRecord>) -> AppState {
        match build(&records) {
            Ok(graph) => {
                let mut engine = GraphEngine::new(&self.settings);
                engine.load(graph);
                Self::warm_up(&mut engine, self.warmup_ticks);
                AppState::Ready(Box::new(ViewModel::new(
                    engine,
                    InteractionController::new(self.settings.view),
                )))
            }
            Err(GraphError::EmptyInput) => {
                info!(path = %self.records_path, "record file produced no graph");
                AppState::NoData
            }
            Err(other) => AppState::Error(other.to_string()),
        }
    }

    fn warm_up(engine: &mut GraphEngine, ticks: usize) {
        engine.refresh();
        if ticks > 0 {
            engine.solver_mut().tick_n(ticks);
            info!(ticks, state = engine.state().label(), "layout warm-up finished");
        }
    }
}

impl eframe::App for RelGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(records)) => transition = Some(Ok(records)),
                    Ok(Err(message)) => {
                        error!(%message, "failed to load relation records");
                        transition = Some(Err(message));
                    }
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Err("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading relation records...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint();
            }
            AppState::NoData => {
                let mut retry = false;
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("No data");
                    ui.add_space(6.0);
                    ui.label(format!(
                        "{} contains no usable relation records.",
                        self.records_path
                    ));
                    ui.add_space(10.0);
                    retry = ui.button("Reload").clicked();
                });
                if retry {
                    self.state = Self::start_load(self.records_path.clone());
                }
            }
            AppState::Error(message) => {
                let mut retry = false;
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load relation records");
                    ui.add_space(6.0);
                    ui.label(message.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
                if retry {
                    self.state = Self::start_load(self.records_path.clone());
                }
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                model.show(ctx, &self.records_path, &mut reload_requested);
                if reload_requested {
                    model.engine.shutdown();
                    self.state = Self::start_load(self.records_path.clone());
                }
            }
        }

        if let Some(result) = transition {
            self.state = match result {
                Ok(records) => self.ready_state(records),
                Err(message) => AppState::Error(message),
            };
        }
    }
}

impl Drop for ViewModel {
    fn drop(&mut self) {
        self.engine.shutdown();
    }
}
