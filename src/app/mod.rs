use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{Context, Pos2};
use tracing::{error, info};

use crate::config::ViewerConfig;
use crate::dataset::{DatasetError, DatasetKind, LoadedDataset, read_dataset_file};

mod controller;
mod engine;
mod graph;
mod physics;
mod render_utils;
mod selection;
mod ui;
mod view_adapter;

use controller::{Controller, GenerationSummary};
use engine::ForceEngine;

pub struct GraphViewerApp {
    model: ViewModel,
}

struct PendingLoad {
    kind: DatasetKind,
    rx: Receiver<Result<LoadedDataset, DatasetError>>,
}

struct ViewModel {
    controller: Controller,
    engine: ForceEngine,
    pending_loads: Vec<PendingLoad>,
    entities_file: Option<String>,
    relationships_file: Option<String>,
    generate_when_loaded: bool,
    last_summary: Option<GenerationSummary>,
    search: String,
    export_dir: PathBuf,
    alert: Option<String>,
    status: Option<String>,
    region_drag: Option<(Pos2, Pos2)>,
}

/// Pointer gestures on the canvas that change application state.
#[derive(Clone, Copy, Debug, PartialEq)]
enum CanvasEvent {
    NodeClicked(usize),
    LinkClicked(usize),
    BackgroundClicked,
    RegionDrawn { start: Pos2, end: Pos2 },
}

impl GraphViewerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: ViewerConfig) -> Self {
        ui::apply_theme(&cc.egui_ctx, config.dark_mode);

        let mut model = ViewModel::new(&config);
        if let Some(path) = config.entities {
            model.start_load(DatasetKind::Entities, path);
        }
        if let Some(path) = config.relationships {
            model.start_load(DatasetKind::Relationships, path);
        }
        model.generate_when_loaded = model.pending_loads.len() == 2;

        Self { model }
    }
}

impl ViewModel {
    fn spawn_load(path: PathBuf, kind: DatasetKind) -> Receiver<Result<LoadedDataset, DatasetError>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = read_dataset_file(kind, &path);
            let _ = tx.send(result);
        });

        rx
    }

    pub(in crate::app) fn start_load(&mut self, kind: DatasetKind, path: PathBuf) {
        info!(%kind, path = %path.display(), "loading dataset");
        self.pending_loads.retain(|pending| pending.kind != kind);
        self.pending_loads.push(PendingLoad {
            kind,
            rx: Self::spawn_load(path, kind),
        });
    }

    pub(in crate::app) fn is_loading(&self) -> bool {
        !self.pending_loads.is_empty()
    }

    fn file_name_slot(&mut self, kind: DatasetKind) -> &mut Option<String> {
        match kind {
            DatasetKind::Entities => &mut self.entities_file,
            DatasetKind::Relationships => &mut self.relationships_file,
        }
    }

    pub(in crate::app) fn forget_dataset(&mut self, kind: DatasetKind) {
        self.pending_loads.retain(|pending| pending.kind != kind);
        self.controller.clear_dataset(kind);
        *self.file_name_slot(kind) = None;
    }

    fn poll_loads(&mut self) {
        let mut finished = Vec::new();
        self.pending_loads.retain(|pending| match pending.rx.try_recv() {
            Ok(result) => {
                finished.push((pending.kind, Ok(result)));
                false
            }
            Err(TryRecvError::Empty) => true,
            Err(TryRecvError::Disconnected) => {
                finished.push((pending.kind, Err(())));
                false
            }
        });

        for (kind, outcome) in finished {
            match outcome {
                Ok(Ok(dataset)) => {
                    *self.file_name_slot(kind) = Some(dataset.file_name());
                    self.controller.load_dataset(dataset);
                }
                Ok(Err(load_error)) => {
                    self.forget_dataset(kind);
                    self.generate_when_loaded = false;
                    self.raise_alert(load_error.to_string());
                }
                Err(()) => {
                    self.forget_dataset(kind);
                    self.generate_when_loaded = false;
                    self.raise_alert(format!("Background {kind} loader disconnected"));
                }
            }
        }

        if self.generate_when_loaded && !self.is_loading() {
            self.generate_when_loaded = false;
            self.generate();
        }
    }

    pub(in crate::app) fn generate(&mut self) {
        match self.controller.generate(&mut self.engine) {
            Ok(summary) => {
                self.last_summary = Some(summary);
                self.region_drag = None;
            }
            Err(generate_error) => self.raise_alert(generate_error.to_string()),
        }
    }

    pub(in crate::app) fn reset(&mut self) {
        match self.controller.reset(&mut self.engine) {
            Ok(Some(summary)) => {
                self.last_summary = Some(summary);
                self.region_drag = None;
            }
            Ok(None) => {}
            Err(reset_error) => self.raise_alert(reset_error.to_string()),
        }
    }

    pub(in crate::app) fn raise_alert(&mut self, message: String) {
        error!(%message, "user-visible error");
        self.alert = Some(message);
    }
}

impl eframe::App for GraphViewerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.model.poll_loads();
        self.model.show(ctx);

        if self.model.is_loading() {
            ctx.request_repaint();
        }
    }
}
