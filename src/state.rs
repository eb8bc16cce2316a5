use std::path::PathBuf;

use eframe::egui;
use salary_scenes::data::histogram::GroupingCriterion;
use salary_scenes::data::model::RecordTable;
use salary_scenes::data::reload::TableLoader;
use salary_scenes::scene::{SceneController, SceneData};
use salary_scenes::{AggregateError, ViewerConfig};

use crate::color::ColorMap;

/// Seconds for bars, slices and areas to grow in after a scene appears.
pub const GROW_SECONDS: f64 = 1.0;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: ViewerConfig,

    /// Only writer of the current scene index.
    pub controller: SceneController,

    loader: TableLoader,

    /// Table of the current activation (None until its load completes).
    pub table: Option<RecordTable>,

    /// Aggregated data for the current scene, or why it could not be built.
    pub data: Option<Result<SceneData, AggregateError>>,

    /// Explorer split.
    pub criterion: GroupingCriterion,

    /// Colours for the labels of `data`.
    pub color_map: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// `egui` time at which `data` arrived; drives the grow-in.
    pub shown_at: f64,
}

impl AppState {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            controller: SceneController::default(),
            loader: TableLoader::new(),
            table: None,
            data: None,
            criterion: GroupingCriterion::default(),
            color_map: None,
            status_message: None,
            shown_at: 0.0,
        }
    }

    /// Whether the current activation is still waiting for its table.
    pub fn loading(&self) -> bool {
        self.loader.is_loading()
    }

    /// (Re)load the dataset for the current scene.  A newer activation
    /// supersedes any load still in flight.
    pub fn activate(&mut self, ctx: &egui::Context) {
        self.table = None;
        self.data = None;
        self.color_map = None;
        let repaint = ctx.clone();
        self.loader
            .request(self.config.data_path.clone(), move || repaint.request_repaint());
    }

    /// Pick up a finished load, if any.
    pub fn poll_load(&mut self, ctx: &egui::Context) {
        let Some(result) = self.loader.poll() else {
            return;
        };
        match result {
            Ok(table) => {
                self.status_message = None;
                self.table = Some(table);
                self.recompute();
                self.shown_at = ctx.input(|i| i.time);
            }
            Err(e) => {
                log::error!("Failed to load dataset: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
                self.table = None;
                self.data = None;
            }
        }
    }

    /// Re-run the current scene's aggregation over the loaded table.
    pub fn recompute(&mut self) {
        let Some(table) = &self.table else {
            return;
        };
        let scene = self.controller.current();
        let data = scene.compute(table, &self.config, self.criterion);
        if let Err(e) = &data {
            log::warn!("Scene '{}' has no data: {e}", scene.title);
        }
        self.color_map = data.as_ref().ok().map(ColorMap::for_scene_data);
        self.data = Some(data);
    }

    pub fn next_scene(&mut self, ctx: &egui::Context) {
        self.controller.advance();
        self.activate(ctx);
    }

    pub fn go_to(&mut self, index: usize, ctx: &egui::Context) {
        match self.controller.go_to(index) {
            Ok(_) => self.activate(ctx),
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }

    /// Change the explorer split; the scene is activated again.
    pub fn set_criterion(&mut self, criterion: GroupingCriterion, ctx: &egui::Context) {
        self.criterion = criterion;
        self.activate(ctx);
    }

    /// Point the viewer at another dataset file.
    pub fn open_dataset(&mut self, path: PathBuf, ctx: &egui::Context) {
        log::info!("Switching dataset to {}", path.display());
        self.config.data_path = path;
        self.activate(ctx);
    }

    /// Grow-in progress in `[0, 1]` at `now`.
    pub fn grow_progress(&self, now: f64) -> f64 {
        ((now - self.shown_at) / GROW_SECONDS).clamp(0.0, 1.0)
    }
}
