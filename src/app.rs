use eframe::egui;
use salary_scenes::ViewerConfig;

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SalaryScenesApp {
    pub state: AppState,
}

impl SalaryScenesApp {
    /// Build the app and start loading the first scene.
    pub fn new(config: ViewerConfig, ctx: &egui::Context) -> Self {
        let mut state = AppState::new(config);
        state.activate(ctx);
        Self { state }
    }
}

impl eframe::App for SalaryScenesApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_load(ctx);

        // ---- Top panel: menu bar + scene navigation ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: narrative + summary table ----
        egui::SidePanel::left("story_panel")
            .default_width(300.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::scene_chart(ui, &self.state);
        });
    }
}
