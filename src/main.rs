mod app;
mod color;
mod state;
mod ui;

use app::SalaryScenesApp;
use eframe::egui;
use salary_scenes::ViewerConfig;

fn main() -> eframe::Result {
    env_logger::init();

    let config = match ViewerConfig::resolve(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Ignoring config: {e:#}");
            ViewerConfig::default()
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 760.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Salary Scenes – Data Scientist Salaries",
        options,
        Box::new(|cc| Ok(Box::new(SalaryScenesApp::new(config, &cc.egui_ctx)))),
    )
}
