use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};
use salary_scenes::data::histogram::GroupingCriterion;
use salary_scenes::scene::{SceneData, SceneKind};

use super::format_usd;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – narrative and summary table
// ---------------------------------------------------------------------------

/// Render the left story panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    let scene = state.controller.current();
    ui.heading(scene.chart_title);
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, true])
        .max_height(ui.available_height() * 0.55)
        .show(ui, |ui: &mut Ui| {
            for paragraph in scene.caption {
                ui.label(*paragraph);
                ui.add_space(6.0);
            }
        });

    if scene.kind == SceneKind::Explore {
        ui.separator();
        ui.strong("Group by");
        let mut chosen = state.criterion;
        for criterion in GroupingCriterion::ALL {
            ui.radio_value(&mut chosen, criterion, criterion.title());
        }
        if chosen != state.criterion {
            let ctx = ui.ctx().clone();
            state.set_criterion(chosen, &ctx);
        }
    }

    ui.separator();
    match &state.data {
        Some(Ok(data)) => summary_table(ui, data),
        Some(Err(_)) | None => {
            ui.weak("No summary available.");
        }
    }
}

/// Aggregated rows of the current scene.
fn summary_table(ui: &mut Ui, data: &SceneData) {
    let (headers, rows): ([&str; 3], Vec<[String; 3]>) = match data {
        SceneData::Trend(points) => (
            ["Year", "Mean salary", ""],
            points
                .iter()
                .map(|p| [p.year.to_string(), format_usd(p.mean_salary), String::new()])
                .collect(),
        ),
        SceneData::Comparison(groups) => (
            ["Group", "Mean salary", "Jobs"],
            groups
                .iter()
                .map(|g| [g.label.clone(), format_usd(g.mean_salary), g.job_count.to_string()])
                .collect(),
        ),
        SceneData::Explore { bins, .. } => (
            ["Salary range", "Jobs", ""],
            bins.iter()
                .map(|b| [b.range_label(), b.total_count.to_string(), String::new()])
                .collect(),
        ),
    };

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(90.0))
        .column(Column::auto().at_least(80.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in headers {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for row_values in &rows {
                body.row(18.0, |mut row| {
                    for value in row_values {
                        row.col(|ui| {
                            ui.label(value.as_str());
                        });
                    }
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu and the scene buttons.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    let ctx = ui.ctx().clone();
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state, &ctx);
                ui.close_menu();
            }
        });

        ui.separator();

        let current = state.controller.state().index;
        for (index, scene) in state.controller.scenes().iter().enumerate() {
            let enabled = state.controller.is_enabled(index);
            let button = egui::Button::new(scene.title).selected(index == current);
            if ui.add_enabled(enabled, button).clicked() {
                state.go_to(index, &ctx);
            }
        }

        ui.separator();

        if ui.button("Next ▶").clicked() {
            state.next_scene(&ctx);
        }

        ui.separator();

        if state.loading() {
            ui.spinner();
        } else if let Some(table) = &state.table {
            ui.label(format!("{} jobs", table.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState, ctx: &egui::Context) {
    let file = rfd::FileDialog::new()
        .set_title("Open salary data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_dataset(path, ctx);
    }
}
