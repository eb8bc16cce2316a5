use std::f32::consts::TAU;

use eframe::egui::{Align2, Color32, FontId, Pos2, RichText, Sense, Shape, Stroke, Ui, Vec2};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoint, PlotPoints, Text};
use salary_scenes::data::aggregate::{GroupSummary, TrendPoint};
use salary_scenes::data::histogram::{GroupingCriterion, HistogramBin};
use salary_scenes::scene::{Scene, SceneData};

use super::format_usd;
use crate::color::{ColorMap, TREND_COLOR};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the chart(s) of the current scene.
pub fn scene_chart(ui: &mut Ui, state: &AppState) {
    let scene = state.controller.current();

    let data = match &state.data {
        Some(Ok(data)) => data,
        Some(Err(e)) => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.label(
                    RichText::new(format!("Cannot draw '{}': {e}", scene.chart_title))
                        .color(Color32::RED)
                        .heading(),
                );
            });
            return;
        }
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                if state.loading() {
                    ui.spinner();
                } else if state.status_message.is_some() {
                    ui.heading("The dataset could not be loaded (File → Open… to pick another)");
                } else {
                    ui.heading("No data");
                }
            });
            return;
        }
    };

    let now = ui.input(|i| i.time);
    let progress = state.grow_progress(now);
    if progress < 1.0 {
        ui.ctx().request_repaint();
    }

    let fallback = ColorMap::new(Vec::<String>::new());
    let colors = state.color_map.as_ref().unwrap_or(&fallback);

    match data {
        SceneData::Trend(points) => trend_chart(ui, scene, points, progress),
        SceneData::Comparison(groups) => comparison_charts(ui, scene, groups, colors, progress),
        SceneData::Explore { criterion, bins } => {
            explore_chart(ui, scene, *criterion, bins, colors, progress)
        }
    }
}

// ---------------------------------------------------------------------------
// Trend: filled area of mean salary per year
// ---------------------------------------------------------------------------

fn trend_chart(ui: &mut Ui, scene: &Scene, points: &[TrendPoint], progress: f64) {
    let top = points.iter().map(|p| p.mean_salary).max().unwrap_or(0) as f64;
    let line_points: PlotPoints = points
        .iter()
        .map(|p| [f64::from(p.year), p.mean_salary as f64 * progress])
        .collect();

    let line = Line::new(line_points)
        .name("Mean salary")
        .color(TREND_COLOR)
        .fill(0.0)
        .width(1.5);

    ui.label(RichText::new(scene.chart_title).strong());
    Plot::new(("trend", scene.title))
        .x_axis_label(scene.x_axis)
        .y_axis_label(scene.y_axis)
        .include_y(0.0)
        .include_y(top * 1.1)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(line);
        });
}

// ---------------------------------------------------------------------------
// Comparison: mean salary bars + job count pie
// ---------------------------------------------------------------------------

fn comparison_charts(
    ui: &mut Ui,
    scene: &Scene,
    groups: &[GroupSummary],
    colors: &ColorMap,
    progress: f64,
) {
    ui.columns(2, |columns| {
        salary_bars(&mut columns[0], scene, groups, colors, progress);
        job_count_pie(&mut columns[1], scene.pie_title, groups, colors, progress);
    });
}

fn salary_bars(ui: &mut Ui, scene: &Scene, groups: &[GroupSummary], colors: &ColorMap, progress: f64) {
    let top = groups.iter().map(|g| g.mean_salary).max().unwrap_or(0) as f64;

    ui.label(RichText::new(scene.chart_title).strong());
    Plot::new(("bars", scene.title))
        .legend(Legend::default())
        .x_axis_label(scene.x_axis)
        .y_axis_label(scene.y_axis)
        .include_y(0.0)
        .include_y(top * 1.15)
        .show_x(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (i, group) in groups.iter().enumerate() {
                let color = colors.color_for(&group.label);
                let bar = Bar::new(i as f64, group.mean_salary as f64 * progress)
                    .width(0.7)
                    .name(&group.label)
                    .fill(color);
                let mean = group.mean_salary;
                let jobs = group.job_count;
                let chart = BarChart::new(vec![bar])
                    .name(&group.label)
                    .color(color)
                    .element_formatter(Box::new(move |bar: &Bar, _chart: &BarChart| {
                        format!("{}\nMean salary: {}\nJobs: {jobs}", bar.name, format_usd(mean))
                    }));
                plot_ui.bar_chart(chart);
            }
            for ([x, y], text) in bar_value_labels(groups, progress) {
                plot_ui.text(
                    Text::new(PlotPoint::new(x, y), RichText::new(text).small())
                        .anchor(Align2::CENTER_BOTTOM),
                );
            }
        });
}

/// Mean salary written above each bar at its current height.
fn bar_value_labels(groups: &[GroupSummary], progress: f64) -> Vec<([f64; 2], String)> {
    groups
        .iter()
        .enumerate()
        .map(|(i, g)| ([i as f64, g.mean_salary as f64 * progress], format_usd(g.mean_salary)))
        .collect()
}

fn job_count_pie(ui: &mut Ui, title: &str, groups: &[GroupSummary], colors: &ColorMap, progress: f64) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(RichText::new(title).strong());
    });

    let total: usize = groups.iter().map(|g| g.job_count).sum();
    if total == 0 {
        ui.weak("No jobs to show.");
        return;
    }

    let side = ui.available_width().min(ui.available_height() - 90.0).max(120.0);
    let (response, painter) = ui.allocate_painter(Vec2::splat(side), Sense::hover());
    let center = response.rect.center();
    let radius = side * 0.45;

    // Sweep grows from zero to a full turn.
    let sweep = TAU * progress as f32;
    let mut start = -TAU / 4.0;
    let mut slices = Vec::with_capacity(groups.len());
    for group in groups {
        let angle = sweep * group.job_count as f32 / total as f32;
        let color = colors.color_for(&group.label);
        for shape in sector_shapes(center, radius, start, angle, color) {
            painter.add(shape);
        }
        if angle > 0.25 {
            let mid = start + angle / 2.0;
            painter.text(
                center + Vec2::angled(mid) * radius * 0.65,
                Align2::CENTER_CENTER,
                group.job_count.to_string(),
                FontId::proportional(12.0),
                Color32::WHITE,
            );
        }
        slices.push((start, angle));
        start += angle;
    }

    let hovered = response.hover_pos().and_then(|pos| {
        let offset = pos - center;
        if offset.length() > radius {
            return None;
        }
        let angle = (offset.angle() + TAU / 4.0).rem_euclid(TAU) - TAU / 4.0;
        slices
            .iter()
            .position(|&(s, a)| angle >= s && angle < s + a)
    });
    if let Some(i) = hovered {
        let group = &groups[i];
        let share = 100.0 * group.job_count as f64 / total as f64;
        response.on_hover_text_at_pointer(format!("{}\nJobs: {} ({share:.1}%)", group.label, group.job_count));
    }

    ui.add_space(6.0);
    for (label, color) in colors.legend_entries() {
        legend_row(ui, label, *color);
    }
}

/// Filled pie slice from `start` through `angle` radians, split into
/// wedges of at most a quarter turn so each polygon stays convex.
fn sector_shapes(center: Pos2, radius: f32, start: f32, angle: f32, color: Color32) -> Vec<Shape> {
    if angle <= 0.0 {
        return Vec::new();
    }
    let wedges = (angle / (TAU / 4.0)).ceil() as usize;
    let wedge_angle = angle / wedges as f32;
    (0..wedges)
        .map(|w| {
            let from = start + wedge_angle * w as f32;
            let steps = 16;
            let mut points = Vec::with_capacity(steps + 2);
            points.push(center);
            for s in 0..=steps {
                let a = from + wedge_angle * s as f32 / steps as f32;
                points.push(center + Vec2::angled(a) * radius);
            }
            Shape::convex_polygon(points, color, Stroke::NONE)
        })
        .collect()
}

fn legend_row(ui: &mut Ui, label: &str, color: Color32) {
    ui.horizontal(|ui: &mut Ui| {
        let (rect, _) = ui.allocate_exact_size(Vec2::splat(14.0), Sense::hover());
        ui.painter().rect_filled(rect, 2.0, color);
        ui.label(label);
    });
}

// ---------------------------------------------------------------------------
// Explore: stacked salary histogram
// ---------------------------------------------------------------------------

fn explore_chart(
    ui: &mut Ui,
    scene: &Scene,
    criterion: GroupingCriterion,
    bins: &[HistogramBin],
    colors: &ColorMap,
    progress: f64,
) {
    let top = bins.iter().map(|b| b.total_count).max().unwrap_or(0) as f64;

    ui.horizontal(|ui: &mut Ui| {
        ui.label(RichText::new(scene.chart_title).strong());
        ui.weak("Hover over the bars to see more details");
    });

    let mut charts: Vec<BarChart> = Vec::new();
    for key in criterion.cross_tab().keys {
        let label = criterion.label_for(&key).to_string();
        let color = colors.color_for(&key);
        let bars: Vec<Bar> = bins
            .iter()
            .map(|bin| {
                let width = bin.range_end - bin.range_start;
                Bar::new(bin.range_start + width / 2.0, bin.count(&key) as f64 * progress)
                    .width(width * 0.9)
                    .name(bin.range_label())
                    .fill(color)
            })
            .collect();

        let series = label.clone();
        let chart = BarChart::new(bars)
            .name(&label)
            .color(color)
            .element_formatter(Box::new(move |bar: &Bar, _chart: &BarChart| {
                format!("{series}\n{}\nJobs: {}", bar.name, bar.value.round())
            }));
        let below: Vec<&BarChart> = charts.iter().collect();
        let chart = chart.stack_on(&below);
        charts.push(chart);
    }

    Plot::new(("explore", criterion.title()))
        .legend(Legend::default())
        .x_axis_label(scene.x_axis)
        .y_axis_label(scene.y_axis)
        .include_y(0.0)
        .include_y(top * 1.1)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_slices_are_split_into_convex_wedges() {
        let shapes = sector_shapes(Pos2::ZERO, 10.0, 0.0, TAU * 0.99, Color32::RED);
        assert_eq!(shapes.len(), 4);
        assert!(sector_shapes(Pos2::ZERO, 10.0, 0.0, 0.0, Color32::RED).is_empty());
        assert_eq!(sector_shapes(Pos2::ZERO, 10.0, 0.0, 0.5, Color32::RED).len(), 1);
    }

    #[test]
    fn every_bar_is_labelled_with_its_mean() {
        let groups = vec![
            GroupSummary {
                label: "Junior".into(),
                mean_salary: 70_000,
                job_count: 2,
            },
            GroupSummary {
                label: "Senior".into(),
                mean_salary: 150_500,
                job_count: 1,
            },
        ];
        let labels = bar_value_labels(&groups, 0.5);
        assert_eq!(
            labels,
            vec![
                ([0.0, 35_000.0], "$70,000".to_string()),
                ([1.0, 75_250.0], "$150,500".to_string()),
            ]
        );
    }
}
