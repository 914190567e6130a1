use eframe::egui::{RichText, Ui};
use egui_plot::{GridMark, Legend, Line, Plot, PlotPoints};

use crate::color::series_color;
use crate::data::lookup::CellSeries;
use crate::data::model::{MONTH_COUNT, MONTH_LABELS};
use crate::state::{AppState, ChartState};

// ---------------------------------------------------------------------------
// Irradiance chart (central panel)
// ---------------------------------------------------------------------------

/// Render the chart, or a placeholder when there is nothing to plot.
pub fn irradiance_plot(ui: &mut Ui, state: &mut AppState) {
    // A new chart starts from fresh bounds.
    let reset = std::mem::take(&mut state.chart_changed);
    match &state.chart {
        ChartState::Idle => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Enter a PSECELLID and press Generate Plot");
            });
        }
        ChartState::NoData { cell_id } => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading(format!(
                    "No data available for the given PSECELLID ({cell_id})"
                ));
            });
        }
        ChartState::Series(cell) => series_plot(ui, state, cell, reset),
    }
}

fn series_plot(ui: &mut Ui, state: &AppState, cell: &CellSeries, reset: bool) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(format!("NREL CSR Model Output, Cell ID = {}", cell.cell_id));
        ui.label(
            RichText::new(format!("Latitude: {}, Longitude: {}", cell.lat, cell.lon)).size(14.0),
        );
        ui.label(
            RichText::new(format!(
                "Annual (TILT): observed {:.2}, predicted {:.2}",
                cell.annual,
                cell.predicted_annual(&state.data.fit.model)
            ))
            .weak(),
        );
    });

    let mut plot = Plot::new("irradiance_plot")
        .legend(Legend::default())
        .x_axis_label("Months")
        .y_axis_label("Irradiance (watt-hr/M2/day)")
        .x_axis_formatter(|mark: GridMark, _range| month_label(mark.value))
        .x_grid_spacer(egui_plot::uniform_grid_spacer(|_| [1.0, 3.0, 12.0]))
        .show_grid(true)
        .include_x(-0.5)
        .include_x(MONTH_COUNT as f64 - 0.5)
        .include_y(0.0)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);
    if reset {
        plot = plot.reset();
    }

    plot.show(ui, |plot_ui| {
        for kind in state.visibility.visible() {
            let points: PlotPoints = cell
                .series(kind)
                .iter()
                .enumerate()
                .map(|(m, &v)| [m as f64, v])
                .collect();

            let line = Line::new(points)
                .name(kind.label())
                .color(series_color(kind))
                .width(2.0);

            plot_ui.line(line);
        }
    });
}

/// Month abbreviation at integer positions 0..12, blank elsewhere.
fn month_label(x: f64) -> String {
    let rounded = x.round();
    if (x - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    MONTH_LABELS
        .get(rounded as usize)
        .map(|m| m.to_string())
        .unwrap_or_default()
}
