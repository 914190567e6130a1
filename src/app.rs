use eframe::egui;

use crate::state::{AppData, AppState};
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct IrradianceApp {
    pub state: AppState,
}

impl IrradianceApp {
    pub fn new(data: AppData) -> Self {
        Self {
            state: AppState::new(data),
        }
    }
}

impl eframe::App for IrradianceApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: identifier input, metrics, toggles ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_space(4.0);
            panels::top_bar(ui, &mut self.state);
            panels::status_line(ui, &self.state);
            panels::series_toggles(ui, &mut self.state);
            ui.add_space(4.0);
        });

        // ---- Central panel: chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::irradiance_plot(ui, &mut self.state);
        });
    }
}
