use eframe::egui::{self, Color32, RichText, Ui};

use crate::color::toggle_fill;
use crate::data::model::IrradianceKind;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Top bar – identifier input
// ---------------------------------------------------------------------------

/// Identifier box and "Generate Plot" button.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        let response = ui.add(
            egui::TextEdit::singleline(&mut state.input)
                .hint_text("Enter PSECELLID")
                .desired_width(450.0),
        );
        let submitted =
            response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

        let button = egui::Button::new(
            RichText::new("Generate Plot")
                .size(16.0)
                .color(Color32::WHITE),
        )
        .fill(Color32::from_rgb(0, 128, 0))
        .min_size(egui::vec2(150.0, 40.0));

        if ui.add(button).clicked() || submitted {
            state.generate();
        }
    });
}

// ---------------------------------------------------------------------------
// Status line – fit metrics and notices
// ---------------------------------------------------------------------------

pub fn status_line(ui: &mut Ui, state: &AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(RichText::new(state.metrics_line()).small());
        ui.separator();
        ui.label(
            RichText::new(format!(
                "{} cells joined, {} train / {} holdout",
                state.data.joined.len(),
                state.data.fit.train_rows,
                state.data.fit.test_rows
            ))
            .small()
            .weak(),
        );
        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).small().color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Series toggles
// ---------------------------------------------------------------------------

/// One "Toggle XXX" button per series.
pub fn series_toggles(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        for kind in IrradianceKind::ALL {
            let visible = state.visibility.is_visible(kind);
            let button = egui::Button::new(
                RichText::new(format!("Toggle {}", kind.short_name())).color(Color32::BLACK),
            )
            .fill(toggle_fill(kind, visible))
            .corner_radius(10.0)
            .min_size(egui::vec2(140.0, 32.0));

            if ui.add(button).clicked() {
                state.toggle(kind);
            }
        }
    });
}
