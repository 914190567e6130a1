use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::IrradianceKind;

// ---------------------------------------------------------------------------
// Series colours
// ---------------------------------------------------------------------------

/// Line colour of each series: blue, red, green, purple.
pub fn series_color(kind: IrradianceKind) -> Color32 {
    match kind {
        IrradianceKind::Direct => Color32::from_rgb(0, 0, 255),
        IrradianceKind::Global => Color32::from_rgb(255, 0, 0),
        IrradianceKind::Tilted => Color32::from_rgb(0, 128, 0),
        IrradianceKind::Diffuse => Color32::from_rgb(128, 0, 128),
    }
}

/// Pastel fill for the toggle button of `kind`; greyed out while hidden.
pub fn toggle_fill(kind: IrradianceKind, visible: bool) -> Color32 {
    let (lightness, saturation_scale) = if visible { (0.8, 1.0) } else { (0.85, 0.15) };
    with_lightness(series_color(kind), lightness, saturation_scale)
}

/// Same hue as `color` at the given HSL lightness.
fn with_lightness(color: Color32, lightness: f32, saturation_scale: f32) -> Color32 {
    let rgb = Srgb::new(
        color.r() as f32 / 255.0,
        color.g() as f32 / 255.0,
        color.b() as f32 / 255.0,
    );
    let mut hsl: Hsl = rgb.into_color();
    hsl.lightness = lightness;
    hsl.saturation *= saturation_scale;
    let out: Srgb = hsl.into_color();
    Color32::from_rgb(
        (out.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (out.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (out.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}
