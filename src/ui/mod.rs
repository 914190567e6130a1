/// Presentation layer: egui panels and the irradiance chart.
pub mod panels;
pub mod plot;
