mod app;
mod color;
mod config;
mod data;
mod error;
mod regression;
mod state;
mod ui;

use std::process::ExitCode;

use anyhow::{Context, Result};
use app::IrradianceApp;
use clap::Parser;
use config::{Args, Config};
use eframe::egui;
use state::AppData;

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    let config = Config::resolve(&args).context("resolving configuration")?;
    // Tables and model are ready before the first frame.
    let data = AppData::load(&config).context("preparing irradiance data")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 700.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Advanced Solar Irradiance Data Visualization",
        options,
        Box::new(move |_cc| Ok(Box::new(IrradianceApp::new(data)))),
    )
    // eframe::Error is not Send + Sync and has no `source()`; its Display
    // already carries the inner error.
    .map_err(|e| anyhow::anyhow!("UI event loop failed: {e}"))
}
