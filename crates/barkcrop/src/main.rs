//! barkcrop - interactive batch cropping of photographs.
//!
//! Walks the input tree, shows each photograph scaled down, and saves a
//! fixed-size crop around every point the operator clicks.

mod app;
mod cli;

use anyhow::{anyhow, Context, Result};
use barkcrop_core::{enumerate_sources, Session};
use clap::Parser;
use eframe::egui;
use log::info;

/// Room for the status panel above the preview.
const STATUS_PANEL_HEIGHT: f32 = 56.0;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = cli::Args::parse();
    let settings = args
        .into_settings()
        .and_then(|settings| settings.validate())
        .context("Invalid configuration")?;

    info!(
        "Cropping {} -> {} (crop {}px, output {}px, preview scale {})",
        settings.input_root.display(),
        settings.output_root.display(),
        settings.crop_size,
        settings.output_size,
        settings.display_scale.factor()
    );

    let sources = enumerate_sources(
        &settings.input_root,
        &settings.output_root,
        &settings.extensions,
    )?;
    info!("Found {} images.", sources.len());

    let mut session = Session::new(settings, sources);
    if session.advance().is_terminal() {
        info!("No decodable images, nothing to do.");
        return Ok(());
    }

    let (width, height) = session
        .preview()
        .map(|preview| (preview.width as f32, preview.height as f32))
        .unwrap_or((800.0, 600.0));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("barkcrop")
            .with_inner_size([width + 16.0, height + STATUS_PANEL_HEIGHT]),
        ..Default::default()
    };

    eframe::run_native(
        "barkcrop",
        options,
        Box::new(|_cc| Ok(Box::new(app::CropApp::new(session)))),
    )
    .map_err(|e| anyhow!("Window error: {e}"))?;

    Ok(())
}
