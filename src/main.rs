// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! MemeCanvas - caption composer
//!
//! A cross-platform desktop application for placing movable text captions
//! on an image and exporting the result as PNG. The `render` subcommand
//! flattens a saved composition without opening a window.

mod app;
mod ui;

use anyhow::{Context, Result};
use app::MemeApp;
use clap::{Parser, Subcommand};
use memecanvas::config::AppConfig;
use memecanvas::io::serialization;
use memecanvas::EditorSession;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "memecanvas", version, about)]
struct Cli {
    /// Configuration file (YAML or JSON).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a saved composition to PNG without opening a window.
    Render {
        /// Composition file (YAML or JSON).
        #[arg(long = "in")]
        in_path: PathBuf,

        /// Output PNG path.
        #[arg(long, default_value = memecanvas::io::export::EXPORT_FILE_NAME)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config =
        AppConfig::discover(cli.config.as_deref()).context("Failed to load configuration")?;

    // Initialize logging; RUST_LOG wins over the configured level
    let env = env_logger::Env::default().default_filter_or(&config.log_level);
    env_logger::Builder::from_env(env).init();

    match cli.command {
        Some(Command::Render { in_path, out }) => render_headless(&config, &in_path, &out),
        None => run_gui(config),
    }
}

fn render_headless(config: &AppConfig, in_path: &Path, out: &Path) -> Result<()> {
    let doc = serialization::open_composition(in_path)?;
    let renderer = config.renderer().context("Failed to load caption font")?;
    let mut session = EditorSession::new(renderer, config.default_font_size);
    session
        .open_document_blocking(doc)
        .with_context(|| format!("Failed to load image for {}", in_path.display()))?;
    session
        .save_png(out)
        .with_context(|| format!("Failed to export {}", out.display()))?;
    Ok(())
}

fn run_gui(config: AppConfig) -> Result<()> {
    let app = MemeApp::new(config)?;

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("MemeCanvas - Meme Generator"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "MemeCanvas",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
