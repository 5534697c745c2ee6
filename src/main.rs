//! Ethereum wallet fraud checker
//!
//! Native desktop client for the wallet classification service: shows the
//! fraud probability and an interactive transaction graph.

mod api;
mod app;
mod graph;
mod settings;
mod theme;

use clap::Parser;
use eframe::egui;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Base URL of the classification API (overrides the saved setting)
    #[arg(long)]
    api_url: Option<String>,

    /// Classifier model to request (overrides the saved setting)
    #[arg(long)]
    model: Option<String>,
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut settings = settings::Settings::load();
    settings.apply_overrides(args.api_url, args.model);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 820.0])
            .with_title("Ethereum Fraud Checker"),
        persist_window: true,
        ..Default::default()
    };

    eframe::run_native(
        "Ethereum Fraud Checker",
        options,
        Box::new(move |cc| Ok(Box::new(app::FraudCheckerApp::new(cc, settings)))),
    )
}
