mod app;
mod config;
mod engine;
mod interaction;
mod layout;
mod model;
mod records;
mod util;

use anyhow::anyhow;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    records: String,

    #[arg(long)]
    config: Option<String>,

    #[arg(long, default_value_t = 0)]
    warmup_ticks: usize,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("relgraph=info")),
        )
        .init();

    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref())?;
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    let Args {
        records,
        warmup_ticks,
        ..
    } = args;
    eframe::run_native(
        "relgraph",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::RelGraphApp::new(
                cc,
                records,
                settings,
                warmup_ticks,
            )))
        }),
    )
    .map_err(|error| anyhow!("{error}"))
}
