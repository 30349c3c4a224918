#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::path::PathBuf;

use clap::Parser;
use serde_json::json;
use tracing::{error, info};

use gridsync::app::GridApp;
use gridsync::column::ColumnKind;
use gridsync::host::DataSet;
use gridsync::logging::{self, LoggingConfig};
use gridsync::options::{GridOptions, GridSettings};

/// Windowed data grid viewer
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON file with grid options
    #[arg(long)]
    options: Option<PathBuf>,

    /// Show the add/remove row toolbar
    #[arg(long)]
    toolbar: bool,

    /// Serve a generated table of this many rows instead of a file
    #[arg(long, conflicts_with = "path")]
    demo: Option<usize>,

    /// CSV or Parquet file to open
    path: Option<PathBuf>,
}

fn demo_dataset(rows: usize) -> gridsync::error::Result<DataSet> {
    let labels = ["alpha", "beta", "gamma", "delta", "epsilon"];
    DataSet::from_columns(vec![
        (
            "label".to_string(),
            ColumnKind::String,
            (0..rows).map(|i| json!(labels[i % labels.len()])).collect(),
        ),
        (
            "value".to_string(),
            ColumnKind::Number,
            (0..rows).map(|i| json!((i as f64 * 0.37).sin() * 100.0)).collect(),
        ),
        (
            "count".to_string(),
            ColumnKind::Integer,
            (0..rows).map(|i| json!((i * 7) % 1000)).collect(),
        ),
        (
            "flag".to_string(),
            ColumnKind::Boolean,
            (0..rows).map(|i| json!(i % 3 == 0)).collect(),
        ),
        (
            "date".to_string(),
            ColumnKind::Datetime,
            (0..rows)
                .map(|i| json!(format!("2024-{:02}-{:02}T00:00:00.000Z", i % 12 + 1, i % 28 + 1)))
                .collect(),
        ),
    ])
}

fn main() -> eframe::Result {
    logging::init(&LoggingConfig::default());
    let args = Args::parse();

    #[cfg(feature = "profile-with-puffin")]
    let _puffin_server = {
        puffin::set_scopes_on(true);
        puffin_http::Server::new(&format!("127.0.0.1:{}", puffin_http::DEFAULT_PORT)).ok()
    };

    let options = match &args.options {
        Some(path) => GridOptions::load(path).unwrap_or_else(|e| {
            error!(path = %path.display(), error = %e, "invalid options file, using defaults");
            GridOptions::default()
        }),
        None => GridOptions::default(),
    };
    let settings = GridSettings {
        options,
        show_toolbar: args.toolbar,
        ..GridSettings::default()
    };

    let app = match args.demo {
        Some(rows) => match demo_dataset(rows) {
            Ok(data) => GridApp::with_dataset(settings, data),
            Err(e) => {
                error!(error = %e, "demo table");
                GridApp::new(settings, None)
            }
        },
        None => GridApp::new(settings, args.path),
    };
    info!("starting viewer");

    eframe::run_native(
        "gridsync",
        eframe::NativeOptions::default(),
        Box::new(|_| Ok(Box::new(app))),
    )
}
