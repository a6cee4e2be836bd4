use std::path::PathBuf;

use clap::Parser;
use log::info;

use walk_track_checker::pipeline::{check_walk, check_walks, find_unreferenced_tracks};
use walk_track_checker::reference::{ReferenceStore, DEFAULT_RELEASE};
use walk_track_checker::report::{print_batch_summary, print_walk_report, write_profiles, write_summary_csv};
use walk_track_checker::{AscentConfig, CheckConfig, Settings};

/// Check walk records against their GPX tracks
#[derive(Debug, Parser)]
#[command(name = "walk-check", version, about)]
struct Cli {
    /// Walk records CSV
    #[arg(long, default_value = "WALKS.csv")]
    walks: PathBuf,

    /// Directory holding the per-walk GPX files
    #[arg(long, default_value = "gpx")]
    gpx_dir: PathBuf,

    /// Check a single walk by name instead of every walk
    #[arg(long)]
    walk: Option<String>,

    /// Only check walks tagged with this release
    #[arg(long, default_value = DEFAULT_RELEASE)]
    release: String,

    /// Check walks of every release
    #[arg(long)]
    all_releases: bool,

    /// List walk names and exit
    #[arg(long)]
    list: bool,

    /// Write a per-walk summary CSV here
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Write elevation profile CSVs into this directory
    #[arg(long)]
    profile_dir: Option<PathBuf>,

    /// Meters per sample below which the dense smoothing window is used
    #[arg(long)]
    density_threshold: Option<f64>,

    /// Rolling-mean window for densely sampled tracks
    #[arg(long)]
    dense_window: Option<usize>,

    /// Rolling-mean window for sparsely sampled tracks
    #[arg(long)]
    sparse_window: Option<usize>,

    /// Relative difference at which a figure is flagged
    #[arg(long)]
    flag_threshold: Option<f64>,
}

impl Cli {
    fn settings(&self) -> Settings {
        let defaults = AscentConfig::default();
        Settings {
            ascent: AscentConfig {
                density_threshold_m: self.density_threshold.unwrap_or(defaults.density_threshold_m),
                dense_window: self.dense_window.unwrap_or(defaults.dense_window),
                sparse_window: self.sparse_window.unwrap_or(defaults.sparse_window),
            },
            check: CheckConfig {
                flag_threshold: self.flag_threshold.unwrap_or(CheckConfig::default().flag_threshold),
            },
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = cli.settings();
    info!("Settings: {:?}", settings);

    let release = (!cli.all_releases).then_some(cli.release.as_str());
    let store = ReferenceStore::from_path(&cli.walks, release)?;

    if cli.list {
        for name in store.walk_names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let selections = store.selections(&cli.gpx_dir);
    let reports = match &cli.walk {
        Some(name) => match store.select(name, &cli.gpx_dir) {
            Some(selection) => vec![check_walk(&selection, &settings)],
            None => {
                println!("ℹ️  No walk named '{}' in {}", name, cli.walks.display());
                return Ok(());
            }
        },
        None => check_walks(&selections, &settings),
    };

    for report in &reports {
        print_walk_report(report);
    }

    if cli.walk.is_none() {
        let unreferenced = find_unreferenced_tracks(&cli.gpx_dir, &selections);
        print_batch_summary(&reports, &unreferenced);
    }

    if let Some(path) = &cli.summary {
        write_summary_csv(&reports, path)?;
        println!("📄 Summary CSV saved to: {}", path.display());
    }

    if let Some(dir) = &cli.profile_dir {
        let written = write_profiles(&reports, dir)?;
        println!("📁 {} elevation profiles saved to: {}", written.len(), dir.display());
    }

    Ok(())
}
