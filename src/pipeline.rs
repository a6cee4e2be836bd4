/// Per-walk load → profile → estimate → compare
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::{error, info, warn};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::ascent::{self, AscentEstimate};
use crate::config::Settings;
use crate::consistency::{check_all, ComparisonResult};
use crate::error::{Result, WalkError};
use crate::reference::{ReferenceFigures, WalkRecord, WalkSelection};
use crate::track::{self, Profile};

/// Everything derived from a walk's track
#[derive(Debug, Clone)]
pub struct TrackAnalysis {
    pub track_path: PathBuf,
    pub point_count: usize,
    pub profile: Profile,
    pub mean_point: (f64, f64),
    pub start: (f64, f64),
    pub end: (f64, f64),
    pub total_distance_km: f64,
    pub max_elevation_m: f64,
    pub ascent: AscentEstimate,
    pub comparisons: Vec<ComparisonResult>,
}

#[derive(Debug)]
pub struct WalkReport {
    pub name: String,
    pub record: WalkRecord,
    pub reference: ReferenceFigures,
    /// Track errors are recovered here so the walk's other details still render
    pub outcome: std::result::Result<TrackAnalysis, WalkError>,
}

impl WalkReport {
    pub fn analysis(&self) -> Option<&TrackAnalysis> {
        self.outcome.as_ref().ok()
    }

    pub fn flagged_count(&self) -> usize {
        self.analysis()
            .map(|a| a.comparisons.iter().filter(|c| c.flagged).count())
            .unwrap_or(0)
    }
}

/// Analyse the selected walk's track and compare it with the reference figures
pub fn analyse_track(path: &Path, reference: &ReferenceFigures, settings: &Settings) -> Result<TrackAnalysis> {
    let track = track::load(path)?;
    if track.len() < 2 {
        return Err(WalkError::InsufficientData { points: track.len() });
    }

    let profile = track::derive_profile(&track);
    let estimate = ascent::estimate(&profile, &settings.ascent)?;
    let total_distance_km = profile.total_distance_km();
    let max_elevation_m = profile.max_elevation().unwrap_or(0.0);

    let comparisons = check_all(
        total_distance_km,
        max_elevation_m,
        estimate.total_ascent_m,
        reference,
        &settings.check,
    );

    let (start, end) = track::endpoints(&track);

    Ok(TrackAnalysis {
        track_path: path.to_path_buf(),
        point_count: track.len(),
        mean_point: track::mean_point(&track),
        start,
        end,
        total_distance_km,
        max_elevation_m,
        ascent: estimate,
        comparisons,
        profile,
    })
}

/// Run one walk; never fails, recoverable track errors end up in the report
pub fn check_walk(selection: &WalkSelection, settings: &Settings) -> WalkReport {
    let outcome = match &selection.track_path {
        Some(path) => analyse_track(path, &selection.reference, settings),
        None => Err(WalkError::NotFound {
            path: PathBuf::from(selection.record.track_file.clone().unwrap_or_default()),
        }),
    };

    match &outcome {
        Err(e) if e.is_recoverable() => warn!("⚠️  {}: {}", selection.name(), e),
        Err(e) => error!("❌ {}: {}", selection.name(), e),
        Ok(_) => {}
    }

    WalkReport {
        name: selection.name().to_string(),
        record: selection.record.clone(),
        reference: selection.reference,
        outcome,
    }
}

/// Check every walk in parallel; results keep the order of `selections`
pub fn check_walks(selections: &[WalkSelection], settings: &Settings) -> Vec<WalkReport> {
    info!(
        "⚡ Checking {} walks using parallel processing on {} cores",
        selections.len(),
        num_cpus::get()
    );

    selections
        .par_iter()
        .map(|selection| check_walk(selection, settings))
        .collect()
}

/// GPX files under `gpx_dir` that no walk record points at
pub fn find_unreferenced_tracks(gpx_dir: &Path, selections: &[WalkSelection]) -> Vec<PathBuf> {
    let referenced: HashSet<PathBuf> = selections
        .iter()
        .filter_map(|s| s.track_path.clone())
        .collect();

    let mut unreferenced: Vec<PathBuf> = WalkDir::new(gpx_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .and_then(|s| s.to_str())
                    .map(|s| s.eq_ignore_ascii_case("gpx"))
                    .unwrap_or(false)
        })
        .map(|entry| entry.path().to_path_buf())
        .filter(|path| !referenced.contains(path))
        .collect();

    unreferenced.sort();
    unreferenced
}
