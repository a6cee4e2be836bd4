/// Walk records and their recorded reference figures, read from WALKS.csv
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use log::{info, warn};
use serde::Deserialize;

use crate::error::{Result, WalkError};

pub const DEFAULT_RELEASE: &str = "Release1";

/// Recorded figures a walk's track is checked against.
/// A missing or non-positive value means the field was never populated.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReferenceFigures {
    pub distance_m: Option<i64>,
    pub highest_point_m: Option<f64>,
    pub ascent_m: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WalkRecord {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "GeneralDescription", default)]
    pub description: Option<String>,
    #[serde(rename = "GeoJson", default)]
    pub track_file: Option<String>,
    #[serde(rename = "ShapeName", default)]
    pub shape: Option<String>,
    #[serde(rename = "StartLocationLat", default, deserialize_with = "csv::invalid_option")]
    pub start_lat: Option<f64>,
    #[serde(rename = "StartLocationLng", default, deserialize_with = "csv::invalid_option")]
    pub start_lng: Option<f64>,
    #[serde(rename = "EndLocationLat", default, deserialize_with = "csv::invalid_option")]
    pub end_lat: Option<f64>,
    #[serde(rename = "EndLocationLng", default, deserialize_with = "csv::invalid_option")]
    pub end_lng: Option<f64>,
    #[serde(rename = "Duration", default)]
    pub duration: Option<String>,
    #[serde(rename = "Distance", default, deserialize_with = "csv::invalid_option")]
    pub distance_m: Option<f64>,
    #[serde(rename = "Grading", default)]
    pub grading: Option<String>,
    #[serde(rename = "Height", default, deserialize_with = "csv::invalid_option")]
    pub highest_point_m: Option<f64>,
    #[serde(rename = "Ascent", default, deserialize_with = "csv::invalid_option")]
    pub ascent_m: Option<f64>,
    #[serde(rename = "ToEvolveTech", default)]
    pub release: Option<String>,
}

impl WalkRecord {
    pub fn reference_figures(&self) -> ReferenceFigures {
        ReferenceFigures {
            distance_m: self.distance_m.map(|d| d.round() as i64),
            highest_point_m: self.highest_point_m,
            ascent_m: self.ascent_m,
        }
    }

    pub fn start_point(&self) -> Option<(f64, f64)> {
        self.start_lat.zip(self.start_lng)
    }

    pub fn end_point(&self) -> Option<(f64, f64)> {
        self.end_lat.zip(self.end_lng)
    }

    /// File names of a single character are placeholders, not tracks
    fn track_path(&self, gpx_dir: &Path) -> Option<PathBuf> {
        self.track_file
            .as_deref()
            .filter(|f| f.chars().count() > 1)
            .map(|f| gpx_dir.join(f))
    }
}

/// Everything the pipeline needs about the walk the reviewer picked
#[derive(Debug, Clone, PartialEq)]
pub struct WalkSelection {
    pub record: WalkRecord,
    pub reference: ReferenceFigures,
    pub track_path: Option<PathBuf>,
}

impl WalkSelection {
    pub fn new(record: WalkRecord, gpx_dir: &Path) -> Self {
        WalkSelection {
            reference: record.reference_figures(),
            track_path: record.track_path(gpx_dir),
            record,
        }
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceStore {
    records: Vec<WalkRecord>,
}

impl ReferenceStore {
    /// Read WALKS.csv, keeping only rows with a track file and, if given, the matching release tag
    pub fn from_path(path: &Path, release: Option<&str>) -> Result<Self> {
        let file = File::open(path).map_err(|e| WalkError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let store = Self::from_reader(file, release)?;
        info!("📄 Loaded {} walk records from {}", store.len(), path.display());
        Ok(store)
    }

    pub fn from_reader<R: Read>(reader: R, release: Option<&str>) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut records = Vec::new();
        let mut skipped = 0;

        for result in rdr.deserialize::<WalkRecord>() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    warn!("⚠️  Error parsing walk record: {}", e);
                    skipped += 1;
                    continue;
                }
            };

            let has_track = record
                .track_file
                .as_deref()
                .is_some_and(|f| !f.is_empty());
            if record.name.is_empty() || !has_track {
                skipped += 1;
                continue;
            }

            if let Some(tag) = release {
                if record.release.as_deref() != Some(tag) {
                    skipped += 1;
                    continue;
                }
            }

            records.push(record);
        }

        if skipped > 0 {
            warn!("Skipped {} walk records without a name, track file or matching release", skipped);
        }

        Ok(ReferenceStore { records })
    }

    pub fn records(&self) -> &[WalkRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Unique walk names in file order
    pub fn walk_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for record in &self.records {
            if !names.contains(&record.name.as_str()) {
                names.push(&record.name);
            }
        }
        names
    }

    /// First record with this name
    pub fn select(&self, name: &str, gpx_dir: &Path) -> Option<WalkSelection> {
        self.records
            .iter()
            .find(|r| r.name == name)
            .map(|r| WalkSelection::new(r.clone(), gpx_dir))
    }

    /// One selection per unique walk name
    pub fn selections(&self, gpx_dir: &Path) -> Vec<WalkSelection> {
        self.walk_names()
            .into_iter()
            .filter_map(|name| self.select(name, gpx_dir))
            .collect()
    }
}
