/// Cross-check of track-derived figures against the recorded reference figures
use std::fmt;

use crate::config::CheckConfig;
use crate::reference::ReferenceFigures;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    DistanceKm,
    HighestPointM,
    AscentM,
}

impl Metric {
    pub fn name(&self) -> &'static str {
        match self {
            Metric::DistanceKm => "distance",
            Metric::HighestPointM => "highest point",
            Metric::AscentM => "ascent",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Metric::DistanceKm => "km",
            Metric::HighestPointM | Metric::AscentM => "m",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagReason {
    NotPopulated,
    Mismatch,
}

impl fmt::Display for FlagReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagReason::NotPopulated => f.write_str("not populated"),
            FlagReason::Mismatch => f.write_str("mismatch"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    pub metric: Metric,
    pub track_value: f64,
    pub reference_value: Option<f64>,
    /// `None` when the reference is not populated
    pub relative_difference: Option<f64>,
    pub flagged: bool,
    pub reason: Option<FlagReason>,
}

impl ComparisonResult {
    pub fn is_consistent(&self) -> bool {
        !self.flagged
    }
}

/// Compare one track-derived value against its reference.
///
/// A missing or non-positive reference is flagged as not populated instead of
/// being divided by.
pub fn compare(
    track_value: f64,
    reference_value: Option<f64>,
    metric: Metric,
    config: &CheckConfig,
) -> ComparisonResult {
    let reference = match reference_value {
        Some(r) if r > 0.0 => r,
        _ => {
            return ComparisonResult {
                metric,
                track_value,
                reference_value,
                relative_difference: None,
                flagged: true,
                reason: Some(FlagReason::NotPopulated),
            }
        }
    };

    let relative_difference = (reference - track_value).abs() / reference.abs();
    let flagged = relative_difference >= config.flag_threshold;

    ComparisonResult {
        metric,
        track_value,
        reference_value: Some(reference),
        relative_difference: Some(relative_difference),
        flagged,
        reason: flagged.then_some(FlagReason::Mismatch),
    }
}

/// Distance, highest point and ascent checks for one walk.
///
/// The reference distance is recorded in meters and compared in km.
pub fn check_all(
    track_distance_km: f64,
    max_elevation_m: f64,
    ascent_m: f64,
    reference: &ReferenceFigures,
    config: &CheckConfig,
) -> Vec<ComparisonResult> {
    let reference_km = reference.distance_m.map(|m| m as f64 / 1000.0);
    vec![
        compare(track_distance_km, reference_km, Metric::DistanceKm, config),
        compare(max_elevation_m, reference.highest_point_m, Metric::HighestPointM, config),
        compare(ascent_m, reference.ascent_m, Metric::AscentM, config),
    ]
}
