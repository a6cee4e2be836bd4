/// Console and CSV output for checked walks
use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use csv::Writer;
use serde::Serialize;

use crate::consistency::{ComparisonResult, FlagReason, Metric};
use crate::error::{Result, WalkError};
use crate::pipeline::{TrackAnalysis, WalkReport};

#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    walk: &'a str,
    track_status: &'a str,
    track_points: Option<usize>,
    track_distance_km: Option<f64>,
    reference_distance_km: Option<f64>,
    distance_flag: &'a str,
    track_highest_point_m: Option<f64>,
    reference_highest_point_m: Option<f64>,
    highest_point_flag: &'a str,
    track_ascent_m: Option<f64>,
    raw_ascent_m: Option<f64>,
    reference_ascent_m: Option<f64>,
    ascent_flag: &'a str,
    density_m_per_sample: Option<f64>,
    smoothing_window: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ProfileRow {
    distance_km: f64,
    elevation_m: f64,
    smoothed_elevation_m: f64,
}

/// Short verdict used in the CSV columns
pub fn verdict(result: &ComparisonResult) -> &'static str {
    match result.reason {
        None => "consistent",
        Some(FlagReason::Mismatch) => "check data",
        Some(FlagReason::NotPopulated) => "not populated",
    }
}

fn format_value(metric: Metric, value: f64) -> String {
    match metric {
        Metric::DistanceKm => format!("{:.2}{}", value, metric.unit()),
        // whole meters for display only
        Metric::HighestPointM | Metric::AscentM => format!("{:.0}{}", value.round(), metric.unit()),
    }
}

/// One line of dashboard-style messaging for a comparison
pub fn describe(result: &ComparisonResult) -> String {
    let track = format_value(result.metric, result.track_value);
    match (result.reason, result.reference_value, result.relative_difference) {
        (Some(FlagReason::NotPopulated), _, _) => format!(
            "⚠️  {}: reference not populated (track {})",
            result.metric, track
        ),
        (_, Some(reference), Some(rd)) => {
            let reference = format_value(result.metric, reference);
            if result.flagged {
                format!(
                    "⚠️  {}: check data, track {} vs recorded {} ({:.1}% apart)",
                    result.metric, track, reference, rd * 100.0
                )
            } else {
                format!(
                    "✅ {}: consistent, track {} vs recorded {} ({:.1}% apart)",
                    result.metric, track, reference, rd * 100.0
                )
            }
        }
        _ => format!("⚠️  {}: track {}", result.metric, track),
    }
}

fn recorded(metric: Metric, value: Option<f64>) -> String {
    match value {
        Some(v) if v > 0.0 => format_value(metric, v),
        _ => "not populated".to_string(),
    }
}

fn format_position(position: Option<(f64, f64)>) -> String {
    match position {
        Some((lat, lon)) => format!("({:.5}, {:.5})", lat, lon),
        None => "not recorded".to_string(),
    }
}

/// Recorded attributes of the walk; shown whether or not the track could be used
fn record_lines(report: &WalkReport) -> Vec<String> {
    let record = &report.record;
    let mut lines = Vec::new();

    if let Some(description) = &record.description {
        lines.push(format!("  📝 {}", description));
    }
    lines.push(format!(
        "  Shape: {} | Duration: {} | Grading: {}",
        record.shape.as_deref().unwrap_or("-"),
        record.duration.as_deref().unwrap_or("-"),
        record.grading.as_deref().unwrap_or("-")
    ));
    lines.push(format!(
        "  📏 Recorded distance {}, highest point {}, ascent {}",
        recorded(
            Metric::DistanceKm,
            report.reference.distance_m.map(|m| m as f64 / 1000.0)
        ),
        recorded(Metric::HighestPointM, report.reference.highest_point_m),
        recorded(Metric::AscentM, report.reference.ascent_m)
    ));
    lines.push(format!(
        "  🚩 Recorded start {}, end {}",
        format_position(record.start_point()),
        format_position(record.end_point())
    ));
    lines
}

fn track_lines(analysis: &TrackAnalysis) -> Vec<String> {
    vec![
        format!(
            "  📍 {} points, centre ({:.5}, {:.5})",
            analysis.point_count, analysis.mean_point.0, analysis.mean_point.1
        ),
        format!(
            "  🛤️  Track start {}, end {}",
            format_position(Some(analysis.start)),
            format_position(Some(analysis.end))
        ),
        format!(
            "  📈 Total ascent: {:.0}m (raw {:.0}m, {:.1}m/sample, {}-point smoothing)",
            analysis.ascent.total_ascent_m.round(),
            analysis.ascent.naive_ascent_m.round(),
            analysis.ascent.density_m_per_sample,
            analysis.ascent.window
        ),
    ]
}

/// Console block for one walk
pub fn render_walk_report(report: &WalkReport) -> String {
    let mut lines = vec![
        format!("🥾 {}", report.name),
        "=".repeat(report.name.chars().count() + 3),
    ];
    lines.extend(record_lines(report));

    match &report.outcome {
        Ok(analysis) => {
            lines.extend(track_lines(analysis));
            lines.extend(analysis.comparisons.iter().map(|c| format!("  {}", describe(c))));
        }
        Err(e) => lines.push(format!("  ❌ {} ({})", e.fallback_message(), e)),
    }

    lines.join("\n")
}

pub fn print_walk_report(report: &WalkReport) {
    println!("\n{}", render_walk_report(report));
}

pub fn print_batch_summary(reports: &[WalkReport], unreferenced: &[PathBuf]) {
    let analysed = reports.iter().filter(|r| r.analysis().is_some()).count();
    let clean = reports
        .iter()
        .filter(|r| r.analysis().is_some() && r.flagged_count() == 0)
        .count();

    println!("\n📊 CONTENT CHECK SUMMARY");
    println!("=======================");
    println!("  Walks checked: {}", reports.len());
    println!("  With usable track: {}", analysed);
    println!("  Without track: {}", reports.len() - analysed);
    println!("  All figures consistent: {}", clean);
    println!("  Needing attention: {}", analysed - clean);

    if !unreferenced.is_empty() {
        println!("\n🗂️  GPX files not referenced by any checked walk:");
        for path in unreferenced {
            println!("  {}", path.display());
        }
    }
}

fn comparison<'a>(analysis: Option<&'a TrackAnalysis>, metric: Metric) -> Option<&'a ComparisonResult> {
    analysis.and_then(|a| a.comparisons.iter().find(|c| c.metric == metric))
}

fn flag_column(result: Option<&ComparisonResult>) -> &'static str {
    result.map(verdict).unwrap_or("")
}

fn output_error(path: &Path) -> impl Fn(csv::Error) -> WalkError + '_ {
    move |source| WalkError::Output {
        path: path.to_path_buf(),
        source,
    }
}

/// One row per walk with track figures, reference figures and verdicts
pub fn write_summary_csv(reports: &[WalkReport], output_path: &Path) -> Result<()> {
    let mut wtr = Writer::from_path(output_path).map_err(output_error(output_path))?;

    for report in reports {
        let analysis = report.analysis();
        let distance = comparison(analysis, Metric::DistanceKm);
        let highest = comparison(analysis, Metric::HighestPointM);
        let ascent = comparison(analysis, Metric::AscentM);

        let status = match &report.outcome {
            Ok(_) => "ok",
            Err(e) => e.fallback_message(),
        };

        wtr.serialize(SummaryRow {
            walk: &report.name,
            track_status: status,
            track_points: analysis.map(|a| a.point_count),
            track_distance_km: analysis.map(|a| a.total_distance_km),
            reference_distance_km: report.reference.distance_m.map(|m| m as f64 / 1000.0),
            distance_flag: flag_column(distance),
            track_highest_point_m: analysis.map(|a| a.max_elevation_m),
            reference_highest_point_m: report.reference.highest_point_m,
            highest_point_flag: flag_column(highest),
            track_ascent_m: analysis.map(|a| a.ascent.total_ascent_m),
            raw_ascent_m: analysis.map(|a| a.ascent.naive_ascent_m),
            reference_ascent_m: report.reference.ascent_m,
            ascent_flag: flag_column(ascent),
            density_m_per_sample: analysis.map(|a| a.ascent.density_m_per_sample),
            smoothing_window: analysis.map(|a| a.ascent.window),
        })
        .map_err(output_error(output_path))?;
    }

    wtr.flush().map_err(|e| WalkError::Io {
        path: output_path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

/// Distance/elevation series for charting the elevation profile
pub fn write_profile_csv(analysis: &TrackAnalysis, output_path: &Path) -> Result<()> {
    let mut wtr = Writer::from_path(output_path).map_err(output_error(output_path))?;

    let series = analysis
        .profile
        .distances_km()
        .iter()
        .zip(analysis.profile.elevations_m())
        .zip(&analysis.ascent.smoothed_elevations_m);

    for ((&distance_km, &elevation_m), &smoothed_elevation_m) in series {
        wtr.serialize(ProfileRow {
            distance_km,
            elevation_m,
            smoothed_elevation_m,
        })
        .map_err(output_error(output_path))?;
    }

    wtr.flush().map_err(|e| WalkError::Io {
        path: output_path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

/// File-system safe name for a walk's profile CSV
pub fn profile_file_name(walk: &str) -> String {
    let slug: String = walk
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    format!("{}_profile.csv", slug.trim_matches('_'))
}

/// Write a profile CSV for every walk with a usable track
pub fn write_profiles(reports: &[WalkReport], output_dir: &Path) -> Result<Vec<PathBuf>> {
    create_dir_all(output_dir).map_err(|e| WalkError::Io {
        path: output_dir.to_path_buf(),
        source: e,
    })?;

    let mut written = Vec::new();
    for report in reports {
        if let Some(analysis) = report.analysis() {
            let path = output_dir.join(profile_file_name(&report.name));
            write_profile_csv(analysis, &path)?;
            written.push(path);
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ascent;
    use crate::config::{CheckConfig, Settings};
    use crate::consistency::compare;
    use crate::reference::{ReferenceFigures, WalkRecord};
    use crate::track::{derive_profile, Track, TrackPoint};
    use std::fs;

    fn sample_analysis() -> TrackAnalysis {
        let track = Track::new(
            (0..10)
                .map(|i| TrackPoint::new(54.0 + i as f64 * 0.001, -6.0, Some(100.0 + i as f64)))
                .collect(),
        )
        .unwrap();
        let profile = derive_profile(&track);
        let settings = Settings::default();
        let estimate = ascent::estimate(&profile, &settings.ascent).unwrap();
        TrackAnalysis {
            track_path: PathBuf::from("gpx/sample.gpx"),
            point_count: track.len(),
            mean_point: (54.0045, -6.0),
            start: (54.0, -6.0),
            end: (54.009, -6.0),
            total_distance_km: profile.total_distance_km(),
            max_elevation_m: 109.0,
            comparisons: crate::consistency::check_all(
                profile.total_distance_km(),
                109.0,
                estimate.total_ascent_m,
                &ReferenceFigures { distance_m: Some(1000), highest_point_m: Some(150.0), ascent_m: None },
                &settings.check,
            ),
            ascent: estimate,
            profile,
        }
    }

    #[test]
    fn test_describe_messages() {
        let config = CheckConfig::default();
        assert!(describe(&compare(95.0, Some(100.0), Metric::AscentM, &config)).starts_with("✅ ascent: consistent"));
        assert!(describe(&compare(88.0, Some(100.0), Metric::AscentM, &config)).contains("check data"));
        assert!(describe(&compare(88.0, Some(0.0), Metric::AscentM, &config)).contains("not populated"));
    }

    #[test]
    fn test_display_rounds_to_whole_meters() {
        let result = compare(310.6, Some(300.0), Metric::AscentM, &CheckConfig::default());
        assert!(describe(&result).contains("track 311m vs recorded 300m"));
    }

    #[test]
    fn test_profile_csv_has_one_row_per_sample() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.csv");
        write_profile_csv(&sample_analysis(), &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("distance_km,elevation_m,smoothed_elevation_m"));
        assert_eq!(lines.count(), 10);
    }

    #[test]
    fn test_summary_csv_includes_failed_walks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        let reports = vec![
            WalkReport {
                name: "Sample".to_string(),
                record: WalkRecord::default(),
                reference: ReferenceFigures { distance_m: Some(1000), highest_point_m: Some(150.0), ascent_m: None },
                outcome: Ok(sample_analysis()),
            },
            WalkReport {
                name: "Ghost".to_string(),
                record: WalkRecord::default(),
                reference: ReferenceFigures::default(),
                outcome: Err(WalkError::NotFound { path: PathBuf::from("gpx/ghost.gpx") }),
            },
        ];
        write_summary_csv(&reports, &path).unwrap();

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "Sample");
        assert_eq!(&rows[0][1], "ok");
        assert_eq!(&rows[0][8], "check data");
        assert_eq!(&rows[0][12], "not populated");
        assert_eq!(&rows[1][1], "no track available");
        assert_eq!(&rows[1][5], "");
    }

    #[test]
    fn test_profile_file_name_is_slugged() {
        assert_eq!(profile_file_name("Slieve Hill (loop)"), "slieve_hill__loop_profile.csv");
    }

    fn ghost_report() -> WalkReport {
        let record = WalkRecord {
            name: "Slieve Hill".to_string(),
            description: Some("Forest loop".to_string()),
            track_file: Some("slieve.gpx".to_string()),
            shape: Some("Loop".to_string()),
            start_lat: Some(54.21),
            start_lng: Some(-6.05),
            end_lat: Some(54.22),
            end_lng: Some(-6.04),
            duration: Some("2 hours".to_string()),
            distance_m: Some(8200.0),
            grading: Some("Moderate".to_string()),
            highest_point_m: Some(412.0),
            ascent_m: None,
            ..Default::default()
        };
        WalkReport {
            name: record.name.clone(),
            reference: record.reference_figures(),
            record,
            outcome: Err(WalkError::NotFound { path: PathBuf::from("gpx/slieve.gpx") }),
        }
    }

    #[test]
    fn test_missing_track_still_shows_recorded_details() {
        let text = render_walk_report(&ghost_report());

        assert!(text.starts_with("🥾 Slieve Hill"));
        assert!(text.contains("Forest loop"));
        assert!(text.contains("Shape: Loop | Duration: 2 hours | Grading: Moderate"));
        assert!(text.contains("Recorded distance 8.20km, highest point 412m, ascent not populated"));
        assert!(text.contains("Recorded start (54.21000, -6.05000), end (54.22000, -6.04000)"));
        assert!(text.contains("❌ no track available"));
        assert!(!text.contains("Track start"));
    }

    #[test]
    fn test_analysed_walk_shows_recorded_and_track_endpoints() {
        let mut report = ghost_report();
        report.outcome = Ok(sample_analysis());
        let text = render_walk_report(&report);

        assert!(text.contains("Recorded start (54.21000, -6.05000)"));
        assert!(text.contains("Track start (54.00000, -6.00000), end (54.00900, -6.00000)"));
        assert!(text.contains("✅ distance") || text.contains("⚠️  distance"));
        assert!(!text.contains("❌"));
    }

    #[test]
    fn test_unwritable_summary_names_output_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("summary.csv");

        let err = write_summary_csv(&[ghost_report()], &path).unwrap_err();
        assert!(matches!(&err, WalkError::Output { path: p, .. } if p == &path));
        assert_eq!(err.fallback_message(), "report could not be written");
    }
}
