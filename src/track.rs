/// Track loading and distance/elevation profile derivation
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};

use gpx::read;
use log::debug;

use crate::error::{Result, WalkError};
use crate::geodesy::distance_3d;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: Option<f64>,
}

impl TrackPoint {
    pub fn new(latitude: f64, longitude: f64, elevation: Option<f64>) -> Self {
        TrackPoint { latitude, longitude, elevation }
    }
}

/// Ordered, non-empty list of recorded samples
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    points: Vec<TrackPoint>,
}

impl Track {
    pub fn new(points: Vec<TrackPoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(WalkError::InsufficientData { points: 0 });
        }
        Ok(Track { points })
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Cumulative distance (km) and raw elevation (m), index-aligned with the track
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    distances_km: Vec<f64>,
    elevations_m: Vec<f64>,
}

impl Profile {
    pub fn new(distances_km: Vec<f64>, elevations_m: Vec<f64>) -> Result<Self> {
        if distances_km.len() != elevations_m.len() {
            return Err(WalkError::MismatchedSeries {
                distances: distances_km.len(),
                elevations: elevations_m.len(),
            });
        }
        Ok(Profile { distances_km, elevations_m })
    }

    pub fn distances_km(&self) -> &[f64] {
        &self.distances_km
    }

    pub fn elevations_m(&self) -> &[f64] {
        &self.elevations_m
    }

    pub fn len(&self) -> usize {
        self.distances_km.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances_km.is_empty()
    }

    /// Largest cumulative distance, i.e. the track length in km
    pub fn total_distance_km(&self) -> f64 {
        self.distances_km.iter().copied().fold(0.0, f64::max)
    }

    /// Highest recorded elevation, `None` for an empty profile
    pub fn max_elevation(&self) -> Option<f64> {
        self.elevations_m.iter().copied().reduce(f64::max)
    }
}

/// Load every track point of a GPX file, flattening tracks and segments in file order
pub fn load(path: &Path) -> Result<Track> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => WalkError::NotFound { path: path.to_path_buf() },
        _ => WalkError::Io { path: path.to_path_buf(), source: e },
    })?;

    let track = parse(BufReader::new(file), path.to_path_buf())?;
    debug!("Loaded {} points from {}", track.len(), path.display());
    Ok(track)
}

/// Parse GPX from any reader; used for in-memory sources
pub fn from_reader<R: Read>(reader: R) -> Result<Track> {
    parse(reader, PathBuf::from("<memory>"))
}

fn parse<R: Read>(reader: R, origin: PathBuf) -> Result<Track> {
    let gpx = read(reader).map_err(|e| WalkError::Parse {
        path: origin,
        message: e.to_string(),
    })?;

    let mut points = Vec::new();
    for track in &gpx.tracks {
        for segment in &track.segments {
            for pt in &segment.points {
                let position = pt.point();
                points.push(TrackPoint::new(position.y(), position.x(), pt.elevation));
            }
        }
    }

    Track::new(points)
}

/// Build the cumulative 3D distance series and the raw elevation series.
///
/// Samples without elevation are plotted at 0m.
pub fn derive_profile(track: &Track) -> Profile {
    let points = track.points();
    let mut distances_km = Vec::with_capacity(points.len());
    let mut elevations_m = Vec::with_capacity(points.len());
    let mut total_km = 0.0;

    for (i, pt) in points.iter().enumerate() {
        if i > 0 {
            let prev = &points[i - 1];
            // scaled at the later sample's latitude
            let hop_m = distance_3d(
                pt.latitude,
                pt.longitude,
                pt.elevation,
                prev.latitude,
                prev.longitude,
                prev.elevation,
            );
            total_km += hop_m / 1000.0;
        }
        distances_km.push(total_km);
        elevations_m.push(pt.elevation.unwrap_or(0.0));
    }

    Profile { distances_km, elevations_m }
}

/// Arithmetic mean of all latitudes and longitudes, used to centre a map
pub fn mean_point(track: &Track) -> (f64, f64) {
    let n = track.len() as f64;
    let (lat_sum, lon_sum) = track
        .points()
        .iter()
        .fold((0.0, 0.0), |(lat, lon), p| (lat + p.latitude, lon + p.longitude));
    (lat_sum / n, lon_sum / n)
}

/// First and last recorded positions
pub fn endpoints(track: &Track) -> ((f64, f64), (f64, f64)) {
    let points = track.points();
    let first = &points[0];
    let last = &points[points.len() - 1];
    (
        (first.latitude, first.longitude),
        (last.latitude, last.longitude),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    fn gpx_document(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="walk-check tests" xmlns="http://www.topografix.com/GPX/1/1">
{}
</gpx>"#,
            body
        )
    }

    fn straight_track(n: usize, step_deg: f64, climb_m: f64) -> Track {
        let points = (0..n)
            .map(|i| TrackPoint::new(i as f64 * step_deg, 0.0, Some(100.0 + i as f64 * climb_m)))
            .collect();
        Track::new(points).unwrap()
    }

    #[test]
    fn test_profile_aligned_with_track() {
        let track = straight_track(25, 0.0005, 0.7);
        let profile = derive_profile(&track);

        assert_eq!(profile.distances_km().len(), track.len());
        assert_eq!(profile.elevations_m().len(), track.len());
        assert_eq!(profile.distances_km()[0], 0.0);
        assert!(profile.distances_km().windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn test_even_straight_climb_gives_linear_distance() {
        let track = straight_track(11, 0.001, 2.0);
        let profile = derive_profile(&track);
        let step_km = (111.12f64 * 111.12 + 4.0).sqrt() / 1000.0;

        for (i, d) in profile.distances_km().iter().enumerate() {
            assert_relative_eq!(*d, i as f64 * step_km, epsilon = 1e-9);
        }
        assert_relative_eq!(profile.total_distance_km(), 10.0 * step_km, epsilon = 1e-9);
        assert_eq!(profile.max_elevation(), Some(120.0));
    }

    #[test]
    fn test_missing_elevation_plotted_at_zero() {
        let track = Track::new(vec![
            TrackPoint::new(0.0, 0.0, Some(10.0)),
            TrackPoint::new(0.001, 0.0, None),
        ])
        .unwrap();
        let profile = derive_profile(&track);
        assert_eq!(profile.elevations_m(), &[10.0, 0.0]);
        assert_relative_eq!(profile.distances_km()[1], 0.11112, epsilon = 1e-9);
    }

    #[test]
    fn test_hop_scaled_at_later_latitude() {
        let track = Track::new(vec![
            TrackPoint::new(60.0, 0.0, None),
            TrackPoint::new(60.1, 0.1, None),
        ])
        .unwrap();
        let profile = derive_profile(&track);

        let dlon = 0.1 * 60.1f64.to_radians().cos();
        let expected_m = (0.1f64 * 0.1 + dlon * dlon).sqrt() * crate::geodesy::ONE_DEGREE_M;
        assert_relative_eq!(profile.distances_km()[1] * 1000.0, expected_m, epsilon = 1e-6);
        assert!((profile.distances_km()[1] * 1000.0 - 12416.09).abs() < 0.5);
    }

    #[test]
    fn test_empty_track_rejected() {
        assert!(matches!(
            Track::new(vec![]),
            Err(WalkError::InsufficientData { points: 0 })
        ));
    }

    #[test]
    fn test_mismatched_profile_rejected() {
        let err = Profile::new(vec![0.0, 1.0], vec![5.0]).unwrap_err();
        assert!(matches!(
            err,
            WalkError::MismatchedSeries { distances: 2, elevations: 1 }
        ));
    }

    #[test]
    fn test_mean_point_and_endpoints() {
        let track = Track::new(vec![
            TrackPoint::new(54.0, -6.0, None),
            TrackPoint::new(54.2, -6.4, None),
            TrackPoint::new(54.4, -6.2, None),
        ])
        .unwrap();
        let (lat, lon) = mean_point(&track);
        assert_relative_eq!(lat, 54.2, epsilon = 1e-9);
        assert_relative_eq!(lon, -6.2, epsilon = 1e-9);

        let (start, end) = endpoints(&track);
        assert_eq!(start, (54.0, -6.0));
        assert_eq!(end, (54.4, -6.2));
    }

    #[test]
    fn test_segments_flattened_in_file_order() {
        let xml = gpx_document(
            r#"<trk><trkseg>
  <trkpt lat="54.000" lon="-6.000"><ele>10</ele></trkpt>
  <trkpt lat="54.001" lon="-6.000"><ele>12</ele></trkpt>
</trkseg><trkseg>
  <trkpt lat="54.002" lon="-6.000"><ele>15</ele></trkpt>
</trkseg></trk>
<trk><trkseg>
  <trkpt lat="54.003" lon="-6.000"></trkpt>
</trkseg></trk>"#,
        );
        let track = from_reader(xml.as_bytes()).unwrap();

        assert_eq!(track.len(), 4);
        let lats: Vec<f64> = track.points().iter().map(|p| p.latitude).collect();
        assert_eq!(lats, vec![54.0, 54.001, 54.002, 54.003]);
        assert_eq!(track.points()[3].elevation, None);
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".gpx").tempfile().unwrap();
        let xml = gpx_document(
            r#"<trk><trkseg>
  <trkpt lat="54.000" lon="-6.000"><ele>10</ele></trkpt>
  <trkpt lat="54.001" lon="-6.000"><ele>11</ele></trkpt>
</trkseg></trk>"#,
        );
        file.write_all(xml.as_bytes()).unwrap();

        let track = load(file.path()).unwrap();
        assert_eq!(track.len(), 2);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nowhere.gpx");
        assert!(matches!(load(&path), Err(WalkError::NotFound { .. })));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let mut file = tempfile::Builder::new().suffix(".gpx").tempfile().unwrap();
        file.write_all(b"<gpx version=\"1.1\"><trk><trkseg><trkpt lat=").unwrap();
        assert!(matches!(load(file.path()), Err(WalkError::Parse { .. })));
    }

    #[test]
    fn test_gpx_without_points_is_insufficient() {
        let xml = gpx_document("<trk><trkseg></trkseg></trk>");
        assert!(matches!(
            from_reader(xml.as_bytes()),
            Err(WalkError::InsufficientData { points: 0 })
        ));
    }
}
