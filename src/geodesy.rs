/// Point-to-point distance between consecutive GPS samples
use geo::{point, HaversineDistance};

/// Meters per degree used by the planar approximation
pub const ONE_DEGREE_M: f64 = 1000.0 * 10000.8 / 90.0;

/// Hops longer than this (in degrees, either axis) use great-circle distance
const PLANAR_LIMIT_DEG: f64 = 0.2;

/// Horizontal distance in meters between two positions.
///
/// Short hops use an equirectangular approximation scaled at the first
/// latitude; anything over 0.2 degrees falls back to haversine.
pub fn distance_2d(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    if (lat1 - lat2).abs() > PLANAR_LIMIT_DEG || (lon1 - lon2).abs() > PLANAR_LIMIT_DEG {
        let a = point!(x: lon1, y: lat1);
        let b = point!(x: lon2, y: lat2);
        return a.haversine_distance(&b);
    }

    let coef = lat1.to_radians().cos();
    let x = lat1 - lat2;
    let y = (lon1 - lon2) * coef;
    (x * x + y * y).sqrt() * ONE_DEGREE_M
}

/// Distance in meters including the elevation change between the two samples.
///
/// Long hops and samples without elevation contribute horizontal distance only.
pub fn distance_3d(
    lat1: f64,
    lon1: f64,
    ele1: Option<f64>,
    lat2: f64,
    lon2: f64,
    ele2: Option<f64>,
) -> f64 {
    let flat = distance_2d(lat1, lon1, lat2, lon2);

    if (lat1 - lat2).abs() > PLANAR_LIMIT_DEG || (lon1 - lon2).abs() > PLANAR_LIMIT_DEG {
        return flat;
    }

    match (ele1, ele2) {
        (Some(a), Some(b)) if a != b => (flat * flat + (a - b) * (a - b)).sqrt(),
        _ => flat,
    }
}
