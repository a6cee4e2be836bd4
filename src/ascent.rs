/// Density-adaptive ascent estimation
///
/// Raw GPS elevation jitters by a metre or so from sample to sample, and
/// summing every upward step turns that jitter into phantom climbing. The
/// elevation series is therefore smoothed with a trailing rolling mean before
/// differencing. A fixed window under-smooths densely sampled tracks and
/// flattens sparsely sampled ones, so the window is chosen from the average
/// distance travelled per sample.
use log::debug;

use crate::config::AscentConfig;
use crate::error::{Result, WalkError};
use crate::track::Profile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sampling {
    Dense,
    Sparse,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AscentEstimate {
    pub total_ascent_m: f64,
    pub density_m_per_sample: f64,
    pub sampling: Sampling,
    pub window: usize,
    pub smoothed_elevations_m: Vec<f64>,
    /// Sum of every upward step in the unsmoothed series
    pub naive_ascent_m: f64,
}

/// Average meters travelled per recorded sample
pub fn sampling_density(profile: &Profile) -> Result<f64> {
    if profile.len() < 2 {
        return Err(WalkError::InsufficientData { points: profile.len() });
    }
    Ok(profile.total_distance_km() * 1000.0 / profile.len() as f64)
}

/// Pick the smoothing window for a given density; exactly at the threshold counts as sparse
pub fn smoothing_window(density_m: f64, config: &AscentConfig) -> (Sampling, usize) {
    if density_m < config.density_threshold_m {
        (Sampling::Dense, config.dense_window.max(1))
    } else {
        (Sampling::Sparse, config.sparse_window.max(1))
    }
}

/// Trailing mean over up to `window` samples; the leading entries average
/// whatever is available so the output has no gaps.
pub fn rolling_mean(data: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut result = Vec::with_capacity(data.len());
    let mut sum = 0.0;

    for (i, value) in data.iter().enumerate() {
        sum += value;
        if i >= window {
            sum -= data[i - window];
        }
        let count = (i + 1).min(window);
        result.push(sum / count as f64);
    }

    result
}

/// Sum of positive successive differences
pub fn positive_ascent(elevations: &[f64]) -> f64 {
    elevations
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|delta| *delta > 0.0)
        .sum()
}

/// Raw ascent without any smoothing
pub fn naive_ascent(elevations: &[f64]) -> f64 {
    positive_ascent(elevations)
}

pub fn estimate(profile: &Profile, config: &AscentConfig) -> Result<AscentEstimate> {
    let density = sampling_density(profile)?;
    let (sampling, window) = smoothing_window(density, config);

    let smoothed = rolling_mean(profile.elevations_m(), window);
    let total = positive_ascent(&smoothed);
    let naive = naive_ascent(profile.elevations_m());

    debug!(
        "Density {:.1}m/sample ({:?}), window {} → ascent {:.1}m (raw {:.1}m)",
        density, sampling, window, total, naive
    );

    Ok(AscentEstimate {
        total_ascent_m: total,
        density_m_per_sample: density,
        sampling,
        window,
        smoothed_elevations_m: smoothed,
        naive_ascent_m: naive,
    })
}

/// Noise-robust total ascent in meters, unrounded
pub fn total_ascent(profile: &Profile, config: &AscentConfig) -> Result<f64> {
    estimate(profile, config).map(|e| e.total_ascent_m)
}
