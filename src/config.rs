/// Calibration for the density-adaptive ascent estimate.
///
/// These values were tuned empirically against recorded walk ascents; they
/// are calibration, not semantics, and can be overridden from the command line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AscentConfig {
    /// Meters travelled per sample below which a track counts as densely sampled
    pub density_threshold_m: f64,
    /// Rolling-mean window (samples) for densely sampled tracks
    pub dense_window: usize,
    /// Rolling-mean window (samples) for sparsely sampled tracks
    pub sparse_window: usize,
}

impl Default for AscentConfig {
    fn default() -> Self {
        AscentConfig {
            density_threshold_m: 28.0,
            dense_window: 30,
            sparse_window: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckConfig {
    /// Relative difference at or above which a comparison is flagged
    pub flag_threshold: f64,
}

impl Default for CheckConfig {
    fn default() -> Self {
        CheckConfig { flag_threshold: 0.10 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Settings {
    pub ascent: AscentConfig,
    pub check: CheckConfig,
}
