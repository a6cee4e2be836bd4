use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a walk's track or its reference data
#[derive(Error, Debug)]
pub enum WalkError {
    #[error("track file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("could not parse GPX file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("track has {points} point(s), at least 2 are needed")]
    InsufficientData { points: usize },

    #[error("profile series differ in length: {distances} distances vs {elevations} elevations")]
    MismatchedSeries { distances: usize, elevations: usize },

    #[error("reference data error: {0}")]
    Reference(#[from] csv::Error),

    #[error("could not write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl WalkError {
    /// Track-side failures are recovered per walk; the rest of the walk still renders
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            WalkError::NotFound { .. }
                | WalkError::Parse { .. }
                | WalkError::Io { .. }
                | WalkError::InsufficientData { .. }
        )
    }

    /// Short message shown in place of the chart and comparisons
    pub fn fallback_message(&self) -> &'static str {
        match self {
            WalkError::NotFound { .. } => "no track available",
            WalkError::Parse { .. } | WalkError::Io { .. } => "track file could not be read",
            WalkError::InsufficientData { .. } => {
                "track has too few points for a profile or ascent figure"
            }
            WalkError::MismatchedSeries { .. } => "track profile is inconsistent",
            WalkError::Reference(_) => "reference data could not be read",
            WalkError::Output { .. } => "report could not be written",
        }
    }
}

pub type Result<T> = std::result::Result<T, WalkError>;
