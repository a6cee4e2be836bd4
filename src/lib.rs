//! Cross-checks the recorded distance, highest point and ascent of trail
//! walks against figures derived from their GPX tracks.

pub mod ascent;
pub mod config;
pub mod consistency;
pub mod error;
pub mod geodesy;
pub mod pipeline;
pub mod reference;
pub mod report;
pub mod track;

pub use config::{AscentConfig, CheckConfig, Settings};
pub use error::{Result, WalkError};
