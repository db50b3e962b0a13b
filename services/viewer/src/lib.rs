//! Interactive Daymet Tmax heatmap viewer.
//!
//! - [`config`]: YAML configuration with defaults
//! - [`pipeline`]: the aggregate, project, render cycle
//! - [`shell`]: the interactive command loop

pub mod config;
pub mod pipeline;
pub mod shell;

pub use config::ViewerConfig;
pub use pipeline::{CycleOutcome, CycleReport, Viewer, NO_DATA_MESSAGE};
pub use shell::{Command, Shell};
