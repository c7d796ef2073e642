#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod algorithms;
pub mod config;
pub mod field;
pub mod figures;
pub mod metrics;
pub mod plotting;
pub mod scenes;

// --- High-level re-exports -------------------------------------------------

// Main entry points: configuration plus the figure operations.
pub use crate::algorithms::Algorithm;
pub use crate::config::Settings;
pub use crate::scenes::{Scene, SceneCategory};

/// Small prelude for quick experiments.
///
/// ```no_run
/// use depth_figures::prelude::*;
///
/// # fn main() -> Result<(), String> {
/// let settings = Settings::default();
/// let scenes = depth_figures::scenes::training_scenes(&settings)?;
/// let algorithms = vec![Algorithm::new("epi1", "EPI1")];
/// depth_figures::figures::plot_scene_overview(&settings, &scenes, "overview")?;
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::algorithms::Algorithm;
    pub use crate::config::Settings;
    pub use crate::field::{DispField, MaskField};
    pub use crate::metrics::Metric;
    pub use crate::scenes::{Scene, SceneCategory};
}
