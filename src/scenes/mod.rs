//! Benchmark scenes: identity, on-disk layout and lazy data access.
//!
//! A `Scene` names one capture and knows where its center view, ground-truth
//! disparity and evaluation masks live. Data is loaded on demand and never
//! cached across calls; scenes are immutable for the duration of a plotting
//! run. The registry functions enumerate the three benchmark groups from the
//! data directory, sorted by name so figure layouts are reproducible.

pub mod normals;

use crate::config::Settings;
use crate::field::io::{load_mask, load_rgb_image, read_pfm};
use crate::field::{DispField, MaskField};
use image::RgbImage;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// The three scene groups of the benchmark.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneCategory {
    Stratified,
    Training,
    Test,
}

impl SceneCategory {
    /// Directory name under the data root, also used in figure file names.
    pub fn key(self) -> &'static str {
        match self {
            SceneCategory::Stratified => "stratified",
            SceneCategory::Training => "training",
            SceneCategory::Test => "test",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SceneCategory::Stratified => "Stratified Scenes",
            SceneCategory::Training => "Training Scenes",
            SceneCategory::Test => "Test Scenes (Hidden Ground Truth)",
        }
    }
}

/// Optional per-scene overrides stored as `scene.json` next to the data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SceneParams {
    #[serde(rename = "displayName")]
    display_name: Option<String>,
    #[serde(rename = "dispMin")]
    disp_min: Option<f32>,
    #[serde(rename = "dispMax")]
    disp_max: Option<f32>,
    #[serde(rename = "hiddenGt")]
    hidden_gt: Option<bool>,
}

/// One benchmark capture.
#[derive(Clone, Debug)]
pub struct Scene {
    name: String,
    display_name: String,
    category: SceneCategory,
    data_dir: PathBuf,
    hidden_gt: bool,
    disp_min: f32,
    disp_max: f32,
}

impl Scene {
    /// Construct a scene rooted at `data_dir` with default display settings.
    ///
    /// Test scenes hide their ground truth unless `scene.json` overrides it.
    pub fn new(name: &str, category: SceneCategory, data_dir: &Path) -> Self {
        Self {
            name: name.to_string(),
            display_name: title_case(name),
            category,
            data_dir: data_dir.to_path_buf(),
            hidden_gt: category == SceneCategory::Test,
            disp_min: -0.2,
            disp_max: 2.0,
        }
    }

    /// Load a scene from its directory, applying `scene.json` if present.
    pub fn from_dir(name: &str, category: SceneCategory, data_dir: &Path) -> Result<Self, String> {
        let mut scene = Scene::new(name, category, data_dir);
        let params_path = data_dir.join("scene.json");
        if params_path.exists() {
            let data = fs::read_to_string(&params_path)
                .map_err(|e| format!("Failed to read {}: {e}", params_path.display()))?;
            let params: SceneParams = serde_json::from_str(&data)
                .map_err(|e| format!("Failed to parse {}: {e}", params_path.display()))?;
            if let Some(dn) = params.display_name {
                scene.display_name = dn;
            }
            if let Some(v) = params.disp_min {
                scene.disp_min = v;
            }
            if let Some(v) = params.disp_max {
                scene.disp_max = v;
            }
            if let Some(v) = params.hidden_gt {
                scene.hidden_gt = v;
            }
        }
        Ok(scene)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn category(&self) -> SceneCategory {
        self.category
    }

    /// Whether the ground truth is withheld from publication.
    pub fn hidden_gt(&self) -> bool {
        self.hidden_gt
    }

    /// Display range for disparity colormapping.
    pub fn disp_range(&self) -> (f32, f32) {
        (self.disp_min, self.disp_max)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Center view of the light field (H×W×3).
    pub fn center_view(&self) -> Result<RgbImage, String> {
        load_rgb_image(&self.data_dir.join("center_view.png"))
    }

    /// Ground-truth disparity field.
    pub fn gt(&self) -> Result<DispField, String> {
        read_pfm(&self.data_dir.join("gt_disp.pfm"))
    }

    /// Named evaluation mask, e.g. `contin_surfaces` or `planes`.
    pub fn mask(&self, name: &str) -> Result<MaskField, String> {
        load_mask(&self.data_dir.join("masks").join(format!("{name}.png")))
    }

    pub fn has_mask(&self, name: &str) -> bool {
        self.data_dir
            .join("masks")
            .join(format!("{name}.png"))
            .exists()
    }

    /// Surface-normal visualization derived from a disparity field.
    pub fn normal_vis_from_disp_map(&self, disp: &DispField) -> RgbImage {
        normals::normal_vis(disp)
    }
}

fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = true;
    for c in name.chars() {
        if c == '_' || c == '-' {
            out.push(' ');
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Scenes of one category, sorted by name.
pub fn scenes_of_category(
    settings: &Settings,
    category: SceneCategory,
) -> Result<Vec<Scene>, String> {
    let dir = settings.data_dir.join(category.key());
    let entries =
        fs::read_dir(&dir).map_err(|e| format!("Failed to list {}: {e}", dir.display()))?;
    let mut names: Vec<String> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| format!("Failed to list {}: {e}", dir.display()))?;
        if entry
            .file_type()
            .map_err(|e| format!("Failed to stat {}: {e}", entry.path().display()))?
            .is_dir()
        {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    names
        .iter()
        .map(|name| Scene::from_dir(name, category, &dir.join(name)))
        .collect()
}

pub fn stratified_scenes(settings: &Settings) -> Result<Vec<Scene>, String> {
    scenes_of_category(settings, SceneCategory::Stratified)
}

pub fn training_scenes(settings: &Settings) -> Result<Vec<Scene>, String> {
    scenes_of_category(settings, SceneCategory::Training)
}

pub fn test_scenes(settings: &Settings) -> Result<Vec<Scene>, String> {
    scenes_of_category(settings, SceneCategory::Test)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_splits_on_separators() {
        assert_eq!(title_case("backgammon"), "Backgammon");
        assert_eq!(title_case("bedroom_2"), "Bedroom 2");
    }

    #[test]
    fn test_scenes_hide_gt_by_default() {
        let s = Scene::new("bedroom", SceneCategory::Test, Path::new("data/test/bedroom"));
        assert!(s.hidden_gt());
        let s = Scene::new("cotton", SceneCategory::Training, Path::new("data/training/cotton"));
        assert!(!s.hidden_gt());
    }
}
