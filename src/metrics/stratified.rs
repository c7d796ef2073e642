//! Scene-bound metrics for the stratified scenes.
//!
//! Each stratified scene isolates one failure mode (fattening on
//! backgammon's gaps, missed dots, bumpiness on the pyramid surfaces,
//! bad pixels on the stripe patterns), so its metrics bind a general
//! scoring kernel to one scene and one named mask.

use crate::field::{DispField, MaskField};
use crate::metrics::regions::{bumpiness_score, signed_excess_percent};
use crate::metrics::{bad_pix_percent, mse_score, EvalInputs, Metric};
use crate::scenes::Scene;

#[derive(Clone, Copy, Debug)]
enum Kernel {
    BadPix(f32),
    Mse,
    Fattening(f32),
    Thinning(f32),
    Bumpiness,
}

/// A general kernel evaluated on one scene's named mask.
pub struct SceneMetric {
    scene_name: &'static str,
    mask_name: &'static str,
    key: &'static str,
    label: &'static str,
    kernel: Kernel,
}

impl Metric for SceneMetric {
    fn name(&self) -> String {
        self.key.to_string()
    }

    fn display_name(&self) -> String {
        self.label.to_string()
    }

    fn evaluation_mask(&self, scene: &Scene) -> Result<MaskField, String> {
        if !self.applies_to(scene) {
            return Err(format!(
                "{} is only defined for scene {}, not {}",
                self.key,
                self.scene_name,
                scene.name()
            ));
        }
        scene.mask(self.mask_name)
    }

    fn score_from_mask(
        &self,
        _inputs: EvalInputs,
        result: &DispField,
        gt: &DispField,
        mask: &MaskField,
    ) -> Result<f32, String> {
        match self.kernel {
            Kernel::BadPix(t) => bad_pix_percent(result, gt, mask, t, true),
            Kernel::Mse => mse_score(result, gt, mask),
            Kernel::Fattening(t) => signed_excess_percent(result, gt, mask, t, 1.0),
            Kernel::Thinning(t) => signed_excess_percent(result, gt, mask, t, -1.0),
            Kernel::Bumpiness => bumpiness_score(result, gt, mask),
        }
    }

    fn score_with_vis(
        &self,
        inputs: EvalInputs,
        result: &DispField,
        gt: &DispField,
        mask: &MaskField,
    ) -> Result<(f32, DispField), String> {
        let score = self.score_from_mask(inputs, result, gt, mask)?;
        let abs = result.abs_diff(gt)?;
        let mut vis = DispField::filled(abs.w, abs.h, f32::NAN);
        for i in 0..abs.data.len() {
            if mask.data[i] {
                vis.data[i] = abs.data[i];
            }
        }
        Ok((score, vis))
    }

    fn vis_range(&self) -> (f32, f32) {
        match self.kernel {
            Kernel::Mse => (0.0, 10.0),
            Kernel::Bumpiness => (0.0, 5.0),
            _ => (0.0, 1.0),
        }
    }

    fn applies_to(&self, scene: &Scene) -> bool {
        scene.name() == self.scene_name
    }
}

/// The nine stratified metrics, in radar-axis order. Their count must match
/// the stratified radar maxima table.
pub fn stratified_metrics() -> Vec<Box<dyn Metric>> {
    vec![
        Box::new(SceneMetric {
            scene_name: "backgammon",
            mask_name: "fg_fattening",
            key: "backgammon_fattening",
            label: "Backgammon Fattening",
            kernel: Kernel::Fattening(0.1),
        }),
        Box::new(SceneMetric {
            scene_name: "backgammon",
            mask_name: "fg_thinning",
            key: "backgammon_thinning",
            label: "Backgammon Thinning",
            kernel: Kernel::Thinning(0.1),
        }),
        Box::new(SceneMetric {
            scene_name: "dots",
            mask_name: "background",
            key: "dots_background_mse",
            label: "Dots Background MSE",
            kernel: Kernel::Mse,
        }),
        Box::new(SceneMetric {
            scene_name: "dots",
            mask_name: "dots",
            key: "missed_dots",
            label: "Missed Dots",
            kernel: Kernel::BadPix(0.4),
        }),
        Box::new(SceneMetric {
            scene_name: "pyramids",
            mask_name: "objects_slanted",
            key: "pyramids_slanted_bumpiness",
            label: "Pyramids Slanted Bumpiness",
            kernel: Kernel::Bumpiness,
        }),
        Box::new(SceneMetric {
            scene_name: "pyramids",
            mask_name: "objects_parallel",
            key: "pyramids_parallel_bumpiness",
            label: "Pyramids Parallel Bumpiness",
            kernel: Kernel::Bumpiness,
        }),
        Box::new(SceneMetric {
            scene_name: "stripes",
            mask_name: "low_texture",
            key: "stripes_low_texture",
            label: "Stripes Low Texture",
            kernel: Kernel::BadPix(0.07),
        }),
        Box::new(SceneMetric {
            scene_name: "stripes",
            mask_name: "bright_stripes",
            key: "bright_stripes",
            label: "Bright Stripes",
            kernel: Kernel::BadPix(0.07),
        }),
        Box::new(SceneMetric {
            scene_name: "stripes",
            mask_name: "dark_stripes",
            key: "dark_stripes",
            label: "Dark Stripes",
            kernel: Kernel::BadPix(0.07),
        }),
    ]
}
