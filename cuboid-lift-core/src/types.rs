//! Strict, alias-free input/output types shared by L2-L4. [`crate::input`]
//! (L0) is the only place that knows about key aliases or JSON shape
//! tolerance; everything below is already validated.

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BBox {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Clone, Debug)]
pub struct Detection {
    pub bbox: BBox,
    pub anchor_uv: (f64, f64),
    pub track_id: Option<String>,
    pub object_id: Option<String>,
    pub id: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SizeM {
    pub width: f64,
    pub depth: f64,
    pub height: f64,
}

#[derive(Clone, Debug)]
pub struct ObjectSpec {
    pub size_m: SizeM,
    pub elevation_m: f64,
    pub yaw_deg: Option<f64>,
}

#[derive(Clone, Debug)]
pub struct SolverConfig {
    pub floor_y: f64,
    pub fit_yaw_from_bbox: bool,
    pub fit_center_offset_from_bbox: bool,
    pub yaw_search_step_deg: f64,
    pub center_offset_min_m: Option<f64>,
    pub center_offset_max_m: Option<f64>,
    pub center_offset_step_m: f64,
    pub smooth_center_alpha: f64,
    pub smooth_yaw_alpha: Option<f64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            floor_y: 0.0,
            fit_yaw_from_bbox: false,
            fit_center_offset_from_bbox: false,
            yaw_search_step_deg: 2.0,
            center_offset_min_m: None,
            center_offset_max_m: None,
            center_offset_step_m: 0.08,
            smooth_center_alpha: 1.0,
            smooth_yaw_alpha: None,
        }
    }
}

impl SolverConfig {
    /// Resolves the offset search window against an object's depth, applying
    /// the documented `-depth/2 .. +depth/2` default.
    pub fn offset_range_m(&self, depth_m: f64) -> (f64, f64) {
        let min = self.center_offset_min_m.unwrap_or(-depth_m / 2.0);
        let max = self.center_offset_max_m.unwrap_or(depth_m / 2.0);
        (min, max)
    }

    pub fn smooth_yaw_alpha(&self) -> f64 {
        self.smooth_yaw_alpha.unwrap_or(self.smooth_center_alpha)
    }
}

pub const ASSUMPTIONS: [&str; 4] = [
    "single_camera",
    "floor_plane_support",
    "object_pitch_roll_fixed_zero",
    "anchor_uv_bottom_center_default",
];

#[derive(Clone, Copy, Debug, Serialize)]
pub struct Fit {
    pub enabled: bool,
    #[serde(rename = "fitCenterOffset")]
    pub fit_center_offset: Option<bool>,
    #[serde(rename = "errorL1")]
    pub error_l1: Option<f64>,
    #[serde(rename = "coarseStepDeg")]
    pub coarse_step_deg: Option<f64>,
    #[serde(rename = "offsetRangeM")]
    pub offset_range_m: Option<[f64; 2]>,
    #[serde(rename = "offsetStepM")]
    pub offset_step_m: Option<f64>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseResult {
    pub anchor_world: [f64; 3],
    pub base_center_world: [f64; 3],
    pub center_world: [f64; 3],
    #[serde(rename = "footprintXZ")]
    pub footprint_xz: Vec<[f64; 2]>,
    pub center_offset_from_anchor_m: f64,
    pub yaw_deg: f64,
    #[serde(rename = "reprojectedBBox")]
    pub reprojected_bbox: Option<BBox>,
    pub fit: Fit,
    pub corners_world: Vec<[f64; 3]>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputEcho {
    #[serde(rename = "anchorUV")]
    pub anchor_uv: [f64; 2],
    pub bbox: BBox,
    pub size_m: SizeMOut,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct SizeMOut {
    pub width: f64,
    pub depth: f64,
    pub height: f64,
}

impl From<SizeM> for SizeMOut {
    fn from(size: SizeM) -> Self {
        SizeMOut {
            width: size.width,
            depth: size.depth,
            height: size.height,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseReport {
    pub status: &'static str,
    pub assumptions: [&'static str; 4],
    pub input_echo: InputEcho,
    pub result: PoseResult,
}

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Smoothing {
    pub smooth_center_alpha: f64,
    pub smooth_yaw_alpha: f64,
    pub enabled: bool,
}

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub frame_count: usize,
    pub fit_error_mean_l1: Option<f64>,
    pub fit_error_max_l1: Option<f64>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmoothedPose {
    pub base_center_world: [f64; 3],
    pub center_world: [f64; 3],
    pub plan_position_m: [f64; 2],
    pub yaw_deg: f64,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameReport {
    pub index: usize,
    pub timestamp: String,
    pub track_id: Option<String>,
    pub object_id: Option<String>,
    pub raw: PoseResult,
    pub smoothed_pose: SmoothedPose,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceReport {
    pub status: &'static str,
    pub mode: &'static str,
    pub assumptions: [&'static str; 4],
    pub smoothing: Smoothing,
    pub summary: Summary,
    pub frames: Vec<FrameReport>,
}
