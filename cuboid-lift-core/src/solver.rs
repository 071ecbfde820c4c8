//! L3 — oriented cuboid solver: corner enumeration, reprojection, and the two
//! grid-search variants (yaw-only, yaw+center-offset).

use crate::camera::Camera;
use crate::types::BBox;
use crate::vector::{Vec3, clamp01, deg_to_rad, normalize_angle_deg};

const MIN_YAW_COARSE_STEP_DEG: f64 = 0.25;
const MIN_YAW_FINE_STEP_DEG: f64 = 0.1;
const MIN_OFFSET_COARSE_STEP_M: f64 = 0.02;
const MIN_OFFSET_FINE_STEP_M: f64 = 0.01;

/// Eight corners of an oriented box on the floor, interleaved base/top per
/// horizontal corner: even indices are the base (`y = base_y`), odd indices
/// the top (`y = base_y + height_m`). `corners[0..8:2]` is the footprint.
pub fn oriented_box_corners(
    center_x: f64,
    center_z: f64,
    width_m: f64,
    depth_m: f64,
    height_m: f64,
    yaw_deg: f64,
    base_y_m: f64,
) -> [Vec3; 8] {
    let half_w = width_m * 0.5;
    let half_d = depth_m * 0.5;
    let yaw = deg_to_rad(yaw_deg);
    let c = yaw.cos();
    let s = yaw.sin();

    let local_xz = [
        (-half_w, -half_d),
        (half_w, -half_d),
        (half_w, half_d),
        (-half_w, half_d),
    ];

    let mut corners = [Vec3::ZERO; 8];
    for (i, (lx, lz)) in local_xz.iter().enumerate() {
        let world_x = center_x + lx * c - lz * s;
        let world_z = center_z + lx * s + lz * c;
        corners[i * 2] = Vec3::new(world_x, base_y_m, world_z);
        corners[i * 2 + 1] = Vec3::new(world_x, base_y_m + height_m, world_z);
    }
    corners
}

/// Projects all 8 corners and returns the clamped-to-`[0,1]` AABB of the
/// survivors (corners behind the camera are dropped). `None` if no corner is
/// visible or the resulting box is degenerate.
pub fn bbox_from_projected_corners(corners: &[Vec3; 8], camera: &Camera) -> Option<BBox> {
    let projected: Vec<(f64, f64)> = corners.iter().filter_map(|c| camera.project(*c)).collect();
    if projected.is_empty() {
        return None;
    }

    let mut min_u = f64::INFINITY;
    let mut max_u = f64::NEG_INFINITY;
    let mut min_v = f64::INFINITY;
    let mut max_v = f64::NEG_INFINITY;
    for (u, v) in &projected {
        min_u = min_u.min(*u);
        max_u = max_u.max(*u);
        min_v = min_v.min(*v);
        max_v = max_v.max(*v);
    }
    let min_u = clamp01(min_u);
    let max_u = clamp01(max_u);
    let min_v = clamp01(min_v);
    let max_v = clamp01(max_v);

    if max_u <= min_u || max_v <= min_v {
        return None;
    }

    Some(BBox {
        x: min_u,
        y: min_v,
        width: max_u - min_u,
        height: max_v - min_v,
    })
}

/// `2*(|center error|) + |size error|`, per §4.3.
pub fn bbox_fit_error(observed: &BBox, predicted: &BBox) -> f64 {
    let (obs_cx, obs_cy) = observed.center();
    let (pred_cx, pred_cy) = predicted.center();
    let e_center = (obs_cx - pred_cx).abs() + (obs_cy - pred_cy).abs();
    let e_size = (observed.width - predicted.width).abs() + (observed.height - predicted.height).abs();
    e_center * 2.0 + e_size
}

pub struct ObjectSize {
    pub width: f64,
    pub depth: f64,
    pub height: f64,
}

pub struct YawFit {
    pub yaw_deg: f64,
    pub error_l1: f64,
    pub bbox: Option<BBox>,
}

/// Variant A: yaw-only grid search (coarse pass over the full circle, then a
/// local fine pass around the coarse winner). First-strictly-better candidate
/// wins ties.
pub fn fit_yaw_from_bbox(
    camera: &Camera,
    observed_bbox: &BBox,
    anchor_world: Vec3,
    size: &ObjectSize,
    base_y: f64,
    coarse_step_deg: f64,
    yaw_hint_deg: Option<f64>,
) -> YawFit {
    let center_x = anchor_world.x;
    let center_z = anchor_world.z;

    let eval_yaw = |yaw_deg: f64| -> (f64, Option<BBox>) {
        let corners = oriented_box_corners(
            center_x, center_z, size.width, size.depth, size.height, yaw_deg, base_y,
        );
        match bbox_from_projected_corners(&corners, camera) {
            Some(bbox) => (bbox_fit_error(observed_bbox, &bbox), Some(bbox)),
            None => (f64::INFINITY, None),
        }
    };

    let mut best_yaw = yaw_hint_deg.unwrap_or(0.0);
    let (mut best_error, mut best_bbox) = eval_yaw(best_yaw);

    let step = coarse_step_deg.max(MIN_YAW_COARSE_STEP_DEG);
    let turns = (360.0 / step).ceil() as i64;
    for index in 0..turns {
        let yaw = -180.0 + index as f64 * step;
        let (error, bbox) = eval_yaw(yaw);
        if error < best_error {
            best_error = error;
            best_yaw = yaw;
            best_bbox = bbox;
        }
    }

    let fine_span = (step * 2.0).max(1.0);
    let fine_step = (step / 8.0).max(MIN_YAW_FINE_STEP_DEG);
    let fine_count = ((fine_span * 2.0) / fine_step).ceil() as i64 + 1;
    for index in 0..fine_count {
        let yaw = best_yaw - fine_span + index as f64 * fine_step;
        let (error, bbox) = eval_yaw(yaw);
        if error < best_error {
            best_error = error;
            best_yaw = yaw;
            best_bbox = bbox;
        }
    }

    YawFit {
        yaw_deg: normalize_angle_deg(best_yaw),
        error_l1: best_error,
        bbox: best_bbox,
    }
}

pub struct OffsetFit {
    pub yaw_deg: f64,
    pub error_l1: f64,
    pub bbox: Option<BBox>,
    pub offset_m: f64,
    pub center: Vec3,
}

/// Variant B: yaw + along-ray center-offset grid search.
#[allow(clippy::too_many_arguments)]
pub fn fit_center_offset_and_yaw_from_bbox(
    camera: &Camera,
    observed_bbox: &BBox,
    anchor_world: Vec3,
    size: &ObjectSize,
    base_y: f64,
    coarse_step_deg: f64,
    yaw_hint_deg: Option<f64>,
    offset_min_m: f64,
    offset_max_m: f64,
    offset_step_m: f64,
) -> OffsetFit {
    let camera_origin = camera.origin();
    let away = Vec3::new(anchor_world.x - camera_origin.x, 0.0, anchor_world.z - camera_origin.z);
    let away_len = (away.x * away.x + away.z * away.z).sqrt();
    let away_dir = if away_len <= 1e-7 {
        Vec3::new(0.0, 0.0, 1.0)
    } else {
        Vec3::new(away.x / away_len, 0.0, away.z / away_len)
    };

    let center_from_offset = |offset_m: f64| -> Vec3 {
        Vec3::new(
            anchor_world.x + away_dir.x * offset_m,
            base_y,
            anchor_world.z + away_dir.z * offset_m,
        )
    };

    let observed_anchor = (
        observed_bbox.x + observed_bbox.width / 2.0,
        observed_bbox.y + observed_bbox.height,
    );

    let eval_pose = |yaw_deg: f64, offset_m: f64| -> (f64, Option<BBox>) {
        let center = center_from_offset(offset_m);
        let corners = oriented_box_corners(
            center.x, center.z, size.width, size.depth, size.height, yaw_deg, base_y,
        );
        match bbox_from_projected_corners(&corners, camera) {
            Some(bbox) => {
                let predicted_anchor = (bbox.x + bbox.width / 2.0, bbox.y + bbox.height);
                let anchor_error =
                    (predicted_anchor.0 - observed_anchor.0).abs() + (predicted_anchor.1 - observed_anchor.1).abs();
                let combined = bbox_fit_error(observed_bbox, &bbox) + anchor_error * 2.0;
                (combined, Some(bbox))
            }
            None => (f64::INFINITY, None),
        }
    };

    let step_deg = coarse_step_deg.max(MIN_YAW_COARSE_STEP_DEG);
    let step_offset = offset_step_m.max(MIN_OFFSET_COARSE_STEP_M);
    let yaw_candidates = (360.0 / step_deg).ceil() as i64;
    let offset_count = ((offset_max_m - offset_min_m) / step_offset).floor() as i64 + 1;

    let mut best_yaw = yaw_hint_deg.unwrap_or(0.0);
    let mut best_offset = 0.0;
    let (mut best_error, mut best_bbox) = eval_pose(best_yaw, best_offset);

    for offset_index in 0..offset_count.max(0) {
        let offset_m = offset_min_m + offset_index as f64 * step_offset;
        for yaw_index in 0..yaw_candidates {
            let yaw = -180.0 + yaw_index as f64 * step_deg;
            let (error, bbox) = eval_pose(yaw, offset_m);
            if error < best_error {
                best_error = error;
                best_yaw = yaw;
                best_offset = offset_m;
                best_bbox = bbox;
            }
        }
    }

    let fine_yaw_span = (step_deg * 2.0).max(2.0);
    let fine_yaw_step = (step_deg / 8.0).max(MIN_YAW_FINE_STEP_DEG);
    let fine_offset_span = (step_offset * 2.0).max(0.08);
    let fine_offset_step = (step_offset / 8.0).max(MIN_OFFSET_FINE_STEP_M);

    let fine_yaw_count = ((fine_yaw_span * 2.0) / fine_yaw_step).ceil() as i64 + 1;
    let fine_offset_count = ((fine_offset_span * 2.0) / fine_offset_step).ceil() as i64 + 1;

    for offset_index in 0..fine_offset_count {
        let offset_m = best_offset - fine_offset_span + offset_index as f64 * fine_offset_step;
        for yaw_index in 0..fine_yaw_count {
            let yaw = best_yaw - fine_yaw_span + yaw_index as f64 * fine_yaw_step;
            let (error, bbox) = eval_pose(yaw, offset_m);
            if error < best_error {
                best_error = error;
                best_yaw = yaw;
                best_offset = offset_m;
                best_bbox = bbox;
            }
        }
    }

    OffsetFit {
        yaw_deg: normalize_angle_deg(best_yaw),
        error_l1: best_error,
        bbox: best_bbox,
        offset_m: best_offset,
        center: center_from_offset(best_offset),
    }
}
