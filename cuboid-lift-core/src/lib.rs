//! Monocular 2.5D-to-3D cuboid lifting: given a calibrated camera, a 2D
//! detection, and an object's physical footprint, estimates the oriented 3D
//! cuboid pose that would produce that detection on a floor plane.
//!
//! Layout mirrors the pipeline itself:
//!
//! - [`vector`] — the f64 vector kernel everything else is built on
//! - [`camera`] — pinhole basis, projection, and ray casting
//! - [`solver`] — corner enumeration, reprojection, and the two pose-fit variants
//! - [`sequence`] — batch driving and EMA smoothing across frames
//! - [`input`] — tolerant JSON parsing; the only module that knows about key aliases
//! - [`types`] — the strict data model and wire-format report types
//! - [`error`] — [`LiftError`], the single error type every public entry point returns

pub mod camera;
pub mod error;
mod input;
pub mod sequence;
pub mod solver;
pub mod types;
pub mod vector;

use serde_json::Value;

pub use error::LiftError;
pub use sequence::lift_sequence;
pub use types::{PoseReport, SequenceReport};

use camera::intersect_ray_with_floor;
use solver::{bbox_fit_error, fit_center_offset_and_yaw_from_bbox, fit_yaw_from_bbox, oriented_box_corners, ObjectSize};
use types::{Fit, InputEcho, PoseResult};
use vector::normalize_angle_deg;

/// Lifts a single 2D detection into a 3D cuboid pose.
///
/// `camera`, `detection`, `object`, and `config` are raw JSON objects; see
/// `SPEC_FULL.md` for the accepted shapes and key aliases. `config` may be
/// `Value::Null` or an empty object to take every default.
pub fn lift_single(camera: &Value, detection: &Value, object: &Value, config: &Value) -> Result<PoseReport, LiftError> {
    let camera = input::camera_from_value(camera)?;
    let detection = input::detection_from_value(detection)?;
    let object = input::object_from_value(object)?;
    let config = input::config_from_value(config);

    let base_y = config.floor_y + object.elevation_m;
    let (ray_origin, ray_dir) = camera.ray(detection.anchor_uv.0, detection.anchor_uv.1);
    let anchor_world = intersect_ray_with_floor(ray_origin, ray_dir, base_y).ok_or(LiftError::RayMissesFloor)?;

    let size = ObjectSize {
        width: object.size_m.width,
        depth: object.size_m.depth,
        height: object.size_m.height,
    };

    let fit_yaw_enabled = config.fit_yaw_from_bbox;
    let fit_offset_enabled = config.fit_center_offset_from_bbox;

    let mut center_x = anchor_world.x;
    let mut center_z = anchor_world.z;
    let mut center_offset_m = 0.0;

    let (yaw_deg, fit_error, projected_bbox) = if fit_yaw_enabled && fit_offset_enabled {
        let (offset_min, offset_max) = config.offset_range_m(size.depth);
        let fit = fit_center_offset_and_yaw_from_bbox(
            &camera,
            &detection.bbox,
            anchor_world,
            &size,
            base_y,
            config.yaw_search_step_deg,
            object.yaw_deg,
            offset_min,
            offset_max,
            config.center_offset_step_m,
        );
        center_x = fit.center.x;
        center_z = fit.center.z;
        center_offset_m = fit.offset_m;
        (fit.yaw_deg, Some(fit.error_l1), fit.bbox)
    } else if fit_yaw_enabled {
        let fit = fit_yaw_from_bbox(
            &camera,
            &detection.bbox,
            anchor_world,
            &size,
            base_y,
            config.yaw_search_step_deg,
            object.yaw_deg,
        );
        (fit.yaw_deg, Some(fit.error_l1), fit.bbox)
    } else {
        let yaw_deg = normalize_angle_deg(object.yaw_deg.unwrap_or(0.0));
        let corners = oriented_box_corners(center_x, center_z, size.width, size.depth, size.height, yaw_deg, base_y);
        let bbox = solver::bbox_from_projected_corners(&corners, &camera);
        let error = bbox.as_ref().map(|predicted| bbox_fit_error(&detection.bbox, predicted));
        (yaw_deg, error, bbox)
    };

    let fit = Fit {
        enabled: fit_yaw_enabled,
        fit_center_offset: fit_yaw_enabled.then_some(fit_offset_enabled),
        error_l1: fit_error,
        coarse_step_deg: fit_yaw_enabled.then_some(config.yaw_search_step_deg),
        offset_range_m: (fit_yaw_enabled && fit_offset_enabled).then(|| {
            let (min, max) = config.offset_range_m(size.depth);
            [min, max]
        }),
        offset_step_m: (fit_yaw_enabled && fit_offset_enabled).then_some(config.center_offset_step_m),
    };

    let center_y = base_y + size.height * 0.5;
    let corners = oriented_box_corners(center_x, center_z, size.width, size.depth, size.height, yaw_deg, base_y);
    let footprint_xz = corners.iter().step_by(2).map(|c| [c.x, c.z]).collect();
    let corners_world = corners.iter().map(|c| [c.x, c.y, c.z]).collect();

    tracing::debug!(
        yaw_deg,
        fit_error = fit_error.unwrap_or(f64::NAN),
        "resolved cuboid pose"
    );

    Ok(PoseReport {
        status: "ok",
        assumptions: types::ASSUMPTIONS,
        input_echo: InputEcho {
            anchor_uv: [detection.anchor_uv.0, detection.anchor_uv.1],
            bbox: detection.bbox,
            size_m: object.size_m.into(),
        },
        result: PoseResult {
            anchor_world: [anchor_world.x, anchor_world.y, anchor_world.z],
            base_center_world: [center_x, base_y, center_z],
            center_world: [center_x, center_y, center_z],
            footprint_xz,
            center_offset_from_anchor_m: center_offset_m,
            yaw_deg,
            reprojected_bbox: projected_bbox,
            fit,
            corners_world,
        },
    })
}
