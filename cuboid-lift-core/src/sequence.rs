//! L4 — sequence driver: per-frame merge overrides, then exponential-moving-
//! average smoothing across the batch with shortest-arc yaw interpolation.

use serde_json::Value;

use crate::error::LiftError;
use crate::input;
use crate::lift_single;
use crate::types::{FrameReport, SequenceReport, SmoothedPose, Smoothing, Summary, ASSUMPTIONS};
use crate::vector::{angle_delta_deg, normalize_angle_deg};

fn lerp(from: f64, to: f64, alpha: f64) -> f64 {
    from + (to - from) * alpha
}

/// Interpolates across the shorter arc so a pose never visibly spins through
/// the far side of the circle when it crosses the +-180 deg seam.
fn lerp_angle(from_deg: f64, to_deg: f64, alpha: f64) -> f64 {
    normalize_angle_deg(from_deg + angle_delta_deg(from_deg, to_deg) * alpha)
}

struct SmoothedState {
    x: f64,
    z: f64,
    yaw_deg: f64,
}

pub fn lift_sequence(camera: &Value, object: &Value, config: &Value, frames: &Value) -> Result<SequenceReport, LiftError> {
    if !camera.is_object() {
        return Err(LiftError::MissingCamera);
    }
    if !object.is_object() {
        return Err(LiftError::MissingObject);
    }
    let config_value = if config.is_object() {
        config.clone()
    } else {
        Value::Object(Default::default())
    };

    let frame_values = frames
        .as_array()
        .filter(|frames| !frames.is_empty())
        .ok_or(LiftError::EmptyBatch)?;

    let base_config = input::config_from_value(&config_value);
    let alpha_center = base_config.smooth_center_alpha;
    let alpha_yaw = base_config.smooth_yaw_alpha();

    let mut frame_reports = Vec::new();
    let mut fit_errors = Vec::new();
    let mut previous: Option<SmoothedState> = None;

    for (index, raw_frame) in frame_values.iter().enumerate() {
        if !raw_frame.is_object() {
            tracing::debug!(index, "skipping frame: not an object");
            continue;
        }
        let detection_value = match input::frame_detection(raw_frame, index) {
            Some(value) => value,
            None => {
                tracing::debug!(index, "skipping frame: no detection");
                continue;
            }
        };

        let frame_camera_value = match raw_frame.get("camera").filter(|v| v.is_object()) {
            Some(override_) => input::merge_shallow(camera, override_),
            None => camera.clone(),
        };
        let frame_object_value = match raw_frame.get("object").filter(|v| v.is_object()) {
            Some(override_) => input::merge_object(object, override_),
            None => object.clone(),
        };
        let frame_config_value = match raw_frame.get("config").filter(|v| v.is_object()) {
            Some(override_) => input::merge_shallow(&config_value, override_),
            None => config_value.clone(),
        };

        let report = lift_single(&frame_camera_value, &detection_value, &frame_object_value, &frame_config_value)?;
        let raw = report.result;

        let current = SmoothedState {
            x: raw.base_center_world[0],
            z: raw.base_center_world[2],
            yaw_deg: normalize_angle_deg(raw.yaw_deg),
        };
        let smoothed = match previous {
            None => current,
            Some(prev) => SmoothedState {
                x: lerp(prev.x, current.x, alpha_center),
                z: lerp(prev.z, current.z, alpha_center),
                yaw_deg: lerp_angle(prev.yaw_deg, current.yaw_deg, alpha_yaw),
            },
        };

        if let Some(error) = raw.fit.error_l1 {
            if error.is_finite() {
                fit_errors.push(error);
            }
        }

        let track_id = detection_value.get("trackId").and_then(Value::as_str).map(String::from);
        let object_id = detection_value.get("objectId").and_then(Value::as_str).map(String::from);

        frame_reports.push(FrameReport {
            index,
            timestamp: input::frame_timestamp(raw_frame, index),
            track_id,
            object_id,
            smoothed_pose: SmoothedPose {
                base_center_world: [smoothed.x, raw.base_center_world[1], smoothed.z],
                center_world: [smoothed.x, raw.center_world[1], smoothed.z],
                plan_position_m: [smoothed.x, smoothed.z],
                yaw_deg: smoothed.yaw_deg,
            },
            raw,
        });

        previous = Some(SmoothedState {
            x: smoothed.x,
            z: smoothed.z,
            yaw_deg: smoothed.yaw_deg,
        });
    }

    if frame_reports.is_empty() {
        return Err(LiftError::EmptyBatch);
    }

    let fit_error_mean_l1 = if fit_errors.is_empty() {
        None
    } else {
        Some(fit_errors.iter().sum::<f64>() / fit_errors.len() as f64)
    };
    let fit_error_max_l1 = fit_errors.iter().cloned().fold(None, |acc: Option<f64>, value| {
        Some(acc.map_or(value, |max: f64| max.max(value)))
    });

    Ok(SequenceReport {
        status: "ok",
        mode: "batch",
        assumptions: ASSUMPTIONS,
        smoothing: Smoothing {
            smooth_center_alpha: alpha_center,
            smooth_yaw_alpha: alpha_yaw,
            enabled: alpha_center < 0.999 || alpha_yaw < 0.999,
        },
        summary: Summary {
            frame_count: frame_reports.len(),
            fit_error_mean_l1,
            fit_error_max_l1,
        },
        frames: frame_reports,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_angle_takes_shortest_arc_across_seam() {
        let result = lerp_angle(170.0, -170.0, 0.5);
        assert!((result - 180.0).abs() < 1e-9);
    }

    #[test]
    fn lerp_angle_alpha_one_snaps_to_target() {
        let result = lerp_angle(10.0, 95.0, 1.0);
        assert!((result - 95.0).abs() < 1e-9);
    }

    #[test]
    fn lerp_angle_alpha_zero_holds_previous() {
        let result = lerp_angle(10.0, 95.0, 0.0);
        assert!((result - 10.0).abs() < 1e-9);
    }
}
