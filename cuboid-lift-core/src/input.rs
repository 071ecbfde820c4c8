//! L0 — tolerant JSON input normalization. This is the only module aware of
//! the many accepted key aliases; everything it produces is a strict,
//! alias-free type from [`crate::types`] or [`crate::camera`].

use serde_json::Value;

use crate::camera::Camera;
use crate::error::LiftError;
use crate::types::{Detection, ObjectSpec, SizeM, SolverConfig};
use crate::vector::clamp01;

fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
}

/// Reads the first present, finite-numeric key from `keys`, falling back to
/// `default`. Mirrors the original prototype's `get_number`: a present but
/// unparsable key is skipped rather than treated as an error.
pub(crate) fn get_number(source: &Value, keys: &[&str], default: Option<f64>) -> Option<f64> {
    if let Some(map) = source.as_object() {
        for key in keys {
            if let Some(value) = map.get(*key) {
                if let Some(num) = value_to_f64(value) {
                    if num.is_finite() {
                        return Some(num);
                    }
                }
            }
        }
    }
    default
}

fn get_bool(source: &Value, key: &str, default: bool) -> bool {
    source
        .as_object()
        .and_then(|map| map.get(key))
        .and_then(Value::as_bool)
        .unwrap_or(default)
}

pub(crate) fn parse_anchor_uv(detection: &Value) -> (f64, f64) {
    let raw_anchor = detection
        .get("anchorUV")
        .or_else(|| detection.get("anchor_uv"))
        .or_else(|| detection.get("footpointUV"))
        .or_else(|| detection.get("footpoint_uv"));

    if let Some(raw) = raw_anchor {
        if let Some(arr) = raw.as_array() {
            if arr.len() >= 2 {
                if let (Some(u), Some(v)) = (value_to_f64(&arr[0]), value_to_f64(&arr[1])) {
                    if u.is_finite() && v.is_finite() {
                        return (clamp01(u), clamp01(v));
                    }
                }
            }
        }
        if let Some(map) = raw.as_object() {
            let u = map.get("u").or_else(|| map.get("x")).and_then(value_to_f64);
            let v = map.get("v").or_else(|| map.get("y")).and_then(value_to_f64);
            if let (Some(u), Some(v)) = (u, v) {
                if u.is_finite() && v.is_finite() {
                    return (clamp01(u), clamp01(v));
                }
            }
        }
    }

    let x = get_number(detection, &["x", "left"], Some(0.0)).unwrap_or(0.0);
    let y = get_number(detection, &["y", "top"], Some(0.0)).unwrap_or(0.0);
    let width = get_number(detection, &["width", "w"], Some(0.0)).unwrap_or(0.0);
    let height = get_number(detection, &["height", "h"], Some(0.0)).unwrap_or(0.0);
    (clamp01(x + width * 0.5), clamp01(y + height))
}

pub(crate) fn parse_bbox(detection: &Value) -> crate::types::BBox {
    crate::types::BBox {
        x: clamp01(get_number(detection, &["x", "left"], Some(0.0)).unwrap_or(0.0)),
        y: clamp01(get_number(detection, &["y", "top"], Some(0.0)).unwrap_or(0.0)),
        width: clamp01(get_number(detection, &["width", "w"], Some(0.0)).unwrap_or(0.0)),
        height: clamp01(get_number(detection, &["height", "h"], Some(0.0)).unwrap_or(0.0)),
    }
}

pub(crate) fn camera_from_value(value: &Value) -> Result<Camera, LiftError> {
    if !value.is_object() {
        return Err(LiftError::MissingCamera);
    }
    let plan_position = value
        .get("planPositionM")
        .and_then(Value::as_array)
        .filter(|arr| arr.len() >= 2)
        .and_then(|arr| Some((value_to_f64(&arr[0])?, value_to_f64(&arr[1])?)))
        .ok_or(LiftError::InvalidCameraPosition)?;

    Ok(Camera {
        plan_position_m: plan_position,
        height_m: get_number(value, &["heightM", "height", "mountHeightM"], Some(2.7)).unwrap_or(2.7),
        yaw_deg: get_number(value, &["yawDeg", "yaw"], Some(0.0)).unwrap_or(0.0),
        pitch_deg: get_number(value, &["pitchDeg", "pitch"], Some(-35.0)).unwrap_or(-35.0),
        roll_deg: get_number(value, &["rollDeg", "roll"], Some(0.0)).unwrap_or(0.0),
        fov_deg: get_number(value, &["fovDeg", "fov", "verticalFovDeg"], Some(65.0)).unwrap_or(65.0),
        aspect_ratio: get_number(value, &["aspectRatio", "aspect"], Some(16.0 / 9.0)).unwrap_or(16.0 / 9.0),
    })
}

pub(crate) fn detection_from_value(value: &Value) -> Result<Detection, LiftError> {
    if !value.is_object() {
        return Err(LiftError::MissingDetection);
    }
    let as_id = |key: &str| value.get(key).and_then(Value::as_str).map(String::from);
    Ok(Detection {
        bbox: parse_bbox(value),
        anchor_uv: parse_anchor_uv(value),
        track_id: as_id("trackId"),
        object_id: as_id("objectId"),
        id: as_id("id"),
    })
}

fn require_positive_dimension(dimension: &'static str, value: Option<f64>) -> Result<f64, LiftError> {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => Ok(v),
        other => Err(LiftError::InvalidObjectSize {
            dimension,
            value: other.unwrap_or(f64::NAN),
        }),
    }
}

pub(crate) fn object_from_value(value: &Value) -> Result<ObjectSpec, LiftError> {
    if !value.is_object() {
        return Err(LiftError::MissingObject);
    }
    let size_value = value.get("sizeM").cloned().unwrap_or(Value::Null);
    let width = require_positive_dimension("width", get_number(&size_value, &["width", "x"], None))?;
    let depth = require_positive_dimension("depth", get_number(&size_value, &["depth", "z"], None))?;
    let height = require_positive_dimension("height", get_number(&size_value, &["height", "y"], None))?;

    Ok(ObjectSpec {
        size_m: SizeM { width, depth, height },
        elevation_m: get_number(value, &["elevationM", "elevation"], Some(0.0)).unwrap_or(0.0),
        yaw_deg: get_number(value, &["yawDeg", "rotationDeg", "yaw"], None),
    })
}

pub(crate) fn config_from_value(value: &Value) -> SolverConfig {
    let smooth_center_alpha =
        clamp01(get_number(value, &["smoothCenterAlpha", "smoothingAlpha"], Some(1.0)).unwrap_or(1.0));
    let smooth_yaw_alpha = get_number(value, &["smoothYawAlpha"], None).map(clamp01);

    SolverConfig {
        floor_y: get_number(value, &["floorY", "floor_y"], Some(0.0)).unwrap_or(0.0),
        fit_yaw_from_bbox: get_bool(value, "fitYawFromBBox", false),
        fit_center_offset_from_bbox: get_bool(value, "fitCenterOffsetFromBBox", false),
        yaw_search_step_deg: get_number(value, &["yawSearchStepDeg", "yaw_step_deg"], Some(2.0)).unwrap_or(2.0),
        center_offset_min_m: get_number(value, &["centerOffsetMinM"], None),
        center_offset_max_m: get_number(value, &["centerOffsetMaxM"], None),
        center_offset_step_m: get_number(value, &["centerOffsetStepM"], Some(0.08)).unwrap_or(0.08),
        smooth_center_alpha,
        smooth_yaw_alpha,
    }
}

/// `dict.update`-style shallow merge: every top-level key in `override_` wins.
pub(crate) fn merge_shallow(base: &Value, override_: &Value) -> Value {
    let mut merged = base.as_object().cloned().unwrap_or_default();
    if let Some(override_map) = override_.as_object() {
        for (key, value) in override_map {
            merged.insert(key.clone(), value.clone());
        }
    }
    Value::Object(merged)
}

/// Shallow merge, except `sizeM` is merged key-by-key one level deep.
pub(crate) fn merge_object(base: &Value, override_: &Value) -> Value {
    let mut merged = base.as_object().cloned().unwrap_or_default();
    if let Some(override_map) = override_.as_object() {
        for (key, value) in override_map {
            if key == "sizeM" {
                if let (Some(base_size), Some(override_size)) =
                    (merged.get("sizeM").and_then(Value::as_object), value.as_object())
                {
                    let mut size_merged = base_size.clone();
                    for (k, v) in override_size {
                        size_merged.insert(k.clone(), v.clone());
                    }
                    merged.insert(key.clone(), Value::Object(size_merged));
                    continue;
                }
            }
            merged.insert(key.clone(), value.clone());
        }
    }
    Value::Object(merged)
}

/// Extracts a frame's detection, either `frame.detection` directly or
/// synthesized from top-level `x,y,width,height`. `None` means "skip this
/// frame" (§7: not an object, or lacks a detection).
pub(crate) fn frame_detection(frame: &Value, index: usize) -> Option<Value> {
    if let Some(detection) = frame.get("detection") {
        if detection.is_object() {
            return Some(detection.clone());
        }
    }

    let required = ["x", "y", "width", "height"];
    if !required.iter().all(|key| frame.get(*key).is_some()) {
        return None;
    }

    let mut map = serde_json::Map::new();
    map.insert(
        "id".to_string(),
        frame
            .get("id")
            .cloned()
            .unwrap_or_else(|| Value::String(format!("frame-det-{index}"))),
    );
    map.insert("trackId".to_string(), frame.get("trackId").cloned().unwrap_or(Value::Null));
    map.insert("objectId".to_string(), frame.get("objectId").cloned().unwrap_or(Value::Null));
    for key in required {
        map.insert(key.to_string(), frame.get(key).cloned().unwrap());
    }
    let anchor = frame.get("anchorUV").or_else(|| frame.get("anchor_uv")).cloned();
    if let Some(anchor) = anchor {
        map.insert("anchorUV".to_string(), anchor);
    }
    Some(Value::Object(map))
}

pub(crate) fn frame_timestamp(frame: &Value, index: usize) -> String {
    for key in ["timestamp", "time", "sentAt"] {
        if let Some(value) = frame.get(key).and_then(Value::as_str) {
            if !value.trim().is_empty() {
                return value.to_string();
            }
        }
    }
    format!("frame-{}", index + 1)
}
