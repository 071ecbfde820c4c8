//! L1 — minimal vector kernel. Arithmetic and rotation are backed by
//! `glam::DVec3`/`DQuat` (the teacher's own math layer, in its `f64` flavor);
//! only the handful of free functions with no `glam` counterpart — angle
//! normalization, clamping, safe numeric coercion — live here directly.

pub use glam::DVec3 as Vec3;
use glam::DQuat;

/// Rodrigues rotation of `v` around `axis` (need not be normalized) by
/// `angle_rad` radians. A zero-length axis leaves `v` unchanged.
pub fn rotate_around_axis(v: Vec3, axis: Vec3, angle_rad: f64) -> Vec3 {
    let axis = axis.normalize_or_zero();
    if axis == Vec3::ZERO {
        return v;
    }
    DQuat::from_axis_angle(axis, angle_rad) * v
}

pub fn deg_to_rad(value_deg: f64) -> f64 {
    value_deg * std::f64::consts::PI / 180.0
}

pub fn rad_to_deg(value_rad: f64) -> f64 {
    value_rad * 180.0 / std::f64::consts::PI
}

pub fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Folds an angle in degrees into `(-180, 180]`.
pub fn normalize_angle_deg(value_deg: f64) -> f64 {
    let wrapped = (value_deg + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped <= -180.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// Shortest signed distance from `from_deg` to `to_deg`, in `(-180, 180]`.
pub fn angle_delta_deg(from_deg: f64, to_deg: f64) -> f64 {
    normalize_angle_deg(to_deg - from_deg)
}

/// Returns `value` if it parses to a finite number, `default` otherwise.
pub fn safe_float(value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_zero_vector_is_zero() {
        assert_eq!(Vec3::ZERO.normalize_or_zero(), Vec3::ZERO);
    }

    #[test]
    fn normalize_unit_length() {
        let v = Vec3::new(3.0, 4.0, 0.0).normalize_or_zero();
        assert!((v.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn cross_is_orthogonal() {
        let a = Vec3::new(1.0, 0.0, 0.0);
        let b = Vec3::new(0.0, 1.0, 0.0);
        let c = a.cross(b);
        assert!((c.dot(a)).abs() < 1e-12);
        assert!((c.dot(b)).abs() < 1e-12);
        assert_eq!(c, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn rodrigues_rotate_90_deg_about_y() {
        let v = Vec3::new(1.0, 0.0, 0.0);
        let rotated = rotate_around_axis(v, Vec3::new(0.0, 1.0, 0.0), deg_to_rad(90.0));
        assert!((rotated.x).abs() < 1e-9);
        assert!((rotated.z - (-1.0)).abs() < 1e-9);
    }

    #[test]
    fn rodrigues_zero_axis_is_identity() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(rotate_around_axis(v, Vec3::ZERO, deg_to_rad(45.0)), v);
    }

    #[test]
    fn normalize_angle_folds_into_range() {
        assert!((normalize_angle_deg(180.0) - 180.0).abs() < 1e-9);
        assert!((normalize_angle_deg(-180.0) - 180.0).abs() < 1e-9);
        assert!((normalize_angle_deg(270.0) - (-90.0)).abs() < 1e-9);
        assert!((normalize_angle_deg(-270.0) - 90.0).abs() < 1e-9);
        assert!((normalize_angle_deg(361.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn angle_delta_picks_shortest_arc() {
        let delta = angle_delta_deg(170.0, -170.0);
        assert!((delta - 20.0).abs() < 1e-9);
    }

    #[test]
    fn safe_float_rejects_non_finite() {
        assert_eq!(safe_float(Some(f64::NAN), 2.7), 2.7);
        assert_eq!(safe_float(Some(f64::INFINITY), 2.7), 2.7);
        assert_eq!(safe_float(None, 2.7), 2.7);
        assert_eq!(safe_float(Some(1.5), 2.7), 1.5);
    }
}
