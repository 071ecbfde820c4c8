//! L2 — camera model: basis construction, pinhole forward/backward projection,
//! ray-floor intersection.

use crate::vector::{Vec3, deg_to_rad, rotate_around_axis};

/// A fully-resolved, alias-free camera description. Built by [`crate::input`]
/// from the tolerant JSON shape; nothing downstream ever sees a raw `Value`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub plan_position_m: (f64, f64),
    pub height_m: f64,
    pub yaw_deg: f64,
    pub pitch_deg: f64,
    pub roll_deg: f64,
    pub fov_deg: f64,
    pub aspect_ratio: f64,
}

impl Camera {
    pub fn origin(&self) -> Vec3 {
        Vec3::new(self.plan_position_m.0, self.height_m, self.plan_position_m.1)
    }

    /// Right-handed (right, up, forward) basis for this camera's orientation.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let yaw = deg_to_rad(self.yaw_deg);
        let pitch = deg_to_rad(self.pitch_deg);

        let forward = Vec3::new(yaw.sin() * pitch.cos(), pitch.sin(), yaw.cos() * pitch.cos())
            .normalize_or_zero();
        let mut right = Vec3::new(yaw.cos(), 0.0, -yaw.sin()).normalize_or_zero();
        let mut up = forward.cross(right).normalize_or_zero();

        if self.roll_deg.abs() > 1e-7 {
            let roll = deg_to_rad(self.roll_deg);
            right = rotate_around_axis(right, forward, roll).normalize_or_zero();
            up = rotate_around_axis(up, forward, roll).normalize_or_zero();
            tracing::debug!(roll_deg = self.roll_deg, "applied roll to camera basis");
        }

        (right, up, forward)
    }

    /// Forward-projects a world point into normalized `(u, v)`. Returns `None`
    /// when the point is behind (or too close to) the camera plane; callers
    /// decide whether an out-of-[0,1] result still counts as visible.
    pub fn project(&self, world_point: Vec3) -> Option<(f64, f64)> {
        let origin = self.origin();
        let (right, up, forward) = self.basis();
        let rel = world_point - origin;

        let x_c = rel.dot(right);
        let y_c = rel.dot(up);
        let z_c = rel.dot(forward);
        if z_c <= 1e-5 {
            return None;
        }

        let tan_half_v = deg_to_rad(self.fov_deg * 0.5).tan();
        let x_ndc = x_c / (z_c * tan_half_v * self.aspect_ratio);
        let y_ndc = y_c / (z_c * tan_half_v);

        Some(((x_ndc + 1.0) / 2.0, (1.0 - y_ndc) / 2.0))
    }

    /// Builds the world-space ray through normalized image point `(u, v)`.
    pub fn ray(&self, u: f64, v: f64) -> (Vec3, Vec3) {
        let (right, up, forward) = self.basis();
        let origin = self.origin();

        let u = u.clamp(0.0, 1.0);
        let v = v.clamp(0.0, 1.0);
        let tan_half_v = deg_to_rad(self.fov_deg * 0.5).tan();

        let x_ndc = u * 2.0 - 1.0;
        let y_ndc = 1.0 - v * 2.0;

        let x_cam = x_ndc * tan_half_v * self.aspect_ratio;
        let y_cam = y_ndc * tan_half_v;
        let z_cam = 1.0;

        let direction = (right * x_cam + up * y_cam + forward * z_cam).normalize_or_zero();
        (origin, direction)
    }
}

/// Intersects a ray with the horizontal plane `y = floor_y`. `None` when the
/// ray is parallel to the floor or points away from it.
pub fn intersect_ray_with_floor(origin: Vec3, direction: Vec3, floor_y: f64) -> Option<Vec3> {
    if direction.y.abs() <= 1e-9 {
        return None;
    }
    let t = (floor_y - origin.y) / direction.y;
    if t <= 0.0 {
        return None;
    }
    Some(origin + direction * t)
}
