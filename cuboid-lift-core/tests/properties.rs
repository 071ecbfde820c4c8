//! Algebraic invariants that must hold for any valid input, checked via `proptest`.

use approx::assert_abs_diff_eq;
use cuboid_lift_core::camera::Camera;
use cuboid_lift_core::solver::{bbox_fit_error, bbox_from_projected_corners, oriented_box_corners, ObjectSize};
use cuboid_lift_core::vector::{angle_delta_deg, normalize_angle_deg, Vec3};
use cuboid_lift_core::{lift_sequence, lift_single};
use proptest::prelude::*;
use serde_json::json;

fn camera_with(yaw_deg: f64, pitch_deg: f64, roll_deg: f64) -> Camera {
    Camera {
        plan_position_m: (0.0, 0.0),
        height_m: 2.7,
        yaw_deg,
        pitch_deg,
        roll_deg,
        fov_deg: 65.0,
        aspect_ratio: 16.0 / 9.0,
    }
}

proptest! {
    #[test]
    fn prop1_basis_is_always_orthonormal(
        yaw_deg in -180f64..180.0,
        pitch_deg in -89f64..89.0,
        roll_deg in -180f64..180.0,
    ) {
        let camera = camera_with(yaw_deg, pitch_deg, roll_deg);
        let (right, up, forward) = camera.basis();
        prop_assert!(right.dot(up).abs() < 1e-6);
        prop_assert!(right.dot(forward).abs() < 1e-6);
        prop_assert!(up.dot(forward).abs() < 1e-6);
        prop_assert!((right.length() - 1.0).abs() < 1e-6);
        prop_assert!((up.length() - 1.0).abs() < 1e-6);
        prop_assert!((forward.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn prop2_project_then_ray_recovers_the_point(
        yaw_deg in -60f64..60.0,
        pitch_deg in -50f64..-5.0,
        x in -5f64..5.0,
        z_offset in 2f64..10.0,
        y in -1f64..3.0,
    ) {
        let camera = camera_with(yaw_deg, pitch_deg, 0.0);
        let point = Vec3::new(x, y, z_offset);
        if let Some((u, v)) = camera.project(point) {
            if (0.0..=1.0).contains(&u) && (0.0..=1.0).contains(&v) {
                let (origin, direction) = camera.ray(u, v);
                prop_assume!(direction.y.abs() > 1e-6);
                let t = (point.y - origin.y) / direction.y;
                prop_assume!(t > 0.0);
                let hit = origin + direction * t;
                prop_assert!((hit.x - point.x).abs() < 1e-4);
                prop_assert!((hit.z - point.z).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn prop3_emitted_yaw_is_always_normalized(raw_yaw_deg in -1080f64..1080.0) {
        let normalized = normalize_angle_deg(raw_yaw_deg);
        prop_assert!(normalized > -180.0 && normalized <= 180.0);
    }

    #[test]
    fn prop4_floor_containment(
        center_x in -5f64..5.0,
        center_z in -5f64..5.0,
        width in 0.2f64..3.0,
        depth in 0.2f64..3.0,
        height in 0.2f64..3.0,
        yaw_deg in -180f64..180.0,
        base_y in -2f64..2.0,
    ) {
        let corners = oriented_box_corners(center_x, center_z, width, depth, height, yaw_deg, base_y);
        for i in 0..4 {
            prop_assert_eq!(corners[i * 2].y, base_y);
        }
        for window in corners.iter().step_by(2).collect::<Vec<_>>().windows(2) {
            prop_assert_eq!(window[0].y, window[1].y);
        }
    }

    #[test]
    fn prop5_corner_layout_even_base_odd_top(
        width in 0.2f64..3.0,
        depth in 0.2f64..3.0,
        height in 0.2f64..3.0,
        yaw_deg in -180f64..180.0,
    ) {
        let corners = oriented_box_corners(0.0, 0.0, width, depth, height, yaw_deg, 0.0);
        for i in 0..4 {
            prop_assert_eq!(corners[i * 2].y, 0.0);
            prop_assert_eq!(corners[i * 2 + 1].y, height);
        }
    }

    #[test]
    fn prop6_square_footprint_symmetric_under_yaw_plus_180(
        side in 0.3f64..3.0,
        height in 0.3f64..3.0,
        yaw_deg in -180f64..180.0,
    ) {
        let camera = camera_with(0.0, -30.0, 0.0);
        let size = ObjectSize { width: side, depth: side, height };
        let corners_a = oriented_box_corners(1.0, 5.0, size.width, size.depth, size.height, yaw_deg, 0.0);
        let corners_b = oriented_box_corners(1.0, 5.0, size.width, size.depth, size.height, yaw_deg + 180.0, 0.0);

        if let (Some(bbox_a), Some(bbox_b)) = (
            bbox_from_projected_corners(&corners_a, &camera),
            bbox_from_projected_corners(&corners_b, &camera),
        ) {
            let area_a = bbox_a.width * bbox_a.height;
            let area_b = bbox_b.width * bbox_b.height;
            prop_assert!((area_a - area_b).abs() < 1e-6);
            // A 180 deg rotation of a square footprint about its own center
            // reprojects to the same AABB, so any observed bbox scores the same.
            prop_assert!(bbox_fit_error(&bbox_a, &bbox_b) < 1e-6);
        }
    }

    #[test]
    fn prop9_angle_lerp_takes_the_short_arc(alpha in 0f64..=1.0) {
        let delta = angle_delta_deg(170.0, -170.0);
        prop_assert!((delta - 20.0).abs() < 1e-9);
        let result = normalize_angle_deg(170.0 + delta * alpha);
        // At alpha=0.5 this should land on the 180 seam, not swing back through 0.
        if (alpha - 0.5).abs() < 1e-9 {
            prop_assert!((result.abs() - 180.0).abs() < 1e-6);
        }
    }
}

#[test]
fn prop7_smoothing_is_idempotent_at_alpha_one() {
    let camera = json!({
        "planPositionM": [0.0, 0.0], "heightM": 3.0, "pitchDeg": -30.0, "fovDeg": 65.0, "aspectRatio": 16.0 / 9.0,
    });
    let object = json!({"sizeM": {"width": 0.6, "depth": 0.6, "height": 1.0}});
    let config = json!({"smoothCenterAlpha": 1.0, "smoothYawAlpha": 1.0});
    let frames = json!([
        {"x": 0.3, "y": 0.5, "width": 0.1, "height": 0.15},
        {"x": 0.5, "y": 0.6, "width": 0.15, "height": 0.2},
        {"x": 0.6, "y": 0.55, "width": 0.1, "height": 0.1},
    ]);

    let report = lift_sequence(&camera, &object, &config, &frames).unwrap();
    for frame in &report.frames {
        assert_eq!(frame.smoothed_pose.base_center_world, frame.raw.base_center_world);
        assert_eq!(frame.smoothed_pose.yaw_deg, frame.raw.yaw_deg);
    }
}

#[test]
fn prop8_smoothing_fixed_point_when_raw_matches_previous_smoothed() {
    let camera = json!({
        "planPositionM": [0.0, 0.0], "heightM": 3.0, "pitchDeg": -30.0, "fovDeg": 65.0, "aspectRatio": 16.0 / 9.0,
    });
    let object = json!({"sizeM": {"width": 0.6, "depth": 0.6, "height": 1.0}});
    let detection = json!({"x": 0.4, "y": 0.5, "width": 0.1, "height": 0.15});

    for alpha in [0.0, 0.25, 0.5, 0.75, 1.0] {
        let config = json!({"smoothCenterAlpha": alpha, "smoothYawAlpha": alpha});
        let frames = json!([detection.clone(), detection.clone(), detection.clone()]);
        let report = lift_sequence(&camera, &object, &config, &frames).unwrap();
        for frame in &report.frames {
            assert_abs_diff_eq!(
                frame.smoothed_pose.base_center_world[0],
                frame.raw.base_center_world[0],
                epsilon = 1e-9
            );
            assert_abs_diff_eq!(
                frame.smoothed_pose.base_center_world[2],
                frame.raw.base_center_world[2],
                epsilon = 1e-9
            );
        }
    }
}

#[test]
fn lift_single_is_a_pure_function_of_its_inputs() {
    let camera = json!({
        "planPositionM": [1.0, -2.0], "heightM": 2.7, "yawDeg": 15.0, "pitchDeg": -35.0, "fovDeg": 65.0, "aspectRatio": 16.0 / 9.0,
    });
    let detection = json!({"x": 0.4, "y": 0.5, "width": 0.2, "height": 0.2});
    let object = json!({"sizeM": {"width": 0.6, "depth": 0.6, "height": 1.0}});

    let a = lift_single(&camera, &detection, &object, &json!({})).unwrap();
    let b = lift_single(&camera, &detection, &object, &json!({})).unwrap();
    assert_eq!(a.result.anchor_world, b.result.anchor_world);
    assert_eq!(a.result.yaw_deg, b.result.yaw_deg);
}
