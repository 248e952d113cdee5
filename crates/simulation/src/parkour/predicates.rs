// Copyright © 2026
// Author: Antonio Caggiano <info@antoniocaggiano.eu>
// SPDX-License-Identifier: MIT

//! Pure eligibility checks and vector helpers used by the abilities.

use bevy::prelude::*;
use corsa_model::ParkourMode;

use super::mode::WallSide;

pub fn can_wall_run(forward_input: f32, mode: ParkourMode) -> bool {
    forward_input > 0.0 && (mode == ParkourMode::None || mode.is_wall_running())
}

/// A wall can be run on when it is steep enough and the character is in the air.
pub fn is_runnable_wall(normal: Vec3, max_normal_vertical: f32, falling: bool) -> bool {
    falling && normal.y < max_normal_vertical && normal.y > -max_normal_vertical
}

pub fn can_vertical_wall_run(forward_input: f32, mode: ParkourMode, falling: bool) -> bool {
    forward_input > 0.0
        && falling
        && (matches!(mode, ParkourMode::None | ParkourMode::VerticalWallRun)
            || mode.is_wall_running())
}

pub fn is_climbable_face(normal: Vec3, min_normal_vertical: f32) -> bool {
    normal.y >= min_normal_vertical
}

pub fn can_mantle(forward_input: f32, mode: ParkourMode, quick: bool) -> bool {
    forward_input > 0.0 && (mode == ParkourMode::LedgeGrab || quick)
}

pub fn can_slide(forward_input: f32, mode: ParkourMode, sprint_queued: bool) -> bool {
    forward_input > 0.0
        && (matches!(mode, ParkourMode::Sprint | ParkourMode::Slide) || sprint_queued)
}

pub fn can_sprint(walking: bool, mode: ParkourMode) -> bool {
    walking && mode == ParkourMode::None
}

/// Running direction along a wall.
pub fn wall_run_direction(normal: Vec3, side: WallSide) -> Vec3 {
    normal.cross(Vec3::Y) * side.sign()
}

/// Direction down the surface under a slide, perpendicular to the character's right.
pub fn slide_vector(impact_normal: Vec3, right: Vec3) -> Vec3 {
    impact_normal.cross(right)
}

/// Slides only get pushed on flat or descending surfaces.
pub fn should_push_slide(vector: Vec3, max_rise: f32) -> bool {
    vector.y <= max_rise
}

/// Normal of the plane spanned by the velocity direction and up.
pub fn slide_plane_normal(velocity: Vec3, up: Vec3) -> Option<Vec3> {
    velocity.normalize_or_zero().cross(up).try_normalize()
}

pub fn mantle_finished(distance: f32, finish_distance: f32) -> bool {
    distance <= finish_distance
}

/// Fraction of the remaining distance covered in `delta` seconds at `speed`.
pub fn interp_alpha(delta: f32, speed: f32) -> f32 {
    if speed <= 0.0 {
        1.0
    } else {
        (delta * speed).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_run_needs_forward_input_and_a_compatible_mode() {
        assert!(can_wall_run(1.0, ParkourMode::None));
        assert!(can_wall_run(0.5, ParkourMode::LeftWallRun));
        assert!(!can_wall_run(0.0, ParkourMode::None));
        assert!(!can_wall_run(1.0, ParkourMode::Sprint));
    }

    #[test]
    fn runnable_walls_are_steep_and_airborne() {
        let steep = Vec3::new(0.98, 0.17, 0.0).normalize();
        assert!(is_runnable_wall(steep, 0.52, true));
        assert!(!is_runnable_wall(steep, 0.52, false));
        assert!(!is_runnable_wall(Vec3::new(0.8, 0.6, 0.0), 0.52, true));
        assert!(!is_runnable_wall(Vec3::new(0.8, -0.6, 0.0), 0.52, true));
        assert!(!is_runnable_wall(Vec3::new(0.0, 0.52, 0.85), 0.52, true));
    }

    #[test]
    fn wall_run_direction_follows_the_wall() {
        // Facing +Z with a wall on the right at -X.
        let normal = Vec3::X;
        assert_eq!(wall_run_direction(normal, WallSide::Right), Vec3::Z);
        assert_eq!(wall_run_direction(-normal, WallSide::Left), Vec3::Z);
    }

    #[test]
    fn slide_vector_points_down_the_slope() {
        let right = Vec3::NEG_X;
        assert!(slide_vector(Vec3::Y, right).distance(Vec3::Z) < 1e-6);

        let downhill = Vec3::new(0.0, 0.94, 0.34).normalize();
        let vector = slide_vector(downhill, right);
        assert!(vector.y < 0.0 && vector.z > 0.0);
        assert!(should_push_slide(vector, 0.02));

        let uphill = Vec3::new(0.0, 0.94, -0.34).normalize();
        assert!(!should_push_slide(slide_vector(uphill, right), 0.02));
    }

    #[test]
    fn slide_impulse_threshold_is_inclusive() {
        assert!(should_push_slide(Vec3::new(0.0, 0.02, 1.0), 0.02));
        assert!(!should_push_slide(Vec3::new(0.0, 0.021, 1.0), 0.02));
    }

    #[test]
    fn gentle_rise_still_gets_a_push() {
        let right = Vec3::NEG_X;
        let surface = |rise: f32| Vec3::new(0.0, (1.0 - rise * rise).sqrt(), -rise);

        let below = slide_vector(surface(0.019), right);
        assert!((below.y - 0.019).abs() < 1e-6);
        assert!(should_push_slide(below, 0.02));

        let above = slide_vector(surface(0.021), right);
        assert!((above.y - 0.021).abs() < 1e-6);
        assert!(!should_push_slide(above, 0.02));
    }

    #[test]
    fn slide_needs_a_sprint_or_a_queued_one() {
        assert!(can_slide(1.0, ParkourMode::Sprint, false));
        assert!(can_slide(1.0, ParkourMode::Slide, false));
        assert!(can_slide(1.0, ParkourMode::None, true));
        assert!(!can_slide(1.0, ParkourMode::None, false));
        assert!(!can_slide(0.0, ParkourMode::Sprint, false));
    }

    #[test]
    fn sprint_only_from_none_while_walking() {
        assert!(can_sprint(true, ParkourMode::None));
        assert!(!can_sprint(true, ParkourMode::Crouch));
        assert!(!can_sprint(false, ParkourMode::None));
    }

    #[test]
    fn mantle_finishes_at_eight_units() {
        assert!(mantle_finished(8.0, 8.0));
        assert!(!mantle_finished(8.01, 8.0));
    }

    #[test]
    fn slide_plane_contains_velocity_and_up() {
        let normal = slide_plane_normal(Vec3::new(0.0, 0.0, 5.0), Vec3::Y).unwrap();
        assert!(normal.dot(Vec3::Z).abs() < 1e-6);
        assert!(normal.dot(Vec3::Y).abs() < 1e-6);
        assert!(slide_plane_normal(Vec3::ZERO, Vec3::Y).is_none());
    }

    #[test]
    fn interpolation_alpha_is_clamped() {
        assert_eq!(interp_alpha(0.1, 20.0), 1.0);
        assert!((interp_alpha(0.01, 10.0) - 0.1).abs() < 1e-6);
        assert_eq!(interp_alpha(0.1, 0.0), 1.0);
    }
}
