//! # Transform maths
//!
//! Rigid body transforms built as 4x4 homogeneous matrices. Localisation uses
//! these to step a position forward by a body frame displacement:
//!
//! ```text
//! | R(h, p, r)  point | | delta |
//! |     0         1   | |   1   |
//! ```
//!
//! where `R` is the intrinsic Z-Y-X rotation (heading, pitch, roll). The result
//! is the previous position offset by the displacement rotated into the world
//! frame, which is one iteration of odometry integration.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{Matrix4, Rotation3, Vector3, Vector4};

use eqpt_if::eqpt::odom::Attitude;

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Build the homogeneous transform with the given attitude as rotation and `point` as the
/// translation column.
pub fn build_transform(point: &Vector3<f64>, rotation: &Attitude) -> Matrix4<f64> {
    // nalgebra applies roll, then pitch, then yaw, i.e. R = Rz(h) * Ry(p) * Rx(r)
    let mut transform =
        Rotation3::from_euler_angles(rotation.roll, rotation.pitch, rotation.heading)
            .to_homogeneous();

    transform[(0, 3)] = point[0];
    transform[(1, 3)] = point[1];
    transform[(2, 3)] = point[2];

    transform
}

/// Apply `rotation` to `translation_delta` and then offset it by `point`.
///
/// Pure function, used iteratively by the trackers with `point` being the previous position.
pub fn compose_rotation_translation(
    point: &Vector3<f64>,
    translation_delta: &Vector3<f64>,
    rotation: &Attitude,
) -> Vector3<f64> {
    let transform = build_transform(point, rotation);

    let result = transform
        * Vector4::new(
            translation_delta[0],
            translation_delta[1],
            translation_delta[2],
            1.0,
        );

    Vector3::new(result[0], result[1], result[2])
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
