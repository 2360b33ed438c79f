//! 2D affine transform algebra.
//!
//! `Transform` is the matrix value type; `Transformable` is the
//! position/rotation/scale/origin state that lazily derives one.

mod matrix;
mod transformable;

pub use matrix::Transform;
pub use transformable::Transformable;

const LARGE_ANGLE: f32 = 1.0e6;

/// Folds `angle` (degrees) into `[0, 360)` by repeated add/subtract.
///
/// Shared by `Transformable` and `View`. Boundary inputs land where the step
/// arithmetic puts them: `360.0` becomes `0.0`, `-0.0001` becomes
/// `-0.0001 + 360.0`.
///
/// Non-finite input is returned unchanged, and magnitudes large enough that
/// a 360 step no longer changes the value are pre-reduced with `rem_euclid`.
pub(crate) fn normalize_degrees(angle: f32) -> f32 {
    if !angle.is_finite() {
        return angle;
    }
    let mut a = if angle.abs() > LARGE_ANGLE {
        angle.rem_euclid(360.0)
    } else {
        angle
    };
    while a >= 360.0 {
        a -= 360.0;
    }
    while a < 0.0 {
        a += 360.0;
    }
    a
}
