// selene_core/src/utils.rs

use std::f64::consts::TAU;

/// Wraps an angle in radians into the range `[0, 2*pi)`.
///
/// The tracker itself never wraps its heading estimate; callers that want a
/// canonical range apply this at the read side.
pub fn wrap_to_two_pi(angle: f64) -> f64 {
    angle.rem_euclid(TAU)
}
