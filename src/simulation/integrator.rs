//! Velocity-Verlet integration phases
//!
//! The driver runs one step as: `advance_positions` with the stored
//! accelerations, one kernel evaluation into a fresh buffer, then
//! `advance_velocities` with the average of old and new accelerations.
//! The split keeps the force evaluation in the caller's hands, so any of
//! the kernels can sit between the two phases.

use super::states::{NVec2, System};

/// Position half of the step: x += v dt + a dt^2 / 2, using the previous
/// step's acceleration stored on each body.
pub fn advance_positions(sys: &mut System, delta_t: f64) {
    let half_dt_sq = 0.5 * delta_t * delta_t;

    for b in sys.bodies.iter_mut() {
        let (v, a) = (b.v, b.a);
        b.x += v * delta_t + a * half_dt_sq;
    }
}

/// Velocity half of the step: v += (a_old + a_new) dt / 2, then the new
/// accelerations replace the stored ones for the next step.
pub fn advance_velocities(sys: &mut System, accelerations: &[NVec2], delta_t: f64) {
    let half_dt = 0.5 * delta_t;

    for (b, a_new) in sys.bodies.iter_mut().zip(accelerations.iter()) {
        b.v += half_dt * (b.a + a_new);
        b.a = *a_new;
    }
}
