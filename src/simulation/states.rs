//! Core state types for the N-body simulation.
//!
//! Defines the 2D vector alias `NVec2` used everywhere by value, the
//! `Body` struct and the `System` holding the body collection, plus the
//! driver's `RunState`.

use nalgebra::Vector2;
pub type NVec2 = Vector2<f64>;

/// Distance between two points.
pub fn distance(a: &NVec2, b: &NVec2) -> f64 {
    (b - a).norm()
}

/// Squared distance between two points, avoids the square root.
pub fn distance_squared(a: &NVec2, b: &NVec2) -> f64 {
    (b - a).norm_squared()
}

#[derive(Debug, Clone)]
pub struct Body {
    pub x: NVec2, // position
    pub v: NVec2, // velocity
    pub a: NVec2, // acceleration of the previous step, kept for velocity-Verlet
    pub m: f64, // mass
}

impl Body {
    pub fn new(x: NVec2, v: NVec2, m: f64) -> Self {
        Self {
            x,
            v,
            a: NVec2::zeros(),
            m,
        }
    }
}

#[derive(Debug, Clone)]
pub struct System {
    pub bodies: Vec<Body>, // index in this collection is the body's identity within a frame
}

impl System {
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Sum of all body masses.
    pub fn total_mass(&self) -> f64 {
        self.bodies.iter().map(|b| b.m).sum()
    }
}

/// Run state of the simulation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Paused,
    Exiting,
}
