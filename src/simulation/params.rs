//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - integration step size (may be negative for time reversal),
//! - Barnes-Hut opening threshold `theta`,
//! - softening clamps (`eps_lo`, `eps_hi`) and gravitational constant `g`,
//! - generator speed scale and random seed

#[derive(Debug, Clone)]
pub struct Parameters {
    pub delta_t: f64, // step size, negative runs time backwards
    pub theta: f64, // Barnes-Hut opening threshold, in [0, 1]
    pub g: f64, // gravitational constant
    pub max_speed: f64, // speed scale handed to the generator
    pub eps_lo: f64, // floor on pair distance squared in the brute-force kernels
    pub eps_hi: f64, // cap on inverse distance squared in tree queries
    pub seed: Option<u64>, // explicit generator seed, entropy-seeded when absent
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            delta_t: 1e-6,
            theta: 0.5,
            g: 1.0,
            max_speed: 250.0,
            eps_lo: 1e-4,
            eps_hi: 1e4,
            seed: None,
        }
    }
}
