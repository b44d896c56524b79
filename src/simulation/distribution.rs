//! Initial-condition generator
//!
//! Synthesizes a fresh body set for a chosen scenario, position
//! distribution, and velocity distribution. The generator owns its PRNG,
//! seeded once at construction; nothing else in the simulation touches
//! random state.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Cauchy, Distribution, Uniform};

use crate::simulation::states::{Body, NVec2};

const CENTRAL_BODY_MASS: f64 = 1000.0;
const BLACK_HOLE_MASS: f64 = 2000.0;
const CLUSTER_RADIUS: f64 = 0.25;
const GALAXY_GAMMA: f64 = 0.25; // scale of the half-Cauchy radial profile

/// Which overall arrangement of bodies to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationScenario {
    OneCluster,
    TwoClusters,
    ClusterAndBlackHole,
}

/// How positions are laid out inside the unit square centered at origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionDistribution {
    UniformDisk,
    UniformSquare,
    Galaxy,
}

/// How initial velocities are assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VelocityDistribution {
    Random,
    Rotating,
    Galaxy,
}

/// Generator for initial body distributions. Holds the random engine and
/// the two sampling distributions it draws from.
pub struct ParticleDistribution {
    rng: StdRng,
    uniform: Uniform<f64>,
    cauchy: Cauchy<f64>,
}

impl ParticleDistribution {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            rng,
            uniform: Uniform::new(0.0, 1.0),
            cauchy: Cauchy::new(0.0, GALAXY_GAMMA).expect("positive Cauchy scale"),
        }
    }

    /// Produce the body set for a scenario. `n_particles` counts every body
    /// in the result, central bodies and black holes included.
    pub fn create_distribution(
        &mut self,
        scenario: SimulationScenario,
        pos_dist: PositionDistribution,
        vel_dist: VelocityDistribution,
        n_particles: usize,
        max_speed: f64,
        g: f64,
        add_central_body: bool,
    ) -> Vec<Body> {
        let mut particles = Vec::with_capacity(n_particles);

        match scenario {
            SimulationScenario::ClusterAndBlackHole => {
                let cluster_n = n_particles.saturating_sub(1);
                let cluster = self.create_cluster(
                    NVec2::new(-0.3, -0.3),
                    NVec2::new(0.3 * max_speed, 0.2 * max_speed),
                    CLUSTER_RADIUS,
                    pos_dist,
                    vel_dist,
                    cluster_n,
                    max_speed,
                    g,
                    add_central_body,
                );
                particles.extend(cluster);

                particles.push(Body::new(
                    NVec2::new(0.3, 0.3),
                    NVec2::new(-0.3 * max_speed, -0.2 * max_speed),
                    BLACK_HOLE_MASS,
                ));
            }
            SimulationScenario::TwoClusters => {
                let first_n = n_particles / 2;
                let first = self.create_cluster(
                    NVec2::new(-0.3, -0.3),
                    NVec2::new(0.3 * max_speed, 0.2 * max_speed),
                    CLUSTER_RADIUS,
                    pos_dist,
                    vel_dist,
                    first_n,
                    max_speed,
                    g,
                    add_central_body,
                );

                let second_n = n_particles - first_n;
                let second = self.create_cluster(
                    NVec2::new(0.3, 0.3),
                    NVec2::new(-0.3 * max_speed, -0.2 * max_speed),
                    CLUSTER_RADIUS,
                    pos_dist,
                    vel_dist,
                    second_n,
                    max_speed,
                    g,
                    add_central_body,
                );

                particles.extend(first);
                particles.extend(second);
            }
            SimulationScenario::OneCluster => {
                self.create_position_distribution(
                    pos_dist,
                    &mut particles,
                    n_particles,
                    add_central_body,
                );
                self.create_velocity_distribution(vel_dist, &mut particles, max_speed, g);
            }
        }

        particles
    }

    /// Fill `particles` up to `n_particles` bodies with unit mass and zero
    /// velocity, positions drawn from the requested distribution inside the
    /// unit square centered at origin.
    fn create_position_distribution(
        &mut self,
        pos_dist: PositionDistribution,
        particles: &mut Vec<Body>,
        n_particles: usize,
        add_central_body: bool,
    ) {
        let mut particle_index = 0;
        if add_central_body && n_particles > 0 {
            particles.push(Body::new(NVec2::zeros(), NVec2::zeros(), CENTRAL_BODY_MASS));
            particle_index += 1;
        }

        while particle_index < n_particles {
            let pos = match pos_dist {
                PositionDistribution::Galaxy => self.random_vec_galaxy(),
                PositionDistribution::UniformSquare => {
                    self.random_vec_uniform() - NVec2::new(0.5, 0.5)
                }
                PositionDistribution::UniformDisk => loop {
                    let candidate = self.random_vec_uniform() - NVec2::new(0.5, 0.5);
                    if candidate.norm() < 0.5 {
                        break candidate;
                    }
                },
            };

            particles.push(Body::new(pos, NVec2::zeros(), 1.0));
            particle_index += 1;
        }
    }

    /// Assign velocities to an already positioned body set.
    fn create_velocity_distribution(
        &mut self,
        vel_dist: VelocityDistribution,
        particles: &mut [Body],
        max_speed: f64,
        g: f64,
    ) {
        // The Keplerian profile needs the bodies ordered by distance from
        // the center, with a running sum of the mass enclosed by each orbit.
        let mut enclosed_mass = Vec::new();
        if vel_dist == VelocityDistribution::Galaxy {
            particles.sort_by(|a, b| a.x.norm_squared().total_cmp(&b.x.norm_squared()));

            enclosed_mass.reserve(particles.len());
            let mut running = 0.0;
            for part in particles.iter() {
                // Inclusive sum: a body's own mass counts toward its shell,
                // an overcount of O(1/N).
                running += part.m;
                enclosed_mass.push(running);
            }
        }

        for (index, part) in particles.iter_mut().enumerate() {
            match vel_dist {
                VelocityDistribution::Random => {
                    let direction =
                        (self.random_vec_uniform() - NVec2::new(0.5, 0.5)).normalize();
                    let speed = max_speed * self.uniform.sample(&mut self.rng);
                    part.v = speed * direction;
                }
                VelocityDistribution::Galaxy => {
                    // Orbital speed from the mass inside the body's shell,
                    // the 2D analogue of the shell theorem.
                    let dist = part.x.norm();
                    if dist <= 1e-5 {
                        part.v = NVec2::zeros();
                        continue;
                    }

                    let mut speed = (g * enclosed_mass[index] / dist).sqrt();
                    // Damp the speed near the center to keep the core bound.
                    speed *= dist / (dist + 0.005);

                    let direction = NVec2::new(part.x.y, -part.x.x).normalize();
                    part.v = speed * direction;
                }
                VelocityDistribution::Rotating => {
                    part.v = NVec2::new(
                        2.0 * max_speed * part.x.y,
                        -2.0 * max_speed * part.x.x,
                    );
                }
            }
        }
    }

    /// Generate a cluster of `n_particles` under unit-radius conventions,
    /// then scale it to `radius`, move it to `center`, and give every body
    /// the bulk `velocity` on top of its own.
    fn create_cluster(
        &mut self,
        center: NVec2,
        velocity: NVec2,
        radius: f64,
        pos_dist: PositionDistribution,
        vel_dist: VelocityDistribution,
        n_particles: usize,
        max_speed: f64,
        g: f64,
        add_central_body: bool,
    ) -> Vec<Body> {
        let mut particles = Vec::with_capacity(n_particles);
        self.create_position_distribution(pos_dist, &mut particles, n_particles, add_central_body);
        self.create_velocity_distribution(vel_dist, &mut particles, max_speed, g);

        for part in particles.iter_mut() {
            part.x = part.x * (2.0 * radius) + center;
            part.v += velocity;
        }

        particles
    }

    /// Uniform sample of the unit square [0, 1) x [0, 1).
    fn random_vec_uniform(&mut self) -> NVec2 {
        let x = self.uniform.sample(&mut self.rng);
        let y = self.uniform.sample(&mut self.rng);
        NVec2::new(x, y)
    }

    /// Galaxy profile: radius from a half-Cauchy truncated to [0, 1],
    /// angle uniform, scaled into the half-unit disk.
    fn random_vec_galaxy(&mut self) -> NVec2 {
        loop {
            let ur = self.cauchy.sample(&mut self.rng);
            if ur.abs() > 1.0 {
                continue;
            }
            let angle = 2.0 * PI * self.uniform.sample(&mut self.rng);
            return 0.5 * NVec2::new(ur * angle.cos(), ur * angle.sin());
        }
    }
}
