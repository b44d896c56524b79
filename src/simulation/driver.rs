//! Simulation driver
//!
//! Owns the body vector and all runtime parameters, advances the system by
//! one velocity-Verlet step per frame, selects the acceleration kernel, and
//! rebuilds the quadtree when a tree kernel (or the overlay) needs it.
//!
//! The driver is mutated from outside exclusively through [`Command`]s; the
//! windowing layer maps keystrokes to commands and consumes snapshots
//! through the [`Frontend`] trait. Commands are accepted in any order and
//! take effect at the next iteration of the frame loop.

use std::thread;
use std::time::{Duration, Instant};

use log::info;

use crate::configuration::config::SimulationConfig;
use crate::simulation::distribution::{
    ParticleDistribution, PositionDistribution, SimulationScenario, VelocityDistribution,
};
use crate::simulation::forces::{self, Kernel};
use crate::simulation::integrator;
use crate::simulation::params::Parameters;
use crate::simulation::quadtree::{QuadTree, SquareArea};
use crate::simulation::states::{Body, NVec2, RunState, System};

/// Discrete command stream from the input layer, one variant per mutator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetRunState(RunState),
    SetKernel(Kernel),
    SetScenario(SimulationScenario),
    IncreaseParticles,
    DecreaseParticles,
    SpeedUp,
    SlowDown,
    Reverse,
    IncreaseTheta,
    DecreaseTheta,
    ToggleQuadTree,
}

/// The seam toward the windowing layer. `poll` feeds commands in, `render`
/// takes the end-of-step body state (plus the tree when the overlay is on),
/// and `update_title` receives the once-per-second stats line.
pub trait Frontend {
    fn poll(&mut self) -> Option<Command>;
    fn render(&mut self, bodies: &[Body], quad_tree: Option<&QuadTree>);
    fn update_title(&mut self, n_particles: usize, fps: u32);
}

/// The simulation itself: body set, parameters, kernel and scenario
/// selection, and the frame loop.
pub struct Simulation {
    n_particles: usize,
    system: System,
    distribution: ParticleDistribution,
    scenario: SimulationScenario,
    pos_dist: PositionDistribution,
    vel_dist: VelocityDistribution,
    add_central_body: bool,
    kernel: Kernel,
    render_quad_tree: bool,
    frame_count: u64,
    state: RunState,
    area: SquareArea,
    parameters: Parameters,
}

impl Simulation {
    pub fn new(n_particles: usize) -> Self {
        Self::with_parameters(n_particles, Parameters::default())
    }

    pub fn with_parameters(n_particles: usize, mut parameters: Parameters) -> Self {
        parameters.theta = parameters.theta.clamp(0.0, 1.0);

        let mut sim = Self {
            n_particles: n_particles.max(1),
            system: System { bodies: Vec::new() },
            distribution: ParticleDistribution::new(parameters.seed),
            scenario: SimulationScenario::OneCluster,
            pos_dist: PositionDistribution::UniformDisk,
            vel_dist: VelocityDistribution::Rotating,
            add_central_body: true,
            kernel: Kernel::BruteForceThreads,
            render_quad_tree: false,
            frame_count: 0,
            state: RunState::Paused,
            area: SquareArea::new(NVec2::new(-1.0, -1.0), 2.0),
            parameters,
        };
        sim.regenerate();
        sim
    }

    /// Driver over a caller-supplied body set, for tests and benchmarks.
    pub fn with_bodies(bodies: Vec<Body>, mut parameters: Parameters) -> Self {
        parameters.theta = parameters.theta.clamp(0.0, 1.0);

        Self {
            n_particles: bodies.len().max(1),
            system: System { bodies },
            distribution: ParticleDistribution::new(parameters.seed),
            scenario: SimulationScenario::OneCluster,
            pos_dist: PositionDistribution::UniformDisk,
            vel_dist: VelocityDistribution::Rotating,
            add_central_body: false,
            kernel: Kernel::BruteForce,
            render_quad_tree: false,
            frame_count: 0,
            state: RunState::Paused,
            area: SquareArea::new(NVec2::new(-1.0, -1.0), 2.0),
            parameters,
        }
    }

    /// Build a fully configured driver from a loaded configuration.
    pub fn from_config(config: &SimulationConfig) -> Self {
        let mut parameters = config.parameters.to_runtime();
        parameters.theta = parameters.theta.clamp(0.0, 1.0);

        let mut sim = Self {
            n_particles: config.distribution.n_particles.max(1),
            system: System { bodies: Vec::new() },
            distribution: ParticleDistribution::new(parameters.seed),
            scenario: config.distribution.scenario.into(),
            pos_dist: config.distribution.positions.into(),
            vel_dist: config.distribution.velocities.into(),
            add_central_body: config.distribution.add_central_body,
            kernel: config.engine.kernel.into(),
            render_quad_tree: false,
            frame_count: 0,
            state: RunState::Paused,
            area: SquareArea::new(NVec2::new(-1.0, -1.0), 2.0),
            parameters,
        };
        sim.regenerate();
        sim
    }

    // Accessors ============================================================

    pub fn system(&self) -> &System {
        &self.system
    }

    pub fn bodies(&self) -> &[Body] {
        &self.system.bodies
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn n_particles(&self) -> usize {
        self.n_particles
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn render_quad_tree(&self) -> bool {
        self.render_quad_tree
    }

    // Mutator surface ======================================================

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::SetRunState(state) => self.set_state(state),
            Command::SetKernel(kernel) => self.set_kernel(kernel),
            Command::SetScenario(scenario) => self.set_scenario(scenario),
            Command::IncreaseParticles => self.increase_particles_and_restart(),
            Command::DecreaseParticles => self.decrease_particles_and_restart(),
            Command::SpeedUp => self.speed_up(),
            Command::SlowDown => self.slow_down(),
            Command::Reverse => self.reverse(),
            Command::IncreaseTheta => self.increase_theta(),
            Command::DecreaseTheta => self.decrease_theta(),
            Command::ToggleQuadTree => self.toggle_render_quad_tree(),
        }
    }

    pub fn set_state(&mut self, state: RunState) {
        self.state = state;
    }

    pub fn set_kernel(&mut self, kernel: Kernel) {
        info!("switching to kernel {}", kernel.label());
        self.kernel = kernel;
    }

    /// Switch scenario and restart with freshly generated bodies.
    pub fn set_scenario(&mut self, scenario: SimulationScenario) {
        self.scenario = scenario;
        self.restart();
    }

    pub fn increase_particles_and_restart(&mut self) {
        self.n_particles += 1000;
        self.restart();
    }

    pub fn decrease_particles_and_restart(&mut self) {
        if self.n_particles > 1000 {
            self.n_particles -= 1000;
        }
        self.restart();
    }

    pub fn speed_up(&mut self) {
        self.parameters.delta_t *= 1.1;
    }

    pub fn slow_down(&mut self) {
        self.parameters.delta_t *= 0.9;
    }

    /// Flip the sign of the step so the simulation runs backwards.
    pub fn reverse(&mut self) {
        self.parameters.delta_t = -self.parameters.delta_t;
    }

    pub fn increase_theta(&mut self) {
        self.parameters.theta = (self.parameters.theta + 0.1).min(1.0);
    }

    pub fn decrease_theta(&mut self) {
        self.parameters.theta = (self.parameters.theta - 0.1).max(0.0);
    }

    pub fn toggle_render_quad_tree(&mut self) {
        self.render_quad_tree = !self.render_quad_tree;
    }

    // Frame loop ===========================================================

    /// Main loop: poll commands, advance or sleep, hand the frame to the
    /// frontend, refresh the title line once per second. Returns when an
    /// exit command arrives.
    pub fn run<F: Frontend>(&mut self, frontend: &mut F) {
        let mut title_timestamp = Instant::now();
        let mut frames_since_title = 0u32;

        while self.state != RunState::Exiting {
            while let Some(command) = frontend.poll() {
                self.apply(command);
            }

            if self.state == RunState::Running {
                self.step();
            } else if self.state == RunState::Paused {
                thread::sleep(Duration::from_millis(16));
            }

            if self.render_quad_tree {
                let quad_tree = self.create_quad_tree();
                frontend.render(&self.system.bodies, Some(&quad_tree));
            } else {
                frontend.render(&self.system.bodies, None);
            }

            self.frame_count += 1;
            frames_since_title += 1;

            if title_timestamp.elapsed() >= Duration::from_secs(1) {
                frontend.update_title(self.n_particles, frames_since_title);
                title_timestamp = Instant::now();
                frames_since_title = 0;
            }
        }

        info!("simulation loop exited after {} frames", self.frame_count);
    }

    /// One velocity-Verlet step: position update with the stored
    /// accelerations, kernel evaluation into a fresh buffer, velocity
    /// update with the average of old and new.
    pub fn step(&mut self) {
        let delta_t = self.parameters.delta_t;

        integrator::advance_positions(&mut self.system, delta_t);

        let mut accelerations = vec![NVec2::zeros(); self.system.len()];
        match self.kernel {
            Kernel::BruteForce => {
                forces::brute_force(&self.system, &self.parameters, &mut accelerations);
            }
            Kernel::BruteForceThreads => {
                forces::brute_force_threads(&self.system, &self.parameters, &mut accelerations);
            }
            Kernel::BruteForceTasks => {
                forces::brute_force_tasks(&self.system, &self.parameters, &mut accelerations);
            }
            Kernel::BarnesHut => {
                let tree = self.create_quad_tree();
                forces::barnes_hut(&tree, &self.system, &self.parameters, &mut accelerations);
            }
            Kernel::BarnesHutThreads => {
                let tree = self.create_quad_tree();
                forces::barnes_hut_threads(&tree, &self.system, &self.parameters, &mut accelerations);
            }
        }

        integrator::advance_velocities(&mut self.system, &accelerations, delta_t);
    }

    /// Build the quadtree for the current frame. The root region is
    /// refreshed from the body set's bounding square every 10 frames;
    /// bodies that drift outside between refreshes are dropped by the tree.
    pub fn create_quad_tree(&mut self) -> QuadTree {
        if self.frame_count % 10 == 0 {
            self.area = SquareArea::bounding(&self.system.bodies);
        }

        QuadTree::build(self.area, &self.system.bodies)
    }

    // Implementation =======================================================

    fn regenerate(&mut self) {
        let bodies = self.distribution.create_distribution(
            self.scenario,
            self.pos_dist,
            self.vel_dist,
            self.n_particles,
            self.parameters.max_speed,
            self.parameters.g,
            self.add_central_body,
        );

        self.system = System { bodies };
        self.frame_count = 0;
        self.render_quad_tree = false;
    }

    /// Regenerate the body set and resume running.
    fn restart(&mut self) {
        self.regenerate();
        self.state = RunState::Running;
    }
}
