pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use simulation::states::{Body, NVec2, RunState, System};
pub use simulation::params::Parameters;
pub use simulation::forces::Kernel;
pub use simulation::quadtree::{Node, QuadTree, Quadrant, SquareArea};
pub use simulation::distribution::{
    ParticleDistribution, PositionDistribution, SimulationScenario, VelocityDistribution,
};
pub use simulation::driver::{Command, Frontend, Simulation};

pub use configuration::config::SimulationConfig;

pub use benchmark::benchmark::{bench_kernels, bench_step_curve};
