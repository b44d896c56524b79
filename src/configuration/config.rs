//! Configuration types for loading a simulation setup from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation run:
//!
//! - [`EngineConfig`]       – kernel selection
//! - [`ParametersConfig`]   – numerical parameters and physical constants
//! - [`DistributionConfig`] – scenario and initial-condition choices
//! - [`SimulationConfig`]   – top-level wrapper used to load a run from YAML
//!
//! Every field carries a default, so a partial file (or no file at all)
//! yields the stock setup: 10000 bodies, one cluster, rotating disk,
//! threaded brute force.
//!
//! # YAML format
//!
//! ```yaml
//! engine:
//!   kernel: "barnes-hut-threads"
//!
//! parameters:
//!   delta_t: 1.0e-6          # step size, negative runs backwards
//!   theta: 0.5               # Barnes-Hut opening threshold
//!   g: 1.0                   # gravitational constant
//!   max_speed: 250.0         # generator speed scale
//!   eps_lo: 1.0e-4           # floor on pair distance squared
//!   eps_hi: 1.0e4            # cap on inverse distance squared
//!   seed: 42                 # optional, omit for an entropy seed
//!
//! distribution:
//!   n_particles: 10000
//!   scenario: "one-cluster"  # or "two-clusters", "cluster-and-black-hole"
//!   positions: "uniform-disk" # or "uniform-square", "galaxy"
//!   velocities: "rotating"   # or "random", "galaxy"
//!   add_central_body: true
//! ```

use serde::Deserialize;

use crate::simulation::distribution::{
    PositionDistribution, SimulationScenario, VelocityDistribution,
};
use crate::simulation::forces::Kernel;
use crate::simulation::params::Parameters;

/// Which acceleration kernel the driver starts with.
#[derive(Deserialize, Debug, Clone, Copy)]
pub enum KernelConfig {
    #[serde(rename = "brute-force")] // exact all-pairs, single thread
    BruteForce,

    #[serde(rename = "brute-force-threads")] // chunked across scoped threads
    BruteForceThreads,

    #[serde(rename = "brute-force-tasks")] // chunked onto the rayon pool
    BruteForceTasks,

    #[serde(rename = "barnes-hut")] // quadtree approximation, single thread
    BarnesHut,

    #[serde(rename = "barnes-hut-threads")] // quadtree approximation, chunked queries
    BarnesHutThreads,
}

impl From<KernelConfig> for Kernel {
    fn from(cfg: KernelConfig) -> Self {
        match cfg {
            KernelConfig::BruteForce => Kernel::BruteForce,
            KernelConfig::BruteForceThreads => Kernel::BruteForceThreads,
            KernelConfig::BruteForceTasks => Kernel::BruteForceTasks,
            KernelConfig::BarnesHut => Kernel::BarnesHut,
            KernelConfig::BarnesHutThreads => Kernel::BarnesHutThreads,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy)]
pub enum ScenarioConfig {
    #[serde(rename = "one-cluster")]
    OneCluster,

    #[serde(rename = "two-clusters")]
    TwoClusters,

    #[serde(rename = "cluster-and-black-hole")]
    ClusterAndBlackHole,
}

impl From<ScenarioConfig> for SimulationScenario {
    fn from(cfg: ScenarioConfig) -> Self {
        match cfg {
            ScenarioConfig::OneCluster => SimulationScenario::OneCluster,
            ScenarioConfig::TwoClusters => SimulationScenario::TwoClusters,
            ScenarioConfig::ClusterAndBlackHole => SimulationScenario::ClusterAndBlackHole,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy)]
pub enum PositionConfig {
    #[serde(rename = "uniform-disk")]
    UniformDisk,

    #[serde(rename = "uniform-square")]
    UniformSquare,

    #[serde(rename = "galaxy")]
    Galaxy,
}

impl From<PositionConfig> for PositionDistribution {
    fn from(cfg: PositionConfig) -> Self {
        match cfg {
            PositionConfig::UniformDisk => PositionDistribution::UniformDisk,
            PositionConfig::UniformSquare => PositionDistribution::UniformSquare,
            PositionConfig::Galaxy => PositionDistribution::Galaxy,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy)]
pub enum VelocityConfig {
    #[serde(rename = "random")]
    Random,

    #[serde(rename = "rotating")]
    Rotating,

    #[serde(rename = "galaxy")]
    Galaxy,
}

impl From<VelocityConfig> for VelocityDistribution {
    fn from(cfg: VelocityConfig) -> Self {
        match cfg {
            VelocityConfig::Random => VelocityDistribution::Random,
            VelocityConfig::Rotating => VelocityDistribution::Rotating,
            VelocityConfig::Galaxy => VelocityDistribution::Galaxy,
        }
    }
}

/// Engine-level configuration.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EngineConfig {
    pub kernel: KernelConfig, // initial acceleration kernel
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kernel: KernelConfig::BruteForceThreads,
        }
    }
}

/// Global numerical and physical parameters.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ParametersConfig {
    pub delta_t: f64,      // step size
    pub theta: f64,        // Barnes-Hut opening threshold, clamped to [0, 1]
    pub g: f64,            // gravitational constant
    pub max_speed: f64,    // generator speed scale
    pub eps_lo: f64,       // floor on pair distance squared
    pub eps_hi: f64,       // cap on inverse distance squared
    pub seed: Option<u64>, // generator seed, entropy-seeded when omitted
}

impl Default for ParametersConfig {
    fn default() -> Self {
        let p = Parameters::default();
        Self {
            delta_t: p.delta_t,
            theta: p.theta,
            g: p.g,
            max_speed: p.max_speed,
            eps_lo: p.eps_lo,
            eps_hi: p.eps_hi,
            seed: p.seed,
        }
    }
}

impl ParametersConfig {
    pub fn to_runtime(&self) -> Parameters {
        Parameters {
            delta_t: self.delta_t,
            theta: self.theta,
            g: self.g,
            max_speed: self.max_speed,
            eps_lo: self.eps_lo,
            eps_hi: self.eps_hi,
            seed: self.seed,
        }
    }
}

/// Scenario and initial-condition choices for the generator.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct DistributionConfig {
    pub n_particles: usize,          // total body count, central bodies included
    pub scenario: ScenarioConfig,    // overall arrangement
    pub positions: PositionConfig,   // position distribution
    pub velocities: VelocityConfig,  // velocity distribution
    pub add_central_body: bool,      // prepend a heavy body at the origin
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            n_particles: 10_000,
            scenario: ScenarioConfig::OneCluster,
            positions: PositionConfig::UniformDisk,
            velocities: VelocityConfig::Rotating,
            add_central_body: true,
        }
    }
}

/// Top-level configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct SimulationConfig {
    pub engine: EngineConfig,             // kernel selection
    pub parameters: ParametersConfig,     // numerical parameters
    pub distribution: DistributionConfig, // generator choices
}
