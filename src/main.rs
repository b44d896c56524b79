use gravsim::{bench_kernels, bench_step_curve};
use gravsim::{Body, Command, Frontend, QuadTree, RunState, Simulation, SimulationConfig};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
struct Args {
    /// Optional YAML configuration file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of frames to run before exiting
    #[arg(long, default_value_t = 100)]
    frames: u64,

    /// Run the kernel benchmark sweeps instead of the simulation
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_config(path: Option<&Path>) -> Result<SimulationConfig> {
    match path {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("opening config {}", path.display()))?;
            let reader = BufReader::new(file);
            let config = serde_yaml::from_reader(reader)
                .with_context(|| format!("parsing config {}", path.display()))?;
            Ok(config)
        }
        None => Ok(SimulationConfig::default()),
    }
}

/// Frontend with no windowing layer attached: starts the simulation, lets
/// it run for a fixed number of frames, then asks it to exit.
struct HeadlessFrontend {
    frames_left: u64,
    started: bool,
    exit_sent: bool,
}

impl HeadlessFrontend {
    fn new(frames: u64) -> Self {
        Self {
            frames_left: frames,
            started: false,
            exit_sent: false,
        }
    }
}

impl Frontend for HeadlessFrontend {
    fn poll(&mut self) -> Option<Command> {
        if !self.started {
            self.started = true;
            return Some(Command::SetRunState(RunState::Running));
        }
        if self.frames_left == 0 && !self.exit_sent {
            self.exit_sent = true;
            return Some(Command::SetRunState(RunState::Exiting));
        }
        None
    }

    fn render(&mut self, _bodies: &[Body], _quad_tree: Option<&QuadTree>) {
        self.frames_left = self.frames_left.saturating_sub(1);
    }

    fn update_title(&mut self, n_particles: usize, fps: u32) {
        info!("{} bodies, {} fps", n_particles, fps);
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.bench {
        bench_kernels();
        bench_step_curve();
        return Ok(());
    }

    let config = load_config(args.config.as_deref())?;
    let mut sim = Simulation::from_config(&config);

    let mut frontend = HeadlessFrontend::new(args.frames);
    sim.run(&mut frontend);

    Ok(())
}
