//! Kernel timing sweeps.
//!
//! Two entry points, both printing to stdout: `bench_kernels` compares a
//! single acceleration evaluation per kernel over a range of body counts,
//! `bench_step_curve` times full integration steps on a finer grid and
//! emits CSV for plotting.

use std::time::Instant;

use crate::simulation::driver::Simulation;
use crate::simulation::forces::{self, Kernel};
use crate::simulation::params::Parameters;
use crate::simulation::quadtree::{QuadTree, SquareArea};
use crate::simulation::states::{Body, NVec2, System};

/// Deterministic body set of size `n`, no rand needed.
fn make_system(n: usize) -> System {
    let mut bodies = Vec::with_capacity(n);

    for i in 0..n {
        let i_f = i as f64;
        let x = NVec2::new((i_f * 0.37).sin() * 5.0, (i_f * 0.13).cos() * 5.0);
        bodies.push(Body::new(x, NVec2::zeros(), 1.0));
    }

    System { bodies }
}

fn time_accelerations(sys: &System, params: &Parameters, kernel: Kernel) -> f64 {
    let n = sys.bodies.len();
    let mut out = vec![NVec2::zeros(); n];

    let run = |out: &mut Vec<NVec2>| {
        out.iter_mut().for_each(|a| *a = NVec2::zeros());
        match kernel {
            Kernel::BruteForce => forces::brute_force(sys, params, out),
            Kernel::BruteForceThreads => forces::brute_force_threads(sys, params, out),
            Kernel::BruteForceTasks => forces::brute_force_tasks(sys, params, out),
            Kernel::BarnesHut => {
                let tree = QuadTree::build(SquareArea::bounding(&sys.bodies), &sys.bodies);
                forces::barnes_hut(&tree, sys, params, out);
            }
            Kernel::BarnesHutThreads => {
                let tree = QuadTree::build(SquareArea::bounding(&sys.bodies), &sys.bodies);
                forces::barnes_hut_threads(&tree, sys, params, out);
            }
        }
    };

    // Warm up
    run(&mut out);

    let t0 = Instant::now();
    run(&mut out);
    t0.elapsed().as_secs_f64()
}

/// Compare one acceleration evaluation per kernel across system sizes.
pub fn bench_kernels() {
    let ns = [200, 400, 800, 1600, 3200, 6400];
    let params = Parameters::default();

    for n in ns {
        let sys = make_system(n);

        let brute = time_accelerations(&sys, &params, Kernel::BruteForce);
        let threads = time_accelerations(&sys, &params, Kernel::BruteForceThreads);
        let tasks = time_accelerations(&sys, &params, Kernel::BruteForceTasks);
        let bh = time_accelerations(&sys, &params, Kernel::BarnesHut);
        let bh_threads = time_accelerations(&sys, &params, Kernel::BarnesHutThreads);

        println!(
            "N = {n:5}, brute = {brute:8.6} s, threads = {threads:8.6} s, tasks = {tasks:8.6} s, \
             bh = {bh:8.6} s, bh-threads = {bh_threads:8.6} s"
        );
    }
}

/// Time full integration steps per kernel over a finer grid of N.
/// Paste the output directly into a spreadsheet to graph.
pub fn bench_step_curve() {
    println!("N,brute_ms,threads_ms,tasks_ms,bh_ms,bh_threads_ms");

    for n in (200..=6400).step_by(200) {
        // Small n: average over a few steps to smooth noise.
        let steps = if n <= 800 { 5 } else { 1 };
        let template = make_system(n);

        let kernels = [
            Kernel::BruteForce,
            Kernel::BruteForceThreads,
            Kernel::BruteForceTasks,
            Kernel::BarnesHut,
            Kernel::BarnesHutThreads,
        ];

        let mut columns = Vec::with_capacity(kernels.len());
        for kernel in kernels {
            let mut sim = Simulation::with_bodies(template.bodies.clone(), Parameters::default());
            sim.set_kernel(kernel);

            // Warm up one step
            sim.step();

            let t0 = Instant::now();
            for _ in 0..steps {
                sim.step();
            }
            columns.push(t0.elapsed().as_secs_f64() * 1000.0 / steps as f64);
        }

        println!(
            "{},{:.6},{:.6},{:.6},{:.6},{:.6}",
            n, columns[0], columns[1], columns[2], columns[3], columns[4]
        );
    }
}
