//! Acceleration kernels for the n-body engine
//!
//! Five kernels compute the same quantity, the per-body gravitational
//! acceleration for one step, and differ only in algorithm and
//! parallelization strategy:
//!
//! - `brute_force`: exact all-pairs summation exploiting Newton's third law
//! - `brute_force_threads`: chunked across scoped OS threads
//! - `brute_force_tasks`: the same partitioning on the rayon pool
//! - `barnes_hut`: tree-approximated, serial traversal
//! - `barnes_hut_threads`: tree-approximated, chunked traversals
//!
//! The parallel variants write into disjoint contiguous chunks of the
//! shared acceleration buffer, so no synchronization is needed beyond the
//! join at the end. A panicking worker propagates through the scope join
//! and takes the simulation down, which is the intended fatal behavior.

use std::thread;

use rayon::prelude::*;

use crate::simulation::params::Parameters;
use crate::simulation::quadtree::QuadTree;
use crate::simulation::states::{distance_squared, Body, NVec2, System};

/// Selects the kernel used for the acceleration phase of each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kernel {
    BruteForce,
    BruteForceThreads,
    BruteForceTasks,
    BarnesHut,
    BarnesHutThreads,
}

impl Kernel {
    pub fn label(self) -> &'static str {
        match self {
            Kernel::BruteForce => "brute-force",
            Kernel::BruteForceThreads => "brute-force-threads",
            Kernel::BruteForceTasks => "brute-force-tasks",
            Kernel::BarnesHut => "barnes-hut",
            Kernel::BarnesHutThreads => "barnes-hut-threads",
        }
    }
}

/// Worker count for the parallel kernels: half of the hardware threads, the
/// other half is left for the render side.
pub fn worker_count() -> usize {
    let hardware = thread::available_parallelism().map(|n| n.get()).unwrap_or(2);
    (hardware / 2).max(1)
}

/// Exact all-pairs gravity over unordered pairs (i, j) with j > i. Each
/// pair is evaluated once and applied to both bodies with opposite sign.
pub fn brute_force(sys: &System, params: &Parameters, out: &mut [NVec2]) {
    let n = sys.bodies.len();

    for i in 0..n {
        let xi = sys.bodies[i].x;
        let mi = sys.bodies[i].m;

        for j in (i + 1)..n {
            let xj = sys.bodies[j].x;
            let mj = sys.bodies[j].m;

            let r = xj - xi;
            let mut dist_sq = distance_squared(&xi, &xj);
            if dist_sq < params.eps_lo {
                dist_sq = params.eps_lo;
            }

            // F = G m_i m_j / d^2 toward the other body; equal and opposite.
            let force = params.g * mi * mj / dist_sq * r.normalize();
            out[i] += force / mi;
            out[j] -= force / mj;
        }
    }
}

/// Accelerations for the bodies in `chunk_start..chunk_start + out.len()`,
/// each summed over all other bodies. No pair symmetry here: the symmetric
/// update would write into another worker's chunk.
fn accelerate_chunk(bodies: &[Body], params: &Parameters, chunk_start: usize, out: &mut [NVec2]) {
    for (k, slot) in out.iter_mut().enumerate() {
        let i = chunk_start + k;
        let xi = bodies[i].x;

        let mut acceleration = NVec2::zeros();

        for (j, other) in bodies.iter().enumerate() {
            if i == j {
                continue;
            }

            let r = other.x - xi;
            let mut dist_sq = distance_squared(&xi, &other.x);
            if dist_sq < params.eps_lo {
                dist_sq = params.eps_lo;
            }

            acceleration += params.g * other.m / dist_sq * r.normalize();
        }

        *slot += acceleration;
    }
}

/// All-pairs gravity fanned out over scoped OS threads, one contiguous
/// chunk of the acceleration buffer per worker.
pub fn brute_force_threads(sys: &System, params: &Parameters, out: &mut [NVec2]) {
    let n = sys.bodies.len();
    if n == 0 {
        return;
    }

    let chunk_size = n.div_ceil(worker_count());
    let bodies = sys.bodies.as_slice();

    thread::scope(|scope| {
        for (w, chunk) in out.chunks_mut(chunk_size).enumerate() {
            scope.spawn(move || accelerate_chunk(bodies, params, w * chunk_size, chunk));
        }
    });
}

/// Same partitioning and inner loop as `brute_force_threads`, but the
/// chunks run as tasks on the rayon pool. Kept alongside the thread-spawn
/// variant to compare spawn overhead against pool dispatch.
pub fn brute_force_tasks(sys: &System, params: &Parameters, out: &mut [NVec2]) {
    let n = sys.bodies.len();
    if n == 0 {
        return;
    }

    let chunk_size = n.div_ceil(worker_count());
    let bodies = sys.bodies.as_slice();

    out.par_chunks_mut(chunk_size)
        .enumerate()
        .for_each(|(w, chunk)| accelerate_chunk(bodies, params, w * chunk_size, chunk));
}

/// Barnes-Hut approximation: one tree traversal per body. The caller builds
/// the tree (with the center-of-mass rollup done) for the current frame.
pub fn barnes_hut(tree: &QuadTree, sys: &System, params: &Parameters, out: &mut [NVec2]) {
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = tree.acceleration(i, &sys.bodies, params.theta, params.g, params.eps_hi);
    }
}

/// Barnes-Hut with the per-body traversals chunked across scoped threads.
/// The tree is read-only during queries, so the workers share it freely.
pub fn barnes_hut_threads(
    tree: &QuadTree,
    sys: &System,
    params: &Parameters,
    out: &mut [NVec2],
) {
    let n = sys.bodies.len();
    if n == 0 {
        return;
    }

    let chunk_size = n.div_ceil(worker_count());
    let bodies = sys.bodies.as_slice();

    thread::scope(|scope| {
        for (w, chunk) in out.chunks_mut(chunk_size).enumerate() {
            scope.spawn(move || {
                for (k, slot) in chunk.iter_mut().enumerate() {
                    *slot += tree.acceleration(
                        w * chunk_size + k,
                        bodies,
                        params.theta,
                        params.g,
                        params.eps_hi,
                    );
                }
            });
        }
    });
}
