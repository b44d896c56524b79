use gravsim::simulation::forces;
use gravsim::{
    Body, Command, Kernel, NVec2, Node, Parameters, ParticleDistribution, PositionDistribution,
    QuadTree, RunState, Simulation, SimulationScenario, SquareArea, System, VelocityDistribution,
};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Build a simple 2-body system separated along the x-axis.
pub fn two_body_system(dist: f64, m1: f64, m2: f64) -> System {
    let b1 = Body::new(NVec2::new(-dist / 2.0, 0.0), NVec2::zeros(), m1);
    let b2 = Body::new(NVec2::new(dist / 2.0, 0.0), NVec2::zeros(), m2);
    System {
        bodies: vec![b1, b2],
    }
}

/// Default physics parameters for tests.
pub fn test_params() -> Parameters {
    Parameters::default()
}

/// Reproducible unit-mass bodies scattered over the unit square centered at
/// the origin.
pub fn random_bodies(n: usize, seed: u64) -> Vec<Body> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let x = rng.gen::<f64>() - 0.5;
            let y = rng.gen::<f64>() - 0.5;
            Body::new(NVec2::new(x, y), NVec2::zeros(), 1.0)
        })
        .collect()
}

/// Root region covering the unit square centered at the origin.
pub fn unit_area() -> SquareArea {
    SquareArea::new(NVec2::new(-0.5, -0.5), 1.0)
}

/// Recursively check the structural invariant of a node and return the
/// body indices of all leaves below it.
fn check_node(tree: &QuadTree, node: &Node, leaves: &mut Vec<usize>) {
    let child_count: usize = node
        .children
        .iter()
        .flatten()
        .map(|&c| tree.nodes()[c].n_bodies)
        .sum();

    match node.n_bodies {
        0 => {
            assert!(node.body.is_none(), "empty node holds a body");
            assert!(node.is_leaf(), "empty node has children");
        }
        1 => {
            assert!(node.body.is_some(), "leaf with count 1 holds no body");
            assert!(node.is_leaf(), "node with a direct body has children");
        }
        n => {
            assert!(node.body.is_none(), "internal node holds a direct body");
            assert!(!node.is_leaf(), "node with count {} has no children", n);
            assert_eq!(child_count, n, "child counts do not sum to node count");
        }
    }

    if let Some(body_idx) = node.body {
        leaves.push(body_idx);
    }

    for child_idx in node.children.iter().flatten() {
        check_node(tree, &tree.nodes()[*child_idx], leaves);
    }
}

// ==================================================================================
// Quadtree tests
// ==================================================================================

#[test]
fn quadtree_four_corner_insert() {
    let bodies = vec![
        Body::new(NVec2::new(-0.4, -0.4), NVec2::zeros(), 1.0),
        Body::new(NVec2::new(0.4, -0.4), NVec2::zeros(), 1.0),
        Body::new(NVec2::new(-0.4, 0.4), NVec2::zeros(), 1.0),
        Body::new(NVec2::new(0.4, 0.4), NVec2::zeros(), 1.0),
    ];

    let tree = QuadTree::build(unit_area(), &bodies);
    let root = tree.root();

    assert_eq!(root.n_bodies, 4);
    assert!(root.body.is_none());

    for (quadrant, child_idx) in root.children.iter().enumerate() {
        let child_idx = child_idx.unwrap_or_else(|| panic!("quadrant {} missing", quadrant));
        let child = &tree.nodes()[child_idx];
        assert_eq!(child.n_bodies, 1, "quadrant {} should hold one body", quadrant);
        assert!(child.body.is_some());
        assert!(child.area.contains(&bodies[child.body.unwrap()].x));
    }
}

#[test]
fn quadtree_node_invariant_holds_after_random_inserts() {
    let bodies = random_bodies(200, 11);
    let tree = QuadTree::build(unit_area(), &bodies);

    let mut leaves = Vec::new();
    check_node(&tree, tree.root(), &mut leaves);

    assert_eq!(tree.root().n_bodies, bodies.len());
    assert_eq!(leaves.len(), bodies.len(), "every body ends in exactly one leaf");
}

#[test]
fn quadtree_every_body_in_a_containing_leaf() {
    let bodies = random_bodies(150, 23);
    let tree = QuadTree::build(unit_area(), &bodies);

    let mut seen = vec![false; bodies.len()];
    for node in tree.nodes() {
        if let Some(body_idx) = node.body {
            assert!(!seen[body_idx], "body {} appears in two leaves", body_idx);
            seen[body_idx] = true;
            assert!(
                node.area.contains(&bodies[body_idx].x),
                "leaf region does not contain its body"
            );
        }
    }

    assert!(seen.iter().all(|&s| s), "some body never reached a leaf");
}

#[test]
fn quadtree_rollup_matches_direct_sums() {
    let bodies = random_bodies(10, 37);
    let tree = QuadTree::build(unit_area(), &bodies);
    let root = tree.root();

    assert_eq!(root.mass, 10.0);

    let mean = bodies.iter().map(|b| b.x).sum::<NVec2>() / bodies.len() as f64;
    assert!(
        (root.center_of_mass - mean).norm() < 1e-12,
        "aggregate center {:?} differs from mean {:?}",
        root.center_of_mass,
        mean
    );
}

#[test]
fn quadtree_drops_bodies_outside_root_region() {
    let bodies = vec![
        Body::new(NVec2::new(0.1, 0.1), NVec2::zeros(), 1.0),
        Body::new(NVec2::new(3.0, 3.0), NVec2::zeros(), 1.0), // outside
    ];

    let mut tree = QuadTree::new(unit_area());
    assert!(tree.insert(0, &bodies));
    assert!(!tree.insert(1, &bodies));
    assert_eq!(tree.root().n_bodies, 1);
}

// ==================================================================================
// Force kernel tests
// ==================================================================================

#[test]
fn gravity_newton_third_law() {
    let sys = two_body_system(1.0, 2.0, 3.0);
    let p = test_params();

    let mut acc = vec![NVec2::zeros(); 2];
    forces::brute_force(&sys, &p, &mut acc);

    let net = acc[0] * sys.bodies[0].m + acc[1] * sys.bodies[1].m;
    assert!(net.norm() < 1e-12, "net momentum change not zero: {:?}", net);
}

#[test]
fn gravity_inverse_square_law() {
    let sys_r = two_body_system(1.0, 1.0, 1.0);
    let sys_2r = two_body_system(2.0, 1.0, 1.0);
    let p = test_params();

    let mut acc_r = vec![NVec2::zeros(); 2];
    let mut acc_2r = vec![NVec2::zeros(); 2];
    forces::brute_force(&sys_r, &p, &mut acc_r);
    forces::brute_force(&sys_2r, &p, &mut acc_2r);

    let ratio = acc_r[0].norm() / acc_2r[0].norm();
    assert!((ratio - 4.0).abs() < 1e-9, "expected ~4x, got {}", ratio);
}

#[test]
fn gravity_distance_floor_prevents_blowup() {
    let sys = two_body_system(1e-9, 1.0, 1.0);
    let p = test_params();

    let mut acc = vec![NVec2::zeros(); 2];
    forces::brute_force(&sys, &p, &mut acc);

    // With distance squared floored at eps_lo the acceleration tops out at
    // g * m / eps_lo.
    let cap = p.g * 1.0 / p.eps_lo;
    assert!(acc[0].norm().is_finite());
    assert!(acc[0].norm() <= cap * (1.0 + 1e-12), "floor failed: {}", acc[0].norm());
}

#[test]
fn serial_and_threaded_brute_force_agree_exactly() {
    let sys = System {
        bodies: random_bodies(200, 5),
    };
    let p = test_params();

    let mut serial = vec![NVec2::zeros(); 200];
    let mut threaded = vec![NVec2::zeros(); 200];
    let mut tasks = vec![NVec2::zeros(); 200];

    forces::brute_force(&sys, &p, &mut serial);
    forces::brute_force_threads(&sys, &p, &mut threaded);
    forces::brute_force_tasks(&sys, &p, &mut tasks);

    for i in 0..200 {
        assert_eq!(serial[i], threaded[i], "thread kernel diverges at body {}", i);
        assert_eq!(serial[i], tasks[i], "task kernel diverges at body {}", i);
    }
}

#[test]
fn barnes_hut_with_theta_zero_matches_brute_force() {
    let sys = System {
        bodies: random_bodies(200, 17),
    };
    let mut p = test_params();
    p.theta = 0.0;

    let mut brute = vec![NVec2::zeros(); 200];
    forces::brute_force(&sys, &p, &mut brute);

    let tree = QuadTree::build(SquareArea::bounding(&sys.bodies), &sys.bodies);
    let mut approx = vec![NVec2::zeros(); 200];
    forces::barnes_hut(&tree, &sys, &p, &mut approx);

    for i in 0..200 {
        let diff = (brute[i] - approx[i]).norm();
        assert!(
            diff < 1e-6,
            "body {}: brute {:?} vs tree {:?} (diff {})",
            i,
            brute[i],
            approx[i],
            diff
        );
    }
}

#[test]
fn serial_and_threaded_barnes_hut_agree() {
    let sys = System {
        bodies: random_bodies(300, 29),
    };
    let p = test_params();

    let tree = QuadTree::build(SquareArea::bounding(&sys.bodies), &sys.bodies);

    let mut serial = vec![NVec2::zeros(); 300];
    let mut threaded = vec![NVec2::zeros(); 300];
    forces::barnes_hut(&tree, &sys, &p, &mut serial);
    forces::barnes_hut_threads(&tree, &sys, &p, &mut threaded);

    for i in 0..300 {
        assert_eq!(serial[i], threaded[i], "tree kernels diverge at body {}", i);
    }
}

// ==================================================================================
// Integrator and driver tests
// ==================================================================================

#[test]
fn single_body_stays_exactly_at_rest() {
    let body = Body::new(NVec2::new(0.3, 0.2), NVec2::zeros(), 5.0);
    let mut sim = Simulation::with_bodies(vec![body.clone()], test_params());
    sim.set_kernel(Kernel::BruteForce);

    for _ in 0..100 {
        sim.step();
    }

    let after = &sim.bodies()[0];
    assert_eq!(after.x, body.x);
    assert_eq!(after.v, body.v);
    assert_eq!(after.a, NVec2::zeros());
}

#[test]
fn total_mass_is_conserved_across_steps() {
    let mut params = test_params();
    params.seed = Some(7);
    params.delta_t = 1e-5;

    let mut sim = Simulation::with_parameters(300, params);
    sim.set_kernel(Kernel::BarnesHutThreads);

    let before = sim.system().total_mass();
    for _ in 0..10 {
        sim.step();
    }

    assert_eq!(sim.system().total_mass(), before);
}

#[test]
fn symmetric_pair_keeps_center_of_mass_at_origin() {
    // Equal masses on a circular orbit about the origin: v^2 / r = g m / d^2.
    let speed = 2.5f64.sqrt();
    let bodies = vec![
        Body::new(NVec2::new(-0.1, 0.0), NVec2::new(0.0, speed), 1.0),
        Body::new(NVec2::new(0.1, 0.0), NVec2::new(0.0, -speed), 1.0),
    ];

    let mut params = test_params();
    params.delta_t = 1e-4;

    let mut sim = Simulation::with_bodies(bodies, params);
    sim.set_kernel(Kernel::BruteForce);

    for _ in 0..10_000 {
        sim.step();
    }

    let com = sim.bodies().iter().map(|b| b.x * b.m).sum::<NVec2>() / 2.0;
    assert!(com.norm() < 1e-6, "center of mass drifted to {:?}", com);
}

#[test]
fn two_body_kepler_orbit_closes() {
    // Light body on a circular orbit around a heavy one:
    // v = sqrt(g M / r) = sqrt(1000 / 0.1) = 100, period 2 pi r / v.
    let bodies = vec![
        Body::new(NVec2::zeros(), NVec2::zeros(), 1000.0),
        Body::new(NVec2::new(0.1, 0.0), NVec2::new(0.0, 100.0), 1.0),
    ];

    let mut sim = Simulation::with_bodies(bodies, test_params());
    sim.set_kernel(Kernel::BruteForce);

    // One period at delta_t = 1e-6 is about 6283 steps. The heavy body
    // recoils a little, so the light one closes its orbit a handful of
    // steps early; scan a window around the nominal period.
    for _ in 0..6000 {
        sim.step();
    }

    let mut closest = f64::MAX;
    for _ in 6000..6600 {
        sim.step();
        let drift = (sim.bodies()[1].x - NVec2::new(0.1, 0.0)).norm();
        closest = closest.min(drift);
    }

    assert!(closest < 1e-3, "orbit failed to close, drift {}", closest);
}

#[test]
fn reversing_the_step_retraces_the_trajectory() {
    let bodies = vec![
        Body::new(NVec2::new(-0.2, -0.1), NVec2::new(0.0, 0.3), 1.0),
        Body::new(NVec2::new(0.2, -0.1), NVec2::new(0.0, -0.3), 1.0),
        Body::new(NVec2::new(0.0, 0.25), NVec2::new(0.2, 0.0), 1.0),
    ];

    let mut params = test_params();
    params.delta_t = 1e-3;

    let mut sim = Simulation::with_bodies(bodies.clone(), params);
    sim.set_kernel(Kernel::BruteForce);

    for _ in 0..100 {
        sim.step();
    }
    sim.reverse();
    for _ in 0..100 {
        sim.step();
    }

    for (before, after) in bodies.iter().zip(sim.bodies()) {
        assert!(
            (before.x - after.x).norm() < 1e-6,
            "position did not retrace: {:?} vs {:?}",
            before.x,
            after.x
        );
    }
}

#[test]
fn mutators_clamp_and_restart() {
    let mut params = test_params();
    params.seed = Some(3);

    let mut sim = Simulation::with_parameters(1000, params);
    assert_eq!(sim.state(), RunState::Paused);

    // Theta clamps to [0, 1].
    for _ in 0..20 {
        sim.apply(Command::IncreaseTheta);
    }
    assert_eq!(sim.parameters().theta, 1.0);
    for _ in 0..20 {
        sim.apply(Command::DecreaseTheta);
    }
    assert_eq!(sim.parameters().theta, 0.0);

    // Body count floors at 1000 and restarts regenerate the set.
    sim.apply(Command::DecreaseParticles);
    assert_eq!(sim.n_particles(), 1000);
    assert_eq!(sim.bodies().len(), 1000);
    assert_eq!(sim.state(), RunState::Running);

    sim.apply(Command::IncreaseParticles);
    assert_eq!(sim.n_particles(), 2000);
    assert_eq!(sim.bodies().len(), 2000);

    // Step size scaling and reversal.
    let dt = sim.parameters().delta_t;
    sim.apply(Command::SpeedUp);
    assert!((sim.parameters().delta_t - dt * 1.1).abs() < 1e-18);
    sim.apply(Command::Reverse);
    assert!(sim.parameters().delta_t < 0.0);

    // Scenario switch restarts and the overlay flag resets.
    sim.apply(Command::ToggleQuadTree);
    assert!(sim.render_quad_tree());
    sim.apply(Command::SetScenario(SimulationScenario::TwoClusters));
    assert!(!sim.render_quad_tree());
    assert_eq!(sim.state(), RunState::Running);
}

// ==================================================================================
// Generator tests
// ==================================================================================

#[test]
fn uniform_disk_bodies_lie_inside_the_half_unit_disk() {
    let mut dist = ParticleDistribution::new(Some(1));
    let bodies = dist.create_distribution(
        SimulationScenario::OneCluster,
        PositionDistribution::UniformDisk,
        VelocityDistribution::Random,
        500,
        250.0,
        1.0,
        false,
    );

    assert_eq!(bodies.len(), 500);
    for b in &bodies {
        assert!(b.x.norm() <= 0.5, "body at {:?} escapes the disk", b.x);
    }
}

#[test]
fn galaxy_positions_lie_inside_the_half_unit_disk() {
    let mut dist = ParticleDistribution::new(Some(2));
    let bodies = dist.create_distribution(
        SimulationScenario::OneCluster,
        PositionDistribution::Galaxy,
        VelocityDistribution::Random,
        500,
        250.0,
        1.0,
        false,
    );

    for b in &bodies {
        assert!(b.x.norm() <= 0.5 + 1e-12, "body at {:?} escapes the disk", b.x);
    }
}

#[test]
fn two_cluster_centroids_sit_near_their_centers() {
    let mut dist = ParticleDistribution::new(Some(4));
    let n = 2000;
    let bodies = dist.create_distribution(
        SimulationScenario::TwoClusters,
        PositionDistribution::UniformDisk,
        VelocityDistribution::Random,
        n,
        250.0,
        1.0,
        false,
    );

    assert_eq!(bodies.len(), n);

    let (first, second) = bodies.split_at(n / 2);
    let centroid = |group: &[Body]| {
        group.iter().map(|b| b.x).sum::<NVec2>() / group.len() as f64
    };

    let c1 = centroid(first);
    let c2 = centroid(second);
    assert!(
        (c1 - NVec2::new(-0.3, -0.3)).norm() < 0.05,
        "first centroid off at {:?}",
        c1
    );
    assert!(
        (c2 - NVec2::new(0.3, 0.3)).norm() < 0.05,
        "second centroid off at {:?}",
        c2
    );
}

#[test]
fn black_hole_scenario_appends_the_heavy_body() {
    let mut dist = ParticleDistribution::new(Some(5));
    let n = 200;
    let bodies = dist.create_distribution(
        SimulationScenario::ClusterAndBlackHole,
        PositionDistribution::UniformDisk,
        VelocityDistribution::Random,
        n,
        250.0,
        1.0,
        false,
    );

    assert_eq!(bodies.len(), n);
    let hole = bodies.last().unwrap();
    assert_eq!(hole.m, 2000.0);
    assert_eq!(hole.x, NVec2::new(0.3, 0.3));
}

#[test]
fn central_body_is_prepended_at_the_origin() {
    let mut dist = ParticleDistribution::new(Some(6));
    let bodies = dist.create_distribution(
        SimulationScenario::OneCluster,
        PositionDistribution::UniformDisk,
        VelocityDistribution::Rotating,
        100,
        250.0,
        1.0,
        true,
    );

    assert_eq!(bodies.len(), 100);
    assert_eq!(bodies[0].x, NVec2::zeros());
    assert_eq!(bodies[0].v, NVec2::zeros());
    assert_eq!(bodies[0].m, 1000.0);
}

#[test]
fn rotating_velocities_form_a_rigid_rotation() {
    let max_speed = 250.0;
    let mut dist = ParticleDistribution::new(Some(8));
    let bodies = dist.create_distribution(
        SimulationScenario::OneCluster,
        PositionDistribution::UniformSquare,
        VelocityDistribution::Rotating,
        100,
        max_speed,
        1.0,
        false,
    );

    for b in &bodies {
        let expected = NVec2::new(2.0 * max_speed * b.x.y, -2.0 * max_speed * b.x.x);
        assert_eq!(b.v, expected);
    }
}

#[test]
fn galaxy_velocities_are_perpendicular_to_the_radius() {
    let mut dist = ParticleDistribution::new(Some(9));
    let bodies = dist.create_distribution(
        SimulationScenario::OneCluster,
        PositionDistribution::Galaxy,
        VelocityDistribution::Galaxy,
        500,
        250.0,
        1.0,
        true,
    );

    for b in &bodies {
        if b.x.norm() <= 1e-5 {
            assert_eq!(b.v, NVec2::zeros());
            continue;
        }
        let radial = b.v.dot(&b.x);
        assert!(
            radial.abs() < 1e-9,
            "velocity {:?} not perpendicular to {:?}",
            b.v,
            b.x
        );
    }
}

#[test]
fn random_velocities_respect_the_speed_limit() {
    let max_speed = 250.0;
    let mut dist = ParticleDistribution::new(Some(10));
    let bodies = dist.create_distribution(
        SimulationScenario::OneCluster,
        PositionDistribution::UniformSquare,
        VelocityDistribution::Random,
        300,
        max_speed,
        1.0,
        false,
    );

    for b in &bodies {
        assert!(b.v.norm() <= max_speed * (1.0 + 1e-12));
    }
}
