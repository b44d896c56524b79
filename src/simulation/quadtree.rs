//! Barnes-Hut quadtree over an axis-aligned square region.
//!
//! The tree spatially partitions the body set so that the acceleration on a
//! body can be approximated in O(log N) per query: groups of distant bodies
//! are collapsed into a single pseudo-body at their center of mass whenever
//! the node's side length over its distance falls below the opening
//! threshold `theta`.
//!
//! Nodes live in a flat arena (`Vec<Node>`) and reference their children by
//! index; bodies are referenced by their index in the system's body vector
//! and are never owned by the tree. The tree is built fresh every frame and
//! discarded afterwards, so no incremental maintenance exists.

use log::debug;

use crate::simulation::states::{distance, Body, NVec2};

/// Floor applied to the query distance before any division.
const MIN_DISTANCE: f64 = 1e-9;

/// Subdivision stops here; a body that cannot be separated from a resident
/// by this depth is dropped from the current frame's tree.
const MAX_DEPTH: u32 = 64;

/// An axis-aligned square region, top-left corner plus side length.
#[derive(Debug, Clone, Copy)]
pub struct SquareArea {
    pub top_left: NVec2,
    pub side: f64,
}

/// The four sub-regions of a node, in child-slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Quadrant {
    pub fn index(self) -> usize {
        match self {
            Quadrant::TopLeft => 0,
            Quadrant::TopRight => 1,
            Quadrant::BottomLeft => 2,
            Quadrant::BottomRight => 3,
        }
    }
}

impl SquareArea {
    pub fn new(top_left: NVec2, side: f64) -> Self {
        Self {
            top_left,
            side: side.max(0.0),
        }
    }

    /// Axis-aligned bounding square of the body set: the minimum corner and
    /// the larger of the two extents.
    pub fn bounding(bodies: &[Body]) -> Self {
        if bodies.is_empty() {
            return Self::new(NVec2::new(-1.0, -1.0), 2.0);
        }

        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        let mut max_x = f64::MIN;
        let mut max_y = f64::MIN;

        for body in bodies {
            min_x = min_x.min(body.x.x);
            max_x = max_x.max(body.x.x);
            min_y = min_y.min(body.x.y);
            max_y = max_y.max(body.x.y);
        }

        Self::new(NVec2::new(min_x, min_y), (max_x - min_x).max(max_y - min_y))
    }

    pub fn contains(&self, pos: &NVec2) -> bool {
        pos.x >= self.top_left.x
            && pos.x <= self.top_left.x + self.side
            && pos.y >= self.top_left.y
            && pos.y <= self.top_left.y + self.side
    }

    /// Which quadrant of this region the position falls in. Positions on the
    /// vertical or horizontal midline go right respectively bottom.
    pub fn quadrant(&self, pos: &NVec2) -> Quadrant {
        let is_left = pos.x < self.top_left.x + 0.5 * self.side;
        let is_top = pos.y < self.top_left.y + 0.5 * self.side;

        match (is_left, is_top) {
            (true, true) => Quadrant::TopLeft,
            (false, true) => Quadrant::TopRight,
            (true, false) => Quadrant::BottomLeft,
            (false, false) => Quadrant::BottomRight,
        }
    }

    /// The sub-region covered by the given quadrant. Children halve the side
    /// exactly and partition the parent without gap or overlap.
    pub fn child(&self, quad: Quadrant) -> SquareArea {
        let half = 0.5 * self.side;
        let top_left = match quad {
            Quadrant::TopLeft => self.top_left,
            Quadrant::TopRight => NVec2::new(self.top_left.x + half, self.top_left.y),
            Quadrant::BottomLeft => NVec2::new(self.top_left.x, self.top_left.y + half),
            Quadrant::BottomRight => NVec2::new(self.top_left.x + half, self.top_left.y + half),
        };

        SquareArea {
            top_left,
            side: half,
        }
    }
}

/// A single quadtree node.
///
/// A node is either empty (`n_bodies == 0`), a leaf holding exactly one body
/// (`body = Some(i)`, no children), or subdivided (`body = None`, at least
/// one child). `mass` and `center_of_mass` are populated by the rollup pass
/// after insertion completes.
#[derive(Debug, Clone)]
pub struct Node {
    pub area: SquareArea,
    pub n_bodies: usize,
    pub body: Option<usize>,           // index into the system's body vector
    pub children: [Option<usize>; 4],  // indices into QuadTree::nodes
    pub mass: f64,
    pub center_of_mass: NVec2,
    pub depth: u32,
}

impl Node {
    fn empty(area: SquareArea, depth: u32) -> Self {
        Self {
            area,
            n_bodies: 0,
            body: None,
            children: [None; 4],
            mass: 0.0,
            center_of_mass: NVec2::zeros(),
            depth,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(|c| c.is_none())
    }
}

/// A complete quadtree built over a body set.
#[derive(Debug)]
pub struct QuadTree {
    nodes: Vec<Node>,
}

impl QuadTree {
    pub const ROOT: usize = 0;

    pub fn new(area: SquareArea) -> Self {
        Self {
            nodes: vec![Node::empty(area, 0)],
        }
    }

    /// Build a tree over the body set: insert every body, then run the
    /// center-of-mass rollup.
    pub fn build(area: SquareArea, bodies: &[Body]) -> Self {
        let mut tree = Self::new(area);
        for body_idx in 0..bodies.len() {
            tree.insert(body_idx, bodies);
        }
        tree.calculate_center_of_mass(bodies);
        tree
    }

    pub fn root(&self) -> &Node {
        &self.nodes[Self::ROOT]
    }

    /// Read-only view of the node arena, for overlay drawing and integrity
    /// checks.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Insert one body. A body outside the root region is dropped from this
    /// frame's tree; the caller tolerates the loss. Returns whether the body
    /// was placed.
    pub fn insert(&mut self, body_idx: usize, bodies: &[Body]) -> bool {
        self.insert_at(Self::ROOT, body_idx, bodies)
    }

    fn insert_at(&mut self, node_idx: usize, body_idx: usize, bodies: &[Body]) -> bool {
        let pos = bodies[body_idx].x;
        if !self.nodes[node_idx].area.contains(&pos) {
            debug!(
                "body {} at ({:.6}, {:.6}) outside node region, dropped for this frame",
                body_idx, pos.x, pos.y
            );
            return false;
        }

        // Empty node: store the body directly.
        if self.nodes[node_idx].n_bodies == 0 {
            let node = &mut self.nodes[node_idx];
            node.body = Some(body_idx);
            node.n_bodies = 1;
            return true;
        }

        if self.nodes[node_idx].depth >= MAX_DEPTH {
            debug!("body {} dropped, max tree depth reached", body_idx);
            return false;
        }

        // Leaf with a resident body: push the resident down into its
        // quadrant before handling the incoming body.
        if self.nodes[node_idx].n_bodies == 1 {
            if let Some(resident) = self.nodes[node_idx].body.take() {
                let child = self.child_for(node_idx, bodies[resident].x);
                self.insert_at(child, resident, bodies);
            }
        }

        // Subdivided node: descend into the incoming body's quadrant.
        let child = self.child_for(node_idx, pos);
        if self.insert_at(child, body_idx, bodies) {
            self.nodes[node_idx].n_bodies += 1;
            return true;
        }
        false
    }

    /// Child node index for the quadrant containing `pos`, created on first
    /// use.
    fn child_for(&mut self, node_idx: usize, pos: NVec2) -> usize {
        let quad = self.nodes[node_idx].area.quadrant(&pos);
        match self.nodes[node_idx].children[quad.index()] {
            Some(child_idx) => child_idx,
            None => {
                let area = self.nodes[node_idx].area.child(quad);
                let depth = self.nodes[node_idx].depth + 1;
                let child_idx = self.nodes.len();
                self.nodes.push(Node::empty(area, depth));
                self.nodes[node_idx].children[quad.index()] = Some(child_idx);
                child_idx
            }
        }
    }

    /// Post-order pass computing aggregate mass and mass-weighted center for
    /// every node. Called once per frame, after insertion completes.
    pub fn calculate_center_of_mass(&mut self, bodies: &[Body]) {
        self.rollup(Self::ROOT, bodies);
    }

    fn rollup(&mut self, node_idx: usize, bodies: &[Body]) {
        // Leaf with one body: the body's mass and position are the aggregates.
        if let Some(body_idx) = self.nodes[node_idx].body {
            let body = &bodies[body_idx];
            let node = &mut self.nodes[node_idx];
            node.mass = body.m;
            node.center_of_mass = body.x;
            return;
        }

        let children = self.nodes[node_idx].children;
        let mut mass = 0.0;
        let mut center = NVec2::zeros();

        for child_idx in children.into_iter().flatten() {
            self.rollup(child_idx, bodies);
            let child = &self.nodes[child_idx];
            mass += child.mass;
            center += child.mass * child.center_of_mass;
        }

        if mass > 0.0 {
            center /= mass;
        }

        let node = &mut self.nodes[node_idx];
        node.mass = mass;
        node.center_of_mass = center;
    }

    /// Acceleration felt by body `body_idx` due to the whole tree, using the
    /// opening threshold `theta` (smaller is more accurate) and the upper
    /// clamp `eps_hi` on inverse distance squared.
    pub fn acceleration(
        &self,
        body_idx: usize,
        bodies: &[Body],
        theta: f64,
        g: f64,
        eps_hi: f64,
    ) -> NVec2 {
        self.acceleration_from(Self::ROOT, body_idx, bodies, theta, g, eps_hi)
    }

    fn acceleration_from(
        &self,
        node_idx: usize,
        body_idx: usize,
        bodies: &[Body],
        theta: f64,
        g: f64,
        eps_hi: f64,
    ) -> NVec2 {
        let node = &self.nodes[node_idx];

        // Empty subtree, or the node holds the query body itself.
        if node.n_bodies == 0 || node.body == Some(body_idx) {
            return NVec2::zeros();
        }

        let diff = node.center_of_mass - bodies[body_idx].x;
        let dist = distance(&bodies[body_idx].x, &node.center_of_mass).max(MIN_DISTANCE);

        // Far enough away, or a leaf holding a single other body: treat the
        // node as a point mass at its center of mass.
        if node.area.side / dist < theta || node.body.is_some() {
            let inv_dist_sq = (dist * dist).recip().min(eps_hi);
            return g * node.mass * inv_dist_sq * (diff / dist);
        }

        // Too close: sum the contributions of the children.
        let mut acc = NVec2::zeros();
        for child_idx in node.children.iter().flatten() {
            acc += self.acceleration_from(*child_idx, body_idx, bodies, theta, g, eps_hi);
        }
        acc
    }
}
