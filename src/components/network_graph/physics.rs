//! Physics provider backed by the `force_graph` crate.
//!
//! `force_graph` integrates many-body repulsion and spring attraction. The
//! link rest length, collision and centering forces are applied afterwards as
//! position passes scaled by alpha. Bodies with an override are anchors: they
//! push and collide with others but are never displaced.

use std::collections::HashMap;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::config::SimulationConfig;
use super::simulation::{ForceSpec, SimulationProvider};
use super::types::{Edge, Node, Point};

/// Converts a many-body strength into `force_graph` charge units.
const CHARGE_SCALE: f64 = 75.0;
const BODY_MASS: f32 = 10.0;
const SPRING: f32 = 0.05;
const FORCE_MAX: f32 = 100.0;
const NODE_SPEED: f32 = 3000.0;

fn parameters(forces: &ForceSpec, damping: f32) -> SimulationParameters {
	SimulationParameters {
		force_charge: (-forces.charge_strength * CHARGE_SCALE).max(0.0) as f32,
		force_spring: SPRING,
		force_max: FORCE_MAX,
		node_speed: NODE_SPEED,
		damping_factor: damping,
	}
}

/// Per-body data carried through the physics world.
#[derive(Clone, Debug, Default)]
pub struct Body {
	/// Degree of the node, for the collision radius.
	pub degree: usize,
}

impl Body {
	fn radius(&self) -> f64 {
		(self.degree as f64).sqrt()
	}
}

/// [`SimulationProvider`] backed by a `force_graph` world.
pub struct ForceGraphProvider {
	world: ForceGraph<Body, ()>,
	slot_of: HashMap<DefaultNodeIdx, usize>,
	bodies: Vec<Body>,
	links: Vec<(usize, usize)>,
	forces: ForceSpec,
	frame_dt: f32,
	damping: f32,
}

impl ForceGraphProvider {
	/// An empty world. Bodies arrive with `set_graph`.
	pub fn new(config: &SimulationConfig) -> Self {
		let damping = (1.0 - config.velocity_decay) as f32;
		Self {
			world: ForceGraph::new(parameters(&config.forces, damping)),
			slot_of: HashMap::new(),
			bodies: Vec::new(),
			links: Vec::new(),
			forces: config.forces.clone(),
			frame_dt: config.frame_dt as f32,
			damping,
		}
	}

	fn rebuild(&mut self, nodes: &[Node], edges: &[Edge]) {
		self.world = ForceGraph::new(parameters(&self.forces, self.damping));
		self.slot_of.clear();
		self.bodies.clear();
		self.links.clear();

		let mut slots = Vec::with_capacity(nodes.len());
		for (slot, node) in nodes.iter().enumerate() {
			let p = node.fixed().unwrap_or_else(|| node.position());
			let body = Body {
				degree: node.degree,
			};
			let idx = self.world.add_node(NodeData {
				x: p.x as f32,
				y: p.y as f32,
				mass: BODY_MASS,
				is_anchor: node.fixed().is_some(),
				user_data: body.clone(),
			});
			self.slot_of.insert(idx, slot);
			self.bodies.push(body);
			slots.push(idx);
		}

		for edge in edges {
			let (s, t) = (edge.source.index(), edge.target.index());
			// Self-loops carry no spring.
			if s != t {
				self.world.add_edge(slots[s], slots[t], EdgeData::default());
			}
			self.links.push((s, t));
		}
	}

	/// Copy positions and anchor flags from the canonical nodes into the world,
	/// so layout and drag writes since the last tick are picked up.
	fn sync_from(&mut self, nodes: &[Node]) {
		let slot_of = &self.slot_of;
		self.world.visit_nodes_mut(|body| {
			let Some(&slot) = slot_of.get(&body.index()) else {
				return;
			};
			let node = &nodes[slot];
			let p = node.fixed().unwrap_or_else(|| node.position());
			body.data.x = p.x as f32;
			body.data.y = p.y as f32;
			body.data.is_anchor = node.fixed().is_some();
		});
	}

	fn apply_links(&self, out: &mut [Point], fixed: &[bool], alpha: f64) {
		for &(s, t) in &self.links {
			if s == t || (fixed[s] && fixed[t]) {
				continue;
			}
			let delta = out[t] - out[s];
			let len = (delta.x * delta.x + delta.y * delta.y).sqrt();
			if len < 1e-9 {
				continue;
			}
			let (ds, dt) = (self.bodies[s].degree as f64, self.bodies[t].degree as f64);
			let strength = 1.0 / ds.min(dt).max(1.0);
			let k = (len - self.forces.link_distance) / len * alpha * strength;
			let shift = Point::new(delta.x * k, delta.y * k);

			// Lighter endpoints move more; a fixed endpoint hands its share over.
			let bias = ds / (ds + dt);
			let (move_t, move_s) = match (fixed[s], fixed[t]) {
				(true, false) => (1.0, 0.0),
				(false, true) => (0.0, 1.0),
				_ => (bias, 1.0 - bias),
			};
			out[t] = out[t] - Point::new(shift.x * move_t, shift.y * move_t);
			out[s] = out[s] + Point::new(shift.x * move_s, shift.y * move_s);
		}
	}

	/// Separates overlapping bodies. Bodies are bucketed into a uniform grid
	/// whose cells span the largest possible contact distance, so only bodies
	/// in neighbouring cells are compared.
	fn apply_collisions(&self, out: &mut [Point], fixed: &[bool]) {
		let max_radius = self.bodies.iter().map(Body::radius).fold(0.0, f64::max);
		if max_radius <= 0.0 {
			return;
		}
		let cell = 2.0 * max_radius;
		let cell_of = |p: Point| ((p.x / cell).floor() as i64, (p.y / cell).floor() as i64);

		let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
		for (i, &p) in out.iter().enumerate() {
			grid.entry(cell_of(p)).or_default().push(i);
		}

		for i in 0..out.len() {
			let (cx, cy) = cell_of(out[i]);
			for dx in -1..=1 {
				for dy in -1..=1 {
					let Some(bucket) = grid.get(&(cx + dx, cy + dy)) else {
						continue;
					};
					for &j in bucket {
						if j > i {
							self.separate(out, fixed, i, j);
						}
					}
				}
			}
		}
	}

	fn separate(&self, out: &mut [Point], fixed: &[bool], i: usize, j: usize) {
		if fixed[i] && fixed[j] {
			return;
		}
		let min_dist = self.bodies[i].radius() + self.bodies[j].radius();
		let delta = out[j] - out[i];
		let dist = (delta.x * delta.x + delta.y * delta.y).sqrt();
		if dist >= min_dist || dist < 1e-9 {
			return;
		}
		let overlap = (min_dist - dist) / dist;
		let push = Point::new(delta.x * overlap, delta.y * overlap);
		let (share_i, share_j) = match (fixed[i], fixed[j]) {
			(true, false) => (0.0, 1.0),
			(false, true) => (1.0, 0.0),
			_ => (0.5, 0.5),
		};
		out[i] = out[i] - Point::new(push.x * share_i, push.y * share_i);
		out[j] = out[j] + Point::new(push.x * share_j, push.y * share_j);
	}

	fn apply_center(out: &mut [Point], fixed: &[bool]) {
		let free: Vec<usize> = (0..out.len()).filter(|&i| !fixed[i]).collect();
		if free.is_empty() {
			return;
		}
		let n = free.len() as f64;
		let sum = free.iter().fold(Point::ORIGIN, |acc, &i| acc + out[i]);
		let mean = Point::new(sum.x / n, sum.y / n);
		for i in free {
			out[i] = out[i] - mean;
		}
	}
}

impl SimulationProvider for ForceGraphProvider {
	fn set_graph(&mut self, nodes: &[Node], edges: &[Edge]) {
		self.rebuild(nodes, edges);
	}

	/// Link, collision and centering changes apply from the next step; the
	/// charge strength is baked into the world on the next `set_graph`.
	fn configure(&mut self, forces: &ForceSpec) {
		self.forces = forces.clone();
	}

	fn step(&mut self, nodes: &[Node], alpha: f64) -> Vec<Point> {
		if nodes.len() != self.bodies.len() {
			return Vec::new();
		}

		self.sync_from(nodes);
		self.world.update(self.frame_dt);

		let mut out = vec![Point::ORIGIN; nodes.len()];
		let slot_of = &self.slot_of;
		self.world.visit_nodes(|body| {
			if let Some(&slot) = slot_of.get(&body.index()) {
				out[slot] = Point::new(body.x() as f64, body.y() as f64);
			}
		});

		let fixed: Vec<bool> = nodes.iter().map(|n| n.fixed().is_some()).collect();
		for (slot, node) in nodes.iter().enumerate() {
			if let Some(p) = node.fixed() {
				out[slot] = p;
			}
		}

		self.apply_links(&mut out, &fixed, alpha);
		if self.forces.collide {
			self.apply_collisions(&mut out, &fixed);
		}
		if self.forces.center {
			Self::apply_center(&mut out, &fixed);
		}
		out
	}
}
