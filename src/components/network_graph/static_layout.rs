//! Built-in static layout provider.
//!
//! Every algorithm is deterministic for a given element list: `random` and the
//! `cose` starting positions come from a seeded hash, not a global RNG.

use std::collections::{HashMap, VecDeque};
use std::f64::consts::{PI, TAU};

use super::config::LayoutConfig;
use super::layout::{LayoutAlgorithm, LayoutAlgorithmProvider, LayoutElements};
use super::types::Point;

/// Angle of the first node on a ring (top of the circle).
const START_ANGLE: f64 = 1.5 * PI;
const COSE_COOLING: f64 = 0.95;

/// Lays out elements with fixed per-algorithm parameters.
#[derive(Clone, Debug, Default)]
pub struct StaticLayoutProvider {
	config: LayoutConfig,
}

/// Index-based view of the elements the algorithms work on.
struct Topology {
	adjacency: Vec<Vec<usize>>,
	degree: Vec<usize>,
	edges: Vec<(usize, usize)>,
}

impl Topology {
	fn new(elements: &LayoutElements) -> Self {
		let slot: HashMap<&str, usize> = elements
			.nodes
			.iter()
			.enumerate()
			.map(|(i, id)| (id.as_str(), i))
			.collect();
		let n = elements.nodes.len();
		let mut topology = Self {
			adjacency: vec![Vec::new(); n],
			degree: vec![0; n],
			edges: Vec::with_capacity(elements.edges.len()),
		};
		for (s, t) in &elements.edges {
			let (Some(&s), Some(&t)) = (slot.get(s.as_str()), slot.get(t.as_str())) else {
				continue;
			};
			topology.degree[s] += 1;
			topology.degree[t] += 1;
			if s != t {
				topology.adjacency[s].push(t);
				topology.adjacency[t].push(s);
			}
			topology.edges.push((s, t));
		}
		topology
	}
}

impl StaticLayoutProvider {
	/// Provider using the given layout parameters.
	pub fn new(config: LayoutConfig) -> Self {
		Self { config }
	}

	/// Deterministic value in `[0, 1)` for a seed and a stream position.
	fn pseudo_random(&self, i: usize, stream: f64) -> f64 {
		let seed = self.config.seed as f64 * 7.31 + i as f64 * 1.1 + stream;
		let x = (seed * 12.9898 + seed * 78.233).sin() * 43758.5453;
		x - x.floor()
	}

	fn random(&self, n: usize) -> Vec<Point> {
		let b = self.config.bound;
		(0..n)
			.map(|i| {
				Point::new(
					-b + 2.0 * b * self.pseudo_random(i, 0.37),
					-b + 2.0 * b * self.pseudo_random(i, 0.71),
				)
			})
			.collect()
	}

	fn grid(&self, n: usize) -> Vec<Point> {
		if n == 0 {
			return Vec::new();
		}
		let cols = (n as f64).sqrt().ceil() as usize;
		let spacing = self.config.grid_spacing;
		(0..n)
			.map(|i| Point::new((i % cols) as f64 * spacing, (i / cols) as f64 * spacing))
			.collect()
	}

	fn circle(&self, n: usize) -> Vec<Point> {
		if n == 1 {
			return vec![Point::ORIGIN];
		}
		let r = self.config.circle_radius;
		(0..n)
			.map(|i| {
				let angle = START_ANGLE + i as f64 * TAU / n as f64;
				Point::new(r * angle.cos(), r * angle.sin())
			})
			.collect()
	}

	/// One ring per distinct degree, highest degree innermost.
	fn concentric(&self, topology: &Topology) -> Vec<Point> {
		let n = topology.degree.len();
		let mut order: Vec<usize> = (0..n).collect();
		order.sort_by(|&a, &b| topology.degree[b].cmp(&topology.degree[a]));

		let mut levels: Vec<Vec<usize>> = Vec::new();
		for i in order {
			match levels.last_mut() {
				Some(level) if topology.degree[level[0]] == topology.degree[i] => level.push(i),
				_ => levels.push(vec![i]),
			}
		}

		// A lone innermost node sits in the centre; otherwise every ring moves out one step.
		let offset = match levels.first() {
			Some(first) if first.len() == 1 => 0.0,
			_ => 1.0,
		};
		let mut out = vec![Point::ORIGIN; n];
		for (depth, level) in levels.iter().enumerate() {
			let r = (depth as f64 + offset) * self.config.concentric_spacing;
			for (j, &i) in level.iter().enumerate() {
				let angle = START_ANGLE + j as f64 * TAU / level.len() as f64;
				out[i] = Point::new(r * angle.cos(), r * angle.sin());
			}
		}
		out
	}

	/// Rows by breadth-first depth from the configured root. Components not
	/// reachable from it are walked from their first node, sharing the rows.
	fn breadthfirst(&self, elements: &LayoutElements, topology: &Topology) -> Vec<Point> {
		let n = elements.nodes.len();
		let root_id = self.config.breadthfirst_root.to_string();
		let root = elements.nodes.iter().position(|id| *id == root_id).unwrap_or(0);

		let mut depth: Vec<Option<usize>> = vec![None; n];
		let mut rows: Vec<Vec<usize>> = Vec::new();
		let roots = std::iter::once(root).chain(0..n);
		for start in roots {
			if n == 0 || depth[start].is_some() {
				continue;
			}
			depth[start] = Some(0);
			let mut queue = VecDeque::from([start]);
			while let Some(i) = queue.pop_front() {
				let d = depth[i].unwrap_or(0);
				if rows.len() <= d {
					rows.resize_with(d + 1, Vec::new);
				}
				rows[d].push(i);
				for &next in &topology.adjacency[i] {
					if depth[next].is_none() {
						depth[next] = Some(d + 1);
						queue.push_back(next);
					}
				}
			}
		}

		let spacing = self.config.grid_spacing * self.config.breadthfirst_spacing;
		let mut out = vec![Point::ORIGIN; n];
		for (d, row) in rows.iter().enumerate() {
			let half = (row.len() as f64 - 1.0) / 2.0;
			for (j, &i) in row.iter().enumerate() {
				out[i] = Point::new((j as f64 - half) * spacing, d as f64 * spacing);
			}
		}
		out
	}

	/// Fruchterman-Reingold placement inside the layout box.
	fn cose(&self, topology: &Topology) -> Vec<Point> {
		let n = topology.degree.len();
		let mut pos = self.random(n);
		if n < 2 {
			return pos;
		}

		let b = self.config.bound;
		let k = ((2.0 * b) * (2.0 * b) / n as f64).sqrt();
		let k_sq = k * k;
		let mut temperature = b / 10.0;

		for _ in 0..self.config.cose_iterations {
			let mut disp = vec![Point::ORIGIN; n];

			for i in 0..n {
				for j in (i + 1)..n {
					let delta = pos[i] - pos[j];
					let dist = delta.x.hypot(delta.y).max(0.01);
					let force = k_sq / dist;
					let dir = Point::new(delta.x * force / dist, delta.y * force / dist);
					disp[i] = disp[i] + dir;
					disp[j] = disp[j] - dir;
				}
			}

			for &(s, t) in &topology.edges {
				if s == t {
					continue;
				}
				let delta = pos[s] - pos[t];
				let dist = delta.x.hypot(delta.y).max(0.01);
				let force = dist * dist / k;
				let dir = Point::new(delta.x * force / dist, delta.y * force / dist);
				disp[s] = disp[s] - dir;
				disp[t] = disp[t] + dir;
			}

			for (p, d) in pos.iter_mut().zip(&disp) {
				let mag = d.x.hypot(d.y).max(0.01);
				let capped = mag.min(temperature);
				p.x = (p.x + d.x * capped / mag).clamp(-b, b);
				p.y = (p.y + d.y * capped / mag).clamp(-b, b);
			}
			temperature *= COSE_COOLING;
		}
		pos
	}
}

impl LayoutAlgorithmProvider for StaticLayoutProvider {
	fn run(&self, elements: &LayoutElements, algorithm: LayoutAlgorithm) -> Vec<(String, Point)> {
		let n = elements.nodes.len();
		let positions = match algorithm {
			LayoutAlgorithm::Random => self.random(n),
			LayoutAlgorithm::Grid => self.grid(n),
			LayoutAlgorithm::Circle => self.circle(n),
			LayoutAlgorithm::Concentric => self.concentric(&Topology::new(elements)),
			LayoutAlgorithm::Breadthfirst => self.breadthfirst(elements, &Topology::new(elements)),
			LayoutAlgorithm::Cose => self.cose(&Topology::new(elements)),
		};
		elements.nodes.iter().cloned().zip(positions).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn elements(pairs: &[(i64, i64)]) -> LayoutElements {
		let mut nodes: Vec<String> = Vec::new();
		for &(s, t) in pairs {
			for id in [s, t] {
				let id = id.to_string();
				if !nodes.contains(&id) {
					nodes.push(id);
				}
			}
		}
		LayoutElements {
			nodes,
			edges: pairs.iter().map(|(s, t)| (s.to_string(), t.to_string())).collect(),
		}
	}

	fn positions(alg: LayoutAlgorithm, els: &LayoutElements) -> HashMap<String, Point> {
		StaticLayoutProvider::default().run(els, alg).into_iter().collect()
	}

	#[test]
	fn test_circle_places_nodes_on_radius() {
		let els = elements(&[(0, 1), (1, 2), (2, 3)]);
		for p in positions(LayoutAlgorithm::Circle, &els).values() {
			assert!((p.x.hypot(p.y) - 80.0).abs() < 1e-9);
		}
	}

	#[test]
	fn test_grid_uses_square_columns() {
		let els = elements(&[(0, 1), (2, 3), (4, 0)]);
		let out = positions(LayoutAlgorithm::Grid, &els);
		// Five nodes: three columns, two rows.
		assert_eq!(out["4"], Point::new(10.0, 10.0));
		assert_eq!(out["2"], Point::new(20.0, 0.0));
	}

	#[test]
	fn test_random_stays_in_box_and_is_seeded() {
		let els = elements(&[(0, 1), (1, 2), (2, 3), (3, 4)]);
		let a = positions(LayoutAlgorithm::Random, &els);
		let b = positions(LayoutAlgorithm::Random, &els);
		assert_eq!(a, b);
		assert!(a.values().all(|p| p.x.abs() <= 80.0 && p.y.abs() <= 80.0));
	}

	#[test]
	fn test_concentric_puts_hub_in_the_centre() {
		let els = elements(&[(0, 1), (0, 2), (0, 3), (1, 2)]);
		let out = positions(LayoutAlgorithm::Concentric, &els);
		assert_eq!(out["0"], Point::ORIGIN);
		// Nodes 1 and 2 have degree 2 and share the first ring.
		assert!((out["1"].x.hypot(out["1"].y) - 10.0).abs() < 1e-9);
		assert!((out["3"].x.hypot(out["3"].y) - 20.0).abs() < 1e-9);
	}

	#[test]
	fn test_breadthfirst_rows_follow_depth_from_root() {
		let els = elements(&[(5, 0), (0, 1), (1, 2), (7, 8)]);
		let out = positions(LayoutAlgorithm::Breadthfirst, &els);
		let row = |id: &str| out[id].y / 40.0;
		assert_eq!(row("0"), 0.0);
		assert_eq!(row("5"), 1.0);
		assert_eq!(row("1"), 1.0);
		assert_eq!(row("2"), 2.0);
		// Detached component starts its own walk at depth zero.
		assert_eq!(row("7"), 0.0);
		assert_eq!(row("8"), 1.0);
	}

	#[test]
	fn test_cose_keeps_nodes_in_box() {
		let els = elements(&[(0, 1), (1, 2), (2, 0), (2, 3), (3, 4), (4, 5)]);
		let out = positions(LayoutAlgorithm::Cose, &els);
		assert_eq!(out.len(), 6);
		assert!(
			out.values()
				.all(|p| p.x.is_finite() && p.x.abs() <= 80.0 && p.y.abs() <= 80.0)
		);
	}

	#[test]
	fn test_single_node_layouts() {
		let els = LayoutElements {
			nodes: vec!["9".into()],
			edges: Vec::new(),
		};
		for alg in LayoutAlgorithm::ALL {
			assert_eq!(positions(alg, &els).len(), 1, "{alg}");
		}
	}
}
