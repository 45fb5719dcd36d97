//! Discrete (one-shot) layouts.
//!
//! The engine hands a provider a string-keyed description of the graph and
//! shifts the result so that the mean position of the graph is unchanged:
//! `result[i] = raw[i] - mean(raw) + mean(input)`. Switching layouts therefore
//! never makes the picture jump.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use log::{debug, warn};

use super::error::GraphError;
use super::types::{Graph, NodeId, Point};

/// Supported discrete layout algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayoutAlgorithm {
	/// Seeded uniform placement in a square.
	Random,
	/// Rows and columns in node order.
	Grid,
	/// Evenly spaced on one circle.
	Circle,
	/// Rings by degree, highest in the middle.
	Concentric,
	/// Rows by distance from the root.
	Breadthfirst,
	/// Static force-directed placement.
	Cose,
}

impl LayoutAlgorithm {
	/// Every algorithm, in menu order.
	pub const ALL: [LayoutAlgorithm; 6] = [
		LayoutAlgorithm::Random,
		LayoutAlgorithm::Grid,
		LayoutAlgorithm::Circle,
		LayoutAlgorithm::Concentric,
		LayoutAlgorithm::Breadthfirst,
		LayoutAlgorithm::Cose,
	];

	/// Name used for selection.
	pub fn name(self) -> &'static str {
		match self {
			LayoutAlgorithm::Random => "random",
			LayoutAlgorithm::Grid => "grid",
			LayoutAlgorithm::Circle => "circle",
			LayoutAlgorithm::Concentric => "concentric",
			LayoutAlgorithm::Breadthfirst => "breadthfirst",
			LayoutAlgorithm::Cose => "cose",
		}
	}
}

impl fmt::Display for LayoutAlgorithm {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for LayoutAlgorithm {
	type Err = GraphError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		LayoutAlgorithm::ALL
			.into_iter()
			.find(|alg| alg.name() == s)
			.ok_or_else(|| GraphError::UnknownLayout(s.to_string()))
	}
}

/// Which writer owns node positions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutChoice {
	/// The continuous simulation.
	#[default]
	Force,
	/// A one-shot layout; the simulation is suppressed.
	Discrete(LayoutAlgorithm),
}

impl LayoutChoice {
	/// Names offered for selection, force first.
	pub fn names() -> Vec<&'static str> {
		std::iter::once("force")
			.chain(LayoutAlgorithm::ALL.iter().map(|alg| alg.name()))
			.collect()
	}
}

impl fmt::Display for LayoutChoice {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			LayoutChoice::Force => f.write_str("force"),
			LayoutChoice::Discrete(algorithm) => fmt::Display::fmt(algorithm, f),
		}
	}
}

impl FromStr for LayoutChoice {
	type Err = GraphError;

	/// An empty name means "nothing selected yet", which is the force layout.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"" | "force" => Ok(LayoutChoice::Force),
			other => other.parse().map(LayoutChoice::Discrete),
		}
	}
}

/// Normalized graph description handed to a layout provider.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutElements {
	/// Node ids, in graph order.
	pub nodes: Vec<String>,
	/// Edges as id pairs.
	pub edges: Vec<(String, String)>,
}

impl LayoutElements {
	/// Describe `graph` with string ids.
	pub fn from_graph(graph: &Graph) -> Self {
		Self {
			nodes: graph.nodes().iter().map(|n| n.id.to_string()).collect(),
			edges: graph
				.edges()
				.iter()
				.map(|e| {
					let (s, t) = graph.endpoints(e);
					(s.id.to_string(), t.id.to_string())
				})
				.collect(),
		}
	}
}

/// Stateless static-layout implementation consumed as a black box.
pub trait LayoutAlgorithmProvider {
	/// Position every element node. Output order need not match input order.
	fn run(&self, elements: &LayoutElements, algorithm: LayoutAlgorithm) -> Vec<(String, Point)>;
}

/// Mean of a set of positions, `None` when empty.
pub fn mean_position(points: impl IntoIterator<Item = Point>) -> Option<Point> {
	let (sum, count) = points
		.into_iter()
		.fold((Point::ORIGIN, 0usize), |(sum, n), p| (sum + p, n + 1));
	if count == 0 {
		return None;
	}
	let n = count as f64;
	Some(Point::new(sum.x / n, sum.y / n))
}

/// Runs discrete layouts with centroid preservation.
pub struct LayoutEngine<P> {
	provider: P,
}

impl<P: LayoutAlgorithmProvider> LayoutEngine<P> {
	/// Wrap a layout provider.
	pub fn new(provider: P) -> Self {
		Self { provider }
	}

	/// Compute a new position for every node. Pure: the graph is not modified.
	pub fn run(&self, graph: &Graph, algorithm: LayoutAlgorithm) -> HashMap<NodeId, Point> {
		let Some(input_mean) = mean_position(graph.nodes().iter().map(|n| n.position())) else {
			return HashMap::new();
		};

		let elements = LayoutElements::from_graph(graph);
		let raw: Vec<(NodeId, Point)> = self
			.provider
			.run(&elements, algorithm)
			.into_iter()
			.filter_map(|(id, p)| match id.parse::<NodeId>() {
				Ok(id) if graph.node(id).is_some() => Some((id, p)),
				_ => {
					warn!("cines-graph: layout {} returned unknown node {:?}", algorithm, id);
					None
				}
			})
			.collect();

		let Some(raw_mean) = mean_position(raw.iter().map(|&(_, p)| p)) else {
			return HashMap::new();
		};
		let shift = input_mean - raw_mean;
		debug!(
			"cines-graph: layout {} placed {} nodes, shift ({:.3}, {:.3})",
			algorithm,
			raw.len(),
			shift.x,
			shift.y
		);
		raw.into_iter().map(|(id, p)| (id, p + shift)).collect()
	}

	/// Parse the algorithm name, then [`run`](Self::run).
	pub fn run_named(&self, graph: &Graph, name: &str) -> Result<HashMap<NodeId, Point>, GraphError> {
		let algorithm: LayoutAlgorithm = name.parse()?;
		Ok(self.run(graph, algorithm))
	}
}

/// Write layout positions into the graph in one batch.
///
/// Nodes holding an override (pinned or mid-drag) keep it; everything else
/// moves. Returns how many nodes were moved.
pub fn apply_positions(graph: &mut Graph, positions: &HashMap<NodeId, Point>) -> usize {
	let mut moved = 0;
	for node in graph.nodes_mut() {
		if node.fixed().is_some() {
			continue;
		}
		if let Some(&p) = positions.get(&node.id) {
			node.set_position(p);
			moved += 1;
		}
	}
	moved
}
