//! Graph data model: nodes, edges and the dataset parser.
//!
//! A dataset is plain text with one `source target` pair of integer ids per
//! line. Loading collects raw id pairs first and then resolves every edge to
//! node slots in a single pass, so a [`Graph`] only ever holds resolved edges.

use std::collections::HashMap;
use std::ops::{Add, Sub};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::error::GraphError;

/// Dataset-level node identifier. Stable for the lifetime of a loaded dataset.
pub type NodeId = i64;

/// A position in graph (world) coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate.
	pub y: f64,
}

impl Point {
	/// The world origin.
	pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

	/// Point at `(x, y)`.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Euclidean distance to `other`.
	pub fn distance(self, other: Point) -> f64 {
		let (dx, dy) = (self.x - other.x, self.y - other.y);
		(dx * dx + dy * dy).sqrt()
	}
}

impl Add for Point {
	type Output = Point;

	fn add(self, rhs: Point) -> Point {
		Point::new(self.x + rhs.x, self.y + rhs.y)
	}
}

impl Sub for Point {
	type Output = Point;

	fn sub(self, rhs: Point) -> Point {
		Point::new(self.x - rhs.x, self.y - rhs.y)
	}
}

/// A node of the network.
///
/// `x`/`y` is the rendered position written by whichever writer currently owns
/// the node. The override (`fx`/`fy`) is held privately so that a pinned node
/// always has one: pinning captures the current position, unpinning clears it.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	/// Dataset id.
	pub id: NodeId,
	/// Rendered `x`.
	pub x: f64,
	/// Rendered `y`.
	pub y: f64,
	/// Number of edge endpoints touching this node. A self-loop counts twice.
	pub degree: usize,
	pinned: bool,
	fixed: Option<Point>,
}

impl Node {
	/// Unpinned node at the origin with no edges.
	pub fn new(id: NodeId) -> Self {
		Self {
			id,
			x: 0.0,
			y: 0.0,
			degree: 0,
			pinned: false,
			fixed: None,
		}
	}

	/// Rendered position.
	pub fn position(&self) -> Point {
		Point::new(self.x, self.y)
	}

	/// Move the rendered position. The override is left alone.
	pub fn set_position(&mut self, p: Point) {
		self.x = p.x;
		self.y = p.y;
	}

	/// Whether the node is pinned.
	pub fn is_pinned(&self) -> bool {
		self.pinned
	}

	/// The position override, present while pinned or dragged.
	pub fn fixed(&self) -> Option<Point> {
		self.fixed
	}

	/// `x` of the override.
	pub fn fx(&self) -> Option<f64> {
		self.fixed.map(|p| p.x)
	}

	/// `y` of the override.
	pub fn fy(&self) -> Option<f64> {
		self.fixed.map(|p| p.y)
	}

	/// Flip the pinned flag and return the new value.
	///
	/// Pinning captures the current position as the override; unpinning clears it.
	pub fn toggle_pin(&mut self) -> bool {
		if self.pinned {
			self.pinned = false;
			self.fixed = None;
		} else {
			self.pinned = true;
			self.fixed = Some(self.position());
		}
		self.pinned
	}

	/// Set the override and move the rendered position along with it.
	pub fn set_override(&mut self, p: Point) {
		self.fixed = Some(p);
		self.set_position(p);
	}

	/// Drop the override unless the node is pinned.
	pub fn release_override(&mut self) {
		if !self.pinned {
			self.fixed = None;
		}
	}

	/// Snap the rendered position to the override, if any.
	pub fn settle(&mut self) {
		if let Some(p) = self.fixed {
			self.set_position(p);
		}
	}
}

/// Slot of a node inside its graph. Only produced by edge resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(usize);

impl NodeRef {
	/// Position in [`Graph::nodes`].
	pub fn index(self) -> usize {
		self.0
	}
}

/// An edge as read from the dataset, before resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawEdge {
	/// First id on the line.
	pub source: NodeId,
	/// Second id on the line.
	pub target: NodeId,
}

/// A resolved edge between two node slots of the same graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
	/// Slot of the source node.
	pub source: NodeRef,
	/// Slot of the target node.
	pub target: NodeRef,
}

/// Outcome of loading a dataset: lines that were skipped.
#[derive(Clone, Debug, Default)]
pub struct LoadReport {
	/// One `MalformedLine` per skipped line, in file order.
	pub skipped: Vec<GraphError>,
}

/// Nodes and resolved edges of one loaded dataset.
///
/// The node sequence keeps first-occurrence order from the dataset. Node
/// storage is never replaced after construction, only mutated in place.
#[derive(Clone, Debug, Default)]
pub struct Graph {
	nodes: Vec<Node>,
	edges: Vec<Edge>,
	index: HashMap<NodeId, NodeRef>,
	generation: u64,
}

impl Graph {
	/// Parse dataset text, skipping blank and malformed lines.
	pub fn load(text: &str) -> Graph {
		Self::load_with_report(text).0
	}

	/// Parse dataset text and report the lines that were skipped.
	pub fn load_with_report(text: &str) -> (Graph, LoadReport) {
		let mut report = LoadReport::default();
		let mut raw = Vec::new();

		for (i, line) in text.lines().enumerate() {
			if line.trim().is_empty() {
				continue;
			}
			match parse_line(line) {
				Some(edge) => raw.push(edge),
				None => {
					warn!("cines-graph: skipping malformed line {}: {:?}", i + 1, line);
					report.skipped.push(GraphError::MalformedLine {
						line: i + 1,
						content: line.to_string(),
					});
				}
			}
		}

		let graph = Self::from_raw_edges(raw);
		info!(
			"cines-graph: loaded {} nodes, {} edges ({} lines skipped)",
			graph.nodes.len(),
			graph.edges.len(),
			report.skipped.len()
		);
		(graph, report)
	}

	/// Build a graph from id pairs, in the order given.
	pub fn from_pairs(pairs: impl IntoIterator<Item = (NodeId, NodeId)>) -> Graph {
		Self::from_raw_edges(
			pairs
				.into_iter()
				.map(|(source, target)| RawEdge { source, target })
				.collect(),
		)
	}

	/// Resolve raw edges to node slots. Consumes the raw edges, so each edge
	/// (and each degree increment) is resolved exactly once.
	fn from_raw_edges(raw: Vec<RawEdge>) -> Graph {
		let mut graph = Graph::default();
		graph.edges.reserve(raw.len());

		for RawEdge { source, target } in raw {
			let source = graph.intern(source);
			graph.nodes[source.0].degree += 1;
			let target = graph.intern(target);
			graph.nodes[target.0].degree += 1;
			graph.edges.push(Edge { source, target });
		}
		for (i, node) in graph.nodes.iter_mut().enumerate() {
			node.set_position(phyllotaxis(i));
		}
		graph
	}

	fn intern(&mut self, id: NodeId) -> NodeRef {
		if let Some(&slot) = self.index.get(&id) {
			return slot;
		}
		let slot = NodeRef(self.nodes.len());
		self.nodes.push(Node::new(id));
		self.index.insert(id, slot);
		slot
	}

	/// Deep copy for the interaction and simulation layers to mutate.
	pub fn clone_for_editing(&self) -> Graph {
		self.clone()
	}

	/// Tag the graph with the view generation it belongs to.
	pub fn with_generation(mut self, generation: u64) -> Graph {
		self.generation = generation;
		self
	}

	/// View generation set by [`with_generation`](Self::with_generation).
	pub fn generation(&self) -> u64 {
		self.generation
	}

	/// Nodes in first-occurrence order.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Mutable nodes. The set itself cannot change.
	pub fn nodes_mut(&mut self) -> &mut [Node] {
		&mut self.nodes
	}

	/// Edges in file order.
	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	/// True when there are no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Slot of the node with `id`.
	pub fn slot(&self, id: NodeId) -> Option<NodeRef> {
		self.index.get(&id).copied()
	}

	/// Node with `id`.
	pub fn node(&self, id: NodeId) -> Option<&Node> {
		self.slot(id).map(|slot| &self.nodes[slot.0])
	}

	/// Node with `id`, mutably.
	pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
		self.slot(id).map(|slot| &mut self.nodes[slot.0])
	}

	/// The node a resolved edge endpoint points at.
	pub fn resolve(&self, slot: NodeRef) -> &Node {
		&self.nodes[slot.0]
	}

	/// Both endpoints of an edge.
	pub fn endpoints(&self, edge: &Edge) -> (&Node, &Node) {
		(self.resolve(edge.source), self.resolve(edge.target))
	}
}

/// Initial spiral placement so no two nodes start on the same spot.
fn phyllotaxis(i: usize) -> Point {
	const INITIAL_RADIUS: f64 = 10.0;
	let angle = i as f64 * std::f64::consts::PI * (3.0 - 5.0_f64.sqrt());
	let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
	Point::new(radius * angle.cos(), radius * angle.sin())
}

fn parse_line(line: &str) -> Option<RawEdge> {
	let mut tokens = line.split_whitespace();
	let source = tokens.next()?.parse().ok()?;
	let target = tokens.next()?.parse().ok()?;
	Some(RawEdge { source, target })
}

#[cfg(test)]
mod tests {
	use super::*;

	fn degree_by_count(graph: &Graph, id: NodeId) -> usize {
		graph
			.edges()
			.iter()
			.map(|e| {
				let (s, t) = graph.endpoints(e);
				(s.id == id) as usize + (t.id == id) as usize
			})
			.sum()
	}

	#[test]
	fn test_load_triangle() {
		let graph = Graph::load("0 1\n1 2\n0 2\n");
		let ids: Vec<NodeId> = graph.nodes().iter().map(|n| n.id).collect();
		assert_eq!(ids, vec![0, 1, 2]);
		assert_eq!(graph.edges().len(), 3);
		for node in graph.nodes() {
			assert_eq!(node.degree, 2, "node {}", node.id);
		}
	}

	#[test]
	fn test_degree_matches_incident_edges() {
		let text = "5 9\n9 2\n2 5\n5 5\n7 9\n\n9 5\n";
		let graph = Graph::load(text);
		for node in graph.nodes() {
			assert_eq!(node.degree, degree_by_count(&graph, node.id));
		}
		assert_eq!(graph.node(5).map(|n| n.degree), Some(5));
	}

	#[test]
	fn test_self_loop_counts_twice() {
		let graph = Graph::load("3 3\n");
		assert_eq!(graph.nodes().len(), 1);
		assert_eq!(graph.node(3).map(|n| n.degree), Some(2));
	}

	#[test]
	fn test_first_occurrence_order_is_kept() {
		let graph = Graph::load("10 4\n4 7\n1 10\n");
		let ids: Vec<NodeId> = graph.nodes().iter().map(|n| n.id).collect();
		assert_eq!(ids, vec![10, 4, 7, 1]);
	}

	#[test]
	fn test_malformed_lines_are_skipped() {
		let (graph, report) = Graph::load_with_report("0 1\n7\n  \nx y\n1 2 extra\n");
		assert_eq!(graph.edges().len(), 2);
		assert_eq!(graph.nodes().len(), 3);
		assert_eq!(
			report.skipped,
			vec![
				GraphError::MalformedLine {
					line: 2,
					content: "7".into()
				},
				GraphError::MalformedLine {
					line: 4,
					content: "x y".into()
				},
			]
		);
	}

	#[test]
	fn test_seeded_positions_are_distinct() {
		let graph = Graph::load("0 1\n1 2\n2 3\n3 4\n");
		let nodes = graph.nodes();
		for i in 0..nodes.len() {
			for j in (i + 1)..nodes.len() {
				assert!(nodes[i].position().distance(nodes[j].position()) > 1.0);
			}
		}
	}

	#[test]
	fn test_edges_resolve_to_their_nodes() {
		let graph = Graph::load("8 3\n");
		let (s, t) = graph.endpoints(&graph.edges()[0]);
		assert_eq!((s.id, t.id), (8, 3));
	}

	#[test]
	fn test_clone_for_editing_does_not_alias() {
		let source = Graph::load("0 1\n");
		let seeded = source.nodes()[0].position();
		let mut editing = source.clone_for_editing();
		editing.nodes_mut()[0].set_position(Point::new(4.0, 2.0));
		editing.nodes_mut()[1].toggle_pin();
		assert_eq!(source.nodes()[0].position(), seeded);
		assert!(!source.nodes()[1].is_pinned());
	}

	#[test]
	fn test_pin_then_unpin_restores_node() {
		let mut node = Node::new(1);
		node.set_position(Point::new(3.0, -1.5));
		assert!(node.toggle_pin());
		assert_eq!(node.fixed(), Some(Point::new(3.0, -1.5)));
		assert!(!node.toggle_pin());
		assert_eq!((node.fx(), node.fy()), (None, None));
		assert_eq!(node.position(), Point::new(3.0, -1.5));
	}

	#[test]
	fn test_release_keeps_pinned_override() {
		let mut node = Node::new(1);
		node.toggle_pin();
		node.set_override(Point::new(9.0, 9.0));
		node.release_override();
		assert_eq!(node.fixed(), Some(Point::new(9.0, 9.0)));

		let mut free = Node::new(2);
		free.set_override(Point::new(1.0, 1.0));
		free.release_override();
		assert_eq!(free.fixed(), None);
		assert_eq!(free.position(), Point::new(1.0, 1.0));
	}
}
