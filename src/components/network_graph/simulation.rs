//! Continuous force simulation driver.
//!
//! [`SimulationEngine`] owns the hot/quiet run state (alpha and whether it is
//! ticking) and the ownership rule for position writes; the physics itself is
//! delegated to a [`SimulationProvider`]. Each tick the provider proposes a
//! position for every body, and the engine writes it only to nodes without an
//! override. Pinned and dragged nodes stay in the physics world as fixed bodies.

use log::{debug, warn};
use serde::Deserialize;

use super::config::SimulationConfig;
use super::types::{Edge, Graph, Node, Point};

/// Forces applied by the simulation.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ForceSpec {
	/// Pull the centroid of free bodies to the origin.
	pub center: bool,
	/// Many-body strength; negative values repel.
	pub charge_strength: f64,
	/// Rest length of every link.
	pub link_distance: f64,
	/// Keep bodies from overlapping, using a radius of `sqrt(degree)`.
	pub collide: bool,
}

impl Default for ForceSpec {
	fn default() -> Self {
		Self {
			center: true,
			charge_strength: -2.0,
			link_distance: 10.0,
			collide: true,
		}
	}
}

/// Physics stepper consumed as a black box.
pub trait SimulationProvider {
	/// Replace the bodies and links being integrated.
	fn set_graph(&mut self, nodes: &[Node], edges: &[Edge]);

	/// Replace the force configuration.
	fn configure(&mut self, forces: &ForceSpec);

	/// Advance one tick at the given alpha and return a position for every
	/// node, in node order. Nodes with an override are fixed bodies at it.
	fn step(&mut self, nodes: &[Node], alpha: f64) -> Vec<Point>;
}

/// Whether the simulation may be re-energised.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimulationMode {
	/// The force layout is selected; kicks restart ticking.
	Active,
	/// A discrete layout owns positions; kicks are ignored.
	Suppressed,
}

/// Owns the simulation run state for one graph view.
pub struct SimulationEngine<P> {
	provider: P,
	config: SimulationConfig,
	mode: SimulationMode,
	running: bool,
	alpha: f64,
}

impl<P: SimulationProvider> SimulationEngine<P> {
	/// Active but not ticking until the first kick.
	pub fn new(mut provider: P, config: SimulationConfig) -> Self {
		provider.configure(&config.forces);
		Self {
			provider,
			config,
			mode: SimulationMode::Active,
			running: false,
			alpha: 0.0,
		}
	}

	/// Hand the current node and edge set to the provider. Does not start ticking.
	pub fn set_graph(&mut self, graph: &Graph) {
		self.provider.set_graph(graph.nodes(), graph.edges());
	}

	/// Reset alpha and resume ticking. Ignored while suppressed; returns whether
	/// the kick took effect.
	pub fn kick(&mut self) -> bool {
		if self.mode == SimulationMode::Suppressed {
			debug!("cines-graph: kick ignored, simulation suppressed by discrete layout");
			return false;
		}
		self.alpha = self.config.kick_alpha;
		self.running = true;
		true
	}

	/// Halt ticking. With `force`, also suppress further kicks until [`resume`](Self::resume).
	pub fn stop(&mut self, force: bool) {
		self.running = false;
		if force {
			self.mode = SimulationMode::Suppressed;
		}
	}

	/// Leave suppression and kick.
	pub fn resume(&mut self) {
		self.mode = SimulationMode::Active;
		self.kick();
	}

	/// Advance one tick if running. Returns whether positions were written.
	pub fn tick(&mut self, graph: &mut Graph) -> bool {
		if !self.running {
			return false;
		}

		self.alpha += (self.config.alpha_target - self.alpha) * self.config.alpha_decay;
		let proposed = self.provider.step(graph.nodes(), self.alpha);
		if proposed.len() != graph.nodes().len() {
			warn!(
				"cines-graph: simulation returned {} positions for {} nodes, skipping tick",
				proposed.len(),
				graph.nodes().len()
			);
		} else {
			for (node, p) in graph.nodes_mut().iter_mut().zip(proposed) {
				if node.fixed().is_some() {
					node.settle();
				} else {
					node.set_position(p);
				}
			}
		}

		if self.alpha < self.config.alpha_min {
			self.running = false;
		}
		true
	}

	/// Whether the next `tick` will step.
	pub fn is_running(&self) -> bool {
		self.running
	}

	/// Current alpha.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Whether kicks are honoured.
	pub fn mode(&self) -> SimulationMode {
		self.mode
	}

	/// The physics stepper.
	pub fn provider(&self) -> &P {
		&self.provider
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::network_graph::testing::ScriptedProvider;

	fn engine() -> SimulationEngine<ScriptedProvider> {
		SimulationEngine::new(ScriptedProvider::default(), SimulationConfig::default())
	}

	#[test]
	fn test_set_graph_does_not_start_ticking() {
		let mut graph = Graph::load("0 1\n");
		let mut sim = engine();
		sim.set_graph(&graph);
		assert!(!sim.is_running());
		assert!(!sim.tick(&mut graph));
		assert_eq!(sim.provider().steps, 0);
	}

	#[test]
	fn test_kick_resets_alpha() {
		let mut sim = engine();
		assert!(sim.kick());
		assert!(sim.is_running());
		assert_eq!(sim.alpha(), 0.3);
	}

	#[test]
	fn test_suppressed_engine_ignores_kicks() {
		let mut sim = engine();
		sim.kick();
		sim.stop(true);
		assert!(!sim.is_running());
		assert!(!sim.kick());
		assert!(!sim.is_running());

		sim.resume();
		assert_eq!(sim.mode(), SimulationMode::Active);
		assert!(sim.is_running());
	}

	#[test]
	fn test_plain_stop_keeps_engine_kickable() {
		let mut sim = engine();
		sim.kick();
		sim.stop(false);
		assert!(!sim.is_running());
		assert!(sim.kick());
	}

	#[test]
	fn test_tick_moves_only_free_nodes() {
		let mut graph = Graph::load("0 1\n1 2\n");
		let start: Vec<Point> = graph.nodes().iter().map(Node::position).collect();
		graph.node_mut(1).unwrap().toggle_pin();

		let mut sim = engine();
		sim.set_graph(&graph);
		sim.kick();
		for _ in 0..5 {
			assert!(sim.tick(&mut graph));
		}

		let pinned = graph.node(1).unwrap();
		assert_eq!(pinned.position(), start[1]);
		assert_eq!(pinned.fixed(), Some(start[1]));
		assert_ne!(graph.node(0).unwrap().position(), start[0]);
		assert_ne!(graph.node(2).unwrap().position(), start[2]);
	}

	#[test]
	fn test_ticks_never_overwrite_an_override() {
		let mut graph = Graph::load("0 1\n");
		let held = Point::new(42.0, -7.0);
		graph.node_mut(0).unwrap().set_override(held);

		let mut sim = engine();
		sim.set_graph(&graph);
		sim.kick();
		for _ in 0..20 {
			sim.tick(&mut graph);
			let node = graph.node(0).unwrap();
			assert_eq!((node.fx(), node.fy()), (Some(42.0), Some(-7.0)));
			assert_eq!(node.position(), held);
		}
	}

	#[test]
	fn test_alpha_decay_stops_ticking() {
		let mut graph = Graph::load("0 1\n");
		let mut sim = engine();
		sim.set_graph(&graph);
		sim.kick();

		let mut ticks = 0;
		while sim.tick(&mut graph) {
			ticks += 1;
			assert!(ticks < 1000, "simulation never cooled down");
		}
		assert!(!sim.is_running());
		assert!(sim.alpha() < 0.001);
		// 0.3 decays below 0.001 in a bit under 300 ticks.
		assert!((200..300).contains(&ticks), "took {ticks} ticks");
	}
}
