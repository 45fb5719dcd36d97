//! Pointer state machine.
//!
//! ```text
//! Idle --enter(n)--> Hovering(n) --leave--> Idle
//! Hovering(n) --down--> Idle            toggle tooltip, or pin with shift
//! Hovering(n) --grab--> Dragging(n)
//! Dragging(n) --move--> Dragging(n)     write the override, redraw, kick
//! Dragging(n) --release--> Idle         drop the override unless pinned
//! ```
//!
//! The hovered or dragged node is carried in the state, so overlapping
//! gesture callbacks can never disagree about which node they act on.

use std::collections::BTreeMap;

use log::debug;

use super::adapter::RenderAdapter;
use super::simulation::{SimulationEngine, SimulationProvider};
use super::types::{Graph, Node, NodeId, Point};

/// Keyboard modifiers held during a pointer event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
	/// Shift held: pin instead of tooltip.
	pub shift: bool,
}

impl Modifiers {
	/// No modifier held.
	pub const NONE: Modifiers = Modifiers { shift: false };
	/// Shift held.
	pub const SHIFT: Modifiers = Modifiers { shift: true };
}

/// A drag in progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragGesture {
	/// The node being dragged.
	pub node: NodeId,
	/// Graph generation the gesture started in.
	pub generation: u64,
	/// Node position at grab time.
	pub start: Point,
	/// Pointer position (world coordinates) at grab time.
	pub origin: Point,
}

/// Where the pointer is relative to the nodes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum PointerState {
	/// Over empty canvas.
	#[default]
	Idle,
	/// Over a node.
	Hovering(NodeId),
	/// Dragging a node; hover is not tracked meanwhile.
	Dragging(DragGesture),
}

/// An open tooltip.
#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
	/// Node the tooltip belongs to.
	pub node: NodeId,
	/// Where it is drawn, kept at the node position.
	pub anchor: Point,
	/// `"{id}: degree: {degree}"`, with ` (fixed)` after the id when pinned.
	pub text: String,
}

impl Tooltip {
	/// Tooltip for `node` at its current position.
	pub fn for_node(node: &Node) -> Self {
		let fixed = if node.is_pinned() { " (fixed)" } else { "" };
		Self {
			node: node.id,
			anchor: node.position(),
			text: format!("{}{}: degree: {}", node.id, fixed, node.degree),
		}
	}
}

/// At most one tooltip per node.
pub type TooltipStore = BTreeMap<NodeId, Tooltip>;

/// Pointer state machine and the open tooltips of one view.
#[derive(Debug, Default)]
pub struct InteractionController {
	state: PointerState,
	tooltips: TooltipStore,
}

impl InteractionController {
	/// Idle, with no tooltips.
	pub fn new() -> Self {
		Self::default()
	}

	/// Current pointer state.
	pub fn state(&self) -> PointerState {
		self.state
	}

	/// Open tooltips.
	pub fn tooltips(&self) -> &TooltipStore {
		&self.tooltips
	}

	/// The node being dragged, if any.
	pub fn dragging(&self) -> Option<NodeId> {
		match self.state {
			PointerState::Dragging(gesture) => Some(gesture.node),
			_ => None,
		}
	}

	/// A dragged node is not tracked as hovered, so this is ignored mid-drag.
	pub fn pointer_enter_node(&mut self, node: NodeId) {
		if !matches!(self.state, PointerState::Dragging(_)) {
			self.state = PointerState::Hovering(node);
		}
	}

	/// Leaving a node ends hovering. A drag continues.
	pub fn pointer_leave_node(&mut self) {
		if matches!(self.state, PointerState::Hovering(_)) {
			self.state = PointerState::Idle;
		}
	}

	/// Click on the hovered node. Without a modifier toggles its tooltip; with
	/// shift toggles its pin and kicks the simulation. Returns whether a node
	/// was acted on.
	pub fn pointer_down<S, R>(
		&mut self,
		modifiers: Modifiers,
		graph: &mut Graph,
		simulation: &mut SimulationEngine<S>,
		renderer: &mut R,
	) -> bool
	where
		S: SimulationProvider,
		R: RenderAdapter,
	{
		let PointerState::Hovering(id) = self.state else {
			return false;
		};
		self.state = PointerState::Idle;
		let Some(node) = graph.node_mut(id) else {
			debug!("cines-graph: click on node {} which is no longer loaded", id);
			return false;
		};

		if modifiers.shift {
			let pinned = node.toggle_pin();
			debug!("cines-graph: node {} {}", id, if pinned { "pinned" } else { "unpinned" });
			simulation.kick();
			renderer.draw(graph);
		} else if self.tooltips.remove(&id).is_some() {
			renderer.hide_tooltip(id);
		} else {
			let tooltip = Tooltip::for_node(node);
			renderer.show_tooltip(&tooltip);
			self.tooltips.insert(id, tooltip);
		}
		true
	}

	/// Start dragging the hovered node from the given pointer position.
	pub fn pointer_grab<R: RenderAdapter>(&mut self, pointer: Point, graph: &Graph, renderer: &mut R) -> bool {
		let PointerState::Hovering(id) = self.state else {
			return false;
		};
		let Some(node) = graph.node(id) else {
			self.state = PointerState::Idle;
			return false;
		};
		self.state = PointerState::Dragging(DragGesture {
			node: id,
			generation: graph.generation(),
			start: node.position(),
			origin: pointer,
		});
		renderer.begin_drag(id);
		true
	}

	/// Move the dragged node with the pointer. The drag is the only writer
	/// of the node's override while it lasts, pinned or not.
	pub fn pointer_move<S, R>(
		&mut self,
		pointer: Point,
		graph: &mut Graph,
		simulation: &mut SimulationEngine<S>,
		renderer: &mut R,
	) -> bool
	where
		S: SimulationProvider,
		R: RenderAdapter,
	{
		let PointerState::Dragging(gesture) = self.state else {
			return false;
		};
		if gesture.generation != graph.generation() {
			debug!("cines-graph: ignoring move for node {} from a previous dataset", gesture.node);
			return false;
		}
		let Some(node) = graph.node_mut(gesture.node) else {
			debug!("cines-graph: ignoring move for missing node {}", gesture.node);
			return false;
		};

		let target = gesture.start + (pointer - gesture.origin);
		node.set_override(target);
		if let Some(tooltip) = self.tooltips.get_mut(&gesture.node) {
			tooltip.anchor = target;
			renderer.move_tooltip(gesture.node, target);
		}
		renderer.draw(graph);
		simulation.kick();
		true
	}

	/// End the drag. The override is released back to the active writer
	/// unless the node is pinned. A release for a node that is gone is a
	/// no-op apart from deregistering the drag action.
	pub fn pointer_release<R: RenderAdapter>(&mut self, graph: &mut Graph, renderer: &mut R) -> bool {
		let PointerState::Dragging(gesture) = self.state else {
			return false;
		};
		self.state = PointerState::Idle;
		renderer.end_drag();

		if gesture.generation != graph.generation() {
			debug!("cines-graph: stale drag release for node {}", gesture.node);
			return false;
		}
		match graph.node_mut(gesture.node) {
			Some(node) => {
				node.release_override();
				true
			}
			None => {
				debug!("cines-graph: drag release for missing node {}", gesture.node);
				false
			}
		}
	}

	/// Re-anchor every open tooltip to its node, after a tick.
	pub fn refresh_tooltips<R: RenderAdapter>(&mut self, graph: &Graph, renderer: &mut R) {
		for (id, tooltip) in self.tooltips.iter_mut() {
			if let Some(node) = graph.node(*id) {
				tooltip.anchor = node.position();
				renderer.move_tooltip(*id, tooltip.anchor);
			}
		}
	}

	/// Forget the old dataset: tooltips are dropped and hover ends. A drag in
	/// progress is kept so that its release is recognised as stale.
	pub fn reset<R: RenderAdapter>(&mut self, renderer: Option<&mut R>) {
		let closed = std::mem::take(&mut self.tooltips);
		if let Some(renderer) = renderer {
			for id in closed.keys() {
				renderer.hide_tooltip(*id);
			}
		}
		if matches!(self.state, PointerState::Hovering(_)) {
			self.state = PointerState::Idle;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::network_graph::config::SimulationConfig;
	use crate::components::network_graph::testing::{RecordingRenderer, ScriptedProvider};

	struct Rig {
		graph: Graph,
		sim: SimulationEngine<ScriptedProvider>,
		renderer: RecordingRenderer,
		ctl: InteractionController,
	}

	impl Rig {
		fn new(text: &str) -> Self {
			let graph = Graph::load(text).with_generation(1);
			let mut sim = SimulationEngine::new(ScriptedProvider::default(), SimulationConfig::default());
			sim.set_graph(&graph);
			Self {
				graph,
				sim,
				renderer: RecordingRenderer::default(),
				ctl: InteractionController::new(),
			}
		}

		fn click(&mut self, node: NodeId, modifiers: Modifiers) -> bool {
			self.ctl.pointer_enter_node(node);
			self.ctl
				.pointer_down(modifiers, &mut self.graph, &mut self.sim, &mut self.renderer)
		}

		fn grab(&mut self, node: NodeId, pointer: Point) -> bool {
			self.ctl.pointer_enter_node(node);
			self.ctl.pointer_grab(pointer, &self.graph, &mut self.renderer)
		}

		fn drag_to(&mut self, pointer: Point) -> bool {
			self.ctl
				.pointer_move(pointer, &mut self.graph, &mut self.sim, &mut self.renderer)
		}

		fn release(&mut self) -> bool {
			self.ctl.pointer_release(&mut self.graph, &mut self.renderer)
		}
	}

	#[test]
	fn test_hover_transitions() {
		let mut ctl = InteractionController::new();
		ctl.pointer_enter_node(4);
		assert_eq!(ctl.state(), PointerState::Hovering(4));
		ctl.pointer_leave_node();
		assert_eq!(ctl.state(), PointerState::Idle);
	}

	#[test]
	fn test_click_toggles_tooltip() {
		let mut rig = Rig::new("5 1\n5 2\n1 2\n");
		assert!(rig.click(5, Modifiers::NONE));
		assert_eq!(rig.ctl.state(), PointerState::Idle);
		assert_eq!(rig.ctl.tooltips()[&5].text, "5: degree: 2");
		assert!(rig.renderer.tooltips.contains_key(&5));

		assert!(rig.click(5, Modifiers::NONE));
		assert!(!rig.ctl.tooltips().contains_key(&5));
		assert!(!rig.renderer.tooltips.contains_key(&5));
	}

	#[test]
	fn test_tooltip_marks_pinned_nodes() {
		let mut rig = Rig::new("3 4\n");
		rig.click(3, Modifiers::SHIFT);
		rig.click(3, Modifiers::NONE);
		assert_eq!(rig.ctl.tooltips()[&3].text, "3 (fixed): degree: 1");
	}

	#[test]
	fn test_shift_click_pins_and_kicks() {
		let mut rig = Rig::new("0 1\n");
		let before = rig.graph.node(0).unwrap().position();
		assert!(rig.click(0, Modifiers::SHIFT));

		let node = rig.graph.node(0).unwrap();
		assert!(node.is_pinned());
		assert_eq!(node.fixed(), Some(before));
		assert!(rig.sim.is_running());
		assert_eq!(rig.renderer.draws, 1);
		assert!(rig.ctl.tooltips().is_empty());

		rig.click(0, Modifiers::SHIFT);
		let node = rig.graph.node(0).unwrap();
		assert!(!node.is_pinned());
		assert_eq!(node.fixed(), None);
		assert_eq!(node.position(), before);
	}

	#[test]
	fn test_pointer_down_without_hover_does_nothing() {
		let mut rig = Rig::new("0 1\n");
		assert!(
			!rig.ctl
				.pointer_down(Modifiers::NONE, &mut rig.graph, &mut rig.sim, &mut rig.renderer)
		);
		assert!(rig.ctl.tooltips().is_empty());
	}

	#[test]
	fn test_drag_writes_override_and_release_clears_it() {
		let mut rig = Rig::new("0 1\n1 2\n");
		let start = rig.graph.node(1).unwrap().position();
		assert!(rig.grab(1, Point::new(100.0, 100.0)));
		assert_eq!(rig.renderer.dragging, Some(1));

		assert!(rig.drag_to(Point::new(103.0, 96.0)));
		let node = rig.graph.node(1).unwrap();
		let expected = start + Point::new(3.0, -4.0);
		assert_eq!(node.fixed(), Some(expected));
		assert_eq!(node.position(), expected);
		assert!(rig.sim.is_running());

		assert!(rig.release());
		assert_eq!(rig.ctl.state(), PointerState::Idle);
		assert_eq!(rig.renderer.dragging, None);
		let node = rig.graph.node(1).unwrap();
		assert_eq!(node.fixed(), None);
		assert_eq!(node.position(), expected);
	}

	#[test]
	fn test_enter_is_ignored_while_dragging() {
		let mut rig = Rig::new("0 1\n");
		rig.grab(0, Point::ORIGIN);
		rig.ctl.pointer_enter_node(1);
		rig.ctl.pointer_leave_node();
		assert_eq!(rig.ctl.dragging(), Some(0));
	}

	#[test]
	fn test_drag_moves_open_tooltip() {
		let mut rig = Rig::new("7 8\n");
		rig.click(7, Modifiers::NONE);
		rig.grab(7, Point::ORIGIN);
		rig.drag_to(Point::new(1.0, 1.0));
		let anchor = rig.graph.node(7).unwrap().position();
		assert_eq!(rig.ctl.tooltips()[&7].anchor, anchor);
		assert_eq!(rig.renderer.tooltips[&7].0, anchor);
	}

	#[test]
	fn test_release_after_reload_is_a_no_op() {
		let mut rig = Rig::new("0 1\n");
		rig.grab(0, Point::ORIGIN);
		rig.ctl.reset(Some(&mut rig.renderer));
		assert_eq!(rig.ctl.dragging(), Some(0));

		rig.graph = Graph::load("0 1\n").with_generation(2);
		assert!(!rig.drag_to(Point::new(5.0, 5.0)));
		assert!(!rig.release());
		assert_eq!(rig.graph.node(0).unwrap().fixed(), None);
		assert_eq!(rig.renderer.dragging, None);
		assert_eq!(rig.ctl.state(), PointerState::Idle);
	}

	#[test]
	fn test_refresh_reanchors_tooltips() {
		let mut rig = Rig::new("0 1\n");
		rig.click(1, Modifiers::NONE);
		rig.graph.node_mut(1).unwrap().set_position(Point::new(9.0, 9.0));
		rig.ctl.refresh_tooltips(&rig.graph, &mut rig.renderer);
		assert_eq!(rig.renderer.tooltips[&1].0, Point::new(9.0, 9.0));
	}

	#[test]
	fn test_reset_hides_tooltips() {
		let mut rig = Rig::new("0 1\n");
		rig.click(0, Modifiers::NONE);
		rig.ctl.pointer_enter_node(1);
		rig.ctl.reset(Some(&mut rig.renderer));
		assert!(rig.ctl.tooltips().is_empty());
		assert!(rig.renderer.tooltips.is_empty());
		assert_eq!(rig.ctl.state(), PointerState::Idle);
	}
}
