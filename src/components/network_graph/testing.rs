//! Test doubles for the render surface and the physics stepper.

use std::collections::BTreeMap;

use super::adapter::{ImageRef, RenderAdapter};
use super::error::GraphError;
use super::interaction::Tooltip;
use super::simulation::{ForceSpec, SimulationProvider};
use super::types::{Edge, Graph, Node, NodeId, Point};
use super::viewport::{Bounds, CameraTransform, zoom_and_center_from_bounds};

/// Records what the engine asked the surface to do. Behaves like an 800 x 600 canvas.
#[derive(Debug)]
pub struct RecordingRenderer {
	pub width: f64,
	pub height: f64,
	pub draws: usize,
	pub node_color: Option<String>,
	pub edge_color: Option<String>,
	pub tooltips: BTreeMap<NodeId, (Point, String)>,
	pub dragging: Option<NodeId>,
	pub camera: Option<CameraTransform>,
	pub fail_screenshot: bool,
}

impl Default for RecordingRenderer {
	fn default() -> Self {
		Self {
			width: 800.0,
			height: 600.0,
			draws: 0,
			node_color: None,
			edge_color: None,
			tooltips: BTreeMap::new(),
			dragging: None,
			camera: None,
			fail_screenshot: false,
		}
	}
}

impl RenderAdapter for RecordingRenderer {
	fn draw(&mut self, _graph: &Graph) {
		self.draws += 1;
	}

	fn set_node_color(&mut self, color: &str) {
		self.node_color = Some(color.to_string());
	}

	fn set_edge_color(&mut self, color: &str) {
		self.edge_color = Some(color.to_string());
	}

	fn show_tooltip(&mut self, tooltip: &Tooltip) {
		self.tooltips
			.insert(tooltip.node, (tooltip.anchor, tooltip.text.clone()));
	}

	fn move_tooltip(&mut self, node: NodeId, anchor: Point) {
		if let Some(entry) = self.tooltips.get_mut(&node) {
			entry.0 = anchor;
		}
	}

	fn hide_tooltip(&mut self, node: NodeId) {
		self.tooltips.remove(&node);
	}

	fn begin_drag(&mut self, node: NodeId) {
		self.dragging = Some(node);
	}

	fn end_drag(&mut self) {
		self.dragging = None;
	}

	fn camera_for_bounds(&self, bounds: &Bounds) -> CameraTransform {
		zoom_and_center_from_bounds(bounds, self.width, self.height)
	}

	fn set_camera(&mut self, camera: CameraTransform) {
		self.camera = Some(camera);
	}

	fn screenshot(&self) -> Result<ImageRef, GraphError> {
		if self.fail_screenshot {
			return Err(GraphError::Screenshot("surface lost".into()));
		}
		Ok(ImageRef("data:image/png;base64,iVBORw0KGgo=".into()))
	}
}

/// Moves every free body by `(+1, +1)` per step and holds fixed bodies still.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
	pub steps: usize,
	pub bodies: usize,
	pub forces: Option<ForceSpec>,
}

impl SimulationProvider for ScriptedProvider {
	fn set_graph(&mut self, nodes: &[Node], _edges: &[Edge]) {
		self.bodies = nodes.len();
	}

	fn configure(&mut self, forces: &ForceSpec) {
		self.forces = Some(forces.clone());
	}

	fn step(&mut self, nodes: &[Node], _alpha: f64) -> Vec<Point> {
		self.steps += 1;
		nodes
			.iter()
			.map(|n| n.fixed().unwrap_or_else(|| n.position() + Point::new(1.0, 1.0)))
			.collect()
	}
}
