//! The drawing-surface seam.
//!
//! The engine never touches a canvas directly. Everything it needs from the
//! surface (drawing, tooltips, drag registration, camera math, screenshots)
//! goes through [`RenderAdapter`].

use super::error::GraphError;
use super::interaction::Tooltip;
use super::types::{Graph, NodeId, Point};
use super::viewport::{Bounds, CameraTransform};

/// Reference to a captured image, as a `data:` URL the caller can download.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageRef(pub String);

impl ImageRef {
	/// The `data:` URL.
	pub fn as_url(&self) -> &str {
		&self.0
	}
}

/// Surface the graph is drawn on.
pub trait RenderAdapter {
	/// Redraw nodes and edges from the current positions.
	fn draw(&mut self, graph: &Graph);

	/// CSS colour for unpinned nodes.
	fn set_node_color(&mut self, color: &str);

	/// CSS colour for edges.
	fn set_edge_color(&mut self, color: &str);

	/// Open a tooltip at its anchor.
	fn show_tooltip(&mut self, tooltip: &Tooltip);

	/// Re-anchor an open tooltip.
	fn move_tooltip(&mut self, node: NodeId, anchor: Point);

	/// Close the tooltip for `node`, if open.
	fn hide_tooltip(&mut self, node: NodeId);

	/// Register the exclusive drag action for `node`.
	fn begin_drag(&mut self, node: NodeId);

	/// Deregister the drag action, if any.
	fn end_drag(&mut self);

	/// Camera that shows `bounds` edge to edge on this surface.
	fn camera_for_bounds(&self, bounds: &Bounds) -> CameraTransform;

	/// Move the camera.
	fn set_camera(&mut self, camera: CameraTransform);

	/// Capture the surface as an image.
	fn screenshot(&self) -> Result<ImageRef, GraphError>;
}
