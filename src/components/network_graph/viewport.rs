//! Fitting the camera to the graph.
//!
//! Zoom levels are log2 scale factors: zoom `0` draws one world unit per
//! pixel, each step up doubles the scale.

use log::debug;

use super::adapter::{ImageRef, RenderAdapter};
use super::config::ViewportConfig;
use super::error::GraphError;
use super::types::{Node, Point};

/// Axis-aligned box in world coordinates. `bottom` is the smallest `y`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	/// Smallest `x`.
	pub left: f64,
	/// Largest `x`.
	pub right: f64,
	/// Smallest `y`.
	pub bottom: f64,
	/// Largest `y`.
	pub top: f64,
}

impl Bounds {
	/// The bound of nothing. Never feed it to a camera.
	pub const EMPTY: Bounds = Bounds {
		left: f64::INFINITY,
		right: f64::NEG_INFINITY,
		bottom: f64::INFINITY,
		top: f64::NEG_INFINITY,
	};

	/// True for [`Bounds::EMPTY`] and anything else inverted.
	pub fn is_empty(&self) -> bool {
		self.left > self.right || self.bottom > self.top
	}

	/// Horizontal extent.
	pub fn width(&self) -> f64 {
		self.right - self.left
	}

	/// Vertical extent.
	pub fn height(&self) -> f64 {
		self.top - self.bottom
	}

	/// Middle of the box.
	pub fn center(&self) -> Point {
		Point::new((self.left + self.right) / 2.0, (self.bottom + self.top) / 2.0)
	}

	fn include(self, p: Point) -> Bounds {
		Bounds {
			left: self.left.min(p.x),
			right: self.right.max(p.x),
			bottom: self.bottom.min(p.y),
			top: self.top.max(p.y),
		}
	}
}

/// Camera centre and log2 zoom.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraTransform {
	/// World point shown in the middle of the surface.
	pub center: Point,
	/// `log2` of the world-to-pixel scale.
	pub zoom: f64,
}

impl Default for CameraTransform {
	fn default() -> Self {
		Self {
			center: Point::ORIGIN,
			zoom: 0.0,
		}
	}
}

/// Camera that makes `bounds` exactly fill a `width` x `height` surface.
///
/// A zero-sized surface gets zoom `0`; a zero-sized box gets an infinite zoom
/// that the caller is expected to clamp.
pub fn zoom_and_center_from_bounds(bounds: &Bounds, width: f64, height: f64) -> CameraTransform {
	let center = bounds.center();
	if width <= 0.0 || height <= 0.0 {
		return CameraTransform { center, zoom: 0.0 };
	}
	let scale = (width / bounds.width()).min(height / bounds.height());
	CameraTransform {
		center,
		zoom: scale.log2(),
	}
}

/// Zoom-to-fit and snapshot export for one view.
pub struct ViewportController {
	config: ViewportConfig,
}

impl ViewportController {
	/// Controller with the given camera limits.
	pub fn new(config: ViewportConfig) -> Self {
		Self { config }
	}

	/// Bounding box of the current node positions, [`Bounds::EMPTY`] for no nodes.
	pub fn compute_fit_bounds(&self, nodes: &[Node]) -> Bounds {
		nodes
			.iter()
			.fold(Bounds::EMPTY, |bounds, node| bounds.include(node.position()))
	}

	/// Camera for `bounds` with the fill-fraction margin applied, clamped to
	/// the zoom and world limits. `None` for an empty bound.
	pub fn fit_to_viewport<R: RenderAdapter>(
		&self,
		bounds: &Bounds,
		renderer: &R,
	) -> Option<CameraTransform> {
		if bounds.is_empty() {
			debug!("cines-graph: nothing to fit, graph is empty");
			return None;
		}
		let raw = renderer.camera_for_bounds(bounds);
		let limit = self.config.max_bounds;
		let camera = CameraTransform {
			center: Point::new(raw.center.x.clamp(-limit, limit), raw.center.y.clamp(-limit, limit)),
			zoom: (raw.zoom + self.config.fill_fraction.log2())
				.clamp(self.config.min_zoom, self.config.max_zoom),
		};
		debug!(
			"cines-graph: fit camera centre ({:.2}, {:.2}) zoom {:.3}",
			camera.center.x, camera.center.y, camera.zoom
		);
		Some(camera)
	}

	/// Capture the surface. The caller triggers the download.
	pub fn export_snapshot<R: RenderAdapter>(&self, renderer: &R) -> Result<ImageRef, GraphError> {
		renderer.screenshot()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::network_graph::testing::RecordingRenderer;
	use crate::components::network_graph::types::Graph;

	fn controller() -> ViewportController {
		ViewportController::new(ViewportConfig::default())
	}

	#[test]
	fn test_empty_node_set_gives_degenerate_bounds() {
		let bounds = controller().compute_fit_bounds(&[]);
		assert_eq!(bounds, Bounds::EMPTY);
		assert!(bounds.is_empty());
		assert!(controller().fit_to_viewport(&bounds, &RecordingRenderer::default()).is_none());
	}

	#[test]
	fn test_bounds_cover_every_node() {
		let mut graph = Graph::load("0 1\n1 2\n");
		let spots = [Point::new(-3.0, 4.0), Point::new(5.0, -1.0), Point::new(0.0, 9.0)];
		for (node, p) in graph.nodes_mut().iter_mut().zip(spots) {
			node.set_position(p);
		}
		let bounds = controller().compute_fit_bounds(graph.nodes());
		assert_eq!(
			bounds,
			Bounds {
				left: -3.0,
				right: 5.0,
				bottom: -1.0,
				top: 9.0
			}
		);
		assert_eq!(bounds.center(), Point::new(1.0, 4.0));
	}

	#[test]
	fn test_fit_applies_fill_fraction() {
		let bounds = Bounds {
			left: -50.0,
			right: 50.0,
			bottom: -25.0,
			top: 25.0,
		};
		// 800 x 600 surface: width limits the scale to 8, i.e. zoom 3.
		let camera = controller()
			.fit_to_viewport(&bounds, &RecordingRenderer::default())
			.unwrap();
		assert!((camera.zoom - (3.0 + 0.8_f64.log2())).abs() < 1e-12);
		assert_eq!(camera.center, Point::ORIGIN);
	}

	#[test]
	fn test_single_point_clamps_to_max_zoom() {
		let bounds = Bounds {
			left: 2.0,
			right: 2.0,
			bottom: 2.0,
			top: 2.0,
		};
		let camera = controller()
			.fit_to_viewport(&bounds, &RecordingRenderer::default())
			.unwrap();
		assert_eq!(camera.zoom, 8.0);
		assert_eq!(camera.center, Point::new(2.0, 2.0));
	}

	#[test]
	fn test_center_is_clamped_to_world() {
		let bounds = Bounds {
			left: 500.0,
			right: 600.0,
			bottom: -700.0,
			top: -650.0,
		};
		let camera = controller()
			.fit_to_viewport(&bounds, &RecordingRenderer::default())
			.unwrap();
		assert_eq!(camera.center, Point::new(100.0, -100.0));
	}

	#[test]
	fn test_zero_surface_does_not_produce_nan() {
		let bounds = Bounds {
			left: 0.0,
			right: 1.0,
			bottom: 0.0,
			top: 1.0,
		};
		let camera = zoom_and_center_from_bounds(&bounds, 0.0, 0.0);
		assert_eq!(camera.zoom, 0.0);
	}
}
