//! Canvas rendering for the network graph.
//!
//! Rendering uses three passes for correct z-ordering:
//! 1. Background (screen space)
//! 2. Edges, then nodes, then the drag ring (world space)
//! 3. Tooltips (screen space, so text stays legible at any zoom)

use std::collections::BTreeMap;
use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::adapter::{ImageRef, RenderAdapter};
use super::error::GraphError;
use super::interaction::Tooltip;
use super::theme::GraphStyle;
use super::types::{Graph, NodeId, Point};
use super::viewport::{Bounds, CameraTransform, zoom_and_center_from_bounds};

/// Scale limits for wheel zoom, matching log2 zoom levels -6 and 8.
const MIN_SCALE: f64 = 1.0 / 64.0;
const MAX_SCALE: f64 = 256.0;

/// Screen = world * k + (x, y).
#[derive(Clone, Debug)]
pub struct ViewTransform {
	/// Horizontal offset in pixels.
	pub x: f64,
	/// Vertical offset in pixels.
	pub y: f64,
	/// Scale factor.
	pub k: f64,
}

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
struct PanState {
	active: bool,
	start_x: f64,
	start_y: f64,
	transform_start_x: f64,
	transform_start_y: f64,
}

/// [`RenderAdapter`] over an HTML canvas 2D context.
pub struct CanvasRenderer {
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
	width: f64,
	height: f64,
	transform: ViewTransform,
	pan: PanState,
	style: GraphStyle,
	tooltips: BTreeMap<NodeId, (Point, String)>,
	dragging: Option<NodeId>,
}

impl CanvasRenderer {
	/// The world origin starts in the middle of the canvas.
	pub fn new(
		canvas: HtmlCanvasElement,
		ctx: CanvasRenderingContext2d,
		width: f64,
		height: f64,
		style: GraphStyle,
	) -> Self {
		Self {
			canvas,
			ctx,
			width,
			height,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			pan: PanState::default(),
			style,
			tooltips: BTreeMap::new(),
			dragging: None,
		}
	}

	/// Track the canvas size in CSS pixels.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Current pan and zoom.
	pub fn transform(&self) -> &ViewTransform {
		&self.transform
	}

	/// Canvas pixel to world coordinates.
	pub fn screen_to_world(&self, sx: f64, sy: f64) -> Point {
		Point::new(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	fn world_to_screen(&self, p: Point) -> (f64, f64) {
		(
			p.x * self.transform.k + self.transform.x,
			p.y * self.transform.k + self.transform.y,
		)
	}

	/// Smallest pick radius in world units, so tiny nodes stay clickable.
	pub fn min_hit_radius(&self) -> f64 {
		(self.style.min_node_px * 2.0) / self.transform.k
	}

	/// Start panning from a canvas pixel.
	pub fn begin_pan(&mut self, sx: f64, sy: f64) {
		self.pan = PanState {
			active: true,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	/// Returns whether a pan is in progress.
	pub fn pan_to(&mut self, sx: f64, sy: f64) -> bool {
		if !self.pan.active {
			return false;
		}
		self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
		self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
		true
	}

	/// Stop panning.
	pub fn end_pan(&mut self) {
		self.pan.active = false;
	}

	/// Zoom about a screen point, one wheel notch at a time.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(MIN_SCALE, MAX_SCALE);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	fn draw_background(&self) {
		self.ctx.set_fill_style_str(&self.style.background);
		self.ctx.fill_rect(0.0, 0.0, self.width, self.height);
	}

	fn draw_edges(&self, graph: &Graph) {
		let ctx = &self.ctx;
		ctx.set_stroke_style_str(&self.style.edge_color);
		ctx.set_line_width(self.style.edge_width / self.transform.k);
		ctx.begin_path();
		for edge in graph.edges() {
			let (s, t) = graph.endpoints(edge);
			if s.position().distance(t.position()) < 0.001 {
				continue;
			}
			ctx.move_to(s.x, s.y);
			ctx.line_to(t.x, t.y);
		}
		ctx.stroke();
	}

	fn draw_nodes(&self, graph: &Graph) {
		let min_radius = self.style.min_node_px / self.transform.k;
		for node in graph.nodes() {
			let radius = GraphStyle::node_radius(node).max(min_radius);
			self.ctx.begin_path();
			let _ = self.ctx.arc(node.x, node.y, radius, 0.0, 2.0 * PI);
			self.ctx.set_fill_style_str(self.style.node_fill(node));
			self.ctx.fill();
		}
	}

	fn draw_drag_ring(&self, graph: &Graph) {
		let Some(node) = self.dragging.and_then(|id| graph.node(id)) else {
			return;
		};
		let k = self.transform.k;
		let radius = GraphStyle::node_radius(node).max(self.style.min_node_px / k) + 3.0 / k;
		let _ = self.ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(3.0 / k),
			&JsValue::from_f64(2.0 / k),
		));
		self.ctx.begin_path();
		let _ = self.ctx.arc(node.x, node.y, radius, 0.0, 2.0 * PI);
		self.ctx.set_stroke_style_str(&self.style.drag_ring.to_css());
		self.ctx.set_line_width(1.5 / k);
		self.ctx.stroke();
		let _ = self.ctx.set_line_dash(&js_sys::Array::new());
	}

	fn draw_tooltips(&self) {
		let style = &self.style.tooltip;
		let ctx = &self.ctx;
		ctx.set_font(&style.font);
		for (anchor, text) in self.tooltips.values() {
			let (sx, sy) = self.world_to_screen(*anchor);
			let text_width = ctx.measure_text(text).map(|m| m.width()).unwrap_or(0.0);
			let (bx, by) = (sx + style.offset, sy - style.offset - 16.0);
			let (bw, bh) = (text_width + style.padding * 2.0, 12.0 + style.padding * 2.0);

			ctx.set_fill_style_str(&style.background.to_css());
			ctx.fill_rect(bx, by, bw, bh);
			ctx.set_stroke_style_str(&style.border.to_css());
			ctx.set_line_width(1.0);
			ctx.stroke_rect(bx, by, bw, bh);

			ctx.set_fill_style_str(&style.text.to_css());
			let _ = ctx.fill_text(text, bx + style.padding, by + bh - style.padding - 2.0);
		}
	}
}

impl RenderAdapter for CanvasRenderer {
	fn draw(&mut self, graph: &Graph) {
		self.draw_background();

		self.ctx.save();
		let _ = self.ctx.translate(self.transform.x, self.transform.y);
		let _ = self.ctx.scale(self.transform.k, self.transform.k);
		self.draw_edges(graph);
		self.draw_nodes(graph);
		self.draw_drag_ring(graph);
		self.ctx.restore();

		self.draw_tooltips();
	}

	fn set_node_color(&mut self, color: &str) {
		self.style.node_color = color.to_string();
	}

	fn set_edge_color(&mut self, color: &str) {
		self.style.edge_color = color.to_string();
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
		self.pan.active = false;
		self.dragging = Some(node);
	}

	fn end_drag(&mut self) {
		self.dragging = None;
	}

	fn camera_for_bounds(&self, bounds: &Bounds) -> CameraTransform {
		zoom_and_center_from_bounds(bounds, self.width, self.height)
	}

	fn set_camera(&mut self, camera: CameraTransform) {
		let k = camera.zoom.exp2();
		self.transform = ViewTransform {
			x: self.width / 2.0 - camera.center.x * k,
			y: self.height / 2.0 - camera.center.y * k,
			k,
		};
	}

	fn screenshot(&self) -> Result<ImageRef, GraphError> {
		self.canvas
			.to_data_url()
			.map(ImageRef)
			.map_err(|e| GraphError::Screenshot(format!("{:?}", e)))
	}
}
