//! Visual style of the canvas.
//!
//! Node and edge colours are CSS colour strings chosen from the toolbar; the
//! fixed decorations (tooltip box, drag ring) are RGBA values.

use super::config::StyleConfig;
use super::types::Node;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red.
	pub r: u8,
	/// Green.
	pub g: u8,
	/// Blue.
	pub b: u8,
	/// Alpha in `[0, 1]`.
	pub a: f64,
}

impl Color {
	/// Opaque colour.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Colour with alpha.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Same colour, different alpha.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Hex when opaque, `rgba(...)` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Tooltip box drawn next to its node.
#[derive(Clone, Debug)]
pub struct TooltipStyle {
	/// Box fill.
	pub background: Color,
	/// Box outline.
	pub border: Color,
	/// Text colour.
	pub text: Color,
	/// CSS font shorthand.
	pub font: String,
	/// Padding around the text, in pixels.
	pub padding: f64,
	/// Gap between the node and the box, in pixels.
	pub offset: f64,
}

impl Default for TooltipStyle {
	fn default() -> Self {
		Self {
			background: Color::rgba(20, 20, 35, 0.9),
			border: Color::rgba(255, 255, 255, 0.3),
			text: Color::rgb(240, 240, 240),
			font: "12px sans-serif".into(),
			padding: 4.0,
			offset: 8.0,
		}
	}
}

/// Everything the canvas needs to paint a frame.
#[derive(Clone, Debug)]
pub struct GraphStyle {
	/// Canvas background.
	pub background: String,
	/// Fill for unpinned nodes.
	pub node_color: String,
	/// Edge stroke.
	pub edge_color: String,
	/// Fill for pinned nodes.
	pub pinned_color: String,
	/// Edge stroke width in pixels, independent of zoom.
	pub edge_width: f64,
	/// Nodes are never drawn smaller than this, in pixels.
	pub min_node_px: f64,
	/// Dashed ring around the dragged node.
	pub drag_ring: Color,
	/// Tooltip box style.
	pub tooltip: TooltipStyle,
}

impl GraphStyle {
	/// Start from the first configured node and edge colours.
	pub fn from_config(config: &StyleConfig) -> Self {
		let first = |colors: &[String], fallback: &str| {
			colors.first().cloned().unwrap_or_else(|| fallback.to_string())
		};
		Self {
			background: config.background.clone(),
			node_color: first(&config.node_colors, "firebrick"),
			edge_color: first(&config.edge_colors, "lemonchiffon"),
			pinned_color: config.pinned_color.clone(),
			edge_width: 1.0,
			min_node_px: 2.0,
			drag_ring: Color::rgba(255, 255, 255, 0.8),
			tooltip: TooltipStyle::default(),
		}
	}

	/// Fill for a node: the pinned colour wins over the selected node colour.
	pub fn node_fill(&self, node: &Node) -> &str {
		if node.is_pinned() {
			&self.pinned_color
		} else {
			&self.node_color
		}
	}

	/// Marker radius in world units.
	pub fn node_radius(node: &Node) -> f64 {
		(node.degree as f64).sqrt()
	}
}

impl Default for GraphStyle {
	fn default() -> Self {
		Self::from_config(&StyleConfig::default())
	}
}
