//! Engine configuration.
//!
//! Every group has defaults matching the stock explorer, so the host page only
//! needs to embed the values it wants to change:
//!
//! ```json
//! { "simulation": { "forces": { "link_distance": 5.0 } }, "datasets": ["karate.dat"] }
//! ```

use serde::Deserialize;

use super::error::GraphError;
use super::simulation::ForceSpec;

/// Decay and integration settings for the continuous simulation.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
	/// Alpha set by every kick.
	pub kick_alpha: f64,
	/// Ticking stops once alpha falls below this.
	pub alpha_min: f64,
	/// Fraction of the distance to `alpha_target` covered per tick.
	pub alpha_decay: f64,
	/// Value alpha decays towards.
	pub alpha_target: f64,
	/// Velocity damping applied by the physics provider.
	pub velocity_decay: f64,
	/// Seconds advanced per simulation tick.
	pub frame_dt: f64,
	/// Forces the provider applies.
	pub forces: ForceSpec,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		Self {
			kick_alpha: 0.3,
			alpha_min: 0.001,
			alpha_decay: 1.0 - 0.001_f64.powf(1.0 / 300.0),
			alpha_target: 0.0,
			velocity_decay: 0.4,
			frame_dt: 0.016,
			forces: ForceSpec::default(),
		}
	}
}

/// Fixed parameters for the discrete layout algorithms.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
	/// Half-width of the square box used by `random` and `cose`.
	pub bound: f64,
	/// Radius of the `circle` layout.
	pub circle_radius: f64,
	/// Distance between `grid` cells, also the base `breadthfirst` spacing.
	pub grid_spacing: f64,
	/// Radius step between concentric rings.
	pub concentric_spacing: f64,
	/// Root node id for `breadthfirst`.
	pub breadthfirst_root: i64,
	/// Multiplier on the base breadthfirst spacing.
	pub breadthfirst_spacing: f64,
	/// Passes of the static force-directed layout.
	pub cose_iterations: usize,
	/// Seed for `random` and the `cose` starting positions.
	pub seed: u64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			bound: 80.0,
			circle_radius: 80.0,
			grid_spacing: 10.0,
			concentric_spacing: 10.0,
			breadthfirst_root: 0,
			breadthfirst_spacing: 4.0,
			cose_iterations: 300,
			seed: 1,
		}
	}
}

/// Camera limits and the fit margin.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
	/// Share of the surface the fitted graph may cover.
	pub fill_fraction: f64,
	/// Zoom levels are log2 scale factors.
	pub min_zoom: f64,
	/// Upper zoom limit.
	pub max_zoom: f64,
	/// Half-extent of the world the camera centre may move in.
	pub max_bounds: f64,
}

impl Default for ViewportConfig {
	fn default() -> Self {
		Self {
			fill_fraction: 0.8,
			min_zoom: -6.0,
			max_zoom: 8.0,
			max_bounds: 100.0,
		}
	}
}

/// Colour choices offered by the toolbar.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
	/// Node colour choices, the first is the default.
	pub node_colors: Vec<String>,
	/// Edge colour choices, the first is the default.
	pub edge_colors: Vec<String>,
	/// Fill for pinned nodes.
	pub pinned_color: String,
	/// Canvas background.
	pub background: String,
}

impl Default for StyleConfig {
	fn default() -> Self {
		Self {
			node_colors: vec!["firebrick".into(), "seagreen".into(), "skyblue".into()],
			edge_colors: vec!["lemonchiffon".into(), "teal".into(), "orchid".into()],
			pinned_color: "blue".into(),
			background: "#1a1a2e".into(),
		}
	}
}

/// Complete configuration for one graph view.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
	/// Continuous simulation settings.
	pub simulation: SimulationConfig,
	/// Discrete layout parameters.
	pub layout: LayoutConfig,
	/// Camera limits.
	pub viewport: ViewportConfig,
	/// Colours.
	pub style: StyleConfig,
	/// Dataset names offered for selection.
	pub datasets: Vec<String>,
	/// URL prefix datasets are fetched from.
	pub data_root: String,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			simulation: SimulationConfig::default(),
			layout: LayoutConfig::default(),
			viewport: ViewportConfig::default(),
			style: StyleConfig::default(),
			datasets: vec!["network.dat".into()],
			data_root: "/data".into(),
		}
	}
}

impl GraphConfig {
	/// Parse a JSON document; absent keys keep their defaults.
	pub fn from_json(text: &str) -> Result<Self, GraphError> {
		serde_json::from_str(text).map_err(|e| GraphError::Config(e.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_partial_json_keeps_defaults() {
		let config = GraphConfig::from_json(
			r#"{ "simulation": { "forces": { "link_distance": 5.0 } }, "datasets": ["a.dat"] }"#,
		)
		.unwrap();
		assert_eq!(config.simulation.forces.link_distance, 5.0);
		assert_eq!(config.simulation.forces.charge_strength, -2.0);
		assert_eq!(config.simulation.kick_alpha, 0.3);
		assert_eq!(config.datasets, vec!["a.dat".to_string()]);
		assert_eq!(config.viewport.fill_fraction, 0.8);
	}

	#[test]
	fn test_invalid_json_is_a_config_error() {
		let err = GraphConfig::from_json("{ nope").unwrap_err();
		assert!(matches!(err, GraphError::Config(_)));
	}

	#[test]
	fn test_default_alpha_decay_reaches_min_in_300_ticks() {
		let config = SimulationConfig::default();
		let mut alpha = 1.0;
		for _ in 0..300 {
			alpha += (config.alpha_target - alpha) * config.alpha_decay;
		}
		assert!((alpha - config.alpha_min).abs() < 1e-9);
	}
}
