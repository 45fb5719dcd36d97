//! Graph view lifecycle and position ownership.
//!
//! A [`GraphView`] owns everything one canvas needs: the loaded graph, its
//! simulation and layout engines, the pointer state machine and the render
//! surface. The host calls [`initialize`](GraphView::initialize) once the
//! surface exists, one named handler per changed input, [`frame`](GraphView::frame)
//! from its animation loop, and [`dispose`](GraphView::dispose) on teardown.
//!
//! Position ownership: with the force layout selected the simulation writes
//! every node without an override; with a discrete layout selected the
//! simulation is suppressed and the layout writes once per switch. A drag
//! overrides both for its node until release.

use log::{debug, info, warn};

use super::adapter::{ImageRef, RenderAdapter};
use super::config::GraphConfig;
use super::error::GraphError;
use super::interaction::{InteractionController, Modifiers};
use super::layout::{LayoutAlgorithmProvider, LayoutChoice, LayoutEngine, apply_positions};
use super::physics::ForceGraphProvider;
use super::render::CanvasRenderer;
use super::simulation::{SimulationEngine, SimulationProvider};
use super::static_layout::StaticLayoutProvider;
use super::theme::GraphStyle;
use super::types::{Graph, NodeId, Point};
use super::viewport::{CameraTransform, ViewportController};

/// The view the canvas component drives.
pub type CanvasGraphView = GraphView<CanvasRenderer>;

fn surface<'a, R>(renderer: &'a mut Option<R>, operation: &'static str) -> Result<&'a mut R, GraphError> {
	renderer.as_mut().ok_or_else(|| {
		warn!("cines-graph: {} called without a render surface", operation);
		GraphError::UninitializedRenderer { operation }
	})
}

/// One graph view: data, engines, pointer state and render surface.
pub struct GraphView<R, S = ForceGraphProvider, L = StaticLayoutProvider> {
	config: GraphConfig,
	renderer: Option<R>,
	/// The dataset as loaded. Never mutated.
	source: Graph,
	/// Working copy every writer mutates in place.
	graph: Graph,
	generation: u64,
	simulation: SimulationEngine<S>,
	layout: LayoutEngine<L>,
	layout_choice: LayoutChoice,
	interaction: InteractionController,
	viewport: ViewportController,
	node_color: String,
	edge_color: String,
}

impl<R: RenderAdapter> GraphView<R> {
	/// A view with the stock physics and layout providers.
	pub fn new(config: GraphConfig) -> Self {
		let simulation = ForceGraphProvider::new(&config.simulation);
		let layout = StaticLayoutProvider::new(config.layout.clone());
		Self::with_providers(config, simulation, layout)
	}
}

impl<R, S, L> GraphView<R, S, L>
where
	R: RenderAdapter,
	S: SimulationProvider,
	L: LayoutAlgorithmProvider,
{
	/// A view with custom physics and layout providers. Nothing is drawn until [`initialize`](Self::initialize).
	pub fn with_providers(config: GraphConfig, simulation: S, layout: L) -> Self {
		let style = GraphStyle::from_config(&config.style);
		Self {
			simulation: SimulationEngine::new(simulation, config.simulation.clone()),
			layout: LayoutEngine::new(layout),
			viewport: ViewportController::new(config.viewport.clone()),
			config,
			renderer: None,
			source: Graph::default(),
			graph: Graph::default(),
			generation: 0,
			layout_choice: LayoutChoice::Force,
			interaction: InteractionController::new(),
			node_color: style.node_color,
			edge_color: style.edge_color,
		}
	}

	/// Attach the render surface and draw the current state on it.
	pub fn initialize(&mut self, mut renderer: R) {
		renderer.set_node_color(&self.node_color);
		renderer.set_edge_color(&self.edge_color);
		renderer.draw(&self.graph);
		self.renderer = Some(renderer);
		info!("cines-graph: view initialized");
	}

	/// Stop the simulation, end any drag, close tooltips and hand the surface
	/// back.
	pub fn dispose(&mut self) -> Option<R> {
		self.simulation.stop(false);
		if let Some(renderer) = self.renderer.as_mut() {
			self.interaction.pointer_release(&mut self.graph, renderer);
			renderer.end_drag();
		}
		self.interaction.reset(self.renderer.as_mut());
		debug!("cines-graph: view disposed");
		self.renderer.take()
	}

	/// Whether a render surface is attached.
	pub fn is_initialized(&self) -> bool {
		self.renderer.is_some()
	}

	/// Change the unpinned node colour and redraw.
	pub fn set_node_color(&mut self, color: &str) {
		self.node_color = color.to_string();
		if let Some(renderer) = self.renderer.as_mut() {
			renderer.set_node_color(color);
			renderer.draw(&self.graph);
		}
	}

	/// Change the edge colour and redraw.
	pub fn set_edge_color(&mut self, color: &str) {
		self.edge_color = color.to_string();
		if let Some(renderer) = self.renderer.as_mut() {
			renderer.set_edge_color(color);
			renderer.draw(&self.graph);
		}
	}

	/// Replace the dataset. The old graph and its tooltips are discarded and
	/// the new one is seeded by the selected layout. `None` shows nothing.
	pub fn set_data(&mut self, data: Option<&Graph>) {
		self.generation += 1;
		self.interaction.reset(self.renderer.as_mut());
		self.source = data.cloned().unwrap_or_default().with_generation(self.generation);
		self.graph = self.source.clone_for_editing();
		self.simulation.set_graph(&self.graph);
		debug!(
			"cines-graph: dataset generation {} with {} nodes",
			self.generation,
			self.graph.nodes().len()
		);
		self.apply_layout_choice();
		self.redraw();
	}

	/// Switch between the force layout and a discrete one. An unknown name is
	/// rejected and leaves the current mode untouched.
	pub fn set_layout(&mut self, name: &str) -> Result<(), GraphError> {
		let choice: LayoutChoice = name.parse().inspect_err(|e| warn!("cines-graph: {}", e))?;
		debug!("cines-graph: layout {:?} -> {:?}", self.layout_choice, choice);
		self.layout_choice = choice;
		self.apply_layout_choice();
		if let Some(renderer) = self.renderer.as_mut() {
			self.interaction.refresh_tooltips(&self.graph, renderer);
			renderer.draw(&self.graph);
		}
		Ok(())
	}

	fn apply_layout_choice(&mut self) {
		match self.layout_choice {
			LayoutChoice::Force => self.simulation.resume(),
			LayoutChoice::Discrete(algorithm) => {
				self.simulation.stop(true);
				let positions = self.layout.run(&self.graph, algorithm);
				let moved = apply_positions(&mut self.graph, &positions);
				debug!("cines-graph: {} moved {} nodes", algorithm, moved);
			}
		}
	}

	/// One animation frame: advance the simulation and, if it ticked, move
	/// tooltips and redraw. Returns whether a tick happened.
	pub fn frame(&mut self) -> bool {
		if !self.simulation.tick(&mut self.graph) {
			return false;
		}
		if let Some(renderer) = self.renderer.as_mut() {
			self.interaction.refresh_tooltips(&self.graph, renderer);
			renderer.draw(&self.graph);
		}
		true
	}

	/// Redraw without ticking, e.g. after a pan.
	pub fn redraw(&mut self) {
		if let Some(renderer) = self.renderer.as_mut() {
			renderer.draw(&self.graph);
		}
	}

	/// The pointer is over `node`.
	pub fn pointer_enter_node(&mut self, node: NodeId) {
		self.interaction.pointer_enter_node(node);
	}

	/// The pointer left the hovered node.
	pub fn pointer_leave_node(&mut self) {
		self.interaction.pointer_leave_node();
	}

	/// Click on the hovered node: toggles its tooltip, or its pin with shift.
	pub fn pointer_down(&mut self, modifiers: Modifiers) -> Result<bool, GraphError> {
		let renderer = surface(&mut self.renderer, "pointer_down")?;
		Ok(self
			.interaction
			.pointer_down(modifiers, &mut self.graph, &mut self.simulation, renderer))
	}

	/// Start dragging the hovered node. `pointer` is in world coordinates.
	pub fn pointer_grab(&mut self, pointer: Point) -> Result<bool, GraphError> {
		let renderer = surface(&mut self.renderer, "pointer_grab")?;
		Ok(self.interaction.pointer_grab(pointer, &self.graph, renderer))
	}

	/// Move the dragged node with the pointer.
	pub fn pointer_move(&mut self, pointer: Point) -> Result<bool, GraphError> {
		let renderer = surface(&mut self.renderer, "pointer_move")?;
		Ok(self
			.interaction
			.pointer_move(pointer, &mut self.graph, &mut self.simulation, renderer))
	}

	/// Drop the dragged node. It keeps its override only if pinned.
	pub fn pointer_release(&mut self) -> Result<bool, GraphError> {
		let renderer = surface(&mut self.renderer, "pointer_release")?;
		Ok(self.interaction.pointer_release(&mut self.graph, renderer))
	}

	/// Topmost node whose marker covers `p`. Markers smaller than
	/// `min_radius` are picked as if they had that radius.
	pub fn node_at(&self, p: Point, min_radius: f64) -> Option<NodeId> {
		self.graph
			.nodes()
			.iter()
			.rev()
			.find(|node| node.position().distance(p) <= GraphStyle::node_radius(node).max(min_radius))
			.map(|node| node.id)
	}

	/// Frame the whole graph. `Ok(None)` when there is nothing to frame.
	pub fn zoom_to_fit(&mut self) -> Result<Option<CameraTransform>, GraphError> {
		let renderer = surface(&mut self.renderer, "zoom_to_fit")?;
		let bounds = self.viewport.compute_fit_bounds(self.graph.nodes());
		let Some(camera) = self.viewport.fit_to_viewport(&bounds, &*renderer) else {
			return Ok(None);
		};
		renderer.set_camera(camera);
		renderer.draw(&self.graph);
		Ok(Some(camera))
	}

	/// Capture the canvas.
	pub fn screenshot(&mut self) -> Result<ImageRef, GraphError> {
		let renderer = surface(&mut self.renderer, "screenshot")?;
		self.viewport
			.export_snapshot(&*renderer)
			.inspect_err(|e| warn!("cines-graph: {}", e))
	}

	/// Configuration the view was built with.
	pub fn config(&self) -> &GraphConfig {
		&self.config
	}

	/// The working graph.
	pub fn graph(&self) -> &Graph {
		&self.graph
	}

	/// The dataset as loaded.
	pub fn source(&self) -> &Graph {
		&self.source
	}

	/// The selected layout.
	pub fn layout_choice(&self) -> LayoutChoice {
		self.layout_choice
	}

	/// The simulation driver.
	pub fn simulation(&self) -> &SimulationEngine<S> {
		&self.simulation
	}

	/// Pointer state and open tooltips.
	pub fn interaction(&self) -> &InteractionController {
		&self.interaction
	}

	/// The attached render surface.
	pub fn renderer(&self) -> Option<&R> {
		self.renderer.as_ref()
	}

	/// The attached render surface, mutably.
	pub fn renderer_mut(&mut self) -> Option<&mut R> {
		self.renderer.as_mut()
	}
}
