//! Leptos component hosting a [`GraphView`](super::state::GraphView) on a canvas.
//!
//! The component creates the canvas, builds the view once the element is
//! mounted, forwards each reactive input to its named handler, and runs the
//! `requestAnimationFrame` loop that calls [`frame`](super::state::GraphView::frame).
//! Mouse input is translated into the view's pointer events; presses on empty
//! canvas pan instead.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::adapter::ImageRef;
use super::config::GraphConfig;
use super::error::GraphError;
use super::interaction::Modifiers;
use super::render::CanvasRenderer;
use super::state::CanvasGraphView;
use super::theme::GraphStyle;
use super::types::{Graph, NodeId};
use super::viewport::CameraTransform;

/// A press that moves less than this many pixels is a click, not a drag.
const CLICK_SLOP: f64 = 3.0;

/// Shared access to a mounted view, for controls outside the canvas.
#[derive(Clone, Default)]
pub struct GraphHandle(Rc<RefCell<Option<CanvasGraphView>>>);

impl GraphHandle {
	fn with_view<T>(
		&self,
		operation: &'static str,
		f: impl FnOnce(&mut CanvasGraphView) -> Result<T, GraphError>,
	) -> Result<T, GraphError> {
		match self.0.borrow_mut().as_mut() {
			Some(view) => f(view),
			None => Err(GraphError::UninitializedRenderer { operation }),
		}
	}

	/// See [`GraphView::zoom_to_fit`](super::state::GraphView::zoom_to_fit).
	pub fn zoom_to_fit(&self) -> Result<Option<CameraTransform>, GraphError> {
		self.with_view("zoom_to_fit", |view| view.zoom_to_fit())
	}

	/// See [`GraphView::screenshot`](super::state::GraphView::screenshot).
	pub fn screenshot(&self) -> Result<ImageRef, GraphError> {
		self.with_view("screenshot", |view| view.screenshot())
	}
}

/// A mouse press on a node, waiting to become a click or a drag.
#[derive(Clone, Copy, Debug)]
struct Press {
	node: NodeId,
	x: f64,
	y: f64,
	modifiers: Modifiers,
	moved: bool,
}

fn canvas_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

fn report(result: Result<bool, GraphError>) {
	if let Err(e) = result {
		warn!("cines-graph: {}", e);
	}
}

/// Renders an interactive network on a canvas element.
///
/// `layout` takes `"force"` or one of the discrete layout names. Set
/// `fullscreen = true` to fill the window and follow its size; otherwise the
/// canvas sizes itself to its parent.
#[component]
pub fn NetworkGraphCanvas(
	/// The loaded dataset. Each new value replaces the graph.
	#[prop(into)]
	data: Signal<Graph>,
	/// CSS colour of unpinned nodes.
	#[prop(into)]
	node_color: Signal<String>,
	/// CSS colour of edges.
	#[prop(into)]
	edge_color: Signal<String>,
	/// Selected layout name.
	#[prop(into)]
	layout: Signal<String>,
	/// Engine configuration, read once on mount.
	#[prop(optional)]
	config: GraphConfig,
	/// Receives the mounted view for outside controls.
	#[prop(optional)]
	handle: GraphHandle,
	/// Fill the window instead of the parent element.
	#[prop(default = false)]
	fullscreen: bool,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let view = handle.0.clone();
	let press: Rc<RefCell<Option<Press>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (view_init, animate_init, resize_cb_init) = (view.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			canvas
				.parent_element()
				.map(|p| (p.client_width() as f64, p.client_height() as f64))
				.unwrap_or((800.0, 600.0))
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("cines-graph: canvas has no 2d context");
			return;
		};

		let renderer = CanvasRenderer::new(
			canvas.clone(),
			ctx,
			w,
			h,
			GraphStyle::from_config(&config.style),
		);
		let mut graph_view = CanvasGraphView::new(config.clone());
		graph_view.set_node_color(&node_color.get_untracked());
		graph_view.set_edge_color(&edge_color.get_untracked());
		if let Err(e) = graph_view.set_layout(&layout.get_untracked()) {
			warn!("cines-graph: {}", e);
		}
		graph_view.initialize(renderer);
		graph_view.set_data(Some(&data.get_untracked()));
		*view_init.borrow_mut() = Some(graph_view);

		if fullscreen {
			let (view_resize, canvas_resize) = (view_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut v) = *view_resize.borrow_mut() {
					if let Some(r) = v.renderer_mut() {
						r.resize(nw, nh);
					}
					v.redraw();
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (view_anim, animate_inner, canvas_anim) =
			(view_init.clone(), animate_init.clone(), canvas.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			// Unmounted: release the surface and let the loop end.
			if !canvas_anim.is_connected() {
				if let Some(mut v) = view_anim.borrow_mut().take() {
					v.dispose();
				}
				return;
			}
			if let Some(ref mut v) = *view_anim.borrow_mut() {
				v.frame();
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				if let Some(win) = web_sys::window() {
					let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
				}
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	// The mount effect above applies the initial values, so each of these
	// only forwards later changes.
	let view_data = view.clone();
	Effect::new(move |ran: Option<()>| {
		let graph = data.get();
		if ran.is_some() {
			if let Some(ref mut v) = *view_data.borrow_mut() {
				v.set_data(Some(&graph));
			}
		}
	});

	let view_node_color = view.clone();
	Effect::new(move |ran: Option<()>| {
		let color = node_color.get();
		if ran.is_some() {
			if let Some(ref mut v) = *view_node_color.borrow_mut() {
				v.set_node_color(&color);
			}
		}
	});

	let view_edge_color = view.clone();
	Effect::new(move |ran: Option<()>| {
		let color = edge_color.get();
		if ran.is_some() {
			if let Some(ref mut v) = *view_edge_color.borrow_mut() {
				v.set_edge_color(&color);
			}
		}
	});

	let view_layout = view.clone();
	Effect::new(move |ran: Option<()>| {
		let name = layout.get();
		if ran.is_some() {
			if let Some(ref mut v) = *view_layout.borrow_mut() {
				if let Err(e) = v.set_layout(&name) {
					warn!("cines-graph: {}", e);
				}
			}
		}
	});

	let (view_md, press_md) = (view.clone(), press.clone());
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		let mut guard = view_md.borrow_mut();
		let Some(v) = guard.as_mut() else {
			return;
		};
		let Some(renderer) = v.renderer() else {
			return;
		};
		let world = renderer.screen_to_world(x, y);
		let hit = v.node_at(world, renderer.min_hit_radius());

		match hit {
			Some(node) => {
				v.pointer_enter_node(node);
				report(v.pointer_grab(world));
				*press_md.borrow_mut() = Some(Press {
					node,
					x,
					y,
					modifiers: Modifiers {
						shift: ev.shift_key(),
					},
					moved: false,
				});
			}
			None => {
				if let Some(r) = v.renderer_mut() {
					r.begin_pan(x, y);
				}
			}
		}
	};

	let (view_mm, press_mm) = (view.clone(), press.clone());
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		let mut guard = view_mm.borrow_mut();
		let Some(v) = guard.as_mut() else {
			return;
		};
		let Some(renderer) = v.renderer() else {
			return;
		};
		let world = renderer.screen_to_world(x, y);
		let min_radius = renderer.min_hit_radius();

		if let Some(ref mut p) = *press_mm.borrow_mut() {
			if !p.moved && (x - p.x).hypot(y - p.y) < CLICK_SLOP {
				return;
			}
			p.moved = true;
			report(v.pointer_move(world));
			return;
		}

		let panned = v.renderer_mut().map(|r| r.pan_to(x, y)).unwrap_or(false);
		if panned {
			v.redraw();
			return;
		}

		match v.node_at(world, min_radius) {
			Some(node) => v.pointer_enter_node(node),
			None => v.pointer_leave_node(),
		}
	};

	let (view_mu, press_mu) = (view.clone(), press.clone());
	let on_mouseup = move |_: MouseEvent| {
		let mut guard = view_mu.borrow_mut();
		let Some(v) = guard.as_mut() else {
			return;
		};
		if let Some(p) = press_mu.borrow_mut().take() {
			report(v.pointer_release());
			if !p.moved {
				v.pointer_enter_node(p.node);
				report(v.pointer_down(p.modifiers));
			}
			v.redraw();
		}
		if let Some(r) = v.renderer_mut() {
			r.end_pan();
		}
	};

	let (view_ml, press_ml) = (view.clone(), press.clone());
	let on_mouseleave = move |_: MouseEvent| {
		let mut guard = view_ml.borrow_mut();
		let Some(v) = guard.as_mut() else {
			return;
		};
		if press_ml.borrow_mut().take().is_some() {
			report(v.pointer_release());
			v.redraw();
		}
		v.pointer_leave_node();
		if let Some(r) = v.renderer_mut() {
			r.end_pan();
		}
	};

	let view_wh = view.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		let mut guard = view_wh.borrow_mut();
		let Some(v) = guard.as_mut() else {
			return;
		};
		if let Some(r) = v.renderer_mut() {
			r.zoom_at(x, y, ev.delta_y());
		}
		v.redraw();
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="network-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
