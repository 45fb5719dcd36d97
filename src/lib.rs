//! cines-graph: Interactive network explorer.
//!
//! This crate provides a WASM-based viewer that loads `source target` edge
//! lists, lays them out with a force simulation or a discrete layout, and lets
//! the user pin, drag and inspect nodes.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_meta::*;
use log::{Level, debug, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlAnchorElement, HtmlScriptElement, MouseEvent, Window};

pub mod components;

pub use components::network_graph::{
	CanvasGraphView, DataSource, Graph, GraphConfig, GraphError, GraphHandle, GraphView,
	HttpDataSource, ImageRef, LayoutAlgorithm, LayoutChoice, NetworkGraphCanvas, Node, NodeId,
	Point,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("cines-graph: logging initialized");
}

fn config_script_text() -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("graph-config")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Load configuration from a script element with id="graph-config".
/// Missing element or invalid JSON gives the defaults.
fn load_config() -> GraphConfig {
	let Some(json_text) = config_script_text() else {
		return GraphConfig::default();
	};
	match GraphConfig::from_json(&json_text) {
		Ok(config) => {
			info!(
				"cines-graph: loaded config with {} datasets",
				config.datasets.len()
			);
			config
		}
		Err(e) => {
			warn!("cines-graph: {}, using defaults", e);
			GraphConfig::default()
		}
	}
}

/// Hand a captured image to the browser as a download.
fn download(image: &ImageRef, filename: &str) -> Option<()> {
	let document = web_sys::window()?.document()?;
	let anchor: HtmlAnchorElement = document.create_element("a").ok()?.dyn_into().ok()?;
	anchor.set_href(image.as_url());
	anchor.set_download(filename);
	anchor.click();
	Some(())
}

fn options(values: Vec<String>) -> impl IntoView {
	values
		.into_iter()
		.map(|value| view! { <option value=value.clone()>{value.clone()}</option> })
		.collect_view()
}

/// Main application component.
/// Fetches the selected dataset and renders it with a toolbar.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = load_config();
	let first = |values: &[String]| values.first().cloned().unwrap_or_default();
	let dataset = RwSignal::new(first(&config.datasets));
	let node_color = RwSignal::new(first(&config.style.node_colors));
	let edge_color = RwSignal::new(first(&config.style.edge_colors));
	let layout = RwSignal::new(LayoutChoice::Force.to_string());
	let data = RwSignal::new(Graph::default());
	let handle = GraphHandle::default();

	let source = HttpDataSource::new(config.data_root.clone());
	Effect::new(move |_| {
		let name = dataset.get();
		if name.is_empty() {
			data.set(Graph::default());
			return;
		}
		let source = source.clone();
		spawn_local(async move {
			let result = source.fetch(&name).await;
			if dataset.get_untracked() != name {
				debug!("cines-graph: discarding {}, selection changed", name);
				return;
			}
			match result {
				Ok(text) => data.set(Graph::load(&text)),
				Err(e) => {
					warn!("cines-graph: {}", e);
					data.set(Graph::default());
				}
			}
		});
	});

	let fit_handle = handle.clone();
	let on_fit = move |_: MouseEvent| {
		if let Err(e) = fit_handle.zoom_to_fit() {
			warn!("cines-graph: {}", e);
		}
	};

	let shot_handle = handle.clone();
	let on_screenshot = move |_: MouseEvent| match shot_handle.screenshot() {
		Ok(image) => {
			if download(&image, "network.png").is_none() {
				warn!("cines-graph: could not start screenshot download");
			}
		}
		Err(e) => warn!("cines-graph: {}", e),
	};

	let layouts: Vec<String> = LayoutChoice::names().into_iter().map(String::from).collect();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Network Explorer" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<NetworkGraphCanvas
				data=data
				node_color=node_color
				edge_color=edge_color
				layout=layout
				config=config.clone()
				handle=handle.clone()
				fullscreen=true
			/>
			<div class="graph-overlay">
				<h1>"Network Explorer"</h1>
				<div class="toolbar">
					<select on:change=move |ev| dataset.set(event_target_value(&ev))>
						{options(config.datasets.clone())}
					</select>
					<select on:change=move |ev| node_color.set(event_target_value(&ev))>
						{options(config.style.node_colors.clone())}
					</select>
					<select on:change=move |ev| edge_color.set(event_target_value(&ev))>
						{options(config.style.edge_colors.clone())}
					</select>
					<select on:change=move |ev| layout.set(event_target_value(&ev))>
						{options(layouts)}
					</select>
					<button on:click=on_fit>"Zoom to Fit"</button>
					<button on:click=on_screenshot>"Screenshot"</button>
				</div>
				<p class="subtitle">
					"Click a node for its degree. Shift-click to pin. Drag nodes to move them."
				</p>
			</div>
		</div>
	}
}
