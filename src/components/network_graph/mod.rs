//! Interactive network graph engine and its canvas host.
//!
//! A network is loaded from `source target` text and explored on a canvas:
//! - Continuous force simulation, or one of six discrete layouts
//! - Node pinning (shift-click), dragging and degree tooltips (click)
//! - Pan, wheel zoom, zoom-to-fit and screenshots
//!
//! Three writers compete for node positions: the simulation, a discrete
//! layout pass and the pointer. [`GraphView`] settles which one owns each
//! node at any moment; see [`state`] for the rules.
//!
//! # Example
//!
//! ```ignore
//! use cines_graph::{Graph, NetworkGraphCanvas};
//!
//! let data = Graph::load("0 1\n1 2\n2 0\n");
//!
//! view! {
//!     <NetworkGraphCanvas
//!         data=Signal::derive(move || data.clone())
//!         node_color="seagreen".to_string()
//!         edge_color="teal".to_string()
//!         layout="force".to_string()
//!         fullscreen=true
//!     />
//! }
//! ```

pub mod adapter;
mod component;
pub mod config;
mod data_source;
pub mod error;
pub mod interaction;
pub mod layout;
mod physics;
mod render;
pub mod simulation;
pub mod state;
mod static_layout;
#[cfg(test)]
pub(crate) mod testing;
pub mod theme;
pub mod types;
pub mod viewport;

pub use adapter::{ImageRef, RenderAdapter};
pub use component::{GraphHandle, NetworkGraphCanvas};
pub use config::GraphConfig;
pub use data_source::{DataSource, HttpDataSource};
pub use error::GraphError;
pub use interaction::Modifiers;
pub use layout::{LayoutAlgorithm, LayoutChoice};
pub use physics::ForceGraphProvider;
pub use render::CanvasRenderer;
pub use state::{CanvasGraphView, GraphView};
pub use static_layout::StaticLayoutProvider;
pub use types::{Graph, Node, NodeId, Point};
