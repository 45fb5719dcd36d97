//! Error types for the network graph engine.

use thiserror::Error;

/// Errors surfaced by graph loading, layout selection and render-surface operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
	/// A non-blank dataset line that does not hold two integer ids.
	/// Loading records it and carries on.
	#[error("malformed line {line}: {content:?}")]
	MalformedLine {
		/// 1-based line number.
		line: usize,
		/// The offending line.
		content: String,
	},

	/// An operation needed the render surface before `initialize` or after `dispose`.
	#[error("renderer not initialized (during {operation})")]
	UninitializedRenderer {
		/// The operation that was refused.
		operation: &'static str,
	},

	/// A layout name outside the supported set.
	#[error("unknown layout: {0}")]
	UnknownLayout(String),

	/// The dataset could not be fetched.
	#[error("failed to fetch dataset {dataset}: {reason}")]
	Fetch {
		/// Name of the requested dataset.
		dataset: String,
		/// Network or HTTP failure.
		reason: String,
	},

	/// The renderer could not produce an image.
	#[error("screenshot failed: {0}")]
	Screenshot(String),

	/// The embedded configuration could not be parsed.
	#[error("invalid configuration: {0}")]
	Config(String),
}
