//! Dataset fetching.

use std::future::Future;

use gloo_net::http::Request;
use log::{info, warn};

use super::error::GraphError;

/// Where dataset text comes from. Fetches are asynchronous; a caller that no
/// longer wants the result simply drops it.
pub trait DataSource {
	/// UTF-8 text of newline-separated `source target` pairs.
	fn fetch(&self, dataset: &str) -> impl Future<Output = Result<String, GraphError>>;
}

/// Fetches `{root}/{dataset}` over HTTP.
#[derive(Clone, Debug)]
pub struct HttpDataSource {
	root: String,
}

impl HttpDataSource {
	/// Fetch datasets from below `root`.
	pub fn new(root: impl Into<String>) -> Self {
		Self { root: root.into() }
	}

	/// URL of a dataset. A trailing slash on the root is ignored.
	pub fn url_for(&self, dataset: &str) -> String {
		format!("{}/{}", self.root.trim_end_matches('/'), dataset)
	}
}

impl DataSource for HttpDataSource {
	async fn fetch(&self, dataset: &str) -> Result<String, GraphError> {
		let url = self.url_for(dataset);
		let failed = |reason: String| {
			warn!("cines-graph: fetching {} failed: {}", url, reason);
			GraphError::Fetch {
				dataset: dataset.to_string(),
				reason,
			}
		};

		let resp = Request::get(&url)
			.send()
			.await
			.map_err(|e| failed(format!("Network error: {}", e)))?;
		if !resp.ok() {
			return Err(failed(format!("HTTP {}: {}", resp.status(), resp.status_text())));
		}
		let text = resp
			.text()
			.await
			.map_err(|e| failed(format!("Body error: {}", e)))?;
		info!("cines-graph: fetched {} ({} bytes)", url, text.len());
		Ok(text)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_url_joins_root_and_name() {
		assert_eq!(HttpDataSource::new("/data").url_for("karate.dat"), "/data/karate.dat");
		assert_eq!(HttpDataSource::new("/data/").url_for("karate.dat"), "/data/karate.dat");
	}
}
