//! Fetches the dataset document over HTTP.

use log::info;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use crate::disclosure::{GraphStore, LoadError, RootSelector};

/// Served next to the application.
pub const DATASET_URL: &str = "graph.json";

fn fetch_error(err: JsValue) -> LoadError {
	LoadError::Fetch(format!("{:?}", err))
}

pub async fn fetch_dataset(url: &'static str, root: RootSelector) -> Result<GraphStore, LoadError> {
	let window = web_sys::window().ok_or_else(|| LoadError::Fetch("no window".into()))?;
	info!("Fetching dataset from {}", url);

	let response: Response = JsFuture::from(window.fetch_with_str(url))
		.await
		.map_err(fetch_error)?
		.dyn_into()
		.map_err(fetch_error)?;
	if !response.ok() {
		return Err(LoadError::Fetch(format!(
			"{} returned HTTP {}",
			url,
			response.status()
		)));
	}

	let body = JsFuture::from(response.text().map_err(fetch_error)?)
		.await
		.map_err(fetch_error)?
		.as_string()
		.ok_or_else(|| LoadError::Fetch("response body is not text".into()))?;
	GraphStore::load(&body, &root)
}
