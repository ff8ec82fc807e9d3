use leptos::prelude::*;
use log::error;

use crate::components::force_graph::ForceGraphCanvas;
use crate::disclosure::DisclosureConfig;
use crate::loader::{DATASET_URL, fetch_dataset};

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let config = DisclosureConfig::default();
	let root = config.root.clone();
	let dataset = LocalResource::new(move || fetch_dataset(DATASET_URL, root.clone()));

	// A failed load leaves the canvas blank.
	let store = Signal::derive(move || dataset.get().and_then(Result::ok));
	Effect::new(move |_| {
		if let Some(Err(err)) = dataset.get() {
			error!("Graph unavailable: {}", err);
		}
	});

	view! {
		<div class="fullscreen-graph">
			<ForceGraphCanvas store=store config=config fullscreen=true />
			<div class="graph-overlay">
				<h1>"Archive Explorer"</h1>
				<p class="subtitle">
					"Click a node to reveal what it holds. Linked nodes open their page. Drag nodes to reposition, scroll to zoom, drag the background to pan."
				</p>
			</div>
		</div>
	}
}
