//! One viewing session: the shared dataset plus all mutable disclosure state.

use log::error;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::config::DisclosureConfig;
use super::error::RootNotFoundError;
use super::lock::ExpansionLockCoordinator;
use super::model::{FullGraph, Position};
use super::router::Layout;
use super::store::GraphStore;
use super::style::{NodeView, node_views};
use super::visibility::{VisibilityController, VisibleGraph};
use super::wrap::TextMeasure;

/// Disclosure state owned by the host for the lifetime of one view.
pub struct Session {
	store: GraphStore,
	pub(crate) controller: VisibilityController,
	pub(crate) locks: ExpansionLockCoordinator,
	pub(crate) config: DisclosureConfig,
	pub(crate) rng: StdRng,
}

impl Session {
	/// Shows the configured root at `origin`.
	pub fn start(
		store: GraphStore,
		config: DisclosureConfig,
		origin: Position,
	) -> Result<Self, RootNotFoundError> {
		Self::with_rng(store, config, origin, StdRng::from_entropy())
	}

	/// Like [`Session::start`] with a caller-provided random source.
	pub fn with_rng(
		store: GraphStore,
		config: DisclosureConfig,
		origin: Position,
		rng: StdRng,
	) -> Result<Self, RootNotFoundError> {
		let controller =
			VisibilityController::initialize(store.shared(), &config.root, origin, config.spawn_jitter)
				.inspect_err(|err| error!("Cannot start session: {}", err))?;
		Ok(Self {
			store,
			controller,
			locks: ExpansionLockCoordinator::new(),
			config,
			rng,
		})
	}

	/// Dataset this session discloses.
	pub fn store(&self) -> &GraphStore {
		&self.store
	}

	/// The complete graph.
	pub fn full(&self) -> &FullGraph {
		self.store.graph()
	}

	/// What the viewer currently sees.
	pub fn visible(&self) -> &VisibleGraph {
		self.controller.visible()
	}

	/// Tunables in effect.
	pub fn config(&self) -> &DisclosureConfig {
		&self.config
	}

	/// Pin state.
	pub fn locks(&self) -> &ExpansionLockCoordinator {
		&self.locks
	}

	/// Advances pin timers by `dt_ms`, hands released nodes back to the layout
	/// and copies layout positions into the visible graph.
	pub fn tick(&mut self, dt_ms: f64, layout: &mut impl Layout) {
		let visible = self.controller.visible_mut();
		for id in self.locks.advance(visible, dt_ms) {
			layout.set_pinned(&id, None);
		}
		self.sync_positions(&*layout);
	}

	/// Copies layout positions into the visible graph.
	pub fn sync_positions(&mut self, layout: &impl Layout) {
		let visible = self.controller.visible_mut();
		let ids: Vec<_> = visible.nodes().iter().map(|n| n.id.clone()).collect();
		for id in ids {
			if let Some(position) = layout.position(&id) {
				visible.set_position(&id, position);
			}
		}
	}

	/// Drawable snapshot of the visible nodes.
	pub fn node_views(&self, measure: &impl TextMeasure) -> Vec<NodeView> {
		node_views(self.full(), self.visible(), &self.config, measure)
	}
}
