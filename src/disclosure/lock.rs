//! Temporary position pinning around expansions and drags.
//!
//! Time is advanced explicitly by the tick loop. A pending release is keyed by
//! a generation counter, so pinning the same node again supersedes it.

use std::collections::HashMap;

use log::debug;

use super::model::{NodeId, Position};
use super::visibility::VisibleGraph;

/// Identifies one scheduled release. Stale handles cancel nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReleaseHandle {
	node: NodeId,
	generation: u64,
}

impl ReleaseHandle {
	/// Node whose release this handle refers to.
	pub fn node(&self) -> &str {
		&self.node
	}
}

#[derive(Clone, Copy, Debug)]
struct PendingRelease {
	generation: u64,
	due_at: f64,
}

#[derive(Clone, Debug, Default)]
struct PinEntry {
	settle: Option<PendingRelease>,
	dragging: bool,
}

/// Tracks pins, drags and pending releases per node.
#[derive(Clone, Debug, Default)]
pub struct ExpansionLockCoordinator {
	entries: HashMap<NodeId, PinEntry>,
	next_generation: u64,
	now: f64,
}

impl ExpansionLockCoordinator {
	/// Coordinator with no pins and the clock at zero.
	pub fn new() -> Self {
		Self::default()
	}

	/// Milliseconds elapsed since the coordinator was created.
	pub fn now(&self) -> f64 {
		self.now
	}

	/// Fixes `id` at `position`. Returns false when the node is not visible.
	pub fn pin(&mut self, graph: &mut VisibleGraph, id: &str, position: Position) -> bool {
		let Some(node) = graph.node_mut(id) else {
			return false;
		};
		node.pinned = Some(position);
		node.position = position;
		self.entries.entry(id.to_string()).or_default();
		true
	}

	/// Unpins `id` after `after_ms`, replacing any release still pending for it.
	pub fn schedule_release(&mut self, id: &str, after_ms: f64) -> ReleaseHandle {
		self.next_generation += 1;
		let generation = self.next_generation;
		let entry = self.entries.entry(id.to_string()).or_default();
		if entry.settle.is_some() {
			debug!("Superseding pending release of {}", id);
		}
		entry.settle = Some(PendingRelease {
			generation,
			due_at: self.now + after_ms.max(0.0),
		});
		ReleaseHandle {
			node: id.to_string(),
			generation,
		}
	}

	/// Cancels a pending release; the node stays pinned. Returns false for
	/// handles that already fired or were superseded.
	pub fn cancel(&mut self, handle: &ReleaseHandle) -> bool {
		let Some(entry) = self.entries.get_mut(&handle.node) else {
			return false;
		};
		match entry.settle {
			Some(pending) if pending.generation == handle.generation => {
				entry.settle = None;
				true
			}
			_ => false,
		}
	}

	/// A release is pending for `id`.
	pub fn is_settling(&self, id: &str) -> bool {
		self.entries.get(id).is_some_and(|e| e.settle.is_some())
	}

	/// `id` is held by an ongoing drag.
	pub fn is_dragging(&self, id: &str) -> bool {
		self.entries.get(id).is_some_and(|e| e.dragging)
	}

	/// Pins `id` under the pointer and marks it dragged.
	pub fn begin_drag(&mut self, graph: &mut VisibleGraph, id: &str, position: Position) -> bool {
		if !self.pin(graph, id, position) {
			return false;
		}
		if let Some(entry) = self.entries.get_mut(id) {
			entry.dragging = true;
		}
		true
	}

	/// Moves the pin of a dragged node. Ignored when `id` is not dragged.
	pub fn drag_to(&mut self, graph: &mut VisibleGraph, id: &str, position: Position) -> bool {
		self.is_dragging(id) && self.pin(graph, id, position)
	}

	/// Ends the drag of `id` and unpins it unless an expansion settle window is
	/// still open for that node. Returns true when the node was unpinned.
	pub fn release_immediately(&mut self, graph: &mut VisibleGraph, id: &str) -> bool {
		let Some(entry) = self.entries.get_mut(id) else {
			return false;
		};
		entry.dragging = false;
		if entry.settle.is_some() {
			return false;
		}
		self.entries.remove(id);
		unpin(graph, id)
	}

	/// Moves the clock forward and fires every release that came due. Nodes
	/// still being dragged lose their settle window but stay pinned. Returns the
	/// ids that were unpinned.
	pub fn advance(&mut self, graph: &mut VisibleGraph, dt_ms: f64) -> Vec<NodeId> {
		self.now += dt_ms.max(0.0);
		let now = self.now;

		let mut released = Vec::new();
		self.entries.retain(|id, entry| {
			let due = entry.settle.is_some_and(|p| p.due_at <= now);
			if !due {
				return true;
			}
			entry.settle = None;
			if entry.dragging {
				return true;
			}
			released.push(id.clone());
			false
		});

		released.retain(|id| unpin(graph, id));
		released.sort();
		released
	}
}

fn unpin(graph: &mut VisibleGraph, id: &str) -> bool {
	match graph.node_mut(id) {
		Some(node) => node.pinned.take().is_some(),
		None => false,
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use super::*;
	use crate::disclosure::config::RootSelector;
	use crate::disclosure::model::fixtures::graph;
	use crate::disclosure::visibility::VisibilityController;

	fn visible() -> VisibleGraph {
		let mut rng = rand::rngs::mock::StepRng::new(0, 1);
		let mut c = VisibilityController::initialize(
			Arc::new(graph(&["R", "A", "B"], &[("R", "A"), ("R", "B")])),
			&RootSelector::default(),
			Position::default(),
			0.0,
		)
		.unwrap();
		c.expand("R", &mut rng).unwrap();
		c.visible().clone()
	}

	fn pinned(g: &VisibleGraph, id: &str) -> Option<Position> {
		g.node(id).unwrap().pinned
	}

	#[test]
	fn release_fires_after_settle_window() {
		let mut g = visible();
		let mut locks = ExpansionLockCoordinator::new();
		let at = Position::new(3.0, 4.0);

		assert!(locks.pin(&mut g, "R", at));
		locks.schedule_release("R", 300.0);
		assert!(locks.advance(&mut g, 299.0).is_empty());
		assert_eq!(pinned(&g, "R"), Some(at));

		assert_eq!(locks.advance(&mut g, 1.0), ["R"]);
		assert_eq!(pinned(&g, "R"), None);
		assert!(!locks.is_settling("R"));
	}

	#[test]
	fn reexpansion_supersedes_pending_release() {
		let mut g = visible();
		let mut locks = ExpansionLockCoordinator::new();

		locks.pin(&mut g, "R", Position::default());
		let first = locks.schedule_release("R", 300.0);
		locks.advance(&mut g, 200.0);

		locks.pin(&mut g, "R", Position::new(1.0, 1.0));
		locks.schedule_release("R", 300.0);

		// The first deadline passes without unpinning.
		assert!(locks.advance(&mut g, 150.0).is_empty());
		assert!(pinned(&g, "R").is_some());
		assert!(!locks.cancel(&first));

		assert_eq!(locks.advance(&mut g, 150.0), ["R"]);
	}

	#[test]
	fn releases_are_independent_per_node() {
		let mut g = visible();
		let mut locks = ExpansionLockCoordinator::new();

		locks.pin(&mut g, "R", Position::default());
		locks.schedule_release("R", 300.0);
		locks.advance(&mut g, 100.0);
		locks.pin(&mut g, "A", Position::default());
		locks.schedule_release("A", 300.0);

		assert_eq!(locks.advance(&mut g, 200.0), ["R"]);
		assert!(pinned(&g, "A").is_some());
		assert_eq!(locks.advance(&mut g, 100.0), ["A"]);
	}

	#[test]
	fn cancelled_release_keeps_pin() {
		let mut g = visible();
		let mut locks = ExpansionLockCoordinator::new();
		locks.pin(&mut g, "B", Position::default());
		let handle = locks.schedule_release("B", 10.0);
		assert_eq!(handle.node(), "B");
		assert!(locks.cancel(&handle));
		assert!(locks.advance(&mut g, 50.0).is_empty());
		assert!(pinned(&g, "B").is_some());
	}

	#[test]
	fn drag_end_releases_unless_settling() {
		let mut g = visible();
		let mut locks = ExpansionLockCoordinator::new();

		assert!(locks.begin_drag(&mut g, "A", Position::new(1.0, 2.0)));
		assert!(locks.drag_to(&mut g, "A", Position::new(5.0, 6.0)));
		assert_eq!(pinned(&g, "A"), Some(Position::new(5.0, 6.0)));
		assert!(locks.release_immediately(&mut g, "A"));
		assert_eq!(pinned(&g, "A"), None);
		assert!(!locks.drag_to(&mut g, "A", Position::default()));

		locks.pin(&mut g, "R", Position::default());
		locks.schedule_release("R", 300.0);
		locks.begin_drag(&mut g, "R", Position::new(9.0, 9.0));
		assert!(!locks.release_immediately(&mut g, "R"));
		assert!(pinned(&g, "R").is_some());
		assert_eq!(locks.advance(&mut g, 300.0), ["R"]);
	}

	#[test]
	fn settle_during_drag_leaves_node_to_the_drag() {
		let mut g = visible();
		let mut locks = ExpansionLockCoordinator::new();

		locks.pin(&mut g, "R", Position::default());
		locks.schedule_release("R", 300.0);
		locks.begin_drag(&mut g, "R", Position::default());
		assert!(locks.advance(&mut g, 400.0).is_empty());
		assert!(pinned(&g, "R").is_some());
		assert!(locks.release_immediately(&mut g, "R"));
	}

	#[test]
	fn ending_one_drag_does_not_touch_other_settles() {
		let mut g = visible();
		let mut locks = ExpansionLockCoordinator::new();

		locks.pin(&mut g, "R", Position::default());
		locks.schedule_release("R", 300.0);
		locks.begin_drag(&mut g, "B", Position::default());
		assert!(locks.release_immediately(&mut g, "B"));
		assert!(locks.is_settling("R"));
		assert!(pinned(&g, "R").is_some());
	}

	#[test]
	fn unknown_nodes_are_not_pinned() {
		let mut g = visible();
		let mut locks = ExpansionLockCoordinator::new();
		assert!(!locks.pin(&mut g, "ghost", Position::default()));
		assert!(!locks.release_immediately(&mut g, "ghost"));
	}
}
