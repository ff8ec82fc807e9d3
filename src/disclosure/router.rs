//! Turns renderer gestures into disclosure commands.

use log::{debug, info};

use super::error::ExpandError;
use super::model::{NodeId, Position};
use super::session::Session;
use super::visibility::{ExpansionDelta, VisibleGraph};

/// The layout collaborator as seen by the engine. Positions are owned by the
/// layout and read back each tick.
pub trait Layout {
	/// Current position of `id`, if the layout holds it.
	fn position(&self, id: &str) -> Option<Position>;
	/// Adds the nodes and edges of `delta`, seeding nodes at their visible
	/// positions.
	fn insert(&mut self, delta: &ExpansionDelta, visible: &VisibleGraph);
	/// Fixes `id` at a position, or frees it with `None`.
	fn set_pinned(&mut self, id: &str, pinned: Option<Position>);
	/// Restarts the simulation with at least `energy`.
	fn reheat(&mut self, energy: f64);
	/// Level the simulation energy relaxes toward.
	fn set_energy_target(&mut self, target: f64);
}

/// Pointer input on a node, reported by the renderer.
#[derive(Clone, Debug, PartialEq)]
pub enum Gesture {
	/// Press and release without moving.
	Tap(NodeId),
	/// The pointer started dragging a node.
	DragStart {
		/// Dragged node.
		node: NodeId,
		/// Pointer in graph space.
		pointer: Position,
	},
	/// The dragged node followed the pointer.
	DragMove {
		/// Dragged node.
		node: NodeId,
		/// Pointer in graph space.
		pointer: Position,
	},
	/// The pointer let go of a node.
	DragEnd(NodeId),
}

/// Fire-and-forget actions for the host. Never feeds back into graph state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SideEffect {
	/// Open the URL in a new browsing context.
	OpenExternal(String),
}

/// What one gesture did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Outcome {
	/// What became visible.
	pub delta: ExpansionDelta,
	/// Action left to the host.
	pub effect: Option<SideEffect>,
}

/// Applies one gesture to the session and mirrors the result into `layout`.
pub fn dispatch(
	session: &mut Session,
	layout: &mut impl Layout,
	gesture: Gesture,
) -> Result<Outcome, ExpandError> {
	match gesture {
		Gesture::Tap(id) => tap(session, layout, &id),
		Gesture::DragStart { node, pointer } => {
			let visible = session.controller.visible_mut();
			if session.locks.begin_drag(visible, &node, pointer) {
				layout.set_pinned(&node, Some(pointer));
				layout.set_energy_target(session.config.drag_energy_target);
				layout.reheat(session.config.drag_energy_target);
			}
			Ok(Outcome::default())
		}
		Gesture::DragMove { node, pointer } => {
			let visible = session.controller.visible_mut();
			if session.locks.drag_to(visible, &node, pointer) {
				layout.set_pinned(&node, Some(pointer));
			}
			Ok(Outcome::default())
		}
		Gesture::DragEnd(node) => {
			layout.set_energy_target(0.0);
			let visible = session.controller.visible_mut();
			if session.locks.release_immediately(visible, &node) {
				layout.set_pinned(&node, None);
			}
			Ok(Outcome::default())
		}
	}
}

fn tap(session: &mut Session, layout: &mut impl Layout, id: &str) -> Result<Outcome, ExpandError> {
	let node = session
		.full()
		.node(id)
		.filter(|_| session.visible().contains(id))
		.ok_or_else(|| ExpandError::NotVisible(id.to_string()))?;

	if let Some(url) = node.url() {
		info!("Opening {} for node {}", url, id);
		return Ok(Outcome {
			delta: ExpansionDelta::default(),
			effect: Some(SideEffect::OpenExternal(url.to_string())),
		});
	}

	session.sync_positions(&*layout);
	let Session {
		controller,
		locks,
		config,
		rng,
		..
	} = session;

	let delta = controller.expand(id, rng)?;
	if !delta.is_empty() {
		layout.insert(&delta, controller.visible());
	}

	let visible = controller.visible_mut();
	let at = visible.node(id).map(|n| n.position).unwrap_or_default();
	locks.pin(visible, id, at);
	layout.set_pinned(id, Some(at));
	layout.reheat(config.expand_energy);
	locks.schedule_release(id, config.settle_ms);
	debug!("Pinned {} for {} ms", id, config.settle_ms);

	Ok(Outcome {
		delta,
		effect: None,
	})
}
