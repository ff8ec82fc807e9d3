use std::collections::HashMap;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::warn;

use crate::disclosure::{
	ExpansionDelta, Gesture, Layout, NodeId, Position, Session, SideEffect, VisibleGraph, dispatch,
};

pub const NODE_RADIUS: f64 = 40.0;
/// Pointer travel in screen pixels below which a press counts as a tap.
pub const TAP_SLOP: f64 = 4.0;
pub const ZOOM_MIN: f64 = 0.2;
pub const ZOOM_MAX: f64 = 4.0;

const NODE_MASS: f32 = 10.0;
const ENERGY_MIN: f64 = 0.001;
/// Fraction of the gap to the energy target closed every tick.
const ENERGY_DECAY: f64 = 0.0228;
const ENERGY_GAIN: f32 = 1.5;

fn simulation_parameters() -> SimulationParameters {
	SimulationParameters {
		force_charge: 1200.0,
		force_spring: 0.05,
		force_max: 100.0,
		node_speed: 3000.0,
		damping_factor: 0.9,
	}
}

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub id: NodeId,
}

/// `force_graph` simulation holding only the visible nodes, with an energy
/// level that decays toward a target and freezes the simulation when spent.
pub struct ForceLayout {
	graph: ForceGraph<NodeInfo, ()>,
	index: HashMap<NodeId, DefaultNodeIdx>,
	positions: HashMap<NodeId, Position>,
	pub energy: f64,
	pub energy_target: f64,
}

impl ForceLayout {
	pub fn new(visible: &VisibleGraph) -> Self {
		let mut layout = Self {
			graph: ForceGraph::new(simulation_parameters()),
			index: HashMap::new(),
			positions: HashMap::new(),
			energy: 1.0,
			energy_target: 0.0,
		};
		for node in visible.nodes() {
			layout.add_node(&node.id, node.pinned.unwrap_or(node.position));
		}
		for edge in visible.edges() {
			layout.add_edge(&edge.source, &edge.target);
		}
		layout
	}

	fn add_node(&mut self, id: &str, at: Position) {
		if self.index.contains_key(id) {
			return;
		}
		let idx = self.graph.add_node(NodeData {
			x: at.x as f32,
			y: at.y as f32,
			mass: NODE_MASS,
			is_anchor: false,
			user_data: NodeInfo { id: id.to_string() },
		});
		self.index.insert(id.to_string(), idx);
		self.positions.insert(id.to_string(), at);
	}

	fn add_edge(&mut self, source: &str, target: &str) {
		match (self.index.get(source), self.index.get(target)) {
			(Some(&src), Some(&tgt)) => {
				self.graph.add_edge(src, tgt, EdgeData::default());
			}
			_ => warn!("Layout has no node for edge {} -> {}", source, target),
		}
	}

	pub fn is_active(&self) -> bool {
		self.energy >= ENERGY_MIN || self.energy_target >= ENERGY_MIN
	}

	pub fn step(&mut self, dt: f32) {
		if !self.is_active() {
			return;
		}
		self.graph
			.update(dt * self.energy.min(1.0) as f32 * ENERGY_GAIN);
		self.energy += (self.energy_target - self.energy) * ENERGY_DECAY;
		if self.energy < ENERGY_MIN && self.energy_target < ENERGY_MIN {
			self.energy = 0.0;
		}

		let positions = &mut self.positions;
		self.graph.visit_nodes(|node| {
			positions.insert(
				node.data.user_data.id.clone(),
				Position::new(node.x() as f64, node.y() as f64),
			);
		});
	}

	#[cfg(test)]
	pub fn node_count(&self) -> usize {
		self.index.len()
	}
}

impl Layout for ForceLayout {
	fn position(&self, id: &str) -> Option<Position> {
		self.positions.get(id).copied()
	}

	fn insert(&mut self, delta: &ExpansionDelta, visible: &VisibleGraph) {
		for id in &delta.new_nodes {
			if let Some(node) = visible.node(id) {
				self.add_node(id, node.position);
			}
		}
		for edge in &delta.new_edges {
			self.add_edge(&edge.source, &edge.target);
		}
	}

	fn set_pinned(&mut self, id: &str, pinned: Option<Position>) {
		let Some(&idx) = self.index.get(id) else {
			return;
		};
		self.graph.visit_nodes_mut(|node| {
			if node.index() != idx {
				return;
			}
			node.data.is_anchor = pinned.is_some();
			if let Some(at) = pinned {
				node.data.x = at.x as f32;
				node.data.y = at.y as f32;
			}
		});
		if let Some(at) = pinned {
			self.positions.insert(id.to_string(), at);
		}
	}

	fn reheat(&mut self, energy: f64) {
		self.energy = self.energy.max(energy);
	}

	fn set_energy_target(&mut self, target: f64) {
		self.energy_target = target.max(0.0);
	}
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

/// A press on a node that becomes either a tap or a drag.
#[derive(Clone, Debug)]
pub struct Press {
	pub node: NodeId,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start: Position,
	pub dragging: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

pub struct ForceGraphState {
	pub session: Session,
	pub layout: ForceLayout,
	pub transform: ViewTransform,
	pub press: Option<Press>,
	pub pan: PanState,
	pub width: f64,
	pub height: f64,
}

impl ForceGraphState {
	pub fn new(session: Session, width: f64, height: f64) -> Self {
		let layout = ForceLayout::new(session.visible());
		Self {
			session,
			layout,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			press: None,
			pan: PanState::default(),
			width,
			height,
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost visible node under the screen point.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<NodeId> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		self.session.visible().nodes().iter().rev().find_map(|node| {
			let at = self.layout.position(&node.id)?;
			let (dx, dy) = (at.x - gx, at.y - gy);
			((dx * dx + dy * dy).sqrt() < NODE_RADIUS).then(|| node.id.clone())
		})
	}

	fn send(&mut self, gesture: Gesture) -> Option<SideEffect> {
		match dispatch(&mut self.session, &mut self.layout, gesture) {
			Ok(outcome) => outcome.effect,
			Err(err) => {
				warn!("Ignoring gesture: {}", err);
				None
			}
		}
	}

	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		if let Some(node) = self.node_at_position(sx, sy) {
			let node_start = self.layout.position(&node).unwrap_or_default();
			self.press = Some(Press {
				node,
				start_x: sx,
				start_y: sy,
				node_start,
				dragging: false,
			});
		} else {
			self.pan = PanState {
				active: true,
				start_x: sx,
				start_y: sy,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
			};
		}
	}

	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		if let Some(press) = self.press.as_mut() {
			let (dx, dy) = (sx - press.start_x, sy - press.start_y);
			if !press.dragging && (dx * dx + dy * dy).sqrt() <= TAP_SLOP {
				return;
			}
			let pointer = press
				.node_start
				.offset(dx / self.transform.k, dy / self.transform.k);
			let node = press.node.clone();
			let gesture = if press.dragging {
				Gesture::DragMove { node, pointer }
			} else {
				press.dragging = true;
				Gesture::DragStart { node, pointer }
			};
			self.send(gesture);
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
		}
	}

	/// Finishes a press. Returns the side effect of a tap, if any.
	pub fn pointer_up(&mut self) -> Option<SideEffect> {
		self.pan.active = false;
		let press = self.press.take()?;
		if press.dragging {
			self.send(Gesture::DragEnd(press.node))
		} else {
			self.send(Gesture::Tap(press.node))
		}
	}

	pub fn pointer_leave(&mut self) {
		self.pan.active = false;
		if let Some(press) = self.press.take().filter(|p| p.dragging) {
			self.send(Gesture::DragEnd(press.node));
		}
	}

	pub fn zoom(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(ZOOM_MIN, ZOOM_MAX);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Advances the simulation and the pin timers by `dt` seconds.
	pub fn tick(&mut self, dt: f32) {
		self.layout.step(dt);
		self.session.tick(dt as f64 * 1000.0, &mut self.layout);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	use super::*;
	use crate::disclosure::{DisclosureConfig, GraphStore};

	const DATASET: &str = r#"{
		"nodes": [
			{"id": "r", "labels": ["HIMO"], "attributes": {"name": "HIMO"}},
			{"id": "a", "labels": ["Fonds"], "attributes": {"name": "Fonds A"}},
			{"id": "b", "labels": ["Fonds"], "attributes": {"name": "Fonds B", "url": "https://example.org/b"}}
		],
		"edges": [
			{"source": "r", "target": "a", "label": "child"},
			{"source": "r", "target": "b", "label": "child"}
		]
	}"#;

	fn state() -> ForceGraphState {
		let config = DisclosureConfig::default();
		let store = GraphStore::load(DATASET, &config.root).unwrap();
		let session =
			Session::with_rng(store, config, Position::default(), StdRng::seed_from_u64(11)).unwrap();
		ForceGraphState::new(session, 800.0, 600.0)
	}

	/// Screen coordinates of a node under the current transform.
	fn screen(s: &ForceGraphState, id: &str) -> (f64, f64) {
		let at = s.layout.position(id).unwrap();
		(
			at.x * s.transform.k + s.transform.x,
			at.y * s.transform.k + s.transform.y,
		)
	}

	#[test]
	fn click_on_root_expands_into_the_layout() {
		let mut s = state();
		assert_eq!(s.layout.node_count(), 1);
		assert_eq!(s.node_at_position(400.0, 300.0).as_deref(), Some("r"));

		s.pointer_down(400.0, 300.0);
		assert_eq!(s.pointer_up(), None);
		assert_eq!(s.layout.node_count(), 3);
		assert_eq!(s.session.visible().edges().len(), 2);
		assert!(s.session.locks().is_settling("r"));

		for _ in 0..30 {
			s.tick(0.016);
		}
		assert!(!s.session.locks().is_settling("r"));
		assert_eq!(s.session.visible().node("r").unwrap().pinned, None);
	}

	#[test]
	fn pinned_root_does_not_move_while_settling() {
		let mut s = state();
		s.pointer_down(400.0, 300.0);
		s.pointer_up();
		for _ in 0..5 {
			s.tick(0.016);
		}
		assert_eq!(s.layout.position("r"), Some(Position::default()));
	}

	#[test]
	fn click_on_linked_node_returns_open_external() {
		let mut s = state();
		s.pointer_down(400.0, 300.0);
		s.pointer_up();

		let (bx, by) = screen(&s, "b");
		s.pointer_down(bx, by);
		let effect = s.pointer_up();
		assert_eq!(
			effect,
			Some(SideEffect::OpenExternal("https://example.org/b".into()))
		);
		assert!(!s.session.visible().node("b").unwrap().expanded);
	}

	#[test]
	fn moving_past_the_slop_drags_instead_of_tapping() {
		let mut s = state();
		s.pointer_down(400.0, 300.0);
		s.pointer_move(402.0, 300.0);
		assert!(!s.press.as_ref().unwrap().dragging);

		s.pointer_move(450.0, 330.0);
		assert!(s.session.locks().is_dragging("r"));
		assert_eq!(s.layout.position("r"), Some(Position::new(50.0, 30.0)));
		assert_eq!(s.layout.energy_target, 0.3);

		assert_eq!(s.pointer_up(), None);
		assert_eq!(s.layout.node_count(), 1);
		assert!(!s.session.visible().node("r").unwrap().expanded);
		assert_eq!(s.session.visible().node("r").unwrap().pinned, None);
		assert_eq!(s.layout.energy_target, 0.0);
	}

	#[test]
	fn background_drag_pans_and_wheel_zoom_is_clamped() {
		let mut s = state();
		s.pointer_down(10.0, 10.0);
		s.pointer_move(30.0, 50.0);
		s.pointer_up();
		assert_eq!((s.transform.x, s.transform.y), (420.0, 340.0));

		for _ in 0..100 {
			s.zoom(0.0, 0.0, 1.0);
		}
		assert_eq!(s.transform.k, ZOOM_MIN);
		for _ in 0..100 {
			s.zoom(0.0, 0.0, -1.0);
		}
		assert_eq!(s.transform.k, ZOOM_MAX);
	}

	#[test]
	fn energy_decays_until_the_layout_freezes() {
		let mut s = state();
		for _ in 0..1000 {
			s.tick(0.016);
		}
		assert!(!s.layout.is_active());
		s.layout.reheat(0.6);
		assert!(s.layout.is_active());
	}
}
