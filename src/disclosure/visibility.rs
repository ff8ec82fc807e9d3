//! The visible subgraph and the expansion algorithm.
//!
//! The visible graph only grows. Every node except the root enters it through
//! an expansion of an already visible node, together with the edge that
//! reached it, so the visible graph stays connected and free of dangling edges.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::{debug, info, warn};
use rand::Rng;

use super::config::RootSelector;
use super::error::{ExpandError, RootNotFoundError};
use super::model::{FullGraph, Node, NodeId, Position};

/// A revealed node.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibleNode {
	/// Id in the full graph.
	pub id: NodeId,
	/// Last known layout position.
	pub position: Position,
	/// Overrides layout movement while set.
	pub pinned: Option<Position>,
	/// Set once the outgoing edges of this node have been revealed.
	pub expanded: bool,
}

/// A revealed edge.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VisibleEdge {
	/// Origin node.
	pub source: NodeId,
	/// Revealed node.
	pub target: NodeId,
	/// Relationship type.
	pub label: String,
}

/// Nodes and edges revealed by a single expansion.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpansionDelta {
	/// Nodes added, in reveal order.
	pub new_nodes: Vec<NodeId>,
	/// Edges added, in reveal order.
	pub new_edges: Vec<VisibleEdge>,
}

impl ExpansionDelta {
	/// Nothing was revealed.
	pub fn is_empty(&self) -> bool {
		self.new_nodes.is_empty() && self.new_edges.is_empty()
	}
}

/// The growing subgraph shown to the viewer.
#[derive(Clone, Debug)]
pub struct VisibleGraph {
	root: NodeId,
	nodes: Vec<VisibleNode>,
	by_id: HashMap<NodeId, usize>,
	edges: Vec<VisibleEdge>,
	pairs: HashSet<(NodeId, NodeId)>,
}

impl VisibleGraph {
	fn with_root(root: NodeId, position: Position) -> Self {
		let mut graph = Self {
			root: root.clone(),
			nodes: Vec::new(),
			by_id: HashMap::new(),
			edges: Vec::new(),
			pairs: HashSet::new(),
		};
		graph.push_node(root, position);
		graph
	}

	fn push_node(&mut self, id: NodeId, position: Position) {
		self.by_id.insert(id.clone(), self.nodes.len());
		self.nodes.push(VisibleNode {
			id,
			position,
			pinned: None,
			expanded: false,
		});
	}

	/// Returns false when an edge for the same ordered pair is already shown.
	fn push_edge(&mut self, edge: VisibleEdge) -> bool {
		if !self.pairs.insert((edge.source.clone(), edge.target.clone())) {
			return false;
		}
		self.edges.push(edge);
		true
	}

	/// Id of the entry node.
	pub fn root(&self) -> &str {
		&self.root
	}

	/// Revealed nodes, root first.
	pub fn nodes(&self) -> &[VisibleNode] {
		&self.nodes
	}

	/// Revealed edges.
	pub fn edges(&self) -> &[VisibleEdge] {
		&self.edges
	}

	/// Revealed node with this id.
	pub fn node(&self, id: &str) -> Option<&VisibleNode> {
		self.by_id.get(id).map(|&i| &self.nodes[i])
	}

	pub(crate) fn node_mut(&mut self, id: &str) -> Option<&mut VisibleNode> {
		self.by_id.get(id).map(|&i| &mut self.nodes[i])
	}

	/// Whether `id` has been revealed.
	pub fn contains(&self, id: &str) -> bool {
		self.by_id.contains_key(id)
	}

	/// Whether an edge for this ordered pair is shown.
	pub fn has_edge(&self, source: &str, target: &str) -> bool {
		self.pairs.contains(&(source.to_string(), target.to_string()))
	}

	/// First visible edge that reached `id`.
	pub fn parent_edge(&self, id: &str) -> Option<&VisibleEdge> {
		self.edges.iter().find(|e| e.target == id)
	}

	/// Records the layout position of a node. Unknown ids are ignored.
	pub fn set_position(&mut self, id: &str, position: Position) {
		if let Some(node) = self.node_mut(id) {
			node.position = position;
		}
	}
}

/// First node in dataset order accepted by `selector`.
pub fn find_root<'g>(
	graph: &'g FullGraph,
	selector: &RootSelector,
) -> Result<&'g Node, RootNotFoundError> {
	graph
		.nodes()
		.iter()
		.find(|n| selector.matches(n))
		.ok_or_else(|| RootNotFoundError {
			selector: selector.to_string(),
		})
}

/// Reveals the direct successors of `id` in `visible`.
///
/// Expanding an already expanded node is a no-op returning an empty delta.
/// Edges whose target is missing from `full` are skipped. New nodes are seeded
/// around the source position within `jitter` on both axes.
pub fn expand<R: Rng + ?Sized>(
	full: &FullGraph,
	visible: &mut VisibleGraph,
	id: &str,
	jitter: f64,
	rng: &mut R,
) -> Result<ExpansionDelta, ExpandError> {
	let source = visible
		.node(id)
		.ok_or_else(|| ExpandError::NotVisible(id.to_string()))?;
	if source.expanded {
		return Ok(ExpansionDelta::default());
	}
	let origin = source.position;

	let mut delta = ExpansionDelta::default();
	for edge in full.outgoing(id) {
		let Some(target) = full.node(&edge.target) else {
			warn!("Skipping edge {} -> {}: unknown target", edge.source, edge.target);
			continue;
		};

		if !visible.contains(&target.id) {
			let position = origin.offset(spread(rng, jitter), spread(rng, jitter));
			visible.push_node(target.id.clone(), position);
			delta.new_nodes.push(target.id.clone());
		}

		let shown = VisibleEdge {
			source: edge.source.clone(),
			target: target.id.clone(),
			label: edge.label.clone(),
		};
		if visible.push_edge(shown.clone()) {
			delta.new_edges.push(shown);
		}
	}

	if let Some(node) = visible.node_mut(id) {
		node.expanded = true;
	}
	debug!(
		"Expanded {}: {} new nodes, {} new edges",
		id,
		delta.new_nodes.len(),
		delta.new_edges.len()
	);
	Ok(delta)
}

fn spread<R: Rng + ?Sized>(rng: &mut R, jitter: f64) -> f64 {
	if !jitter.is_finite() || jitter <= 0.0 {
		return 0.0;
	}
	rng.gen_range(-jitter / 2.0..jitter / 2.0)
}

/// Owns the visible graph for one session over a shared full graph.
#[derive(Clone, Debug)]
pub struct VisibilityController {
	full: Arc<FullGraph>,
	visible: VisibleGraph,
	jitter: f64,
}

impl VisibilityController {
	/// Starts a session showing only the root chosen by `selector`.
	pub fn initialize(
		full: Arc<FullGraph>,
		selector: &RootSelector,
		origin: Position,
		jitter: f64,
	) -> Result<Self, RootNotFoundError> {
		let root = find_root(&full, selector)?.id.clone();
		info!("Starting disclosure at root {}", root);
		let visible = VisibleGraph::with_root(root, origin);
		Ok(Self {
			full,
			visible,
			jitter,
		})
	}

	/// Reveals the successors of `id`; see [`expand`].
	pub fn expand<R: Rng + ?Sized>(
		&mut self,
		id: &str,
		rng: &mut R,
	) -> Result<ExpansionDelta, ExpandError> {
		expand(&self.full, &mut self.visible, id, self.jitter, rng)
	}

	/// The complete graph.
	pub fn full(&self) -> &FullGraph {
		&self.full
	}

	/// The revealed subgraph.
	pub fn visible(&self) -> &VisibleGraph {
		&self.visible
	}

	/// Mutable access for position and pin updates.
	pub fn visible_mut(&mut self) -> &mut VisibleGraph {
		&mut self.visible
	}

	/// True when expanding `id` could still reveal something.
	pub fn is_expandable(&self, id: &str) -> bool {
		self.visible
			.node(id)
			.is_some_and(|n| !n.expanded && self.full.has_outgoing(id))
	}
}
