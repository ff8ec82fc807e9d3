//! Graph data shared by the store, the controller and the renderer.

use std::collections::HashMap;

use serde_json::{Map, Value};

use super::error::LoadError;

/// Stable node identifier as it appears in the dataset.
pub type NodeId = String;

/// A point in graph (world) space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate.
	pub y: f64,
}

impl Position {
	/// Point at `(x, y)`.
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// This point moved by `(dx, dy)`.
	pub fn offset(self, dx: f64, dy: f64) -> Self {
		Self {
			x: self.x + dx,
			y: self.y + dy,
		}
	}
}

/// Node attributes after load-time validation. `url` is only present when the
/// dataset carried a non-empty string for it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeAttributes {
	/// Display name.
	pub name: String,
	/// External page for the node.
	pub url: Option<String>,
	/// Every other attribute, untouched.
	pub extra: Map<String, Value>,
}

/// A dataset entity.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	/// Unique id.
	pub id: NodeId,
	/// Category tags; the first one drives styling and root selection.
	pub labels: Vec<String>,
	/// Validated attributes.
	pub attributes: NodeAttributes,
}

impl Node {
	/// Category used for styling.
	pub fn primary_label(&self) -> Option<&str> {
		self.labels.first().map(String::as_str)
	}

	/// Display name.
	pub fn name(&self) -> &str {
		&self.attributes.name
	}

	/// External link, when the node has one.
	pub fn url(&self) -> Option<&str> {
		self.attributes.url.as_deref()
	}
}

/// A directed relationship between two nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
	/// Id of the origin node.
	pub source: NodeId,
	/// Id of the node pointed at.
	pub target: NodeId,
	/// Relationship type.
	pub label: String,
	/// Free-form edge attributes.
	pub attributes: Map<String, Value>,
}

/// The complete dataset. Immutable once built; lookups are indexed by id and
/// outgoing edges keep dataset order.
#[derive(Clone, Debug, Default)]
pub struct FullGraph {
	nodes: Vec<Node>,
	edges: Vec<Edge>,
	by_id: HashMap<NodeId, usize>,
	outgoing: HashMap<NodeId, Vec<usize>>,
}

impl FullGraph {
	/// Indexes the dataset. Fails on duplicate node ids.
	pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self, LoadError> {
		let mut by_id = HashMap::with_capacity(nodes.len());
		for (i, node) in nodes.iter().enumerate() {
			if by_id.insert(node.id.clone(), i).is_some() {
				return Err(LoadError::Invalid(format!("duplicate node id {:?}", node.id)));
			}
		}

		let mut outgoing: HashMap<NodeId, Vec<usize>> = HashMap::new();
		for (i, edge) in edges.iter().enumerate() {
			outgoing.entry(edge.source.clone()).or_default().push(i);
		}

		Ok(Self {
			nodes,
			edges,
			by_id,
			outgoing,
		})
	}

	/// All nodes in dataset order.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// All edges in dataset order.
	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	/// Node with this id.
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.by_id.get(id).map(|&i| &self.nodes[i])
	}

	/// Whether a node has this id.
	pub fn contains(&self, id: &str) -> bool {
		self.by_id.contains_key(id)
	}

	/// Edges whose source is `id`, in dataset order.
	pub fn outgoing(&self, id: &str) -> impl Iterator<Item = &Edge> + '_ {
		self.outgoing
			.get(id)
			.into_iter()
			.flatten()
			.map(|&i| &self.edges[i])
	}

	/// Whether `id` is the source of any edge.
	pub fn has_outgoing(&self, id: &str) -> bool {
		self.outgoing.get(id).is_some_and(|edges| !edges.is_empty())
	}

	/// Edges pointing at ids that do not exist in the node set.
	pub fn dangling_edges(&self) -> impl Iterator<Item = &Edge> + '_ {
		self.edges
			.iter()
			.filter(|e| !self.contains(&e.source) || !self.contains(&e.target))
	}
}

#[cfg(test)]
pub(crate) mod fixtures {
	use super::*;

	pub fn node(id: &str, label: &str) -> Node {
		Node {
			id: id.into(),
			labels: vec![label.into()],
			attributes: NodeAttributes {
				name: format!("Node {id}"),
				..Default::default()
			},
		}
	}

	pub fn edge(source: &str, target: &str) -> Edge {
		Edge {
			source: source.into(),
			target: target.into(),
			label: "child".into(),
			attributes: Map::new(),
		}
	}

	/// Root `R` labelled `HIMO`, everything else `Fonds`.
	pub fn graph(ids: &[&str], edges: &[(&str, &str)]) -> FullGraph {
		let nodes = ids
			.iter()
			.map(|&id| node(id, if id == "R" { "HIMO" } else { "Fonds" }))
			.collect();
		let edges = edges.iter().map(|&(s, t)| edge(s, t)).collect();
		FullGraph::new(nodes, edges).expect("fixture graph")
	}
}
