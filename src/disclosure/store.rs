//! Dataset parsing and the shared, read-only full graph.

use std::sync::Arc;

use log::{info, warn};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::config::RootSelector;
use super::error::LoadError;
use super::model::{Edge, FullGraph, Node, NodeAttributes};
use super::visibility::find_root;

/// Ids may be exported as strings or as integers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
	Text(String),
	Number(i64),
}

impl From<RawId> for String {
	fn from(id: RawId) -> Self {
		match id {
			RawId::Text(s) => s,
			RawId::Number(n) => n.to_string(),
		}
	}
}

#[derive(Deserialize)]
struct RawAttributes {
	name: String,
	#[serde(default)]
	url: Option<String>,
	#[serde(flatten)]
	extra: Map<String, Value>,
}

#[derive(Deserialize)]
struct RawNode {
	id: RawId,
	#[serde(default)]
	labels: Vec<String>,
	attributes: RawAttributes,
}

#[derive(Deserialize)]
struct RawEdge {
	#[serde(alias = "sourceId")]
	source: RawId,
	#[serde(alias = "targetId")]
	target: RawId,
	#[serde(default)]
	label: String,
	#[serde(default)]
	attributes: Map<String, Value>,
}

#[derive(Deserialize)]
struct RawDataset {
	nodes: Vec<RawNode>,
	#[serde(default)]
	edges: Vec<RawEdge>,
}

impl From<RawNode> for Node {
	fn from(raw: RawNode) -> Self {
		let url = raw.attributes.url.filter(|u| !u.trim().is_empty());
		Node {
			id: raw.id.into(),
			labels: raw.labels,
			attributes: NodeAttributes {
				name: raw.attributes.name,
				url,
				extra: raw.attributes.extra,
			},
		}
	}
}

impl From<RawEdge> for Edge {
	fn from(raw: RawEdge) -> Self {
		Edge {
			source: raw.source.into(),
			target: raw.target.into(),
			label: raw.label,
			attributes: raw.attributes,
		}
	}
}

/// Owner of the full dataset. Cloning shares the same graph.
#[derive(Clone, Debug)]
pub struct GraphStore {
	graph: Arc<FullGraph>,
}

impl GraphStore {
	/// Parses a JSON dataset and checks that `root` selects a node.
	pub fn load(source: &str, root: &RootSelector) -> Result<Self, LoadError> {
		let raw: RawDataset = serde_json::from_str(source)?;
		let nodes = raw.nodes.into_iter().map(Node::from).collect();
		let edges = raw.edges.into_iter().map(Edge::from).collect();
		Self::from_graph(FullGraph::new(nodes, edges)?, root)
	}

	/// Wraps an already built graph after checking the root.
	pub fn from_graph(graph: FullGraph, root: &RootSelector) -> Result<Self, LoadError> {
		find_root(&graph, root)?;

		let dangling = graph.dangling_edges().count();
		if dangling > 0 {
			warn!("{} edges reference unknown nodes and will never be shown", dangling);
		}
		info!(
			"Loaded graph with {} nodes and {} edges",
			graph.nodes().len(),
			graph.edges().len()
		);
		Ok(Self {
			graph: Arc::new(graph),
		})
	}

	/// The full graph.
	pub fn graph(&self) -> &FullGraph {
		&self.graph
	}

	/// Shared handle to the full graph.
	pub fn shared(&self) -> Arc<FullGraph> {
		Arc::clone(&self.graph)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::disclosure::error::RootNotFoundError;

	const DATASET: &str = r#"{
		"nodes": [
			{"id": 1, "labels": ["HIMO"], "attributes": {"name": "HIMO"}},
			{"id": "2", "labels": ["Fonds", "Archive"], "attributes": {"name": "Fonds A", "url": "https://example.org", "year": 1920}},
			{"id": 3, "labels": ["Series"], "attributes": {"name": "Series B", "url": ""}}
		],
		"edges": [
			{"source": 1, "target": 2, "label": "child", "attributes": {}},
			{"sourceId": "1", "targetId": 3, "label": "child"},
			{"source": 3, "target": 99, "label": "child"}
		]
	}"#;

	#[test]
	fn loads_nodes_edges_and_typed_attributes() {
		let store = GraphStore::load(DATASET, &RootSelector::default()).unwrap();
		let g = store.graph();
		assert_eq!(g.nodes().len(), 3);
		assert_eq!(g.edges().len(), 3);

		let fonds = g.node("2").unwrap();
		assert_eq!(fonds.primary_label(), Some("Fonds"));
		assert_eq!(fonds.url(), Some("https://example.org"));
		assert_eq!(fonds.attributes.extra.get("year"), Some(&Value::from(1920)));

		// Empty url strings carry no link.
		assert_eq!(g.node("3").unwrap().url(), None);
		assert_eq!(g.outgoing("1").count(), 2);
	}

	#[test]
	fn missing_root_is_a_load_error() {
		let err = GraphStore::load(DATASET, &RootSelector::PrimaryLabel("Nope".into())).unwrap_err();
		assert_eq!(
			err,
			LoadError::RootNotFound(RootNotFoundError {
				selector: "primary-label=Nope".into()
			})
		);
	}

	#[test]
	fn malformed_documents_are_parse_errors() {
		let cases = [
			"not json",
			r#"{"edges": []}"#,
			r#"{"nodes": [{"id": 1, "labels": ["HIMO"], "attributes": {}}]}"#,
			r#"{"nodes": [{"id": 1, "labels": ["HIMO"], "attributes": {"name": "x", "url": 5}}]}"#,
		];
		for case in cases {
			let err = GraphStore::load(case, &RootSelector::default()).unwrap_err();
			assert!(matches!(err, LoadError::Parse(_)), "{case}: {err:?}");
		}
	}

	#[test]
	fn clones_share_the_graph() {
		let store = GraphStore::load(DATASET, &RootSelector::default()).unwrap();
		let other = store.clone();
		assert!(Arc::ptr_eq(&store.shared(), &other.shared()));
	}
}
