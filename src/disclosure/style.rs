//! Per-node drawing hints derived from graph state.

use super::config::{DisclosureConfig, FALLBACK_COLORS};
use super::model::{FullGraph, Node, NodeId, Position};
use super::visibility::VisibleGraph;
use super::wrap::{TextMeasure, wrap_label};

/// Label colour on the dark root node.
pub const ROOT_TEXT_COLOR: &str = "white";
/// Label colour everywhere else.
pub const TEXT_COLOR: &str = "black";

/// How a node should look.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeStyle {
	/// Circle fill.
	pub fill: String,
	/// Label colour.
	pub text_color: &'static str,
	/// Has outgoing edges in the full graph, has not been expanded and carries
	/// no link (a tap on a linked node opens the link instead).
	pub expandable: bool,
	/// Shows the external link affordance.
	pub has_link: bool,
}

/// Everything a renderer needs to draw one visible node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeView {
	/// Node id.
	pub id: NodeId,
	/// Where to draw it.
	pub position: Position,
	/// Held in place by a pin.
	pub pinned: bool,
	/// Drawing hints.
	pub style: NodeStyle,
	/// Wrapped name.
	pub lines: Vec<String>,
}

/// Colour for a primary label, falling back to a stable palette slot.
pub fn category_color<'c>(config: &'c DisclosureConfig, label: Option<&str>) -> &'c str {
	let Some(label) = label else {
		return FALLBACK_COLORS[0];
	};
	if let Some(color) = config.category_colors.get(label) {
		return color;
	}
	let slot = label.bytes().fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
	FALLBACK_COLORS[slot % FALLBACK_COLORS.len()]
}

/// Style of a visible node.
pub fn node_style(
	full: &FullGraph,
	visible: &VisibleGraph,
	node: &Node,
	config: &DisclosureConfig,
) -> NodeStyle {
	let parent_override = visible
		.parent_edge(&node.id)
		.and_then(|e| full.node(&e.source))
		.and_then(|parent| config.parent_color_overrides.get(parent.name()));
	let fill = parent_override
		.map(String::as_str)
		.unwrap_or_else(|| category_color(config, node.primary_label()))
		.to_string();

	let expanded = visible.node(&node.id).is_some_and(|n| n.expanded);
	NodeStyle {
		fill,
		text_color: if visible.root() == node.id {
			ROOT_TEXT_COLOR
		} else {
			TEXT_COLOR
		},
		expandable: !expanded && node.url().is_none() && full.has_outgoing(&node.id),
		has_link: node.url().is_some(),
	}
}

/// Snapshot of the visible graph with styles and wrapped labels.
pub fn node_views(
	full: &FullGraph,
	visible: &VisibleGraph,
	config: &DisclosureConfig,
	measure: &impl TextMeasure,
) -> Vec<NodeView> {
	visible
		.nodes()
		.iter()
		.filter_map(|v| {
			let node = full.node(&v.id)?;
			Some(NodeView {
				id: v.id.clone(),
				position: v.pinned.unwrap_or(v.position),
				pinned: v.pinned.is_some(),
				style: node_style(full, visible, node, config),
				lines: wrap_label(node.name(), config.label_wrap_width, measure),
			})
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use rand::SeedableRng;
	use rand::rngs::StdRng;

	use super::*;
	use crate::disclosure::model::fixtures::{edge, node};
	use crate::disclosure::config::RootSelector;
	use crate::disclosure::model::FullGraph;
	use crate::disclosure::visibility::VisibilityController;
	use crate::disclosure::wrap::FixedAdvance;

	fn setup() -> (VisibilityController, DisclosureConfig) {
		let mut root = node("R", "HIMO");
		root.attributes.name = "HIMO".into();
		let mut extra = node("X", "Fonds");
		extra.attributes.name = "Possible extra-archives".into();
		let mut linked = node("L", "Series");
		linked.attributes.url = Some("https://example.org".into());
		let full = FullGraph::new(
			vec![root, extra, linked, node("F", "Fonds"), node("Q", "Unknown")],
			vec![edge("R", "X"), edge("R", "F"), edge("X", "L"), edge("X", "Q")],
		)
		.unwrap();
		let config = DisclosureConfig::default();
		let c = VisibilityController::initialize(
			Arc::new(full),
			&config.root,
			Position::default(),
			config.spawn_jitter,
		)
		.unwrap();
		(c, config)
	}

	#[test]
	fn styles_follow_category_parent_and_state() {
		let (mut c, config) = setup();
		let mut rng = StdRng::seed_from_u64(0);

		let root = node_style(c.full(), c.visible(), c.full().node("R").unwrap(), &config);
		assert_eq!(root.fill, "#020048");
		assert_eq!(root.text_color, ROOT_TEXT_COLOR);
		assert!(root.expandable);

		c.expand("R", &mut rng).unwrap();
		c.expand("X", &mut rng).unwrap();
		let style = |id: &str| node_style(c.full(), c.visible(), c.full().node(id).unwrap(), &config);

		assert!(!style("R").expandable);
		assert_eq!(style("F").fill, "#1f77b4");
		assert!(!style("F").expandable);
		assert_eq!(style("F").text_color, TEXT_COLOR);
		// Children of "Possible extra-archives" take the override colour.
		assert_eq!(style("L").fill, "#56beb9");
		assert!(style("L").has_link);
		assert!(!style("F").has_link);
	}

	#[test]
	fn linked_nodes_are_never_marked_expandable() {
		let config = DisclosureConfig::default();
		let mut root = node("L", "HIMO");
		root.attributes.url = Some("https://example.org".into());
		let full = FullGraph::new(vec![root.clone(), node("C", "Fonds")], vec![edge("L", "C")])
			.unwrap();
		let c = VisibilityController::initialize(
			Arc::new(full),
			&RootSelector::Id("L".into()),
			Position::default(),
			0.0,
		)
		.unwrap();

		let style = node_style(c.full(), c.visible(), &root, &config);
		assert!(style.has_link);
		assert!(!style.expandable);

		root.attributes.url = None;
		assert!(node_style(c.full(), c.visible(), &root, &config).expandable);
	}

	#[test]
	fn unknown_categories_use_a_stable_fallback() {
		let config = DisclosureConfig::default();
		let a = category_color(&config, Some("Whatever"));
		assert_eq!(a, category_color(&config, Some("Whatever")));
		assert!(FALLBACK_COLORS.contains(&a));
		assert_eq!(category_color(&config, None), FALLBACK_COLORS[0]);
	}

	#[test]
	fn views_carry_pins_and_wrapped_names() {
		let (mut c, config) = setup();
		c.visible_mut().set_position("R", Position::new(1.0, 2.0));
		let views = node_views(c.full(), c.visible(), &config, &FixedAdvance(7.0));
		assert_eq!(views.len(), 1);
		assert_eq!(views[0].lines, ["HIMO"]);
		assert_eq!(views[0].position, Position::new(1.0, 2.0));
		assert!(!views[0].pinned);
	}
}
