//! Tunables for disclosure, pinning and styling.

use std::collections::HashMap;
use std::fmt;

use super::model::Node;

/// Sentinel primary label of the entry node.
pub const DEFAULT_ROOT_LABEL: &str = "HIMO";
/// How long an expanded node stays pinned, in milliseconds.
pub const DEFAULT_SETTLE_MS: f64 = 300.0;
/// Side of the square around the source node in which new nodes are seeded.
pub const DEFAULT_SPAWN_JITTER: f64 = 100.0;

/// Palette for categories without a configured colour.
pub const FALLBACK_COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

/// Which node starts the disclosure. The first match in dataset order wins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RootSelector {
	/// First label equals the value.
	PrimaryLabel(String),
	/// Any label equals the value.
	AnyLabel(String),
	/// Node id equals the value.
	Id(String),
}

impl RootSelector {
	/// Whether `node` qualifies as root.
	pub fn matches(&self, node: &Node) -> bool {
		match self {
			RootSelector::PrimaryLabel(label) => node.primary_label() == Some(label.as_str()),
			RootSelector::AnyLabel(label) => node.labels.iter().any(|l| l == label),
			RootSelector::Id(id) => &node.id == id,
		}
	}
}

impl Default for RootSelector {
	fn default() -> Self {
		RootSelector::PrimaryLabel(DEFAULT_ROOT_LABEL.into())
	}
}

impl fmt::Display for RootSelector {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RootSelector::PrimaryLabel(l) => write!(f, "primary-label={l}"),
			RootSelector::AnyLabel(l) => write!(f, "label={l}"),
			RootSelector::Id(id) => write!(f, "id={id}"),
		}
	}
}

/// Tunables for one viewing session.
#[derive(Clone, Debug, PartialEq)]
pub struct DisclosureConfig {
	/// Selects the node disclosure starts from.
	pub root: RootSelector,
	/// Pin duration after an expansion, in milliseconds.
	pub settle_ms: f64,
	/// Side of the square in which revealed nodes are seeded.
	pub spawn_jitter: f64,
	/// Layout energy applied after every change to the visible set.
	pub expand_energy: f64,
	/// Layout energy target held while a node is dragged.
	pub drag_energy_target: f64,
	/// Maximum label line width in pixels.
	pub label_wrap_width: f64,
	/// Fill colour per primary label.
	pub category_colors: HashMap<String, String>,
	/// Overrides the category colour of a node whose visible parent has this name.
	pub parent_color_overrides: HashMap<String, String>,
}

impl Default for DisclosureConfig {
	fn default() -> Self {
		let category_colors = [
			("HIMO", "#020048"),
			("Fonds", "#1f77b4"),
			("Subfonds", "#77a7ca"),
			("Series", "#ebebf8"),
			("Context", "#bc98df"),
			("PendingFonds", "#56beb9"),
		];
		let parent_color_overrides = [
			("Possible extra-archives", "#56beb9"),
			("Archives of Contextualization", "#bc98df"),
		];
		Self {
			root: RootSelector::default(),
			settle_ms: DEFAULT_SETTLE_MS,
			spawn_jitter: DEFAULT_SPAWN_JITTER,
			expand_energy: 0.6,
			drag_energy_target: 0.3,
			label_wrap_width: 80.0,
			category_colors: category_colors
				.into_iter()
				.map(|(k, v)| (k.to_string(), v.to_string()))
				.collect(),
			parent_color_overrides: parent_color_overrides
				.into_iter()
				.map(|(k, v)| (k.to_string(), v.to_string()))
				.collect(),
		}
	}
}

impl DisclosureConfig {
	/// Replaces the root selector.
	pub fn with_root(mut self, root: RootSelector) -> Self {
		self.root = root;
		self
	}

	/// Sets the settle window; negative values become zero.
	pub fn with_settle_ms(mut self, settle_ms: f64) -> Self {
		self.settle_ms = settle_ms.max(0.0);
		self
	}

	/// Sets the spawn square side. Values that are not finite are ignored.
	pub fn with_spawn_jitter(mut self, jitter: f64) -> Self {
		if jitter.is_finite() {
			self.spawn_jitter = jitter.abs();
		}
		self
	}
}
