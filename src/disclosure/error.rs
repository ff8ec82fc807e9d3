//! Errors raised while loading a dataset or expanding nodes.

use thiserror::Error;

use super::model::NodeId;

/// Failure to produce a usable dataset. The viewer stays inert when this is
/// returned.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum LoadError {
	/// The dataset could not be retrieved.
	#[error("failed to fetch dataset: {0}")]
	Fetch(String),
	/// The document is not a well-formed dataset.
	#[error("malformed dataset: {0}")]
	Parse(String),
	/// The document parsed but breaks a dataset rule, such as unique ids.
	#[error("invalid dataset: {0}")]
	Invalid(String),
	/// No node satisfies the root selector.
	#[error(transparent)]
	RootNotFound(#[from] RootNotFoundError),
}

impl From<serde_json::Error> for LoadError {
	fn from(err: serde_json::Error) -> Self {
		LoadError::Parse(err.to_string())
	}
}

/// No node in the dataset matches the configured root selector.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("no node matches root selector {selector}")]
pub struct RootNotFoundError {
	/// Display form of the selector that found nothing.
	pub selector: String,
}

/// Rejected expansion request.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ExpandError {
	/// The node has not been revealed yet.
	#[error("node {0:?} is not part of the visible graph")]
	NotVisible(NodeId),
}
