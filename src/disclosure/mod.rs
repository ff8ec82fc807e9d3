//! Progressive disclosure engine: drawing-independent state and transitions.

pub mod config;
pub mod error;
pub mod lock;
pub mod model;
pub mod router;
pub mod session;
pub mod store;
pub mod style;
pub mod visibility;
pub mod wrap;

pub use config::{DisclosureConfig, RootSelector};
pub use error::{ExpandError, LoadError, RootNotFoundError};
pub use lock::{ExpansionLockCoordinator, ReleaseHandle};
pub use model::{Edge, FullGraph, Node, NodeAttributes, NodeId, Position};
pub use router::{Gesture, Layout, Outcome, SideEffect, dispatch};
pub use session::Session;
pub use store::GraphStore;
pub use style::{NodeStyle, NodeView};
pub use visibility::{ExpansionDelta, VisibilityController, VisibleEdge, VisibleGraph};
pub use wrap::{TextMeasure, wrap_label};
