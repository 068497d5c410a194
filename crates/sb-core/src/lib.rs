pub mod document;
pub mod history;
pub mod id;
pub mod layout;
pub mod model;

pub use document::CanvasDocument;
pub use history::{History, MAX_HISTORY_DEPTH, Snapshot};
pub use id::ElementId;
pub use layout::{FlowEdge, FlowNode, FlowSpec, layout_flow};
pub use model::*;
