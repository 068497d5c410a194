pub mod arrow_tool;
pub mod dock;
pub mod input;
pub mod shortcuts;

pub use arrow_tool::{ArrowTool, MIN_DRAW_DISTANCE};
pub use dock::{
    DockDrag, DockPosition, DockState, DragStart, EDGE_SNAP_DISTANCE, PlanTier, Viewport, edge_at,
};
pub use input::{InputEvent, Modifiers};
pub use shortcuts::{ShortcutAction, ShortcutMap};
