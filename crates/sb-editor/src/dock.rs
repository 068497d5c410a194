//! Toolbar docking state machine.
//!
//! The tool palette docks to one of the four viewport edges. Whether it
//! may move is derived from the subscription tier (free users are locked
//! to the default edge), and a mobile viewport forces it to the bottom
//! edge while remembering the desktop position for restoration.
//!
//! Repositioning is a drag gesture with two thresholds: a 5-unit movement
//! threshold that separates clicks from drags, and a 50-unit band along
//! each edge that the pointer must release inside for the dock to snap.

use serde::{Deserialize, Serialize};

/// Pointer must travel this far before a press becomes a drag.
pub const DRAG_MOVE_THRESHOLD: f32 = 5.0;

/// Width of the snap band along each viewport edge.
pub const EDGE_SNAP_DISTANCE: f32 = 50.0;

/// The viewport (window) dimensions, in the same units as pointer events.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
        }
    }
}

/// Edge the toolbar is docked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DockPosition {
    #[default]
    Top,
    Bottom,
    Left,
    Right,
}

impl DockPosition {
    pub const ALL: [DockPosition; 4] = [
        DockPosition::Top,
        DockPosition::Bottom,
        DockPosition::Left,
        DockPosition::Right,
    ];
}

/// Subscription tier, as resolved by the (external) auth provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Basic,
    Pro,
}

/// Which edge, if any, the pointer is inside the snap band of.
///
/// Top/bottom win over left/right when a corner satisfies both bands.
pub fn edge_at(x: f32, y: f32, viewport: Viewport) -> Option<DockPosition> {
    if y < EDGE_SNAP_DISTANCE {
        Some(DockPosition::Top)
    } else if y > viewport.height - EDGE_SNAP_DISTANCE {
        Some(DockPosition::Bottom)
    } else if x < EDGE_SNAP_DISTANCE {
        Some(DockPosition::Left)
    } else if x > viewport.width - EDGE_SNAP_DISTANCE {
        Some(DockPosition::Right)
    } else {
        None
    }
}

// ─── Dock state ──────────────────────────────────────────────────────────

/// The toolbar's docking state.
#[derive(Debug, Clone, Default)]
pub struct DockState {
    position: DockPosition,
    locked: bool,
    mobile: bool,
    pub dragging: bool,
    /// Desktop position remembered while the mobile override is active.
    saved_desktop_position: Option<DockPosition>,
    /// Raised when a position change could not be persisted. The in-memory
    /// position stays authoritative; this flag exists for observability.
    persistence_degraded: bool,
    last_tier: Option<PlanTier>,
    tier_seen: bool,
}

impl DockState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a persisted position (falls back to the default edge).
    pub fn with_position(position: Option<DockPosition>) -> Self {
        Self {
            position: position.unwrap_or_default(),
            ..Self::default()
        }
    }

    pub fn position(&self) -> DockPosition {
        self.position
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_mobile(&self) -> bool {
        self.mobile
    }

    pub fn persistence_degraded(&self) -> bool {
        self.persistence_degraded
    }

    pub fn mark_persistence_degraded(&mut self) {
        if !self.persistence_degraded {
            log::warn!("toolbar position persistence degraded; keeping in-memory state");
        }
        self.persistence_degraded = true;
    }

    /// Request a user-initiated move. Rejected (no-op, returns false)
    /// while the dock is locked or the mobile override is active.
    pub fn set_position(&mut self, position: DockPosition) -> bool {
        if self.locked || self.mobile {
            return false;
        }
        self.position = position;
        true
    }

    /// System-initiated move that bypasses the lock gate (tier downgrade
    /// reset, mobile override).
    fn force_position(&mut self, position: DockPosition) {
        self.position = position;
    }

    /// Restore a persisted position at startup. System-initiated, so it
    /// bypasses the lock gate like the other forced moves.
    pub fn restore_position(&mut self, position: DockPosition) {
        self.force_position(position);
    }

    /// Derive the lock flag from the tier. Free locks; Basic and Pro
    /// unlock. An absent tier unlocks — guests are treated as
    /// unrestricted, matching the product's current behavior.
    pub fn update_lock_state(&mut self, tier: Option<PlanTier>) {
        self.locked = tier == Some(PlanTier::Free);
    }

    /// Observe a (possibly unchanged) tier. A transition from any
    /// non-free tier to Free resets the position to the default edge as a
    /// downgrade safety net, bypassing the lock gate, then re-derives the
    /// lock flag. Returns whether the reset fired.
    pub fn set_plan_tier(&mut self, tier: Option<PlanTier>) -> bool {
        let downgraded =
            self.tier_seen && tier == Some(PlanTier::Free) && self.last_tier != Some(PlanTier::Free);
        if downgraded {
            log::debug!("tier downgraded to free; resetting toolbar to the top edge");
            self.force_position(DockPosition::Top);
        }
        self.update_lock_state(tier);
        self.last_tier = tier;
        self.tier_seen = true;
        downgraded
    }

    /// Toggle the mobile override. Entering mobile stores the current
    /// position and forces the dock to the bottom edge; leaving restores
    /// the stored position and clears the slot.
    pub fn set_mobile(&mut self, mobile: bool) {
        if mobile && !self.mobile {
            self.saved_desktop_position = Some(self.position);
            self.force_position(DockPosition::Bottom);
            self.mobile = true;
        } else if !mobile && self.mobile {
            self.mobile = false;
            if let Some(saved) = self.saved_desktop_position.take() {
                self.force_position(saved);
            }
        }
    }
}

// ─── Drag gesture ────────────────────────────────────────────────────────

/// Outcome of a drag-start attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragStart {
    Started,
    /// Rejected because the tier locks the dock. Hosts typically answer
    /// with an upgrade prompt.
    RejectedLocked,
    /// Rejected because the mobile override pins the dock.
    RejectedMobile,
}

/// One toolbar drag gesture. Mirrors the drawing-tool protocol: press,
/// moves with a live snap preview, release commits or aborts.
#[derive(Debug, Default)]
pub struct DockDrag {
    origin: Option<(f32, f32)>,
    moved: bool,
}

impl DockDrag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.origin.is_some()
    }

    /// Begin a gesture at the pressed position.
    pub fn start(&mut self, x: f32, y: f32, dock: &mut DockState) -> DragStart {
        if dock.is_locked() {
            return DragStart::RejectedLocked;
        }
        if dock.is_mobile() {
            return DragStart::RejectedMobile;
        }
        self.origin = Some((x, y));
        self.moved = false;
        dock.dragging = true;
        DragStart::Started
    }

    /// Track pointer movement. Returns the edge currently previewed as
    /// the snap target, or None while the gesture is still a click or the
    /// pointer is outside every snap band.
    pub fn update(&mut self, x: f32, y: f32, viewport: Viewport) -> Option<DockPosition> {
        let (ox, oy) = self.origin?;
        if !self.moved && ((x - ox).abs() > DRAG_MOVE_THRESHOLD || (y - oy).abs() > DRAG_MOVE_THRESHOLD)
        {
            self.moved = true;
        }
        if !self.moved {
            return None;
        }
        edge_at(x, y, viewport)
    }

    /// Release the pointer. Returns the edge to commit, or None when the
    /// gesture never became a drag or released outside every snap band.
    /// The gesture always resets.
    pub fn finish(&mut self, x: f32, y: f32, viewport: Viewport, dock: &mut DockState) -> Option<DockPosition> {
        dock.dragging = false;
        let active = self.origin.is_some();
        let target = self.update(x, y, viewport);
        self.origin = None;
        self.moved = false;
        if !active {
            return None;
        }
        target
    }
}
