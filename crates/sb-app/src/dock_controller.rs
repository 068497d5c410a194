//! Toolbar orchestration: docking state machine + persistence adapter.
//!
//! User-initiated moves go through the lock gate and are persisted on the
//! best available channel; persistence failure raises the degraded flag
//! without blocking the move. Tier downgrades force the dock home and
//! persist the reset, since the now-locked dock would refuse a normal
//! move.

use sb_editor::dock::{DockDrag, DockPosition, DockState, DragStart, PlanTier, Viewport};
use sb_prefs::adapter::PreferencesAdapter;
use sb_prefs::remote::PreferenceTransport;

pub struct DockController<T> {
    dock: DockState,
    drag: DockDrag,
    prefs: PreferencesAdapter<T>,
    user_id: Option<String>,
}

impl<T: PreferenceTransport> DockController<T> {
    pub fn new(prefs: PreferencesAdapter<T>) -> Self {
        Self {
            dock: DockState::new(),
            drag: DockDrag::new(),
            prefs,
            user_id: None,
        }
    }

    pub fn set_user(&mut self, user_id: Option<String>) {
        self.user_id = user_id;
    }

    pub fn dock(&self) -> &DockState {
        &self.dock
    }

    pub fn position(&self) -> DockPosition {
        self.dock.position()
    }

    /// Load the persisted position at startup (remote first when a user
    /// is signed in, local slot otherwise). Absent everywhere keeps the
    /// default edge.
    pub async fn load_position(&mut self) {
        if let Some(position) = self.prefs.load(self.user_id.as_deref()).await {
            self.dock.restore_position(position);
        }
    }

    /// User-initiated move. Rejected while locked or mobile; otherwise
    /// the position changes immediately and the persistence outcome only
    /// affects the degraded flag.
    pub async fn set_position(&mut self, position: DockPosition) -> bool {
        if !self.dock.set_position(position) {
            return false;
        }
        if !self.prefs.save(position, self.user_id.as_deref()).await {
            self.dock.mark_persistence_degraded();
        }
        true
    }

    /// Observe a tier change. A downgrade to Free forces the dock to the
    /// top edge and persists the reset.
    pub async fn set_plan_tier(&mut self, tier: Option<PlanTier>) {
        if self.dock.set_plan_tier(tier)
            && !self
                .prefs
                .save(self.dock.position(), self.user_id.as_deref())
                .await
        {
            self.dock.mark_persistence_degraded();
        }
    }

    pub fn set_mobile(&mut self, mobile: bool) {
        self.dock.set_mobile(mobile);
    }

    // ─── Drag protocol ───────────────────────────────────────────────────

    pub fn drag_start(&mut self, x: f32, y: f32) -> DragStart {
        self.drag.start(x, y, &mut self.dock)
    }

    pub fn drag_update(&mut self, x: f32, y: f32, viewport: Viewport) -> Option<DockPosition> {
        self.drag.update(x, y, viewport)
    }

    /// Finish the drag, committing and persisting the snapped edge.
    pub async fn drag_finish(
        &mut self,
        x: f32,
        y: f32,
        viewport: Viewport,
    ) -> Option<DockPosition> {
        let target = self.drag.finish(x, y, viewport, &mut self.dock)?;
        if self.set_position(target).await {
            Some(target)
        } else {
            None
        }
    }
}
