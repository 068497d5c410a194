//! Arrow drawing tool.
//!
//! A short-lived gesture machine: idle → drawing → committed or aborted,
//! one cycle per pointer down/up pair. While drawing, the tool exposes a
//! live preview segment; an arrow record is only created on release, and
//! only when the gesture covered a meaningful distance.

use crate::input::InputEvent;
use sb_core::id::ElementId;
use sb_core::model::{Arrow, Point};

/// Minimum straight-line drag distance for a release to commit an arrow.
/// Anything at or under this is treated as a click and aborted.
pub const MIN_DRAW_DISTANCE: f32 = 10.0;

/// The arrow drawing session.
pub struct ArrowTool {
    /// Global "arrow mode". While disabled, pointer gestures never enter
    /// the drawing state (clicks fall through to selection).
    enabled: bool,
    drawing: bool,
    start: Option<Point>,
    current: Option<Point>,
}

impl Default for ArrowTool {
    fn default() -> Self {
        Self::new()
    }
}

impl ArrowTool {
    pub fn new() -> Self {
        Self {
            enabled: false,
            drawing: false,
            start: None,
            current: None,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.reset();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    /// The live preview segment while a gesture is in flight.
    pub fn preview(&self) -> Option<(Point, Point)> {
        match (self.start, self.current) {
            (Some(s), Some(c)) if self.drawing => Some((s, c)),
            _ => None,
        }
    }

    /// Feed a pointer event. Returns the committed arrow exactly once per
    /// gesture, on the release that passes the distance gate.
    pub fn handle(&mut self, event: &InputEvent) -> Option<Arrow> {
        if !self.enabled {
            return None;
        }
        match event {
            InputEvent::PointerDown { x, y } => {
                self.drawing = true;
                self.start = Some(Point::new(*x, *y));
                self.current = self.start;
                None
            }
            InputEvent::PointerMove { x, y } => {
                if self.drawing {
                    self.current = Some(Point::new(*x, *y));
                }
                None
            }
            InputEvent::PointerUp { x, y } => {
                if !self.drawing {
                    return None;
                }
                let start = self.start?;
                let end = Point::new(*x, *y);
                self.reset();

                if start.distance_to(end) > MIN_DRAW_DISTANCE {
                    Some(Arrow::with_endpoints(
                        ElementId::generate("arrow"),
                        start,
                        end,
                    ))
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    fn reset(&mut self) {
        self.drawing = false;
        self.start = None;
        self.current = None;
    }
}
