//! Core data model for StratBoard canvas documents.
//!
//! A document is three flat collections: typed **nodes** placed on the
//! canvas, directed **edges** connecting node ids, and free-form **arrow**
//! connectors that are not bound to any node. Payloads are updated through
//! patch types — presentation code never mutates a payload in place, which
//! keeps history snapshots free of aliasing.

use crate::id::ElementId;
use serde::{Deserialize, Serialize};

// ─── Geometry ────────────────────────────────────────────────────────────

/// A point in canvas coordinate space (independent of the viewport).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

// ─── Color ───────────────────────────────────────────────────────────────

/// RGBA color, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The leading `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return None;
        }
        let wide = |s: &str| u8::from_str_radix(s, 16).ok();
        let narrow = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v * 17);

        match hex.len() {
            3 | 4 => {
                let r = narrow(&hex[0..1])?;
                let g = narrow(&hex[1..2])?;
                let b = narrow(&hex[2..3])?;
                let a = if hex.len() == 4 {
                    narrow(&hex[3..4])?
                } else {
                    255
                };
                Some(Self { r, g, b, a })
            }
            6 | 8 => {
                let r = wide(&hex[0..2])?;
                let g = wide(&hex[2..4])?;
                let b = wide(&hex[4..6])?;
                let a = if hex.len() == 8 { wide(&hex[6..8])? } else { 255 };
                Some(Self { r, g, b, a })
            }
            _ => None,
        }
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

// ─── Node payloads ───────────────────────────────────────────────────────

/// Shape assigned to a flowchart node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeShape {
    #[default]
    Process,
    Decision,
    Circle,
    Parallelogram,
}

/// The fixed palette for post-it notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostItColor {
    #[default]
    Yellow,
    Pink,
    Blue,
    Green,
    Orange,
}

/// Flowchart node payload: a labelled shape with optional detail text and
/// per-node color overrides.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShapeData {
    pub label: String,
    pub details: Option<String>,
    pub shape: NodeShape,
    pub background_color: Option<Color>,
    pub stroke_color: Option<Color>,
    pub text_color: Option<Color>,
}

/// Free-text note payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextData {
    pub text: String,
}

/// Image payload — `src` is an opaque source reference interpreted by the
/// renderer (URL or data URI).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageData {
    pub src: String,
    pub alt: Option<String>,
}

/// Sticker payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StickerData {
    pub src: String,
}

/// Post-it note payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostItData {
    pub text: String,
    pub color: PostItColor,
    pub rotation: f32,
    pub has_shadow: bool,
    pub width: f32,
    pub height: f32,
}

impl Default for PostItData {
    fn default() -> Self {
        Self {
            text: String::new(),
            color: PostItColor::Yellow,
            rotation: 0.0,
            has_shadow: true,
            width: 180.0,
            height: 180.0,
        }
    }
}

/// Resizable text box payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResizableTextData {
    pub title: Option<String>,
    pub text: String,
    pub width: f32,
    pub height: f32,
    pub min_width: f32,
    pub min_height: f32,
    pub rotation: f32,
    pub background_color: Option<Color>,
    pub text_color: Option<Color>,
}

impl Default for ResizableTextData {
    fn default() -> Self {
        Self {
            title: None,
            text: String::new(),
            width: 240.0,
            height: 120.0,
            min_width: 120.0,
            min_height: 60.0,
            rotation: 0.0,
            background_color: None,
            text_color: None,
        }
    }
}

/// The closed set of node payload variants. The renderer interprets the
/// payload; this crate only stores and patches it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodePayload {
    Shape(ShapeData),
    Text(TextData),
    Image(ImageData),
    Sticker(StickerData),
    PostIt(PostItData),
    ResizableText(ResizableTextData),
}

impl NodePayload {
    /// Short label for logs and debug output.
    pub fn kind(&self) -> &'static str {
        match self {
            NodePayload::Shape(_) => "shape",
            NodePayload::Text(_) => "text",
            NodePayload::Image(_) => "image",
            NodePayload::Sticker(_) => "sticker",
            NodePayload::PostIt(_) => "postit",
            NodePayload::ResizableText(_) => "resizable_text",
        }
    }

    /// Apply a patch, overwriting only the fields the patch carries.
    /// Returns false (and changes nothing) when the patch targets a
    /// different payload variant.
    pub fn apply(&mut self, patch: &PayloadPatch) -> bool {
        match (self, patch) {
            (NodePayload::Shape(d), PayloadPatch::Shape(p)) => {
                merge(&mut d.label, &p.label);
                merge_opt(&mut d.details, &p.details);
                merge(&mut d.shape, &p.shape);
                merge_opt(&mut d.background_color, &p.background_color);
                merge_opt(&mut d.stroke_color, &p.stroke_color);
                merge_opt(&mut d.text_color, &p.text_color);
                true
            }
            (NodePayload::Text(d), PayloadPatch::Text(p)) => {
                merge(&mut d.text, &p.text);
                true
            }
            (NodePayload::Image(d), PayloadPatch::Image(p)) => {
                merge(&mut d.src, &p.src);
                merge_opt(&mut d.alt, &p.alt);
                true
            }
            (NodePayload::Sticker(d), PayloadPatch::Sticker(p)) => {
                merge(&mut d.src, &p.src);
                true
            }
            (NodePayload::PostIt(d), PayloadPatch::PostIt(p)) => {
                merge(&mut d.text, &p.text);
                merge(&mut d.color, &p.color);
                merge(&mut d.rotation, &p.rotation);
                merge(&mut d.has_shadow, &p.has_shadow);
                merge(&mut d.width, &p.width);
                merge(&mut d.height, &p.height);
                true
            }
            (NodePayload::ResizableText(d), PayloadPatch::ResizableText(p)) => {
                merge_opt(&mut d.title, &p.title);
                merge(&mut d.text, &p.text);
                merge(&mut d.width, &p.width);
                merge(&mut d.height, &p.height);
                merge(&mut d.rotation, &p.rotation);
                merge_opt(&mut d.background_color, &p.background_color);
                merge_opt(&mut d.text_color, &p.text_color);
                true
            }
            _ => false,
        }
    }
}

/// Overwrite `dst` when the patch field is present.
fn merge<T: Clone>(dst: &mut T, src: &Option<T>) {
    if let Some(v) = src {
        *dst = v.clone();
    }
}

/// Overwrite an optional field when the patch field is present.
fn merge_opt<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
    if src.is_some() {
        *dst = src.clone();
    }
}

// ─── Payload patches ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShapePatch {
    pub label: Option<String>,
    pub details: Option<String>,
    pub shape: Option<NodeShape>,
    pub background_color: Option<Color>,
    pub stroke_color: Option<Color>,
    pub text_color: Option<Color>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextPatch {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImagePatch {
    pub src: Option<String>,
    pub alt: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StickerPatch {
    pub src: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostItPatch {
    pub text: Option<String>,
    pub color: Option<PostItColor>,
    pub rotation: Option<f32>,
    pub has_shadow: Option<bool>,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResizableTextPatch {
    pub title: Option<String>,
    pub text: Option<String>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub rotation: Option<f32>,
    pub background_color: Option<Color>,
    pub text_color: Option<Color>,
}

/// A partial update for one payload variant. Built by editors and applied
/// by the document store — a node's payload is replaced wholesale, never
/// written through from the view layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PayloadPatch {
    Shape(ShapePatch),
    Text(TextPatch),
    Image(ImagePatch),
    Sticker(StickerPatch),
    PostIt(PostItPatch),
    ResizableText(ResizableTextPatch),
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// A visual element placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: ElementId,
    pub position: Point,
    pub payload: NodePayload,
    /// Transient selection flag — not part of persisted document state.
    #[serde(skip)]
    pub selected: bool,
}

impl Node {
    pub fn new(id: ElementId, position: Point, payload: NodePayload) -> Self {
        Self {
            id,
            position,
            payload,
            selected: false,
        }
    }
}

// ─── Edges ───────────────────────────────────────────────────────────────

/// A directed connection between two nodes. Endpoints are ids; the model
/// does not enforce that they exist — deleting a node cascade-removes its
/// edges, but creation accepts whatever the caller hands in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: ElementId,
    pub source: ElementId,
    pub target: ElementId,
    /// Display hint for the renderer.
    pub animated: bool,
    pub label: Option<String>,
    pub stroke: Option<Color>,
}

impl Edge {
    pub fn new(id: ElementId, source: ElementId, target: ElementId) -> Self {
        Self {
            id,
            source,
            target,
            animated: false,
            label: None,
            stroke: None,
        }
    }
}

// ─── Arrows ──────────────────────────────────────────────────────────────

/// Line style of a free-form arrow connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

/// Head style of a free-form arrow connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowHead {
    #[default]
    Triangle,
    Circle,
    Diamond,
    None,
}

/// Default color for newly drawn arrows.
pub const ARROW_DEFAULT_COLOR: Color = Color::rgb(0xE5, 0xE5, 0xE5);

/// Default stroke width for newly drawn arrows.
pub const ARROW_DEFAULT_STROKE_WIDTH: f32 = 2.0;

/// A free-form connector between two canvas points, independent of nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    pub id: ElementId,
    pub start: Point,
    pub end: Point,
    pub style: ArrowStyle,
    pub head: ArrowHead,
    pub color: Color,
    pub stroke_width: f32,
}

impl Arrow {
    /// Build an arrow with the drawn endpoints and the default style.
    pub fn with_endpoints(id: ElementId, start: Point, end: Point) -> Self {
        Self {
            id,
            start,
            end,
            style: ArrowStyle::Solid,
            head: ArrowHead::Triangle,
            color: ARROW_DEFAULT_COLOR,
            stroke_width: ARROW_DEFAULT_STROKE_WIDTH,
        }
    }

    /// Apply a patch, overwriting only the fields the patch carries.
    pub fn apply(&mut self, patch: &ArrowPatch) {
        merge(&mut self.start, &patch.start);
        merge(&mut self.end, &patch.end);
        merge(&mut self.style, &patch.style);
        merge(&mut self.head, &patch.head);
        merge(&mut self.color, &patch.color);
        merge(&mut self.stroke_width, &patch.stroke_width);
    }
}

/// A partial update for an arrow's endpoints or styling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArrowPatch {
    pub start: Option<Point>,
    pub end: Option<Point>,
    pub style: Option<ArrowStyle>,
    pub head: Option<ArrowHead>,
    pub color: Option<Color>,
    pub stroke_width: Option<f32>,
}
