//! Seams to the AI collaborators.
//!
//! Flow generation, summarization, and sketch processing are external
//! services consumed through traits. Generation and summarization are NOT
//! auto-retried — one failure surfaces to the user immediately. Sketch
//! processing is wrapped in a bounded retry with exponential backoff
//! before its error escapes. Upload validation runs synchronously and
//! rejects bad files before anything reaches the document.

use crate::error::AiError;
use sb_core::id::ElementId;
use sb_core::layout::FlowSpec;
use sb_core::model::{
    Edge, ImageData, Node, NodePayload, NodeShape, Point, ShapeData, TextData,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Generates and summarizes flows from natural-language prompts.
pub trait FlowGenerator {
    /// Turn a prompt into a flow description, or `None` when the service
    /// produced no usable answer.
    fn generate_flow(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<Option<FlowSpec>, AiError>> + Send;

    /// Summarize the given node labels into report text.
    fn summarize(
        &self,
        labels: &[String],
    ) -> impl std::future::Future<Output = Result<String, AiError>> + Send;
}

/// Converts a hand-drawn sketch image into canvas elements.
pub trait SketchProcessor {
    fn process_sketch(
        &self,
        upload: &SketchUpload,
    ) -> impl std::future::Future<Output = Result<SketchImport, AiError>> + Send;
}

// ─── Sketch upload validation ────────────────────────────────────────────

/// Accepted sketch image encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SketchFormat {
    Png,
    Jpeg,
    Webp,
}

/// Upload size cap, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// A sketch image handed in by the user.
#[derive(Debug, Clone)]
pub struct SketchUpload {
    pub bytes: Vec<u8>,
    pub format: SketchFormat,
}

/// Why an upload was rejected before processing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("empty upload")]
    Empty,
    #[error("file exceeds the {max} byte limit (got {got})")]
    TooLarge { got: usize, max: usize },
}

/// Synchronous validation: format membership is enforced by the type,
/// size and emptiness are checked here. Rejected uploads never reach the
/// processor or the document.
pub fn validate_upload(upload: &SketchUpload) -> Result<(), UploadError> {
    if upload.bytes.is_empty() {
        return Err(UploadError::Empty);
    }
    if upload.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge {
            got: upload.bytes.len(),
            max: MAX_UPLOAD_BYTES,
        });
    }
    Ok(())
}

// ─── Sketch processing wire shape ────────────────────────────────────────

/// Node kind recognized in a sketch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SketchNodeKind {
    Shape,
    Text,
    Image,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SketchNodeData {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub shape: Option<NodeShape>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SketchNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SketchNodeKind,
    pub position: Point,
    pub data: SketchNodeData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SketchEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub animated: bool,
}

/// The sketch processor's answer: typed, positioned elements.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SketchImport {
    pub nodes: Vec<SketchNode>,
    pub edges: Vec<SketchEdge>,
}

impl SketchImport {
    /// Convert the wire shape into document nodes and edges.
    pub fn into_document_parts(self) -> (Vec<Node>, Vec<Edge>) {
        let nodes = self
            .nodes
            .into_iter()
            .map(|n| {
                let payload = match n.kind {
                    SketchNodeKind::Shape => NodePayload::Shape(ShapeData {
                        label: n.data.label.unwrap_or_default(),
                        shape: n.data.shape.unwrap_or_default(),
                        ..Default::default()
                    }),
                    SketchNodeKind::Text => NodePayload::Text(TextData {
                        text: n.data.text.unwrap_or_default(),
                    }),
                    SketchNodeKind::Image => NodePayload::Image(ImageData::default()),
                };
                Node::new(ElementId::intern(&n.id), n.position, payload)
            })
            .collect();

        let edges = self
            .edges
            .into_iter()
            .map(|e| {
                let mut edge = Edge::new(
                    ElementId::intern(&e.id),
                    ElementId::intern(&e.source),
                    ElementId::intern(&e.target),
                );
                edge.animated = e.animated;
                edge
            })
            .collect();

        (nodes, edges)
    }
}

// ─── Sketch retry wrapper ────────────────────────────────────────────────

/// Attempts for one sketch processing call.
pub const SKETCH_MAX_ATTEMPTS: u32 = 3;

/// Base backoff delay between sketch attempts, doubled after each failure.
pub const SKETCH_BASE_DELAY: Duration = Duration::from_secs(1);

/// Run the processor with bounded retries. The delay doubles after every
/// failed attempt; the last error escapes once attempts are exhausted.
pub async fn process_sketch_with_retry<P: SketchProcessor>(
    processor: &P,
    upload: &SketchUpload,
    base_delay: Duration,
) -> Result<SketchImport, AiError> {
    let mut last: Option<AiError> = None;
    for attempt in 0..SKETCH_MAX_ATTEMPTS {
        if attempt > 0 {
            tokio::time::sleep(base_delay * 2u32.saturating_pow(attempt - 1)).await;
        }
        match processor.process_sketch(upload).await {
            Ok(import) => return Ok(import),
            Err(e) => {
                log::warn!(
                    "sketch processing attempt {}/{SKETCH_MAX_ATTEMPTS} failed: {e}",
                    attempt + 1
                );
                last = Some(e);
            }
        }
    }
    Err(last.unwrap_or_else(|| AiError::new("sketch processing failed")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakySketcher {
        failures: AtomicU32,
        calls: AtomicU32,
    }

    impl FlakySketcher {
        fn failing(n: u32) -> Self {
            Self {
                failures: AtomicU32::new(n),
                calls: AtomicU32::new(0),
            }
        }
    }

    impl SketchProcessor for FlakySketcher {
        async fn process_sketch(&self, _upload: &SketchUpload) -> Result<SketchImport, AiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(AiError::new("vision model unavailable"));
            }
            Ok(SketchImport {
                nodes: vec![SketchNode {
                    id: "s1".into(),
                    kind: SketchNodeKind::Shape,
                    position: Point::new(10.0, 20.0),
                    data: SketchNodeData {
                        label: Some("Box".into()),
                        ..Default::default()
                    },
                }],
                edges: vec![],
            })
        }
    }

    fn upload() -> SketchUpload {
        SketchUpload {
            bytes: vec![0u8; 128],
            format: SketchFormat::Png,
        }
    }

    #[test]
    fn validation_rejects_oversized_and_empty() {
        assert_eq!(
            validate_upload(&SketchUpload {
                bytes: vec![],
                format: SketchFormat::Jpeg,
            }),
            Err(UploadError::Empty)
        );

        let huge = SketchUpload {
            bytes: vec![0u8; MAX_UPLOAD_BYTES + 1],
            format: SketchFormat::Webp,
        };
        assert!(matches!(
            validate_upload(&huge),
            Err(UploadError::TooLarge { .. })
        ));

        assert_eq!(validate_upload(&upload()), Ok(()));
    }

    #[tokio::test]
    async fn retry_recovers_from_transient_failures() {
        let sketcher = FlakySketcher::failing(2);
        let import = process_sketch_with_retry(&sketcher, &upload(), Duration::from_millis(1))
            .await
            .unwrap();
        assert_eq!(import.nodes.len(), 1);
        assert_eq!(sketcher.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retry_gives_up_after_three_attempts() {
        let sketcher = FlakySketcher::failing(10);
        let err = process_sketch_with_retry(&sketcher, &upload(), Duration::from_millis(1))
            .await
            .unwrap_err();
        assert_eq!(sketcher.calls.load(Ordering::SeqCst), 3);
        assert!(err.to_string().contains("unavailable"));
    }

    #[test]
    fn sketch_import_converts_to_document_parts() {
        let import = SketchImport {
            nodes: vec![
                SketchNode {
                    id: "a".into(),
                    kind: SketchNodeKind::Shape,
                    position: Point::new(0.0, 0.0),
                    data: SketchNodeData {
                        label: Some("Start".into()),
                        shape: Some(NodeShape::Decision),
                        ..Default::default()
                    },
                },
                SketchNode {
                    id: "b".into(),
                    kind: SketchNodeKind::Text,
                    position: Point::new(100.0, 0.0),
                    data: SketchNodeData {
                        text: Some("note".into()),
                        ..Default::default()
                    },
                },
            ],
            edges: vec![SketchEdge {
                id: "e1".into(),
                source: "a".into(),
                target: "b".into(),
                animated: true,
            }],
        };

        let (nodes, edges) = import.into_document_parts();
        assert_eq!(nodes.len(), 2);
        match &nodes[0].payload {
            NodePayload::Shape(d) => {
                assert_eq!(d.label, "Start");
                assert_eq!(d.shape, NodeShape::Decision);
            }
            _ => panic!("expected shape payload"),
        }
        assert_eq!(edges.len(), 1);
        assert!(edges[0].animated);
    }

    #[test]
    fn wire_shape_parses_from_json() {
        let json = r#"{
            "nodes": [
                {"id": "n1", "type": "shape", "position": {"x": 5.0, "y": 6.0},
                 "data": {"label": "Draw", "shape": "circle"}}
            ],
            "edges": [
                {"id": "e1", "source": "n1", "target": "n2", "animated": true}
            ]
        }"#;
        let parsed: SketchImport = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.nodes[0].data.shape, Some(NodeShape::Circle));
        assert!(parsed.edges[0].animated);
    }
}
