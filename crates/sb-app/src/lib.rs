pub mod ai;
pub mod controller;
pub mod dock_controller;
pub mod error;
pub mod testing;

pub use ai::{
    FlowGenerator, MAX_UPLOAD_BYTES, SketchFormat, SketchImport, SketchProcessor, SketchUpload,
    UploadError, validate_upload,
};
pub use controller::{CanvasController, PendingAi};
pub use dock_controller::DockController;
pub use error::{AiError, ControllerError};
