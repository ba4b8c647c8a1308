//! On-model metrology: length, height and area measurements.

pub mod capture;
pub mod drag;
pub mod geometry;
pub mod session;
pub mod store;
pub mod types;
pub mod view;
pub mod visuals;

pub use capture::{CaptureOutcome, CaptureState};
pub use drag::{DragController, DragState};
pub use session::{CursorIntent, MeasureSession, Notice, NoticeLevel};
pub use store::{MarkerOwner, MeasurementStore, MeasurementUpdate, PointDeletion};
pub use types::{Measurement, MeasurementKind, MeasurementPoint, MeasurementRow, Tool};
pub use view::{project_frame, CameraView, FrameView};
pub use visuals::{MarkerMaterial, MeasurementVisuals, Visual, VisualId, VisualRegistry};
