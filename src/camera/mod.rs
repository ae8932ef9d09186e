//! Webcam capture, face-mesh inference and the preview window.
//!
//! Everything here needs a system OpenCV and the ONNX Runtime, so the module
//! is only built with the `camera` feature.

pub mod capture;
pub mod face_mesh;
pub mod preview;

pub use capture::CameraSource;
pub use face_mesh::FaceMeshModel;
pub use preview::PreviewWindow;
