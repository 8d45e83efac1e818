//! # ONNX Runtime
//!
//! Builds inference sessions for the face models on the selected
//! execution provider.

pub mod providers;

pub use providers::{create_session, set_provider, Provider};
