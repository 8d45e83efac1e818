//! # Face Models
//!
//! The embedding provider contract and its ONNX implementation
//! (face detector + face encoder).

pub mod detector;
pub mod encoder;
pub mod manager;
pub mod provider;

pub use manager::FaceModels;
pub use provider::{embed_faces, embed_first_face, EmbeddingProvider};
