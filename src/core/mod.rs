//! Core domain types

pub mod cancel;
pub mod cluster;
pub mod embedding;
pub mod error;
pub mod face;
pub mod hash;
pub mod identity;

pub use cancel::CancelToken;
pub use cluster::{ClusterLabel, ClusterParams, FaceClusters, IndexedFace};
pub use embedding::Embedding;
pub use error::SampleError;
pub use face::{FaceBox, UnmatchedFace, UnmatchedQueue};
pub use hash::FileHash;
pub use identity::Identity;
