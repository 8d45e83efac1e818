//! Per-sample failures that skip one file without aborting the run

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SampleError {
	#[error("failed to load: {reason}")]
	Load { path: PathBuf, reason: String },

	#[error("face detection failed: {0}")]
	Detection(String),

	#[error("no faces found")]
	NoFaces,

	#[error("failed to encode faces: {0}")]
	Encoding(String),

	#[error("processed but encoding was empty")]
	EmptyEncoding,

	#[error("cancelled")]
	Cancelled,
}

impl SampleError {
	pub fn load(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
		SampleError::Load { path: path.into(), reason: reason.to_string() }
	}

	pub fn detection(reason: impl std::fmt::Display) -> Self {
		SampleError::Detection(reason.to_string())
	}

	pub fn encoding(reason: impl std::fmt::Display) -> Self {
		SampleError::Encoding(reason.to_string())
	}
}
