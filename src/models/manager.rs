//! ONNX-backed embedding provider

use anyhow::{Context, Result};
use image::DynamicImage;
use std::path::{Path, PathBuf};

use super::detector::FaceDetector;
use super::encoder::FaceEncoder;
use super::provider::EmbeddingProvider;
use crate::config;
use crate::core::{Embedding, FaceBox, FileHash, SampleError};
use crate::ui;

pub struct FaceModels {
	detector: FaceDetector,
	encoder: FaceEncoder,
	encoder_id: String,
}

impl FaceModels {
	/// Resolve both model files and load their sessions
	pub fn new() -> Result<Self> {
		let detector_path = resolve(config::get_detector_model_path(), config::DETECTOR_MODEL)?;
		let encoder_path = resolve(config::get_encoder_model_path(), config::ENCODER_MODEL)?;

		ui::debug(&format!("Loading face detector: {}", detector_path.display()));
		let detector = FaceDetector::load(&detector_path)?;

		ui::debug(&format!("Loading face encoder: {}", encoder_path.display()));
		let encoder = FaceEncoder::load(&encoder_path)?;
		let encoder_id = encoder_id(&encoder_path)?;
		ui::debug(&format!("Encoder id: {}", encoder_id));

		ui::success("Face models loaded");
		Ok(Self { detector, encoder, encoder_id })
	}

	/// Id of the configured encoder, without loading any model
	pub fn configured_encoder_id() -> Result<String> {
		let path = resolve(config::get_encoder_model_path(), config::ENCODER_MODEL)?;
		encoder_id(&path)
	}
}

/// `<file name>:<content hash>`, so swapping or retraining the model changes the id
pub fn encoder_id(path: &Path) -> Result<String> {
	let hash = FileHash::compute(path)
		.with_context(|| format!("Failed to hash encoder model {}", path.display()))?;
	let name = path
		.file_name()
		.map(|n| n.to_string_lossy().into_owned())
		.unwrap_or_default();
	Ok(format!("{}:{}", name, hash))
}

fn resolve(path: Option<PathBuf>, name: &str) -> Result<PathBuf> {
	let path = path.context(format!(
		"Model not found. Ensure {} exists (use --models or FACESORT_MODELS_DIR)",
		name
	))?;

	if !path.exists() {
		anyhow::bail!("Model file does not exist: {}", path.display());
	}
	Ok(path)
}

impl EmbeddingProvider for FaceModels {
	fn model_id(&self) -> &str {
		&self.encoder_id
	}

	fn detect_faces(&self, image: &DynamicImage) -> Result<Vec<FaceBox>, SampleError> {
		self.detector.detect(image)
	}

	fn encode_faces(&self, image: &DynamicImage, locations: &[FaceBox]) -> Result<Vec<Embedding>, SampleError> {
		self.encoder.encode(image, locations)
	}
}
