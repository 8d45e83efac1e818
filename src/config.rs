//! Application configuration and constants

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static CUSTOM_MODEL_DIR: OnceLock<PathBuf> = OnceLock::new();
static CUSTOM_DETECTOR: OnceLock<PathBuf> = OnceLock::new();
static CUSTOM_ENCODER: OnceLock<PathBuf> = OnceLock::new();

// === Model Files ===
pub const DETECTOR_MODEL: &str = "version-RFB-320.onnx";
pub const ENCODER_MODEL: &str = "arcface_w600k_r50.onnx";

// === Model Parameters ===
pub const DETECTOR_INPUT_WIDTH: u32 = 320;
pub const DETECTOR_INPUT_HEIGHT: u32 = 240;
pub const DETECTOR_CONFIDENCE: f32 = 0.7;
pub const DETECTOR_NMS_IOU: f32 = 0.3;
pub const ENCODER_INPUT_SIZE: usize = 112;

// === Matching ===
pub const MATCH_THRESHOLD: f32 = 0.6;
pub const UNRECOGNIZED_LABEL: &str = "Unrecognized";

// === Clustering ===
pub const CLUSTER_EPS: f32 = 0.5;
pub const CLUSTER_MIN_SAMPLES: usize = 3;
pub const UNCLUSTERED_LABEL: &str = "unclustered";
pub const PERSON_PREFIX: &str = "person_";

// === Images ===
pub const MAX_IMAGE_DIMENSION: u32 = 1200;
pub const IMAGE_EXTENSIONS: &[&str] = &[
	"jpg", "jpeg", "png", "gif", "bmp", "webp", "tiff", "tif",
];

// === Storage ===
pub const CACHE_DIR_SUFFIX: &str = "_cache";
pub const CACHE_EXT: &str = "msgpack";

pub fn set_model_dir(path: PathBuf) {
	let _ = CUSTOM_MODEL_DIR.set(path);
}

pub fn set_detector_model(path: PathBuf) {
	let _ = CUSTOM_DETECTOR.set(path);
}

pub fn set_encoder_model(path: PathBuf) {
	let _ = CUSTOM_ENCODER.set(path);
}

/// Get models directory (--models, FACESORT_MODELS_DIR, or `models/` next to the executable)
pub fn models_dir() -> Option<PathBuf> {
	if let Some(custom) = CUSTOM_MODEL_DIR.get() {
		crate::ui::debug(&format!("Using custom model dir: {}", custom.display()));
		return Some(custom.clone());
	}

	if let Ok(env_path) = std::env::var("FACESORT_MODELS_DIR") {
		let path = PathBuf::from(&env_path);
		if path.is_dir() {
			crate::ui::debug(&format!("Using FACESORT_MODELS_DIR: {}", env_path));
			return Some(path);
		}
	}

	if let Ok(exe) = std::env::current_exe() {
		if let Some(dir) = exe.parent() {
			let models = dir.join("models");
			if models.is_dir() {
				crate::ui::debug(&format!("Found models at: {}", models.display()));
				return Some(models);
			}
		}
	}

	None
}

pub fn get_detector_model_path() -> Option<PathBuf> {
	if let Some(custom) = CUSTOM_DETECTOR.get() {
		return Some(custom.clone());
	}
	models_dir().map(|d| d.join(DETECTOR_MODEL))
}

pub fn get_encoder_model_path() -> Option<PathBuf> {
	if let Some(custom) = CUSTOM_ENCODER.get() {
		return Some(custom.clone());
	}
	models_dir().map(|d| d.join(ENCODER_MODEL))
}

/// Default cache location: a `<known>_cache` sibling of the known-faces directory
pub fn default_cache_dir(known_dir: &Path) -> PathBuf {
	let name = known_dir
		.file_name()
		.map(|n| n.to_string_lossy().into_owned())
		.unwrap_or_else(|| "known_faces".to_string());

	let parent = known_dir.parent().unwrap_or_else(|| Path::new("."));
	parent.join(format!("{}{}", name, CACHE_DIR_SUFFIX))
}
