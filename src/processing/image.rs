//! Image loading with bounded size

use image::{DynamicImage, ImageReader};
use std::path::Path;

use crate::config::MAX_IMAGE_DIMENSION;
use crate::core::SampleError;

/// Decode as RGB, downsampled to fit `MAX_IMAGE_DIMENSION` to bound detection cost
pub fn load(path: &Path) -> Result<DynamicImage, SampleError> {
	crate::ui::debug(&format!("Loading image: {}", path.display()));
	load_bounded(path, MAX_IMAGE_DIMENSION)
}

pub fn load_bounded(path: &Path, max_dimension: u32) -> Result<DynamicImage, SampleError> {
	let img = ImageReader::open(path)
		.map_err(|e| SampleError::load(path, e))?
		.with_guessed_format()
		.map_err(|e| SampleError::load(path, e))?
		.decode()
		.map_err(|e| SampleError::load(path, e))?;

	Ok(DynamicImage::ImageRgb8(downsample(img, max_dimension).to_rgb8()))
}

fn downsample(img: DynamicImage, max_dimension: u32) -> DynamicImage {
	if img.width() <= max_dimension && img.height() <= max_dimension {
		return img;
	}
	img.thumbnail(max_dimension, max_dimension)
}
