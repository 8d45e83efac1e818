//! Face encoder (ArcFace) turning face crops into embeddings

use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::Array4;
use ort::session::Session;
use std::path::Path;
use std::sync::Mutex;

use crate::config::ENCODER_INPUT_SIZE;
use crate::core::{Embedding, FaceBox, SampleError};

const NORM_MEAN: f32 = 127.5;
const NORM_STD: f32 = 127.5;

pub struct FaceEncoder {
	session: Mutex<Session>,
}

impl FaceEncoder {
	pub fn load(model_path: &Path) -> Result<Self> {
		let session = crate::runtime::create_session(model_path)
			.context("Failed to load face encoder")?;
		Ok(Self { session: Mutex::new(session) })
	}

	/// One L2-normalized embedding per location, in the same order
	pub fn encode(&self, image: &DynamicImage, locations: &[FaceBox]) -> Result<Vec<Embedding>, SampleError> {
		locations.iter().map(|b| self.encode_one(image, b)).collect()
	}

	fn encode_one(&self, image: &DynamicImage, location: &FaceBox) -> Result<Embedding, SampleError> {
		let b = location.clamp(image.width(), image.height());
		if b.is_empty() {
			return Err(SampleError::encoding("face box lies outside the image"));
		}

		let crop = image.crop_imm(b.x, b.y, b.width, b.height);
		let input = ort::value::Tensor::from_array(preprocess(&crop)).map_err(SampleError::encoding)?;

		let mut session = self
			.session
			.lock()
			.map_err(|e| SampleError::encoding(format!("Session lock: {}", e)))?;
		let outputs = session
			.run(ort::inputs![input])
			.map_err(SampleError::encoding)?;

		check_outputs(outputs.len())?;

		let data: Vec<f32> = outputs[0]
			.try_extract_array::<f32>()
			.map_err(SampleError::encoding)?
			.iter()
			.copied()
			.collect();

		into_embedding(data)
	}
}

fn check_outputs(count: usize) -> Result<(), SampleError> {
	if count == 0 {
		return Err(SampleError::encoding("encoder produced no outputs"));
	}
	Ok(())
}

fn into_embedding(data: Vec<f32>) -> Result<Embedding, SampleError> {
	if data.is_empty() || data.iter().all(|v| *v == 0.0) {
		return Err(SampleError::EmptyEncoding);
	}
	Ok(Embedding::normalized(data))
}

/// Resize crop to 112x112, normalize to [-1, 1], NCHW layout.
fn preprocess(crop: &DynamicImage) -> Array4<f32> {
	let size = ENCODER_INPUT_SIZE;
	let rgb = crop
		.resize_exact(size as u32, size as u32, FilterType::Triangle)
		.to_rgb8();

	let mut tensor = Array4::<f32>::zeros((1, 3, size, size));
	for (x, y, px) in rgb.enumerate_pixels() {
		for c in 0..3 {
			tensor[[0, c, y as usize, x as usize]] = (px[c] as f32 - NORM_MEAN) / NORM_STD;
		}
	}
	tensor
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn preprocess_shape() {
		let crop = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(50, 60, image::Rgb([128, 128, 128])));
		assert_eq!(preprocess(&crop).shape(), &[1, 3, 112, 112]);
	}

	#[test]
	fn preprocess_normalization_bounds() {
		let white = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(10, 10, image::Rgb([255, 255, 255])));
		let black = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(10, 10, image::Rgb([0, 0, 0])));

		assert!((preprocess(&white)[[0, 0, 0, 0]] - 1.0).abs() < 0.01);
		assert!((preprocess(&black)[[0, 2, 5, 5]] + 1.0).abs() < 0.01);
	}

	#[test]
	fn missing_output_is_an_encoding_error() {
		assert!(matches!(check_outputs(0), Err(SampleError::Encoding(_))));
		assert!(check_outputs(1).is_ok());
	}

	#[test]
	fn zero_output_is_empty_encoding() {
		assert!(matches!(into_embedding(vec![0.0; 4]), Err(SampleError::EmptyEncoding)));
		assert!(matches!(into_embedding(Vec::new()), Err(SampleError::EmptyEncoding)));

		let e = into_embedding(vec![3.0, 4.0]).unwrap();
		assert!((e.as_slice()[0] - 0.6).abs() < 1e-6);
	}
}
