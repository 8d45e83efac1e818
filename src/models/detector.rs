//! Face detector (UltraFace RFB-320) producing face boxes

use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::Array4;
use ort::session::Session;
use std::path::Path;
use std::sync::Mutex;

use crate::config::{DETECTOR_CONFIDENCE, DETECTOR_INPUT_HEIGHT, DETECTOR_INPUT_WIDTH, DETECTOR_NMS_IOU};
use crate::core::{FaceBox, SampleError};

const NORM_MEAN: f32 = 127.0;
const NORM_STD: f32 = 128.0;

pub struct FaceDetector {
	session: Mutex<Session>,
	confidence: f32,
}

/// Candidate in normalized `[0, 1]` corner coordinates
#[derive(Debug, Clone, Copy)]
struct Candidate {
	x1: f32,
	y1: f32,
	x2: f32,
	y2: f32,
	score: f32,
}

impl FaceDetector {
	pub fn load(model_path: &Path) -> Result<Self> {
		let session = crate::runtime::create_session(model_path)
			.context("Failed to load face detector")?;
		Ok(Self {
			session: Mutex::new(session),
			confidence: DETECTOR_CONFIDENCE,
		})
	}

	pub fn detect(&self, image: &DynamicImage) -> Result<Vec<FaceBox>, SampleError> {
		let input = preprocess(image);
		let input_value = ort::value::Tensor::from_array(input).map_err(SampleError::detection)?;

		let mut session = self
			.session
			.lock()
			.map_err(|e| SampleError::detection(format!("Session lock: {}", e)))?;
		let outputs = session
			.run(ort::inputs![input_value])
			.map_err(SampleError::detection)?;

		if outputs.len() < 2 {
			return Err(SampleError::detection(format!(
				"detector expected 2 outputs, got {}",
				outputs.len()
			)));
		}

		// scores: [1, N, 2] (background, face); boxes: [1, N, 4] normalized corners
		let scores: Vec<f32> = outputs[0]
			.try_extract_array::<f32>()
			.map_err(SampleError::detection)?
			.iter()
			.copied()
			.collect();
		let boxes: Vec<f32> = outputs[1]
			.try_extract_array::<f32>()
			.map_err(SampleError::detection)?
			.iter()
			.copied()
			.collect();

		let candidates = decode(&scores, &boxes, self.confidence);
		let kept = nms(candidates, DETECTOR_NMS_IOU);

		Ok(kept
			.iter()
			.map(|c| to_pixels(c, image.width(), image.height()))
			.filter(|b| !b.is_empty())
			.collect())
	}
}

/// Resize to the model input, normalize, NCHW layout.
fn preprocess(image: &DynamicImage) -> Array4<f32> {
	let (w, h) = (DETECTOR_INPUT_WIDTH as usize, DETECTOR_INPUT_HEIGHT as usize);
	let rgb = image
		.resize_exact(DETECTOR_INPUT_WIDTH, DETECTOR_INPUT_HEIGHT, FilterType::Triangle)
		.to_rgb8();

	let mut tensor = Array4::<f32>::zeros((1, 3, h, w));
	for (x, y, px) in rgb.enumerate_pixels() {
		for c in 0..3 {
			tensor[[0, c, y as usize, x as usize]] = (px[c] as f32 - NORM_MEAN) / NORM_STD;
		}
	}
	tensor
}

fn decode(scores: &[f32], boxes: &[f32], threshold: f32) -> Vec<Candidate> {
	let n = (scores.len() / 2).min(boxes.len() / 4);

	(0..n)
		.filter_map(|i| {
			let score = scores[i * 2 + 1];
			if score < threshold {
				return None;
			}
			let b = &boxes[i * 4..i * 4 + 4];
			Some(Candidate {
				x1: b[0].clamp(0.0, 1.0),
				y1: b[1].clamp(0.0, 1.0),
				x2: b[2].clamp(0.0, 1.0),
				y2: b[3].clamp(0.0, 1.0),
				score,
			})
		})
		.collect()
}

fn iou(a: &Candidate, b: &Candidate) -> f32 {
	let ix = (a.x2.min(b.x2) - a.x1.max(b.x1)).max(0.0);
	let iy = (a.y2.min(b.y2) - a.y1.max(b.y1)).max(0.0);
	let inter = ix * iy;
	let area_a = (a.x2 - a.x1).max(0.0) * (a.y2 - a.y1).max(0.0);
	let area_b = (b.x2 - b.x1).max(0.0) * (b.y2 - b.y1).max(0.0);
	let union = area_a + area_b - inter;
	if union <= 0.0 {
		0.0
	} else {
		inter / union
	}
}

/// Greedy non-maximum suppression, highest score first
fn nms(mut candidates: Vec<Candidate>, iou_threshold: f32) -> Vec<Candidate> {
	candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

	let mut kept: Vec<Candidate> = Vec::new();
	for c in candidates {
		if kept.iter().all(|k| iou(k, &c) < iou_threshold) {
			kept.push(c);
		}
	}
	kept
}

fn to_pixels(c: &Candidate, width: u32, height: u32) -> FaceBox {
	let x1 = (c.x1 * width as f32).round() as u32;
	let y1 = (c.y1 * height as f32).round() as u32;
	let x2 = (c.x2 * width as f32).round() as u32;
	let y2 = (c.y2 * height as f32).round() as u32;
	FaceBox::new(x1, y1, x2.saturating_sub(x1), y2.saturating_sub(y1)).clamp(width, height)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn cand(x1: f32, y1: f32, x2: f32, y2: f32, score: f32) -> Candidate {
		Candidate { x1, y1, x2, y2, score }
	}

	#[test]
	fn decode_filters_low_scores() {
		let scores = [0.9, 0.1, 0.2, 0.8];
		let boxes = [0.0, 0.0, 0.5, 0.5, 0.1, 0.1, 1.2, 0.9];
		let found = decode(&scores, &boxes, 0.7);
		assert_eq!(found.len(), 1);
		assert_eq!(found[0].score, 0.8);
		assert_eq!(found[0].x2, 1.0);
	}

	#[test]
	fn nms_drops_overlapping_weaker_boxes() {
		let kept = nms(
			vec![
				cand(0.0, 0.0, 0.5, 0.5, 0.8),
				cand(0.02, 0.02, 0.52, 0.52, 0.95),
				cand(0.6, 0.6, 0.9, 0.9, 0.75),
			],
			0.3,
		);
		assert_eq!(kept.len(), 2);
		assert_eq!(kept[0].score, 0.95);
		assert_eq!(kept[1].score, 0.75);
	}

	#[test]
	fn disjoint_boxes_have_zero_iou() {
		assert_eq!(iou(&cand(0.0, 0.0, 0.1, 0.1, 1.0), &cand(0.5, 0.5, 0.6, 0.6, 1.0)), 0.0);
	}

	#[test]
	fn pixel_boxes_scale_to_image() {
		let b = to_pixels(&cand(0.25, 0.5, 0.75, 1.0, 0.9), 400, 200);
		assert_eq!(b, FaceBox::new(100, 100, 200, 100));
	}

	#[test]
	fn preprocess_shape_and_range() {
		let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(64, 48, image::Rgb([255, 127, 0])));
		let tensor = preprocess(&img);
		assert_eq!(tensor.shape(), &[1, 3, 240, 320]);
		assert!((tensor[[0, 0, 10, 10]] - 1.0).abs() < 0.01);
		assert!(tensor[[0, 1, 10, 10]].abs() < 0.01);
		assert!((tensor[[0, 2, 10, 10]] + 0.99).abs() < 0.01);
	}
}
