//! Detected faces and the queue of faces no gallery entry claimed

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::Embedding;

/// Pixel rectangle in the coordinates of the loaded image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceBox {
	pub x: u32,
	pub y: u32,
	pub width: u32,
	pub height: u32,
}

impl FaceBox {
	pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
		Self { x, y, width, height }
	}

	pub fn is_empty(&self) -> bool {
		self.width == 0 || self.height == 0
	}

	/// Clip to an image of the given size
	pub fn clamp(&self, image_width: u32, image_height: u32) -> Self {
		let x = self.x.min(image_width);
		let y = self.y.min(image_height);
		Self {
			x,
			y,
			width: self.width.min(image_width - x),
			height: self.height.min(image_height - y),
		}
	}
}

/// A face the matcher could not attribute to any gallery label
#[derive(Debug, Clone)]
pub struct UnmatchedFace {
	pub source_file: PathBuf,
	pub bounding_box: FaceBox,
	pub embedding: Embedding,
}

/// Unmatched faces of one run, in the order they were found
#[derive(Debug, Default)]
pub struct UnmatchedQueue {
	faces: Vec<UnmatchedFace>,
}

impl UnmatchedQueue {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, face: UnmatchedFace) {
		self.faces.push(face);
	}

	pub fn extend(&mut self, faces: impl IntoIterator<Item = UnmatchedFace>) {
		self.faces.extend(faces);
	}

	pub fn len(&self) -> usize {
		self.faces.len()
	}

	pub fn is_empty(&self) -> bool {
		self.faces.is_empty()
	}

	pub fn into_faces(self) -> Vec<UnmatchedFace> {
		self.faces
	}
}

impl FromIterator<UnmatchedFace> for UnmatchedQueue {
	fn from_iter<I: IntoIterator<Item = UnmatchedFace>>(iter: I) -> Self {
		Self { faces: iter.into_iter().collect() }
	}
}
