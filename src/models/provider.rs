//! Face detection + embedding contract consumed by the pipeline

use image::DynamicImage;

use crate::core::{Embedding, FaceBox, SampleError};

/// Turns an image into face locations and per-face embeddings.
///
/// Implementations must be shareable across rayon workers. `encode_faces`
/// returns embeddings aligned positionally with `locations`.
pub trait EmbeddingProvider: Send + Sync {
	/// Stable name of the encoder. Embeddings cached under another id are recomputed.
	fn model_id(&self) -> &str;

	fn detect_faces(&self, image: &DynamicImage) -> Result<Vec<FaceBox>, SampleError>;

	fn encode_faces(
		&self,
		image: &DynamicImage,
		locations: &[FaceBox],
	) -> Result<Vec<Embedding>, SampleError>;
}

/// Detect and encode every face. An image without faces yields an empty list.
pub fn embed_faces(
	provider: &dyn EmbeddingProvider,
	image: &DynamicImage,
) -> Result<Vec<(FaceBox, Embedding)>, SampleError> {
	let locations = provider.detect_faces(image)?;
	if locations.is_empty() {
		return Ok(Vec::new());
	}

	let embeddings = provider.encode_faces(image, &locations)?;
	if embeddings.len() != locations.len() {
		return Err(SampleError::encoding(format!(
			"{} embeddings for {} faces",
			embeddings.len(),
			locations.len()
		)));
	}
	if embeddings.iter().any(Embedding::is_empty) {
		return Err(SampleError::EmptyEncoding);
	}

	Ok(locations.into_iter().zip(embeddings).collect())
}

/// Embedding of the first detected face, the gallery's one-face-per-sample policy
pub fn embed_first_face(
	provider: &dyn EmbeddingProvider,
	image: &DynamicImage,
) -> Result<(Embedding, usize), SampleError> {
	let locations = provider.detect_faces(image)?;
	let Some(first) = locations.first() else {
		return Err(SampleError::NoFaces);
	};

	let embedding = provider
		.encode_faces(image, std::slice::from_ref(first))?
		.into_iter()
		.next()
		.filter(|e| !e.is_empty())
		.ok_or(SampleError::EmptyEncoding)?;

	Ok((embedding, locations.len()))
}

#[cfg(test)]
mod tests {
	use super::*;

	/// Reports two faces and encodes `returned` of them
	struct Scripted {
		returned: usize,
	}

	impl EmbeddingProvider for Scripted {
		fn model_id(&self) -> &str {
			"scripted"
		}

		fn detect_faces(&self, _: &DynamicImage) -> Result<Vec<FaceBox>, SampleError> {
			Ok(vec![FaceBox::new(0, 0, 4, 4), FaceBox::new(4, 4, 4, 4)])
		}

		fn encode_faces(&self, _: &DynamicImage, locations: &[FaceBox]) -> Result<Vec<Embedding>, SampleError> {
			Ok(locations
				.iter()
				.take(self.returned)
				.map(|b| Embedding::new(vec![b.x as f32]))
				.collect())
		}
	}

	fn blank() -> DynamicImage {
		DynamicImage::new_rgb8(8, 8)
	}

	#[test]
	fn every_face_gets_its_embedding() {
		let faces = embed_faces(&Scripted { returned: 2 }, &blank()).unwrap();
		assert_eq!(faces.len(), 2);
		assert_eq!(faces[1].0, FaceBox::new(4, 4, 4, 4));
		assert_eq!(faces[1].1.as_slice(), &[4.0]);
	}

	#[test]
	fn short_encoding_is_an_error() {
		let err = embed_faces(&Scripted { returned: 1 }, &blank()).unwrap_err();
		assert!(matches!(err, SampleError::Encoding(_)));
	}

	#[test]
	fn first_face_reports_face_count() {
		let (embedding, count) = embed_first_face(&Scripted { returned: 2 }, &blank()).unwrap();
		assert_eq!(embedding.as_slice(), &[0.0]);
		assert_eq!(count, 2);
	}

	#[test]
	fn first_face_without_encoding_is_empty() {
		let err = embed_first_face(&Scripted { returned: 0 }, &blank()).unwrap_err();
		assert!(matches!(err, SampleError::EmptyEncoding));
	}
}
