//! Nearest-neighbor identity matching against the gallery

use super::gallery::{Gallery, GalleryEntry};
use crate::config::MATCH_THRESHOLD;
use crate::core::{Embedding, Identity};

/// Distance metric plus acceptance rule. Swap it to retune or replace
/// matching without touching the matcher's scan.
pub trait MatchPolicy: Send + Sync {
	fn distance(&self, a: &Embedding, b: &Embedding) -> f32;

	/// Confidence for an accepted nearest distance, `None` to reject
	fn accept(&self, distance: f32) -> Option<f32>;
}

/// Euclidean distance, accepted strictly below `threshold`, confidence `1 - d`
#[derive(Debug, Clone, Copy)]
pub struct ThresholdPolicy {
	pub threshold: f32,
}

impl ThresholdPolicy {
	pub fn new(threshold: f32) -> Self {
		Self { threshold }
	}
}

impl Default for ThresholdPolicy {
	fn default() -> Self {
		Self::new(MATCH_THRESHOLD)
	}
}

impl MatchPolicy for ThresholdPolicy {
	fn distance(&self, a: &Embedding, b: &Embedding) -> f32 {
		a.distance(b)
	}

	fn accept(&self, distance: f32) -> Option<f32> {
		(distance < self.threshold).then(|| 1.0 - distance)
	}
}

pub struct Matcher<'g, P: MatchPolicy = ThresholdPolicy> {
	gallery: &'g Gallery,
	policy: P,
}

impl<'g> Matcher<'g, ThresholdPolicy> {
	pub fn new(gallery: &'g Gallery) -> Self {
		Self::with_policy(gallery, ThresholdPolicy::default())
	}
}

impl<'g, P: MatchPolicy> Matcher<'g, P> {
	pub fn with_policy(gallery: &'g Gallery, policy: P) -> Self {
		Self { gallery, policy }
	}

	/// Label of the closest gallery entry when the policy accepts it.
	/// Ties go to the earliest entry in gallery order.
	pub fn match_face(&self, face: &Embedding) -> Identity {
		let Some((entry, distance)) = self.nearest(face) else {
			return Identity::Unrecognized;
		};

		match self.policy.accept(distance) {
			Some(confidence) => Identity::Known {
				label: entry.label.clone(),
				distance,
				confidence,
			},
			None => Identity::Unrecognized,
		}
	}

	fn nearest(&self, face: &Embedding) -> Option<(&'g GalleryEntry, f32)> {
		let mut best: Option<(&'g GalleryEntry, f32)> = None;

		for entry in self.gallery.entries() {
			let d = self.policy.distance(face, &entry.embedding);
			match best {
				Some((_, best_d)) if d >= best_d => {}
				// NaN never wins
				_ if d.is_nan() => {}
				_ => best = Some((entry, d)),
			}
		}

		best
	}
}
