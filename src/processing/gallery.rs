//! Gallery of labeled reference embeddings

use anyhow::Result;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use super::scan::{labeled_samples, LabeledSample};
use crate::core::{CancelToken, Embedding, SampleError};
use crate::storage::{EmbeddingCache, Resolved};
use crate::ui;

#[derive(Debug, Clone)]
pub struct GalleryEntry {
	pub label: String,
	pub embedding: Embedding,
	pub source: PathBuf,
}

/// How each sample was resolved during a build
#[derive(Debug, Default, Clone, Copy)]
pub struct GalleryStats {
	pub cached: usize,
	pub computed: usize,
	pub skipped: usize,
}

/// Immutable once built. Several entries may share a label.
#[derive(Debug, Default)]
pub struct Gallery {
	entries: Vec<GalleryEntry>,
}

impl Gallery {
	pub fn from_entries(entries: Vec<GalleryEntry>) -> Self {
		Self { entries }
	}

	/// Walk `known_root`, embedding every sample through the cache.
	/// Unusable samples are skipped; cache store failures abort the build.
	pub fn build(
		known_root: &Path,
		cache: &EmbeddingCache,
		cancel: &CancelToken,
	) -> Result<(Self, GalleryStats)> {
		let samples = labeled_samples(known_root);
		ui::debug(&format!("Found {} known samples", samples.len()));

		let resolved: Vec<(LabeledSample, Resolved)> = samples
			.into_par_iter()
			.map(|sample| {
				if cancel.is_cancelled() {
					return Ok((sample, Resolved::Skipped(SampleError::Cancelled)));
				}
				let resolved = cache.resolve(&sample.path)?;
				Ok((sample, resolved))
			})
			.collect::<Result<_>>()?;

		let mut stats = GalleryStats::default();
		let mut entries = Vec::with_capacity(resolved.len());

		for (sample, resolved) in resolved {
			let embedding = match resolved {
				Resolved::Cached(e) => {
					stats.cached += 1;
					e
				}
				Resolved::Computed(e) => {
					stats.computed += 1;
					ui::debug(&format!("  {} > {}", sample.label, sample.path.display()));
					e
				}
				Resolved::Skipped(SampleError::Cancelled) => {
					stats.skipped += 1;
					continue;
				}
				Resolved::Skipped(e) => {
					stats.skipped += 1;
					ui::warn(&format!("{}: {}, skipping", sample.path.display(), e));
					continue;
				}
			};

			entries.push(GalleryEntry {
				label: sample.label,
				embedding,
				source: sample.path,
			});
		}

		Ok((Self { entries }, stats))
	}

	pub fn entries(&self) -> &[GalleryEntry] {
		&self.entries
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Distinct labels in first-seen order
	pub fn labels(&self) -> Vec<&str> {
		let mut labels: Vec<&str> = Vec::new();
		for entry in &self.entries {
			if !labels.contains(&entry.label.as_str()) {
				labels.push(&entry.label);
			}
		}
		labels
	}

	pub fn samples_for(&self, label: &str) -> usize {
		self.entries.iter().filter(|e| e.label == label).count()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn entry(label: &str, v: f32) -> GalleryEntry {
		GalleryEntry {
			label: label.to_string(),
			embedding: Embedding::new(vec![v]),
			source: PathBuf::from(format!("{}/{}.jpg", label, v)),
		}
	}

	#[test]
	fn labels_are_distinct_in_insertion_order() {
		let gallery = Gallery::from_entries(vec![
			entry("bob", 0.1),
			entry("alice", 0.2),
			entry("bob", 0.3),
		]);

		assert_eq!(gallery.len(), 3);
		assert_eq!(gallery.labels(), vec!["bob", "alice"]);
		assert_eq!(gallery.samples_for("bob"), 2);
		assert_eq!(gallery.samples_for("carol"), 0);
	}
}
