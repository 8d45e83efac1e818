//! Gallery command - embed known samples into the cache

use std::path::Path;
use std::time::Instant;

use anyhow::{bail, Result};
use colored::*;
use image::DynamicImage;

use crate::core::{CancelToken, Embedding, FaceBox, SampleError};
use crate::models::{EmbeddingProvider, FaceModels};
use crate::processing::scan::labeled_samples;
use crate::processing::Gallery;
use crate::storage::EmbeddingCache;
use crate::ui;

pub fn run(known: &Path, cache_root: &Path, check: bool) -> Result<()> {
	if !known.is_dir() {
		bail!("Known faces directory does not exist: {}", known.display());
	}

	ui::info(&format!("Known faces: {}", known.display()));
	ui::debug(&format!("Cache: {}", cache_root.display()));

	if check {
		return check_coverage(known, cache_root);
	}

	let models = FaceModels::new()?;
	build(known, cache_root, &models, &CancelToken::new())?;
	Ok(())
}

/// Build the gallery through the cache and print a summary
pub fn build(
	known: &Path,
	cache_root: &Path,
	provider: &dyn EmbeddingProvider,
	cancel: &CancelToken,
) -> Result<Gallery> {
	let start = Instant::now();
	let cache = EmbeddingCache::new(known, cache_root, provider);
	let (gallery, stats) = Gallery::build(known, &cache, cancel)?;

	ui::header("Gallery");
	ui::stat("Identities", gallery.labels().len());
	ui::stat("Samples", gallery.len());
	ui::stat("Cached", stats.cached);
	ui::stat("Computed", stats.computed);
	if stats.skipped > 0 {
		ui::stat("Skipped", stats.skipped.to_string().yellow());
	}
	ui::stat("Time", format!("{:.2}s", start.elapsed().as_secs_f32()).dimmed());

	if ui::Log::is_verbose() {
		for label in gallery.labels() {
			ui::debug(&format!("  {} ({} samples)", label, gallery.samples_for(label)));
		}
	}

	if gallery.is_empty() {
		ui::warn("Gallery is empty, every face will be unrecognized");
	}

	Ok(gallery)
}

/// Report which samples already have a current cache record. Runs no model.
fn check_coverage(known: &Path, cache_root: &Path) -> Result<()> {
	let model_id = FaceModels::configured_encoder_id().unwrap_or_else(|e| {
		ui::warn(&format!("{:#}, no record can be current", e));
		String::new()
	});
	let provider = NoProvider { model_id };
	let cache = EmbeddingCache::new(known, cache_root, &provider);
	let samples = labeled_samples(known);

	let mut missing = Vec::new();
	for sample in &samples {
		if cache.lookup(&sample.path).is_none() {
			missing.push(&sample.path);
		}
	}

	ui::header("Cache coverage");
	ui::stat("Samples", samples.len());
	ui::stat("Cached", samples.len() - missing.len());
	ui::stat("Missing", missing.len());

	for path in &missing {
		ui::debug(&format!("  not cached: {}", path.display()));
	}

	if missing.is_empty() {
		ui::success("Cache is complete");
	} else {
		ui::warn(&format!(
			"{} samples need embedding (run `facesort gallery -k {}`)",
			missing.len(),
			known.display()
		));
	}
	Ok(())
}

/// Stand-in provider for read-only cache lookups
struct NoProvider {
	model_id: String,
}

impl EmbeddingProvider for NoProvider {
	fn model_id(&self) -> &str {
		&self.model_id
	}

	fn detect_faces(&self, _: &DynamicImage) -> Result<Vec<FaceBox>, SampleError> {
		Err(SampleError::detection("no model loaded"))
	}

	fn encode_faces(&self, _: &DynamicImage, _: &[FaceBox]) -> Result<Vec<Embedding>, SampleError> {
		Err(SampleError::encoding("no model loaded"))
	}
}
