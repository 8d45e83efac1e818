//! Embedding cache for known samples
//!
//! One record per sample image, stored under a tree that mirrors the
//! gallery. Records carry a content hash and the encoder's id, so an edited
//! sample, or one cached by a different encoder, is recomputed instead of
//! served stale.

use anyhow::Result;
use std::path::{Path, PathBuf};

use super::record::{self, CacheRecord};
use crate::core::{Embedding, FileHash, SampleError};
use crate::models::{embed_first_face, EmbeddingProvider};
use crate::processing::image;
use crate::ui;

/// Where an embedding came from, or why there is none
#[derive(Debug)]
pub enum Resolved {
	Cached(Embedding),
	Computed(Embedding),
	Skipped(SampleError),
}

impl Resolved {
	pub fn embedding(self) -> Option<Embedding> {
		match self {
			Resolved::Cached(e) | Resolved::Computed(e) => Some(e),
			Resolved::Skipped(_) => None,
		}
	}
}

pub struct EmbeddingCache<'a> {
	gallery_root: PathBuf,
	cache_root: PathBuf,
	provider: &'a dyn EmbeddingProvider,
}

impl<'a> EmbeddingCache<'a> {
	pub fn new(
		gallery_root: impl Into<PathBuf>,
		cache_root: impl Into<PathBuf>,
		provider: &'a dyn EmbeddingProvider,
	) -> Self {
		Self {
			gallery_root: gallery_root.into(),
			cache_root: cache_root.into(),
			provider,
		}
	}

	/// Cached embedding for the sample, computing and persisting it on a miss.
	/// Unusable samples are logged and yield `None`; store failures are errors.
	pub fn get_or_compute(&self, source: &Path) -> Result<Option<Embedding>> {
		let resolved = self.resolve(source)?;
		if let Resolved::Skipped(e) = &resolved {
			ui::warn(&format!("{}: {}, skipping", source.display(), e));
		}
		Ok(resolved.embedding())
	}

	pub fn resolve(&self, source: &Path) -> Result<Resolved> {
		let hash = match FileHash::compute(source) {
			Ok(hash) => hash,
			Err(e) => return Ok(Resolved::Skipped(SampleError::load(source, e))),
		};

		let key = self.key_for(source);
		let record_path = record::build_path(&self.cache_root, &key);

		if let Some(embedding) = self.read(&record_path, &hash) {
			return Ok(Resolved::Cached(embedding));
		}

		let img = match image::load(source) {
			Ok(img) => img,
			Err(e) => return Ok(Resolved::Skipped(e)),
		};

		let (embedding, face_count) = match embed_first_face(self.provider, &img) {
			Ok(found) => found,
			Err(e) => return Ok(Resolved::Skipped(e)),
		};

		if face_count > 1 {
			ui::debug(&format!(
				"{}: {} faces found, keeping the first",
				key.display(),
				face_count
			));
		}

		record::save(&CacheRecord::new(&key, &hash, self.provider.model_id(), &embedding), &record_path)?;
		ui::debug(&format!("Cached {} -> {}", key.display(), hash.short()));

		Ok(Resolved::Computed(embedding))
	}

	/// Read-only lookup; never invokes the provider
	pub fn lookup(&self, source: &Path) -> Option<Embedding> {
		let hash = FileHash::compute(source).ok()?;
		let record_path = record::build_path(&self.cache_root, &self.key_for(source));
		self.read(&record_path, &hash)
	}

	/// Sample path relative to the gallery root, the logical cache key
	pub fn key_for(&self, source: &Path) -> PathBuf {
		source
			.strip_prefix(&self.gallery_root)
			.map(Path::to_path_buf)
			.unwrap_or_else(|_| {
				source
					.file_name()
					.map(PathBuf::from)
					.unwrap_or_else(|| source.to_path_buf())
			})
	}

	fn read(&self, record_path: &Path, hash: &FileHash) -> Option<Embedding> {
		if !record_path.exists() {
			return None;
		}

		match record::load(record_path) {
			Ok(record) if record.matches(hash, self.provider.model_id()) => Some(record.embedding()),
			Ok(record) if record.model() != self.provider.model_id() => {
				ui::debug(&format!(
					"Cache record {} was made by encoder {}, recomputing",
					record_path.display(),
					record.model()
				));
				None
			}
			Ok(_) => {
				ui::debug(&format!("Stale cache record: {}", record_path.display()));
				None
			}
			Err(e) => {
				ui::debug(&format!("Unreadable cache record {}: {:#}", record_path.display(), e));
				None
			}
		}
	}
}
