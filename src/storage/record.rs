//! Cache record format and I/O

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::CACHE_EXT;
use crate::core::{Embedding, FileHash};

const VERSION: &str = env!("CARGO_PKG_VERSION");

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// One known sample's embedding, keyed by its path under the gallery root.
/// `model` names the encoder that produced the embedding.
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheRecord {
	version: String,
	source: String,
	hash: String,
	model: String,
	embedding: Vec<f32>,
}

impl CacheRecord {
	pub fn new(source: &Path, hash: &FileHash, model: &str, embedding: &Embedding) -> Self {
		Self {
			version: VERSION.to_string(),
			source: source.to_string_lossy().into_owned(),
			hash: hash.as_str().to_string(),
			model: model.to_string(),
			embedding: embedding.as_slice().to_vec(),
		}
	}

	pub fn embedding(&self) -> Embedding {
		Embedding::new(self.embedding.clone())
	}

	/// Sample path relative to the gallery root
	pub fn source(&self) -> &Path {
		Path::new(&self.source)
	}

	pub fn model(&self) -> &str {
		&self.model
	}

	/// Valid only for the exact bytes it was computed from, by the same
	/// encoder, in the current record format
	pub fn matches(&self, hash: &FileHash, model: &str) -> bool {
		self.is_current_version()
			&& self.hash == hash.as_str()
			&& self.model == model
			&& !self.embedding.is_empty()
	}

	pub fn is_current_version(&self) -> bool {
		self.version == VERSION
	}
}

/// Write a record via temp file + rename so readers never see a partial record
pub fn save(record: &CacheRecord, record_path: &Path) -> Result<()> {
	if let Some(parent) = record_path.parent() {
		fs::create_dir_all(parent)
			.with_context(|| format!("Failed to create cache directory {}", parent.display()))?;
	}

	let bytes = rmp_serde::to_vec(record).context("Failed to serialize cache record")?;

	let tmp_path = temp_path(record_path);
	fs::write(&tmp_path, bytes)
		.with_context(|| format!("Failed to write cache record {}", tmp_path.display()))?;

	if let Err(e) = fs::rename(&tmp_path, record_path) {
		let _ = fs::remove_file(&tmp_path);
		return Err(e).with_context(|| format!("Failed to commit cache record {}", record_path.display()));
	}

	Ok(())
}

/// Load record from disk
pub fn load(record_path: &Path) -> Result<CacheRecord> {
	let bytes = fs::read(record_path).context("Failed to read cache record")?;
	rmp_serde::from_slice(&bytes).context("Failed to deserialize cache record")
}

/// `<cache_root>/<key>.msgpack`, mirroring the gallery tree
pub fn build_path(cache_root: &Path, key: &Path) -> PathBuf {
	let mut name = key.as_os_str().to_os_string();
	name.push(".");
	name.push(CACHE_EXT);
	cache_root.join(name)
}

fn temp_path(record_path: &Path) -> PathBuf {
	let n = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
	let mut name = record_path.as_os_str().to_os_string();
	name.push(format!(".tmp-{}-{}", std::process::id(), n));
	PathBuf::from(name)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn path_mirrors_gallery_layout() {
		let path = build_path(Path::new("/cache"), Path::new("alice/beach.jpg"));
		assert_eq!(path, PathBuf::from("/cache/alice/beach.jpg.msgpack"));
	}

	#[test]
	fn saved_record_loads_back() {
		let dir = tempfile::tempdir().unwrap();
		let path = build_path(dir.path(), Path::new("bob/1.png"));
		let hash = FileHash::from_bytes(b"pixels");
		let embedding = Embedding::new(vec![0.25, -0.5, 1.0]);

		save(&CacheRecord::new(Path::new("bob/1.png"), &hash, "arcface:0011aabb", &embedding), &path).unwrap();

		let record = load(&path).unwrap();
		assert!(record.matches(&hash, "arcface:0011aabb"));
		assert_eq!(record.model(), "arcface:0011aabb");
		assert_eq!(record.embedding(), embedding);
		assert_eq!(record.source(), Path::new("bob/1.png"));

		let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
			.unwrap()
			.filter_map(|e| e.ok())
			.filter(|e| e.file_name().to_string_lossy().contains(".tmp-"))
			.collect();
		assert!(leftovers.is_empty());
	}

	#[test]
	fn different_bytes_do_not_match() {
		let record = CacheRecord::new(
			Path::new("a.jpg"),
			&FileHash::from_bytes(b"old"),
			"enc",
			&Embedding::new(vec![1.0]),
		);
		assert!(!record.matches(&FileHash::from_bytes(b"new"), "enc"));
	}

	#[test]
	fn other_encoder_does_not_match() {
		let hash = FileHash::from_bytes(b"same bytes");
		let record = CacheRecord::new(Path::new("a.jpg"), &hash, "arcface:0011aabb", &Embedding::new(vec![1.0]));
		assert!(record.matches(&hash, "arcface:0011aabb"));
		assert!(!record.matches(&hash, "arcface:ffee9988"));
	}

	#[test]
	fn older_format_does_not_match() {
		let hash = FileHash::from_bytes(b"bytes");
		let mut record = CacheRecord::new(Path::new("a.jpg"), &hash, "enc", &Embedding::new(vec![1.0]));
		record.version = "0.0.1".to_string();
		assert!(!record.is_current_version());
		assert!(!record.matches(&hash, "enc"));
	}

	#[test]
	fn garbage_fails_to_load() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("broken.msgpack");
		fs::write(&path, b"\xc1 definitely not msgpack").unwrap();
		assert!(load(&path).is_err());
	}
}
