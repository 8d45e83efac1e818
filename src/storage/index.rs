//! Cache record discovery

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::CACHE_EXT;

/// Every record file under the cache root, in sorted order
pub fn scan(cache_root: &Path) -> Vec<PathBuf> {
	WalkDir::new(cache_root)
		.sort_by_file_name()
		.into_iter()
		.filter_map(|e| e.ok())
		.filter(|e| e.file_type().is_file())
		.map(|e| e.into_path())
		.filter(|p| p.extension().and_then(|s| s.to_str()) == Some(CACHE_EXT))
		.collect()
}

/// Leftover temp files from interrupted writes
pub fn scan_partial(cache_root: &Path) -> Vec<PathBuf> {
	WalkDir::new(cache_root)
		.into_iter()
		.filter_map(|e| e.ok())
		.filter(|e| e.file_type().is_file())
		.filter(|e| e.file_name().to_string_lossy().contains(".tmp-"))
		.map(|e| e.into_path())
		.collect()
}

/// Records whose source sample no longer exists under the gallery root
pub fn find_orphaned(cache_root: &Path, gallery_root: &Path) -> Vec<PathBuf> {
	scan(cache_root)
		.into_iter()
		.filter(|record_path| match super::record::load(record_path) {
			Ok(record) => !gallery_root.join(record.source()).exists(),
			Err(_) => true,
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::core::{Embedding, FileHash};
	use crate::storage::record::{self, CacheRecord};
	use std::fs;

	fn write_record(cache_root: &Path, key: &str) {
		let path = record::build_path(cache_root, Path::new(key));
		let record = CacheRecord::new(Path::new(key), &FileHash::from_bytes(key.as_bytes()), "enc", &Embedding::new(vec![1.0]));
		record::save(&record, &path).unwrap();
	}

	#[test]
	fn finds_records_for_deleted_samples() {
		let gallery = tempfile::tempdir().unwrap();
		let cache = tempfile::tempdir().unwrap();

		fs::create_dir_all(gallery.path().join("alice")).unwrap();
		fs::write(gallery.path().join("alice/1.jpg"), b"x").unwrap();

		write_record(cache.path(), "alice/1.jpg");
		write_record(cache.path(), "alice/2.jpg");
		fs::write(cache.path().join("alice/junk.msgpack"), b"\xc1").unwrap();

		assert_eq!(scan(cache.path()).len(), 3);

		let orphaned = find_orphaned(cache.path(), gallery.path());
		assert_eq!(
			orphaned,
			vec![
				cache.path().join("alice/2.jpg.msgpack"),
				cache.path().join("alice/junk.msgpack"),
			]
		);
	}
}
