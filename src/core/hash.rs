//! Content fingerprints for cache staleness checks

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use xxhash_rust::xxh3::Xxh3;

const READ_BUFFER_SIZE: usize = 65536; // 64KB

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileHash(String);

impl FileHash {
	/// xxh3 over the whole file, streamed in 64KB chunks
	pub fn compute(path: &Path) -> std::io::Result<Self> {
		let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, File::open(path)?);
		let mut hasher = Xxh3::new();
		let mut buffer = vec![0u8; READ_BUFFER_SIZE];

		loop {
			let n = reader.read(&mut buffer)?;
			if n == 0 {
				break;
			}
			hasher.update(&buffer[..n]);
		}

		Ok(Self::from_digest(hasher.digest()))
	}

	pub fn from_bytes(bytes: &[u8]) -> Self {
		Self::from_digest(xxhash_rust::xxh3::xxh3_64(bytes))
	}

	fn from_digest(digest: u64) -> Self {
		Self(format!("{:016x}", digest))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn short(&self) -> &str {
		&self.0[..8]
	}
}

impl std::fmt::Display for FileHash {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn file_hash_matches_in_memory_hash() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("sample.bin");
		let bytes: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
		std::fs::write(&path, &bytes).unwrap();

		let on_disk = FileHash::compute(&path).unwrap();
		assert_eq!(on_disk, FileHash::from_bytes(&bytes));
		assert_eq!(on_disk.as_str().len(), 16);
	}

	#[test]
	fn edits_past_first_chunk_change_the_hash() {
		let mut bytes = vec![7u8; 100_000];
		let before = FileHash::from_bytes(&bytes);
		bytes[90_000] = 8;
		assert_ne!(before, FileHash::from_bytes(&bytes));
	}
}
