//! Directory scanning for image files

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::config::IMAGE_EXTENSIONS;
use crate::ui;

pub fn is_image(path: &Path) -> bool {
	path.extension()
		.and_then(|e| e.to_str())
		.map(|ext| IMAGE_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)))
		.unwrap_or(false)
}

fn is_hidden(entry: &DirEntry) -> bool {
	entry.depth() > 0
		&& entry
			.file_name()
			.to_str()
			.map(|s| s.starts_with('.'))
			.unwrap_or(false)
}

/// All image files under `root`, recursively, sorted by name within each directory.
/// Hidden entries (`.placeholder`, `.git`, ...) are skipped.
pub fn image_files(root: &Path) -> Vec<PathBuf> {
	WalkDir::new(root)
		.sort_by_file_name()
		.into_iter()
		.filter_entry(|e| !is_hidden(e))
		.filter_map(|e| match e {
			Ok(entry) => Some(entry),
			Err(err) => {
				ui::warn(&format!("Unreadable entry: {}", err));
				None
			}
		})
		.filter(|e| e.file_type().is_file())
		.map(DirEntry::into_path)
		.filter(|p| {
			let keep = is_image(p);
			if !keep {
				ui::debug(&format!("Not an image: {}", p.display()));
			}
			keep
		})
		.collect()
}

/// Known sample paired with its label, the name of its parent directory
#[derive(Debug, Clone)]
pub struct LabeledSample {
	pub label: String,
	pub path: PathBuf,
}

/// Walk the known-faces tree. Files directly in the root have no label and are skipped.
pub fn labeled_samples(root: &Path) -> Vec<LabeledSample> {
	image_files(root)
		.into_iter()
		.filter_map(|path| {
			let parent = path.parent()?;
			if parent == root {
				ui::warn(&format!(
					"{}: not inside a label directory, skipping",
					path.display()
				));
				return None;
			}
			let label = parent.file_name()?.to_string_lossy().into_owned();
			Some(LabeledSample { label, path })
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;

	fn touch(root: &Path, rel: &str) {
		let path = root.join(rel);
		fs::create_dir_all(path.parent().unwrap()).unwrap();
		fs::write(path, b"").unwrap();
	}

	#[test]
	fn walks_sorted_and_skips_hidden_and_non_images() {
		let dir = tempfile::tempdir().unwrap();
		touch(dir.path(), "b/2.JPG");
		touch(dir.path(), "b/1.png");
		touch(dir.path(), "a/x.jpeg");
		touch(dir.path(), "a/.placeholder");
		touch(dir.path(), ".hidden/y.jpg");
		touch(dir.path(), "a/readme.txt");

		let files: Vec<_> = image_files(dir.path())
			.into_iter()
			.map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
			.collect();

		assert_eq!(
			files,
			vec![PathBuf::from("a/x.jpeg"), PathBuf::from("b/1.png"), PathBuf::from("b/2.JPG")]
		);
	}

	#[test]
	fn label_is_parent_directory_name() {
		let dir = tempfile::tempdir().unwrap();
		touch(dir.path(), "alice/1.jpg");
		touch(dir.path(), "family/bob/2.jpg");
		touch(dir.path(), "stray.jpg");

		let samples = labeled_samples(dir.path());
		let labels: Vec<_> = samples.iter().map(|s| s.label.as_str()).collect();
		assert_eq!(labels, vec!["alice", "bob"]);
	}
}
