//! Clean command - remove orphaned cache records

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use colored::*;

use crate::storage;
use crate::ui;

pub fn run(known: &Path, cache_root: &Path, yes: bool) -> anyhow::Result<()> {
	if !cache_root.is_dir() {
		ui::info(&format!("No cache at {}", cache_root.display()));
		return Ok(());
	}

	ui::info(&format!("Scanning: {}", cache_root.display()));

	let mut stale: Vec<PathBuf> = storage::find_orphaned(cache_root, known);
	stale.extend(storage::scan_partial(cache_root));

	if stale.is_empty() {
		ui::success("No orphaned cache records found");
		return Ok(());
	}

	ui::warn(&format!("Found {} orphaned cache records", stale.len()));
	for path in &stale {
		println!("  {}", path.display().to_string().dimmed());
	}

	if !yes && !confirm("Delete these records?")? {
		ui::info("Cancelled");
		return Ok(());
	}

	let mut deleted = 0;
	for path in &stale {
		match fs::remove_file(path) {
			Ok(()) => {
				deleted += 1;
				ui::debug(&format!("Deleted: {}", path.display()));
			}
			Err(e) => ui::error(&format!("Failed to delete {}: {}", path.display(), e)),
		}
	}

	ui::success(&format!("Cleaned {} records", deleted));
	Ok(())
}

fn confirm(question: &str) -> io::Result<bool> {
	print!("\n{} [y/N]: ", question);
	io::stdout().flush()?;

	let mut input = String::new();
	io::stdin().read_line(&mut input)?;
	Ok(input.trim().eq_ignore_ascii_case("y"))
}
