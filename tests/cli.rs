// Command-line smoke tests. None of these need the face models.

use std::fs;
use std::process::Command;

fn facesort() -> Command {
	Command::new(env!("CARGO_BIN_EXE_facesort"))
}

#[test]
fn version_display() {
	let output = facesort().arg("--version").output().expect("Failed to run facesort --version");

	assert!(output.status.success(), "Version command failed");
	let stdout = String::from_utf8_lossy(&output.stdout);
	assert!(stdout.contains("facesort"), "Expected 'facesort' in version output");
}

#[test]
fn help_lists_subcommands() {
	let output = facesort().arg("--help").output().expect("Failed to run facesort --help");

	assert!(output.status.success(), "Help command failed");
	let stdout = String::from_utf8_lossy(&output.stdout);
	for sub in ["gallery", "recognize", "clean"] {
		assert!(stdout.contains(sub), "Expected '{}' in help output", sub);
	}
}

#[test]
fn missing_known_dir_fails() {
	let dir = tempfile::tempdir().unwrap();
	let output = facesort()
		.args(["recognize", "-k"])
		.arg(dir.path().join("nope"))
		.arg("-t")
		.arg(dir.path())
		.output()
		.expect("Failed to run facesort recognize");

	assert!(!output.status.success());
	let stderr = String::from_utf8_lossy(&output.stderr);
	assert!(stderr.contains("does not exist"));
}

#[test]
fn gallery_check_reports_missing_records() {
	let dir = tempfile::tempdir().unwrap();
	let known = dir.path().join("known_faces");
	fs::create_dir_all(known.join("alice")).unwrap();
	image::RgbImage::from_pixel(8, 8, image::Rgb([200, 10, 10]))
		.save(known.join("alice/a.png"))
		.unwrap();

	let output = facesort()
		.args(["gallery", "--check", "-k"])
		.arg(&known)
		.output()
		.expect("Failed to run facesort gallery --check");

	assert!(output.status.success());
	let stdout = String::from_utf8_lossy(&output.stdout);
	assert!(stdout.contains("Missing"));
	assert!(!dir.path().join("known_faces_cache").exists());
}

#[test]
fn clean_without_cache_is_a_no_op() {
	let dir = tempfile::tempdir().unwrap();
	let known = dir.path().join("known_faces");
	fs::create_dir_all(&known).unwrap();

	let output = facesort()
		.args(["clean", "-y", "-k"])
		.arg(&known)
		.output()
		.expect("Failed to run facesort clean");

	assert!(output.status.success());
}
