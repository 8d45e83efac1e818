//! Recognition pass over a directory of test images

use colored::Colorize;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::matcher::{MatchPolicy, Matcher};
use super::{image, scan};
use crate::core::{
	CancelToken, FaceBox, Identity, SampleError, UnmatchedFace, UnmatchedQueue,
};
use crate::models::{embed_faces, EmbeddingProvider};
use crate::ui;

/// One detected face and the matcher's verdict on it
#[derive(Debug, Clone)]
pub struct FaceMatch {
	pub bounding_box: FaceBox,
	pub identity: Identity,
}

#[derive(Debug, Clone)]
pub struct ImageReport {
	pub path: PathBuf,
	pub faces: Vec<FaceMatch>,
	pub processing_ms: u64,
}

impl ImageReport {
	pub fn recognized(&self) -> usize {
		self.faces.iter().filter(|f| f.identity.is_known()).count()
	}
}

/// Everything one pass produces. `unmatched` is handed to the cluster engine.
#[derive(Debug, Default)]
pub struct RecognitionRun {
	pub reports: Vec<ImageReport>,
	pub unmatched: UnmatchedQueue,
	pub failures: usize,
	pub cancelled: usize,
}

impl RecognitionRun {
	pub fn total_faces(&self) -> usize {
		self.reports.iter().map(|r| r.faces.len()).sum()
	}

	pub fn recognized_faces(&self) -> usize {
		self.reports.iter().map(ImageReport::recognized).sum()
	}
}

/// Detect, embed and match every face of one image
pub fn recognize_image<P: MatchPolicy>(
	path: &Path,
	matcher: &Matcher<'_, P>,
	provider: &dyn EmbeddingProvider,
) -> Result<(ImageReport, Vec<UnmatchedFace>), SampleError> {
	let start = Instant::now();
	let img = image::load(path)?;
	let found = embed_faces(provider, &img)?;

	let mut faces = Vec::with_capacity(found.len());
	let mut unmatched = Vec::new();

	for (bounding_box, embedding) in found {
		let identity = matcher.match_face(&embedding);
		ui::debug(&format!(
			"  {}: found {} with confidence {:.2}",
			path.display(),
			identity.label(),
			identity.confidence()
		));

		if !identity.is_known() {
			unmatched.push(UnmatchedFace {
				source_file: path.to_path_buf(),
				bounding_box,
				embedding,
			});
		}
		faces.push(FaceMatch { bounding_box, identity });
	}

	let report = ImageReport {
		path: path.to_path_buf(),
		faces,
		processing_ms: start.elapsed().as_millis() as u64,
	};

	Ok((report, unmatched))
}

/// Match every image under `test_root`. Images are processed in parallel and
/// reassembled in traversal order, so the unmatched queue order is stable.
pub fn recognize_directory<P: MatchPolicy>(
	test_root: &Path,
	matcher: &Matcher<'_, P>,
	provider: &dyn EmbeddingProvider,
	cancel: &CancelToken,
) -> RecognitionRun {
	let files = scan::image_files(test_root);
	ui::info(&format!("Detecting and recognizing faces in {} images", files.len()));

	let outcomes: Vec<(PathBuf, Result<(ImageReport, Vec<UnmatchedFace>), SampleError>)> = files
		.into_par_iter()
		.map(|path| {
			if cancel.is_cancelled() {
				return (path, Err(SampleError::Cancelled));
			}
			let outcome = recognize_image(&path, matcher, provider);
			(path, outcome)
		})
		.collect();

	let mut run = RecognitionRun::default();

	for (path, outcome) in outcomes {
		match outcome {
			Ok((report, unmatched)) => {
				if report.faces.is_empty() {
					ui::debug(&format!("{}: no faces found", path.display()));
				} else {
					ui::success(&format!(
						"{} {}/{} recognized {}",
						ui::path_link(&path, 60),
						report.recognized(),
						report.faces.len(),
						format!("{}ms", report.processing_ms).dimmed()
					));
				}
				run.unmatched.extend(unmatched);
				run.reports.push(report);
			}
			Err(SampleError::Cancelled) => run.cancelled += 1,
			Err(e) => {
				ui::error(&format!("{}: {}, skipping", path.display(), e));
				run.failures += 1;
			}
		}
	}

	run
}
