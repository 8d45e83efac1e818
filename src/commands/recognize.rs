//! Recognize command - match test faces against the gallery, cluster the rest

use std::path::Path;
use std::time::Instant;

use anyhow::{bail, Result};
use colored::*;

use crate::core::{CancelToken, ClusterParams, FaceClusters};
use crate::models::FaceModels;
use crate::processing::export::{export_crops, write_report};
use crate::processing::{
	cluster_faces, clusterer_for, recognize_directory, Matcher, RecognitionRun, ThresholdPolicy,
};
use crate::ui;

pub struct RecognizeOptions<'a> {
	pub known: &'a Path,
	pub test: &'a Path,
	pub cache: &'a Path,
	pub output: &'a Path,
	pub threshold: f32,
	pub params: ClusterParams,
	pub export: Option<&'a Path>,
	pub crops: bool,
}

pub fn run(opts: RecognizeOptions<'_>) -> Result<()> {
	if !opts.known.is_dir() {
		bail!("Known faces directory does not exist: {}", opts.known.display());
	}
	if !opts.test.is_dir() {
		bail!("Test images directory does not exist: {}", opts.test.display());
	}

	let start = Instant::now();
	let cancel = CancelToken::new();
	let models = FaceModels::new()?;

	ui::info(&format!("Loading known faces from {}", opts.known.display()));
	let gallery = super::gallery::build(opts.known, opts.cache, &models, &cancel)?;

	println!();
	let matcher = Matcher::with_policy(&gallery, ThresholdPolicy::new(opts.threshold));
	let run = recognize_directory(opts.test, &matcher, &models, &cancel);

	let summary = Summary::of(&run);
	let RecognitionRun { reports, unmatched, .. } = run;

	let clusterer = clusterer_for(&opts.params);
	let clusters = cluster_faces(unmatched, clusterer.as_ref())?;

	print_clusters(&clusters);

	if opts.crops && !clusters.is_empty() {
		let written = export_crops(&clusters, opts.output)?;
		ui::success(&format!("Wrote {} face crops to {}", written, opts.output.display()));
	}

	if let Some(path) = opts.export {
		write_report(path, &reports, &clusters, opts.params)?;
	}

	ui::header("Summary");
	ui::stat("Images", summary.images);
	ui::stat("Faces", summary.faces);
	ui::stat("Recognized", summary.recognized);
	ui::stat("Clusters", clusters.persons().count());
	ui::stat("Unclustered", clusters.unclustered().len());
	if summary.failures > 0 {
		ui::stat("Failed", summary.failures.to_string().red());
	}
	ui::stat("Time", format!("{:.2}s", start.elapsed().as_secs_f32()).dimmed());

	Ok(())
}

struct Summary {
	images: usize,
	faces: usize,
	recognized: usize,
	failures: usize,
}

impl Summary {
	fn of(run: &RecognitionRun) -> Self {
		Self {
			images: run.reports.len(),
			faces: run.total_faces(),
			recognized: run.recognized_faces(),
			failures: run.failures,
		}
	}
}

fn print_clusters(clusters: &FaceClusters) {
	if clusters.is_empty() {
		ui::info("No unrecognized faces to cluster");
		return;
	}

	ui::header("Clusters");
	for (label, members) in clusters.iter() {
		let name = if label.is_unclustered() {
			label.to_string().dimmed()
		} else {
			label.to_string().yellow().bold()
		};
		println!("  {} {}", name, format!("({} faces)", members.len()).dimmed());

		for member in members {
			ui::debug(&format!(
				"    #{} {}",
				member.index,
				member.face.source_file.display()
			));
		}
	}
}
