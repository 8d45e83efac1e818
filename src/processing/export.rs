//! Cluster crops and JSON reports

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::image;
use super::recognize::ImageReport;
use crate::core::{ClusterLabel, ClusterParams, FaceBox, FaceClusters};
use crate::ui;

/// Save each clustered face as `<out_dir>/<label>/face_<n>.png`, `n` being
/// its position in the unmatched queue. Returns the number of crops written.
pub fn export_crops(clusters: &FaceClusters, out_dir: &Path) -> Result<usize> {
	let mut written = 0;

	for (label, members) in clusters.iter() {
		let label_dir = out_dir.join(label.to_string());
		fs::create_dir_all(&label_dir)
			.with_context(|| format!("Failed to create {}", label_dir.display()))?;

		for member in members {
			let source = &member.face.source_file;
			let img = match image::load(source) {
				Ok(img) => img,
				Err(e) => {
					ui::warn(&format!("{}: {}, skipping crop", source.display(), e));
					continue;
				}
			};

			let b = member.face.bounding_box.clamp(img.width(), img.height());
			if b.is_empty() {
				ui::debug(&format!("{}: empty face box, skipping crop", source.display()));
				continue;
			}

			let crop_path = label_dir.join(format!("face_{}.png", member.index));
			img.crop_imm(b.x, b.y, b.width, b.height)
				.save(&crop_path)
				.with_context(|| format!("Failed to save {}", crop_path.display()))?;
			written += 1;
		}
	}

	Ok(written)
}

#[derive(Debug, Serialize)]
struct Report {
	timestamp: String,
	version: &'static str,
	params: ClusterParams,
	images: Vec<ImageEntry>,
	clusters: Vec<ClusterEntry>,
}

#[derive(Debug, Serialize)]
struct ImageEntry {
	path: PathBuf,
	faces: Vec<FaceEntry>,
}

#[derive(Debug, Serialize)]
struct FaceEntry {
	label: String,
	confidence: f32,
	#[serde(rename = "box")]
	bounding_box: FaceBox,
}

#[derive(Debug, Serialize)]
struct ClusterEntry {
	label: ClusterLabel,
	size: usize,
	members: Vec<MemberEntry>,
}

#[derive(Debug, Serialize)]
struct MemberEntry {
	face: usize,
	source: PathBuf,
	#[serde(rename = "box")]
	bounding_box: FaceBox,
}

/// Write recognition results and clusters as JSON; `-` prints to stdout
pub fn write_report(
	path: &Path,
	reports: &[ImageReport],
	clusters: &FaceClusters,
	params: ClusterParams,
) -> Result<()> {
	let report = Report {
		timestamp: chrono::Utc::now().to_rfc3339(),
		version: env!("CARGO_PKG_VERSION"),
		params,
		images: reports
			.iter()
			.map(|r| ImageEntry {
				path: r.path.clone(),
				faces: r
					.faces
					.iter()
					.map(|f| FaceEntry {
						label: f.identity.label().to_string(),
						confidence: f.identity.confidence(),
						bounding_box: f.bounding_box,
					})
					.collect(),
			})
			.collect(),
		clusters: clusters
			.iter()
			.map(|(label, members)| ClusterEntry {
				label,
				size: members.len(),
				members: members
					.iter()
					.map(|m| MemberEntry {
						face: m.index,
						source: m.face.source_file.clone(),
						bounding_box: m.face.bounding_box,
					})
					.collect(),
			})
			.collect(),
	};

	let json = serde_json::to_string_pretty(&report)?;

	if path.to_str() == Some("-") || path.as_os_str().is_empty() {
		println!("{}", json);
	} else {
		fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
		ui::success(&format!("Exported to {}", path.display()));
	}

	Ok(())
}
