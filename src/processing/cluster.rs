//! Density clustering of unrecognized faces

use anyhow::{Context, Result};
use hdbscan::{Hdbscan as HdbscanRunner, HdbscanHyperParams};
use rayon::prelude::*;
use std::collections::VecDeque;

use crate::core::{ClusterLabel, ClusterParams, Embedding, FaceClusters, UnmatchedQueue};
use crate::ui;

/// Raw label for points that belong to no cluster
pub const NOISE: i32 = -1;

/// Assigns one label per point: `0..n` for clusters, `NOISE` otherwise
pub trait Clusterer: Send + Sync {
	fn assign(&self, points: &[Embedding]) -> Result<Vec<i32>>;
}

/// Classic DBSCAN over Euclidean distance.
///
/// Neighborhoods include the point itself (`distance <= eps`). Points are
/// visited in input order, so cluster numbering follows discovery order and
/// a border point joins the first cluster that reaches it.
#[derive(Debug, Clone, Copy)]
pub struct Dbscan {
	pub eps: f32,
	pub min_samples: usize,
}

impl Default for Dbscan {
	fn default() -> Self {
		Self {
			eps: crate::config::CLUSTER_EPS,
			min_samples: crate::config::CLUSTER_MIN_SAMPLES,
		}
	}
}

impl Dbscan {
	fn neighborhoods(&self, points: &[Embedding]) -> Vec<Vec<usize>> {
		points
			.par_iter()
			.map(|p| {
				points
					.iter()
					.enumerate()
					.filter(|(_, q)| p.distance(q) <= self.eps)
					.map(|(j, _)| j)
					.collect()
			})
			.collect()
	}
}

impl Clusterer for Dbscan {
	fn assign(&self, points: &[Embedding]) -> Result<Vec<i32>> {
		const UNVISITED: i32 = -2;

		let neighbors = self.neighborhoods(points);
		let is_core = |i: usize| neighbors[i].len() >= self.min_samples;

		let mut labels = vec![UNVISITED; points.len()];
		let mut next_cluster = 0;

		for start in 0..points.len() {
			if labels[start] != UNVISITED {
				continue;
			}
			if !is_core(start) {
				labels[start] = NOISE;
				continue;
			}

			let cluster = next_cluster;
			next_cluster += 1;
			labels[start] = cluster;

			let mut frontier: VecDeque<usize> = neighbors[start].iter().copied().collect();
			while let Some(i) = frontier.pop_front() {
				match labels[i] {
					// Border point previously marked as noise
					NOISE => labels[i] = cluster,
					UNVISITED => {
						labels[i] = cluster;
						if is_core(i) {
							frontier.extend(neighbors[i].iter().copied());
						}
					}
					_ => {}
				}
			}
		}

		Ok(labels)
	}
}

/// HDBSCAN via the `hdbscan` crate, for collections where one radius does not fit all
#[derive(Debug, Clone, Copy)]
pub struct Hdbscan {
	pub min_cluster_size: usize,
	pub min_samples: Option<usize>,
}

impl Clusterer for Hdbscan {
	fn assign(&self, points: &[Embedding]) -> Result<Vec<i32>> {
		// Too few points to form even one cluster
		if points.len() < self.min_cluster_size.max(2) {
			return Ok(vec![NOISE; points.len()]);
		}

		let data: Vec<Vec<f32>> = points.iter().map(|e| e.as_slice().to_vec()).collect();

		let hyper_params = match self.min_samples {
			Some(min_samples) => HdbscanHyperParams::builder()
				.min_cluster_size(self.min_cluster_size)
				.min_samples(min_samples)
				.build(),
			None => HdbscanHyperParams::builder()
				.min_cluster_size(self.min_cluster_size)
				.build(),
		};

		let clusterer = HdbscanRunner::new(&data, hyper_params);
		clusterer.cluster().context("HDBSCAN clustering failed")
	}
}

/// Build the clusterer described by `params`
pub fn clusterer_for(params: &ClusterParams) -> Box<dyn Clusterer> {
	match *params {
		ClusterParams::Dbscan { eps, min_samples } => Box::new(Dbscan { eps, min_samples }),
		ClusterParams::Hdbscan { min_cluster_size, min_samples } => Box::new(Hdbscan {
			min_cluster_size,
			min_samples,
		}),
	}
}

/// Partition every unmatched face into `person_<n>` groups and `unclustered`.
/// Runs once over the whole queue; an empty queue never reaches the clusterer.
pub fn cluster_faces(queue: UnmatchedQueue, clusterer: &dyn Clusterer) -> Result<FaceClusters> {
	let mut clusters = FaceClusters::new();
	if queue.is_empty() {
		return Ok(clusters);
	}

	let faces = queue.into_faces();
	ui::info(&format!("Clustering {} unrecognized faces", faces.len()));

	let points: Vec<Embedding> = faces.iter().map(|f| f.embedding.clone()).collect();
	let labels = clusterer.assign(&points)?;

	if labels.len() != faces.len() {
		anyhow::bail!(
			"Clusterer returned {} labels for {} faces",
			labels.len(),
			faces.len()
		);
	}

	for (index, (face, raw)) in faces.into_iter().zip(labels).enumerate() {
		clusters.insert(ClusterLabel::from_raw(raw), index, face);
	}

	ui::debug(&format!(
		"Found {} clusters and {} unclustered faces",
		clusters.persons().count(),
		clusters.unclustered().len()
	));

	Ok(clusters)
}
