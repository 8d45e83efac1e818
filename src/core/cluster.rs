//! Cluster data structures for grouping unrecognized faces

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::UnmatchedFace;
use crate::config::{PERSON_PREFIX, UNCLUSTERED_LABEL};

/// Label assigned by the cluster engine. Persons order before the noise bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClusterLabel {
	Person(usize),
	Unclustered,
}

impl ClusterLabel {
	/// Map a raw clusterer assignment; any negative value is noise
	pub fn from_raw(raw: i32) -> Self {
		if raw < 0 {
			ClusterLabel::Unclustered
		} else {
			ClusterLabel::Person(raw as usize)
		}
	}

	pub fn is_unclustered(&self) -> bool {
		matches!(self, ClusterLabel::Unclustered)
	}
}

impl fmt::Display for ClusterLabel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ClusterLabel::Person(n) => write!(f, "{}{}", PERSON_PREFIX, n),
			ClusterLabel::Unclustered => f.write_str(UNCLUSTERED_LABEL),
		}
	}
}

impl Serialize for ClusterLabel {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

/// Which density algorithm to run and with what parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "lowercase")]
pub enum ClusterParams {
	Dbscan { eps: f32, min_samples: usize },
	Hdbscan { min_cluster_size: usize, min_samples: Option<usize> },
}

impl Default for ClusterParams {
	fn default() -> Self {
		ClusterParams::Dbscan {
			eps: crate::config::CLUSTER_EPS,
			min_samples: crate::config::CLUSTER_MIN_SAMPLES,
		}
	}
}

/// Faces grouped per cluster label; members keep queue order
#[derive(Debug, Default)]
pub struct FaceClusters {
	groups: BTreeMap<ClusterLabel, Vec<IndexedFace>>,
}

/// An unmatched face with its position in the original queue
#[derive(Debug, Clone)]
pub struct IndexedFace {
	pub index: usize,
	pub face: UnmatchedFace,
}

impl FaceClusters {
	pub fn new() -> Self {
		Self::default()
	}

	pub(crate) fn insert(&mut self, label: ClusterLabel, index: usize, face: UnmatchedFace) {
		self.groups.entry(label).or_default().push(IndexedFace { index, face });
	}

	/// Number of labels, including the noise bucket when present
	pub fn len(&self) -> usize {
		self.groups.len()
	}

	pub fn is_empty(&self) -> bool {
		self.groups.is_empty()
	}

	pub fn total_faces(&self) -> usize {
		self.groups.values().map(Vec::len).sum()
	}

	pub fn get(&self, label: ClusterLabel) -> Option<&[IndexedFace]> {
		self.groups.get(&label).map(Vec::as_slice)
	}

	/// Genuine clusters in discovery order
	pub fn persons(&self) -> impl Iterator<Item = (ClusterLabel, &[IndexedFace])> {
		self.iter().filter(|(label, _)| !label.is_unclustered())
	}

	pub fn unclustered(&self) -> &[IndexedFace] {
		self.get(ClusterLabel::Unclustered).unwrap_or(&[])
	}

	pub fn iter(&self) -> impl Iterator<Item = (ClusterLabel, &[IndexedFace])> {
		self.groups.iter().map(|(label, faces)| (*label, faces.as_slice()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn labels_render_like_directory_names() {
		assert_eq!(ClusterLabel::Person(0).to_string(), "person_0");
		assert_eq!(ClusterLabel::Person(12).to_string(), "person_12");
		assert_eq!(ClusterLabel::Unclustered.to_string(), "unclustered");
	}

	#[test]
	fn negative_raw_labels_are_noise() {
		assert_eq!(ClusterLabel::from_raw(-1), ClusterLabel::Unclustered);
		assert_eq!(ClusterLabel::from_raw(3), ClusterLabel::Person(3));
	}

	#[test]
	fn noise_sorts_after_persons() {
		let mut labels = vec![
			ClusterLabel::Unclustered,
			ClusterLabel::Person(2),
			ClusterLabel::Person(0),
		];
		labels.sort();
		assert_eq!(
			labels,
			vec![ClusterLabel::Person(0), ClusterLabel::Person(2), ClusterLabel::Unclustered]
		);
	}
}
