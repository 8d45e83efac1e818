//! Gallery, matching and clustering pipeline

pub mod cluster;
pub mod export;
pub mod gallery;
pub mod image;
pub mod matcher;
pub mod recognize;
pub mod scan;

pub use cluster::{cluster_faces, clusterer_for, Clusterer, Dbscan, Hdbscan};
pub use gallery::{Gallery, GalleryEntry, GalleryStats};
pub use matcher::{MatchPolicy, Matcher, ThresholdPolicy};
pub use recognize::{recognize_directory, recognize_image, FaceMatch, ImageReport, RecognitionRun};
