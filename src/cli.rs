use clap::{builder::Styles, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::{CLUSTER_EPS, CLUSTER_MIN_SAMPLES, MATCH_THRESHOLD};
use crate::core::ClusterParams;

/// Execution provider for ONNX Runtime
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum Provider {
	/// Auto-detect best available (TensorRT → CUDA → CoreML → XNNPACK → CPU)
	#[default]
	Auto,
	/// CPU only
	Cpu,
	/// NVIDIA CUDA GPU
	Cuda,
	/// NVIDIA TensorRT
	Tensorrt,
	/// Apple CoreML (macOS only)
	Coreml,
	/// XNNPACK optimized CPU kernels
	Xnnpack,
}

/// Density algorithm used to group unrecognized faces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Algorithm {
	/// Fixed-radius density clustering (eps / min-samples)
	#[default]
	Dbscan,
	/// Hierarchical density clustering (min-cluster-size)
	Hdbscan,
}

fn parse_threshold(s: &str) -> Result<f32, String> {
	let val: f32 = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
	if !val.is_finite() || val <= 0.0 {
		Err(format!("threshold must be a positive number, got {}", val))
	} else {
		Ok(val)
	}
}

fn parse_min_samples(s: &str) -> Result<usize, String> {
	let val: usize = s.parse().map_err(|_| format!("'{}' is not a valid count", s))?;
	if val == 0 {
		Err("must be at least 1".to_string())
	} else {
		Ok(val)
	}
}

fn styles() -> Styles {
	Styles::styled()
		.header(anstyle::Style::new().bold().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Blue))))
		.usage(anstyle::Style::new().bold().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Blue))))
		.literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Blue))))
		.placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))))
		.valid(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Blue))))
		.invalid(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))))
}

#[derive(Parser, Debug)]
#[command(
	name = "facesort",
	author,
	version,
	about = "Recognize known faces and group the unknown ones",
	styles = styles(),
	disable_help_subcommand = true,
	after_help = format!(
		"{title}
  {bin} {gallery}    {gallery_args}                {gallery_desc}
  {bin} {recognize}  {recognize_args}  {recognize_desc}
  {bin} {recognize}  {tuned_args}         {tuned_desc}
  {bin} {clean}      {clean_args}                {clean_desc}",
		title = "Examples:".bright_blue().bold(),
		bin = "facesort".bright_blue(),
		gallery = "gallery".yellow(),
		gallery_args = "-k ./known/",
		gallery_desc = "Warm the embedding cache".dimmed(),
		recognize = "recognize".yellow(),
		recognize_args = "-k ./known/ -t ./photos/",
		recognize_desc = "Match and cluster faces".dimmed(),
		tuned_args = "-k ./known/ -t ./photos/ --eps 0.45",
		tuned_desc = "Tighter clusters".dimmed(),
		clean = "clean".yellow(),
		clean_args = "-k ./known/",
		clean_desc = "Drop stale cache records".dimmed(),
	),
)]
pub struct Cli {
	/// Enable verbose debug output
	#[arg(short = 'v', long = "verbose", global = true)]
	pub verbose: bool,

	/// Execution provider: auto, cpu, cuda, tensorrt, coreml, xnnpack
	#[arg(short = 'p', long = "provider", global = true, default_value = "auto")]
	pub provider: Provider,

	/// Directory holding the detector and encoder models
	#[arg(long = "models", global = true, value_name = "DIR")]
	pub models: Option<PathBuf>,

	/// Face detector model file, overriding the models directory
	#[arg(long = "detector", global = true, value_name = "FILE")]
	pub detector: Option<PathBuf>,

	/// Face encoder model file, overriding the models directory
	#[arg(long = "encoder", global = true, value_name = "FILE")]
	pub encoder: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Embed every known sample and populate the cache
	Gallery {
		/// Known faces directory, one subdirectory per person
		#[arg(short = 'k', long = "known")]
		known: PathBuf,

		/// Cache directory (default: <known>_cache next to the known directory)
		#[arg(short = 'c', long = "cache")]
		cache: Option<PathBuf>,

		/// Report cache coverage without running any model
		#[arg(long = "check")]
		check: bool,
	},

	/// Recognize faces in test images and cluster the unrecognized ones
	Recognize {
		/// Known faces directory, one subdirectory per person
		#[arg(short = 'k', long = "known")]
		known: PathBuf,

		/// Directory of images to recognize
		#[arg(short = 't', long = "test")]
		test: PathBuf,

		/// Cache directory (default: <known>_cache next to the known directory)
		#[arg(short = 'c', long = "cache")]
		cache: Option<PathBuf>,

		/// Output directory for cluster crops
		#[arg(short = 'o', long = "output", default_value = "clustered_faces")]
		output: PathBuf,

		/// Maximum distance for a face to count as recognized
		#[arg(long = "threshold", default_value_t = MATCH_THRESHOLD, value_parser = parse_threshold)]
		threshold: f32,

		/// Clustering algorithm
		#[arg(short = 'a', long = "algorithm", default_value = "dbscan")]
		algorithm: Algorithm,

		/// DBSCAN neighborhood radius
		#[arg(long = "eps", default_value_t = CLUSTER_EPS, value_parser = parse_threshold)]
		eps: f32,

		/// DBSCAN core point density; also HDBSCAN min samples when given with --algorithm hdbscan
		#[arg(short = 'm', long = "min-samples", default_value_t = CLUSTER_MIN_SAMPLES, value_parser = parse_min_samples)]
		min_samples: usize,

		/// HDBSCAN minimum cluster size
		#[arg(long = "min-cluster-size", default_value_t = CLUSTER_MIN_SAMPLES, value_parser = parse_min_samples)]
		min_cluster_size: usize,

		/// Write recognition and cluster results as JSON (`-` for stdout)
		#[arg(short = 'e', long = "export", value_name = "FILE")]
		export: Option<PathBuf>,

		/// Skip writing cluster crops
		#[arg(long = "no-crops")]
		no_crops: bool,
	},

	/// Remove cache records whose sample is gone, and leftover partial writes
	Clean {
		/// Known faces directory the cache belongs to
		#[arg(short = 'k', long = "known")]
		known: PathBuf,

		/// Cache directory (default: <known>_cache next to the known directory)
		#[arg(short = 'c', long = "cache")]
		cache: Option<PathBuf>,

		/// Delete without asking
		#[arg(short = 'y', long = "yes")]
		yes: bool,
	},

	/// Show help for a subcommand
	Help {
		/// Subcommand name
		subcommand: Option<String>,
	},
}

/// Build clustering parameters from the `recognize` flags
pub fn cluster_params(algorithm: Algorithm, eps: f32, min_samples: usize, min_cluster_size: usize) -> ClusterParams {
	match algorithm {
		Algorithm::Dbscan => ClusterParams::Dbscan { eps, min_samples },
		Algorithm::Hdbscan => ClusterParams::Hdbscan {
			min_cluster_size,
			min_samples: Some(min_samples),
		},
	}
}
