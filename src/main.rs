//! facesort - recognize known faces, cluster the unknown ones

use anyhow::Result;
use clap::{CommandFactory, Parser};

use facesort::cli::{cluster_params, Cli, Command};
use facesort::commands::{self, recognize::RecognizeOptions};
use facesort::config;
use facesort::runtime::set_provider;
use facesort::ui::{self, Log};

fn main() {
	if let Err(e) = run() {
		ui::error(&format!("{:#}", e));
		std::process::exit(1);
	}
}

fn run() -> Result<()> {
	let cli = Cli::parse();

	Log::set_verbose(cli.verbose);
	set_provider(cli.provider);
	if let Some(dir) = cli.models {
		config::set_model_dir(dir);
	}
	if let Some(path) = cli.detector {
		config::set_detector_model(path);
	}
	if let Some(path) = cli.encoder {
		config::set_encoder_model(path);
	}

	match cli.command {
		Command::Gallery { known, cache, check } => {
			print_header();
			let cache = cache.unwrap_or_else(|| config::default_cache_dir(&known));
			commands::gallery::run(&known, &cache, check)
		}
		Command::Recognize {
			known,
			test,
			cache,
			output,
			threshold,
			algorithm,
			eps,
			min_samples,
			min_cluster_size,
			export,
			no_crops,
		} => {
			print_header();
			let cache = cache.unwrap_or_else(|| config::default_cache_dir(&known));
			commands::recognize::run(RecognizeOptions {
				known: &known,
				test: &test,
				cache: &cache,
				output: &output,
				threshold,
				params: cluster_params(algorithm, eps, min_samples, min_cluster_size),
				export: export.as_deref(),
				crops: !no_crops,
			})
		}
		Command::Clean { known, cache, yes } => {
			print_header();
			let cache = cache.unwrap_or_else(|| config::default_cache_dir(&known));
			commands::clean::run(&known, &cache, yes)
		}
		Command::Help { subcommand } => {
			let mut cmd = Cli::command();
			if let Some(sub) = subcommand {
				if let Some(sub_cmd) = cmd.find_subcommand_mut(&sub) {
					sub_cmd.print_help()?;
				} else {
					ui::error(&format!("Unknown subcommand: {}", sub));
					cmd.print_help()?;
				}
			} else {
				cmd.print_help()?;
			}
			Ok(())
		}
	}
}

fn print_header() {
	ui::header(&format!("facesort v{}", env!("CARGO_PKG_VERSION")));
}
