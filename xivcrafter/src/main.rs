//! XIV Crafter.
//!
//! Headless crafting automation: loads the recipe document, runs one recipe
//! against the game window and prints progress. Type `p`, `r` or `s` followed
//! by Enter to pause, resume or stop the run.

mod capture;
mod config;
mod input;
mod util;

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use craft::{Capabilities, Controller, CraftError, CraftWindowDetector, Crafter, SystemClock};

use crate::config::Config;

#[derive(Debug, Parser)]
#[command(name = "xivcrafter", version, about = "Crafting automation for FINAL FANTASY XIV")]
struct Cli {
	/// Recipe to craft, by name.
	recipe: Option<String>,

	/// Repetitions to craft; defaults to the recipe's own quantity.
	#[arg(short, long)]
	quantity: Option<u32>,

	/// Print the recipes of the document and exit.
	#[arg(short, long)]
	list: bool,

	/// Recipe and action document; defaults to the one in the config.
	#[arg(short, long)]
	data: Option<PathBuf>,
}

fn main() -> Result<()> {
	// Structured logging. Use `RUST_LOG=debug` etc.
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
		)
		.with_writer(std::io::stderr)
		.init();

	let cli = Cli::parse();
	let mut config = Config::load_or_default();
	let document = cli.data.clone().unwrap_or_else(|| config.document.clone());
	let library = config::load_library(&document)?;

	if cli.list {
		for recipe in library.recipes() {
			println!("{} ({} steps, x{})", recipe.name, recipe.actions.len(), recipe.quantity);
		}
		return Ok(());
	}
	let recipe = cli.recipe.context("no recipe given (use --list to see the available ones)")?;

	let recognizer = capture::OcrRecognizer::new(config.ocr_models.clone(), config.assets_dir.clone());
	let detector = CraftWindowDetector::new(
		Box::new(recognizer),
		config.languages.clone(),
		config.region,
		config.tuning.keyword_distance,
	)
	.with_cached_language(config.cached_language.as_deref());
	let crafter = Crafter::new(detector, config.tuning.clone(), config.window_title.clone());

	let handle = crafter.start(
		&library,
		&recipe,
		cli.quantity,
		Capabilities {
			locator: Box::new(capture::XcapLocator),
			input: Box::new(input::EnigoInput),
			clock: Arc::new(SystemClock),
		},
	);
	spawn_control(handle.controller());

	for progress in handle.events().iter() {
		println!(
			"[{:>3.0}%] {}: {}",
			progress.fraction * 100.0,
			progress.phase,
			progress.message
		);
	}
	let outcome = handle.join();

	let detected = crafter.cached_language();
	if detected.is_some() && detected != config.cached_language {
		config.cached_language = detected;
		if let Err(err) = config.save() {
			tracing::warn!(error = %err, "failed to save detected language");
		}
	}

	match outcome.error {
		None | Some(CraftError::Stopped) => Ok(()),
		Some(err) => Err(anyhow::Error::new(err).context(format!(
			"crafting '{}' stopped after {}/{} repetitions",
			outcome.state.recipe, outcome.state.repetition, outcome.state.quantity
		))),
	}
}

/// Read pause/resume/stop commands from stdin for the lifetime of the run.
fn spawn_control(controller: Controller) {
	std::thread::spawn(move || {
		for line in std::io::stdin().lock().lines() {
			let Ok(line) = line else {
				break;
			};
			let applied = match line.trim().to_ascii_lowercase().as_str() {
				"p" | "pause" => controller.pause(),
				"r" | "resume" => controller.resume(),
				"s" | "stop" | "q" | "quit" => controller.stop(),
				"" => continue,
				other => {
					eprintln!("unknown command '{other}' (p = pause, r = resume, s = stop)");
					continue;
				}
			};
			if !applied {
				tracing::debug!(command = %line.trim(), "control command had no effect");
			}
			if controller.phase().is_terminal() {
				break;
			}
		}
	});
}
