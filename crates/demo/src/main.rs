//! Roster demo binary.
//!
//! Drives one list view through a scripted session (initial load, typed name
//! filter, page click, page size change, teardown) against an in-memory member
//! directory, printing every coordinator state transition.

mod directory;
mod session;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use roster_query::{Coordinator, MemoryFetcher, PortalConfig};
use tracing::info;

const DEFAULT_CONFIG: &str = include_str!("../roster.toml");

/// Demo command line arguments.
#[derive(Parser, Debug)]
#[command(name = "roster-demo")]
#[command(about = "Drive a filtered member list through a scripted session")]
struct Args {
	/// Portal config file (TOML); the bundled config is used when omitted
	#[arg(short, long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// View to open
	#[arg(long, default_value = "members")]
	view: String,

	/// Number of members in the synthetic directory
	#[arg(long, default_value_t = 120)]
	members: u32,

	/// Simulated fetch latency in milliseconds
	#[arg(long, default_value_t = 120)]
	latency_ms: u64,

	/// Gap between simulated keystrokes in milliseconds
	#[arg(long, default_value_t = 80)]
	keystroke_ms: u64,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();
	setup_tracing(args.verbose);

	let portal = match &args.config {
		Some(path) => PortalConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
		None => PortalConfig::parse(DEFAULT_CONFIG).context("parsing bundled config")?,
	};
	let config = portal.view(&args.view)?;
	info!(view = %args.view, window_ms = config.debounce_window.as_millis() as u64, params = %config.initial_params, "opening view");

	let fetcher = Arc::new(MemoryFetcher::new(directory::members(args.members)).with_latency(Duration::from_millis(args.latency_ms)));
	let mut coordinator = Coordinator::new(fetcher, config)?;

	session::run(&mut coordinator, Duration::from_millis(args.keystroke_ms), |c| {
		println!("{}", session::describe(c));
		if let Some(result) = c.state().result() {
			for member in result.items.iter().take(3) {
				println!("    #{:<4} {:<20} {}", member.id, member.name, member.region);
			}
		}
	})
	.await?;

	Ok(())
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;
	use tracing_subscriber::prelude::*;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("roster=trace,debug")
		} else {
			EnvFilter::new("roster=debug,info")
		}
	});

	tracing_subscriber::registry()
		.with(filter)
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(true))
		.init();
}
