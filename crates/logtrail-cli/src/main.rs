// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Logtrail CLI
//!
//! Sends a test event, and exposes the template source-mapping pipeline for
//! inspection: marker injection, compiled-artifact resolution and exception
//! normalization.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Map};
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use logtrail::{Normalizer, PayloadBuilder, Reporter, Signer};
use logtrail_config::{load_config_with_cli, CliOverrides, LogtrailConfig};
use logtrail_core::{Level, LogEvent, RawException};
use logtrail_sourcemap::{ArtifactResolver, MarkerInjector, Precompiler};

const TEST_MESSAGE: &str = "Logtrail test message";

/// Logtrail - exception enrichment and delivery
#[derive(Parser, Debug)]
#[command(name = "logtrail", version, about, long_about = None)]
struct Args {
	/// Path to a configuration file (replaces ./.logtrail.toml)
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Application root used for relative paths and library detection
	#[arg(long, env = "LOGTRAIL_APP_ROOT")]
	app_root: Option<PathBuf>,

	/// Tracing filter for the CLI's own diagnostics
	#[arg(short, long)]
	log_level: Option<String>,

	/// Output diagnostics as JSON
	#[arg(long)]
	json_logs: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Send a test event to the ingest endpoint
	Test,

	/// Print a template with line markers injected
	Inject {
		/// Template file
		file: PathBuf,
	},

	/// Map a compiled template location back to its source
	Resolve {
		/// Compiled artifact
		compiled: PathBuf,
		/// Line in the compiled artifact
		line: u32,
	},

	/// Normalize a raw exception (JSON) and print the signed payload
	Normalize {
		/// File containing a raw exception as JSON
		file: PathBuf,

		/// Level recorded on the payload
		#[arg(long, default_value = "error")]
		level: Level,
	},
}

fn init_tracing(level: Option<&str>, json: bool) {
	let filter = match level {
		Some(level) => EnvFilter::new(level),
		None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
	};

	if json {
		tracing_subscriber::registry()
			.with(filter)
			.with(fmt::layer().json().with_writer(std::io::stderr))
			.init();
	} else {
		tracing_subscriber::registry()
			.with(filter)
			.with(fmt::layer().with_writer(std::io::stderr))
			.init();
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	let args = Args::parse();
	init_tracing(args.log_level.as_deref(), args.json_logs);

	let overrides = CliOverrides {
		app_root: args.app_root.clone(),
		..Default::default()
	};
	let config =
		load_config_with_cli(args.config.clone(), overrides).context("failed to load configuration")?;

	match args.command {
		Command::Test => run_test(config).await,
		Command::Inject { file } => run_inject(&config, &file),
		Command::Resolve { compiled, line } => run_resolve(&config, &compiled, line),
		Command::Normalize { file, level } => run_normalize(&config, &file, level),
	}
}

async fn run_test(config: LogtrailConfig) -> Result<()> {
	if !config.has_credentials() {
		bail!("LOGTRAIL_API_KEY and LOGTRAIL_API_SECRET must be set");
	}
	let endpoint = config.endpoint.clone();
	let reporter = Reporter::builder()
		.config(config)
		.build()
		.context("failed to create reporter")?;

	let mut context = Map::new();
	context.insert("test".to_string(), json!(true));
	let event = LogEvent::new(Level::Info, TEST_MESSAGE).with_context(context);

	reporter
		.send(event)
		.await
		.with_context(|| format!("failed to deliver test event to {endpoint}"))?;

	info!(endpoint = %endpoint, "test event delivered");
	println!("Test event sent to {endpoint}");
	Ok(())
}

fn run_inject(config: &LogtrailConfig, file: &Path) -> Result<()> {
	let source = std::fs::read_to_string(file)
		.with_context(|| format!("failed to read template {}", file.display()))?;
	let injector = MarkerInjector::new(config.template_sourcemap);
	if !injector.is_enabled() {
		debug!("template source-mapping disabled, printing template unchanged");
	}
	print!("{}", injector.precompile(&source));
	Ok(())
}

fn run_resolve(config: &LogtrailConfig, compiled: &Path, line: u32) -> Result<()> {
	let resolver = ArtifactResolver::new(config.compiled_layout());
	let path = compiled.to_string_lossy();
	if !resolver.is_compiled_artifact(&path) {
		bail!(
			"{} is not a compiled template (expected a path under {} ending in {})",
			compiled.display(),
			resolver.layout().compiled_dir,
			resolver.layout().compiled_extension
		);
	}

	let Some(resolved) = resolver.resolve(&path, line) else {
		bail!("no template source recorded in {}", compiled.display());
	};

	let file = config.root().relativize(&resolved.file);
	match resolved.line {
		Some(template_line) if resolved.line_mapped => println!("{file}:{template_line}"),
		_ => {
			println!("{file}");
			eprintln!("no line marker at or before line {line}");
		}
	}
	Ok(())
}

fn run_normalize(config: &LogtrailConfig, file: &Path, level: Level) -> Result<()> {
	let raw = std::fs::read_to_string(file)
		.with_context(|| format!("failed to read {}", file.display()))?;
	let exception: RawException =
		serde_json::from_str(&raw).context("input is not a raw exception")?;

	let builder = PayloadBuilder::new(
		Normalizer::from_config(config),
		Signer::new(config.api_secret.clone()),
	);
	let event = LogEvent::new(level, exception.message.clone()).with_exception(exception);
	let payload = builder.build(&event, None);

	println!("{}", serde_json::to_string_pretty(&payload)?);
	Ok(())
}
