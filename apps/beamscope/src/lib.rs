use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use beamscope_config::Config;
use beamscope_service::{GraphVisualization, InsightService, NBestVisualization};
use beamscope_vocab::TokenizerVocabulary;

#[derive(Debug, Parser)]
#[command(
	version = beamscope_cli::VERSION,
	rename_all = "kebab",
	styles = beamscope_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Print the processing summary, graph and n-best list of a trace.
	Render(RenderArgs),
	/// Print the search graph of a trace.
	Graph(TraceArgs),
	/// Print the finished candidates of a trace.
	Nbest(TraceArgs),
	/// Print the score vector handed to the similarity index.
	State(StateArgs),
}

#[derive(Debug, clap::Args)]
pub struct TraceArgs {
	#[arg(long, value_name = "DIR")]
	pub trace_dir: PathBuf,
	#[arg(long)]
	pub pretty: bool,
}

#[derive(Debug, clap::Args)]
pub struct RenderArgs {
	#[command(flatten)]
	pub trace: TraceArgs,
	#[arg(long, value_name = "TEXT", default_value = "")]
	pub query: String,
	/// Output token ids of the decode, comma separated.
	#[arg(long, value_name = "IDS", value_delimiter = ',')]
	pub output_ids: Vec<u32>,
}

#[derive(Debug, clap::Args)]
pub struct StateArgs {
	#[command(flatten)]
	pub trace: TraceArgs,
	#[arg(long, value_name = "TEXT")]
	pub query: String,
}

pub fn run(args: Args) -> color_eyre::Result<()> {
	let config = beamscope_config::load(&args.config)?;

	init_tracing(&config)?;

	let vocab = TokenizerVocabulary::from_config(&config.vocabulary)?;

	tracing::debug!(vocab_size = vocab.vocab_size(), "Loaded vocabulary.");

	let service = InsightService::new(&config, Box::new(vocab))?;
	let output = execute(&service, &args.command)?;

	println!("{output}");

	Ok(())
}

/// Runs one command against `service` and returns the JSON it prints.
pub fn execute(service: &InsightService, command: &Command) -> color_eyre::Result<String> {
	match command {
		Command::Render(args) => {
			let response =
				service.render(&args.trace.trace_dir, &args.query, &args.output_ids)?;

			to_json(&response, args.trace.pretty)
		},
		Command::Graph(args) => {
			let reconstruction = service.reconstruct(&args.trace_dir)?;
			let visualization = GraphVisualization::new(reconstruction.graph.to_search_graph());

			to_json(&visualization, args.pretty)
		},
		Command::Nbest(args) => {
			let reconstruction = service.reconstruct(&args.trace_dir)?;
			let visualization = NBestVisualization::new(reconstruction.nbest.to_data());

			to_json(&visualization, args.pretty)
		},
		Command::State(args) => {
			let state = service.state_from_trace(&args.trace.trace_dir, &args.query)?;

			to_json(&state, args.trace.pretty)
		},
	}
}

fn to_json<T>(value: &T, pretty: bool) -> color_eyre::Result<String>
where
	T: Serialize,
{
	let json =
		if pretty { serde_json::to_string_pretty(value)? } else { serde_json::to_string(value)? };

	Ok(json)
}

fn init_tracing(config: &Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_writer(std::io::stderr).with_env_filter(filter).init();

	Ok(())
}
