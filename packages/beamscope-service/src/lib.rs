pub mod alignment;
pub mod builder;
pub mod graph;
pub mod nbest;
pub mod processing;
pub mod state;
pub mod visualization;

mod error;

pub use alignment::AlignmentQueues;
pub use builder::{GraphBuilder, build};
pub use error::{Error, Result};
pub use graph::{Edge, EdgeData, EdgeId, EdgeRecord, Graph, SearchGraph, Vertex, VertexRecord};
pub use nbest::{Candidate, NBest, NBestData, SentenceRecord, extract};
pub use processing::{ProcessingStep, QueryProcessing, Segment, save_until_eos, summarize};
pub use state::{GraphStateVector, state_vector};
pub use visualization::{
	GraphVisualization, InsightResponse, NBestVisualization, ProcessingVisualization,
	Visualization,
};

use std::path::{Path, PathBuf};

use beamscope_config::Config;
use beamscope_trace::{TraceReader, TraceScratch};
use beamscope_vocab::Vocabulary;

/// The decoding subsystem: runs the model on `query`, dumps its beam search into
/// `trace_dir` and returns the output token ids.
pub trait Decoder
where
	Self: Send + Sync,
{
	fn decode_into(&self, query: &str, trace_dir: &Path) -> color_eyre::Result<Vec<u32>>;
}

/// Graph and n-best list reconstructed from one trace.
#[derive(Clone, Debug)]
pub struct Reconstruction {
	pub graph: Graph,
	pub nbest: NBest,
}

pub struct InsightService {
	pub reader: TraceReader,
	pub vocab: Box<dyn Vocabulary + Send + Sync>,
	pub scratch_base: PathBuf,
	pub top_k: usize,
}
impl InsightService {
	pub fn new(cfg: &Config, vocab: Box<dyn Vocabulary + Send + Sync>) -> Result<Self> {
		Ok(Self {
			reader: TraceReader::new(&cfg.trace)?,
			vocab,
			scratch_base: cfg.scratch.base_dir.clone(),
			top_k: cfg.state.top_k as usize,
		})
	}

	/// Reads `trace_dir` once and feeds the same runs to the graph builder and the extractor.
	pub fn reconstruct(&self, trace_dir: &Path) -> Result<Reconstruction> {
		let runs = self.reader.read(trace_dir)?;
		let graph = build(&runs, self.vocab.as_ref())?;
		let nbest = extract(&runs, self.vocab.as_ref())?;

		tracing::info!(
			runs = runs.len(),
			vertices = graph.vertices().len(),
			edges = graph.edges().len(),
			candidates = nbest.len(),
			"Reconstructed beam search trace."
		);

		Ok(Reconstruction { graph, nbest })
	}

	/// Builds the full response for a trace that already exists. Nothing is deleted.
	pub fn render(
		&self,
		trace_dir: &Path,
		query: &str,
		output_ids: &[u32],
	) -> Result<InsightResponse> {
		let Reconstruction { graph, nbest } = self.reconstruct(trace_dir)?;
		let processing = summarize(query, output_ids, self.vocab.as_ref())?;

		Ok(InsightResponse {
			result: vec![
				Visualization::Processing(ProcessingVisualization::new(processing)),
				Visualization::Graph(GraphVisualization::new(graph.to_search_graph())),
				Visualization::NBest(NBestVisualization::new(nbest.to_data())),
			],
		})
	}

	/// Decodes `query` into a fresh scratch directory and renders the result.
	///
	/// The scratch directory is removed whether or not any step fails.
	pub fn process(&self, decoder: &dyn Decoder, query: &str) -> Result<InsightResponse> {
		let scratch = TraceScratch::create(&self.scratch_base)?;
		let outcome = self.process_in(decoder, query, &scratch);

		release(scratch, outcome)
	}

	/// Like [`InsightService::process`], with a scratch directory the caller owns.
	pub fn process_in(
		&self,
		decoder: &dyn Decoder,
		query: &str,
		scratch: &TraceScratch,
	) -> Result<InsightResponse> {
		let output_ids = decoder.decode_into(query, scratch.path())?;

		self.render(scratch.path(), query, &output_ids)
	}

	pub fn state(&self, decoder: &dyn Decoder, query: &str) -> Result<GraphStateVector> {
		let scratch = TraceScratch::create(&self.scratch_base)?;
		let outcome = decoder
			.decode_into(query, scratch.path())
			.map_err(Error::from)
			.and_then(|_| self.state_from_trace(scratch.path(), query));

		release(scratch, outcome)
	}

	pub fn state_from_trace(&self, trace_dir: &Path, query: &str) -> Result<GraphStateVector> {
		let runs = self.reader.read(trace_dir)?;
		let graph = build(&runs, self.vocab.as_ref())?;

		state_vector(&graph, query, self.top_k)
	}
}

fn release<T>(scratch: TraceScratch, outcome: Result<T>) -> Result<T> {
	match outcome {
		Ok(value) => {
			scratch.cleanup()?;

			Ok(value)
		},
		// Dropping the handle still removes the directory; the processing error is returned.
		Err(err) => {
			drop(scratch);

			Err(err)
		},
	}
}
