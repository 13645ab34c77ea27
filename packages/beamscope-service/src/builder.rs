use beamscope_domain::{PADDING_ID, Partition, TokenPath};
use beamscope_trace::RunDumps;
use beamscope_vocab::Vocabulary;

use crate::{
	Error, Result,
	alignment::AlignmentQueues,
	graph::{EdgeData, Graph},
};

/// Builds the search graph of a trace, run by run.
///
/// Fails on alignment underflow and batch size mismatch, since either would attach scores to
/// the wrong hypotheses. Vocabulary failures are fatal too.
pub fn build<V>(runs: &[RunDumps], vocab: &V) -> Result<Graph>
where
	V: Vocabulary + ?Sized,
{
	let mut builder = GraphBuilder::new(vocab);

	for run in runs {
		builder.add_run(run)?;
	}

	Ok(builder.finish())
}

pub struct GraphBuilder<'v, V>
where
	V: Vocabulary + ?Sized,
{
	vocab: &'v V,
	graph: Graph,
}
impl<'v, V> GraphBuilder<'v, V>
where
	V: Vocabulary + ?Sized,
{
	pub fn new(vocab: &'v V) -> Self {
		Self { vocab, graph: Graph::new() }
	}

	pub fn add_run(&mut self, run: &RunDumps) -> Result<()> {
		let mut queues = AlignmentQueues::new(run.run_index);

		for record in &run.sequences {
			for path in &record.payload {
				if path.ends_with_padding() {
					continue;
				}

				self.insert_path(path)?;
			}

			queues.push(record.partition, &record.payload);
		}

		for (score_index, record) in run.scores.iter().enumerate() {
			let paths = queues.pop(record.partition, score_index)?;

			if paths.len() != record.payload.len() {
				return Err(Error::BatchSizeMismatch {
					run_index: run.run_index,
					partition: record.partition,
					paths: paths.len(),
					scores: record.payload.len(),
				});
			}

			for (path, score) in paths.iter().zip(&record.payload) {
				if path.ends_with_padding() {
					continue;
				}

				match self.graph.incoming_edge(&path.key()) {
					Some(edge) => self.graph.set_score(edge, *score),
					None => tracing::debug!(
						run = %run.name,
						path = %path.key(),
						"Score targets a path without an edge."
					),
				}
			}
		}

		for partition in [Partition::Alive, Partition::Finished] {
			let pending = queues.pending(partition);

			if pending > 0 {
				tracing::debug!(
					run = %run.name,
					%partition,
					pending,
					"Discarding sequence batches without scores."
				);
			}
		}

		Ok(())
	}

	pub fn finish(self) -> Graph {
		self.graph
	}

	/// Adds the vertex of `path` together with every missing ancestor and incoming edge.
	fn insert_path(&mut self, path: &TokenPath) -> Result<()> {
		let key = path.key();

		if self.graph.contains(&key) {
			return Ok(());
		}
		if path.emitted().contains(&PADDING_ID) {
			tracing::warn!(path = %key, "Skipping path with padding inside it.");

			return Ok(());
		}

		let root = self.graph.root().clone();
		let mut parent = self.graph.vertex_or_insert(root.clone());
		let mut prefix = TokenPath::default().key();

		for id in path.ids() {
			prefix = prefix.child(*id);

			// The start slot is the root itself.
			if prefix == root {
				continue;
			}

			let child = self.graph.vertex_or_insert(prefix.clone());

			if self.graph.vertices()[child].in_edges.is_empty() {
				let label = self.vocab.piece(*id)?;

				self.graph.link(parent, child, EdgeData::new(label, *id));
			}

			parent = child;
		}

		Ok(())
	}
}
