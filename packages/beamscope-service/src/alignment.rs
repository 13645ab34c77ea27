use std::collections::VecDeque;

use beamscope_domain::{Partition, TokenPath};

use crate::{Error, Result};

/// FIFO pairing of sequence batches with the score batches that describe them.
///
/// The i-th score batch of a partition belongs to the i-th sequence batch of the same
/// partition. One instance lives for exactly one run.
#[derive(Debug)]
pub struct AlignmentQueues<'a> {
	run_index: u32,
	alive: VecDeque<&'a [TokenPath]>,
	finished: VecDeque<&'a [TokenPath]>,
}
impl<'a> AlignmentQueues<'a> {
	pub fn new(run_index: u32) -> Self {
		Self { run_index, alive: VecDeque::new(), finished: VecDeque::new() }
	}

	pub fn push(&mut self, partition: Partition, batch: &'a [TokenPath]) {
		self.queue_mut(partition).push_back(batch);
	}

	/// Pops the batch the `score_index`-th score dump of the run aligns with.
	pub fn pop(&mut self, partition: Partition, score_index: usize) -> Result<&'a [TokenPath]> {
		let run_index = self.run_index;

		self.queue_mut(partition).pop_front().ok_or(Error::AlignmentUnderflow {
			run_index,
			partition,
			score_index,
		})
	}

	pub fn pending(&self, partition: Partition) -> usize {
		match partition {
			Partition::Alive => self.alive.len(),
			Partition::Finished => self.finished.len(),
		}
	}

	fn queue_mut(&mut self, partition: Partition) -> &mut VecDeque<&'a [TokenPath]> {
		match partition {
			Partition::Alive => &mut self.alive,
			Partition::Finished => &mut self.finished,
		}
	}
}
