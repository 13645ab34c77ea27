use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use beamscope_domain::{Partition, PathKey, TokenPath};
use beamscope_trace::RunDumps;
use beamscope_vocab::Vocabulary;

use crate::Result;

/// A finished hypothesis and its score.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
	/// Trimmed path, never ending in padding.
	pub path: TokenPath,
	pub key: PathKey,
	pub pieces: Vec<String>,
	pub text: String,
	pub score: f64,
}

/// Finished candidates in first-seen order, unique by path.
#[derive(Clone, Debug, Default)]
pub struct NBest {
	candidates: Vec<Candidate>,
	seen: AHashSet<PathKey>,
}
impl NBest {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn contains(&self, key: &PathKey) -> bool {
		self.seen.contains(key)
	}

	/// Returns `false` and leaves the list untouched when the path is already present.
	pub fn insert(&mut self, candidate: Candidate) -> bool {
		if !self.seen.insert(candidate.key.clone()) {
			return false;
		}

		self.candidates.push(candidate);

		true
	}

	pub fn candidates(&self) -> &[Candidate] {
		&self.candidates
	}

	pub fn len(&self) -> usize {
		self.candidates.len()
	}

	pub fn is_empty(&self) -> bool {
		self.candidates.is_empty()
	}

	/// Candidates ordered by descending score, ties kept in first-seen order.
	pub fn ranked(&self) -> Vec<&Candidate> {
		let mut ranked: Vec<&Candidate> = self.candidates.iter().collect();

		ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

		ranked
	}

	pub fn to_data(&self) -> NBestData {
		NBestData {
			sentence: self
				.candidates
				.iter()
				.map(|candidate| SentenceRecord {
					path: candidate.key.as_str().to_string(),
					text: candidate.text.clone(),
					score: candidate.score,
				})
				.collect(),
		}
	}
}

/// Collects finished candidates from sequence and score dumps paired by emission order.
///
/// A pair counts only when both sides belong to the finished partition. Unequal dump counts
/// stop a run at the shorter list.
pub fn extract<V>(runs: &[RunDumps], vocab: &V) -> Result<NBest>
where
	V: Vocabulary + ?Sized,
{
	let mut nbest = NBest::new();

	for run in runs {
		if run.sequences.len() != run.scores.len() {
			tracing::debug!(
				run = %run.name,
				sequences = run.sequences.len(),
				scores = run.scores.len(),
				"Pairing stops at the shorter dump list."
			);
		}

		for (sequences, scores) in run.sequences.iter().zip(&run.scores) {
			if sequences.partition != Partition::Finished || scores.partition != Partition::Finished
			{
				continue;
			}

			for (path, score) in sequences.payload.iter().zip(&scores.payload) {
				let path = path.trim_padding();

				// An all-padding row is an unused beam slot.
				if path.is_empty() {
					continue;
				}

				let key = path.key();

				if nbest.contains(&key) {
					continue;
				}

				let pieces = vocab.decode_list(path.emitted())?;
				let text = vocab.decode(path.emitted())?;

				nbest.insert(Candidate { path, key, pieces, text, score: *score });
			}
		}
	}

	Ok(nbest)
}

/// Plain form of an [`NBest`] list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NBestData {
	pub sentence: Vec<SentenceRecord>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SentenceRecord {
	pub path: String,
	pub text: String,
	pub score: f64,
}
