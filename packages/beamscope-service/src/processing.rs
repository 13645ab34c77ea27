use serde::{Deserialize, Serialize};

use beamscope_domain::END_OF_SEQUENCE_ID;
use beamscope_vocab::Vocabulary;

use crate::Result;

const INITIAL_STEP: &str = "Initial";
const FINAL_STEP: &str = "Final";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueryProcessing {
	pub source_processing: Vec<ProcessingStep>,
	pub target_processing: Vec<ProcessingStep>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStep {
	pub step_name: String,
	pub segment: Vec<Segment>,
}
impl ProcessingStep {
	fn new<I>(step_name: &str, texts: I) -> Self
	where
		I: IntoIterator<Item = String>,
	{
		Self {
			step_name: step_name.to_string(),
			segment: texts.into_iter().map(|text| Segment { text }).collect(),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
	pub text: String,
}

/// Output ids up to the first end-of-sequence id, terminated by exactly one.
pub fn save_until_eos(ids: &[u32]) -> Vec<u32> {
	let end = ids.iter().position(|id| *id == END_OF_SEQUENCE_ID).unwrap_or(ids.len());
	let mut kept = Vec::with_capacity(end + 1);

	kept.extend_from_slice(&ids[..end]);
	kept.push(END_OF_SEQUENCE_ID);

	kept
}

/// Source query and decoded target, the latter both piecewise and joined.
pub fn summarize<V>(query: &str, output_ids: &[u32], vocab: &V) -> Result<QueryProcessing>
where
	V: Vocabulary + ?Sized,
{
	let ids = save_until_eos(output_ids);
	let pieces = vocab.decode_list(&ids)?;
	let decoded = vocab.decode(&ids)?;

	Ok(QueryProcessing {
		source_processing: vec![ProcessingStep::new(INITIAL_STEP, [query.to_string()])],
		target_processing: vec![
			ProcessingStep::new(INITIAL_STEP, pieces),
			ProcessingStep::new(FINAL_STEP, [decoded]),
		],
	})
}
