use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Number;

use beamscope_domain::{DumpKind, Partition, TokenPath};

use crate::{Error, Result};

/// Element type of a dumped tensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
	Int32,
	Int64,
	Float32,
	Float64,
}
impl DType {
	pub fn is_integer(self) -> bool {
		matches!(self, Self::Int32 | Self::Int64)
	}
}

/// One debug datum as written to disk: a watched node's output tensor, flattened row-major.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawDump {
	pub node_name: String,
	#[serde(default)]
	pub output_slot: u32,
	#[serde(default = "default_debug_op")]
	pub debug_op: String,
	pub timestamp: u64,
	pub dtype: DType,
	pub shape: Vec<usize>,
	pub data: Vec<Number>,
}
impl RawDump {
	/// Row 0 of a `[1, batch, path_len]` integer tensor as token paths.
	pub fn into_sequences(self, path: &Path) -> Result<Vec<TokenPath>> {
		if !self.dtype.is_integer() {
			return Err(malformed(path, format!("sequence dump has {:?} elements", self.dtype)));
		}

		let &[rows, batch, path_len] = self.shape.as_slice() else {
			return Err(malformed(path, format!("sequence dump has shape {:?}", self.shape)));
		};

		if rows == 0 {
			return Err(malformed(path, "sequence dump has no rows".to_string()));
		}
		if path_len == 0 {
			return Err(malformed(path, "sequence dump has zero-length paths".to_string()));
		}

		self.check_len(path)?;

		let mut ids = Vec::with_capacity(batch * path_len);

		for value in &self.data[..batch * path_len] {
			let id = value
				.as_u64()
				.and_then(|raw| u32::try_from(raw).ok())
				.ok_or_else(|| malformed(path, format!("token id {value} is not a u32")))?;

			ids.push(id);
		}

		Ok(ids.chunks(path_len).map(|chunk| TokenPath::new(chunk.to_vec())).collect())
	}

	/// Row 0 of a `[1, batch]` numeric tensor.
	pub fn into_scores(self, path: &Path) -> Result<Vec<f64>> {
		let &[rows, batch] = self.shape.as_slice() else {
			return Err(malformed(path, format!("score dump has shape {:?}", self.shape)));
		};

		if rows == 0 {
			return Err(malformed(path, "score dump has no rows".to_string()));
		}

		self.check_len(path)?;

		self.data[..batch]
			.iter()
			.map(|value| {
				value.as_f64().ok_or_else(|| malformed(path, format!("score {value} is not numeric")))
			})
			.collect()
	}

	fn check_len(&self, path: &Path) -> Result<()> {
		let expected = self
			.shape
			.iter()
			.try_fold(1_usize, |acc, dim| acc.checked_mul(*dim))
			.ok_or_else(|| malformed(path, format!("shape {:?} overflows", self.shape)))?;

		if expected != self.data.len() {
			return Err(malformed(
				path,
				format!("shape {:?} needs {expected} values, found {}", self.shape, self.data.len()),
			));
		}

		Ok(())
	}
}

/// A validated dump record. `P` is the row-0 payload.
#[derive(Clone, Debug, PartialEq)]
pub struct DumpRecord<P> {
	pub run_index: u32,
	pub partition: Partition,
	pub node_name: String,
	pub timestamp: u64,
	pub payload: P,
}

pub type SequenceDump = DumpRecord<Vec<TokenPath>>;
pub type ScoreDump = DumpRecord<Vec<f64>>;

impl SequenceDump {
	pub fn kind(&self) -> DumpKind {
		DumpKind::SequenceBatch
	}
}

impl ScoreDump {
	pub fn kind(&self) -> DumpKind {
		DumpKind::ScoreBatch
	}
}

/// Records of one run, each list in emission order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunDumps {
	pub run_index: u32,
	pub name: String,
	pub sequences: Vec<SequenceDump>,
	pub scores: Vec<ScoreDump>,
}
impl RunDumps {
	pub fn empty(run_index: u32, name: String) -> Self {
		Self { run_index, name, sequences: Vec::new(), scores: Vec::new() }
	}

	pub fn is_empty(&self) -> bool {
		self.sequences.is_empty() && self.scores.is_empty()
	}
}

fn default_debug_op() -> String {
	"DebugIdentity".to_string()
}

fn malformed(path: &Path, message: String) -> Error {
	Error::MalformedDump { path: path.to_path_buf(), message }
}
