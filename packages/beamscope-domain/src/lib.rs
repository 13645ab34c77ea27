pub mod path;

pub use path::{PathKey, TokenPath};

use serde::{Deserialize, Serialize};

/// Token id of an inactive beam slot and of the decoder start slot.
pub const PADDING_ID: u32 = 0;
pub const END_OF_SEQUENCE_ID: u32 = 1;

/// Beam-search pool a dump belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
	Alive,
	Finished,
}
impl Partition {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Alive => "alive",
			Self::Finished => "finished",
		}
	}
}

impl std::fmt::Display for Partition {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DumpKind {
	SequenceBatch,
	ScoreBatch,
}
