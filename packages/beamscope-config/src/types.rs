use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	#[serde(default)]
	pub trace: Trace,
	pub vocabulary: Vocabulary,
	pub scratch: Scratch,
	#[serde(default)]
	pub state: State,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Trace {
	/// Run subdirectories are the entries of the trace root whose name starts with this prefix.
	pub run_prefix: String,
	/// Node names that do not match this pattern are never considered dump records.
	pub watch_pattern: String,
	pub sequence_marker: String,
	pub score_marker: String,
	pub alive_marker: String,
	pub finished_marker: String,
	/// One of "skip_run" or "skip_record".
	pub malformed: String,
}
impl Default for Trace {
	fn default() -> Self {
		Self {
			run_prefix: "run_".to_string(),
			watch_pattern: ".*grow_(finished|alive)_(topk_scores|topk_seq).*".to_string(),
			sequence_marker: "topk_seq".to_string(),
			score_marker: "topk_scores".to_string(),
			alive_marker: "alive".to_string(),
			finished_marker: "finished".to_string(),
			malformed: "skip_run".to_string(),
		}
	}
}

#[derive(Debug, Deserialize)]
pub struct Vocabulary {
	pub tokenizer_file: Option<PathBuf>,
	pub tokenizer_repo: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Scratch {
	pub base_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct State {
	pub top_k: u32,
}
impl Default for State {
	fn default() -> Self {
		Self { top_k: 4 }
	}
}
