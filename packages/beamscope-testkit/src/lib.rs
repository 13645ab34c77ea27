mod error;

pub use error::{Error, Result};

use std::{
	env, fs,
	path::{Path, PathBuf},
};

use serde_json::Number;
use tokenizers::Tokenizer;
use uuid::Uuid;

use beamscope_trace::{DType, RawDump};
use beamscope_vocab::TokenizerVocabulary;

pub const ALIVE_SEQ: &str = "body/while/grow_alive_topk_seq";
pub const ALIVE_SCORES: &str = "body/while/grow_alive_topk_scores";
pub const FINISHED_SEQ: &str = "body/while/grow_finished_topk_seq";
pub const FINISHED_SCORES: &str = "body/while/grow_finished_topk_scores";

/// Words of the fixture vocabulary, indexed by token id.
pub const FIXTURE_WORDS: [&str; 12] =
	["<pad>", "<EOS>", "<unk>", "the", "cat", "sat", "on", "mat", "a", "dog", "ran", "home"];

/// A trace directory on local disk, laid out the way a decoding run dumps it.
///
/// Each dump written through the fixture gets the next timestamp, so emission order equals
/// call order unless a test writes a [`RawDump`] with its own timestamp.
pub struct TraceFixture {
	root: PathBuf,
	next_timestamp: u64,
	cleaned: bool,
}
impl TraceFixture {
	pub fn new() -> Result<Self> {
		let root = env::temp_dir().join(format!("beamscope_trace_{}", Uuid::new_v4().simple()));

		fs::create_dir_all(&root)?;

		Ok(Self { root, next_timestamp: 1, cleaned: false })
	}

	/// Writes into a directory someone else owns, such as a decoder's scratch directory.
	/// Nothing is removed on cleanup or drop.
	pub fn borrowed(root: &Path) -> Self {
		Self { root: root.to_path_buf(), next_timestamp: 1, cleaned: true }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	pub fn run_dir(&self, run: &str) -> PathBuf {
		self.root.join(run)
	}

	pub fn add_run(&self, run: &str) -> Result<PathBuf> {
		let dir = self.run_dir(run);

		fs::create_dir_all(&dir)?;

		Ok(dir)
	}

	/// Writes a `[1, batch, path_len]` sequence dump.
	pub fn sequences(&mut self, run: &str, node_name: &str, paths: &[&[u32]]) -> Result<PathBuf> {
		let path_len = paths.first().map(|path| path.len()).unwrap_or(0);

		if paths.iter().any(|path| path.len() != path_len) {
			return Err(Error::Message("Sequence batch paths must share one length.".to_string()));
		}

		let data = paths.iter().flat_map(|path| path.iter()).map(|id| Number::from(*id)).collect();
		let dump = self.raw_dump(node_name, DType::Int32, vec![1, paths.len(), path_len], data);

		self.write_dump(run, dump)
	}

	/// Writes a `[1, batch]` score dump.
	pub fn scores(&mut self, run: &str, node_name: &str, scores: &[f64]) -> Result<PathBuf> {
		let mut data = Vec::with_capacity(scores.len());

		for score in scores {
			let number = Number::from_f64(*score)
				.ok_or_else(|| Error::Message(format!("Score {score} is not representable.")))?;

			data.push(number);
		}

		let dump = self.raw_dump(node_name, DType::Float32, vec![1, scores.len()], data);

		self.write_dump(run, dump)
	}

	pub fn raw_dump(
		&mut self,
		node_name: &str,
		dtype: DType,
		shape: Vec<usize>,
		data: Vec<Number>,
	) -> RawDump {
		let timestamp = self.next_timestamp;

		self.next_timestamp += 1;

		RawDump {
			node_name: node_name.to_string(),
			output_slot: 0,
			debug_op: "DebugIdentity".to_string(),
			timestamp,
			dtype,
			shape,
			data,
		}
	}

	pub fn write_dump(&mut self, run: &str, dump: RawDump) -> Result<PathBuf> {
		let file_name =
			format!("{:06}_{}.json", dump.timestamp, dump.node_name.replace('/', "_"));

		self.write_file(run, &file_name, &serde_json::to_vec(&dump)?)
	}

	/// Writes arbitrary bytes into a run, for corrupt or foreign files.
	pub fn write_file(&self, run: &str, file_name: &str, contents: &[u8]) -> Result<PathBuf> {
		let path = self.add_run(run)?.join(file_name);

		fs::write(&path, contents)?;

		Ok(path)
	}

	pub fn cleanup(mut self) -> Result<()> {
		self.cleanup_inner()
	}

	fn cleanup_inner(&mut self) -> Result<()> {
		if self.cleaned {
			return Ok(());
		}

		self.cleaned = true;

		if self.root.exists() {
			fs::remove_dir_all(&self.root)?;
		}

		Ok(())
	}
}

impl Drop for TraceFixture {
	fn drop(&mut self) {
		if let Err(err) = self.cleanup_inner() {
			eprintln!("Failed to remove trace fixture at {}: {err}.", self.root.display());
		}
	}
}

/// An in-memory word-level tokenizer over [`FIXTURE_WORDS`].
pub fn fixture_tokenizer() -> Tokenizer {
	let vocab = FIXTURE_WORDS
		.iter()
		.enumerate()
		.map(|(id, word)| (word.to_string(), serde_json::Value::from(id as u64)))
		.collect::<serde_json::Map<_, _>>();
	let definition = serde_json::json!({
		"version": "1.0",
		"truncation": null,
		"padding": null,
		"added_tokens": [],
		"normalizer": null,
		"pre_tokenizer": { "type": "Whitespace" },
		"post_processor": null,
		"decoder": null,
		"model": { "type": "WordLevel", "vocab": vocab, "unk_token": "<unk>" },
	});
	let bytes =
		serde_json::to_vec(&definition).expect("Fixture tokenizer definition must serialize.");

	Tokenizer::from_bytes(bytes).expect("Fixture tokenizer definition must load.")
}

pub fn fixture_vocabulary() -> TokenizerVocabulary {
	TokenizerVocabulary::new(fixture_tokenizer())
}
