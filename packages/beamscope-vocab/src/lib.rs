mod error;

pub use error::{Error, Result};
pub use tokenizers::Tokenizer;

use std::path::Path;

/// Maps target token ids back to text.
pub trait Vocabulary {
	/// One text piece per id, in order.
	fn decode_list(&self, ids: &[u32]) -> Result<Vec<String>>;

	/// The ids joined into a single decoded string.
	fn decode(&self, ids: &[u32]) -> Result<String>;

	fn piece(&self, id: u32) -> Result<String> {
		let mut pieces = self.decode_list(&[id])?;

		pieces.pop().ok_or(Error::UnknownId { id, vocab_size: 0 })
	}
}

/// A [`Vocabulary`] over a `tokenizers` tokenizer. Ids without a vocabulary entry are errors,
/// never silently dropped.
pub struct TokenizerVocabulary {
	tokenizer: Tokenizer,
}
impl TokenizerVocabulary {
	pub fn new(tokenizer: Tokenizer) -> Self {
		Self { tokenizer }
	}

	pub fn from_file(path: &Path) -> Result<Self> {
		let tokenizer = Tokenizer::from_file(path).map_err(|err| Error::Tokenizer {
			message: format!("Failed to load tokenizer from {}: {err}", path.display()),
		})?;

		Ok(Self::new(tokenizer))
	}

	pub fn from_pretrained(repo: &str) -> Result<Self> {
		let tokenizer = Tokenizer::from_pretrained(repo, None).map_err(|err| Error::Tokenizer {
			message: format!("Failed to fetch tokenizer {repo}: {err}"),
		})?;

		Ok(Self::new(tokenizer))
	}

	pub fn from_config(cfg: &beamscope_config::Vocabulary) -> Result<Self> {
		match (&cfg.tokenizer_file, &cfg.tokenizer_repo) {
			(Some(file), _) => Self::from_file(file),
			(None, Some(repo)) => Self::from_pretrained(repo),
			(None, None) => Err(Error::InvalidConfig {
				message: "No tokenizer source is configured.".to_string(),
			}),
		}
	}

	pub fn vocab_size(&self) -> usize {
		self.tokenizer.get_vocab_size(true)
	}

	fn token(&self, id: u32) -> Result<String> {
		self.tokenizer
			.id_to_token(id)
			.ok_or_else(|| Error::UnknownId { id, vocab_size: self.vocab_size() })
	}
}

impl Vocabulary for TokenizerVocabulary {
	fn decode_list(&self, ids: &[u32]) -> Result<Vec<String>> {
		ids.iter().map(|id| self.token(*id)).collect()
	}

	fn decode(&self, ids: &[u32]) -> Result<String> {
		for id in ids {
			self.token(*id)?;
		}

		self.tokenizer.decode(ids, false).map_err(|err| {
			tracing::error!(error = %err, "Tokenizer failed to decode ids.");

			Error::Tokenizer { message: err.to_string() }
		})
	}
}
