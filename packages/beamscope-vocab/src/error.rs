pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Token id {id} is outside the vocabulary of {vocab_size} entries.")]
	UnknownId { id: u32, vocab_size: usize },
	#[error("Tokenizer failure: {message}")]
	Tokenizer { message: String },
	#[error("{message}")]
	InvalidConfig { message: String },
}
