use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to list trace directory at {path:?}.")]
	ReadTraceRoot { path: PathBuf, source: std::io::Error },
	#[error("Failed to list run directory at {path:?}.")]
	ReadRun { path: PathBuf, source: std::io::Error },
	#[error("Failed to read dump file at {path:?}.")]
	ReadDump { path: PathBuf, source: std::io::Error },
	#[error("Failed to parse dump file at {path:?}.")]
	ParseDump { path: PathBuf, source: serde_json::Error },
	#[error("Malformed dump at {path:?}: {message}")]
	MalformedDump { path: PathBuf, message: String },
	#[error("Invalid trace configuration: {message}")]
	InvalidConfig { message: String },
	#[error("Scratch directory failure at {path:?}.")]
	Scratch { path: PathBuf, source: std::io::Error },
}
