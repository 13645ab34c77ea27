mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Scratch, Service, State, Trace, Vocabulary};

use std::{fs, path::Path};

use regex::Regex;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}

	for (label, value) in [
		("trace.run_prefix", &cfg.trace.run_prefix),
		("trace.watch_pattern", &cfg.trace.watch_pattern),
		("trace.sequence_marker", &cfg.trace.sequence_marker),
		("trace.score_marker", &cfg.trace.score_marker),
		("trace.alive_marker", &cfg.trace.alive_marker),
		("trace.finished_marker", &cfg.trace.finished_marker),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if let Err(err) = Regex::new(&cfg.trace.watch_pattern) {
		return Err(Error::Validation {
			message: format!("trace.watch_pattern must be a valid regular expression: {err}."),
		});
	}
	if cfg.trace.sequence_marker == cfg.trace.score_marker {
		return Err(Error::Validation {
			message: "trace.sequence_marker and trace.score_marker must differ.".to_string(),
		});
	}
	if cfg.trace.alive_marker == cfg.trace.finished_marker {
		return Err(Error::Validation {
			message: "trace.alive_marker and trace.finished_marker must differ.".to_string(),
		});
	}
	if !matches!(cfg.trace.malformed.as_str(), "skip_run" | "skip_record") {
		return Err(Error::Validation {
			message: "trace.malformed must be one of skip_run or skip_record.".to_string(),
		});
	}

	match (&cfg.vocabulary.tokenizer_file, &cfg.vocabulary.tokenizer_repo) {
		(Some(_), Some(_)) => {
			return Err(Error::Validation {
				message: "vocabulary.tokenizer_file and vocabulary.tokenizer_repo are mutually exclusive."
					.to_string(),
			});
		},
		(None, None) => {
			return Err(Error::Validation {
				message: "One of vocabulary.tokenizer_file or vocabulary.tokenizer_repo is required."
					.to_string(),
			});
		},
		_ => {},
	}

	if cfg.scratch.base_dir.as_os_str().is_empty() {
		return Err(Error::Validation {
			message: "scratch.base_dir must be non-empty.".to_string(),
		});
	}
	if cfg.state.top_k == 0 {
		return Err(Error::Validation {
			message: "state.top_k must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.vocabulary.tokenizer_repo.as_deref().map(|repo| repo.trim().is_empty()).unwrap_or(false)
	{
		cfg.vocabulary.tokenizer_repo = None;
	}
	if cfg
		.vocabulary
		.tokenizer_file
		.as_deref()
		.map(|file| file.as_os_str().is_empty())
		.unwrap_or(false)
	{
		cfg.vocabulary.tokenizer_file = None;
	}

	cfg.service.log_level = cfg.service.log_level.trim().to_string();
}
