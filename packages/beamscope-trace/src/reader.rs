use std::{
	fs,
	path::{Path, PathBuf},
};

use regex::Regex;

use beamscope_domain::{DumpKind, Partition};

use crate::{
	Error, Result,
	record::{DumpRecord, RawDump, RunDumps},
};

const DUMP_EXTENSION: &str = "json";

/// What happens to a run when one of its matching dumps cannot be validated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MalformedPolicy {
	/// Drop every record of the run so a missing record cannot shift alignment.
	#[default]
	SkipRun,
	SkipRecord,
}
impl MalformedPolicy {
	pub fn parse(raw: &str) -> Option<Self> {
		match raw {
			"skip_run" => Some(Self::SkipRun),
			"skip_record" => Some(Self::SkipRecord),
			_ => None,
		}
	}
}

/// Enumerates run directories of a trace and extracts typed sequence and score dumps.
#[derive(Clone, Debug)]
pub struct TraceReader {
	run_prefix: String,
	watch: Regex,
	sequence_marker: String,
	score_marker: String,
	alive_marker: String,
	finished_marker: String,
	policy: MalformedPolicy,
}
impl TraceReader {
	pub fn new(cfg: &beamscope_config::Trace) -> Result<Self> {
		let watch = Regex::new(&cfg.watch_pattern).map_err(|err| Error::InvalidConfig {
			message: format!("trace.watch_pattern does not compile: {err}."),
		})?;
		let policy = MalformedPolicy::parse(&cfg.malformed).ok_or_else(|| Error::InvalidConfig {
			message: format!("Unknown malformed dump policy {:?}.", cfg.malformed),
		})?;

		Ok(Self {
			run_prefix: cfg.run_prefix.clone(),
			watch,
			sequence_marker: cfg.sequence_marker.clone(),
			score_marker: cfg.score_marker.clone(),
			alive_marker: cfg.alive_marker.clone(),
			finished_marker: cfg.finished_marker.clone(),
			policy,
		})
	}

	pub fn with_policy(mut self, policy: MalformedPolicy) -> Self {
		self.policy = policy;

		self
	}

	/// Reads every run under `root` in lexicographic order of the run directory name.
	///
	/// Unreadable runs come back empty rather than failing the whole trace. Only a root that
	/// cannot be listed is an error.
	pub fn read(&self, root: &Path) -> Result<Vec<RunDumps>> {
		let run_dirs = self.run_dirs(root)?;
		let mut runs = Vec::with_capacity(run_dirs.len());

		for (run_index, (name, path)) in (0_u32..).zip(run_dirs) {
			match self.read_run(run_index, &name, &path) {
				Ok(run) => {
					tracing::debug!(
						run = %name,
						sequences = run.sequences.len(),
						scores = run.scores.len(),
						"Read trace run."
					);

					runs.push(run);
				},
				Err(err) => {
					tracing::warn!(run = %name, error = %err, "Skipping unreadable trace run.");

					runs.push(RunDumps::empty(run_index, name));
				},
			}
		}

		Ok(runs)
	}

	fn run_dirs(&self, root: &Path) -> Result<Vec<(String, PathBuf)>> {
		let entries = fs::read_dir(root)
			.map_err(|err| Error::ReadTraceRoot { path: root.to_path_buf(), source: err })?;
		let mut dirs = Vec::new();

		for entry in entries {
			let entry = entry
				.map_err(|err| Error::ReadTraceRoot { path: root.to_path_buf(), source: err })?;
			let Ok(name) = entry.file_name().into_string() else {
				continue;
			};

			if !name.starts_with(&self.run_prefix) {
				continue;
			}
			if !entry.path().is_dir() {
				continue;
			}

			dirs.push((name, entry.path()));
		}

		dirs.sort_by(|a, b| a.0.cmp(&b.0));

		Ok(dirs)
	}

	fn read_run(&self, run_index: u32, name: &str, dir: &Path) -> Result<RunDumps> {
		let mut run = RunDumps::empty(run_index, name.to_string());

		for (path, raw) in self.load_dumps(dir)? {
			if let Err(err) = self.push_record(&mut run, &path, raw) {
				match self.policy {
					MalformedPolicy::SkipRun => return Err(err),
					MalformedPolicy::SkipRecord => {
						tracing::warn!(run = %name, error = %err, "Skipping malformed dump.");
					},
				}
			}
		}

		Ok(run)
	}

	/// Parses every dump file of a run and orders them by emission time, then file name.
	fn load_dumps(&self, dir: &Path) -> Result<Vec<(PathBuf, RawDump)>> {
		let entries = fs::read_dir(dir)
			.map_err(|err| Error::ReadRun { path: dir.to_path_buf(), source: err })?;
		let mut paths = Vec::new();

		for entry in entries {
			let path =
				entry.map_err(|err| Error::ReadRun { path: dir.to_path_buf(), source: err })?.path();

			if path.is_file() && path.extension().is_some_and(|ext| ext == DUMP_EXTENSION) {
				paths.push(path);
			}
		}

		let mut dumps = Vec::with_capacity(paths.len());

		for path in paths {
			match parse_dump(&path) {
				Ok(raw) => dumps.push((path, raw)),
				Err(err) => match self.policy {
					MalformedPolicy::SkipRun => return Err(err),
					MalformedPolicy::SkipRecord => {
						tracing::warn!(error = %err, "Skipping unparseable dump file.");
					},
				},
			}
		}

		dumps.sort_by(|(a_path, a), (b_path, b)| {
			a.timestamp.cmp(&b.timestamp).then_with(|| a_path.cmp(b_path))
		});

		Ok(dumps)
	}

	fn push_record(&self, run: &mut RunDumps, path: &Path, raw: RawDump) -> Result<()> {
		let Some(kind) = self.classify(&raw.node_name) else {
			return Ok(());
		};
		let partition = self.partition(&raw.node_name).ok_or_else(|| Error::MalformedDump {
			path: path.to_path_buf(),
			message: format!("node {:?} names no single partition", raw.node_name),
		})?;
		let node_name = raw.node_name.clone();
		let timestamp = raw.timestamp;

		match kind {
			DumpKind::SequenceBatch => run.sequences.push(DumpRecord {
				run_index: run.run_index,
				partition,
				node_name,
				timestamp,
				payload: raw.into_sequences(path)?,
			}),
			DumpKind::ScoreBatch => run.scores.push(DumpRecord {
				run_index: run.run_index,
				partition,
				node_name,
				timestamp,
				payload: raw.into_scores(path)?,
			}),
		}

		Ok(())
	}

	/// `None` means the node is not a beam-search dump and is ignored.
	pub fn classify(&self, node_name: &str) -> Option<DumpKind> {
		if !self.watch.is_match(node_name) {
			return None;
		}
		if node_name.contains(&self.sequence_marker) {
			return Some(DumpKind::SequenceBatch);
		}
		if node_name.contains(&self.score_marker) {
			return Some(DumpKind::ScoreBatch);
		}

		None
	}

	pub fn partition(&self, node_name: &str) -> Option<Partition> {
		let alive = node_name.contains(&self.alive_marker);
		let finished = node_name.contains(&self.finished_marker);

		match (alive, finished) {
			(true, false) => Some(Partition::Alive),
			(false, true) => Some(Partition::Finished),
			_ => None,
		}
	}
}

fn parse_dump(path: &Path) -> Result<RawDump> {
	let raw =
		fs::read(path).map_err(|err| Error::ReadDump { path: path.to_path_buf(), source: err })?;

	serde_json::from_slice(&raw)
		.map_err(|err| Error::ParseDump { path: path.to_path_buf(), source: err })
}
