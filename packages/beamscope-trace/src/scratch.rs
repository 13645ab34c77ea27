use std::{
	fs,
	path::{Path, PathBuf},
};

use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, Result};

/// A per-query trace directory owned by the caller.
///
/// The directory is removed by [`TraceScratch::cleanup`], or on drop when cleanup was never
/// called, so every exit path of a query releases its disk usage.
#[derive(Debug)]
pub struct TraceScratch {
	path: PathBuf,
	cleaned: bool,
}
impl TraceScratch {
	pub fn create(base_dir: &Path) -> Result<Self> {
		fs::create_dir_all(base_dir)
			.map_err(|err| Error::Scratch { path: base_dir.to_path_buf(), source: err })?;

		let name = format!(
			"request_{}_{}",
			OffsetDateTime::now_utc().unix_timestamp(),
			Uuid::new_v4().simple()
		);
		let path = base_dir.join(name);

		fs::create_dir(&path).map_err(|err| Error::Scratch { path: path.clone(), source: err })?;

		tracing::debug!(path = %path.display(), "Created trace scratch directory.");

		Ok(Self { path, cleaned: false })
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn cleanup(mut self) -> Result<()> {
		self.cleanup_inner()
	}

	fn cleanup_inner(&mut self) -> Result<()> {
		if self.cleaned {
			return Ok(());
		}

		self.cleaned = true;

		match fs::remove_dir_all(&self.path) {
			Ok(()) => Ok(()),
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(err) => Err(Error::Scratch { path: self.path.clone(), source: err }),
		}
	}
}

impl Drop for TraceScratch {
	fn drop(&mut self) {
		if let Err(err) = self.cleanup_inner() {
			tracing::warn!(error = %err, "Failed to remove trace scratch directory.");
		}
	}
}
