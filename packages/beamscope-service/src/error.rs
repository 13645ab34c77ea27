use beamscope_domain::Partition;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(
		"Score dump {score_index} of run {run_index} has no queued {partition} sequence batch to align with."
	)]
	AlignmentUnderflow { run_index: u32, partition: Partition, score_index: usize },
	#[error(
		"Run {run_index} aligned a {partition} batch of {paths} paths with {scores} scores."
	)]
	BatchSizeMismatch { run_index: u32, partition: Partition, paths: usize, scores: usize },
	#[error("Graph has {found} scored edges, {wanted} are required.")]
	InsufficientScores { wanted: usize, found: usize },
	#[error("Decoder error: {message}")]
	Decoder { message: String },
	#[error(transparent)]
	Vocabulary(#[from] beamscope_vocab::Error),
	#[error(transparent)]
	Trace(#[from] beamscope_trace::Error),
}
impl From<color_eyre::Report> for Error {
	fn from(err: color_eyre::Report) -> Self {
		Self::Decoder { message: err.to_string() }
	}
}
