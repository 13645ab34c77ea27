pub mod reader;
pub mod record;
pub mod scratch;

mod error;

pub use error::Error;
pub use reader::{MalformedPolicy, TraceReader};
pub use record::{DType, DumpRecord, RawDump, RunDumps, ScoreDump, SequenceDump};
pub use scratch::TraceScratch;

pub type Result<T, E = Error> = std::result::Result<T, E>;
