mod decompress;
mod error;
mod pipeline;
mod record;
mod source;

pub use pipeline::{
    FarRecord, IngestOptions, IngestOutcome, IngestStats, Ingestor, DEFAULT_SANITY_CEILING_NM,
};
pub use source::RecordFilePattern;
