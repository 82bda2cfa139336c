use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("input path not found: {0}")]
    PathNotFound(String),
    #[error("failed to read {file}: {source}")]
    Read {
        file: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to start {program} for {file}: {source}")]
    DecompressorSpawn {
        program: &'static str,
        file: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} failed on {file} ({status}): {message}")]
    Decompression {
        program: &'static str,
        file: String,
        status: String,
        message: String,
    },
}
