use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Child, Command as StdCommand, Stdio};
use std::thread::{self, JoinHandle};

use crate::ingest::error::IngestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Zstd,
}

impl Compression {
    const SUFFIXES: [(&'static str, Compression); 2] =
        [(".gz", Compression::Gzip), (".zst", Compression::Zstd)];

    pub fn from_path(path: &Path) -> Self {
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        Self::SUFFIXES
            .iter()
            .find(|(suffix, _)| name.ends_with(suffix))
            .map(|(_, c)| *c)
            .unwrap_or(Compression::None)
    }

    /// `name` without its compression suffix, if it has one.
    pub fn strip_suffix(name: &str) -> &str {
        Self::SUFFIXES
            .iter()
            .find_map(|(suffix, _)| name.strip_suffix(suffix))
            .unwrap_or(name)
    }

    fn program(&self) -> Option<&'static str> {
        match self {
            Compression::None => None,
            Compression::Gzip => Some("gzip"),
            Compression::Zstd => Some("zstd"),
        }
    }
}

struct Decompressor {
    program: &'static str,
    child: Child,
    /// Collects stderr while stdout is being read, so a chatty child never
    /// blocks on a full pipe.
    stderr: Option<JoinHandle<String>>,
}

/// Line source for one record file. Compressed files are expanded by a child
/// process whose stdout is read as it is produced.
///
/// Call [`RecordReader::finish`] after the last line: a decompressor that
/// exits unsuccessfully turns the whole file into an error. Dropping the
/// reader early kills the child.
pub struct RecordReader {
    file: String,
    lines: Box<dyn BufRead>,
    decompressor: Option<Decompressor>,
}

impl RecordReader {
    pub fn open(path: &Path) -> Result<Self, IngestError> {
        let file = path.display().to_string();

        let Some(program) = Compression::from_path(path).program() else {
            let handle = File::open(path).map_err(|source| IngestError::Read {
                file: file.clone(),
                source,
            })?;
            return Ok(Self {
                file,
                lines: Box::new(BufReader::new(handle)),
                decompressor: None,
            });
        };

        log::debug!("Decompressing {} with {}", file, program);

        let mut command = StdCommand::new(program);
        command.arg("-dc").arg(path);
        Self::spawn(file, program, command)
    }

    fn spawn(
        file: String,
        program: &'static str,
        mut command: StdCommand,
    ) -> Result<Self, IngestError> {
        let mut child = command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| IngestError::DecompressorSpawn {
                program,
                file: file.clone(),
                source,
            })?;

        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(IngestError::DecompressorSpawn {
                program,
                file,
                source: io::Error::other("stdout not captured"),
            });
        };
        let stderr = child.stderr.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut message = String::new();
                let _ = pipe.read_to_string(&mut message);
                message
            })
        });

        Ok(Self {
            file,
            lines: Box::new(BufReader::new(stdout)),
            decompressor: Some(Decompressor {
                program,
                child,
                stderr,
            }),
        })
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// Reads the next line into `buf` without its line terminator. Bytes that
    /// aren't UTF-8 are replaced rather than failing the file.
    /// Returns `false` at end of input.
    pub fn next_line(&mut self, buf: &mut String) -> Result<bool, IngestError> {
        let mut raw = Vec::new();
        let read = self
            .lines
            .read_until(b'\n', &mut raw)
            .map_err(|source| IngestError::Read {
                file: self.file.clone(),
                source,
            })?;
        if read == 0 {
            return Ok(false);
        }

        while matches!(raw.last(), Some(b'\n' | b'\r')) {
            raw.pop();
        }
        buf.clear();
        buf.push_str(&String::from_utf8_lossy(&raw));
        Ok(true)
    }

    /// Waits for the decompressor, if any, and reports its failure.
    pub fn finish(mut self) -> Result<(), IngestError> {
        let Some(mut decompressor) = self.decompressor.take() else {
            return Ok(());
        };

        let status = decompressor
            .child
            .wait()
            .map_err(|source| IngestError::Read {
                file: self.file.clone(),
                source,
            })?;

        if status.success() {
            return Ok(());
        }

        let message = decompressor
            .stderr
            .take()
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();
        Err(IngestError::Decompression {
            program: decompressor.program,
            file: self.file.clone(),
            status: status.to_string(),
            message: message.trim().to_string(),
        })
    }
}

impl Drop for RecordReader {
    fn drop(&mut self) {
        if let Some(mut decompressor) = self.decompressor.take() {
            let _ = decompressor.child.kill();
            let _ = decompressor.child.wait();
        }
    }
}
