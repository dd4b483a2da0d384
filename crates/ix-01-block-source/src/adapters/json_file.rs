use crate::ports::{BlockSource, SourceError};
use shared_types::Block;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Block source reading one JSON block per line.
///
/// # Record Format
///
/// ```json
/// {"hash":"<64 hex>","height":1,"confirmations":6,"transactions":[
///   {"id":"<64 hex>",
///    "inputs":[{"source_address":"A","amount":5,"spent_transaction_id":"<64 hex>"}],
///    "outputs":[{"address":"B","amount":5}]}]}
/// ```
///
/// Blank lines are ignored. A line that is not UTF-8 or does not parse is
/// logged and skipped, unless the source is strict, in which case it is
/// returned as `SourceError::Malformed`.
pub struct JsonFileBlockSource {
    path: PathBuf,
    reader: BufReader<File>,
    buf: Vec<u8>,
    line_no: usize,
    skipped: usize,
    strict: bool,
}

impl JsonFileBlockSource {
    /// Open a block file for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| SourceError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        debug!(path = %path.display(), "Opened block file");

        Ok(Self {
            path,
            reader: BufReader::new(file),
            buf: Vec::new(),
            line_no: 0,
            skipped: 0,
            strict: false,
        })
    }

    /// Fail on malformed records instead of skipping them.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Records skipped because they did not parse.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn malformed(&mut self, reason: String) -> Result<(), SourceError> {
        if self.strict {
            return Err(SourceError::Malformed {
                line: self.line_no,
                reason,
            });
        }
        self.skipped += 1;
        warn!(
            path = %self.path.display(),
            line = self.line_no,
            error = %reason,
            "Skipping malformed block record"
        );
        Ok(())
    }
}

impl BlockSource for JsonFileBlockSource {
    fn next_block(&mut self) -> Result<Option<Block>, SourceError> {
        loop {
            self.buf.clear();
            let read = self
                .reader
                .read_until(b'\n', &mut self.buf)
                .map_err(|e| SourceError::Io {
                    path: self.path.display().to_string(),
                    message: e.to_string(),
                })?;
            if read == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let parsed = match std::str::from_utf8(&self.buf) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => serde_json::from_str::<Block>(line.trim()).map_err(|e| e.to_string()),
                Err(e) => Err(format!("invalid UTF-8: {e}")),
            };

            match parsed {
                Ok(block) => return Ok(Some(block)),
                Err(reason) => self.malformed(reason)?,
            }
        }
    }
}
