//! Restartable row sources over delimited text
//!
//! Type inference and loading each read the input from the beginning, so a
//! `Source` hands out a fresh reader on every `open`. Files are reopened;
//! anything else (stdin, in-memory test data) is buffered once.

pub mod dialect;
pub mod reader;

pub use dialect::{parse_delimiter, sniff_delimiter};
pub use reader::{Row, RowReader};

use crate::error::{ConvertError, Result};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Compression applied to the raw input bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
}

impl Compression {
    fn from_magic(prefix: &[u8]) -> Self {
        if prefix.starts_with(&GZIP_MAGIC) {
            Compression::Gzip
        } else {
            Compression::None
        }
    }
}

/// Delimited input that can be read from the start any number of times
#[derive(Debug, Clone)]
pub enum Source {
    Path(PathBuf),
    Memory { name: String, data: Vec<u8> },
}

impl Source {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Source::Path(path.into())
    }

    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Source::Memory {
            name: String::from("<memory>"),
            data: data.into(),
        }
    }

    /// Buffer a non-seekable reader so it can be replayed
    pub fn from_reader(name: impl Into<String>, mut reader: impl Read) -> Result<Self> {
        let name = name.into();
        let mut data = Vec::new();
        reader
            .read_to_end(&mut data)
            .map_err(|source| ConvertError::Read {
                resource: name.clone(),
                source,
            })?;
        Ok(Source::Memory { name, data })
    }

    /// Human-readable name used in errors and logs
    pub fn name(&self) -> String {
        match self {
            Source::Path(path) => path.display().to_string(),
            Source::Memory { name, .. } => name.clone(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Source::Path(path) => Some(path),
            Source::Memory { .. } => None,
        }
    }

    /// Open a decompressed reader positioned at the first byte
    pub fn open(&self) -> Result<Box<dyn Read>> {
        match self {
            Source::Path(path) => {
                let mut file = File::open(path).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        ConvertError::FileNotFound { path: path.clone() }
                    } else {
                        self.read_error(e)
                    }
                })?;

                let compression = if has_gzip_extension(path) {
                    Compression::Gzip
                } else {
                    let mut prefix = [0u8; 2];
                    let n = read_prefix(&mut file, &mut prefix).map_err(|e| self.read_error(e))?;
                    file.seek(SeekFrom::Start(0))
                        .map_err(|e| self.read_error(e))?;
                    Compression::from_magic(&prefix[..n])
                };

                tracing::debug!(source = %path.display(), ?compression, "opened input");
                Ok(wrap(BufReader::new(file), compression))
            }
            Source::Memory { data, .. } => {
                let compression = Compression::from_magic(data);
                Ok(wrap(Cursor::new(data.clone()), compression))
            }
        }
    }

    /// First physical line of the decompressed input, without its terminator.
    ///
    /// Returns `None` for empty input.
    pub fn first_line(&self) -> Result<Option<String>> {
        let mut reader = BufReader::new(self.open()?);
        let mut bytes = Vec::new();
        let n = reader
            .read_until(b'\n', &mut bytes)
            .map_err(|e| self.read_error(e))?;
        if n == 0 {
            return Ok(None);
        }

        // Same lossy decoding as the row reader, so a stray byte never fails sniffing.
        let line = String::from_utf8_lossy(&bytes);
        let line = line.trim_end_matches(['\r', '\n']);
        let line = line.strip_prefix('\u{feff}').unwrap_or(line);
        Ok(Some(line.to_string()))
    }

    /// Sniff the delimiter from the first line
    pub fn detect_delimiter(&self) -> Result<u8> {
        match self.first_line()? {
            Some(line) => Ok(sniff_delimiter(&line)),
            None => Err(ConvertError::EmptyInput {
                resource: self.name(),
            }),
        }
    }

    /// Start a fresh pass over the rows
    pub fn rows(&self, delimiter: u8) -> Result<RowReader<Box<dyn Read>>> {
        Ok(RowReader::new(self.open()?, delimiter, self.name()))
    }

    /// Start a fresh pass and resolve the header row.
    ///
    /// With `headers` supplied, every record of the source is data. Otherwise
    /// the first record is consumed as the header.
    pub fn open_table(
        &self,
        delimiter: u8,
        headers: Option<&[String]>,
    ) -> Result<(Vec<String>, RowReader<Box<dyn Read>>)> {
        let mut rows = self.rows(delimiter)?;
        let headers = match headers {
            Some(headers) => headers.iter().map(|h| h.trim().to_string()).collect(),
            None => rows.headers()?,
        };
        Ok((headers, rows))
    }

    fn read_error(&self, source: std::io::Error) -> ConvertError {
        ConvertError::Read {
            resource: self.name(),
            source,
        }
    }
}

/// Read just the header record of a separate header source
pub fn read_header_line(source: &Source, delimiter: Option<u8>) -> Result<Vec<String>> {
    let delimiter = match delimiter {
        Some(d) => d,
        None => source.detect_delimiter()?,
    };
    source.rows(delimiter)?.headers()
}

fn wrap<R: Read + 'static>(reader: R, compression: Compression) -> Box<dyn Read> {
    match compression {
        Compression::None => Box::new(reader),
        Compression::Gzip => Box::new(MultiGzDecoder::new(reader)),
    }
}

fn has_gzip_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

fn read_prefix(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
