//! Streaming evidence reader.
//!
//! An evidence file is a block of `@` header lines followed by one
//! tab-delimited record per line:
//!
//! ```text
//! @SQ	SN:chr1	LN:248956422
//! @SM	S1	S2
//! chr1	10001	10100	12	.
//! ```
//!
//! `@SQ` lines declare the source's sequence dictionary and `@SM` its sample
//! names; both are optional. Empty lines and `#` comments are skipped.
//! Files ending in `.gz` are decompressed on the fly.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::marker::PhantomData;
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::config::{IoBuffers, LINE_BUFFER_CAPACITY};
use crate::dictionary::{parse_sq_line, SequenceDictionary};
use crate::error::{EvidenceError, Result};
use crate::evidence::{Evidence, EvidenceKind};
use crate::streaming::parsing::{is_header_line, should_skip_line, split_fields};
use crate::streaming::source::SourceMetadata;

/// Reader over any buffered input, typed by the evidence it yields.
pub type EvidenceSource<E> = EvidenceReader<Box<dyn BufRead>, E>;

/// A streaming evidence reader.
///
/// The header is consumed when the reader is created; the first data line
/// is held back until [`read_record`](Self::read_record) asks for it.
pub struct EvidenceReader<R: BufRead, E> {
    reader: R,
    source_name: String,
    line_number: usize,
    buffer: String,
    pending: bool,
    metadata: SourceMetadata,
    _evidence: PhantomData<fn() -> E>,
}

impl<R: BufRead, E: Evidence> EvidenceReader<R, E> {
    /// Create a reader and consume the header block.
    pub fn new(reader: R, source_name: impl Into<String>) -> Result<Self> {
        let mut reader = Self {
            reader,
            source_name: source_name.into(),
            line_number: 0,
            buffer: String::with_capacity(LINE_BUFFER_CAPACITY),
            pending: false,
            metadata: SourceMetadata::default(),
            _evidence: PhantomData,
        };
        reader.read_header()?;
        Ok(reader)
    }

    fn read_header(&mut self) -> Result<()> {
        let mut dictionary = SequenceDictionary::new();
        let mut samples: Option<Vec<String>> = None;

        while self.next_line()? {
            let line = self.current_line();
            if should_skip_line(line.as_bytes()) {
                continue;
            }
            if !is_header_line(line.as_bytes()) {
                self.pending = true;
                break;
            }

            if let Some(names) = sample_line(line) {
                samples
                    .get_or_insert_with(Vec::new)
                    .extend(names.map(String::from));
                continue;
            }
            match parse_sq_line(line) {
                Ok(Some((name, length))) => dictionary.insert(name, length),
                Ok(None) => {}
                Err(message) => return Err(self.parse_error(message)),
            }
        }

        let dictionary = (!dictionary.is_empty()).then_some(dictionary);
        self.metadata = SourceMetadata::new(self.source_name.clone(), dictionary, samples);
        Ok(())
    }

    /// Read the next record.
    pub fn read_record(&mut self) -> Result<Option<E>> {
        loop {
            if !self.pending && !self.next_line()? {
                return Ok(None);
            }
            self.pending = false;

            let line = self.current_line();
            if should_skip_line(line.as_bytes()) {
                continue;
            }
            if is_header_line(line.as_bytes()) {
                return Err(self.parse_error("Header line after the first record".to_string()));
            }

            let fields = split_fields(line);
            return E::decode(&fields)
                .map(Some)
                .map_err(|message| self.parse_error(message));
        }
    }

    /// Header metadata of this source.
    pub fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }

    /// Separate the header metadata from the record stream.
    pub fn split(mut self) -> (SourceMetadata, EvidenceRecords<R, E>) {
        let metadata = std::mem::take(&mut self.metadata);
        (metadata, EvidenceRecords { reader: self })
    }

    /// Get an iterator over all records.
    pub fn records(self) -> EvidenceRecords<R, E> {
        EvidenceRecords { reader: self }
    }

    fn next_line(&mut self) -> Result<bool> {
        self.buffer.clear();
        let bytes_read = self.reader.read_line(&mut self.buffer)?;
        if bytes_read == 0 {
            return Ok(false);
        }
        self.line_number += 1;
        Ok(true)
    }

    fn current_line(&self) -> &str {
        self.buffer.trim_end_matches(['\n', '\r'])
    }

    fn parse_error(&self, message: String) -> EvidenceError {
        EvidenceError::Parse {
            source_name: self.source_name.clone(),
            line: self.line_number,
            message,
        }
    }
}

/// Sample names of an `@SM` line.
fn sample_line(line: &str) -> Option<impl Iterator<Item = &str>> {
    let rest = line.strip_prefix("@SM")?;
    if !rest.is_empty() && !rest.starts_with('\t') {
        return None;
    }
    Some(rest.split('\t').filter(|name| !name.is_empty()))
}

/// Iterator over evidence records.
pub struct EvidenceRecords<R: BufRead, E> {
    reader: EvidenceReader<R, E>,
}

impl<R: BufRead, E: Evidence> Iterator for EvidenceRecords<R, E> {
    type Item = Result<E>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

/// Open a path for buffered reading. `-` reads stdin; `.gz` is decompressed.
pub fn open_input<P: AsRef<Path>>(path: P, low_memory: bool) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let capacity = IoBuffers::for_mode(low_memory).input;
    if path.as_os_str() == "-" {
        return Ok(Box::new(BufReader::with_capacity(capacity, io::stdin())));
    }

    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::with_capacity(
            capacity,
            MultiGzDecoder::new(file),
        )))
    } else {
        Ok(Box::new(BufReader::with_capacity(capacity, file)))
    }
}

/// Open an evidence file, checking its suffix agrees with the record type.
///
/// Paths without a recognised suffix (including `-`) are accepted as is.
pub fn open_evidence<E: Evidence, P: AsRef<Path>>(
    path: P,
    low_memory: bool,
) -> Result<EvidenceSource<E>> {
    let path = path.as_ref();
    if let Some(kind) = EvidenceKind::from_path(path) {
        if kind != E::KIND {
            return Err(EvidenceError::IncompatibleEvidence {
                path: path.display().to_string(),
                found: kind.name(),
                expected: E::KIND.name(),
            });
        }
    }
    EvidenceReader::new(open_input(path, low_memory)?, path.display().to_string())
}
