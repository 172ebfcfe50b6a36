//! One sorted input stream plus the metadata declared by its header.

use rustc_hash::FxHashMap;

use crate::dictionary::SequenceDictionary;
use crate::error::{EvidenceError, Result};
use crate::interval::Feature;

/// Dictionary and sample names declared by one source. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct SourceMetadata {
    name: String,
    dictionary: Option<SequenceDictionary>,
    samples: Option<Vec<String>>,
    sample_index: FxHashMap<String, usize>,
}

impl SourceMetadata {
    pub fn new(
        name: impl Into<String>,
        dictionary: Option<SequenceDictionary>,
        samples: Option<Vec<String>>,
    ) -> Self {
        let sample_index = samples
            .iter()
            .flatten()
            .enumerate()
            .map(|(i, s)| (s.clone(), i))
            .collect();
        Self {
            name: name.into(),
            dictionary,
            samples,
            sample_index,
        }
    }

    /// Source name used in error messages (usually the file path).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dictionary(&self) -> Option<&SequenceDictionary> {
        self.dictionary.as_ref()
    }

    pub fn samples(&self) -> Option<&[String]> {
        self.samples.as_deref()
    }

    /// Column of a sample within this source's records.
    #[inline]
    pub fn sample_index(&self, sample: &str) -> Option<usize> {
        self.sample_index.get(sample).copied()
    }
}

/// Sorted record stream with a single record of look-ahead.
pub struct SourceAdapter<R, I> {
    metadata: SourceMetadata,
    records: I,
    lookahead: Option<R>,
}

impl<R, I> SourceAdapter<R, I>
where
    R: Feature,
    I: Iterator<Item = Result<R>>,
{
    /// Wrap a record stream.
    ///
    /// Fails if the source declares a contig that the reconciled dictionary
    /// lacks, and propagates any error reading the first record.
    pub fn new(
        records: I,
        dictionary: &SequenceDictionary,
        metadata: SourceMetadata,
    ) -> Result<Self> {
        if let Some(own) = metadata.dictionary() {
            if let Some(missing) = own.names().find(|name| !dictionary.has_contig(name)) {
                return Err(EvidenceError::UnknownContig {
                    contig: missing.to_string(),
                    source_name: metadata.name().to_string(),
                });
            }
        }

        let mut records = records;
        let lookahead = records.next().transpose()?;
        Ok(Self {
            metadata,
            records,
            lookahead,
        })
    }

    #[inline]
    pub fn has_next(&self) -> bool {
        self.lookahead.is_some()
    }

    /// The record the next call to `next_record` will return.
    #[inline]
    pub fn peek(&self) -> Option<&R> {
        self.lookahead.as_ref()
    }

    /// Take the next record and pull its successor.
    pub fn next_record(&mut self) -> Result<R> {
        let current = self
            .lookahead
            .take()
            .ok_or_else(|| EvidenceError::ExhaustedSource(self.metadata.name().to_string()))?;
        self.lookahead = self.records.next().transpose()?;
        Ok(current)
    }

    pub fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }
}
