//! K-way merge of sorted sources in sequence-dictionary order.
//!
//! Holds one look-ahead record per source and a min-heap of their keys, so
//! memory is O(k) for k sources regardless of input size.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::dictionary::SequenceDictionary;
use crate::error::{EvidenceError, Result};
use crate::interval::Feature;
use crate::streaming::source::{SourceAdapter, SourceMetadata};

/// Locus position under a dictionary: (contig ordinal, start, end).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct HeapKey {
    pub contig: usize,
    pub start: u64,
    pub end: u64,
}

impl HeapKey {
    fn of<F: Feature>(
        dictionary: &SequenceDictionary,
        feature: &F,
        source: &SourceMetadata,
    ) -> Result<Self> {
        let contig = dictionary
            .contig_index(feature.contig())
            .ok_or_else(|| EvidenceError::UnknownContig {
                contig: feature.contig().to_string(),
                source_name: source.name().to_string(),
            })?;
        Ok(Self {
            contig,
            start: feature.start(),
            end: feature.end(),
        })
    }
}

/// Wrapper for min-heap (BinaryHeap is max-heap by default).
#[derive(Debug, PartialEq, Eq)]
struct HeapEntry {
    key: HeapKey,
    source: usize,
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap; equal loci pop in source order
        other
            .key
            .cmp(&self.key)
            .then(other.source.cmp(&self.source))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A record together with the index of the source it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord<R> {
    pub record: R,
    pub source: usize,
}

/// Lazy, single-pass merge of every source in dictionary order.
///
/// Each source must be sorted on its own; a source that goes backwards
/// fails with `OutOfOrderInput` as soon as its next record is pulled.
pub struct MergingIterator<'d, R, I> {
    dictionary: &'d SequenceDictionary,
    sources: Vec<SourceAdapter<R, I>>,
    heap: BinaryHeap<HeapEntry>,
    failed: bool,
}

impl<'d, R, I> MergingIterator<'d, R, I>
where
    R: Feature,
    I: Iterator<Item = Result<R>>,
{
    /// Seed the heap with the first record of every non-empty source.
    pub fn new(dictionary: &'d SequenceDictionary, sources: Vec<SourceAdapter<R, I>>) -> Result<Self> {
        let mut heap = BinaryHeap::with_capacity(sources.len());
        for (idx, source) in sources.iter().enumerate() {
            if let Some(record) = source.peek() {
                heap.push(HeapEntry {
                    key: HeapKey::of(dictionary, record, source.metadata())?,
                    source: idx,
                });
            }
        }

        Ok(Self {
            dictionary,
            sources,
            heap,
            failed: false,
        })
    }

    #[inline]
    pub fn has_next(&self) -> bool {
        !self.heap.is_empty()
    }

    /// Pop the smallest record and refill from its source.
    pub fn next_entry(&mut self) -> Result<MergedRecord<R>> {
        let entry = self
            .heap
            .pop()
            .ok_or_else(|| EvidenceError::ExhaustedSource("merged input".to_string()))?;

        let source = &mut self.sources[entry.source];
        let record = source.next_record()?;
        if let Some(next) = source.peek() {
            let key = HeapKey::of(self.dictionary, next, source.metadata())?;
            if key < entry.key {
                return Err(EvidenceError::OutOfOrderInput {
                    source_name: source.metadata().name().to_string(),
                    contig: next.contig().to_string(),
                    position: next.start(),
                });
            }
            self.heap.push(HeapEntry {
                key,
                source: entry.source,
            });
        }

        Ok(MergedRecord {
            record,
            source: entry.source,
        })
    }

    /// Header metadata of one source, by index.
    pub fn metadata(&self, source: usize) -> &SourceMetadata {
        self.sources[source].metadata()
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn dictionary(&self) -> &'d SequenceDictionary {
        self.dictionary
    }
}

impl<R, I> Iterator for MergingIterator<'_, R, I>
where
    R: Feature,
    I: Iterator<Item = Result<R>>,
{
    type Item = Result<MergedRecord<R>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || !self.has_next() {
            return None;
        }
        let result = self.next_entry();
        self.failed = result.is_err();
        Some(result)
    }
}

impl<R, I> std::iter::FusedIterator for MergingIterator<'_, R, I>
where
    R: Feature,
    I: Iterator<Item = Result<R>>,
{
}
