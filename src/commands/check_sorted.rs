//! Check that one evidence file is sorted by its sequence dictionary.

use std::path::Path;

use crate::dictionary::SequenceDictionary;
use crate::error::{EvidenceError, Result};
use crate::evidence::{BafEvidence, DepthEvidence, EvidenceKind, LocusDepth, SplitReadEvidence};
use crate::streaming::validation::verify_sorted;

/// Sort-check command configuration.
#[derive(Debug, Clone, Default)]
pub struct CheckSortedCommand {
    /// Dictionary used instead of the file's own header.
    pub dictionary: Option<SequenceDictionary>,
    pub low_memory: bool,
}

impl CheckSortedCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dictionary(mut self, dictionary: SequenceDictionary) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    pub fn with_low_memory(mut self, low_memory: bool) -> Self {
        self.low_memory = low_memory;
        self
    }

    /// Check `path`, returning the number of records read.
    pub fn run<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let path = path.as_ref();
        let kind = EvidenceKind::from_path(path).ok_or_else(|| {
            EvidenceError::InvalidConfig(format!(
                "Cannot tell the evidence kind of {}",
                path.display()
            ))
        })?;
        let dictionary = self.dictionary.as_ref();

        match kind {
            EvidenceKind::Baf => verify_sorted::<BafEvidence, _>(path, dictionary, self.low_memory),
            EvidenceKind::SplitRead => {
                verify_sorted::<SplitReadEvidence, _>(path, dictionary, self.low_memory)
            }
            EvidenceKind::LocusDepth => {
                verify_sorted::<LocusDepth, _>(path, dictionary, self.low_memory)
            }
            EvidenceKind::Depth => verify_sorted::<DepthEvidence, _>(path, dictionary, self.low_memory),
        }
    }
}
