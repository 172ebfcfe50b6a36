//! Sort validation for evidence files.
//!
//! Every merge input must already be sorted by its sequence dictionary:
//! contigs in dictionary order, then start, then end. This module checks
//! that ahead of a merge, or inline while streaming.

use std::path::Path;

use crate::dictionary::SequenceDictionary;
use crate::error::{EvidenceError, Result};
use crate::evidence::Evidence;
use crate::interval::{Feature, Locus};
use crate::reader::open_evidence;

/// Inline dictionary-order validator for use within streaming loops.
///
/// Validates that:
/// 1. Contigs appear in the order given by the dictionary
/// 2. Within a contig, (start, end) is non-decreasing
/// 3. All contigs exist in the dictionary
#[derive(Debug)]
pub struct DictionaryOrderValidator<'a> {
    dictionary: &'a SequenceDictionary,
    source_name: String,
    prev_key: Option<(usize, u64, u64)>,
    prev_locus: Option<Locus>,
    record_count: usize,
}

impl<'a> DictionaryOrderValidator<'a> {
    pub fn new(dictionary: &'a SequenceDictionary, source_name: impl Into<String>) -> Self {
        Self {
            dictionary,
            source_name: source_name.into(),
            prev_key: None,
            prev_locus: None,
            record_count: 0,
        }
    }

    /// Validate that the given record keeps dictionary order.
    #[inline]
    pub fn validate<F: Feature>(&mut self, feature: &F) -> Result<()> {
        self.record_count += 1;

        let contig = self
            .dictionary
            .contig_index(feature.contig())
            .ok_or_else(|| EvidenceError::UnknownContig {
                contig: feature.contig().to_string(),
                source_name: self.source_name.clone(),
            })?;
        let key = (contig, feature.start(), feature.end());

        if let (Some(prev_key), Some(prev_locus)) = (self.prev_key, &self.prev_locus) {
            if key < prev_key {
                return Err(EvidenceError::UnsortedInput {
                    locus: feature.locus().to_string(),
                    previous: prev_locus.to_string(),
                });
            }
            // Same locus as before: keep the stored copy
            if key == prev_key {
                return Ok(());
            }
        }

        self.prev_key = Some(key);
        self.prev_locus = Some(feature.locus());
        Ok(())
    }

    /// Get the number of records validated.
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    pub fn dictionary(&self) -> &SequenceDictionary {
        self.dictionary
    }
}

/// Verify that an evidence file is sorted.
///
/// Uses `dictionary` when given, otherwise the file's own `@SQ` header.
/// Returns the number of records checked.
///
/// # Example
///
/// ```rust,no_run
/// use svmerge::evidence::BafEvidence;
/// use svmerge::streaming::verify_sorted;
///
/// let records = verify_sorted::<BafEvidence, _>("cohort.baf.txt.gz", None, false)
///     .expect("File must be sorted");
/// ```
pub fn verify_sorted<E: Evidence, P: AsRef<Path>>(
    path: P,
    dictionary: Option<&SequenceDictionary>,
    low_memory: bool,
) -> Result<usize> {
    let path = path.as_ref();
    let reader = open_evidence::<E, _>(path, low_memory)?;
    let (metadata, records) = reader.split();
    let dictionary = dictionary
        .or(metadata.dictionary())
        .ok_or(EvidenceError::MissingDictionary)?;

    let mut validator = DictionaryOrderValidator::new(dictionary, path.display().to_string());
    for record in records {
        validator.validate(&record?)?;
    }
    Ok(validator.record_count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::{BafEvidence, DepthEvidence};
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn create_temp_evidence(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const HEADER: &str = "@SQ\tSN:chr2\tLN:1000\n@SQ\tSN:chr1\tLN:1000\n";

    #[test]
    fn test_verify_sorted_valid() {
        let file = create_temp_evidence(
            ".baf.txt",
            &format!("{}chr2\t10\t0.1\tS1\nchr2\t10\t0.2\tS2\nchr1\t5\t0.3\tS1\n", HEADER),
        );
        assert_eq!(verify_sorted::<BafEvidence, _>(file.path(), None, false).unwrap(), 3);
    }

    #[test]
    fn test_verify_sorted_wrong_contig_order() {
        let file = create_temp_evidence(
            ".baf.txt",
            &format!("{}chr1\t5\t0.3\tS1\nchr2\t10\t0.1\tS1\n", HEADER),
        );
        let err = verify_sorted::<BafEvidence, _>(file.path(), None, false).unwrap_err();
        assert!(matches!(err, EvidenceError::UnsortedInput { .. }));
    }

    #[test]
    fn test_verify_sorted_end_breaks_ties() {
        let file = create_temp_evidence(
            ".rd.txt",
            &format!("{}@SM\tS1\nchr2\t1\t200\t5\nchr2\t1\t100\t5\n", HEADER),
        );
        let err = verify_sorted::<DepthEvidence, _>(file.path(), None, false).unwrap_err();
        assert!(err.to_string().contains("chr2:1-100 after chr2:1-200"));
    }

    #[test]
    fn test_verify_sorted_needs_dictionary() {
        let file = create_temp_evidence(".baf.txt", "chr1\t5\t0.3\tS1\n");
        let err = verify_sorted::<BafEvidence, _>(file.path(), None, false).unwrap_err();
        assert!(matches!(err, EvidenceError::MissingDictionary));

        let dict = SequenceDictionary::from_pairs([("chr1", 100u64)]);
        assert!(verify_sorted::<BafEvidence, _>(file.path(), Some(&dict), false).is_ok());
    }

    #[test]
    fn test_validator_unknown_contig() {
        let dict = SequenceDictionary::from_pairs([("chr1", 100u64)]);
        let mut validator = DictionaryOrderValidator::new(&dict, "inline");
        validator.validate(&Locus::new("chr1", 1, 1)).unwrap();
        let err = validator.validate(&Locus::new("chrM", 1, 1)).unwrap_err();
        assert!(err.to_string().contains("chrM"));
        assert_eq!(validator.record_count(), 2);
    }
}
