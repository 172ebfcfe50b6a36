//! Sequence-dictionary reconciliation across sources.
//!
//! Sources may cover only part of the genome (e.g. chr20 and chr21) while
//! another input defines the full contig set. Any dictionary may be used as
//! the merge order as long as every smaller dictionary's contig order is an
//! order-preserving subsequence of it.

use tracing::{debug, info, warn};

use crate::config::is_strict_lengths;
use crate::dictionary::SequenceDictionary;
use crate::error::{EvidenceError, Result};
use crate::samples::{SampleAccumulator, SampleFilter};
use crate::streaming::source::SourceMetadata;

/// Pick the dictionary that is consistent with both candidates.
///
/// The dictionary with fewer contigs must list its contigs in the same
/// relative order as the larger one; gaps are allowed. On equal size the
/// current dictionary is kept.
pub fn best_dictionary<'a>(
    current: Option<&'a SequenceDictionary>,
    new: Option<&'a SequenceDictionary>,
) -> Result<Option<&'a SequenceDictionary>> {
    let (current, new) = match (current, new) {
        (None, new) => return Ok(new),
        (current, None) => return Ok(current),
        (Some(current), Some(new)) => (current, new),
    };

    let (small, large) = if new.len() <= current.len() {
        (new, current)
    } else {
        (current, new)
    };

    let mut last_idx: Option<usize> = None;
    for contig in small.contigs() {
        let idx = large
            .contig_index(&contig.name)
            .ok_or_else(|| EvidenceError::Reconciliation {
                contig: contig.name.clone(),
                reason: "not found in the larger dictionary".to_string(),
            })?;
        if last_idx.is_some_and(|last| idx <= last) {
            return Err(EvidenceError::Reconciliation {
                contig: contig.name.clone(),
                reason: "not in same order as in larger dictionary".to_string(),
            });
        }

        let large_length = large.contigs()[idx].length;
        if large_length != contig.length {
            if is_strict_lengths() {
                return Err(EvidenceError::Reconciliation {
                    contig: contig.name.clone(),
                    reason: format!(
                        "has length {} but {} in larger dictionary",
                        contig.length, large_length
                    ),
                });
            }
            warn!(
                contig = %contig.name,
                small = contig.length,
                large = large_length,
                "Contig length differs between dictionaries"
            );
        }
        last_idx = Some(idx);
    }

    Ok(Some(large))
}

/// Fold every candidate through [`best_dictionary`].
///
/// Absent candidates are skipped. Fails with `MissingDictionary` if no
/// candidate has a dictionary.
pub fn reconcile<'a, I>(candidates: I) -> Result<&'a SequenceDictionary>
where
    I: IntoIterator<Item = Option<&'a SequenceDictionary>>,
{
    let mut best = None;
    for candidate in candidates {
        best = best_dictionary(best, candidate)?;
    }
    best.ok_or(EvidenceError::MissingDictionary)
}

/// Everything the merge phase needs, fixed before the first record is read.
#[derive(Debug, Clone)]
pub struct MergePlan {
    pub dictionary: SequenceDictionary,
    /// `None` when no source names samples and none were requested.
    pub samples: Option<SampleFilter>,
}

/// Reconcile all source dictionaries (after an optional explicit one) and
/// collect the samples to extract.
pub fn plan_merge(
    explicit_dictionary: Option<&SequenceDictionary>,
    sources: &[SourceMetadata],
    explicit_samples: &[String],
) -> Result<MergePlan> {
    let candidates =
        std::iter::once(explicit_dictionary).chain(sources.iter().map(|s| s.dictionary()));
    let dictionary = reconcile(candidates)?.clone();

    let mut accumulator = SampleAccumulator::new();
    for source in sources {
        debug!(
            source = source.name(),
            contigs = source.dictionary().map_or(0, |d| d.len()),
            samples = source.samples().map_or(0, |s| s.len()),
            "Read source header"
        );
        accumulator.add_source(source);
    }
    let samples = accumulator.freeze(explicit_samples);

    info!(
        sources = sources.len(),
        contigs = dictionary.len(),
        samples = samples.as_ref().map_or(0, |s| s.len()),
        "Merge plan ready"
    );

    Ok(MergePlan {
        dictionary,
        samples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn dict(names: &[&str]) -> SequenceDictionary {
        SequenceDictionary::from_pairs(names.iter().map(|n| (*n, 1000u64)))
    }

    #[test]
    #[serial]
    fn test_subset_reconciles_to_larger() {
        let small = dict(&["chr20", "chr21"]);
        let large = dict(&["chr9", "chr10", "chr20", "chr21"]);

        let best = reconcile([Some(&small), Some(&large)]).unwrap();
        assert_eq!(best, &large);

        // Order of candidates does not matter
        let best = reconcile([Some(&large), Some(&small)]).unwrap();
        assert_eq!(best, &large);
    }

    #[test]
    #[serial]
    fn test_reversed_subset_fails() {
        let reversed = dict(&["chr21", "chr20"]);
        let large = dict(&["chr9", "chr10", "chr20", "chr21"]);

        let err = reconcile([Some(&large), Some(&reversed)]).unwrap_err();
        assert!(err.to_string().contains("not in same order"));
    }

    #[test]
    #[serial]
    fn test_unknown_contig_fails() {
        let small = dict(&["chr20", "22"]);
        let large = dict(&["chr9", "chr10", "chr20", "chr21"]);

        let err = reconcile([Some(&large), Some(&small)]).unwrap_err();
        assert!(err.to_string().contains("Contig 22 not found"));
    }

    #[test]
    #[serial]
    fn test_absent_candidates_are_skipped() {
        let only = dict(&["chr1"]);
        let best = reconcile([None, Some(&only), None]).unwrap();
        assert_eq!(best, &only);
    }

    #[test]
    #[serial]
    fn test_no_dictionary_fails() {
        let err = reconcile([None, None]).unwrap_err();
        assert!(matches!(err, EvidenceError::MissingDictionary));

        let err = reconcile(std::iter::empty()).unwrap_err();
        assert!(matches!(err, EvidenceError::MissingDictionary));
    }

    #[test]
    #[serial]
    fn test_equal_size_keeps_current() {
        let a = dict(&["chr1", "chr2"]);
        let b = dict(&["chr1", "chr2"]);
        let best = best_dictionary(Some(&a), Some(&b)).unwrap().unwrap();
        assert!(std::ptr::eq(best, &a));

        // Same size, different contigs: not a subsequence
        let c = dict(&["chr1", "chr3"]);
        assert!(best_dictionary(Some(&a), Some(&c)).is_err());
    }

    #[test]
    #[serial]
    fn test_length_mismatch_warns_unless_strict() {
        let small = SequenceDictionary::from_pairs([("chr1", 999u64)]);
        let large = dict(&["chr1", "chr2"]);

        assert!(reconcile([Some(&large), Some(&small)]).is_ok());

        crate::config::set_strict_lengths(true);
        let result = reconcile([Some(&large), Some(&small)]);
        crate::config::set_strict_lengths(false);

        let err = result.unwrap_err();
        assert!(err.to_string().contains("has length 999"));
    }

    #[test]
    #[serial]
    fn test_plan_merge_collects_samples() {
        let sources = vec![
            SourceMetadata::new(
                "a",
                Some(dict(&["chr20", "chr21"])),
                Some(vec!["S2".to_string()]),
            ),
            SourceMetadata::new("b", None, Some(vec!["S1".to_string()])),
        ];
        let reference = dict(&["chr9", "chr20", "chr21"]);

        let plan = plan_merge(Some(&reference), &sources, &[]).unwrap();
        assert_eq!(plan.dictionary, reference);
        assert_eq!(
            plan.samples.unwrap().names(),
            &["S1".to_string(), "S2".to_string()]
        );
    }
}
