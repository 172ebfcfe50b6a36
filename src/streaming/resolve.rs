//! Same-locus resolution between the merge and the output sink.
//!
//! The merge only orders by locus, so records sharing a locus arrive in
//! source order. The resolver buffers each same-locus group and applies the
//! record type's [`Resolution`] before forwarding to the sink.

use std::cmp::Ordering;

use crate::dictionary::SequenceDictionary;
use crate::error::{EvidenceError, Result};
use crate::evidence::{Evidence, Resolution};
use crate::interval::{Feature, Locus};
use crate::streaming::sink::FeatureSink;

/// Lifecycle of a resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    Empty,
    Accumulating,
    Closed,
}

/// Counters kept while resolving.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResolveStats {
    pub records_in: u64,
    pub records_out: u64,
    pub groups: u64,
}

/// Buffers same-locus groups and resolves them into a downstream sink.
pub struct SameLocusResolver<'d, R, S> {
    dictionary: &'d SequenceDictionary,
    resolution: Resolution<R>,
    sink: S,
    locus: Option<Locus>,
    group: Vec<R>,
    closed: bool,
    stats: ResolveStats,
}

impl<'d, R, S> SameLocusResolver<'d, R, S>
where
    R: Evidence,
    S: FeatureSink<R>,
{
    /// Resolver using the record type's own strategy.
    pub fn new(dictionary: &'d SequenceDictionary, sink: S) -> Self {
        Self::with_resolution(dictionary, R::resolution(), sink)
    }

    pub fn with_resolution(
        dictionary: &'d SequenceDictionary,
        resolution: Resolution<R>,
        sink: S,
    ) -> Self {
        Self {
            dictionary,
            resolution,
            sink,
            locus: None,
            group: Vec::new(),
            closed: false,
            stats: ResolveStats::default(),
        }
    }

    pub fn state(&self) -> ResolverState {
        if self.closed {
            ResolverState::Closed
        } else if self.group.is_empty() {
            ResolverState::Empty
        } else {
            ResolverState::Accumulating
        }
    }

    pub fn stats(&self) -> ResolveStats {
        self.stats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Resolve whatever is buffered and start over with an empty group.
    fn flush(&mut self) -> Result<()> {
        if self.group.is_empty() {
            return Ok(());
        }
        let mut group = std::mem::take(&mut self.group);
        self.stats.groups += 1;

        match self.resolution {
            Resolution::RejectDuplicates { order, describe } => {
                group.sort_by(order);
                if let Some(pair) = group
                    .windows(2)
                    .find(|pair| order(&pair[0], &pair[1]) == Ordering::Equal)
                {
                    return Err(EvidenceError::DuplicateLocusRecord {
                        kind: R::KIND.name(),
                        detail: describe(&pair[0]),
                    });
                }
                for record in group {
                    self.sink.write(record)?;
                    self.stats.records_out += 1;
                }
            }
            Resolution::UnionSlots { slots } => {
                if let Some(merged) = union_slots(group, slots)? {
                    self.sink.write(merged)?;
                    self.stats.records_out += 1;
                }
            }
        }
        Ok(())
    }
}

impl<R, S> FeatureSink<R> for SameLocusResolver<'_, R, S>
where
    R: Evidence,
    S: FeatureSink<R>,
{
    fn write(&mut self, record: R) -> Result<()> {
        if self.closed {
            return Err(EvidenceError::SinkClosed);
        }
        self.stats.records_in += 1;

        if let Some(current) = &self.locus {
            if current.matches(&record) {
                self.group.push(record);
                return Ok(());
            }
            let next = record.locus();
            if self.dictionary.compare_loci(&next, current)? == Ordering::Less {
                return Err(EvidenceError::UnsortedInput {
                    locus: next.to_string(),
                    previous: current.to_string(),
                });
            }
        }

        self.flush()?;
        self.locus = Some(record.locus());
        self.group.push(record);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(EvidenceError::SinkClosed);
        }
        self.flush()?;
        self.closed = true;
        self.sink.close()
    }
}

/// Merge a group slot by slot. `None` for an empty group.
///
/// Every record must carry the same number of slots, and at most one record
/// may supply a value for any slot.
pub fn union_slots<R: Feature>(
    group: Vec<R>,
    slots: fn(&mut R) -> &mut [Option<u32>],
) -> Result<Option<R>> {
    let mut records = group.into_iter();
    let Some(mut merged) = records.next() else {
        return Ok(None);
    };
    let locus = merged.locus();

    for mut other in records {
        let target = slots(&mut merged);
        let incoming = slots(&mut other);
        if target.len() != incoming.len() {
            return Err(EvidenceError::SchemaMismatch {
                locus: locus.to_string(),
                expected: target.len(),
                found: incoming.len(),
            });
        }

        for (slot, (value, new)) in target.iter_mut().zip(incoming.iter()).enumerate() {
            if let Some(new) = *new {
                if value.is_some() {
                    return Err(EvidenceError::ConflictingSlotValue {
                        slot: slot + 1,
                        locus: locus.to_string(),
                    });
                }
                *value = Some(new);
            }
        }
    }

    Ok(Some(merged))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::{BafEvidence, DepthEvidence, SplitReadEvidence};
    use crate::interval::Strand;
    use rand::rngs::SmallRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn dict() -> SequenceDictionary {
        SequenceDictionary::from_pairs([("chr1", 1_000_000u64), ("chr2", 1_000_000)])
    }

    fn resolve<R: Evidence>(records: Vec<R>) -> Result<Vec<R>> {
        let dict = dict();
        let mut resolver = SameLocusResolver::new(&dict, Vec::new());
        for record in records {
            resolver.write(record)?;
        }
        resolver.close()?;
        Ok(resolver.into_sink())
    }

    #[test]
    fn test_sample_order_restored() {
        let out = resolve(vec![
            BafEvidence::new("S2", "chr1", 100, 0.7),
            BafEvidence::new("S1", "chr1", 100, 0.3),
        ])
        .unwrap();
        assert_eq!(
            out,
            vec![
                BafEvidence::new("S1", "chr1", 100, 0.3),
                BafEvidence::new("S2", "chr1", 100, 0.7),
            ]
        );
    }

    #[test]
    fn test_duplicate_sample_rejected() {
        let err = resolve(vec![
            BafEvidence::new("S1", "chr1", 100, 0.3),
            BafEvidence::new("S1", "chr1", 100, 0.4),
        ])
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Two instances of BafEvidence for sample S1 at chr1:100"
        );
    }

    #[test]
    fn test_strand_distinguishes_split_reads() {
        let out = resolve(vec![
            SplitReadEvidence::new("S1", "chr1", 100, 4, Strand::Plus),
            SplitReadEvidence::new("S1", "chr1", 100, 2, Strand::Minus),
        ])
        .unwrap();
        assert_eq!(out[0].strand, Strand::Minus);
        assert_eq!(out[1].strand, Strand::Plus);

        let err = resolve(vec![
            SplitReadEvidence::new("S1", "chr1", 100, 4, Strand::Plus),
            SplitReadEvidence::new("S1", "chr1", 100, 2, Strand::Plus),
        ])
        .unwrap_err();
        assert!(err.to_string().ends_with("chr1:100 right"));
    }

    #[test]
    fn test_distinct_keys_pass_through_reordered() {
        let mut rng = SmallRng::seed_from_u64(7);
        let expected: Vec<_> = (0..20)
            .map(|i| BafEvidence::new(format!("S{:02}", i), "chr1", 500, i as f64 / 20.0))
            .collect();

        for _ in 0..10 {
            let mut shuffled = expected.clone();
            shuffled.shuffle(&mut rng);
            assert_eq!(resolve(shuffled).unwrap(), expected);
        }
    }

    #[test]
    fn test_union_merges_disjoint_slots() {
        let out = resolve(vec![
            DepthEvidence::new("chr1", 100, 200, vec![Some(5), None]),
            DepthEvidence::new("chr1", 100, 200, vec![None, Some(9)]),
        ])
        .unwrap();
        assert_eq!(
            out,
            vec![DepthEvidence::new("chr1", 100, 200, vec![Some(5), Some(9)])]
        );
    }

    #[test]
    fn test_union_is_order_independent() {
        let parts = vec![
            DepthEvidence::new("chr1", 1, 100, vec![Some(1), None, None, Some(0)]),
            DepthEvidence::new("chr1", 1, 100, vec![None, Some(2), None, None]),
            DepthEvidence::new("chr1", 1, 100, vec![None, None, Some(3), None]),
        ];
        let expected = vec![DepthEvidence::new(
            "chr1",
            1,
            100,
            vec![Some(1), Some(2), Some(3), Some(0)],
        )];

        let orders = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
        for order in orders {
            let group = order.iter().map(|&i| parts[i].clone()).collect();
            assert_eq!(resolve(group).unwrap(), expected);
        }
    }

    #[test]
    fn test_union_conflict_in_either_order() {
        let a = DepthEvidence::new("chr1", 100, 200, vec![Some(5), None]);
        let b = DepthEvidence::new("chr1", 100, 200, vec![Some(0), Some(9)]);

        for group in [vec![a.clone(), b.clone()], vec![b, a]] {
            let err = resolve(group).unwrap_err();
            assert!(matches!(
                err,
                EvidenceError::ConflictingSlotValue { slot: 1, ref locus } if locus == "chr1:100-200"
            ));
            assert_eq!(
                err.to_string(),
                "Multiple sources for count of sample#1 at chr1:100-200"
            );
        }
    }

    #[test]
    fn test_union_conflict_names_later_sample() {
        let err = resolve(vec![
            DepthEvidence::new("chr1", 100, 200, vec![None, None, Some(4)]),
            DepthEvidence::new("chr1", 100, 200, vec![Some(1), None, Some(4)]),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("sample#3 "));
    }

    #[test]
    fn test_union_width_mismatch() {
        let err = resolve(vec![
            DepthEvidence::new("chr1", 100, 200, vec![Some(5), None]),
            DepthEvidence::new("chr1", 100, 200, vec![None]),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            EvidenceError::SchemaMismatch {
                expected: 2,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_groups_flush_on_locus_change() {
        let out = resolve(vec![
            DepthEvidence::new("chr1", 100, 200, vec![Some(1), None]),
            DepthEvidence::new("chr1", 100, 200, vec![None, Some(2)]),
            DepthEvidence::new("chr1", 100, 300, vec![Some(3), Some(4)]),
            DepthEvidence::new("chr2", 1, 10, vec![None, None]),
        ])
        .unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].counts, vec![Some(1), Some(2)]);
        assert_eq!(out[1].end, 300);
        assert_eq!(out[2].contig, "chr2");
    }

    #[test]
    fn test_unsorted_input_rejected() {
        let err = resolve(vec![
            BafEvidence::new("S1", "chr2", 100, 0.3),
            BafEvidence::new("S1", "chr1", 500, 0.3),
        ])
        .unwrap_err();
        assert!(matches!(err, EvidenceError::UnsortedInput { .. }));
    }

    #[test]
    fn test_state_machine() {
        let dict = dict();
        let mut resolver: SameLocusResolver<BafEvidence, Vec<BafEvidence>> =
            SameLocusResolver::new(&dict, Vec::new());
        assert_eq!(resolver.state(), ResolverState::Empty);

        resolver
            .write(BafEvidence::new("S1", "chr1", 100, 0.3))
            .unwrap();
        assert_eq!(resolver.state(), ResolverState::Accumulating);
        // Nothing is forwarded until the group is complete
        assert!(resolver.sink().is_empty());

        resolver.close().unwrap();
        assert_eq!(resolver.state(), ResolverState::Closed);
        assert_eq!(resolver.sink().len(), 1);
        assert_eq!(
            resolver.stats(),
            ResolveStats {
                records_in: 1,
                records_out: 1,
                groups: 1
            }
        );

        assert!(matches!(
            resolver.write(BafEvidence::new("S2", "chr1", 200, 0.3)),
            Err(EvidenceError::SinkClosed)
        ));
        assert!(matches!(resolver.close(), Err(EvidenceError::SinkClosed)));
    }

    #[test]
    fn test_empty_close_emits_nothing() {
        let out: Vec<DepthEvidence> = resolve(Vec::new()).unwrap();
        assert!(out.is_empty());
    }
}
