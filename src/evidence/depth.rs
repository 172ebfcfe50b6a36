//! Binned read-depth evidence: one count per sample over an interval.
//!
//! A count of `None` means the source supplied no data for that sample,
//! which is what lets sources covering disjoint samples be merged.

use std::io::Write;

use crate::error::{EvidenceError, Result};
use crate::evidence::{require_fields, Evidence, EvidenceKind, Resolution};
use crate::interval::Feature;
use crate::samples::SampleFilter;
use crate::streaming::output::EvidenceWriter;
use crate::streaming::parsing::{parse_optional_count, parse_position};
use crate::streaming::source::SourceMetadata;

/// Text layout: contig, start, end, then one count per header sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthEvidence {
    pub contig: String,
    pub start: u64,
    pub end: u64,
    pub counts: Vec<Option<u32>>,
}

impl DepthEvidence {
    pub fn new(contig: impl Into<String>, start: u64, end: u64, counts: Vec<Option<u32>>) -> Self {
        Self {
            contig: contig.into(),
            start,
            end,
            counts,
        }
    }
}

impl Feature for DepthEvidence {
    fn contig(&self) -> &str {
        &self.contig
    }

    fn start(&self) -> u64 {
        self.start
    }

    fn end(&self) -> u64 {
        self.end
    }
}

fn counts_mut(e: &mut DepthEvidence) -> &mut [Option<u32>] {
    &mut e.counts
}

impl Evidence for DepthEvidence {
    const KIND: EvidenceKind = EvidenceKind::Depth;

    fn resolution() -> Resolution<Self> {
        Resolution::UnionSlots { slots: counts_mut }
    }

    /// Reorder counts into the filter's sample order. Samples the source
    /// does not carry become missing.
    fn extract_samples(self, samples: &SampleFilter, source: &SourceMetadata) -> Result<Option<Self>> {
        let source_samples = source
            .samples()
            .ok_or_else(|| EvidenceError::MissingSampleNames {
                kind: Self::KIND.name(),
                source_name: source.name().to_string(),
            })?;
        if source_samples.len() != self.counts.len() {
            return Err(EvidenceError::SchemaMismatch {
                locus: self.locus().to_string(),
                expected: source_samples.len(),
                found: self.counts.len(),
            });
        }

        let counts = samples
            .names()
            .iter()
            .map(|name| source.sample_index(name).and_then(|idx| self.counts[idx]))
            .collect();
        Ok(Some(Self { counts, ..self }))
    }

    fn decode(fields: &[&str]) -> std::result::Result<Self, String> {
        require_fields(fields, 3)?;
        let start = parse_position(fields[1], "start")?;
        let end = parse_position(fields[2], "end")?;
        if start > end {
            return Err(format!("Start ({}) > end ({})", start, end));
        }
        let counts = fields[3..]
            .iter()
            .map(|f| parse_optional_count(f))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self::new(fields[0], start, end, counts))
    }

    fn encode<W: Write>(&self, out: &mut EvidenceWriter<W>) -> Result<()> {
        out.write_str(&self.contig)?;
        out.write_tab()?;
        out.write_int(self.start)?;
        out.write_tab()?;
        out.write_int(self.end)?;
        for count in &self.counts {
            out.write_tab()?;
            out.write_optional_count(*count)?;
        }
        Ok(())
    }
}
