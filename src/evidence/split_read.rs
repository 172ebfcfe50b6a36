//! Split-read evidence: reads from one sample clipped at a position.

use std::cmp::Ordering;
use std::io::Write;

use crate::error::Result;
use crate::evidence::{require_fields, Evidence, EvidenceKind, Resolution};
use crate::interval::{Feature, Strand};
use crate::samples::SampleFilter;
use crate::streaming::output::EvidenceWriter;
use crate::streaming::parsing::{parse_count, parse_position};
use crate::streaming::source::SourceMetadata;

/// Text layout: contig, position, strand (`+`/`-`), count, sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitReadEvidence {
    pub sample: String,
    pub contig: String,
    pub position: u64,
    pub count: u32,
    pub strand: Strand,
}

impl SplitReadEvidence {
    pub fn new(
        sample: impl Into<String>,
        contig: impl Into<String>,
        position: u64,
        count: u32,
        strand: Strand,
    ) -> Self {
        Self {
            sample: sample.into(),
            contig: contig.into(),
            position,
            count,
            strand,
        }
    }
}

impl Feature for SplitReadEvidence {
    fn contig(&self) -> &str {
        &self.contig
    }

    fn start(&self) -> u64 {
        self.position
    }

    fn end(&self) -> u64 {
        self.position
    }
}

// Left-clipped before right-clipped within a sample.
fn by_sample_then_strand(a: &SplitReadEvidence, b: &SplitReadEvidence) -> Ordering {
    a.sample.cmp(&b.sample).then(a.strand.cmp(&b.strand))
}

fn describe(e: &SplitReadEvidence) -> String {
    format!(
        "sample {} at {}:{} {}",
        e.sample,
        e.contig,
        e.position,
        e.strand.side()
    )
}

impl Evidence for SplitReadEvidence {
    const KIND: EvidenceKind = EvidenceKind::SplitRead;

    fn resolution() -> Resolution<Self> {
        Resolution::RejectDuplicates {
            order: by_sample_then_strand,
            describe,
        }
    }

    fn extract_samples(self, samples: &SampleFilter, _: &SourceMetadata) -> Result<Option<Self>> {
        Ok(samples.contains(&self.sample).then_some(self))
    }

    fn decode(fields: &[&str]) -> std::result::Result<Self, String> {
        require_fields(fields, 5)?;
        let position = parse_position(fields[1], "split-read")?;
        let strand = fields[2]
            .chars()
            .next()
            .filter(|_| fields[2].len() == 1)
            .and_then(Strand::from_char)
            .ok_or_else(|| format!("Invalid strand: '{}'", fields[2]))?;
        let count = parse_count(fields[3], "split-read count")?;
        Ok(Self::new(fields[4], fields[0], position, count, strand))
    }

    fn encode<W: Write>(&self, out: &mut EvidenceWriter<W>) -> Result<()> {
        out.write_str(&self.contig)?;
        out.write_tab()?;
        out.write_int(self.position)?;
        out.write_tab()?;
        out.write_str(if self.strand == Strand::Plus { "+" } else { "-" })?;
        out.write_tab()?;
        out.write_int(self.count)?;
        out.write_tab()?;
        out.write_str(&self.sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode() {
        let sr = SplitReadEvidence::decode(&["chr2", "500", "-", "7", "S1"]).unwrap();
        assert_eq!(sr, SplitReadEvidence::new("S1", "chr2", 500, 7, Strand::Minus));
        assert!(SplitReadEvidence::decode(&["chr2", "500", "left", "7", "S1"]).is_err());
        assert!(SplitReadEvidence::decode(&["chr2", "500", "+", "-7", "S1"]).is_err());
    }

    #[test]
    fn test_order_is_sample_then_strand() {
        let a = SplitReadEvidence::new("S1", "chr1", 10, 1, Strand::Plus);
        let b = SplitReadEvidence::new("S1", "chr1", 10, 3, Strand::Minus);
        let c = SplitReadEvidence::new("S0", "chr1", 10, 3, Strand::Plus);
        assert_eq!(by_sample_then_strand(&b, &a), Ordering::Less);
        assert_eq!(by_sample_then_strand(&c, &b), Ordering::Less);
        assert!(describe(&a).ends_with("right"));
    }
}
