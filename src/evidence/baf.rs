//! B-allele frequency evidence: one sample's allele fraction at a site.

use std::cmp::Ordering;
use std::io::Write;

use crate::error::Result;
use crate::evidence::{require_fields, Evidence, EvidenceKind, Resolution};
use crate::interval::Feature;
use crate::samples::SampleFilter;
use crate::streaming::output::EvidenceWriter;
use crate::streaming::parsing::parse_position;
use crate::streaming::source::SourceMetadata;

/// Text layout: contig, position, value, sample.
#[derive(Debug, Clone, PartialEq)]
pub struct BafEvidence {
    pub sample: String,
    pub contig: String,
    pub position: u64,
    pub value: f64,
}

impl BafEvidence {
    pub fn new(
        sample: impl Into<String>,
        contig: impl Into<String>,
        position: u64,
        value: f64,
    ) -> Self {
        Self {
            sample: sample.into(),
            contig: contig.into(),
            position,
            value,
        }
    }
}

impl Feature for BafEvidence {
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

fn by_sample(a: &BafEvidence, b: &BafEvidence) -> Ordering {
    a.sample.cmp(&b.sample)
}

fn describe(e: &BafEvidence) -> String {
    format!("sample {} at {}:{}", e.sample, e.contig, e.position)
}

impl Evidence for BafEvidence {
    const KIND: EvidenceKind = EvidenceKind::Baf;

    fn resolution() -> Resolution<Self> {
        Resolution::RejectDuplicates {
            order: by_sample,
            describe,
        }
    }

    fn extract_samples(self, samples: &SampleFilter, _: &SourceMetadata) -> Result<Option<Self>> {
        Ok(samples.contains(&self.sample).then_some(self))
    }

    fn decode(fields: &[&str]) -> std::result::Result<Self, String> {
        require_fields(fields, 4)?;
        let position = parse_position(fields[1], "BAF")?;
        let value: f64 = fields[2]
            .parse()
            .map_err(|_| format!("Invalid BAF value: '{}'", fields[2]))?;
        Ok(Self::new(fields[3], fields[0], position, value))
    }

    fn encode<W: Write>(&self, out: &mut EvidenceWriter<W>) -> Result<()> {
        out.write_str(&self.contig)?;
        out.write_tab()?;
        out.write_int(self.position)?;
        out.write_tab()?;
        out.write_float(self.value)?;
        out.write_tab()?;
        out.write_str(&self.sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode() {
        let baf = BafEvidence::decode(&["chr1", "100", "0.3", "S1"]).unwrap();
        assert_eq!(baf, BafEvidence::new("S1", "chr1", 100, 0.3));
        assert!(BafEvidence::decode(&["chr1", "100", "high", "S1"]).is_err());
        assert!(BafEvidence::decode(&["chr1", "100"]).is_err());
    }

    #[test]
    fn test_extract_samples() {
        let meta = SourceMetadata::default();
        let filter = SampleFilter::new(["S1"]);
        let kept = BafEvidence::new("S1", "chr1", 100, 0.3)
            .extract_samples(&filter, &meta)
            .unwrap();
        assert!(kept.is_some());

        let dropped = BafEvidence::new("S2", "chr1", 100, 0.3)
            .extract_samples(&filter, &meta)
            .unwrap();
        assert!(dropped.is_none());
    }
}
