//! Per-base read depth for one sample at a SNP site.

use std::cmp::Ordering;
use std::io::Write;

use crate::error::Result;
use crate::evidence::{require_fields, Evidence, EvidenceKind, Resolution};
use crate::interval::Feature;
use crate::samples::SampleFilter;
use crate::streaming::output::EvidenceWriter;
use crate::streaming::parsing::{parse_count, parse_position};
use crate::streaming::source::SourceMetadata;

const BASES: [&str; 4] = ["A", "C", "G", "T"];

/// Text layout: contig, position, sample, ref base, depth A, C, G, T.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocusDepth {
    pub sample: String,
    pub contig: String,
    pub position: u64,
    pub ref_call: u8,
    pub depths: [u32; 4],
}

impl LocusDepth {
    pub fn new(
        sample: impl Into<String>,
        contig: impl Into<String>,
        position: u64,
        ref_call: u8,
        depths: [u32; 4],
    ) -> Self {
        Self {
            sample: sample.into(),
            contig: contig.into(),
            position,
            ref_call,
            depths,
        }
    }

    pub fn total_depth(&self) -> u32 {
        self.depths.iter().sum()
    }
}

impl Feature for LocusDepth {
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

fn by_sample(a: &LocusDepth, b: &LocusDepth) -> Ordering {
    a.sample.cmp(&b.sample)
}

fn describe(e: &LocusDepth) -> String {
    format!("sample {} at {}:{}", e.sample, e.contig, e.position)
}

impl Evidence for LocusDepth {
    const KIND: EvidenceKind = EvidenceKind::LocusDepth;

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
        require_fields(fields, 8)?;
        let position = parse_position(fields[1], "locus")?;
        let ref_call = match fields[3].as_bytes() {
            [b] if b"ACGTN".contains(&b.to_ascii_uppercase()) => b.to_ascii_uppercase(),
            _ => return Err(format!("Invalid reference base: '{}'", fields[3])),
        };
        let mut depths = [0u32; 4];
        for (i, depth) in depths.iter_mut().enumerate() {
            *depth = parse_count(fields[4 + i], BASES[i])?;
        }
        Ok(Self::new(fields[2], fields[0], position, ref_call, depths))
    }

    fn encode<W: Write>(&self, out: &mut EvidenceWriter<W>) -> Result<()> {
        out.write_str(&self.contig)?;
        out.write_tab()?;
        out.write_int(self.position)?;
        out.write_tab()?;
        out.write_str(&self.sample)?;
        out.write_tab()?;
        out.write_str(std::str::from_utf8(&[self.ref_call]).unwrap_or("N"))?;
        for depth in self.depths {
            out.write_tab()?;
            out.write_int(depth)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode() {
        let ld = LocusDepth::decode(&["chr1", "1000", "S1", "g", "0", "1", "30", "2"]).unwrap();
        assert_eq!(ld.ref_call, b'G');
        assert_eq!(ld.depths, [0, 1, 30, 2]);
        assert_eq!(ld.total_depth(), 33);
        assert!(LocusDepth::decode(&["chr1", "1000", "S1", "GA", "0", "1", "30", "2"]).is_err());
        assert!(LocusDepth::decode(&["chr1", "1000", "S1", "G", "0", "1", "30"]).is_err());
    }
}
