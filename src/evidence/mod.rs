//! Structural-variant evidence record types.
//!
//! Each record type implements [`Evidence`], which supplies everything the
//! merge pipeline needs to know about it: how to read and write it, how to
//! narrow it to a set of samples, and how same-locus records are resolved.

pub mod baf;
pub mod depth;
pub mod locus_depth;
pub mod split_read;

use std::cmp::Ordering;
use std::fmt;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::interval::Feature;
use crate::samples::SampleFilter;
use crate::streaming::output::EvidenceWriter;
use crate::streaming::source::SourceMetadata;

pub use baf::BafEvidence;
pub use depth::DepthEvidence;
pub use locus_depth::LocusDepth;
pub use split_read::SplitReadEvidence;

/// The evidence kinds understood by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvidenceKind {
    Baf,
    SplitRead,
    LocusDepth,
    Depth,
}

impl EvidenceKind {
    pub const ALL: [EvidenceKind; 4] = [
        EvidenceKind::Baf,
        EvidenceKind::SplitRead,
        EvidenceKind::LocusDepth,
        EvidenceKind::Depth,
    ];

    /// Record type name used in messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Baf => "BafEvidence",
            Self::SplitRead => "SplitReadEvidence",
            Self::LocusDepth => "LocusDepth",
            Self::Depth => "DepthEvidence",
        }
    }

    /// File suffix, without any trailing `.gz`.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Baf => ".baf.txt",
            Self::SplitRead => ".sr.txt",
            Self::LocusDepth => ".ld.txt",
            Self::Depth => ".rd.txt",
        }
    }

    /// Infer the kind from a file name (`x.baf.txt`, `x.rd.txt.gz`, ...).
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let name = path.as_ref().file_name()?.to_str()?.to_lowercase();
        let name = name.strip_suffix(".gz").unwrap_or(&name);
        Self::ALL
            .into_iter()
            .find(|kind| name.ends_with(kind.suffix()))
    }

    /// Parse a kind from its short name (`baf`, `sr`, `ld`, `rd`).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "baf" => Some(Self::Baf),
            "sr" | "split-read" => Some(Self::SplitRead),
            "ld" | "locus-depth" => Some(Self::LocusDepth),
            "rd" | "depth" => Some(Self::Depth),
            _ => None,
        }
    }
}

impl fmt::Display for EvidenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How records sharing one locus are combined.
pub enum Resolution<R> {
    /// Emit the group in `order`; two records comparing equal are an error.
    /// `describe` renders the duplicate for the error message.
    RejectDuplicates {
        order: fn(&R, &R) -> Ordering,
        describe: fn(&R) -> String,
    },
    /// Merge the group into one record slot by slot. `None` marks missing data.
    UnionSlots {
        slots: fn(&mut R) -> &mut [Option<u32>],
    },
}

impl<R> Clone for Resolution<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Resolution<R> {}

/// A record type that can flow through the merge pipeline.
pub trait Evidence: Feature + Sized {
    const KIND: EvidenceKind;

    /// Same-locus resolution strategy for this record type.
    fn resolution() -> Resolution<Self>;

    /// Narrow the record to `samples`. `Ok(None)` drops it.
    fn extract_samples(self, samples: &SampleFilter, source: &SourceMetadata)
        -> Result<Option<Self>>;

    /// Build a record from the tab-separated fields of one line.
    fn decode(fields: &[&str]) -> std::result::Result<Self, String>;

    /// Write the record's fields, without the line terminator.
    fn encode<W: Write>(&self, out: &mut EvidenceWriter<W>) -> Result<()>;
}

/// Check a decoded line has at least `expected` fields.
pub(crate) fn require_fields(fields: &[&str], expected: usize) -> std::result::Result<(), String> {
    if fields.len() < expected {
        Err(format!(
            "Expected at least {} fields, got {}",
            expected,
            fields.len()
        ))
    } else {
        Ok(())
    }
}
