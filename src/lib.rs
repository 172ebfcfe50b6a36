// Clippy allows for the whole crate
#![allow(clippy::should_implement_trait)]
#![allow(clippy::type_complexity)]

//! svmerge: merge sorted structural-variant evidence files
//!
//! This library merges any number of sorted evidence streams (B-allele
//! frequency, split-read, locus-depth, binned read-depth) into one sorted,
//! de-duplicated stream.
//!
//! # Features
//!
//! - **Dictionary reconciliation**: sources may cover different contig subsets
//! - **Streaming I/O**: O(k) memory for k sources, gzip in and out
//! - **Same-locus resolution**: duplicate detection or per-sample union
//!
//! # Example
//!
//! ```rust,no_run
//! use svmerge::commands::MergeEvidenceCommand;
//!
//! let cmd = MergeEvidenceCommand::new().with_samples(vec!["NA12878".to_string()]);
//! let stats = cmd
//!     .run(&["a.rd.txt.gz", "b.rd.txt.gz"], "merged.rd.txt.gz")
//!     .unwrap();
//! eprintln!("{}", stats);
//! ```

pub mod commands;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod evidence;
pub mod interval;
pub mod reader;
pub mod reconcile;
pub mod samples;
pub mod streaming;

// Re-export commonly used types
pub use dictionary::{Contig, SequenceDictionary};
pub use error::{EvidenceError, Result};
pub use evidence::{Evidence, EvidenceKind, Resolution};
pub use interval::{Feature, Locus, Strand};
pub use reader::{open_evidence, EvidenceReader};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::commands::{CheckSortedCommand, MergeEvidenceCommand};
    pub use crate::dictionary::SequenceDictionary;
    pub use crate::error::{EvidenceError, Result};
    pub use crate::evidence::{
        BafEvidence, DepthEvidence, Evidence, EvidenceKind, LocusDepth, SplitReadEvidence,
    };
    pub use crate::interval::{Feature, Locus, Strand};
    pub use crate::reader::{open_evidence, EvidenceReader};
    pub use crate::reconcile::{plan_merge, reconcile};
    pub use crate::samples::SampleFilter;
    pub use crate::streaming::{
        FeatureSink, MergingIterator, SameLocusResolver, SourceAdapter, SourceMetadata,
    };
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn test_basic_workflow() {
        let a = "@SQ\tSN:chr1\tLN:1000\n@SM\tS1\nchr1\t100\t200\t5\n";
        let b = "@SQ\tSN:chr1\tLN:1000\n@SM\tS2\nchr1\t100\t200\t9\nchr1\t300\t400\t1\n";

        let (meta_a, records_a) = EvidenceReader::<_, DepthEvidence>::new(a.as_bytes(), "a")
            .unwrap()
            .split();
        let (meta_b, records_b) = EvidenceReader::<_, DepthEvidence>::new(b.as_bytes(), "b")
            .unwrap()
            .split();

        let dict = reconcile([meta_a.dictionary(), meta_b.dictionary()])
            .unwrap()
            .clone();
        let filter = SampleFilter::new(["S1", "S2"]);
        let sources = vec![
            SourceAdapter::new(records_a, &dict, meta_a).unwrap(),
            SourceAdapter::new(records_b, &dict, meta_b).unwrap(),
        ];

        let mut merge = MergingIterator::new(&dict, sources).unwrap();
        let mut resolver = SameLocusResolver::new(&dict, Vec::new());
        while merge.has_next() {
            let entry = merge.next_entry().unwrap();
            let record = entry
                .record
                .extract_samples(&filter, merge.metadata(entry.source))
                .unwrap()
                .unwrap();
            resolver.write(record).unwrap();
        }
        resolver.close().unwrap();

        let merged = resolver.into_sink();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].counts, vec![Some(5), Some(9)]);
        assert_eq!(merged[1].counts, vec![None, Some(1)]);
    }
}
