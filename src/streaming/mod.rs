//! Streaming pipeline components shared by every evidence kind.
//!
//! This module provides:
//! - Allocation-light line parsing
//! - Source adapters with one record of look-ahead
//! - K-way merge in sequence-dictionary order
//! - Same-locus resolution ahead of the output sink
//! - Sort validation and buffered output
//!
//! Memory is O(k) for k sources plus the largest same-locus group.

pub mod merge;
pub mod output;
pub mod parsing;
pub mod resolve;
pub mod sink;
pub mod source;
pub mod validation;

pub use merge::{MergedRecord, MergingIterator};
pub use output::{EvidenceWriter, FinishWrite, OutputStream};
pub use parsing::{parse_u64_fast, should_skip_line, split_fields};
pub use resolve::{ResolveStats, ResolverState, SameLocusResolver};
pub use sink::FeatureSink;
pub use source::{SourceAdapter, SourceMetadata};
pub use validation::{verify_sorted, DictionaryOrderValidator};
