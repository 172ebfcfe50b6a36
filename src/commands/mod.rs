//! Command implementations for svmerge.

pub mod check_sorted;
pub mod generate;
pub mod merge_evidence;

pub use crate::streaming::{verify_sorted, DictionaryOrderValidator};
pub use check_sorted::CheckSortedCommand;
pub use generate::{GenerateCommand, GenerateConfig, GenerateStats, SizeSpec};
pub use merge_evidence::{MergeEvidenceCommand, MergeStats};
