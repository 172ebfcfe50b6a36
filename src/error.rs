//! Error type shared by every stage of the evidence merge.

use std::io;
use thiserror::Error;

/// Errors that can occur while reading, reconciling, merging or writing evidence.
///
/// Every variant is terminal for the current run.
#[derive(Error, Debug)]
pub enum EvidenceError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error in {source_name} at line {line}: {message}")]
    Parse {
        source_name: String,
        line: usize,
        message: String,
    },

    #[error("Invalid evidence format: {0}")]
    InvalidFormat(String),

    #[error("No dictionary found. Provide one with --sequence-dictionary")]
    MissingDictionary,

    #[error("Contig {contig} {reason}")]
    Reconciliation { contig: String, reason: String },

    #[error("Contig '{contig}' from {source_name} not found in sequence dictionary")]
    UnknownContig { contig: String, source_name: String },

    #[error("Inputs are not sorted at {contig}:{position} in {source_name}")]
    OutOfOrderInput {
        source_name: String,
        contig: String,
        position: u64,
    },

    #[error("Features not presented in dictionary order: {locus} after {previous}")]
    UnsortedInput { locus: String, previous: String },

    #[error("Two instances of {kind} for {detail}")]
    DuplicateLocusRecord { kind: &'static str, detail: String },

    /// `slot` is the 1-based sample number.
    #[error("Multiple sources for count of sample#{slot} at {locus}")]
    ConflictingSlotValue { slot: usize, locus: String },

    #[error("All records at {locus} ought to have the same sample list: expected {expected} counts, found {found}")]
    SchemaMismatch {
        locus: String,
        expected: usize,
        found: usize,
    },

    #[error("Source {0} is exhausted")]
    ExhaustedSource(String),

    #[error("Incompatible evidence input {path}: produces {found} rather than {expected} as dictated by the output path")]
    IncompatibleEvidence {
        path: String,
        found: &'static str,
        expected: &'static str,
    },

    #[error("{kind} source {source_name} has no sample names in its header. We don't know which samples we have")]
    MissingSampleNames {
        kind: &'static str,
        source_name: String,
    },

    #[error("Write after close")]
    SinkClosed,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, EvidenceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_locus() {
        let err = EvidenceError::OutOfOrderInput {
            source_name: "a.baf.txt".to_string(),
            contig: "chr1".to_string(),
            position: 40,
        };
        assert_eq!(
            err.to_string(),
            "Inputs are not sorted at chr1:40 in a.baf.txt"
        );

        let err = EvidenceError::ConflictingSlotValue {
            slot: 2,
            locus: "chr1:100-200".to_string(),
        };
        assert!(err.to_string().contains("sample#2 at chr1:100-200"));
    }

    #[test]
    fn test_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: EvidenceError = io_err.into();
        assert!(matches!(err, EvidenceError::Io(_)));
    }
}
