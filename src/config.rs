//! Global configuration for svmerge runtime behavior.
//!
//! This module holds the I/O sizing and compression defaults, plus a
//! thread-safe global flag that affects dictionary reconciliation without
//! threading it through every call.

use std::sync::atomic::{AtomicBool, Ordering};

/// Default gzip compression level for `.gz` outputs.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 4;

/// Highest accepted gzip compression level.
pub const MAX_COMPRESSION_LEVEL: u32 = 9;

/// Initial capacity of the reused line buffer. Depth lines grow with the
/// sample count.
pub const LINE_BUFFER_CAPACITY: usize = 1024;

/// Read and write buffer sizes for one run.
///
/// Every open source holds its own input buffer, so a k-way merge uses
/// k input buffers and one output buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoBuffers {
    /// Per-source input buffer.
    pub input: usize,
    pub output: usize,
}

impl IoBuffers {
    pub const DEFAULT: Self = Self {
        input: 256 * 1024,
        output: 2 * 1024 * 1024,
    };

    pub const LOW_MEMORY: Self = Self {
        input: 64 * 1024,
        output: 256 * 1024,
    };

    #[inline]
    pub const fn for_mode(low_memory: bool) -> Self {
        if low_memory {
            Self::LOW_MEMORY
        } else {
            Self::DEFAULT
        }
    }
}

/// Global flag for strict contig-length checking during reconciliation.
///
/// When enabled, two dictionaries that agree on contig order but disagree
/// on a contig's length fail reconciliation instead of logging a warning.
///
/// This is set once at startup and read during reconciliation.
static STRICT_LENGTHS: AtomicBool = AtomicBool::new(false);

/// Enable or disable strict contig-length checking.
///
/// # Example
///
/// ```
/// use svmerge::config;
///
/// // Enable at startup before any dictionaries are reconciled
/// config::set_strict_lengths(true);
/// assert!(config::is_strict_lengths());
/// config::set_strict_lengths(false);
/// ```
#[inline]
pub fn set_strict_lengths(enabled: bool) {
    STRICT_LENGTHS.store(enabled, Ordering::Release);
}

/// Check if strict contig-length checking is enabled.
#[inline]
pub fn is_strict_lengths() -> bool {
    STRICT_LENGTHS.load(Ordering::Acquire)
}
