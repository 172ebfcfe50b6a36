//! Sample-name bookkeeping for the startup phase.
//!
//! Sample names are gathered from every source header into a
//! [`SampleAccumulator`], then frozen into an immutable [`SampleFilter`]
//! before merging starts.

use std::collections::BTreeSet;
use std::fs;

use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::streaming::source::SourceMetadata;

/// Expand sample arguments: a value ending in `.list` names a file with one
/// sample per line, anything else is a sample name.
pub fn expand_sample_args(args: &[String]) -> Result<Vec<String>> {
    let mut names = Vec::with_capacity(args.len());
    for arg in args {
        if arg.ends_with(".list") {
            let text = fs::read_to_string(arg)?;
            names.extend(
                text.lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty() && !line.starts_with('#'))
                    .map(String::from),
            );
        } else {
            names.push(arg.clone());
        }
    }
    Ok(names)
}

/// Ordered, de-duplicated list of sample names to extract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleFilter {
    names: Vec<String>,
    index: FxHashMap<String, usize>,
}

impl SampleFilter {
    /// Build a filter, keeping the first occurrence of each name.
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        let mut filter = Self::default();
        for name in names {
            let name = name.into();
            if !filter.index.contains_key(&name) {
                filter.index.insert(name.clone(), filter.names.len());
                filter.names.push(name);
            }
        }
        filter
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Output slot of a sample.
    #[inline]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Names in output order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Running set of sample names seen across source headers (sorted).
#[derive(Debug, Default)]
pub struct SampleAccumulator {
    names: BTreeSet<String>,
}

impl SampleAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every sample declared by a source.
    pub fn add_source(&mut self, metadata: &SourceMetadata) {
        if let Some(samples) = metadata.samples() {
            self.names.extend(samples.iter().cloned());
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Choose the samples to extract.
    ///
    /// An explicit list wins; otherwise every accumulated sample is used.
    /// Returns `None` when there is nothing to filter on, in which case
    /// records pass through without extraction.
    pub fn freeze(self, explicit: &[String]) -> Option<SampleFilter> {
        if !explicit.is_empty() {
            return Some(SampleFilter::new(explicit.iter().cloned()));
        }
        if self.names.is_empty() {
            None
        } else {
            Some(SampleFilter::new(self.names))
        }
    }
}
