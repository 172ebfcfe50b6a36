//! Sequence dictionary: the ordered set of contigs that defines locus order.
//!
//! Parses `.genome` files (tab-delimited: contig\tlength) and Picard-style
//! `.dict` files (`@SQ\tSN:<name>\tLN:<length>` lines).

use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use rustc_hash::FxHashMap;

use crate::error::{EvidenceError, Result};
use crate::interval::Locus;

/// A named contig with its length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contig {
    pub name: String,
    pub length: u64,
}

/// Ordered contigs with a name to ordinal lookup.
/// Preserves contig order from its source.
#[derive(Debug, Clone, Default)]
pub struct SequenceDictionary {
    contigs: Vec<Contig>,
    index: FxHashMap<String, usize>,
}

impl SequenceDictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dictionary from (name, length) pairs in order.
    pub fn from_pairs<S: Into<String>>(pairs: impl IntoIterator<Item = (S, u64)>) -> Self {
        let mut dict = Self::new();
        for (name, length) in pairs {
            dict.insert(name.into(), length);
        }
        dict
    }

    /// Load a dictionary from a `.genome` or `.dict` file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source_name = path.as_ref().display().to_string();
        let file = File::open(path)?;
        Self::from_reader(file, &source_name)
    }

    /// Parse a dictionary from any reader.
    pub fn from_reader<R: Read>(reader: R, source_name: &str) -> Result<Self> {
        let reader = BufReader::new(reader);
        let mut dict = Self::new();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with('@') {
                if let Some((name, length)) = parse_sq_line(line).map_err(|message| {
                    EvidenceError::Parse {
                        source_name: source_name.to_string(),
                        line: line_num + 1,
                        message,
                    }
                })? {
                    dict.insert(name, length);
                }
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 2 {
                return Err(EvidenceError::Parse {
                    source_name: source_name.to_string(),
                    line: line_num + 1,
                    message: "Genome file requires two columns: contig and length".to_string(),
                });
            }

            let length: u64 = fields[1].parse().map_err(|_| EvidenceError::Parse {
                source_name: source_name.to_string(),
                line: line_num + 1,
                message: format!("Invalid contig length: {}", fields[1]),
            })?;
            dict.insert(fields[0].to_string(), length);
        }

        Ok(dict)
    }

    /// Insert a contig (appends to order if new, otherwise updates its length).
    pub fn insert(&mut self, name: String, length: u64) {
        match self.index.get(&name) {
            Some(&idx) => self.contigs[idx].length = length,
            None => {
                self.index.insert(name.clone(), self.contigs.len());
                self.contigs.push(Contig { name, length });
            }
        }
    }

    /// Ordinal position of a contig.
    #[inline]
    pub fn contig_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Length of a contig.
    #[inline]
    pub fn contig_length(&self, name: &str) -> Option<u64> {
        self.contig_index(name).map(|idx| self.contigs[idx].length)
    }

    #[inline]
    pub fn has_contig(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All contigs in order.
    pub fn contigs(&self) -> &[Contig] {
        &self.contigs
    }

    /// Contig names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.contigs.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.contigs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contigs.is_empty()
    }

    /// Compare two loci by (contig ordinal, start, end).
    ///
    /// Fails if either contig is absent from the dictionary.
    pub fn compare_loci(&self, a: &Locus, b: &Locus) -> Result<Ordering> {
        let a_idx = self.require_index(&a.contig)?;
        let b_idx = self.require_index(&b.contig)?;
        Ok(a_idx
            .cmp(&b_idx)
            .then(a.start.cmp(&b.start))
            .then(a.end.cmp(&b.end)))
    }

    fn require_index(&self, contig: &str) -> Result<usize> {
        self.contig_index(contig)
            .ok_or_else(|| EvidenceError::UnknownContig {
                contig: contig.to_string(),
                source_name: "sequence dictionary".to_string(),
            })
    }
}

impl PartialEq for SequenceDictionary {
    fn eq(&self, other: &Self) -> bool {
        self.contigs == other.contigs
    }
}

impl Eq for SequenceDictionary {}

/// Parse an `@SQ` header line into (name, length).
///
/// Returns `Ok(None)` for other `@` lines (`@HD`, `@PG`, ...).
pub fn parse_sq_line(line: &str) -> std::result::Result<Option<(String, u64)>, String> {
    let mut fields = line.split('\t');
    if fields.next() != Some("@SQ") {
        return Ok(None);
    }

    let mut name = None;
    let mut length = None;
    for field in fields {
        if let Some(value) = field.strip_prefix("SN:") {
            name = Some(value.to_string());
        } else if let Some(value) = field.strip_prefix("LN:") {
            length = Some(
                value
                    .parse::<u64>()
                    .map_err(|_| format!("Invalid LN value: '{}'", value))?,
            );
        }
    }

    match (name, length) {
        (Some(name), Some(length)) => Ok(Some((name, length))),
        (None, _) => Err("@SQ line without SN tag".to_string()),
        (_, None) => Err("@SQ line without LN tag".to_string()),
    }
}
