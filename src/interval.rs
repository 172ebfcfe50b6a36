//! Core locus types for evidence records.

use std::fmt;

/// Anything anchored to a contig interval.
///
/// Positions are 1-based and closed, as in the evidence formats.
pub trait Feature {
    fn contig(&self) -> &str;
    fn start(&self) -> u64;
    fn end(&self) -> u64;

    /// Owned copy of this feature's locus.
    fn locus(&self) -> Locus {
        Locus::new(self.contig(), self.start(), self.end())
    }
}

/// A contig interval. Ordering between loci needs a
/// [`SequenceDictionary`](crate::dictionary::SequenceDictionary).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locus {
    pub contig: String,
    pub start: u64,
    pub end: u64,
}

impl Locus {
    /// Create a new locus.
    #[inline]
    pub fn new(contig: impl Into<String>, start: u64, end: u64) -> Self {
        Self {
            contig: contig.into(),
            start,
            end,
        }
    }

    /// True when `feature` sits on exactly this locus.
    #[inline]
    pub fn matches<F: Feature + ?Sized>(&self, feature: &F) -> bool {
        self.start == feature.start() && self.end == feature.end() && self.contig == feature.contig()
    }
}

impl Feature for Locus {
    fn contig(&self) -> &str {
        &self.contig
    }

    fn start(&self) -> u64 {
        self.start
    }

    fn end(&self) -> u64 {
        self.end
    }
}

impl fmt::Display for Locus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}:{}", self.contig, self.start)
        } else {
            write!(f, "{}:{}-{}", self.contig, self.start, self.end)
        }
    }
}

/// Split-read direction. `Minus` (left) orders before `Plus` (right).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strand {
    Minus,
    Plus,
}

impl Strand {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Strand::Plus),
            '-' => Some(Strand::Minus),
            _ => None,
        }
    }

    /// Side of the breakpoint the reads support.
    pub fn side(&self) -> &'static str {
        match self {
            Strand::Plus => "right",
            Strand::Minus => "left",
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Plus => write!(f, "+"),
            Strand::Minus => write!(f, "-"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locus_display() {
        assert_eq!(Locus::new("chr1", 100, 100).to_string(), "chr1:100");
        assert_eq!(Locus::new("chr1", 100, 200).to_string(), "chr1:100-200");
    }

    #[test]
    fn test_locus_matches() {
        let locus = Locus::new("chr1", 100, 200);
        assert!(locus.matches(&Locus::new("chr1", 100, 200)));
        assert!(!locus.matches(&Locus::new("chr1", 100, 201)));
        assert!(!locus.matches(&Locus::new("chr2", 100, 200)));
    }

    #[test]
    fn test_strand_ordering() {
        let mut strands = [Strand::Plus, Strand::Minus];
        strands.sort();
        assert_eq!(strands, [Strand::Minus, Strand::Plus]);
        assert_eq!(Strand::from_char('+'), Some(Strand::Plus));
        assert_eq!(Strand::from_char('.'), None);
        assert_eq!(Strand::Minus.side(), "left");
    }
}
