//! Generate synthetic evidence files for testing and benchmarking.
//!
//! Features:
//! - Human genome model (23 contigs, weighted by size)
//! - Any evidence kind, sorted by the model's dictionary
//! - Per-sample missing data
//! - Deterministic reproducibility via seed

use std::path::PathBuf;
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::config::{DEFAULT_COMPRESSION_LEVEL, MAX_COMPRESSION_LEVEL};
use crate::dictionary::SequenceDictionary;
use crate::error::{EvidenceError, Result};
use crate::evidence::{
    BafEvidence, DepthEvidence, Evidence, EvidenceKind, LocusDepth, SplitReadEvidence,
};
use crate::interval::Strand;
use crate::streaming::output::{EvidenceWriter, FinishWrite, OutputStream};
use crate::streaming::sink::FeatureSink;

const BASES: [u8; 4] = *b"ACGT";

/// Size specification (parses 1K, 1M, etc.).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeSpec {
    pub count: u64,
}

impl SizeSpec {
    /// Parse size from string (e.g., "1K", "5M", "100").
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim().to_uppercase();
        if s.is_empty() {
            return None;
        }

        let (num_part, multiplier) = if let Some(num) = s.strip_suffix('K') {
            (num, 1_000u64)
        } else if let Some(num) = s.strip_suffix('M') {
            (num, 1_000_000u64)
        } else if let Some(num) = s.strip_suffix('G') {
            (num, 1_000_000_000u64)
        } else {
            (s.as_str(), 1u64)
        };

        num_part
            .parse::<u64>()
            .ok()
            .and_then(|n| n.checked_mul(multiplier))
            .map(|count| Self { count })
    }
}

/// Configuration for the generate command.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub output: PathBuf,
    pub kind: EvidenceKind,
    /// Number of loci drawn (duplicates collapse, so the file may hold fewer).
    pub loci: u64,
    pub samples: usize,
    pub seed: u64,
    /// Bin width for read-depth evidence.
    pub bin_size: u64,
    /// Chance that a sample has no record (or a missing count) at a locus.
    pub missing_rate: f64,
    pub compression_level: u32,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("synthetic.baf.txt.gz"),
            kind: EvidenceKind::Baf,
            loci: 100_000,
            samples: 10,
            seed: 42,
            bin_size: 1000,
            missing_rate: 0.1,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

/// Statistics from generate operation.
#[derive(Debug, Default, Clone)]
pub struct GenerateStats {
    pub records: u64,
    pub loci: u64,
    pub samples: usize,
    pub elapsed_secs: f64,
}

impl std::fmt::Display for GenerateStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} records at {} loci for {} samples ({:.1}s)",
            format_count(self.records),
            format_count(self.loci),
            self.samples,
            self.elapsed_secs
        )
    }
}

/// Human genome model with 23 contigs weighted by size.
struct HumanGenome {
    /// Contig names and sizes
    contigs: Vec<(&'static str, u64)>,
    /// Cumulative sizes for weighted sampling
    cumulative: Vec<u64>,
    /// Total genome size
    total_size: u64,
}

impl HumanGenome {
    /// Create a new human genome model (hg38 approximate sizes).
    fn new() -> Self {
        let contigs: Vec<(&'static str, u64)> = vec![
            ("chr1", 248_956_422),
            ("chr2", 242_193_529),
            ("chr3", 198_295_559),
            ("chr4", 190_214_555),
            ("chr5", 181_538_259),
            ("chr6", 170_805_979),
            ("chr7", 159_345_973),
            ("chr8", 145_138_636),
            ("chr9", 138_394_717),
            ("chr10", 133_797_422),
            ("chr11", 135_086_622),
            ("chr12", 133_275_309),
            ("chr13", 114_364_328),
            ("chr14", 107_043_718),
            ("chr15", 101_991_189),
            ("chr16", 90_338_345),
            ("chr17", 83_257_441),
            ("chr18", 80_373_285),
            ("chr19", 58_617_616),
            ("chr20", 64_444_167),
            ("chr21", 46_709_983),
            ("chr22", 50_818_468),
            ("chrX", 156_040_895),
        ];

        let mut cumulative = Vec::with_capacity(contigs.len());
        let mut running_total = 0u64;
        for (_, size) in &contigs {
            running_total += size;
            cumulative.push(running_total);
        }

        Self {
            contigs,
            cumulative,
            total_size: running_total,
        }
    }

    /// Sample a contig weighted by size.
    /// Returns (contig index, contig size).
    #[inline]
    fn sample_contig(&self, rng: &mut SmallRng) -> (usize, u64) {
        let target = rng.gen_range(0..self.total_size);
        let idx = self.cumulative.partition_point(|&x| x <= target);
        (idx, self.contigs[idx].1)
    }

    fn dictionary(&self) -> SequenceDictionary {
        SequenceDictionary::from_pairs(self.contigs.iter().copied())
    }
}

/// Compact locus for generation; derived order is dictionary order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct RawLocus {
    contig_idx: u16,
    start: u64,
    end: u64,
}

/// Synthetic evidence generator.
pub struct GenerateCommand {
    config: GenerateConfig,
    genome: HumanGenome,
}

impl GenerateCommand {
    pub fn new(config: GenerateConfig) -> Self {
        Self {
            config,
            genome: HumanGenome::new(),
        }
    }

    /// Write the configured file.
    pub fn run(&self) -> Result<GenerateStats> {
        let start = Instant::now();
        if self.config.samples == 0 {
            return Err(EvidenceError::InvalidConfig(
                "At least one sample is required".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.config.missing_rate) {
            return Err(EvidenceError::InvalidConfig(format!(
                "Missing rate {} must be in [0, 1)",
                self.config.missing_rate
            )));
        }

        if self.config.compression_level > MAX_COMPRESSION_LEVEL {
            return Err(EvidenceError::InvalidConfig(format!(
                "Compression level {} is out of range (0-{})",
                self.config.compression_level, MAX_COMPRESSION_LEVEL
            )));
        }
        if let Some(kind) = EvidenceKind::from_path(&self.config.output) {
            if kind != self.config.kind {
                return Err(EvidenceError::InvalidConfig(format!(
                    "Output {} names {} but {} was requested",
                    self.config.output.display(),
                    kind,
                    self.config.kind
                )));
            }
        }

        let mut rng = SmallRng::seed_from_u64(self.config.seed);
        let loci = self.generate_loci(&mut rng);
        let samples: Vec<String> = (0..self.config.samples).map(sample_name).collect();

        let stream = OutputStream::create(&self.config.output, self.config.compression_level)?;
        let mut writer = EvidenceWriter::new(stream);
        let records = self.write_evidence(&loci, &samples, &mut rng, &mut writer)?;

        let stats = GenerateStats {
            records,
            loci: loci.len() as u64,
            samples: samples.len(),
            elapsed_secs: start.elapsed().as_secs_f64(),
        };
        info!(output = %self.config.output.display(), "Generated {}", stats);
        Ok(stats)
    }

    /// Write header and records for the configured kind. Returns records written.
    fn write_evidence<W: FinishWrite>(
        &self,
        loci: &[RawLocus],
        samples: &[String],
        rng: &mut SmallRng,
        writer: &mut EvidenceWriter<W>,
    ) -> Result<u64> {
        writer.write_header(&self.genome.dictionary(), samples)?;
        let missing = self.config.missing_rate;

        match self.config.kind {
            EvidenceKind::Baf => self.emit_per_sample(loci, samples, rng, writer, |contig, locus, sample, rng| {
                BafEvidence::new(sample, contig, locus.start, rng.gen_range(0.0..1.0))
            }),
            EvidenceKind::SplitRead => {
                self.emit_per_sample(loci, samples, rng, writer, |contig, locus, sample, rng| {
                    let strand = if rng.gen_bool(0.5) { Strand::Plus } else { Strand::Minus };
                    SplitReadEvidence::new(sample, contig, locus.start, rng.gen_range(1..50), strand)
                })
            }
            EvidenceKind::LocusDepth => {
                self.emit_per_sample(loci, samples, rng, writer, |contig, locus, sample, rng| {
                    let mut depths = [0u32; 4];
                    for depth in depths.iter_mut() {
                        *depth = rng.gen_range(0..40);
                    }
                    let ref_call = BASES[rng.gen_range(0..BASES.len())];
                    LocusDepth::new(sample, contig, locus.start, ref_call, depths)
                })
            }
            EvidenceKind::Depth => {
                let mut written = 0u64;
                for locus in loci {
                    let counts = (0..samples.len())
                        .map(|_| (!rng.gen_bool(missing)).then(|| rng.gen_range(0..200)))
                        .collect();
                    let contig = self.genome.contigs[locus.contig_idx as usize].0;
                    FeatureSink::write(writer, DepthEvidence::new(contig, locus.start, locus.end, counts))?;
                    written += 1;
                }
                FeatureSink::<DepthEvidence>::close(writer)?;
                Ok(written)
            }
        }
    }

    /// One record per present sample at each locus.
    fn emit_per_sample<E, W, F>(
        &self,
        loci: &[RawLocus],
        samples: &[String],
        rng: &mut SmallRng,
        writer: &mut EvidenceWriter<W>,
        mut make: F,
    ) -> Result<u64>
    where
        E: Evidence,
        W: FinishWrite,
        F: FnMut(&str, &RawLocus, &str, &mut SmallRng) -> E,
    {
        let mut written = 0u64;
        for locus in loci {
            let contig = self.genome.contigs[locus.contig_idx as usize].0;
            for sample in samples {
                if rng.gen_bool(self.config.missing_rate) {
                    continue;
                }
                FeatureSink::write(writer, make(contig, locus, sample, rng))?;
                written += 1;
            }
        }
        FeatureSink::<E>::close(writer)?;
        Ok(written)
    }

    /// Draw loci and sort them in dictionary order, dropping repeats.
    fn generate_loci(&self, rng: &mut SmallRng) -> Vec<RawLocus> {
        let span = match self.config.kind {
            EvidenceKind::Depth => self.config.bin_size.max(1),
            _ => 1,
        };

        let mut loci: Vec<RawLocus> = (0..self.config.loci)
            .map(|_| {
                let (contig_idx, size) = self.genome.sample_contig(rng);
                let max_start = size.saturating_sub(span).max(1);
                let start = rng.gen_range(1..=max_start);
                RawLocus {
                    contig_idx: contig_idx as u16,
                    start,
                    end: start + span - 1,
                }
            })
            .collect();
        loci.sort_unstable();
        loci.dedup();
        loci
    }
}

/// Synthetic sample name, e.g. `SAMPLE_007`.
pub fn sample_name(idx: usize) -> String {
    format!("SAMPLE_{:03}", idx)
}

fn format_count(count: u64) -> String {
    if count >= 1_000_000_000 && count % 1_000_000_000 == 0 {
        format!("{}G", count / 1_000_000_000)
    } else if count >= 1_000_000 && count % 1_000_000 == 0 {
        format!("{}M", count / 1_000_000)
    } else if count >= 1_000 && count % 1_000 == 0 {
        format!("{}K", count / 1_000)
    } else {
        count.to_string()
    }
}
