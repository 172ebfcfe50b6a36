//! svmerge: merge sorted structural-variant evidence files
//!
//! Usage: svmerge <COMMAND> [OPTIONS]

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use svmerge::commands::{
    CheckSortedCommand, GenerateCommand, GenerateConfig, MergeEvidenceCommand, SizeSpec,
};
use svmerge::config::{self, DEFAULT_COMPRESSION_LEVEL};
use svmerge::dictionary::SequenceDictionary;
use svmerge::error::EvidenceError;
use svmerge::evidence::EvidenceKind;
use svmerge::samples::expand_sample_args;

#[derive(Parser)]
#[command(name = "svmerge")]
#[command(author = "Manish Kumar Bobbili")]
#[command(version)]
#[command(about = "svmerge: merge and de-duplicate sorted structural-variant evidence files", long_about = None)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Treat a contig length disagreement between dictionaries as an error
    #[arg(long, global = true)]
    strict_lengths: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge sorted evidence files of one kind into a single sorted file
    Merge {
        /// Input evidence file (repeatable, use - for stdin)
        #[arg(short = 'F', long = "evidence-file", required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,

        /// Output evidence file; the suffix picks the kind (.gz compresses)
        #[arg(short = 'O', long)]
        output: PathBuf,

        /// Sample to keep, in output order (repeatable, or a .list file)
        #[arg(long = "sample-names")]
        sample_names: Vec<String>,

        /// Sequence dictionary that overrides the input headers
        #[arg(long)]
        sequence_dictionary: Option<PathBuf>,

        /// Gzip compression level for .gz output (0-9)
        #[arg(long, default_value_t = DEFAULT_COMPRESSION_LEVEL)]
        compression_level: u32,

        /// Use smaller read and write buffers
        #[arg(long)]
        low_memory: bool,

        /// Print merge statistics to stderr
        #[arg(long)]
        stats: bool,
    },

    /// Check that an evidence file is sorted by its sequence dictionary
    CheckSorted {
        /// Input evidence file (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Sequence dictionary that overrides the file header
        #[arg(long)]
        sequence_dictionary: Option<PathBuf>,

        /// Use smaller read buffers
        #[arg(long)]
        low_memory: bool,
    },

    /// Generate a synthetic sorted evidence file
    Generate {
        /// Output evidence file; the suffix must match --kind
        #[arg(short, long)]
        output: PathBuf,

        /// Evidence kind: baf, sr, ld or rd
        #[arg(long, default_value = "baf")]
        kind: String,

        /// Number of loci to draw (e.g. 10K, 1M)
        #[arg(long, default_value = "100K")]
        loci: String,

        /// Number of samples
        #[arg(long, default_value_t = 10)]
        samples: usize,

        /// Random seed for reproducibility
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Bin width for read-depth evidence
        #[arg(long, default_value_t = 1000)]
        bin_size: u64,

        /// Fraction of sample values left missing
        #[arg(long, default_value_t = 0.1)]
        missing_rate: f64,

        /// Gzip compression level for .gz output (0-9)
        #[arg(long, default_value_t = DEFAULT_COMPRESSION_LEVEL)]
        compression_level: u32,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("svmerge=debug,info")
    } else {
        EnvFilter::new("svmerge=warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    config::set_strict_lengths(cli.strict_lengths);

    let result = match cli.command {
        Commands::Merge {
            inputs,
            output,
            sample_names,
            sequence_dictionary,
            compression_level,
            low_memory,
            stats,
        } => run_merge(
            inputs,
            output,
            sample_names,
            sequence_dictionary,
            compression_level,
            low_memory,
            stats,
        ),
        Commands::CheckSorted {
            input,
            sequence_dictionary,
            low_memory,
        } => run_check_sorted(input, sequence_dictionary, low_memory),
        Commands::Generate {
            output,
            kind,
            loci,
            samples,
            seed,
            bin_size,
            missing_rate,
            compression_level,
        } => run_generate(
            output,
            kind,
            loci,
            samples,
            seed,
            bin_size,
            missing_rate,
            compression_level,
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_merge(
    inputs: Vec<PathBuf>,
    output: PathBuf,
    sample_names: Vec<String>,
    sequence_dictionary: Option<PathBuf>,
    compression_level: u32,
    low_memory: bool,
    stats: bool,
) -> Result<(), EvidenceError> {
    let mut cmd = MergeEvidenceCommand::new()
        .with_samples(expand_sample_args(&sample_names)?)
        .with_compression_level(compression_level)
        .with_low_memory(low_memory);
    if let Some(path) = sequence_dictionary {
        cmd = cmd.with_dictionary(SequenceDictionary::from_file(path)?);
    }

    let result = cmd.run(&inputs, &output)?;
    if stats {
        eprintln!("Merge stats: {}", result);
    }
    Ok(())
}

fn run_check_sorted(
    input: PathBuf,
    sequence_dictionary: Option<PathBuf>,
    low_memory: bool,
) -> Result<(), EvidenceError> {
    let mut cmd = CheckSortedCommand::new().with_low_memory(low_memory);
    if let Some(path) = sequence_dictionary {
        cmd = cmd.with_dictionary(SequenceDictionary::from_file(path)?);
    }

    let records = cmd.run(&input)?;
    eprintln!("{}: {} records in dictionary order", input.display(), records);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_generate(
    output: PathBuf,
    kind: String,
    loci: String,
    samples: usize,
    seed: u64,
    bin_size: u64,
    missing_rate: f64,
    compression_level: u32,
) -> Result<(), EvidenceError> {
    let kind = EvidenceKind::from_str(&kind).ok_or_else(|| {
        EvidenceError::InvalidConfig(format!(
            "Invalid kind '{}'. Use: baf, sr, ld, rd",
            kind
        ))
    })?;
    let loci = SizeSpec::from_str(loci.trim()).ok_or_else(|| {
        EvidenceError::InvalidConfig(format!(
            "Invalid loci count '{}'. Use formats like 1K, 5M, 100",
            loci
        ))
    })?;

    let config = GenerateConfig {
        output,
        kind,
        loci: loci.count,
        samples,
        seed,
        bin_size,
        missing_rate,
        compression_level,
    };

    let stats = GenerateCommand::new(config).run()?;
    eprintln!("Generated: {}", stats);
    Ok(())
}
