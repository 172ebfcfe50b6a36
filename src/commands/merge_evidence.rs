//! Merge sorted evidence files into one sorted, de-duplicated file.
//!
//! # Algorithm
//!
//! 1. Read every input header and reconcile the sequence dictionaries
//! 2. Collect the samples to extract (explicit list or union of headers)
//! 3. K-way merge the records in dictionary order
//! 4. Narrow each record to the chosen samples
//! 5. Resolve same-locus groups and write the result
//!
//! # Memory Complexity
//!
//! O(k) for k inputs, plus the largest same-locus group.
//!
//! # Requirements
//!
//! Every input MUST be sorted by its dictionary, then by start and end.

use std::io::BufRead;
use std::path::Path;
use std::time::Instant;

use tracing::info;

use crate::config::{IoBuffers, DEFAULT_COMPRESSION_LEVEL, MAX_COMPRESSION_LEVEL};
use crate::dictionary::SequenceDictionary;
use crate::error::{EvidenceError, Result};
use crate::evidence::{
    BafEvidence, DepthEvidence, Evidence, EvidenceKind, LocusDepth, SplitReadEvidence,
};
use crate::reader::{open_evidence, EvidenceReader};
use crate::reconcile::plan_merge;
use crate::streaming::merge::{MergedRecord, MergingIterator};
use crate::streaming::output::{EvidenceWriter, FinishWrite, OutputStream};
use crate::streaming::resolve::SameLocusResolver;
use crate::streaming::sink::FeatureSink;
use crate::streaming::source::SourceAdapter;

/// Merge command configuration.
#[derive(Debug, Clone)]
pub struct MergeEvidenceCommand {
    /// Samples to extract, in output order. Empty means every header sample.
    pub samples: Vec<String>,
    /// Dictionary considered before any source's own.
    pub dictionary: Option<SequenceDictionary>,
    /// gzip level for `.gz` outputs (0-9).
    pub compression_level: u32,
    /// Use smaller I/O buffers.
    pub low_memory: bool,
}

impl Default for MergeEvidenceCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl MergeEvidenceCommand {
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
            dictionary: None,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            low_memory: false,
        }
    }

    /// Restrict output to these samples.
    pub fn with_samples(mut self, samples: Vec<String>) -> Self {
        self.samples = samples;
        self
    }

    /// Supply a dictionary up front.
    pub fn with_dictionary(mut self, dictionary: SequenceDictionary) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level;
        self
    }

    pub fn with_low_memory(mut self, low_memory: bool) -> Self {
        self.low_memory = low_memory;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.compression_level > MAX_COMPRESSION_LEVEL {
            return Err(EvidenceError::InvalidConfig(format!(
                "Compression level {} is out of range (0-{})",
                self.compression_level, MAX_COMPRESSION_LEVEL
            )));
        }
        Ok(())
    }

    /// Merge `inputs` into `output`.
    ///
    /// The evidence kind is taken from the output path; every input must be
    /// of the same kind.
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(&self, inputs: &[P], output: Q) -> Result<MergeStats> {
        self.validate()?;
        if inputs.is_empty() {
            return Err(EvidenceError::InvalidConfig("No input files given".to_string()));
        }

        let output = output.as_ref();
        let kind = EvidenceKind::from_path(output).ok_or_else(|| {
            EvidenceError::InvalidConfig(format!(
                "Cannot tell the evidence kind of output {}: expected a name ending in .baf.txt, .sr.txt, .ld.txt or .rd.txt (optionally .gz)",
                output.display()
            ))
        })?;

        match kind {
            EvidenceKind::Baf => self.run_kind::<BafEvidence, _>(inputs, output),
            EvidenceKind::SplitRead => self.run_kind::<SplitReadEvidence, _>(inputs, output),
            EvidenceKind::LocusDepth => self.run_kind::<LocusDepth, _>(inputs, output),
            EvidenceKind::Depth => self.run_kind::<DepthEvidence, _>(inputs, output),
        }
    }

    fn run_kind<E: Evidence, P: AsRef<Path>>(&self, inputs: &[P], output: &Path) -> Result<MergeStats> {
        let start = Instant::now();
        info!(kind = %E::KIND, inputs = inputs.len(), output = %output.display(), "Merging evidence");

        let readers = inputs
            .iter()
            .map(|path| open_evidence::<E, _>(path, self.low_memory))
            .collect::<Result<Vec<_>>>()?;

        let stream = OutputStream::create(output, self.compression_level)?;
        let mut writer = EvidenceWriter::with_capacity(IoBuffers::for_mode(self.low_memory).output, stream);

        let mut stats = self.merge_streams(readers, &mut writer)?;
        stats.elapsed_secs = start.elapsed().as_secs_f64();
        Ok(stats)
    }

    /// Core merge: reconcile, merge, extract samples, resolve, write.
    ///
    /// Writes the header and every record to `writer`, then closes it.
    pub fn merge_streams<E, R, W>(
        &self,
        readers: Vec<EvidenceReader<R, E>>,
        writer: &mut EvidenceWriter<W>,
    ) -> Result<MergeStats>
    where
        E: Evidence,
        R: BufRead,
        W: FinishWrite,
    {
        let (metadata, streams): (Vec<_>, Vec<_>) =
            readers.into_iter().map(EvidenceReader::split).unzip();
        let plan = plan_merge(self.dictionary.as_ref(), &metadata, &self.samples)?;

        let sources = metadata
            .into_iter()
            .zip(streams)
            .map(|(meta, records)| SourceAdapter::new(records, &plan.dictionary, meta))
            .collect::<Result<Vec<_>>>()?;

        let header_samples = plan.samples.as_ref().map_or(&[][..], |s| s.names());
        writer.write_header(&plan.dictionary, header_samples)?;

        let mut merge = MergingIterator::new(&plan.dictionary, sources)?;
        let mut resolver: SameLocusResolver<E, _> = SameLocusResolver::new(&plan.dictionary, writer);
        let mut stats = MergeStats {
            sources: merge.source_count(),
            contigs: plan.dictionary.len(),
            samples: header_samples.len(),
            ..Default::default()
        };

        while merge.has_next() {
            let MergedRecord { record, source } = merge.next_entry()?;
            stats.records_read += 1;

            let record = match &plan.samples {
                Some(filter) => match record.extract_samples(filter, merge.metadata(source))? {
                    Some(record) => record,
                    None => {
                        stats.records_dropped += 1;
                        continue;
                    }
                },
                None => record,
            };
            resolver.write(record)?;
        }
        resolver.close()?;

        let resolved = resolver.stats();
        stats.records_written = resolved.records_out;
        stats.loci = resolved.groups;
        info!(
            read = stats.records_read,
            written = stats.records_written,
            dropped = stats.records_dropped,
            "Merge complete"
        );
        Ok(stats)
    }
}

/// Statistics from a merge.
#[derive(Debug, Default, Clone)]
pub struct MergeStats {
    pub sources: usize,
    pub contigs: usize,
    pub samples: usize,
    pub records_read: u64,
    pub records_dropped: u64,
    pub records_written: u64,
    pub loci: u64,
    pub elapsed_secs: f64,
}

impl std::fmt::Display for MergeStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} records from {} sources -> {} records at {} loci ({} dropped, {} samples, {} contigs, {:.1}s)",
            self.records_read,
            self.sources,
            self.records_written,
            self.loci,
            self.records_dropped,
            self.samples,
            self.contigs,
            self.elapsed_secs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn reader<E: Evidence>(name: &str, text: &'static str) -> EvidenceReader<&'static [u8], E> {
        EvidenceReader::new(text.as_bytes(), name).unwrap()
    }

    fn merge<E: Evidence>(cmd: &MergeEvidenceCommand, inputs: Vec<EvidenceReader<&'static [u8], E>>) -> Result<String> {
        let mut writer = EvidenceWriter::new(Vec::new());
        cmd.merge_streams(inputs, &mut writer)?;
        Ok(String::from_utf8(writer.get_ref().clone()).unwrap())
    }

    #[test]
    #[serial]
    fn test_merge_baf_orders_samples_at_locus() {
        let a = reader::<BafEvidence>("a", "@SQ\tSN:chr1\tLN:1000\n@SM\tS2\nchr1\t100\t0.7\tS2\n");
        let b = reader::<BafEvidence>("b", "@SM\tS1\nchr1\t100\t0.3\tS1\nchr1\t200\t0.5\tS1\n");

        let out = merge(&MergeEvidenceCommand::new(), vec![a, b]).unwrap();
        assert_eq!(
            out,
            "@SQ\tSN:chr1\tLN:1000\n@SM\tS1\tS2\n\
             chr1\t100\t0.3\tS1\n\
             chr1\t100\t0.7\tS2\n\
             chr1\t200\t0.5\tS1\n"
        );
    }

    #[test]
    #[serial]
    fn test_merge_depth_unions_samples() {
        let a = reader::<DepthEvidence>(
            "a",
            "@SQ\tSN:chr1\tLN:1000\n@SM\tS1\nchr1\t100\t200\t5\nchr1\t201\t300\t6\n",
        );
        let b = reader::<DepthEvidence>("b", "@SM\tS2\nchr1\t100\t200\t9\n");

        let out = merge(&MergeEvidenceCommand::new(), vec![a, b]).unwrap();
        assert_eq!(
            out,
            "@SQ\tSN:chr1\tLN:1000\n@SM\tS1\tS2\n\
             chr1\t100\t200\t5\t9\n\
             chr1\t201\t300\t6\t.\n"
        );
    }

    #[test]
    #[serial]
    fn test_explicit_samples_filter_records() {
        let a = reader::<BafEvidence>(
            "a",
            "@SQ\tSN:chr1\tLN:1000\nchr1\t100\t0.3\tS1\nchr1\t100\t0.4\tS2\n",
        );
        let cmd = MergeEvidenceCommand::new().with_samples(vec!["S2".to_string()]);

        let mut writer = EvidenceWriter::new(Vec::new());
        let stats = cmd.merge_streams(vec![a], &mut writer).unwrap();
        assert_eq!(stats.records_read, 2);
        assert_eq!(stats.records_dropped, 1);
        assert_eq!(stats.records_written, 1);
        let out = String::from_utf8(writer.get_ref().clone()).unwrap();
        assert!(out.ends_with("chr1\t100\t0.4\tS2\n"));
    }

    #[test]
    #[serial]
    fn test_merge_without_dictionary_fails() {
        let a = reader::<BafEvidence>("a", "chr1\t100\t0.3\tS1\n");
        let err = merge(&MergeEvidenceCommand::new(), vec![a]).unwrap_err();
        assert!(matches!(err, EvidenceError::MissingDictionary));

        let a = reader::<BafEvidence>("a", "chr1\t100\t0.3\tS1\n");
        let cmd = MergeEvidenceCommand::new()
            .with_dictionary(SequenceDictionary::from_pairs([("chr1", 1000u64)]));
        assert!(merge(&cmd, vec![a]).is_ok());
    }

    #[test]
    #[serial]
    fn test_duplicate_across_sources_fails() {
        let a = reader::<BafEvidence>("a", "@SQ\tSN:chr1\tLN:1000\nchr1\t100\t0.3\tS1\n");
        let b = reader::<BafEvidence>("b", "chr1\t100\t0.3\tS1\n");
        let err = merge(&MergeEvidenceCommand::new(), vec![a, b]).unwrap_err();
        assert!(matches!(err, EvidenceError::DuplicateLocusRecord { .. }));
    }

    #[test]
    #[serial]
    fn test_subset_dictionary_reconciles() {
        let a = reader::<BafEvidence>(
            "a",
            "@SQ\tSN:chr20\tLN:100\n@SQ\tSN:chr21\tLN:100\nchr21\t5\t0.1\tS1\n",
        );
        let b = reader::<BafEvidence>(
            "b",
            "@SQ\tSN:chr9\tLN:100\n@SQ\tSN:chr20\tLN:100\n@SQ\tSN:chr21\tLN:100\nchr9\t7\t0.2\tS1\n",
        );
        let out = merge(&MergeEvidenceCommand::new(), vec![a, b]).unwrap();
        let body: Vec<_> = out.lines().filter(|l| !l.starts_with('@')).collect();
        assert_eq!(body, vec!["chr9\t7\t0.2\tS1", "chr21\t5\t0.1\tS1"]);
    }

    #[test]
    fn test_validate_compression_level() {
        assert!(MergeEvidenceCommand::new().validate().is_ok());
        let cmd = MergeEvidenceCommand::new().with_compression_level(10);
        assert!(matches!(cmd.validate(), Err(EvidenceError::InvalidConfig(_))));
    }
}
