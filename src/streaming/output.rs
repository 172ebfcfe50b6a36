//! Evidence output: header plus one tab-delimited line per record.
//!
//! Uses itoa for integer formatting and ryu for float formatting
//! to avoid allocation in the hot path.

use std::fs::File;
use std::io::{self, BufWriter, Stdout, Write};
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::config::IoBuffers;
use crate::dictionary::SequenceDictionary;
use crate::error::{EvidenceError, Result};
use crate::evidence::Evidence;
use crate::streaming::sink::FeatureSink;

/// A byte stream that may need an explicit end-of-stream step.
pub trait FinishWrite: Write {
    /// Flush everything, including any compression trailer.
    fn finish_stream(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl FinishWrite for Vec<u8> {}
impl FinishWrite for File {}
impl FinishWrite for Stdout {}

/// Output destination chosen from the output path.
pub enum OutputStream {
    Plain(File),
    Gzip(GzEncoder<File>),
    Stdout(Stdout),
}

impl OutputStream {
    /// Create `path`, gzip-compressing when it ends in `.gz`.
    /// A path of `-` writes to stdout.
    pub fn create<P: AsRef<Path>>(path: P, compression_level: u32) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str() == "-" {
            return Ok(Self::Stdout(io::stdout()));
        }
        let file = File::create(path)?;
        if path.extension().is_some_and(|ext| ext == "gz") {
            Ok(Self::Gzip(GzEncoder::new(
                file,
                Compression::new(compression_level),
            )))
        } else {
            Ok(Self::Plain(file))
        }
    }
}

impl Write for OutputStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(f) => f.write(buf),
            Self::Gzip(gz) => gz.write(buf),
            Self::Stdout(out) => out.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(f) => f.flush(),
            Self::Gzip(gz) => gz.flush(),
            Self::Stdout(out) => out.flush(),
        }
    }
}

impl FinishWrite for OutputStream {
    fn finish_stream(&mut self) -> io::Result<()> {
        match self {
            Self::Gzip(gz) => gz.try_finish(),
            other => other.flush(),
        }
    }
}

/// Buffered evidence writer.
///
/// Records encode themselves field by field through the `write_*` methods;
/// the writer appends the line terminator.
pub struct EvidenceWriter<W: Write> {
    writer: BufWriter<W>,
    itoa_buf: itoa::Buffer,
    ryu_buf: ryu::Buffer,
    closed: bool,
}

impl<W: Write> EvidenceWriter<W> {
    /// Create a new EvidenceWriter with the default buffer.
    pub fn new(output: W) -> Self {
        Self::with_capacity(IoBuffers::DEFAULT.output, output)
    }

    /// Create a new EvidenceWriter with specified buffer size.
    pub fn with_capacity(capacity: usize, output: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(capacity, output),
            itoa_buf: itoa::Buffer::new(),
            ryu_buf: ryu::Buffer::new(),
            closed: false,
        }
    }

    /// Write the `@SQ` and `@SM` header block.
    pub fn write_header(
        &mut self,
        dictionary: &SequenceDictionary,
        samples: &[String],
    ) -> Result<()> {
        for contig in dictionary.contigs() {
            self.write_str("@SQ\tSN:")?;
            self.write_str(&contig.name)?;
            self.write_str("\tLN:")?;
            self.write_int(contig.length)?;
            self.write_newline()?;
        }
        if !samples.is_empty() {
            self.write_str("@SM")?;
            for sample in samples {
                self.write_tab()?;
                self.write_str(sample)?;
            }
            self.write_newline()?;
        }
        Ok(())
    }

    #[inline]
    pub fn write_str(&mut self, s: &str) -> Result<()> {
        self.writer.write_all(s.as_bytes()).map_err(EvidenceError::Io)
    }

    #[inline]
    pub fn write_tab(&mut self) -> Result<()> {
        self.writer.write_all(b"\t").map_err(EvidenceError::Io)
    }

    #[inline]
    pub fn write_newline(&mut self) -> Result<()> {
        self.writer.write_all(b"\n").map_err(EvidenceError::Io)
    }

    /// Write an integer using itoa.
    #[inline]
    pub fn write_int<I: itoa::Integer>(&mut self, n: I) -> Result<()> {
        self.writer
            .write_all(self.itoa_buf.format(n).as_bytes())
            .map_err(EvidenceError::Io)
    }

    /// Write a float using ryu.
    #[inline]
    pub fn write_float(&mut self, f: f64) -> Result<()> {
        self.writer
            .write_all(self.ryu_buf.format(f).as_bytes())
            .map_err(EvidenceError::Io)
    }

    /// Write a count, or `.` when missing.
    #[inline]
    pub fn write_optional_count(&mut self, count: Option<u32>) -> Result<()> {
        match count {
            Some(n) => self.write_int(n),
            None => self.write_str("."),
        }
    }

    /// Flush the output buffer.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(EvidenceError::Io)
    }

    /// Get a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        self.writer.get_ref()
    }
}

impl<R: Evidence, W: FinishWrite> FeatureSink<R> for EvidenceWriter<W> {
    fn write(&mut self, record: R) -> Result<()> {
        if self.closed {
            return Err(EvidenceError::SinkClosed);
        }
        record.encode(self)?;
        self.write_newline()
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(EvidenceError::SinkClosed);
        }
        self.closed = true;
        self.flush()?;
        self.writer.get_mut().finish_stream()?;
        Ok(())
    }
}
