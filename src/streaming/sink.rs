//! The record sink interface at the end of every pipeline.

use crate::error::Result;

/// Accepts one record at a time, then a single close.
///
/// `write` may be called any number of times before `close`; a sink must
/// not be used after it is closed.
pub trait FeatureSink<R> {
    fn write(&mut self, record: R) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}

/// Collecting sink, mostly useful in tests and for in-memory pipelines.
impl<R> FeatureSink<R> for Vec<R> {
    fn write(&mut self, record: R) -> Result<()> {
        self.push(record);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<R, S: FeatureSink<R> + ?Sized> FeatureSink<R> for &mut S {
    fn write(&mut self, record: R) -> Result<()> {
        (**self).write(record)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}
