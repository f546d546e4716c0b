//! The `OutputWriter` trait implemented by backend writers.

use crate::{DecisionRow, IndividualRow, OutputResult};

/// Trait implemented by output backends.
///
/// Errors are stored by [`EngineOutputObserver`][crate::EngineOutputObserver]
/// and retrieved with its `take_error`.
pub trait OutputWriter {
    fn write_decision(&mut self, row: &DecisionRow) -> OutputResult<()>;

    /// Write the statistics of every individual after one run.
    fn write_individuals(&mut self, rows: &[IndividualRow]) -> OutputResult<()>;

    /// Push buffered rows to the underlying files.
    fn flush(&mut self) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
