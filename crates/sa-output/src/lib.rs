//! `sa-output` — engine output writers for the shout-ahead signal control
//! framework.
//!
//! | Backend | Files created                        |
//! |---------|--------------------------------------|
//! | CSV     | `decisions.csv`, `individuals.csv`   |
//!
//! Backends implement [`OutputWriter`] and are driven by
//! [`EngineOutputObserver`], which implements `sa_sim::EngineObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sa_output::{CsvWriter, EngineOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output")).unwrap();
//! let mut obs = EngineOutputObserver::new(writer);
//! experiment.run(make_sim, &mut obs)?;
//! obs.finish()?;
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::EngineOutputObserver;
pub use row::{DecisionRow, IndividualRow};
pub use writer::OutputWriter;
