//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `decisions.csv`
//! - `individuals.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::{DecisionRow, IndividualRow, OutputResult};
use crate::writer::OutputWriter;

pub const DECISION_HEADERS: [&str; 9] =
    ["run", "tick", "time", "turn", "light", "source", "rule", "phase", "tie_break"];

pub const INDIVIDUAL_HEADERS: [&str; 10] = [
    "run",
    "pool",
    "generation",
    "individual",
    "selected_count",
    "fitness",
    "normalized_fitness",
    "aggregate_vehicle_wait_time",
    "last_run_time",
    "penalty_rate",
];

/// Empty cell for an absent value.
fn opt(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Writes engine output to two CSV files.
pub struct CsvWriter {
    decisions:   Writer<File>,
    individuals: Writer<File>,
    finished:    bool,
}

impl CsvWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;

        let mut decisions = Writer::from_path(dir.join("decisions.csv"))?;
        decisions.write_record(DECISION_HEADERS)?;

        let mut individuals = Writer::from_path(dir.join("individuals.csv"))?;
        individuals.write_record(INDIVIDUAL_HEADERS)?;

        Ok(Self { decisions, individuals, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_decision(&mut self, row: &DecisionRow) -> OutputResult<()> {
        self.decisions.write_record(&[
            row.run.to_string(),
            row.tick.to_string(),
            row.time.to_string(),
            row.turn.to_string(),
            row.light.clone(),
            row.source.clone(),
            opt(row.rule),
            opt(row.phase),
            (row.tie_break as u8).to_string(),
        ])?;
        Ok(())
    }

    fn write_individuals(&mut self, rows: &[IndividualRow]) -> OutputResult<()> {
        for row in rows {
            self.individuals.write_record(&[
                row.run.to_string(),
                row.pool.to_string(),
                row.generation.to_string(),
                row.individual.to_string(),
                row.selected_count.to_string(),
                row.fitness.to_string(),
                row.normalized_fitness.to_string(),
                row.aggregate_vehicle_wait_time.to_string(),
                row.last_run_time.to_string(),
                row.penalty_rate.to_string(),
            ])?;
        }
        Ok(())
    }

    fn flush(&mut self) -> OutputResult<()> {
        self.decisions.flush()?;
        self.individuals.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.flush()
    }
}
