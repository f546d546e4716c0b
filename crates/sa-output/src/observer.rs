//! `EngineOutputObserver<W>` — bridges `EngineObserver` to an `OutputWriter`.

use tracing::warn;

use sa_agent::AgentStore;
use sa_learning::AgentPool;
use sa_sim::{DecisionRecord, EngineObserver, RunReport};

use crate::row::{DecisionRow, IndividualRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// An [`EngineObserver`] that writes every decision and, after each run,
/// the statistics of every individual to any [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `EngineObserver`
/// methods have no return value.  After the engine returns, check for errors
/// with [`take_error`][Self::take_error].
pub struct EngineOutputObserver<W: OutputWriter> {
    writer:     W,
    run:        u64,
    /// Light names by `AgentId`, captured at run start.
    names:      Vec<String>,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> EngineOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, run: 0, names: Vec::new(), last_error: None }
    }

    /// Take the stored write error (if any).
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Flush and close the writer.
    pub fn finish(&mut self) -> OutputResult<()> {
        self.writer.finish()
    }

    /// Unwrap the inner writer (e.g. to inspect files after training).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            warn!(error = %e, "output write failed");
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> EngineObserver for EngineOutputObserver<W> {
    fn on_run_start(&mut self, run: u64, agents: &AgentStore) {
        self.run = run;
        self.names = agents.iter().map(|l| l.name().to_owned()).collect();
    }

    fn on_decision(&mut self, record: &DecisionRecord) {
        let row = DecisionRow {
            run:       self.run,
            tick:      record.tick.0,
            time:      record.time,
            turn:      record.turn.0,
            light:     self
                .names
                .get(record.agent.index())
                .cloned()
                .unwrap_or_else(|| record.agent.to_string()),
            source:    record.source.to_string(),
            rule:      record.rule.map(|r| r.0),
            phase:     record.phase,
            tie_break: record.tie_break,
        };
        let result = self.writer.write_decision(&row);
        self.store_err(result);
    }

    fn on_run_end(&mut self, report: &RunReport, _agents: &AgentStore, pools: &[AgentPool]) {
        let rows: Vec<IndividualRow> = pools
            .iter()
            .flat_map(|pool| {
                pool.individuals().iter().map(move |ind| IndividualRow {
                    run:                         report.run,
                    pool:                        pool.id().0,
                    generation:                  pool.generation(),
                    individual:                  ind.id().0,
                    selected_count:              ind.selected_count(),
                    fitness:                     ind.fitness(),
                    normalized_fitness:          ind.normalized_fitness(),
                    aggregate_vehicle_wait_time: ind.aggregate_vehicle_wait_time(),
                    last_run_time:               ind.last_run_time(),
                    penalty_rate:                ind.penalty().rate(),
                })
            })
            .collect();

        let result = self.writer.write_individuals(&rows);
        self.store_err(result);
        let result = self.writer.flush();
        self.store_err(result);
    }
}
