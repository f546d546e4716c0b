//! Integration tests for sa-output.

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use crate::csv::{CsvWriter, DECISION_HEADERS, INDIVIDUAL_HEADERS};
    use crate::row::{DecisionRow, IndividualRow};
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn decision_row(tick: u64, rule: Option<u32>) -> DecisionRow {
        DecisionRow {
            run: 0,
            tick,
            time: tick as f64,
            turn: tick,
            light: "A".into(),
            source: "rs".into(),
            rule,
            phase: rule,
            tie_break: false,
        }
    }

    fn individual_row(individual: u32) -> IndividualRow {
        IndividualRow {
            run: 2,
            pool: 0,
            generation: 1,
            individual,
            selected_count: 3,
            fitness: -120.5,
            normalized_fitness: 1.0,
            aggregate_vehicle_wait_time: 14.0,
            last_run_time: 120.0,
            penalty_rate: 0.25,
        }
    }

    fn headers(dir: &TempDir, file: &str) -> Vec<String> {
        let mut rdr = csv::Reader::from_path(dir.path().join(file)).unwrap();
        rdr.headers().unwrap().iter().map(str::to_owned).collect()
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("decisions.csv").exists());
        assert!(dir.path().join("individuals.csv").exists());
    }

    #[test]
    fn csv_creates_missing_directory() {
        let dir = tmp();
        let nested = dir.path().join("out").join("run1");
        let mut w = CsvWriter::new(&nested).unwrap();
        w.finish().unwrap();
        assert!(nested.join("decisions.csv").exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        assert_eq!(headers(&dir, "decisions.csv"), DECISION_HEADERS);
        assert_eq!(headers(&dir, "individuals.csv"), INDIVIDUAL_HEADERS);
    }

    #[test]
    fn absent_rule_and_phase_are_empty_cells() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_decision(&decision_row(5, Some(7))).unwrap();
        w.write_decision(&decision_row(6, None)).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("decisions.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], "5"); // tick
        assert_eq!(&rows[0][4], "A"); // light
        assert_eq!(&rows[0][6], "7"); // rule
        assert_eq!(&rows[1][6], "");
        assert_eq!(&rows[1][7], "");
        assert_eq!(&rows[1][8], "0"); // tie_break
    }

    #[test]
    fn individual_rows_written() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_individuals(&[individual_row(0), individual_row(1)]).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("individuals.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[1][3], "1");      // individual
        assert_eq!(&rows[0][5], "-120.5"); // fitness
        assert_eq!(&rows[0][9], "0.25");   // penalty_rate
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap(); // second call should not panic
    }

    #[test]
    fn csv_empty_batch_ok() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_individuals(&[]).unwrap();
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use sa_agent::{AgentStoreBuilder, Phase};
    use sa_core::{EngineConfig, IndividualId, PoolId, RuleId};
    use sa_learning::{AgentPool, Individual};
    use sa_rules::{Action, Comparison, PredicateRegistry, Rule};
    use sa_sim::{EngineBuilder, ScriptedPhase, ScriptedSimulator};

    use crate::csv::CsvWriter;
    use crate::observer::EngineOutputObserver;

    #[test]
    fn integration_csv() {
        let mut b = AgentStoreBuilder::new(1);
        let a = b.add_light(
            "A",
            ["A_0", "A_1"],
            ["NS_S_G", "NS_S_Y", "EW_S_G", "EW_S_Y"].into_iter().map(Phase::new),
        );
        let (store, _) = b.build().unwrap();

        let mut registry = PredicateRegistry::standard();
        registry.register_threshold("timeSpentInCurrentPhase_ge0", Comparison::Ge, 0.0).unwrap();
        let individuals = (0..2)
            .map(|i| {
                Individual::new(
                    IndividualId(i),
                    vec![Rule::individual(RuleId(0), ["timeSpentInCurrentPhase_ge0"], Action::Phase(2), 1.0)],
                    vec![],
                )
                .unwrap()
            })
            .collect();
        let mut pool = AgentPool::new(PoolId(0), individuals).unwrap();
        pool.add_agent(a);

        let config = EngineConfig { reevaluation_interval: 2, seed: 1, ..EngineConfig::default() };
        let mut engine = EngineBuilder::new(config, store, vec![pool]).registry(registry).build().unwrap();

        let mut sim = ScriptedSimulator::new();
        sim.add_light(
            "A",
            vec![
                ScriptedPhase::new("NS_S_G", 100.0, ["A_1"]),
                ScriptedPhase::new("NS_S_Y", 5.0, Vec::<String>::new()),
                ScriptedPhase::new("EW_S_G", 100.0, ["A_0"]),
                ScriptedPhase::new("EW_S_Y", 5.0, Vec::<String>::new()),
            ],
        )
        .unwrap();
        sim.place_stopped("v1", "A_1", 0.0);

        let dir = tempfile::tempdir().unwrap();
        let writer = CsvWriter::new(dir.path()).unwrap();
        let mut obs = EngineOutputObserver::new(writer);
        let report = engine.run_with_budget(&mut sim, 4.0, &mut obs).unwrap();
        obs.finish().unwrap();
        assert!(obs.take_error().is_none(), "no write errors expected");

        // Initial decision plus reevaluations on ticks 0 and 2.
        let mut rdr = csv::Reader::from_path(dir.path().join("decisions.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len() as u64, report.decisions.total());
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| &r[4] == "A" && &r[5] == "rs"));

        let mut rdr = csv::Reader::from_path(dir.path().join("individuals.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2, "one row per individual in the pool");
    }
}
