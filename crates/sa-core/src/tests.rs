//! Unit tests for sa-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentId, PoolId, RuleId, Turn};

    #[test]
    fn index_roundtrip() {
        let id = AgentId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(AgentId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(AgentId::INVALID.0, u32::MAX);
        assert_eq!(PoolId::INVALID.0, u32::MAX);
        assert_eq!(RuleId::INVALID.0, u32::MAX);
        assert_eq!(Turn::INVALID.0, u64::MAX);
    }

    #[test]
    fn turn_next() {
        assert_eq!(Turn::FIRST.next(), Turn(1));
        assert!(Turn(3) > Turn(2));
    }

    #[test]
    fn display() {
        assert_eq!(AgentId(7).to_string(), "AgentId(7)");
        assert_eq!(Turn(2).to_string(), "Turn(2)");
    }
}

#[cfg(test)]
mod time {
    use crate::{SimClock, Tick};

    #[test]
    fn tick_arithmetic() {
        let t = Tick(10);
        assert_eq!(t + 5, Tick(15));
        assert_eq!(t.offset(3), Tick(13));
        assert_eq!(Tick(15) - Tick(10), 5u64);
    }

    #[test]
    fn multiple_of_zero_interval_never_matches() {
        assert!(!Tick(0).is_multiple_of(0));
        assert!(Tick(0).is_multiple_of(5));
        assert!(Tick(10).is_multiple_of(5));
        assert!(!Tick(11).is_multiple_of(5));
    }

    #[test]
    fn reevaluation_every_five_steps() {
        let mut clock = SimClock::new(5);
        let mut hits = Vec::new();
        for _ in 0..12 {
            if clock.is_reevaluation_tick() {
                hits.push(clock.current_tick);
            }
            clock.advance();
        }
        assert_eq!(hits, vec![Tick(0), Tick(5), Tick(10)]);
    }

    #[test]
    fn steps_until_reevaluation() {
        let mut clock = SimClock::new(5);
        assert_eq!(clock.steps_until_reevaluation(), 0);
        clock.advance();
        assert_eq!(clock.steps_until_reevaluation(), 4);
        for _ in 0..4 {
            clock.advance();
        }
        assert_eq!(clock.steps_until_reevaluation(), 0);
    }
}

#[cfg(test)]
mod config {
    use crate::{EngineConfig, GenerationSchedule, IntentionRetention};

    #[test]
    fn defaults_match_training_setup() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.p_coop, 0.5);
        assert_eq!(cfg.reevaluation_interval, 5);
        assert_eq!(cfg.max_green_phase_time, 225.0);
        assert_eq!(cfg.max_yellow_phase_time, 5.0);
        assert_eq!(cfg.max_simulation_time, 10_000.0);
        assert_eq!(cfg.intention_retention, IntentionRetention::Unbounded);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_bad_probability() {
        let cfg = EngineConfig { p_coop: 1.5, ..EngineConfig::default() };
        assert!(cfg.validate().is_err());
        let cfg = EngineConfig { p_coop: -0.1, ..EngineConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_zero_interval_and_zero_cap() {
        let cfg = EngineConfig { reevaluation_interval: 0, ..EngineConfig::default() };
        assert!(cfg.validate().is_err());
        let cfg = EngineConfig {
            intention_retention: IntentionRetention::Capped(0),
            ..EngineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn retention_caps() {
        assert_eq!(IntentionRetention::Unbounded.cap(), None);
        assert_eq!(IntentionRetention::Latest.cap(), None);
        assert_eq!(IntentionRetention::Capped(4).cap(), Some(4));
    }

    #[test]
    fn run_budget_shrinks_with_generation() {
        let schedule = GenerationSchedule::default();
        assert_eq!(schedule.max_simulation_time(1, 1.0), 10_000.0);
        assert_eq!(schedule.max_simulation_time(4, 1.0), 10_000.0);
        assert_eq!(schedule.max_simulation_time(5, 1.0), 6_000.0);
        assert_eq!(schedule.max_simulation_time(14, 1.0), 6_000.0);
        assert_eq!(schedule.max_simulation_time(15, 1.0), 4_000.0);
        assert_eq!(schedule.max_simulation_time(50, 1.0), 4_000.0);
    }

    #[test]
    fn run_budget_falls_back_to_default() {
        let schedule = GenerationSchedule { run_time_steps: vec![], ..GenerationSchedule::default() };
        assert_eq!(schedule.max_simulation_time(3, 123.0), 123.0);
    }

    #[test]
    fn final_generation() {
        let schedule = GenerationSchedule { total_generations: 3, ..GenerationSchedule::default() };
        assert!(!schedule.is_final(1));
        assert!(schedule.is_final(2));
        assert!(schedule.is_final(3));
    }

    #[test]
    fn unsorted_steps_rejected() {
        let schedule = GenerationSchedule {
            run_time_steps: vec![(5, 1.0), (1, 2.0)],
            ..GenerationSchedule::default()
        };
        assert!(schedule.validate().is_err());
    }
}

#[cfg(test)]
mod rng {
    use crate::{AgentId, AgentRng, SimRng};

    #[test]
    fn deterministic_same_seed() {
        let mut r1 = AgentRng::new(12345, AgentId(0));
        let mut r2 = AgentRng::new(12345, AgentId(0));
        for _ in 0..100 {
            let a: f64 = r1.random();
            let b: f64 = r2.random();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn different_agents_differ() {
        let mut r0 = AgentRng::new(1, AgentId(0));
        let mut r1 = AgentRng::new(1, AgentId(1));
        let a: u64 = r0.random();
        let b: u64 = r1.random();
        assert_ne!(a, b, "seeds for adjacent agents should diverge");
    }

    #[test]
    fn gen_bool_extremes() {
        let mut rng = AgentRng::new(0, AgentId(0));
        assert!(!rng.gen_bool(0.0));
        assert!(rng.gen_bool(1.0));
    }

    #[test]
    fn choose_weighted_skips_zero_weights() {
        let mut rng = AgentRng::new(9, AgentId(0));
        for _ in 0..200 {
            assert_eq!(rng.choose_weighted(&[0.0, 2.0, 0.0]), Some(1));
        }
    }

    #[test]
    fn choose_weighted_degenerate_inputs() {
        let mut rng = AgentRng::new(9, AgentId(0));
        assert_eq!(rng.choose_weighted(&[]), None);
        assert_eq!(rng.choose_weighted(&[0.0, 0.0]), None);
        assert_eq!(rng.choose_weighted(&[1.0, -1.0]), None);
    }

    #[test]
    fn sim_rng_children_differ() {
        let mut root = SimRng::new(7);
        let mut a = root.child(1);
        let mut b = root.child(2);
        let x: u64 = a.random();
        let y: u64 = b.random();
        assert_ne!(x, y);
    }
}
