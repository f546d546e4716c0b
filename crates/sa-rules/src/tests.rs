//! Unit tests for sa-rules.

use sa_core::{AgentId, RuleId, Turn};

use crate::{
    Action, Comparison, Intention, PhaseAxis, PredicateFamily, PredicateParams, PredicateRegistry,
    Rule, RuleError, RuleKind, UserAction, UserRule,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn registry() -> PredicateRegistry {
    let mut r = PredicateRegistry::standard();
    r.register_threshold("numCarsWaitingToTurnLeft_gt_3", Comparison::Gt, 3.0).unwrap();
    r.register_threshold("timeSinceCommunication_le_10", Comparison::Le, 10.0).unwrap();
    r.register_phase_is("verticalPhaseIs_G", "G").unwrap();
    r.register_intended_action("intendedActionIs_2", Action::Phase(2)).unwrap();
    r
}

// ── Rule / Action ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod rule_tests {
    use super::*;

    #[test]
    fn constructors_set_kind() {
        let rs = Rule::individual(RuleId(0), ["a"], Action::Phase(1), 1.0);
        let coop = Rule::cooperative(RuleId(1), ["b"], Action::Phase(1), 1.0);
        assert_eq!(rs.kind, RuleKind::Individual);
        assert!(!rs.is_cooperative());
        assert!(coop.is_cooperative());
    }

    #[test]
    fn do_nothing_flag() {
        let rule = Rule::individual(RuleId(0), Vec::<String>::new(), Action::DoNothing, 0.0);
        assert!(rule.has_do_nothing_action());
        assert_eq!(rule.action.phase(), None);
        assert_eq!(Action::Phase(4).phase(), Some(4));
    }

    #[test]
    fn action_display_matches_peer_key_format() {
        assert_eq!(Action::Phase(3).to_string(), "3");
        assert_eq!(Action::DoNothing.to_string(), "-1");
    }
}

// ── Intention ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod intention_tests {
    use super::*;

    #[test]
    fn accessors_and_age() {
        let i = Intention::new(AgentId(2), Action::Phase(1), Turn(4), 20.0);
        assert_eq!(i.agent(), AgentId(2));
        assert_eq!(i.action(), Action::Phase(1));
        assert_eq!(i.turn(), Turn(4));
        assert_eq!(i.time(), 20.0);
        assert_eq!(i.age(35.0), 15.0);
    }
}

// ── Families ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod family_tests {
    use super::*;

    #[test]
    fn prefix_before_first_underscore() {
        assert_eq!(
            PredicateFamily::from_identifier("numCarsWaitingToTurnLeft_gt_3"),
            Some(PredicateFamily::NumCarsWaitingToTurnLeft)
        );
        assert_eq!(
            PredicateFamily::from_identifier("eastWestPhaseIs_Y"),
            Some(PredicateFamily::PhaseIs(PhaseAxis::EastWest))
        );
        assert_eq!(
            PredicateFamily::from_identifier("maxGreenPhaseTimeReached"),
            Some(PredicateFamily::MaxGreenPhaseTimeReached)
        );
        assert_eq!(PredicateFamily::from_identifier("tl2_3"), None);
    }

    #[test]
    fn cooperative_families() {
        assert!(PredicateFamily::TimeSinceCommunication.is_cooperative());
        assert!(PredicateFamily::IntendedActionIs.is_cooperative());
        assert!(PredicateFamily::PeerIntent.is_cooperative());
        assert!(!PredicateFamily::TimeSpentInCurrentPhase.is_cooperative());
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod registry_tests {
    use super::*;

    #[test]
    fn standard_timers() {
        let r = PredicateRegistry::standard();
        let green_over = PredicateParams::PhaseTimer { state: "G".into(), elapsed: 230.0, limit: 225.0 };
        let green_under = PredicateParams::PhaseTimer { state: "G".into(), elapsed: 10.0, limit: 225.0 };
        let yellow_over = PredicateParams::PhaseTimer { state: "Y".into(), elapsed: 6.0, limit: 5.0 };
        assert!(r.evaluate("maxGreenPhaseTimeReached", &green_over).unwrap());
        assert!(!r.evaluate("maxGreenPhaseTimeReached", &green_under).unwrap());
        assert!(!r.evaluate("maxGreenPhaseTimeReached", &yellow_over).unwrap());
        assert!(r.evaluate("maxYellowPhaseTimeReached", &yellow_over).unwrap());
        assert!(!r.evaluate("emergencyVehicleApproaching", &PredicateParams::None).unwrap());
    }

    #[test]
    fn threshold_and_wrong_variant() {
        let r = registry();
        assert!(r.evaluate("numCarsWaitingToTurnLeft_gt_3", &PredicateParams::Scalar(4.0)).unwrap());
        assert!(!r.evaluate("numCarsWaitingToTurnLeft_gt_3", &PredicateParams::Scalar(3.0)).unwrap());
        assert!(!r.evaluate("numCarsWaitingToTurnLeft_gt_3", &PredicateParams::None).unwrap());
    }

    #[test]
    fn phase_is_matches_component() {
        let r = registry();
        let parts = PredicateParams::PhaseName(vec!["NS".into(), "S".into(), "G".into()]);
        assert!(r.evaluate("verticalPhaseIs_G", &parts).unwrap());
        let parts = PredicateParams::PhaseName(vec!["NS".into(), "S".into(), "Y".into()]);
        assert!(!r.evaluate("verticalPhaseIs_G", &parts).unwrap());
    }

    #[test]
    fn peer_intent_key() {
        let mut r = registry();
        let id = r.register_peer_intent("tl2", Action::Phase(3)).unwrap();
        assert_eq!(id, "tl2_3");
        assert_eq!(r.family(&id).unwrap(), PredicateFamily::PeerIntent);
        let hit = PredicateParams::PeerIntent { key: "tl2_3".into(), agent: AgentId(1), action: Action::Phase(3) };
        let miss = PredicateParams::PeerIntent { key: "tl2_1".into(), agent: AgentId(1), action: Action::Phase(1) };
        assert!(r.evaluate(&id, &hit).unwrap());
        assert!(!r.evaluate(&id, &miss).unwrap());
    }

    #[test]
    fn unknown_identifier_is_an_error() {
        let r = registry();
        assert!(matches!(
            r.evaluate("noSuchPredicate_1", &PredicateParams::None),
            Err(RuleError::UnknownPredicate(_))
        ));
        assert!(matches!(
            PredicateRegistry::new().register_named("noSuchFamily_1", std::sync::Arc::new(|_| true)),
            Err(RuleError::UnknownPredicate(_))
        ));
    }

    #[test]
    fn duplicate_registration_rejected() {
        let mut r = registry();
        assert!(matches!(
            r.register_threshold("numCarsWaitingToTurnLeft_gt_3", Comparison::Gt, 1.0),
            Err(RuleError::DuplicatePredicate(_))
        ));
    }

    #[test]
    fn validate_rule_checks_kind() {
        let r = registry();
        let ok = Rule::individual(RuleId(0), ["numCarsWaitingToTurnLeft_gt_3"], Action::Phase(0), 1.0);
        assert!(r.validate_rule(&ok).is_ok());

        let coop_ok = Rule::cooperative(RuleId(1), ["timeSinceCommunication_le_10", "intendedActionIs_2"], Action::Phase(0), 1.0);
        assert!(r.validate_rule(&coop_ok).is_ok());

        let mixed = Rule::individual(RuleId(2), ["timeSinceCommunication_le_10"], Action::Phase(0), 1.0);
        assert!(matches!(r.validate_rule(&mixed), Err(RuleError::FamilyMismatch { .. })));

        let unknown = Rule::cooperative(RuleId(3), ["tl9_1"], Action::Phase(0), 1.0);
        assert!(matches!(r.validate_rule(&unknown), Err(RuleError::UnknownPredicate(_))));
    }
}

// ── UserRule ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod user_rule_tests {
    use super::*;

    #[test]
    fn standard_set_order() {
        let set = UserRule::standard_set();
        assert_eq!(set[0].action, UserAction::SwitchToYellow);
        assert_eq!(set[1].action, UserAction::AdvancePhase);
    }

    #[test]
    fn emergency_condition_skipped_in_scan() {
        let rule = UserRule::new(
            ["emergencyVehicleApproaching", "maxYellowPhaseTimeReached"],
            UserAction::AdvancePhase,
        )
        .unwrap();
        let scanned: Vec<&str> = rule.scanned_conditions().collect();
        assert_eq!(scanned, vec!["maxYellowPhaseTimeReached"]);
    }

    #[test]
    fn empty_user_rule_rejected() {
        assert!(matches!(
            UserRule::new(Vec::<String>::new(), UserAction::AdvancePhase),
            Err(RuleError::EmptyUserRule)
        ));
    }

    #[test]
    fn standard_user_rules_validate() {
        let r = PredicateRegistry::standard();
        for rule in UserRule::standard_set() {
            assert!(r.validate_user_rule(&rule).is_ok());
        }
    }
}
