//! Plain data row types written by output backends.

/// One resolved decision.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionRow {
    pub run:       u64,
    pub tick:      u64,
    pub time:      f64,
    pub turn:      u64,
    pub light:     String,
    /// `user`, `rs`, `rsint` or `do_nothing`.
    pub source:    String,
    /// Learned rule applied; `None` for user rules and do-nothing.
    pub rule:      Option<u32>,
    /// Phase commanded to the simulator; `None` if no command was sent.
    pub phase:     Option<u32>,
    pub tie_break: bool,
}

/// One individual's statistics after a run.
#[derive(Debug, Clone, PartialEq)]
pub struct IndividualRow {
    pub run:                         u64,
    pub pool:                        u32,
    pub generation:                  u32,
    pub individual:                  u32,
    pub selected_count:              u32,
    pub fitness:                     f64,
    pub normalized_fitness:          f64,
    pub aggregate_vehicle_wait_time: f64,
    pub last_run_time:               f64,
    pub penalty_rate:                f64,
}
