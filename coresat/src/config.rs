//! Solver configuration.
use coresat_macros::DocDefault;
use serde::Deserialize;

/// Configurable parameters used during solving.
#[derive(DocDefault, Debug, Clone)]
pub struct SolverConfig {
    /// Multiplicative decay for the VSIDS decision heuristic. (Default: 0.95)
    pub vsids_decay: f32,

    /// Multiplicative decay for clause activities. (Default: 0.999)
    pub clause_activity_decay: f32,

    /// Number of conflicts between local clause reductions. (Default: 15000)
    pub reduce_locals_interval: u64,

    /// Number of conflicts between mid clause reductions. (Default: 10000)
    pub reduce_mids_interval: u64,

    /// Scaling factor for luby sequence based restarts (number of conflicts). (Default: 128)
    pub luby_restart_interval_scale: u64,

    /// Abort the search after this many conflicts. Unset means no conflict based limit.
    pub max_conflicts: Option<u64>,
}

impl SolverConfig {
    /// Apply a partial update on top of this configuration.
    fn apply(&mut self, update: &SolverConfigUpdate) {
        if let Some(vsids_decay) = update.vsids_decay {
            self.vsids_decay = vsids_decay;
        }
        if let Some(clause_activity_decay) = update.clause_activity_decay {
            self.clause_activity_decay = clause_activity_decay;
        }
        if let Some(reduce_locals_interval) = update.reduce_locals_interval {
            self.reduce_locals_interval = reduce_locals_interval;
        }
        if let Some(reduce_mids_interval) = update.reduce_mids_interval {
            self.reduce_mids_interval = reduce_mids_interval;
        }
        if let Some(luby_restart_interval_scale) = update.luby_restart_interval_scale {
            self.luby_restart_interval_scale = luby_restart_interval_scale;
        }
        if let Some(max_conflicts) = update.max_conflicts {
            self.max_conflicts = max_conflicts;
        }
    }

    /// Human readable list of all configuration options and their defaults.
    pub fn help() -> String {
        let default = SolverConfig::default();
        format!(
            "Available configuration options (set via --config or -C option=value):\n\n\
             vsids_decay = {}\n  Multiplicative decay for the VSIDS decision heuristic.\n\n\
             clause_activity_decay = {}\n  Multiplicative decay for clause activities.\n\n\
             reduce_locals_interval = {}\n  Number of conflicts between local clause reductions.\n\n\
             reduce_mids_interval = {}\n  Number of conflicts between mid clause reductions.\n\n\
             luby_restart_interval_scale = {}\n  Scaling factor for luby sequence based restarts.\n\n\
             max_conflicts = <unset>\n  Abort the search after this many conflicts.\n",
            default.vsids_decay,
            default.clause_activity_decay,
            default.reduce_locals_interval,
            default.reduce_mids_interval,
            default.luby_restart_interval_scale,
        )
    }
}

/// A partial update to a [`SolverConfig`].
///
/// Options not present in a given source (config file or `-C` option) are left as `None`,
/// leaving the previously configured or default value unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SolverConfigUpdate {
    pub vsids_decay: Option<f32>,
    pub clause_activity_decay: Option<f32>,
    pub reduce_locals_interval: Option<u64>,
    pub reduce_mids_interval: Option<u64>,
    pub luby_restart_interval_scale: Option<u64>,
    pub max_conflicts: Option<u64>,
}

impl SolverConfigUpdate {
    /// Create an update that changes nothing.
    pub fn new() -> SolverConfigUpdate {
        SolverConfigUpdate::default()
    }

    /// Merge another update into this one, preferring the incoming values.
    pub fn merge(&mut self, other: SolverConfigUpdate) {
        if other.vsids_decay.is_some() {
            self.vsids_decay = other.vsids_decay;
        }
        if other.clause_activity_decay.is_some() {
            self.clause_activity_decay = other.clause_activity_decay;
        }
        if other.reduce_locals_interval.is_some() {
            self.reduce_locals_interval = other.reduce_locals_interval;
        }
        if other.reduce_mids_interval.is_some() {
            self.reduce_mids_interval = other.reduce_mids_interval;
        }
        if other.luby_restart_interval_scale.is_some() {
            self.luby_restart_interval_scale = other.luby_restart_interval_scale;
        }
        if other.max_conflicts.is_some() {
            self.max_conflicts = other.max_conflicts;
        }
    }

    /// Apply this update to a configuration in place.
    pub fn apply_to(&self, config: &mut SolverConfig) {
        config.apply(self);
    }
}
