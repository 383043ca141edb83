//! Tunables for the validation pipeline.

use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct ConsensusConfig {
    /// Base slack for position checks, in meters.
    pub base_position_tolerance: f32,
    /// Additional position slack per second between reports, in m/s. Longer
    /// gaps accumulate more honest integration error.
    pub time_decay_rate: f32,
    /// Base slack for thrust checks, in newtons.
    pub base_thrust_tolerance: f32,
    /// Fraction of `max_thrust_force` added to the thrust slack.
    pub thrust_tolerance_pct: f32,
    /// Valid-vote fraction at or beyond which consensus is reached (in either
    /// direction: a fraction at or below `1 - threshold` also counts).
    pub consensus_threshold: f32,
    /// Consecutive failures at which a player is Flagged.
    pub flag_threshold: u32,
    /// Consecutive failures at which a player is Kicked.
    pub kick_threshold: u32,
    /// Failures older than this window are forgiven.
    pub kick_time_window: Duration,
    /// The strongest thrust a stock ship can produce, in newtons.
    pub max_thrust_force: f32,
    /// The fastest a stock ship can move, in m/s.
    pub max_speed: f32,
    /// Ship mass used to convert forces to accelerations, in kg.
    pub player_mass: f32,
    /// Latency assumed for players the latency provider knows nothing about.
    pub default_latency: Duration,
    /// Reports retained per player.
    pub report_capacity: usize,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            base_position_tolerance: 1.0,
            time_decay_rate: 0.5,
            base_thrust_tolerance: 10.0,
            thrust_tolerance_pct: 0.15,
            consensus_threshold: 0.67,
            flag_threshold: 3,
            kick_threshold: 5,
            kick_time_window: Duration::from_secs(10),
            max_thrust_force: 50_000.0,
            max_speed: 100.0,
            player_mass: 1_000.0,
            default_latency: Duration::from_millis(100),
            report_capacity: 100,
        }
    }
}

impl ConsensusConfig {
    pub fn with_consensus_threshold(mut self, consensus_threshold: f32) -> Self {
        self.consensus_threshold = consensus_threshold;
        self
    }

    pub fn with_flag_threshold(mut self, flag_threshold: u32) -> Self {
        self.flag_threshold = flag_threshold;
        self
    }

    pub fn with_kick_threshold(mut self, kick_threshold: u32) -> Self {
        self.kick_threshold = kick_threshold;
        self
    }

    pub fn with_kick_time_window(mut self, kick_time_window: Duration) -> Self {
        self.kick_time_window = kick_time_window;
        self
    }

    /// Thrust-to-acceleration (and force-to-acceleration) divisor. Clamped so
    /// a zero-mass misconfiguration degrades to unit mass instead of
    /// dividing by zero.
    pub fn mass(&self) -> f32 {
        self.player_mass.max(1.0)
    }
}
