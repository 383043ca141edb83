//! Aggregated configuration for one synchronization endpoint.

use sublight_interpolation::interpolate::InterpolationConfig;
use sublight_lag_compensation::LagCompensationConfig;
use sublight_prediction::reconciliation::PredictionConfig;

/// Everything tunable about the synchronization side, with the per-concern
/// configs nested the way the crates consume them.
#[derive(Debug, Clone, Copy)]
pub struct SyncConfig {
    /// The fixed-step rate the host loop is expected to drive updates at,
    /// in Hz. Informational: nothing here schedules, but tolerances and
    /// delays were tuned against it.
    pub update_rate: f64,
    /// State snapshots retained per entity.
    pub history_capacity: usize,
    pub prediction: PredictionConfig,
    pub interpolation: InterpolationConfig,
    pub lag_compensation: LagCompensationConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            update_rate: 60.0,
            history_capacity: 100,
            prediction: PredictionConfig::default(),
            interpolation: InterpolationConfig::default(),
            lag_compensation: LagCompensationConfig::default(),
        }
    }
}

impl SyncConfig {
    pub fn with_prediction(mut self, prediction: PredictionConfig) -> Self {
        self.prediction = prediction;
        self
    }

    pub fn with_interpolation(mut self, interpolation: InterpolationConfig) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn with_lag_compensation(mut self, lag_compensation: LagCompensationConfig) -> Self {
        self.lag_compensation = lag_compensation;
        self
    }

    pub fn with_history_capacity(mut self, history_capacity: usize) -> Self {
        self.history_capacity = history_capacity;
        self
    }
}
