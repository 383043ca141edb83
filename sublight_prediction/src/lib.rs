/*! # Sublight Prediction

Client-side prediction and server reconciliation.

An Autonomous entity is advanced locally every frame by dead-reckoning so the
pilot never waits on the round trip. When the authoritative state for a past
frame arrives, the [`ServerReconciler`](reconciliation::ServerReconciler)
measures how far the prediction drifted and either snaps (divergence) or
starts a smooth visual correction (small drift), while tiny errors below the
jitter gate are ignored entirely.
*/

pub mod input_buffer;
pub mod predictor;
pub mod reconciliation;

pub mod prelude {
    pub use crate::input_buffer::{InputBuffers, InputRecord};
    pub use crate::predictor::ClientPredictor;
    pub use crate::reconciliation::{
        CorrectionEvent, CorrectionKind, PredictionConfig, PredictionStats, ServerReconciler,
    };
}
