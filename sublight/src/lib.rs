/*! # Sublight

Sublight keeps each client's view of moving ships consistent with a
server-authoritative physics truth, and independently validates
client-reported trajectories against physics-predictable motion.

The synchronization side runs one of three per-entity paths every frame:

- **Authority** (server): pull ground truth from the simulation, stamp and
  record it;
- **Autonomous** (owning client): advance locally by prediction, reconcile
  when the authoritative state arrives;
- **Simulated** (remote proxy): blend toward received states, extrapolate
  when updates run late.

The consensus side is an independent sibling pipeline
([`ConsensusValidator`](sublight_consensus::validator::ConsensusValidator)):
peers re-predict each other's reported trajectories, vote, and a trust-state
machine accumulates each player's standing. Both sides are plain
single-threaded libraries driven by an explicit `dt` — no engine loop, no
I/O, no threads.
*/

pub use sublight_consensus as consensus;
pub use sublight_core as core;
pub use sublight_interpolation as interpolation;
pub use sublight_lag_compensation as lag_compensation;
pub use sublight_prediction as prediction;

pub mod config;
pub mod manager;

/// Prelude containing commonly used types.
pub mod prelude {
    pub use crate::config::SyncConfig;
    pub use crate::manager::{NetworkRole, PhysicsSyncManager};

    pub use sublight_core::prelude::*;

    pub use sublight_interpolation::prelude::*;
    pub use sublight_lag_compensation::{LagCompensationConfig, LagCompensator};
    pub use sublight_prediction::prelude::*;

    pub mod consensus {
        pub use sublight_consensus::prelude::*;
    }
}
