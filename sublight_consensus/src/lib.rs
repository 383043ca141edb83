/*! # Sublight Consensus

An independent anti-cheat pipeline that validates client-reported trajectories
against physics-predictable motion.

Every client periodically reports position, velocity and thrust. Peers acting
as validators re-predict each report from the previous one (gravity + reported
thrust, constant-acceleration kinematics) and vote on whether the report is
plausible. Votes aggregate into a consensus per `(player, sequence)`, and each
player's accumulated standing moves through a trust-state machine:

```text
Trusted -> Suspect -> Flagged -> Kicked
```

`Kicked` is advisory and terminal until an explicit reset — actually removing
a player is the session manager's call, not ours.

Nothing here performs I/O or owns world objects: reports and votes arrive
already deserialized, and environment lookups (gravity, per-player latency)
are capabilities passed into each call.
*/

pub mod config;
pub mod environment;
pub mod predict;
pub mod report;
pub mod trust;
pub mod validate;
pub mod validator;
pub mod voting;

pub mod prelude {
    pub use crate::config::ConsensusConfig;
    pub use crate::environment::{GravityProvider, LatencyProvider, NoGravity, UnknownLatency};
    pub use crate::report::PositionReport;
    pub use crate::trust::{TrustChangedEvent, TrustState};
    pub use crate::validate::PositionCheck;
    pub use crate::validator::ConsensusValidator;
    pub use crate::voting::{ConsensusResult, ValidationVote};
}
