/*! # Sublight Core

Shared primitives for the sublight networked-physics synchronization crates:
entity/player identifiers, the [`PhysicsState`](state::PhysicsState) snapshot,
the bounded [`HistoryBuffer`](history_buffer::HistoryBuffer), the
[`PhysicsStateRegistry`](registry::PhysicsStateRegistry) and the collaborator
traits through which the host simulation exposes its bodies, clock and
environment.

This crate performs no I/O and owns no engine objects: entities are addressed
by stable ids, and every call that needs to touch a world object receives an
accessor capability from the host.
*/

pub mod body;
pub mod events;
pub mod history_buffer;
pub mod id;
pub mod registry;
pub mod state;
pub mod time;

pub mod prelude {
    pub use crate::body::{BodyRegistry, PhysicsBody};
    pub use crate::events::Observers;
    pub use crate::history_buffer::HistoryBuffer;
    pub use crate::id::{EntityId, PlayerId, ValidatorId};
    pub use crate::registry::PhysicsStateRegistry;
    pub use crate::state::{PhysicsMode, PhysicsState};
    pub use crate::time::{ManualClock, SessionClock, SteadyClock};
}
