//! Domain Accessor Layer.
//!
//! Three variants, matching [`AccessorKind`](crate::domain::AccessorKind):
//!
//! - [`DomainAccessor`] for every domain: server-safe reads, pure-updater
//!   writes, seeding.
//! - Persisted domains additionally restore from and write through to
//!   durable storage (see [`RestoreOutcome`]).
//! - [`StaffRoster`] reads several domains as one composite.
//!
//! [`DomainHook`] wraps an accessor with the per-component
//! Unseeded → Seeding → Seeded state machine.

mod domain;
mod hook;
mod persisted;
mod roster;
mod watch;

pub use domain::{DomainAccessor, DomainView, SeedOutcome};
pub use hook::{DomainHook, HookPhase};
pub use persisted::RestoreOutcome;
pub use roster::{RosterSeed, RosterSeedOutcome, StaffRoster, StaffRosterView};
