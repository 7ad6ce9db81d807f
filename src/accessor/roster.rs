//! Staff roster: one read surface over leadership, staff and agents.
//!
//! The three domains stay separate in the store and are written through
//! their own accessors. The roster only reads them from a single snapshot so
//! a render never mixes two generations.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::domain::{read, DomainAccessor, SeedOutcome};
use super::watch::watch;
use crate::domain::{
    AccessorKind, Agent, Agents, ApplicationState, Domain, Leader, Leadership, Staff, StaffMember,
};
use crate::registry::Domains;
use crate::store::Subscription;

/// Combined read of the three staff domains.
#[derive(Debug, Clone)]
pub struct StaffRosterView {
    pub leadership: Arc<Vec<Leader>>,
    pub staff: Arc<Vec<StaffMember>>,
    pub agents: Arc<Vec<Agent>>,
    pub is_ready: bool,
}

impl StaffRosterView {
    /// Leaders, staff and active agents.
    pub fn headcount(&self) -> usize {
        self.leadership.len() + self.staff.len() + self.agents.iter().filter(|a| a.active).count()
    }

    /// Agents grouped by category, categories sorted, roster order kept
    /// within each group.
    pub fn agents_by_category(&self) -> BTreeMap<&str, Vec<&Agent>> {
        let mut groups: BTreeMap<&str, Vec<&Agent>> = BTreeMap::new();
        for agent in self.agents.iter() {
            groups.entry(agent.category.as_str()).or_default().push(agent);
        }
        groups
    }
}

/// Initial values for any of the three staff domains.
#[derive(Debug, Clone, Default)]
pub struct RosterSeed {
    pub leadership: Option<Vec<Leader>>,
    pub staff: Option<Vec<StaffMember>>,
    pub agents: Option<Vec<Agent>>,
}

/// Per-domain result of [`StaffRoster::seed`]. `None` where no value was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RosterSeedOutcome {
    pub leadership: Option<SeedOutcome>,
    pub staff: Option<SeedOutcome>,
    pub agents: Option<SeedOutcome>,
}

#[derive(Clone)]
pub struct StaffRoster {
    domains: Domains,
}

impl StaffRoster {
    pub const KIND: AccessorKind = AccessorKind::CombinedRead;

    pub(crate) fn new(domains: Domains) -> Self {
        Self { domains }
    }

    pub fn view(&self) -> StaffRosterView {
        let state = self.domains.snapshot();
        StaffRosterView {
            leadership: read::<Leadership>(&state),
            staff: read::<Staff>(&state),
            agents: read::<Agents>(&state),
            is_ready: state.is_client_phase,
        }
    }

    pub fn leadership(&self) -> DomainAccessor<Leadership> {
        self.domains.accessor()
    }

    pub fn staff(&self) -> DomainAccessor<Staff> {
        self.domains.accessor()
    }

    pub fn agents(&self) -> DomainAccessor<Agents> {
        self.domains.accessor()
    }

    /// Offer initial values to each part under the usual seeding rule.
    pub fn seed(&self, seed: RosterSeed) -> RosterSeedOutcome {
        RosterSeedOutcome {
            leadership: seed.leadership.map(|v| self.leadership().seed(v)),
            staff: seed.staff.map(|v| self.staff().seed(v)),
            agents: seed.agents.map(|v| self.agents().seed(v)),
        }
    }

    /// Run `callback` when any of the three domains or readiness changes.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        watch(
            &self.domains,
            |state: &ApplicationState| {
                (
                    (
                        Arc::clone(Leadership::slot(state)),
                        Arc::clone(Staff::slot(state)),
                        Arc::clone(Agents::slot(state)),
                    ),
                    state.is_client_phase,
                )
            },
            callback,
        )
    }
}
