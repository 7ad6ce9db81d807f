//! Domain definitions: the typed keys of [`ApplicationState`].
//!
//! Every domain is a zero-sized marker type implementing [`Domain`]. The
//! markers, [`DomainKey`] and [`ApplicationState`] are generated together
//! from one table in `table.rs`, so adding a domain is one new row there.

mod records;
mod table;

use std::fmt::Debug;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use records::{
    Agent, BillingInterval, BriefcaseItem, CartItem, Community, Leader, Lease, Listing,
    ListingStatus, Opportunity, OpportunityStatus, PriceTier, Product, Provider, Service,
    StaffMember, Student, TenantSettings,
};
pub use table::{
    Agents, ApplicationState, Briefcase, Cart, Communities, DomainKey, Leadership, Leases,
    Listings, Opportunities, Pricing, Products, Providers, Services, Settings, Staff, Students,
};

/// How an accessor for a domain behaves beyond plain read/write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorKind {
    /// Read/write through the store only.
    Generic,
    /// Also restored from and written through to durable client storage.
    Persisted,
    /// Read-only composite over several domains, each writable on its own.
    CombinedRead,
}

impl AccessorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Persisted => "persisted",
            Self::CombinedRead => "combined-read",
        }
    }
}

/// One slice of [`ApplicationState`].
pub trait Domain: Send + Sync + 'static {
    /// The domain's value, usually an ordered list of records.
    type Value: Clone
        + PartialEq
        + Default
        + Debug
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;

    const KEY: DomainKey;
    const KIND: AccessorKind;

    /// Borrow this domain's slot.
    fn slot(state: &ApplicationState) -> &Arc<Self::Value>;

    /// Copy of `state` with this domain's slot replaced. Every other slot
    /// keeps its `Arc`.
    fn replace(state: &ApplicationState, value: Arc<Self::Value>) -> ApplicationState;
}

/// Static dispatch from a runtime [`DomainKey`] to its marker type.
///
/// See [`DomainKey::visit`].
pub trait DomainVisitor {
    type Output;

    fn visit<D: Domain>(self) -> Self::Output;
}
