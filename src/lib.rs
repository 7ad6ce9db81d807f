//! Client-side shared state container for a multi-tenant storefront and
//! business-management platform.
//!
//! One [`Store`] holds every business domain (products, providers, cart,
//! staff, ...). UI code never touches it directly: it goes through
//! [`Domains`], which hands out typed accessors that are safe to read during
//! server rendering, seed themselves once from page data, and, for the cart
//! and briefcase, survive reloads through [`DurableStorage`].
//!
//! ```text
//!   SeedPayload ──apply──┐
//!                        ▼
//!   DomainHook ──→ DomainAccessor ──→ Store<ApplicationState> ──notify──→ subscribers
//!                        │
//!                        └──(persisted domains)──→ DurableStorage
//! ```

pub mod accessor;
pub mod config;
pub mod domain;
pub mod durable;
pub mod error;
pub mod hydration;
pub mod logging;
pub mod registry;
pub mod state;
pub mod store;

pub use accessor::{DomainAccessor, DomainHook, DomainView, SeedOutcome, StaffRoster};
pub use config::StoreConfig;
pub use domain::{ApplicationState, Domain, DomainKey};
pub use durable::DurableStorage;
pub use error::{DurableError, StoreError};
pub use hydration::{SeedPayload, SeedReport};
pub use registry::Domains;
pub use store::{Store, Subscription, WriteOutcome};
