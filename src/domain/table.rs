use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use super::records::{
    Agent, BriefcaseItem, CartItem, Community, Leader, Lease, Listing, Opportunity, PriceTier,
    Product, Provider, Service, StaffMember, Student, TenantSettings,
};
use super::{AccessorKind, Domain, DomainVisitor};

macro_rules! domain_table {
    ($(
        $(#[$meta:meta])*
        $marker:ident => $field:ident : $value:ty, $variant:ident = $key:literal, $kind:ident;
    )*) => {
        /// Stable name of every domain.
        ///
        /// `as_str()` is used for durable storage keys and seed payload
        /// fields. Once published, do not rename.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum DomainKey {
            $($variant,)*
        }

        impl DomainKey {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $key,)*
                }
            }

            /// All keys in table order.
            pub fn all() -> &'static [DomainKey] {
                &[$(Self::$variant,)*]
            }

            /// Parse from the stable name. Unknown names return `None`.
            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $($key => Some(Self::$variant),)*
                    _ => None,
                }
            }

            pub fn kind(&self) -> AccessorKind {
                match self {
                    $(Self::$variant => AccessorKind::$kind,)*
                }
            }

            /// Call `visitor` with the marker type for this key.
            pub fn visit<V: DomainVisitor>(self, visitor: V) -> V::Output {
                match self {
                    $(Self::$variant => visitor.visit::<$marker>(),)*
                }
            }
        }

        /// Every domain's current value plus the client-phase flag.
        ///
        /// Slots are `Arc`s: a write swaps exactly one of them and the rest
        /// stay pointer-equal, so consumers can skip work with `Arc::ptr_eq`.
        #[derive(Debug, Clone, Default, Serialize)]
        #[serde(rename_all = "camelCase")]
        pub struct ApplicationState {
            $(pub $field: Arc<$value>,)*
            /// Set once the runtime is executing in the browser. Never reverts.
            pub is_client_phase: bool,
        }

        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy)]
            pub struct $marker;

            impl Domain for $marker {
                type Value = $value;

                const KEY: DomainKey = DomainKey::$variant;
                const KIND: AccessorKind = AccessorKind::$kind;

                fn slot(state: &ApplicationState) -> &Arc<Self::Value> {
                    &state.$field
                }

                fn replace(state: &ApplicationState, value: Arc<Self::Value>) -> ApplicationState {
                    ApplicationState {
                        $field: value,
                        ..state.clone()
                    }
                }
            }
        )*
    };
}

domain_table! {
    /// Product catalogue.
    Products => products: Vec<Product>, Products = "products", Generic;
    /// Service providers.
    Providers => providers: Vec<Provider>, Providers = "providers", Generic;
    /// Sales pipeline.
    Opportunities => opportunities: Vec<Opportunity>, Opportunities = "opportunities", Generic;
    Services => services: Vec<Service>, Services = "services", Generic;
    Pricing => pricing: Vec<PriceTier>, Pricing = "pricing", Generic;
    /// Shopping cart. Survives navigation and reloads.
    Cart => cart: Vec<CartItem>, Cart = "cart", Persisted;
    /// Tenant settings record.
    Settings => settings: TenantSettings, Settings = "settings", Generic;
    Leases => leases: Vec<Lease>, Leases = "leases", Generic;
    Students => students: Vec<Student>, Students = "students", Generic;
    Communities => communities: Vec<Community>, Communities = "communities", Generic;
    Listings => listings: Vec<Listing>, Listings = "listings", Generic;
    /// Saved items. Survives reloads.
    Briefcase => briefcase: Vec<BriefcaseItem>, Briefcase = "briefcase", Persisted;
    Leadership => leadership: Vec<Leader>, Leadership = "leadership", Generic;
    Staff => staff: Vec<StaffMember>, Staff = "staff", Generic;
    /// Agent roster, categorized by `Agent::category`.
    Agents => agents: Vec<Agent>, Agents = "agents", Generic;
}

impl fmt::Display for DomainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ApplicationState {
    /// Copy with the client-phase flag set. Domain slots are shared.
    pub fn with_client_phase(&self) -> Self {
        Self {
            is_client_phase: true,
            ..self.clone()
        }
    }
}
