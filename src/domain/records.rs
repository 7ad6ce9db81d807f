//! Record types held by each domain.
//!
//! These mirror what the document store returns per collection. Optional
//! fields default so sparse server payloads still deserialize.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price_cents: i64,
    #[serde(default)]
    pub provider_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub contact_email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpportunityStatus {
    #[default]
    Open,
    InProgress,
    Won,
    Lost,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub provider_id: Option<u64>,
    #[serde(default)]
    pub status: OpportunityStatus,
    #[serde(default)]
    pub value_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub provider_id: Option<u64>,
    #[serde(default)]
    pub duration_minutes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BillingInterval {
    OneTime,
    #[default]
    Monthly,
    Yearly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceTier {
    pub id: u64,
    pub name: String,
    pub amount_cents: i64,
    #[serde(default)]
    pub interval: BillingInterval,
    #[serde(default)]
    pub features: Vec<String>,
}

/// One line in the shopping cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub line_id: Uuid,
    pub product_id: u64,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

impl CartItem {
    /// New cart line with a random line id.
    ///
    /// Random ids differ between server and client, so only call this once
    /// the accessor reports ready.
    pub fn new(product_id: u64, quantity: u32, unit_price_cents: i64) -> Self {
        Self {
            line_id: Uuid::new_v4(),
            product_id,
            quantity,
            unit_price_cents,
        }
    }

    pub fn total_cents(&self) -> i64 {
        self.unit_price_cents * i64::from(self.quantity)
    }
}

/// Tenant-wide configuration record. The one domain that is not a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantSettings {
    #[serde(default)]
    pub tenant_name: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Tax rate in basis points.
    #[serde(default)]
    pub tax_rate_bps: u32,
    #[serde(default)]
    pub features: BTreeMap<String, bool>,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_locale() -> String {
    "en-US".to_string()
}

impl Default for TenantSettings {
    fn default() -> Self {
        Self {
            tenant_name: String::new(),
            currency: default_currency(),
            locale: default_locale(),
            tax_rate_bps: 0,
            features: BTreeMap::new(),
        }
    }
}

impl TenantSettings {
    pub fn feature_enabled(&self, name: &str) -> bool {
        self.features.get(name).copied().unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lease {
    pub id: u64,
    pub unit: String,
    pub tenant: String,
    pub monthly_rent_cents: i64,
    /// ISO-8601 date.
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub cohort: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Community {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub member_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListingStatus {
    #[default]
    Draft,
    Active,
    Sold,
    Archived,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub price_cents: i64,
    #[serde(default)]
    pub status: ListingStatus,
}

/// Item a user has saved to their briefcase for later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BriefcaseItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leader {
    pub id: u64,
    pub name: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    pub id: u64,
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub department: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: u64,
    pub name: String,
    pub category: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}
