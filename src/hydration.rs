//! Server-to-client handoff of initial domain values.
//!
//! On the server, page data fetched from the document store is collected
//! into a [`SeedPayload`] and serialized into the page. On the client, once
//! the client phase has begun, [`SeedPayload::apply`] offers every value to
//! its domain under the normal seeding rule.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::accessor::SeedOutcome;
use crate::domain::{Domain, DomainKey, DomainVisitor};
use crate::registry::Domains;

/// JSON object mapping domain names to initial values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeedPayload {
    values: Map<String, Value>,
}

/// Result of applying a payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// One entry per known domain present in the payload, in table order.
    pub outcomes: Vec<(DomainKey, SeedOutcome)>,
    /// Payload fields that name no known domain.
    pub ignored: Vec<String>,
}

impl SeedReport {
    pub fn outcome(&self, key: DomainKey) -> Option<SeedOutcome> {
        self.outcomes
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, outcome)| *outcome)
    }

    pub fn seeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| *outcome == SeedOutcome::Seeded)
            .count()
    }
}

impl SeedPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the initial value for domain `D`.
    pub fn insert<D: Domain>(&mut self, value: &D::Value) -> Result<(), serde_json::Error> {
        self.values
            .insert(D::KEY.as_str().to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with<D: Domain>(mut self, value: &D::Value) -> Result<Self, serde_json::Error> {
        self.insert::<D>(value)?;
        Ok(self)
    }

    /// Typed read of one domain's value, if present.
    pub fn get<D: Domain>(&self) -> Option<Result<D::Value, serde_json::Error>> {
        self.values
            .get(D::KEY.as_str())
            .map(|value| D::Value::deserialize(value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Offer every value to its domain. Malformed values are reported as
    /// [`SeedOutcome::Rejected`]; unknown fields are skipped.
    pub fn apply(&self, domains: &Domains) -> SeedReport {
        let mut report = SeedReport::default();

        for key in DomainKey::all() {
            if let Some(value) = self.values.get(key.as_str()) {
                let outcome = key.visit(SeedFromJson { domains, value });
                report.outcomes.push((*key, outcome));
            }
        }

        for name in self.values.keys() {
            if DomainKey::parse(name).is_none() {
                tracing::debug!(field = %name, "Ignoring unknown seed payload field");
                report.ignored.push(name.clone());
            }
        }

        report
    }
}

struct SeedFromJson<'a> {
    domains: &'a Domains,
    value: &'a Value,
}

impl DomainVisitor for SeedFromJson<'_> {
    type Output = SeedOutcome;

    fn visit<D: Domain>(self) -> SeedOutcome {
        match D::Value::deserialize(self.value) {
            Ok(initial) => self.domains.accessor::<D>().seed(initial),
            Err(error) => {
                tracing::warn!(domain = %D::KEY, error = %error, "Rejecting malformed initial value");
                SeedOutcome::Rejected
            }
        }
    }
}
