//! Capability table: which (provider, operation) pairs the hub exposes.
//!
//! Built once at startup from the hub's service catalog, then consulted as
//! plain lookups. Providers that do not exist are tolerated and simply
//! report as unavailable.

use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default)]
pub struct CapabilityTable {
    providers: BTreeMap<String, BTreeSet<String>>,
}

impl CapabilityTable {
    pub fn new() -> Self {
        CapabilityTable::default()
    }

    pub fn from_entries<I, P, O>(entries: I) -> Self
    where
        I: IntoIterator<Item = (P, O)>,
        P: Into<String>,
        O: Into<String>,
    {
        let mut table = CapabilityTable::new();
        for (provider, operation) in entries {
            table.insert(&provider.into(), &operation.into());
        }
        table
    }

    pub fn insert(&mut self, provider: &str, operation: &str) {
        self.providers
            .entry(provider.to_string())
            .or_default()
            .insert(operation.to_string());
    }

    pub fn is_available(&self, provider: &str, operation: &str) -> bool {
        self.providers
            .get(provider)
            .is_some_and(|operations| operations.contains(operation))
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Number of registered (provider, operation) pairs.
    pub fn len(&self) -> usize {
        self.providers.values().map(BTreeSet::len).sum()
    }
}
