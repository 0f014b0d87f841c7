use std::collections::HashMap;

use serde::Serialize;

use crate::trace::Series;

/// One (entity, signal) pair and how many usable samples it recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryEntry {
    pub entity: String,
    pub signal: String,
    pub samples: usize,
}

/// What was actually recorded under the target entity.
///
/// Produced when no flow could be reconstructed, so an operator can see which
/// signals exist and enable the right recording.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalInventory {
    entries: Vec<InventoryEntry>,
}

impl SignalInventory {
    /// Group series by (entity, signal), sorted by sample count descending,
    /// then entity and signal.
    pub fn from_series<'a, I>(series: I) -> Self
    where
        I: IntoIterator<Item = &'a Series>,
    {
        let mut counts: HashMap<(&str, &str), usize> = HashMap::new();
        for s in series {
            *counts.entry((s.entity(), s.signal())).or_default() += s.len();
        }
        let mut entries: Vec<InventoryEntry> = counts
            .into_iter()
            .map(|((entity, signal), samples)| InventoryEntry {
                entity: entity.to_string(),
                signal: signal.to_string(),
                samples,
            })
            .collect();
        entries.sort_by(|a, b| {
            b.samples
                .cmp(&a.samples)
                .then_with(|| a.entity.cmp(&b.entity))
                .then_with(|| a.signal.cmp(&b.signal))
        });
        Self { entries }
    }

    pub fn entries(&self) -> &[InventoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
