//! Extraction configuration.

use std::fmt;

use crate::flow_sizes::FlowSizes;

/// Identifies the receiving entity by one segment of its module path, e.g.
/// `host[0]` inside `SmallLeafSpine.host[0].app[3]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySelector {
    pub kind: String,
    pub index: u32,
}

impl EntitySelector {
    pub fn new(kind: impl Into<String>, index: u32) -> Self {
        Self {
            kind: kind.into(),
            index,
        }
    }

    /// The path segment this selector matches.
    pub fn segment(&self) -> String {
        format!("{}[{}]", self.kind, self.index)
    }

    /// Whether `path` contains the selector's segment as a whole component.
    ///
    /// `Net.host[1].app[0]` matches `host[1]` but `Net.host[10].app[0]` and
    /// `Net.subhost[1]` do not.
    pub fn matches(&self, path: &str) -> bool {
        let segment = self.segment();
        path.split('.').any(|part| part == segment)
    }
}

impl Default for EntitySelector {
    fn default() -> Self {
        Self::new("host", 0)
    }
}

impl fmt::Display for EntitySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.kind, self.index)
    }
}

/// Configuration for extracting flow completion times from one input.
#[derive(Debug, Clone, Default)]
pub struct ExtractConfig {
    /// Receiving entity whose signals are reconstructed.
    pub entity: EntitySelector,

    /// Expected byte totals per flow, from the traffic configuration fragment.
    pub flow_sizes: FlowSizes,

    /// Skip byte-based reconstruction for entities without an expected total
    /// instead of falling back to the series' own final value.
    pub require_expected_total: bool,
}

impl ExtractConfig {
    pub fn for_entity(entity: EntitySelector) -> Self {
        Self {
            entity,
            ..Self::default()
        }
    }

    /// Expected byte total for the flow terminating at `entity_path`.
    pub fn expected_total(&self, entity_path: &str) -> Option<u64> {
        self.flow_sizes.expected_for(&self.entity, entity_path)
    }
}
