//! Expected flow sizes from a traffic configuration fragment.
//!
//! The traffic generator writes ini lines such as
//!
//! ```text
//! **.host[3].app[0].sendBytes = 524288B
//! ```
//!
//! Each assignment gives the number of bytes a flow is expected to deliver.
//! Lines that do not parse are skipped; the fragment also carries unrelated
//! keys (`typename`, `tOpen`, ...).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::EntitySelector;
use crate::error::ExtractError;
use crate::trace::constants::{APP_INDEX_RE, QUANTITY_RE, SEND_BYTES_RE};

/// Identifies one application on one node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlowKey {
    pub kind: String,
    pub node: u32,
    pub app: u32,
}

/// Expected byte totals keyed by (node kind, node index, app index).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowSizes {
    sizes: HashMap<FlowKey, u64>,
}

impl FlowSizes {
    /// Read and parse a fragment from disk.
    pub fn load(path: &Path) -> Result<Self, ExtractError> {
        let text = fs::read_to_string(path).map_err(|e| ExtractError::FlowConfig {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let sizes = Self::parse(&text);
        debug!(
            "loaded {} flow sizes from {}",
            sizes.len(),
            path.display()
        );
        Ok(sizes)
    }

    /// Parse fragment text. Later assignments override earlier ones.
    pub fn parse(text: &str) -> Self {
        let mut sizes = HashMap::new();
        for line in text.lines() {
            let line = match line.split_once('#') {
                Some((before, _)) => before,
                None => line,
            };
            let Some(caps) = SEND_BYTES_RE.captures(line) else {
                continue;
            };
            let (Ok(node), Ok(app)) = (caps[2].parse::<u32>(), caps[3].parse::<u32>()) else {
                continue;
            };
            let Some(bytes) = parse_quantity(&caps[4]) else {
                debug!("skipping unparseable sendBytes value: {}", &caps[4]);
                continue;
            };
            let key = FlowKey {
                kind: caps[1].to_string(),
                node,
                app,
            };
            sizes.insert(key, bytes);
        }
        Self { sizes }
    }

    pub fn get(&self, key: &FlowKey) -> Option<u64> {
        self.sizes.get(key).copied()
    }

    /// Expected total for the application found in `entity_path`, on the node
    /// named by `selector`.
    pub fn expected_for(&self, selector: &EntitySelector, entity_path: &str) -> Option<u64> {
        let app = app_index(entity_path)?;
        self.get(&FlowKey {
            kind: selector.kind.clone(),
            node: selector.index,
            app,
        })
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

/// Extract the `app[N]` index from a module path.
pub fn app_index(entity_path: &str) -> Option<u32> {
    APP_INDEX_RE
        .captures(entity_path)
        .and_then(|caps| caps[1].parse().ok())
}

/// Parse an ini byte quantity. Accepts a bare number or one of the units
/// `B`, `KiB`, `MiB`, `GiB`, `kB`/`KB`, `MB`, `GB`.
pub fn parse_quantity(text: &str) -> Option<u64> {
    let text = text.trim().trim_matches('"');
    let caps = QUANTITY_RE.captures(text)?;
    let number: f64 = caps[1].parse().ok()?;
    let multiplier: f64 = match &caps[2] {
        "" | "B" => 1.0,
        "KiB" => 1024.0,
        "MiB" => 1024.0 * 1024.0,
        "GiB" => 1024.0 * 1024.0 * 1024.0,
        "kB" | "KB" => 1e3,
        "MB" => 1e6,
        "GB" => 1e9,
        _ => return None,
    };
    Some((number * multiplier).round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAGMENT: &str = r#"# auto-generated incast
**.host[3].numApps = 2
**.host[3].app[0].typename = "TcpSessionApp"
**.host[3].app[0].sendBytes = 524288B
**.host[3].app[1].sendBytes = 64MiB
**.host[0].app[5].sendBytes = 1500 # trailing comment
**.host[0].app[6].sendBytes = lots
"#;

    #[test]
    fn test_parse_fragment() {
        let sizes = FlowSizes::parse(FRAGMENT);
        assert_eq!(sizes.len(), 3);
        let key = |node, app| FlowKey {
            kind: "host".to_string(),
            node,
            app,
        };
        assert_eq!(sizes.get(&key(3, 0)), Some(524_288));
        assert_eq!(sizes.get(&key(3, 1)), Some(64 * 1024 * 1024));
        assert_eq!(sizes.get(&key(0, 5)), Some(1500));
        assert_eq!(sizes.get(&key(0, 6)), None);
    }

    #[test]
    fn test_expected_for_uses_selector_node() {
        let sizes = FlowSizes::parse(FRAGMENT);
        let sel = EntitySelector::new("host", 3);
        assert_eq!(
            sizes.expected_for(&sel, "SmallLeafSpine.host[3].app[1]"),
            Some(64 * 1024 * 1024)
        );
        assert_eq!(sizes.expected_for(&sel, "SmallLeafSpine.host[3]"), None);
        let other = EntitySelector::new("server", 3);
        assert_eq!(
            sizes.expected_for(&other, "SmallLeafSpine.server[3].app[1]"),
            None
        );
    }

    #[test]
    fn test_parse_quantity_units() {
        assert_eq!(parse_quantity("100"), Some(100));
        assert_eq!(parse_quantity("100B"), Some(100));
        assert_eq!(parse_quantity("2 KiB"), Some(2048));
        assert_eq!(parse_quantity("1.5kB"), Some(1500));
        assert_eq!(parse_quantity("3MB"), Some(3_000_000));
        assert_eq!(parse_quantity("1GiB"), Some(1 << 30));
        assert_eq!(parse_quantity("10s"), None);
        assert_eq!(parse_quantity("-5B"), None);
    }

    #[test]
    fn test_app_index() {
        assert_eq!(app_index("Net.host[0].app[12]"), Some(12));
        assert_eq!(app_index("Net.host[0].app[12].socket"), Some(12));
        assert_eq!(app_index("Net.host[0]"), None);
    }

    #[test]
    fn test_load_missing_file() {
        let err = FlowSizes::load(Path::new("/nonexistent/flows.inc")).unwrap_err();
        assert!(matches!(err, ExtractError::FlowConfig { .. }));
    }
}
