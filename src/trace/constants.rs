//! Shared constants for trace processing.
//!
//! Column names are compared after trimming and lower-casing the header.

use std::sync::LazyLock;

use regex::Regex;

use super::models::SignalFamily;

pub const COL_TYPE: &str = "type";
pub const COL_MODULE: &str = "module";
pub const COL_NAME: &str = "name";
pub const COL_VECTIME: &str = "vectime";
pub const COL_VECVALUE: &str = "vecvalue";
pub const COL_TIME: &str = "time";
pub const COL_VALUE: &str = "value";

/// Row type tag of the rows that carry time-series samples.
pub const VECTOR_ROW_TYPE: &str = "vector";

/// Recognised signal names in precedence order.
///
/// Reconstruction tries candidates in this order; the first row whose name
/// matches decides the family.
pub const SIGNAL_TABLE: &[(&str, SignalFamily)] = &[
    ("rcvdBytes:vector", SignalFamily::CumulativeBytes),
    ("rcvdPk:vector(packetBytes)", SignalFamily::IncrementalPacketBytes),
    (
        "packetReceived:vector(packetBytes)",
        SignalFamily::IncrementalPacketBytes,
    ),
    ("endToEndDelay:vector", SignalFamily::InterArrivalDelay),
];

/// Static regex for the application index inside an entity path.
/// Pattern: `...host[0].app[12]...`
pub static APP_INDEX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\.)app\[(\d+)\](?:\.|$)").expect("Invalid app index regex pattern")
});

/// Static regex for `sendBytes` assignments in a traffic configuration fragment.
/// Pattern: `**.{kind}[{node}].app[{app}].sendBytes = {quantity}`
pub static SEND_BYTES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\.)([A-Za-z_]\w*)\[(\d+)\]\.app\[(\d+)\]\.sendBytes\s*=\s*(.+?)\s*$")
        .expect("Invalid sendBytes regex pattern")
});

/// Static regex for an ini quantity such as `524288B` or `64 MiB`.
pub static QUANTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)?)\s*([A-Za-z]*)$").expect("Invalid quantity regex pattern")
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_index_re() {
        let caps = APP_INDEX_RE
            .captures("SmallLeafSpine.host[0].app[12].sink")
            .unwrap();
        assert_eq!(&caps[1], "12");
        assert!(APP_INDEX_RE.captures("Net.host[0].myapp[3]").is_none());
    }

    #[test]
    fn test_send_bytes_re() {
        let caps = SEND_BYTES_RE
            .captures("**.host[4].app[2].sendBytes = 524288B")
            .unwrap();
        assert_eq!(&caps[1], "host");
        assert_eq!(&caps[2], "4");
        assert_eq!(&caps[3], "2");
        assert_eq!(&caps[4], "524288B");
    }

    #[test]
    fn test_signal_table_order() {
        let families: Vec<SignalFamily> = SIGNAL_TABLE.iter().map(|(_, f)| *f).collect();
        assert_eq!(families.first(), Some(&SignalFamily::CumulativeBytes));
        assert_eq!(families.last(), Some(&SignalFamily::InterArrivalDelay));
    }
}
