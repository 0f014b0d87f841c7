//! Flow completion analysis over normalised series.
//!
//! This module turns the series recorded under one receiving entity into flow
//! completion records, one per entity path, choosing among signal families by
//! fixed precedence.

mod inventory;
mod reconstruct;
mod summary;

pub use inventory::{InventoryEntry, SignalInventory};
pub use reconstruct::{
    from_arrival_span, from_cumulative, from_increments, prefix_sum, FlowRecord, ReconstructFn,
    TargetSource,
};
pub use summary::{percentile, PercentileSummary, SUMMARY_QUANTILES};

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::ExtractConfig;
use crate::trace::{Series, SignalFamily};

/// A series with a recognised family and its place in the signal table.
struct Candidate<'a> {
    precedence: usize,
    family: SignalFamily,
    series: &'a Series,
}

/// Reconstruct flow records from all series of one input.
///
/// For each entity path, byte-based candidates are tried in signal-table
/// order and the first record wins. The delay fallback is only used for an
/// entity with no byte-based series at all; a byte series that never reaches
/// its target yields nothing rather than a delay span.
///
/// Records are returned sorted by duration ascending, ties broken by entity
/// and signal, so the result does not depend on series order.
pub fn reconstruct<'a, I>(series: I, config: &ExtractConfig) -> Vec<FlowRecord>
where
    I: IntoIterator<Item = &'a Series>,
{
    let mut by_entity: BTreeMap<&str, Vec<Candidate<'a>>> = BTreeMap::new();
    for s in series {
        let (Some(precedence), Some(family)) = (SignalFamily::precedence(s.signal()), s.family())
        else {
            continue;
        };
        by_entity.entry(s.entity()).or_default().push(Candidate {
            precedence,
            family,
            series: s,
        });
    }

    let mut records: Vec<FlowRecord> = by_entity
        .into_iter()
        .filter_map(|(entity, mut candidates)| {
            candidates.sort_by_key(|c| c.precedence);
            reconstruct_entity(entity, &candidates, config)
        })
        .collect();

    sort_records(&mut records);
    records
}

fn reconstruct_entity(
    entity: &str,
    candidates: &[Candidate<'_>],
    config: &ExtractConfig,
) -> Option<FlowRecord> {
    let has_byte_series = candidates.iter().any(|c| c.family.is_byte_based());

    if has_byte_series {
        let expected = config.expected_total(entity).map(|b| b as f64);
        if expected.is_none() && config.require_expected_total {
            debug!("{entity}: no expected byte total, skipping byte-based signals");
            return None;
        }
        let record = candidates
            .iter()
            .filter(|c| c.family.is_byte_based())
            .find_map(|c| c.family.strategy()(c.series, expected));
        match &record {
            Some(r) => debug!(
                "{entity}: {} via {} ({})",
                r.duration,
                r.signal,
                r.target.as_str()
            ),
            None => debug!("{entity}: byte signals present but flow never started or completed"),
        }
        return record;
    }

    let record = candidates
        .iter()
        .find_map(|c| c.family.strategy()(c.series, None));
    if let Some(r) = &record {
        debug!("{entity}: {} via {} (arrival span)", r.duration, r.signal);
    }
    record
}

/// Order records by completion duration, then entity, then signal.
pub fn sort_records(records: &mut [FlowRecord]) {
    records.sort_by(|a, b| {
        a.duration
            .total_cmp(&b.duration)
            .then_with(|| a.entity.cmp(&b.entity))
            .then_with(|| a.signal.cmp(&b.signal))
    });
}

/// Signal names searched for, in precedence order, for diagnostics.
pub fn searched_signals() -> Vec<&'static str> {
    SignalFamily::ALL
        .iter()
        .flat_map(|f| f.signal_names())
        .collect()
}
