//! Normalised trace data shared by the loader and the reconstructor.

use serde::Serialize;

use super::constants::SIGNAL_TABLE;

/// One timestamped sample of a signal.
///
/// Note: Cannot derive `Eq` because both fields are `f64`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub time: f64,
    pub value: f64,
}

impl Sample {
    pub fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }
}

/// The samples recorded for one (entity, signal) pair.
///
/// Constructing a `Series` is the normalisation point: NaN and infinite
/// samples are dropped and the rest are sorted ascending by time. Samples sharing a timestamp are
/// ordered by value, so the result never depends on input order. A `Series`
/// is immutable afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    entity: String,
    signal: String,
    samples: Vec<Sample>,
}

impl Series {
    pub fn new(entity: impl Into<String>, signal: impl Into<String>, samples: Vec<Sample>) -> Self {
        let mut samples: Vec<Sample> = samples
            .into_iter()
            .filter(|s| s.time.is_finite() && s.value.is_finite())
            .collect();
        samples.sort_by(|a, b| {
            a.time
                .total_cmp(&b.time)
                .then(a.value.total_cmp(&b.value))
        });
        Self {
            entity: entity.into(),
            signal: signal.into(),
            samples,
        }
    }

    /// Full module path of the entity that recorded the signal.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn signal(&self) -> &str {
        &self.signal
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Family of the recorded signal, if it is one we know how to reconstruct.
    pub fn family(&self) -> Option<SignalFamily> {
        SignalFamily::classify(&self.signal)
    }
}

/// What the values of a signal represent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalFamily {
    /// Running total of bytes received.
    CumulativeBytes,
    /// Byte size of each arrival; prefix-summed before use.
    IncrementalPacketBytes,
    /// Per-packet delay; only the sample times are meaningful.
    InterArrivalDelay,
}

impl SignalFamily {
    /// All families in reconstruction precedence order.
    pub const ALL: [SignalFamily; 3] = [
        SignalFamily::CumulativeBytes,
        SignalFamily::IncrementalPacketBytes,
        SignalFamily::InterArrivalDelay,
    ];

    /// Classify a signal name using the fixed signal table.
    pub fn classify(signal: &str) -> Option<Self> {
        SIGNAL_TABLE
            .iter()
            .find(|(name, _)| *name == signal)
            .map(|(_, family)| *family)
    }

    /// Position of a signal name in the signal table, used to order candidates.
    pub fn precedence(signal: &str) -> Option<usize> {
        SIGNAL_TABLE.iter().position(|(name, _)| *name == signal)
    }

    /// Whether the family carries byte accounting.
    pub fn is_byte_based(&self) -> bool {
        !matches!(self, SignalFamily::InterArrivalDelay)
    }

    /// Signal names that map to this family.
    pub fn signal_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        SIGNAL_TABLE
            .iter()
            .filter(move |(_, family)| family == self)
            .map(|(name, _)| *name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CumulativeBytes => "cumulative-bytes",
            Self::IncrementalPacketBytes => "incremental-packet-bytes",
            Self::InterArrivalDelay => "inter-arrival-delay",
        }
    }
}
