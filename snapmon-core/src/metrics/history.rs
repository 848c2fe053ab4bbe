//! Per-port counter history and counter-to-rate conversion.
//!
//! History stores the last raw value seen for each of the seven tracked
//! counters, keyed by interface index. Every observation of a port overwrites
//! all seven values, whether or not anything was emitted for them.

use crate::api::PortState;
use crate::error::{Result, SnapmonError};
use crate::sink::MetricKind;
use std::collections::HashMap;

/// The cumulative counters tracked for every port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterField {
    DiscardIn,
    DiscardOut,
    Sent,
    SentMc,
    SentBc,
    InOctets,
    OutOctets,
}

impl CounterField {
    /// All fields, in evaluation and emission order.
    pub const ALL: [CounterField; 7] = [
        Self::DiscardIn,
        Self::DiscardOut,
        Self::Sent,
        Self::SentMc,
        Self::SentBc,
        Self::InOctets,
        Self::OutOctets,
    ];

    /// Field name in the emitted `ports` measurement.
    pub fn name(self) -> &'static str {
        match self {
            Self::DiscardIn => "discard_in",
            Self::DiscardOut => "discard_out",
            Self::Sent => "sent",
            Self::SentMc => "sent_mc",
            Self::SentBc => "sent_bc",
            Self::InOctets => "in_octets",
            Self::OutOctets => "out_octets",
        }
    }

    /// Discards are reported as raw per-poll deltas, everything else per second.
    pub fn is_rate(self) -> bool {
        !matches!(self, Self::DiscardIn | Self::DiscardOut)
    }

    pub fn kind(self) -> MetricKind {
        if self.is_rate() {
            MetricKind::Gauge
        } else {
            MetricKind::Counter
        }
    }

    /// Fields that publish an immediate `0` when the device reports the counter
    /// as zero, independent of whether the port's full set is emitted.
    pub fn reports_unpopulated(self) -> bool {
        matches!(self, Self::SentBc | Self::InOctets | Self::OutOctets)
    }

    /// Current raw value of this counter on `port`.
    pub fn read(self, port: &PortState) -> i64 {
        match self {
            Self::DiscardIn => port.if_in_discards,
            Self::DiscardOut => port.if_out_discards,
            Self::Sent => port.if_ether_pkts,
            Self::SentMc => port.if_ether_mc_pkts,
            Self::SentBc => port.if_ether_bcast_pkts,
            Self::InOctets => port.if_in_octets,
            Self::OutOctets => port.if_out_octets,
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Last raw value seen for each counter of one port.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSet([i64; 7]);

impl CounterSet {
    pub fn get(&self, field: CounterField) -> i64 {
        self.0[field.slot()]
    }

    pub fn set(&mut self, field: CounterField, value: i64) {
        self.0[field.slot()] = value;
    }
}

/// Outcome of evaluating one counter for one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reading {
    /// The device reports zero: the counter is not populated on this hardware.
    Unpopulated,
    /// Delta (discards) or per-second rate (everything else).
    Value(i64),
    /// No baseline yet, or no elapsed time to divide by.
    Unavailable,
}

impl Reading {
    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Unavailable)
    }

    /// Value to publish; unpopulated counters publish zero.
    pub fn value(&self) -> Option<i64> {
        match self {
            Self::Unpopulated => Some(0),
            Self::Value(v) => Some(*v),
            Self::Unavailable => None,
        }
    }
}

/// Evaluate one counter against the value seen on the previous poll.
///
/// A previous value of zero means there is no baseline. Counter resets are not
/// special-cased: a counter that went backwards yields a negative value.
pub fn evaluate(
    field: CounterField,
    current: i64,
    previous: i64,
    elapsed_secs: i64,
) -> Result<Reading> {
    if current == 0 {
        return Ok(Reading::Unpopulated);
    }
    if previous == 0 {
        return Ok(Reading::Unavailable);
    }

    let delta = current.checked_sub(previous).ok_or_else(|| {
        SnapmonError::Internal(format!(
            "{} delta overflows: current {} previous {}",
            field.name(),
            current,
            previous
        ))
    })?;

    if !field.is_rate() {
        return Ok(Reading::Value(delta));
    }
    if elapsed_secs <= 0 {
        return Ok(Reading::Unavailable);
    }

    // i64 division truncates toward zero
    Ok(Reading::Value(delta / elapsed_secs))
}

/// Readings for all seven counters of a port, indexed by field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortReadings([Reading; 7]);

impl PortReadings {
    pub fn get(&self, field: CounterField) -> Reading {
        self.0[field.slot()]
    }

    /// True when every counter produced a usable reading this poll.
    pub fn is_complete(&self) -> bool {
        self.0.iter().all(Reading::is_available)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CounterField, Reading)> + '_ {
        CounterField::ALL.iter().map(move |f| (*f, self.get(*f)))
    }
}

/// Counter history for every port seen so far.
#[derive(Debug, Default, Clone)]
pub struct PortHistory {
    ports: HashMap<i64, CounterSet>,
}

impl PortHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, if_index: i64) -> Option<&CounterSet> {
        self.ports.get(&if_index)
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    /// Evaluate every counter of `port` and record its raw values as the new
    /// baseline.
    ///
    /// All seven baselines are replaced before the first evaluation error is
    /// returned.
    pub fn observe(&mut self, port: &PortState, elapsed_secs: i64) -> Result<PortReadings> {
        let entry = self.ports.entry(port.if_index).or_default();
        let evaluated = CounterField::ALL.map(|field| {
            let current = field.read(port);
            let reading = evaluate(field, current, entry.get(field), elapsed_secs);
            entry.set(field, current);
            reading
        });

        let mut readings = [Reading::Unavailable; 7];
        for (field, reading) in CounterField::ALL.into_iter().zip(evaluated) {
            readings[field.slot()] = reading?;
        }

        Ok(PortReadings(readings))
    }
}
