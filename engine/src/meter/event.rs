//! Meter event log
//!
//! Every state change of a meter is recorded as a [`MeterEvent`] so a trip
//! can be audited after the fact and callers can react to mode changes
//! (haptic or visual cue) without polling.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{MeterMode, TickRejection};

/// Meter event capturing a state change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MeterEvent {
    TripStarted {
        at: NaiveDateTime,
        is_airport: bool,
        is_night_rate: bool,
    },

    /// Billing switched between distance and waiting
    ModeChanged {
        at: NaiveDateTime,
        from: MeterMode,
        to: MeterMode,
        speed_kmh: f64,
    },

    /// Sample ignored; accumulators untouched
    TickRejected {
        at: NaiveDateTime,
        reason: TickRejection,
    },

    Paused,

    Resumed,

    TripStopped {
        distance_km: f64,
        waiting_minutes: f64,
    },

    Reset,
}

impl MeterEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            MeterEvent::TripStarted { .. } => "TripStarted",
            MeterEvent::ModeChanged { .. } => "ModeChanged",
            MeterEvent::TickRejected { .. } => "TickRejected",
            MeterEvent::Paused => "Paused",
            MeterEvent::Resumed => "Resumed",
            MeterEvent::TripStopped { .. } => "TripStopped",
            MeterEvent::Reset => "Reset",
        }
    }
}

/// Append-only log of meter events in the order they occurred
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeterEventLog {
    events: Vec<MeterEvent>,
}

impl MeterEventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn log(&mut self, event: MeterEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[MeterEvent] {
        &self.events
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<&MeterEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Mode transitions as `(from, to)` pairs
    pub fn mode_changes(&self) -> Vec<(MeterMode, MeterMode)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                MeterEvent::ModeChanged { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    /// Drain events recorded since the caller last drained
    pub fn take(&mut self) -> Vec<MeterEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_and_take() {
        let mut log = MeterEventLog::new();
        log.log(MeterEvent::Paused);
        log.log(MeterEvent::Resumed);
        log.log(MeterEvent::Paused);
        assert_eq!(log.events_of_type("Paused").len(), 2);

        let drained = log.take();
        assert_eq!(drained.len(), 3);
        assert!(log.is_empty());
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let json = serde_json::to_string(&MeterEvent::Reset).unwrap();
        assert_eq!(json, r#"{"type":"reset"}"#);
    }
}
