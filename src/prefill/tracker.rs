use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::vin::normalize_vin;

const MIN_PREFILL_LENGTH: usize = 3;

/// Orders overlapping prefill lookups so a slow earlier request cannot
/// overwrite the answer for a VIN typed later.
#[derive(Debug, Default)]
pub struct PrefillTracker {
    seq: AtomicU64,
    last_vin: Mutex<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefillTicket {
    pub seq: u64,
    pub vin: String,
}

impl PrefillTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a lookup for `vin`. `None` when the VIN is too short to say
    /// anything or was already the last one looked up.
    pub fn begin(&self, vin: &str) -> Option<PrefillTicket> {
        let normalized = normalize_vin(vin);
        if normalized.len() < MIN_PREFILL_LENGTH {
            return None;
        }
        let mut last = self
            .last_vin
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if *last == normalized {
            return None;
        }
        last.clone_from(&normalized);
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        Some(PrefillTicket {
            seq,
            vin: normalized,
        })
    }

    pub fn is_current(&self, seq: u64) -> bool {
        self.seq.load(Ordering::SeqCst) == seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_tickets_supersede_earlier_ones() {
        let tracker = PrefillTracker::new();
        let first = tracker.begin("1FA").expect("first");
        let second = tracker.begin("1FAHP").expect("second");
        assert!(second.seq > first.seq);
        assert!(!tracker.is_current(first.seq));
        assert!(tracker.is_current(second.seq));
    }

    #[test]
    fn short_and_repeated_vins_are_skipped() {
        let tracker = PrefillTracker::new();
        assert!(tracker.begin("1F").is_none());
        assert!(tracker.begin("1fa-hp3").is_some());
        assert!(tracker.begin("1FAHP3").is_none());
        assert!(tracker.begin("1FAHP3F").is_some());
    }
}
