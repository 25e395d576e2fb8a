use std::collections::HashMap;

use crate::models::MarketSnapshot;

/// Outcome of feeding one snapshot into the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// First time this item was seen; nothing to compare against.
    FirstSeen,
    Unchanged,
    Notify,
}

/// Remembers the latest snapshot of every tracked item and decides whether a
/// fresh snapshot is worth a notification.
#[derive(Debug, Default)]
pub struct DiffEngine {
    previous: HashMap<u64, MarketSnapshot>,
}

impl DiffEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notify only when supply grew since the last cycle and, if the item has a
    /// threshold, the lowest price is at or under it.
    pub fn decide(current: &MarketSnapshot, previous: &MarketSnapshot) -> bool {
        if current.num_for_sale <= previous.num_for_sale {
            return false;
        }

        if current.has_threshold() {
            if let Some(lowest_price) = current.lowest_price {
                if lowest_price > current.minimum_price {
                    return false;
                }
            }
        }

        true
    }

    /// Compare against the previous cycle, then store `current` whatever the
    /// outcome.
    pub fn observe(&mut self, current: MarketSnapshot) -> Observation {
        let observation = match self.previous.get(&current.id) {
            None => Observation::FirstSeen,
            Some(previous) if Self::decide(&current, previous) => Observation::Notify,
            Some(_) => Observation::Unchanged,
        };

        self.previous.insert(current.id, current);
        observation
    }

    pub fn previous(&self, id: u64) -> Option<&MarketSnapshot> {
        self.previous.get(&id)
    }

    pub fn tracked(&self) -> usize {
        self.previous.len()
    }
}
