//! Bounded, ordered collection of carried victims.

use crate::game::PriorityClass;
use serde::{Deserialize, Serialize};

/// Victims the player is carrying, in pickup order.
///
/// # Examples
///
/// ```
/// use sar_mission::{CarryStack, PriorityClass};
///
/// let mut carried = CarryStack::new(1);
/// assert!(carried.try_push(PriorityClass::High));
/// assert!(!carried.try_push(PriorityClass::Low));
/// assert_eq!(carried.drain_all(), vec![PriorityClass::High]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarryStack {
    capacity: usize,
    items: Vec<PriorityClass>,
}

impl CarryStack {
    /// Creates an empty stack; capacity is at least one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Appends if below capacity. Returns whether the victim was taken.
    pub fn try_push(&mut self, priority: PriorityClass) -> bool {
        if self.is_full() {
            return false;
        }
        self.items.push(priority);
        true
    }

    /// Removes and returns everything carried.
    pub fn drain_all(&mut self) -> Vec<PriorityClass> {
        std::mem::take(&mut self.items)
    }

    pub fn as_slice(&self) -> &[PriorityClass] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_becomes_one() {
        let carried = CarryStack::new(0);
        assert_eq!(carried.capacity(), 1);
    }

    #[test]
    fn test_push_until_full() {
        let mut carried = CarryStack::new(3);
        assert!(carried.try_push(PriorityClass::Low));
        assert!(carried.try_push(PriorityClass::High));
        assert!(carried.try_push(PriorityClass::Medium));
        assert!(carried.is_full());
        assert!(!carried.try_push(PriorityClass::High));
        assert_eq!(carried.len(), 3);
        assert_eq!(
            carried.as_slice(),
            &[PriorityClass::Low, PriorityClass::High, PriorityClass::Medium]
        );
    }

    #[test]
    fn test_drain_clears() {
        let mut carried = CarryStack::new(2);
        carried.try_push(PriorityClass::Medium);
        let delivered = carried.drain_all();
        assert_eq!(delivered.len(), 1);
        assert!(carried.is_empty());
        assert!(carried.try_push(PriorityClass::Low));
    }
}
