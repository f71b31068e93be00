//! Bounded log of committed transitions for diagnostics

use crate::resolver::Transition;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct TransitionHistory {
    capacity: usize,
    entries: VecDeque<Transition>,
}

impl TransitionHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::with_capacity(capacity.max(1)),
        }
    }

    /// Record a transition, evicting the oldest when full
    pub fn push(&mut self, transition: Transition) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(transition);
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&Transition> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
