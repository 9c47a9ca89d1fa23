use std::collections::{btree_map, BTreeMap};

/// Separator between frames of a folded stack key.
pub const FRAME_SEPARATOR: char = ';';

/// Occurrence counts per call stack.
///
/// Stacks are keyed by their frames joined with `;`, root first. Iteration
/// is sorted by key.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StackCounter {
    stacks: BTreeMap<String, u64>,
}

impl StackCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `count` more samples of the stack made of `frames`, root first.
    pub fn add<S: AsRef<str>>(&mut self, frames: &[S], count: u64) {
        let mut key = String::new();
        for (i, frame) in frames.iter().enumerate() {
            if i > 0 {
                key.push(FRAME_SEPARATOR);
            }
            key.push_str(frame.as_ref());
        }
        self.add_folded(key, count);
    }

    /// Record `count` more samples of an already folded stack key.
    pub fn add_folded(&mut self, stack: impl Into<String>, count: u64) {
        let total = self.stacks.entry(stack.into()).or_default();
        *total = total.saturating_add(count);
    }

    #[must_use]
    pub fn get(&self, stack: &str) -> Option<u64> {
        self.stacks.get(stack).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stacks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    /// Total number of samples across all stacks.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.stacks
            .values()
            .fold(0, |total, count| total.saturating_add(*count))
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, u64> {
        self.stacks.iter()
    }
}

impl<'a> IntoIterator for &'a StackCounter {
    type Item = (&'a String, &'a u64);
    type IntoIter = btree_map::Iter<'a, String, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.stacks.iter()
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for StackCounter {
    fn from_iter<T: IntoIterator<Item = (S, u64)>>(iter: T) -> Self {
        let mut counter = Self::new();
        for (stack, count) in iter {
            counter.add_folded(stack, count);
        }
        counter
    }
}
