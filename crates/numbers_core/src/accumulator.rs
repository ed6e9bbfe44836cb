use std::collections::BTreeSet;

/// Deduplicating accumulator for one merge call.
///
/// Values may arrive in any order and any number of times; `finalize` yields
/// each distinct value once, ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumberSet {
    values: BTreeSet<i64>,
}

impl NumberSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_batch<I>(&mut self, batch: I)
    where
        I: IntoIterator<Item = i64>,
    {
        self.values.extend(batch);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Consumes the set and returns its values in ascending order.
    pub fn finalize(self) -> Vec<i64> {
        self.values.into_iter().collect()
    }
}
