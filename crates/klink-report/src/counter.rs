//! Frequency counting with first-seen tie-breaking.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
struct Entry {
    count: u64,
    first_seen: usize,
}

/// Counts occurrences of string keys and ranks them by count descending,
/// breaking ties by the order keys were first observed.
#[derive(Debug, Default)]
pub struct FrequencyCounter {
    entries: HashMap<String, Entry>,
    observed: u64,
}

impl FrequencyCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: impl Into<String>) {
        let next_rank = self.entries.len();
        self.entries
            .entry(key.into())
            .and_modify(|e| e.count += 1)
            .or_insert(Entry {
                count: 1,
                first_seen: next_rank,
            });
        self.observed += 1;
    }

    /// Total number of observations (not distinct keys)
    pub fn total(&self) -> u64 {
        self.observed
    }

    /// The `n` most frequent keys with their counts
    pub fn top(&self, n: usize) -> Vec<(String, u64)> {
        let mut ranked: Vec<(&String, &Entry)> = self.entries.iter().collect();
        ranked.sort_by(|a, b| {
            b.1.count
                .cmp(&a.1.count)
                .then(a.1.first_seen.cmp(&b.1.first_seen))
        });

        ranked
            .into_iter()
            .take(n)
            .map(|(key, entry)| (key.clone(), entry.count))
            .collect()
    }
}
