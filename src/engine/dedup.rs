use std::collections::HashSet;

use crate::domain::Item;

/// Ids already captured for one task.
///
/// Re-extracting a viewport after a scroll or page step returns many of the
/// same cards again; only the first sighting of an id is kept.
#[derive(Debug, Default)]
pub struct DedupIndex {
    seen: HashSet<String>,
}

impl DedupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the items whose id has not been seen before, in input order,
    /// and remembers their ids.
    pub fn observe(&mut self, raw: Vec<Item>) -> Vec<Item> {
        let mut fresh = Vec::new();
        for item in raw {
            if item.id.is_empty() {
                tracing::warn!("Dropping item without id: {}", item.url);
                continue;
            }
            if self.seen.insert(item.id.clone()) {
                fresh.push(item);
            }
        }
        fresh
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }
}
