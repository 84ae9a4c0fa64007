//! Per-tier read cache.
//!
//! One cache per tier, invalidated wholesale on any state-changing call.
//! There is no partially-valid state and no externally observable
//! "populating" state: a read during population simply triggers its own
//! fetch.

use cc_core::PreviewItem;

/// `Invalid → (read miss repopulates) → Populated → (mutation) → Invalid`.
#[derive(Default)]
pub struct TierCache {
    data: Option<Vec<PreviewItem>>,
    valid: bool,
}

impl TierCache {
    /// Cached snapshot, or `None` when a fetch is required.
    pub fn snapshot(&self) -> Option<Vec<PreviewItem>> {
        if self.valid {
            self.data.clone()
        } else {
            None
        }
    }

    pub fn populate(&mut self, items: Vec<PreviewItem>) {
        self.data = Some(items);
        self.valid = true;
    }

    /// Idempotent whole-cache flag flip.
    pub fn invalidate(&mut self) {
        self.valid = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalidation_hides_the_snapshot_until_repopulated() {
        let mut cache = TierCache::default();
        assert!(cache.snapshot().is_none());

        cache.populate(vec![]);
        assert!(cache.snapshot().is_some());

        cache.invalidate();
        assert!(cache.snapshot().is_none());

        cache.populate(vec![]);
        assert!(cache.snapshot().is_some());
    }
}
