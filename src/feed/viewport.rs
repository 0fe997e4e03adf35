/// Tracks which feed position is "active" (autoplaying) from visibility
/// observations. At most one index is active; the latest item to cross the
/// threshold wins.
pub struct ViewportController {
    threshold: f64,
    active: Option<usize>,
    item_count: usize,
}

impl ViewportController {
    pub fn new(threshold: f64, item_count: usize) -> Self {
        Self {
            threshold,
            active: if item_count > 0 { Some(0) } else { None },
            item_count,
        }
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.active == Some(index)
    }

    /// Record that `index` is `visible_fraction` visible. Returns the new
    /// active index when it changed.
    pub fn observe(&mut self, index: usize, visible_fraction: f64) -> Option<usize> {
        // NaN compares false both ways and must not activate anything
        if index >= self.item_count || !(visible_fraction >= self.threshold) {
            return None;
        }
        if self.active == Some(index) {
            return None;
        }
        self.active = Some(index);
        tracing::trace!(index, visible_fraction, "feed item became active");
        Some(index)
    }

    /// Apply a batch of observations delivered together, in delivery order.
    /// Returns the final active index if it changed.
    pub fn observe_all<I>(&mut self, entries: I) -> Option<usize>
    where
        I: IntoIterator<Item = (usize, f64)>,
    {
        let before = self.active;
        for (index, fraction) in entries {
            self.observe(index, fraction);
        }
        if self.active != before { self.active } else { None }
    }

    /// Forget the active item after the feed was recomposed.
    pub fn reset(&mut self, item_count: usize) {
        self.item_count = item_count;
        self.active = if item_count > 0 { Some(0) } else { None };
    }
}
