//! Pagination and filter state for the results views.
//!
//! One `ViewState` per session/controller instance — explicit state instead
//! of process-wide singletons, so concurrent sessions never collide. The
//! generation counter lets the presentation layer discard responses from a
//! refresh that has since been superseded (overlapping auto-refresh ticks
//! are not cancelled; last issued wins).

use serde::{Deserialize, Serialize};

/// Fixed page size for the results and alerts views.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Token identifying one refresh round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewState {
    pub page: u32,
    pub per_page: u32,
    pub tenant_id: String,
    /// Wire status tag (`ALRT`/`NALT`) restricting the view; `None` = all.
    pub status_filter: Option<String>,
    #[serde(skip)]
    generation: u64,
}

impl ViewState {
    pub fn new(tenant_id: impl Into<String>) -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            tenant_id: tenant_id.into(),
            status_filter: None,
            generation: 0,
        }
    }

    /// Advance one page. No upper bound: navigating past the last page is
    /// allowed and yields an empty row set, rendered as an explicit empty
    /// state by the caller.
    pub fn next_page(&mut self) {
        self.page += 1;
    }

    /// Go back one page; no-op below page 1.
    pub fn prev_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }

    /// Replace the status filter and reset to page 1.
    pub fn set_status_filter(&mut self, filter: Option<String>) {
        self.status_filter = filter;
        self.page = 1;
    }

    /// Row offset for the store query.
    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.per_page as i64
    }

    /// Start a refresh round trip, invalidating all earlier generations.
    pub fn begin_refresh(&mut self) -> Generation {
        self.generation += 1;
        Generation(self.generation)
    }

    /// Whether a response carrying `gen` is still the latest refresh.
    pub fn is_current(&self, gen: Generation) -> bool {
        gen.0 == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_then_prev_returns_to_same_page() {
        for start in [2u32, 5, 100] {
            let mut v = ViewState::new("T");
            v.page = start;
            v.next_page();
            v.prev_page();
            assert_eq!(v.page, start);
        }
    }

    #[test]
    fn prev_at_page_one_stays_at_page_one() {
        let mut v = ViewState::new("T");
        v.prev_page();
        assert_eq!(v.page, 1);
    }

    #[test]
    fn next_has_no_upper_bound() {
        let mut v = ViewState::new("T");
        v.page = 9_999;
        v.next_page();
        assert_eq!(v.page, 10_000);
    }

    #[test]
    fn filter_change_resets_to_page_one() {
        let mut v = ViewState::new("T");
        v.page = 7;
        v.set_status_filter(Some("ALRT".into()));
        assert_eq!(v.page, 1);
        assert_eq!(v.status_filter.as_deref(), Some("ALRT"));

        v.page = 3;
        v.set_status_filter(None);
        assert_eq!(v.page, 1);
        assert!(v.status_filter.is_none());
    }

    #[test]
    fn offset_math() {
        let mut v = ViewState::new("T");
        assert_eq!(v.offset(), 0);
        v.page = 3;
        assert_eq!(v.offset(), 40);
    }

    #[test]
    fn stale_generation_is_discarded() {
        let mut v = ViewState::new("T");
        let slow = v.begin_refresh();
        let fast = v.begin_refresh();
        // The slow response arrives after the newer tick fired.
        assert!(!v.is_current(slow));
        assert!(v.is_current(fast));
    }
}
