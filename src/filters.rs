use std::time::{Duration, Instant};

pub const DEFAULT_PER_PAGE: u32 = 50;

/// Delay between the last search keystroke and the request it triggers.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Query parameters for the transaction collection view.
///
/// Transition rule: changing any filter field resets `page` to 1; paging
/// is bounded by the server-reported page count (`set_page` is a no-op
/// outside `1..=pages`). The state is never visible to the renderer in an
/// uncommitted form — every transition is followed by a reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub page: u32,
    pub per_page: u32,
    pub search: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub account_id: Option<String>,
    pub flow_type: Option<String>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            search: String::new(),
            start_date: None,
            end_date: None,
            account_id: None,
            flow_type: None,
        }
    }
}

impl FilterState {
    pub fn set_search(&mut self, search: String) {
        self.search = search;
        self.page = 1;
    }

    pub fn set_date_range(&mut self, start: Option<String>, end: Option<String>) {
        self.start_date = start;
        self.end_date = end;
        self.page = 1;
    }

    pub fn set_account(&mut self, account_id: Option<String>) {
        self.account_id = account_id;
        self.page = 1;
    }

    pub fn set_flow_type(&mut self, flow_type: Option<String>) {
        self.flow_type = flow_type;
        self.page = 1;
    }

    /// Move to page `n`. No-op unless `1 <= n <= pages`, where `pages`
    /// comes from the server's pagination metadata.
    pub fn set_page(&mut self, n: u32, pages: u32) -> bool {
        if n >= 1 && n <= pages {
            self.page = n;
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        let per_page = self.per_page;
        *self = Self {
            per_page,
            ..Self::default()
        };
    }

    pub fn has_filters(&self) -> bool {
        !self.search.is_empty()
            || self.start_date.is_some()
            || self.end_date.is_some()
            || self.account_id.is_some()
            || self.flow_type.is_some()
    }

    /// Encode as a URL query string for `GET /api/dashboard/transactions`.
    pub fn to_query(&self) -> String {
        let mut pairs = vec![
            format!("page={}", self.page),
            format!("per_page={}", self.per_page),
        ];
        if !self.search.is_empty() {
            pairs.push(format!("search={}", urlencoding::encode(&self.search)));
        }
        if let Some(ref d) = self.start_date {
            pairs.push(format!("start_date={d}"));
        }
        if let Some(ref d) = self.end_date {
            pairs.push(format!("end_date={d}"));
        }
        if let Some(ref id) = self.account_id {
            pairs.push(format!("account_id={}", urlencoding::encode(id)));
        }
        if let Some(ref t) = self.flow_type {
            pairs.push(format!("cash_flow_type={}", urlencoding::encode(t)));
        }
        pairs.join("&")
    }
}

/// Fixed-delay debounce timer for search input. Each keystroke resets the
/// deadline; only the final pending deadline fires. Time is injected so
/// tests are deterministic.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Record an input event at `now`, resetting the deadline.
    pub fn input(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Returns true exactly once, when the deadline has passed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time until the pending deadline, for use as an event-poll timeout.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

/// Monotonic request-generation counter. A view tags each reload with
/// `begin()` and applies the result only if `is_current()` still holds,
/// so a superseded response can never overwrite newer state.
#[derive(Debug, Default)]
pub struct RequestGen {
    counter: u64,
}

impl RequestGen {
    pub fn begin(&mut self) -> u64 {
        self.counter += 1;
        self.counter
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_change_resets_page() {
        let mut state = FilterState {
            page: 7,
            ..Default::default()
        };
        state.set_search("coffee".to_string());
        assert_eq!(state.page, 1);

        state.page = 4;
        state.set_account(Some("acc-1".to_string()));
        assert_eq!(state.page, 1);

        state.page = 3;
        state.set_date_range(Some("2026-01-01".to_string()), None);
        assert_eq!(state.page, 1);

        state.page = 2;
        state.set_flow_type(Some("expense".to_string()));
        assert_eq!(state.page, 1);
    }

    #[test]
    fn test_set_page_bounds() {
        let mut state = FilterState::default();
        assert!(!state.set_page(0, 10));
        assert_eq!(state.page, 1);

        assert!(!state.set_page(11, 10));
        assert_eq!(state.page, 1);

        assert!(state.set_page(10, 10));
        assert_eq!(state.page, 10);

        // No pages at all (empty result set): every move is a no-op
        assert!(!state.set_page(1, 0));
    }

    #[test]
    fn test_clear_restores_defaults_keeping_page_size() {
        let mut state = FilterState {
            page: 5,
            per_page: 25,
            search: "rent".to_string(),
            account_id: Some("acc-9".to_string()),
            ..Default::default()
        };
        state.clear();
        assert_eq!(state, FilterState {
            per_page: 25,
            ..Default::default()
        });
        assert!(!state.has_filters());
    }

    #[test]
    fn test_to_query_encodes_set_fields_only() {
        let mut state = FilterState::default();
        assert_eq!(state.to_query(), "page=1&per_page=50");

        state.set_search("coffee shop".to_string());
        state.set_account(Some("acc-1".to_string()));
        state.set_date_range(Some("2026-01-01".to_string()), Some("2026-06-30".to_string()));
        let query = state.to_query();
        assert!(query.contains("search=coffee%20shop"));
        assert!(query.contains("start_date=2026-01-01"));
        assert!(query.contains("end_date=2026-06-30"));
        assert!(query.contains("account_id=acc-1"));
        assert!(!query.contains("cash_flow_type"));
    }

    #[test]
    fn test_to_query_escapes_reserved_characters() {
        let mut state = FilterState::default();
        state.set_search("a&b=c".to_string());
        assert!(state.to_query().contains("search=a%26b%3Dc"));

        state.set_search("caf\u{e9}".to_string());
        assert!(state.to_query().contains("search=caf%C3%A9"));
    }

    #[test]
    fn test_debounce_coalesces_rapid_input() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        // "a" typed, then "ab" 100ms later: only one fire, after the
        // final keystroke's deadline.
        debouncer.input(start);
        assert!(!debouncer.fire(start + Duration::from_millis(100)));
        debouncer.input(start + Duration::from_millis(100));
        assert!(!debouncer.fire(start + Duration::from_millis(350)));
        assert!(debouncer.fire(start + Duration::from_millis(400)));

        // Fires exactly once
        assert!(!debouncer.fire(start + Duration::from_millis(500)));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_debounce_remaining_feeds_poll_timeout() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        assert!(debouncer.remaining(start).is_none());

        debouncer.input(start);
        let rem = debouncer.remaining(start + Duration::from_millis(100)).unwrap();
        assert_eq!(rem, Duration::from_millis(200));

        // Past the deadline the remaining time saturates at zero
        let rem = debouncer.remaining(start + Duration::from_millis(400)).unwrap();
        assert_eq!(rem, Duration::ZERO);
    }

    #[test]
    fn test_request_generation_discards_stale() {
        let mut gen = RequestGen::default();
        let first = gen.begin();
        let second = gen.begin();
        assert!(!gen.is_current(first)); // superseded response is dropped
        assert!(gen.is_current(second));
    }
}
