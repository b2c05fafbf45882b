//! Application state and fetch synchronization

use std::collections::HashSet;
use std::fmt;

use tokio::sync::watch;

use super::input::{InputMode, KeyBindings};
use super::rows::{self, DisplayRow, Layout};
use crate::models::CredentialSnapshot;

/// Fetch lifecycle state, driving the status indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchState {
    /// No fetch has been issued yet
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

/// Token tying a fetch completion back to its submission.
///
/// Sequence numbers increase monotonically per submission. A completion
/// carrying a number at or below the newest applied one is stale and
/// gets dropped, so among overlapping fetches issue order wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
}

impl FetchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// The UI's single owned mutable state holder.
///
/// All mutation happens through methods that consult the liveness flag
/// and bump the revision channel, so the event loop redraws exactly when
/// something visible changed and completions arriving after teardown are
/// discarded.
pub struct App {
    /// Rendering strategy (configuration choice)
    pub layout: Layout,

    /// Key binding style
    pub key_bindings: KeyBindings,

    /// Daemon URL shown in the status bar
    pub daemon_url: String,

    input_mode: InputMode,

    /// Latest query text, updated on every keystroke, read nowhere else
    query: String,

    /// Snapshot currently rendered; replaced wholesale, never merged
    snapshot: CredentialSnapshot,

    state: FetchState,

    /// Last fetch error, kept until the next applied completion
    error: Option<String>,

    /// Transient feedback line (clipboard yank)
    notice: Option<String>,

    /// Sequence number handed to the most recent fetch
    next_seq: u64,

    /// Sequence number of the newest applied completion
    applied_seq: u64,

    /// False once the view is torn down; mutations become no-ops
    open: bool,

    /// Bumped on every effective mutation; the event loop subscribes
    revision: watch::Sender<u64>,

    // Grid affordances
    cursor: usize,
    page: usize,
    /// Checkbox selection; rendered but consumed by nothing
    selected: HashSet<String>,

    /// List scroll offset
    scroll: usize,

    should_quit: bool,
}

impl App {
    /// Create a new app instance on view creation
    pub fn new(layout: Layout, key_bindings: KeyBindings, daemon_url: impl Into<String>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            layout,
            key_bindings,
            daemon_url: daemon_url.into(),
            input_mode: InputMode::Query,
            query: String::new(),
            snapshot: CredentialSnapshot::default(),
            state: FetchState::Idle,
            error: None,
            notice: None,
            next_seq: 0,
            applied_seq: 0,
            open: true,
            revision,
            cursor: 0,
            page: 0,
            selected: HashSet::new(),
            scroll: 0,
            should_quit: false,
        }
    }

    /// Subscribe to revision bumps; the receiver signals when a redraw
    /// is due
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn notify(&self) {
        self.revision.send_modify(|rev| *rev = rev.wrapping_add(1));
    }

    /// Tear the view down. Every later mutation is a no-op, so fetch
    /// completions that outlive the view cannot touch destroyed state.
    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn snapshot(&self) -> &CredentialSnapshot {
        &self.snapshot
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Store the latest query text verbatim. No validation, no length
    /// limit, and no effect on any in-flight fetch.
    pub fn set_query(&mut self, text: impl Into<String>) {
        if !self.open {
            return;
        }
        self.query = text.into();
        self.notify();
    }

    pub fn push_query_char(&mut self, c: char) {
        let mut text = self.query.clone();
        text.push(c);
        self.set_query(text);
    }

    pub fn pop_query_char(&mut self) {
        let mut text = self.query.clone();
        text.pop();
        self.set_query(text);
    }

    /// Mark a fetch in progress and hand out its sequence ticket.
    ///
    /// Every submission gets its own ticket (no deduplication); the
    /// Loading state itself is idempotent while a fetch is in flight.
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        if !self.open {
            return None;
        }
        self.next_seq += 1;
        let ticket = FetchTicket { seq: self.next_seq };
        if self.state != FetchState::Loading {
            self.state = FetchState::Loading;
            self.notify();
        }
        Some(ticket)
    }

    /// Replace the snapshot with a completed fetch's result, unless the
    /// completion is stale
    pub fn resolve_fetch(&mut self, ticket: FetchTicket, snapshot: CredentialSnapshot) {
        if !self.open {
            return;
        }
        if ticket.seq <= self.applied_seq {
            tracing::debug!(
                seq = ticket.seq,
                applied = self.applied_seq,
                "dropping stale fetch result"
            );
            return;
        }

        self.applied_seq = ticket.seq;
        self.snapshot = snapshot;
        self.error = None;
        self.notice = None;
        self.state = if ticket.seq == self.next_seq {
            FetchState::Ready
        } else {
            // A newer fetch is still in flight
            FetchState::Loading
        };

        let snapshot = &self.snapshot;
        self.selected.retain(|id| snapshot.get(id).is_some());
        self.clamp_to_snapshot();
        self.notify();
    }

    /// Record a failed fetch for display. The held snapshot stays as it
    /// was; a failed refresh never blanks out a prior result.
    pub fn fail_fetch(&mut self, ticket: FetchTicket, error: impl fmt::Display) {
        if !self.open {
            return;
        }
        if ticket.seq <= self.applied_seq {
            tracing::debug!(
                seq = ticket.seq,
                applied = self.applied_seq,
                "dropping stale fetch failure"
            );
            return;
        }

        self.applied_seq = ticket.seq;
        self.error = Some(format!("Failed to fetch credentials: {}", error));
        self.notice = None;
        self.state = if ticket.seq == self.next_seq {
            FetchState::Error
        } else {
            FetchState::Loading
        };
        self.notify();
    }

    pub fn enter_rows_mode(&mut self) {
        if !self.open || self.input_mode == InputMode::Rows {
            return;
        }
        self.input_mode = InputMode::Rows;
        self.notify();
    }

    pub fn enter_query_mode(&mut self) {
        if !self.open || self.input_mode == InputMode::Query {
            return;
        }
        self.input_mode = InputMode::Query;
        self.notify();
    }

    /// Move the grid cursor or list scroll up
    pub fn move_up(&mut self) {
        if !self.open {
            return;
        }
        let moved = match self.layout {
            Layout::Grid => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    true
                } else {
                    false
                }
            }
            Layout::List => {
                if self.scroll > 0 {
                    self.scroll -= 1;
                    true
                } else {
                    false
                }
            }
        };
        if moved {
            self.notify();
        }
    }

    /// Move the grid cursor or list scroll down
    pub fn move_down(&mut self) {
        if !self.open {
            return;
        }
        let moved = match self.layout {
            Layout::Grid => {
                let page_len = rows::page_len(self.snapshot.len(), self.page);
                if page_len > 0 && self.cursor < page_len - 1 {
                    self.cursor += 1;
                    true
                } else {
                    false
                }
            }
            Layout::List => {
                let len = self.snapshot.len();
                if len > 0 && self.scroll < len - 1 {
                    self.scroll += 1;
                    true
                } else {
                    false
                }
            }
        };
        if moved {
            self.notify();
        }
    }

    /// Advance to the next grid page
    pub fn next_page(&mut self) {
        if !self.open || self.layout != Layout::Grid {
            return;
        }
        if self.page + 1 < rows::page_count(self.snapshot.len()) {
            self.page += 1;
            self.cursor = 0;
            self.notify();
        }
    }

    /// Go back to the previous grid page
    pub fn prev_page(&mut self) {
        if !self.open || self.layout != Layout::Grid {
            return;
        }
        if self.page > 0 {
            self.page -= 1;
            self.cursor = 0;
            self.notify();
        }
    }

    /// The grid row under the cursor, derived fresh from the snapshot
    pub fn cursor_row(&self) -> Option<DisplayRow> {
        match self.layout {
            Layout::Grid => rows::page_rows(&self.snapshot, self.page)
                .into_iter()
                .nth(self.cursor),
            Layout::List => None,
        }
    }

    /// Toggle the checkbox on the cursor row. The selection set is
    /// rendered but consumed by nothing.
    pub fn toggle_selected(&mut self) {
        if !self.open {
            return;
        }
        let Some(row) = self.cursor_row() else {
            return;
        };
        if !self.selected.remove(&row.id) {
            self.selected.insert(row.id);
        }
        self.notify();
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        if !self.open {
            return;
        }
        self.notice = Some(notice.into());
        self.notify();
    }

    fn clamp_to_snapshot(&mut self) {
        let len = self.snapshot.len();
        self.page = rows::clamp_page(self.page, len);
        let page_len = rows::page_len(len, self.page);
        self.cursor = self.cursor.min(page_len.saturating_sub(1));
        self.scroll = self.scroll.min(len.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(entries: &[(&str, &str)]) -> CredentialSnapshot {
        entries
            .iter()
            .map(|(id, name)| (id.to_string(), name.to_string()))
            .collect()
    }

    fn new_app(layout: Layout) -> App {
        App::new(layout, KeyBindings::Arrows, "http://127.0.0.1:7656")
    }

    #[test]
    fn test_set_query_stores_latest_text() {
        let mut app = new_app(Layout::List);

        app.push_query_char('h');
        app.push_query_char('i');
        assert_eq!(app.query(), "hi");

        app.pop_query_char();
        assert_eq!(app.query(), "h");

        app.set_query("github");
        assert_eq!(app.query(), "github");
    }

    #[test]
    fn test_begin_fetch_issues_monotonic_tickets() {
        let mut app = new_app(Layout::List);

        let t1 = app.begin_fetch().unwrap();
        let t2 = app.begin_fetch().unwrap();
        assert!(t2.seq() > t1.seq());
    }

    #[test]
    fn test_begin_fetch_loading_state_is_idempotent() {
        let mut app = new_app(Layout::List);
        let mut revisions = app.subscribe();
        revisions.borrow_and_update();

        app.begin_fetch().unwrap();
        assert_eq!(app.state(), FetchState::Loading);
        assert!(revisions.has_changed().unwrap());
        revisions.borrow_and_update();

        // A second begin while loading issues a ticket but changes
        // nothing visible
        app.begin_fetch().unwrap();
        assert_eq!(app.state(), FetchState::Loading);
        assert!(!revisions.has_changed().unwrap());
    }

    #[test]
    fn test_resolve_replaces_snapshot_wholesale() {
        let mut app = new_app(Layout::List);

        let t1 = app.begin_fetch().unwrap();
        app.resolve_fetch(t1, snapshot(&[("a", "Alice"), ("b", "Bob")]));
        assert_eq!(app.snapshot().len(), 2);
        assert_eq!(app.state(), FetchState::Ready);

        let t2 = app.begin_fetch().unwrap();
        app.resolve_fetch(t2, snapshot(&[("c", "Carol")]));
        assert_eq!(app.snapshot().len(), 1);
        assert_eq!(app.snapshot().get("a"), None);
    }

    #[test]
    fn test_failure_keeps_previous_snapshot() {
        let mut app = new_app(Layout::List);

        let t1 = app.begin_fetch().unwrap();
        let snap = snapshot(&[("a", "Alice")]);
        app.resolve_fetch(t1, snap.clone());

        let t2 = app.begin_fetch().unwrap();
        app.fail_fetch(t2, "connection refused");

        assert_eq!(app.snapshot(), &snap);
        assert_eq!(app.state(), FetchState::Error);
        assert!(app.error().unwrap().contains("connection refused"));

        // A later success clears the error again
        let t3 = app.begin_fetch().unwrap();
        app.resolve_fetch(t3, snapshot(&[("b", "Bob")]));
        assert_eq!(app.error(), None);
        assert_eq!(app.state(), FetchState::Ready);
    }

    #[test]
    fn test_overlapping_fetches_issue_order_wins() {
        let mut app = new_app(Layout::List);

        let t1 = app.begin_fetch().unwrap();
        let t2 = app.begin_fetch().unwrap();

        // The second submission's result lands first
        app.resolve_fetch(t2, snapshot(&[("b", "Bob")]));
        assert_eq!(app.state(), FetchState::Ready);

        // The first submission's result lands later and is dropped
        app.resolve_fetch(t1, snapshot(&[("a", "Alice")]));
        assert_eq!(app.snapshot().get("b"), Some("Bob"));
        assert_eq!(app.snapshot().get("a"), None);
        assert_eq!(app.state(), FetchState::Ready);
    }

    #[test]
    fn test_overlapping_fetches_in_issue_order() {
        let mut app = new_app(Layout::List);

        let t1 = app.begin_fetch().unwrap();
        let t2 = app.begin_fetch().unwrap();

        app.resolve_fetch(t1, snapshot(&[("a", "Alice")]));
        // The newer fetch is still in flight
        assert_eq!(app.state(), FetchState::Loading);
        assert_eq!(app.snapshot().get("a"), Some("Alice"));

        app.resolve_fetch(t2, snapshot(&[("b", "Bob")]));
        assert_eq!(app.state(), FetchState::Ready);
        assert_eq!(app.snapshot().get("b"), Some("Bob"));
    }

    #[test]
    fn test_stale_failure_is_dropped() {
        let mut app = new_app(Layout::List);

        let t1 = app.begin_fetch().unwrap();
        let t2 = app.begin_fetch().unwrap();

        app.resolve_fetch(t2, snapshot(&[("b", "Bob")]));
        app.fail_fetch(t1, "too late");

        assert_eq!(app.error(), None);
        assert_eq!(app.state(), FetchState::Ready);
    }

    #[test]
    fn test_closed_view_ignores_mutations() {
        let mut app = new_app(Layout::List);

        let t1 = app.begin_fetch().unwrap();
        let snap = snapshot(&[("a", "Alice")]);
        app.resolve_fetch(t1, snap.clone());

        let t2 = app.begin_fetch().unwrap();
        app.close();
        assert!(!app.is_open());

        app.resolve_fetch(t2, snapshot(&[("b", "Bob")]));
        app.fail_fetch(t2, "boom");
        app.set_query("typed after teardown");

        assert_eq!(app.snapshot(), &snap);
        assert_eq!(app.query(), "");
        assert_eq!(app.error(), None);
    }

    #[test]
    fn test_revision_bumps_on_each_mutation() {
        let mut app = new_app(Layout::List);
        let mut revisions = app.subscribe();
        revisions.borrow_and_update();

        app.set_query("a");
        assert!(revisions.has_changed().unwrap());
        revisions.borrow_and_update();

        let t = app.begin_fetch().unwrap();
        revisions.borrow_and_update();

        app.resolve_fetch(t, snapshot(&[("a", "Alice")]));
        assert!(revisions.has_changed().unwrap());
        revisions.borrow_and_update();

        let t = app.begin_fetch().unwrap();
        revisions.borrow_and_update();
        app.fail_fetch(t, "boom");
        assert!(revisions.has_changed().unwrap());
    }

    #[test]
    fn test_grid_page_and_cursor_clamped_after_shrink() {
        let mut app = new_app(Layout::Grid);

        let entries: Vec<(String, String)> = (0..12)
            .map(|i| (format!("id{}", i), format!("Name {}", i)))
            .collect();
        let t = app.begin_fetch().unwrap();
        app.resolve_fetch(t, entries.into_iter().collect());

        app.next_page();
        app.next_page();
        assert_eq!(app.page(), 2);
        app.move_down();
        assert_eq!(app.cursor(), 1);

        let t = app.begin_fetch().unwrap();
        app.resolve_fetch(t, snapshot(&[("a", "Alice"), ("b", "Bob"), ("c", "Carol")]));
        assert_eq!(app.page(), 0);
        assert!(app.cursor() <= 2);
    }

    #[test]
    fn test_grid_checkbox_toggle_is_inert_state() {
        let mut app = new_app(Layout::Grid);

        let t = app.begin_fetch().unwrap();
        app.resolve_fetch(t, snapshot(&[("a", "Alice"), ("b", "Bob")]));

        app.toggle_selected();
        assert!(app.is_selected("a"));

        app.move_down();
        app.toggle_selected();
        assert!(app.is_selected("b"));

        app.toggle_selected();
        assert!(!app.is_selected("b"));

        // Snapshot replacement prunes identifiers that disappeared
        let t = app.begin_fetch().unwrap();
        app.resolve_fetch(t, snapshot(&[("b", "Bob")]));
        assert!(!app.is_selected("a"));
    }

    #[test]
    fn test_grid_navigation_bounds() {
        let mut app = new_app(Layout::Grid);

        // Empty snapshot: navigation is a no-op, nothing panics
        app.move_down();
        app.move_up();
        app.next_page();
        app.prev_page();
        assert_eq!(app.cursor(), 0);
        assert_eq!(app.page(), 0);

        let entries: Vec<(String, String)> = (0..7)
            .map(|i| (format!("id{}", i), format!("Name {}", i)))
            .collect();
        let t = app.begin_fetch().unwrap();
        app.resolve_fetch(t, entries.into_iter().collect());

        for _ in 0..10 {
            app.move_down();
        }
        assert_eq!(app.cursor(), 4);

        app.next_page();
        assert_eq!(app.page(), 1);
        assert_eq!(app.cursor(), 0);
        for _ in 0..10 {
            app.move_down();
        }
        assert_eq!(app.cursor(), 1);

        app.next_page();
        assert_eq!(app.page(), 1);
    }
}
