use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
    DefaultTerminal, Frame,
};

use crate::api::ApiClient;
use crate::error::Result;
use crate::filters::{Debouncer, FilterState, RequestGen, SEARCH_DEBOUNCE};
use crate::fmt::number;
use crate::models::{Account, PageMeta, Transaction, TransactionPage};
use crate::settings::load_settings;
use crate::tui::{self, FOOTER_STYLE, HEADER_STYLE, SELECTED_STYLE};
use crate::view_model::{title_case_category, transactions_csv};

/// Idle poll timeout when no debounce deadline is pending.
const IDLE_POLL: Duration = Duration::from_millis(250);

const FLOW_CHOICES: &[(&str, Option<&str>)] = &[
    ("All transactions", None),
    ("Income only", Some("income")),
    ("Expenses only", Some("expense")),
];

enum BrowseMode {
    Normal,
    Search,
    DateRange {
        start: String,
        end: String,
        editing_end: bool,
    },
    AccountPicker(usize),
    FlowPicker(usize),
    GotoPage(String),
}

pub enum BrowseAction {
    Continue,
    Close,
    /// Filters or page changed; the caller fetches the new page.
    Reload,
    Export,
}

/// Server-paginated transaction browser. Holds exactly one page at a
/// time; every filter or page transition asks the caller to reload, and
/// responses are generation-checked so a superseded reload can never
/// overwrite newer state.
pub struct TransactionBrowser {
    pub filters: FilterState,
    rows: Vec<Transaction>,
    meta: PageMeta,
    accounts: Vec<Account>,
    account_names: HashMap<String, String>,
    selected: usize,
    mode: BrowseMode,
    search_input: String,
    debouncer: Debouncer,
    generation: RequestGen,
    status_message: Option<String>,
    table_state: TableState,
}

impl TransactionBrowser {
    pub fn new(filters: FilterState, accounts: Vec<Account>) -> Self {
        let account_names = accounts
            .iter()
            .map(|a| (a.id.clone(), a.display_name()))
            .collect();
        let search_input = filters.search.clone();
        Self {
            filters,
            rows: Vec::new(),
            meta: PageMeta::default(),
            accounts,
            account_names,
            selected: 0,
            mode: BrowseMode::Normal,
            search_input,
            debouncer: Debouncer::new(SEARCH_DEBOUNCE),
            generation: RequestGen::default(),
            status_message: None,
            table_state: TableState::default(),
        }
    }

    /// Start a reload, returning the ticket the response must present.
    pub fn begin_reload(&mut self) -> u64 {
        self.generation.begin()
    }

    /// Apply a fetched page. Ignored when a newer reload has started since
    /// `ticket` was issued.
    pub fn apply_page(&mut self, page: TransactionPage, ticket: u64) {
        if !self.generation.is_current(ticket) {
            return;
        }
        self.rows = page.transactions;
        self.meta = page.pagination;
        self.selected = self.selected.min(self.rows.len().saturating_sub(1));
    }

    pub fn set_status(&mut self, msg: String) {
        self.status_message = Some(msg);
    }

    /// Timeout for the event poll: the debounce deadline when one is
    /// pending, otherwise an idle tick.
    pub fn poll_timeout(&self, now: Instant) -> Duration {
        self.debouncer.remaining(now).unwrap_or(IDLE_POLL)
    }

    /// Advance time. Returns true when the search debounce fired and the
    /// caller should reload.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.debouncer.fire(now) {
            self.filters.set_search(self.search_input.clone());
            true
        } else {
            false
        }
    }

    pub fn handle_key(&mut self, code: KeyCode, now: Instant) -> BrowseAction {
        self.status_message = None;
        match &self.mode {
            BrowseMode::Normal => self.handle_normal_key(code),
            BrowseMode::Search => self.handle_search_key(code, now),
            BrowseMode::DateRange { .. } => self.handle_date_key(code),
            BrowseMode::AccountPicker(_) => self.handle_account_key(code),
            BrowseMode::FlowPicker(_) => self.handle_flow_key(code),
            BrowseMode::GotoPage(_) => self.handle_goto_key(code),
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode) -> BrowseAction {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return BrowseAction::Close,
            KeyCode::Down => {
                if self.selected + 1 < self.rows.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Char('n') | KeyCode::Right | KeyCode::PageDown => {
                if self.filters.set_page(self.filters.page + 1, self.meta.pages) {
                    self.selected = 0;
                    return BrowseAction::Reload;
                }
            }
            KeyCode::Char('p') | KeyCode::Left | KeyCode::PageUp => {
                if self.filters.page > 1
                    && self.filters.set_page(self.filters.page - 1, self.meta.pages)
                {
                    self.selected = 0;
                    return BrowseAction::Reload;
                }
            }
            KeyCode::Char('g') => {
                self.mode = BrowseMode::GotoPage(String::new());
            }
            KeyCode::Char('/') => {
                self.search_input = self.filters.search.clone();
                self.mode = BrowseMode::Search;
            }
            KeyCode::Char('d') => {
                self.mode = BrowseMode::DateRange {
                    start: self.filters.start_date.clone().unwrap_or_default(),
                    end: self.filters.end_date.clone().unwrap_or_default(),
                    editing_end: false,
                };
            }
            KeyCode::Char('a') => {
                self.mode = BrowseMode::AccountPicker(0);
            }
            KeyCode::Char('t') => {
                self.mode = BrowseMode::FlowPicker(0);
            }
            KeyCode::Char('c') => {
                if self.filters.has_filters() {
                    self.filters.clear();
                    self.search_input.clear();
                    self.debouncer.cancel();
                    self.selected = 0;
                    return BrowseAction::Reload;
                }
            }
            KeyCode::Char('x') => return BrowseAction::Export,
            KeyCode::Char('r') => return BrowseAction::Reload,
            _ => {}
        }
        BrowseAction::Continue
    }

    fn handle_search_key(&mut self, code: KeyCode, now: Instant) -> BrowseAction {
        match code {
            KeyCode::Char(c) => {
                self.search_input.push(c);
                self.debouncer.input(now);
            }
            KeyCode::Backspace => {
                self.search_input.pop();
                self.debouncer.input(now);
            }
            KeyCode::Enter => {
                // Commit immediately; nothing left for the debounce to do
                self.debouncer.cancel();
                self.mode = BrowseMode::Normal;
                if self.search_input != self.filters.search {
                    self.filters.set_search(self.search_input.clone());
                    return BrowseAction::Reload;
                }
            }
            KeyCode::Esc => {
                self.debouncer.cancel();
                self.mode = BrowseMode::Normal;
                if self.search_input != self.filters.search {
                    self.search_input = self.filters.search.clone();
                }
            }
            _ => {}
        }
        BrowseAction::Continue
    }

    fn handle_date_key(&mut self, code: KeyCode) -> BrowseAction {
        let BrowseMode::DateRange {
            start,
            end,
            editing_end,
        } = &mut self.mode
        else {
            return BrowseAction::Continue;
        };
        match code {
            KeyCode::Char(c) => {
                if *editing_end {
                    end.push(c);
                } else {
                    start.push(c);
                }
            }
            KeyCode::Backspace => {
                if *editing_end {
                    end.pop();
                } else {
                    start.pop();
                }
            }
            KeyCode::Tab => *editing_end = !*editing_end,
            KeyCode::Enter => {
                if !*editing_end {
                    *editing_end = true;
                    return BrowseAction::Continue;
                }
                let start = start.trim().to_string();
                let end = end.trim().to_string();
                self.mode = BrowseMode::Normal;
                self.filters.set_date_range(
                    (!start.is_empty()).then_some(start),
                    (!end.is_empty()).then_some(end),
                );
                self.selected = 0;
                return BrowseAction::Reload;
            }
            KeyCode::Esc => self.mode = BrowseMode::Normal,
            _ => {}
        }
        BrowseAction::Continue
    }

    fn handle_account_key(&mut self, code: KeyCode) -> BrowseAction {
        let BrowseMode::AccountPicker(selection) = &mut self.mode else {
            return BrowseAction::Continue;
        };
        match code {
            KeyCode::Up => *selection = selection.saturating_sub(1),
            KeyCode::Down => *selection = (*selection + 1).min(self.accounts.len()),
            KeyCode::Enter => {
                let choice = if *selection == 0 {
                    None
                } else {
                    self.accounts.get(*selection - 1).map(|a| a.id.clone())
                };
                self.mode = BrowseMode::Normal;
                self.filters.set_account(choice);
                self.selected = 0;
                return BrowseAction::Reload;
            }
            KeyCode::Esc => self.mode = BrowseMode::Normal,
            _ => {}
        }
        BrowseAction::Continue
    }

    fn handle_flow_key(&mut self, code: KeyCode) -> BrowseAction {
        let BrowseMode::FlowPicker(selection) = &mut self.mode else {
            return BrowseAction::Continue;
        };
        match code {
            KeyCode::Up => *selection = selection.saturating_sub(1),
            KeyCode::Down => *selection = (*selection + 1).min(FLOW_CHOICES.len() - 1),
            KeyCode::Enter => {
                let choice = FLOW_CHOICES[*selection].1.map(str::to_string);
                self.mode = BrowseMode::Normal;
                self.filters.set_flow_type(choice);
                self.selected = 0;
                return BrowseAction::Reload;
            }
            KeyCode::Esc => self.mode = BrowseMode::Normal,
            _ => {}
        }
        BrowseAction::Continue
    }

    fn handle_goto_key(&mut self, code: KeyCode) -> BrowseAction {
        let BrowseMode::GotoPage(input) = &mut self.mode else {
            return BrowseAction::Continue;
        };
        match code {
            KeyCode::Char(c) if c.is_ascii_digit() => input.push(c),
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Enter => {
                let target = input.trim().parse::<u32>().ok();
                self.mode = BrowseMode::Normal;
                if let Some(n) = target {
                    if self.filters.set_page(n, self.meta.pages) {
                        self.selected = 0;
                        return BrowseAction::Reload;
                    }
                    self.status_message = Some(format!(
                        "Page {n} is out of range (1-{})",
                        self.meta.pages
                    ));
                }
            }
            KeyCode::Esc => self.mode = BrowseMode::Normal,
            _ => {}
        }
        BrowseAction::Continue
    }

    /// Write the currently loaded page as CSV. Returns the file path.
    pub fn export_csv(&self, output: Option<&str>) -> Result<String> {
        let csv_text = transactions_csv(&self.rows, &self.account_names)?;
        let path = match output {
            Some(p) => p.to_string(),
            None => format!("transactions-{}.csv", Local::now().format("%Y-%m-%d")),
        };
        std::fs::write(&path, csv_text)?;
        Ok(path)
    }

    fn filters_desc(&self) -> String {
        let mut parts = Vec::new();
        if !self.filters.search.is_empty() {
            parts.push(format!("search \"{}\"", self.filters.search));
        }
        match (&self.filters.start_date, &self.filters.end_date) {
            (Some(s), Some(e)) => parts.push(format!("{s} to {e}")),
            (Some(s), None) => parts.push(format!("from {s}")),
            (None, Some(e)) => parts.push(format!("to {e}")),
            (None, None) => {}
        }
        if let Some(ref id) = self.filters.account_id {
            let name = self
                .account_names
                .get(id)
                .cloned()
                .unwrap_or_else(|| id.clone());
            parts.push(name);
        }
        if let Some(ref t) = self.filters.flow_type {
            parts.push(t.clone());
        }
        parts.join(" | ")
    }

    pub fn draw_frame(&mut self, frame: &mut Frame) {
        let area = frame.area();

        let picker_height: u16 = match &self.mode {
            BrowseMode::AccountPicker(_) => self.accounts.len() as u16 + 2,
            BrowseMode::FlowPicker(_) => FLOW_CHOICES.len() as u16 + 1,
            BrowseMode::DateRange { .. } => 2,
            _ => 0,
        };

        let [title_area, table_area, picker_area, status_area, keys_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(picker_height),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new("Transactions").style(HEADER_STYLE),
            title_area,
        );

        if self.rows.is_empty() {
            let lines = if self.filters.has_filters() {
                tui::empty_state(
                    "(\u{2205})",
                    "No transactions match your filters",
                    "Press c to clear filters",
                )
            } else {
                tui::empty_state(
                    "(+)",
                    "No transactions yet",
                    "Link an institution with `ledgerdeck items link`, then sync",
                )
            };
            frame.render_widget(Paragraph::new(lines), table_area);
        } else {
            // Fixed columns + spacing leave the rest for the description
            let desc_width = table_area.width.saturating_sub(2 + 10 + 22 + 24 + 12 + 5) as usize;
            let desc_width = desc_width.max(10);

            let rendered: Vec<Row> = self
                .rows
                .iter()
                .map(|txn| {
                    let (wrapped_desc, line_count) = tui::wrap_text(txn.description(), desc_width);
                    let pending = Cell::from(if txn.pending { "~" } else { "" });
                    Row::new(vec![
                        pending,
                        Cell::from(txn.date.as_deref().unwrap_or("").to_string()),
                        Cell::from(wrapped_desc),
                        Cell::from(title_case_category(txn.category.as_deref())),
                        Cell::from(
                            self.account_names
                                .get(&txn.account_id)
                                .cloned()
                                .unwrap_or_default(),
                        ),
                        Cell::from(tui::txn_amount_span(txn.amount)),
                    ])
                    .height(line_count)
                })
                .collect();

            let widths = [
                Constraint::Length(2),
                Constraint::Length(10),
                Constraint::Fill(1),
                Constraint::Length(22),
                Constraint::Length(24),
                Constraint::Length(12),
            ];
            let header = ["", "Date", "Description", "Category", "Account", "Amount"];

            self.table_state.select(Some(self.selected));
            let table = Table::new(rendered, widths)
                .header(Row::new(header).style(HEADER_STYLE).bottom_margin(1))
                .column_spacing(1)
                .row_highlight_style(SELECTED_STYLE);
            frame.render_stateful_widget(table, table_area, &mut self.table_state);
        }

        if picker_height > 0 {
            frame.render_widget(Paragraph::new(self.picker_lines()), picker_area);
        }

        let filters = self.filters_desc();
        let mut status = format!(
            "Page {} of {} | {} transactions",
            self.meta.page,
            self.meta.pages.max(1),
            number(self.meta.total),
        );
        if !filters.is_empty() {
            status.push_str(&format!(" | {filters}"));
        }
        if self.debouncer.is_pending() {
            status.push_str(" | searching\u{2026}");
        }
        if let Some(ref msg) = self.status_message {
            status.push_str(&format!(" | {msg}"));
        }
        frame.render_widget(Paragraph::new(status).style(FOOTER_STYLE), status_area);

        let keys = match &self.mode {
            BrowseMode::Normal => Paragraph::new(
                "\u{2191}/\u{2193}:select  n/p:page  g:goto  /:search  d:dates  a:account  t:type  c:clear  x:export  r:reload  q:quit",
            )
            .style(FOOTER_STYLE),
            BrowseMode::Search => {
                Paragraph::new(format!("Search: {}\u{2588}", self.search_input))
            }
            BrowseMode::DateRange { .. } => {
                Paragraph::new("Tab=switch field  Enter=apply  Esc=cancel").style(FOOTER_STYLE)
            }
            BrowseMode::AccountPicker(_) | BrowseMode::FlowPicker(_) => {
                Paragraph::new("\u{2191}/\u{2193}=navigate  Enter=select  Esc=cancel")
                    .style(FOOTER_STYLE)
            }
            BrowseMode::GotoPage(input) => Paragraph::new(format!("Go to page: {input}\u{2588}")),
        };
        frame.render_widget(keys, keys_area);
    }

    fn picker_lines(&self) -> Vec<Line<'static>> {
        match &self.mode {
            BrowseMode::AccountPicker(selection) => {
                let mut lines = vec![Line::from(Span::styled(
                    "  Filter by account:",
                    HEADER_STYLE,
                ))];
                let marker = |i: usize| if i == *selection { ">" } else { " " };
                lines.push(Line::from(format!("  {} All accounts", marker(0))));
                for (i, account) in self.accounts.iter().enumerate() {
                    lines.push(Line::from(format!(
                        "  {} {}",
                        marker(i + 1),
                        account.display_name()
                    )));
                }
                lines
            }
            BrowseMode::FlowPicker(selection) => {
                let mut lines = Vec::new();
                for (i, (label, _)) in FLOW_CHOICES.iter().enumerate() {
                    let marker = if i == *selection { ">" } else { " " };
                    lines.push(Line::from(format!("  {marker} {label}")));
                }
                lines
            }
            BrowseMode::DateRange {
                start,
                end,
                editing_end,
            } => {
                let cursor = "\u{2588}";
                let (start_cursor, end_cursor) = if *editing_end {
                    ("", cursor)
                } else {
                    (cursor, "")
                };
                vec![
                    Line::from(format!("  From (YYYY-MM-DD): {start}{start_cursor}")),
                    Line::from(format!("  To   (YYYY-MM-DD): {end}{end_cursor}")),
                ]
            }
            _ => Vec::new(),
        }
    }
}

fn reload(api: &ApiClient, browser: &mut TransactionBrowser) {
    let ticket = browser.begin_reload();
    match api.transactions(&browser.filters.to_query()) {
        Ok(page) => browser.apply_page(page, ticket),
        Err(e) => browser.set_status(format!("Load failed: {e}")),
    }
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    api: &ApiClient,
    browser: &mut TransactionBrowser,
) -> Result<()> {
    loop {
        terminal.draw(|frame| browser.draw_frame(frame))?;

        let timeout = browser.poll_timeout(Instant::now());
        if event::poll(timeout)? {
            if let Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) = event::read()?
            {
                if kind != KeyEventKind::Press {
                    continue;
                }
                if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
                    break;
                }
                match browser.handle_key(code, Instant::now()) {
                    BrowseAction::Close => break,
                    BrowseAction::Continue => {}
                    BrowseAction::Reload => reload(api, browser),
                    BrowseAction::Export => match browser.export_csv(None) {
                        Ok(path) => browser.set_status(format!("Exported {path}")),
                        Err(e) => browser.set_status(format!("Export failed: {e}")),
                    },
                }
            }
        }
        if browser.tick(Instant::now()) {
            reload(api, browser);
        }
    }
    Ok(())
}

pub fn run(filters: FilterState) -> Result<()> {
    let settings = load_settings();
    let api = ApiClient::new(&settings)?;

    let accounts = api.accounts()?.accounts;
    let mut browser = TransactionBrowser::new(filters, accounts);
    reload(&api, &mut browser);

    tui::install_panic_hook();
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &api, &mut browser);
    ratatui::restore();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_txns(n: usize) -> Vec<Transaction> {
        (0..n)
            .map(|i| {
                let json = serde_json::json!({
                    "date": format!("2026-08-{:02}", (i % 28) + 1),
                    "name": format!("Transaction {}", i + 1),
                    "account_id": "acc-1",
                    "amount": if i % 2 == 0 { 25.00 } else { -100.00 },
                });
                serde_json::from_value(json).unwrap()
            })
            .collect()
    }

    fn make_accounts() -> Vec<Account> {
        ["Checking", "Savings"]
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let json = serde_json::json!({
                    "id": format!("acc-{}", i + 1),
                    "name": name,
                    "plaid_item_id": "item-1",
                });
                serde_json::from_value(json).unwrap()
            })
            .collect()
    }

    fn page(transactions: Vec<Transaction>, page_no: u32, pages: u32) -> TransactionPage {
        TransactionPage {
            pagination: PageMeta {
                page: page_no,
                per_page: 50,
                total: (pages as u64) * 50,
                pages,
                has_prev: page_no > 1,
                has_next: page_no < pages,
            },
            transactions,
        }
    }

    fn loaded_browser(pages: u32) -> TransactionBrowser {
        let mut browser = TransactionBrowser::new(FilterState::default(), make_accounts());
        let ticket = browser.begin_reload();
        browser.apply_page(page(make_txns(5), 1, pages), ticket);
        browser
    }

    #[test]
    fn test_next_page_bounded_by_server_pages() {
        let mut browser = loaded_browser(3);
        let now = Instant::now();

        assert!(matches!(
            browser.handle_key(KeyCode::Char('n'), now),
            BrowseAction::Reload
        ));
        assert_eq!(browser.filters.page, 2);

        browser.filters.set_page(3, 3);
        // Already on the last page: no-op, no reload
        assert!(matches!(
            browser.handle_key(KeyCode::Char('n'), now),
            BrowseAction::Continue
        ));
        assert_eq!(browser.filters.page, 3);
    }

    #[test]
    fn test_prev_page_stops_at_one() {
        let mut browser = loaded_browser(3);
        let now = Instant::now();
        assert!(matches!(
            browser.handle_key(KeyCode::Char('p'), now),
            BrowseAction::Continue
        ));
        assert_eq!(browser.filters.page, 1);
    }

    #[test]
    fn test_goto_page_out_of_range_sets_status() {
        let mut browser = loaded_browser(3);
        let now = Instant::now();
        browser.handle_key(KeyCode::Char('g'), now);
        browser.handle_key(KeyCode::Char('9'), now);
        let action = browser.handle_key(KeyCode::Enter, now);
        assert!(matches!(action, BrowseAction::Continue));
        assert_eq!(browser.filters.page, 1);
        assert!(browser.status_message.as_ref().unwrap().contains("9"));
    }

    #[test]
    fn test_search_debounce_fires_once_and_resets_page() {
        let mut browser = loaded_browser(5);
        browser.filters.set_page(4, 5);
        let start = Instant::now();

        browser.handle_key(KeyCode::Char('/'), start);
        browser.handle_key(KeyCode::Char('c'), start);
        browser.handle_key(KeyCode::Char('o'), start + Duration::from_millis(100));

        // Not yet: the second keystroke pushed the deadline out
        assert!(!browser.tick(start + Duration::from_millis(350)));
        assert!(browser.tick(start + Duration::from_millis(400)));
        assert_eq!(browser.filters.search, "co");
        assert_eq!(browser.filters.page, 1);

        // Fires exactly once
        assert!(!browser.tick(start + Duration::from_millis(500)));
    }

    #[test]
    fn test_search_enter_commits_immediately() {
        let mut browser = loaded_browser(2);
        let now = Instant::now();
        browser.handle_key(KeyCode::Char('/'), now);
        browser.handle_key(KeyCode::Char('a'), now);
        let action = browser.handle_key(KeyCode::Enter, now);
        assert!(matches!(action, BrowseAction::Reload));
        assert_eq!(browser.filters.search, "a");
        // Debounce was cancelled along with the commit
        assert!(!browser.tick(now + Duration::from_secs(1)));
    }

    #[test]
    fn test_search_esc_reverts_input() {
        let mut browser = loaded_browser(2);
        browser.filters.set_search("rent".to_string());
        browser.search_input = "rent".to_string();
        let now = Instant::now();

        browser.handle_key(KeyCode::Char('/'), now);
        browser.handle_key(KeyCode::Char('x'), now);
        browser.handle_key(KeyCode::Esc, now);
        assert_eq!(browser.search_input, "rent");
        assert_eq!(browser.filters.search, "rent");
        assert!(!browser.tick(now + Duration::from_secs(1)));
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut browser = loaded_browser(3);
        let stale = browser.begin_reload();
        let fresh = browser.begin_reload();

        browser.apply_page(page(make_txns(1), 2, 3), fresh);
        assert_eq!(browser.rows.len(), 1);

        // The superseded response arrives late and must not win
        browser.apply_page(page(make_txns(5), 1, 3), stale);
        assert_eq!(browser.rows.len(), 1);
        assert_eq!(browser.meta.page, 2);
    }

    #[test]
    fn test_account_picker_sets_filter_and_resets_page() {
        let mut browser = loaded_browser(4);
        browser.filters.set_page(3, 4);
        let now = Instant::now();

        browser.handle_key(KeyCode::Char('a'), now);
        browser.handle_key(KeyCode::Down, now); // first real account
        let action = browser.handle_key(KeyCode::Enter, now);
        assert!(matches!(action, BrowseAction::Reload));
        assert_eq!(browser.filters.account_id.as_deref(), Some("acc-1"));
        assert_eq!(browser.filters.page, 1);
    }

    #[test]
    fn test_flow_picker_choices() {
        let mut browser = loaded_browser(1);
        let now = Instant::now();
        browser.handle_key(KeyCode::Char('t'), now);
        browser.handle_key(KeyCode::Down, now);
        browser.handle_key(KeyCode::Down, now);
        let action = browser.handle_key(KeyCode::Enter, now);
        assert!(matches!(action, BrowseAction::Reload));
        assert_eq!(browser.filters.flow_type.as_deref(), Some("expense"));
    }

    #[test]
    fn test_date_range_applies_on_second_enter() {
        let mut browser = loaded_browser(2);
        let now = Instant::now();
        browser.handle_key(KeyCode::Char('d'), now);
        for c in "2026-01-01".chars() {
            browser.handle_key(KeyCode::Char(c), now);
        }
        browser.handle_key(KeyCode::Enter, now); // move to end field
        for c in "2026-06-30".chars() {
            browser.handle_key(KeyCode::Char(c), now);
        }
        let action = browser.handle_key(KeyCode::Enter, now);
        assert!(matches!(action, BrowseAction::Reload));
        assert_eq!(browser.filters.start_date.as_deref(), Some("2026-01-01"));
        assert_eq!(browser.filters.end_date.as_deref(), Some("2026-06-30"));
    }

    #[test]
    fn test_clear_only_reloads_when_filtered() {
        let mut browser = loaded_browser(2);
        let now = Instant::now();
        assert!(matches!(
            browser.handle_key(KeyCode::Char('c'), now),
            BrowseAction::Continue
        ));

        browser.filters.set_search("coffee".to_string());
        let action = browser.handle_key(KeyCode::Char('c'), now);
        assert!(matches!(action, BrowseAction::Reload));
        assert!(!browser.filters.has_filters());
        assert_eq!(browser.filters.page, 1);
    }

    #[test]
    fn test_export_writes_current_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let browser = loaded_browser(1);

        let written = browser
            .export_csv(Some(path.to_str().unwrap()))
            .unwrap();
        let content = std::fs::read_to_string(&written).unwrap();
        assert!(content.starts_with("Date,Description,Category,Account,Amount,Currency"));
        assert_eq!(content.lines().count(), 6); // header + 5 rows
        assert!(content.contains("Transaction 1"));
    }

    #[test]
    fn test_empty_page_renders_empty_state_and_zero_count() {
        use ratatui::{backend::TestBackend, Terminal};

        let mut browser = TransactionBrowser::new(FilterState::default(), make_accounts());
        let ticket = browser.begin_reload();
        browser.apply_page(page(Vec::new(), 1, 0), ticket);

        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
        terminal.draw(|frame| browser.draw_frame(frame)).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("No transactions yet"));
        assert!(text.contains("0 transactions"));

        // With filters active the call to action changes
        browser.filters.set_search("zzz".to_string());
        terminal.draw(|frame| browser.draw_frame(frame)).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("No transactions match your filters"));
        assert!(text.contains("Press c to clear filters"));
    }

    #[test]
    fn test_filters_desc_names_account() {
        let mut browser = loaded_browser(1);
        browser.filters.set_account(Some("acc-2".to_string()));
        browser.filters.set_search("gym".to_string());
        let desc = browser.filters_desc();
        assert!(desc.contains("search \"gym\""));
        assert!(desc.contains("Savings"));
    }
}
