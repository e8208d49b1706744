use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rust_decimal::Decimal;

use crate::api::ApiClient;
use crate::charts::{
    AllocationChart, CashFlowChart, ChartRegistry, NetWorthChart, SpendingChart,
};
use crate::error::Result;
use crate::filters::RequestGen;
use crate::fmt::{money, signed_percent};
use crate::models::{NetWorthSummary, OverviewSummary, Transaction};
use crate::settings::load_settings;
use crate::tui::{self, money_span, txn_amount_span, FOOTER_STYLE, HEADER_STYLE};
use crate::view_model::{format_relative_str, title_case_category};

/// Net-worth history windows cycled with `w`.
const HISTORY_WINDOWS: &[u32] = &[30, 90, 365];

const RECENT_LIMIT: usize = 5;

struct HomeData {
    net_worth: NetWorthSummary,
    total_income: Decimal,
    total_expenses: Decimal,
    savings_rate: Decimal,
    recent: Vec<Transaction>,
    summary: OverviewSummary,
}

struct Dashboard {
    data: Option<HomeData>,
    charts: ChartRegistry,
    generation: RequestGen,
    window_idx: usize,
    status_message: Option<String>,
}

impl Dashboard {
    fn new() -> Self {
        Self {
            data: None,
            charts: ChartRegistry::new(),
            generation: RequestGen::default(),
            window_idx: 0,
            status_message: None,
        }
    }

    fn window_days(&self) -> u32 {
        HISTORY_WINDOWS[self.window_idx]
    }

    fn load_data(&mut self, api: &ApiClient) -> Result<()> {
        let ticket = self.generation.begin();
        let overview = api.overview()?;
        let net_worth = api.net_worth(self.window_days())?;
        if !self.generation.is_current(ticket) {
            return Ok(());
        }

        // A reload replaces every chart; nothing stays bound to stale data
        let history: Vec<(String, Decimal)> = net_worth
            .history
            .iter()
            .map(|p| (p.date.clone().unwrap_or_default(), p.net_worth))
            .collect();
        self.charts
            .mount("net_worth", Box::new(NetWorthChart::new(&history)));

        let daily: Vec<(String, Decimal, Decimal)> = overview
            .cash_flow
            .daily_data
            .iter()
            .map(|d| {
                let label = d
                    .date
                    .as_deref()
                    .and_then(|s| s.get(8..10))
                    .unwrap_or("")
                    .to_string();
                (label, d.income, d.expenses)
            })
            .collect();
        self.charts
            .mount("cash_flow", Box::new(CashFlowChart::new(&daily)));

        let mut spending: Vec<(String, Decimal)> = overview
            .cash_flow
            .expenses_by_category
            .iter()
            .map(|(cat, total)| (title_case_category(Some(cat)), *total))
            .collect();
        spending.sort_by(|a, b| b.1.cmp(&a.1));
        spending.truncate(5);
        self.charts
            .mount("spending", Box::new(SpendingChart::new(spending)));

        let allocation: Vec<(String, Decimal, Decimal)> = overview
            .portfolio
            .allocation
            .iter()
            .map(|(label, slice)| (label.clone(), slice.value, slice.percent))
            .collect();
        self.charts
            .mount("allocation", Box::new(AllocationChart::new(allocation)));

        let mut recent = overview.recent_transactions;
        recent.truncate(RECENT_LIMIT);

        self.data = Some(HomeData {
            net_worth: if net_worth.history.is_empty() {
                overview.net_worth
            } else {
                net_worth.current
            },
            total_income: overview.cash_flow.total_income,
            total_expenses: overview.cash_flow.total_expenses,
            savings_rate: overview.cash_flow.savings_rate,
            recent,
            summary: overview.summary,
        });
        Ok(())
    }

    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let border_style = Style::default().fg(Color::DarkGray);

        let [header_area, sep1, stats_area, sep2, charts_area, sep3, recent_area, hints_area] =
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(5),
                Constraint::Length(1),
                Constraint::Fill(1),
                Constraint::Length(1),
                Constraint::Length(RECENT_LIMIT as u16 + 1),
                Constraint::Length(1),
            ])
            .areas(area);

        frame.render_widget(
            Paragraph::new(" LedgerDeck").style(HEADER_STYLE),
            header_area,
        );

        let sep_line = "\u{2501}".repeat(area.width as usize);
        let sep_widget = Paragraph::new(sep_line.as_str()).style(border_style);
        frame.render_widget(sep_widget.clone(), sep1);
        frame.render_widget(sep_widget.clone(), sep2);
        frame.render_widget(sep_widget, sep3);

        let Some(data) = &self.data else {
            frame.render_widget(
                Paragraph::new(tui::empty_state(
                    "(\u{2248})",
                    "Nothing to show yet",
                    "Press r to load, or link an institution with `ledgerdeck items link`",
                )),
                charts_area,
            );
            self.draw_hints(frame, hints_area);
            return;
        };

        if data.summary.accounts_count == 0 {
            frame.render_widget(
                Paragraph::new(tui::empty_state(
                    "(+)",
                    "No accounts linked",
                    "Run `ledgerdeck items link` to connect your first institution",
                )),
                charts_area,
            );
            self.draw_hints(frame, hints_area);
            return;
        }

        let [stats_left, stats_right] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(stats_area);

        let monthly = &data.net_worth.changes.monthly;
        let stats_lines = vec![
            Line::from(vec![
                Span::raw(" Net Worth       "),
                money_span(data.net_worth.net_worth),
                Span::styled(
                    format!("  {} this month", signed_percent(monthly.percent)),
                    FOOTER_STYLE,
                ),
            ]),
            Line::from(vec![
                Span::raw(" Assets          "),
                money_span(data.net_worth.total_assets),
            ]),
            Line::from(vec![
                Span::raw(" Liabilities     "),
                Span::raw(money(data.net_worth.total_liabilities)),
            ]),
            Line::from(vec![
                Span::raw(" Income (30d)    "),
                money_span(data.total_income),
            ]),
            Line::from(vec![
                Span::raw(" Spending (30d)  "),
                Span::raw(money(data.total_expenses)),
                Span::styled(
                    format!("  savings rate {}", signed_percent(data.savings_rate)),
                    FOOTER_STYLE,
                ),
            ]),
        ];
        frame.render_widget(Paragraph::new(stats_lines), stats_left);

        let last_sync = data
            .summary
            .last_sync
            .as_deref()
            .map(|s| format_relative_str(s, chrono::Utc::now()))
            .unwrap_or_else(|| "never".to_string());
        let right_lines = vec![
            Line::from(Span::styled(
                " Connections",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(format!(
                " Institutions    {}",
                data.summary.institutions_linked
            )),
            Line::from(format!(" Accounts        {}", data.summary.accounts_count)),
            Line::from(format!(" Last sync       {last_sync}")),
        ];
        frame.render_widget(Paragraph::new(right_lines), stats_right);

        let [charts_top, charts_bottom] =
            Layout::vertical([Constraint::Percentage(55), Constraint::Percentage(45)])
                .areas(charts_area);
        let [top_left, top_right] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(charts_top);
        let [bottom_left, bottom_right] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(charts_bottom);

        self.charts.render("net_worth", frame, top_left);
        self.charts.render("cash_flow", frame, top_right);
        self.charts.render("spending", frame, bottom_left);
        self.charts.render("allocation", frame, bottom_right);

        let mut recent_lines = vec![Line::from(Span::styled(
            " Recent Transactions",
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        if data.recent.is_empty() {
            recent_lines.push(Line::from(Span::styled(
                " No transactions yet",
                FOOTER_STYLE,
            )));
        }
        for txn in &data.recent {
            recent_lines.push(Line::from(vec![
                Span::raw(format!(
                    " {}  {:<40}  {:<20}  ",
                    txn.date.as_deref().unwrap_or(""),
                    txn.description(),
                    title_case_category(txn.category.as_deref()),
                )),
                txn_amount_span(txn.amount),
            ]));
        }
        frame.render_widget(Paragraph::new(recent_lines), recent_area);

        self.draw_hints(frame, hints_area);
    }

    fn draw_hints(&self, frame: &mut Frame, area: ratatui::layout::Rect) {
        if let Some(msg) = &self.status_message {
            frame.render_widget(
                Paragraph::new(format!(" {msg}")).style(Style::default().fg(Color::Yellow)),
                area,
            );
        } else {
            frame.render_widget(
                Paragraph::new(format!(
                    " r=refresh  s=sync all  w=window ({}d)  q=quit",
                    self.window_days()
                ))
                .style(FOOTER_STYLE),
                area,
            );
        }
    }
}

pub fn run() -> Result<()> {
    let settings = load_settings();
    let api = ApiClient::new(&settings)?;

    let mut dashboard = Dashboard::new();
    if let Err(e) = dashboard.load_data(&api) {
        dashboard.status_message = Some(format!("Load failed: {e}"));
    }

    tui::install_panic_hook();
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &api, &mut dashboard);
    ratatui::restore();
    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    api: &ApiClient,
    dashboard: &mut Dashboard,
) -> Result<()> {
    loop {
        terminal.draw(|frame| dashboard.draw(frame))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                break;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char('r') => {
                    dashboard.status_message = None;
                    if let Err(e) = dashboard.load_data(api) {
                        dashboard.status_message = Some(format!("Load failed: {e}"));
                    }
                }
                KeyCode::Char('w') => {
                    dashboard.window_idx = (dashboard.window_idx + 1) % HISTORY_WINDOWS.len();
                    if let Err(e) = dashboard.load_data(api) {
                        dashboard.status_message = Some(format!("Load failed: {e}"));
                    }
                }
                KeyCode::Char('s') => {
                    dashboard.status_message = Some("Syncing all institutions...".to_string());
                    terminal.draw(|frame| dashboard.draw(frame))?;
                    match api.sync_all() {
                        Ok(result) => {
                            dashboard.status_message = Some(format!(
                                "Synced {} institution(s), {} failed",
                                result.items_synced, result.items_failed
                            ));
                            if let Err(e) = dashboard.load_data(api) {
                                dashboard.status_message = Some(format!("Load failed: {e}"));
                            }
                        }
                        Err(e) => {
                            dashboard.status_message = Some(format!("Sync failed: {e}"));
                        }
                    }
                }
                _ => {}
            }
        }
    }
    Ok(())
}
