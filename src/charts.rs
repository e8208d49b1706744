use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::fmt::{money_compact, money};
use crate::tui::FOOTER_STYLE;

/// Rendering adapter for one chart. View models build data; widgets only
/// draw it, so the charting engine can be swapped without touching the
/// view-model layer.
pub trait ChartWidget {
    fn render(&self, frame: &mut Frame, area: Rect);
}

/// Owns chart instances keyed by logical name. The invariant: a chart
/// bound to a name is destroyed before a replacement is mounted, so a
/// reload can never leave two widgets bound to the same surface.
#[derive(Default)]
pub struct ChartRegistry {
    charts: Vec<(String, Box<dyn ChartWidget>)>,
    destroyed: u64,
}

impl ChartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `chart` to `name`, destroying whatever was bound there first.
    pub fn mount(&mut self, name: &str, chart: Box<dyn ChartWidget>) {
        self.destroy(name);
        self.charts.push((name.to_string(), chart));
    }

    /// Drop the chart bound to `name`, if any.
    pub fn destroy(&mut self, name: &str) {
        if let Some(pos) = self.charts.iter().position(|(n, _)| n == name) {
            self.charts.remove(pos);
            self.destroyed += 1;
        }
    }

    /// Idempotent; safe to call when nothing is mounted.
    pub fn destroy_all(&mut self) {
        self.destroyed += self.charts.len() as u64;
        self.charts.clear();
    }

    pub fn render(&self, name: &str, frame: &mut Frame, area: Rect) {
        if let Some((_, chart)) = self.charts.iter().find(|(n, _)| n == name) {
            chart.render(frame, area);
        }
    }

    pub fn is_mounted(&self, name: &str) -> bool {
        self.charts.iter().any(|(n, _)| n == name)
    }

    pub fn mounted_count(&self) -> usize {
        self.charts.len()
    }

    /// Total number of charts destroyed over the registry's lifetime.
    pub fn destroyed_count(&self) -> u64 {
        self.destroyed
    }
}

/// Pick round y-axis tick values (top and mid) given a max data value.
pub fn y_axis_ticks(max_val: f64) -> (f64, f64) {
    let steps = [
        1000.0, 2500.0, 5000.0, 10000.0, 25000.0, 50000.0, 100000.0, 250000.0, 500000.0,
        1000000.0, 2500000.0, 5000000.0, 10000000.0,
    ];
    let top = steps
        .iter()
        .copied()
        .find(|&s| s >= max_val)
        .unwrap_or(max_val);
    let mid = top / 2.0;
    (top, mid)
}

// ---------------------------------------------------------------------------
// Ratatui chart implementations
// ---------------------------------------------------------------------------

/// Historical net-worth line chart.
pub struct NetWorthChart {
    points: Vec<(f64, f64)>,
    first_label: String,
    last_label: String,
}

impl NetWorthChart {
    pub fn new(history: &[(String, Decimal)]) -> Self {
        let points: Vec<(f64, f64)> = history
            .iter()
            .enumerate()
            .map(|(i, (_, v))| (i as f64, v.to_f64().unwrap_or(0.0)))
            .collect();
        Self {
            points,
            first_label: history.first().map(|(d, _)| d.clone()).unwrap_or_default(),
            last_label: history.last().map(|(d, _)| d.clone()).unwrap_or_default(),
        }
    }
}

impl ChartWidget for NetWorthChart {
    fn render(&self, frame: &mut Frame, area: Rect) {
        if self.points.is_empty() {
            frame.render_widget(
                Paragraph::new(" No net worth history yet").style(FOOTER_STYLE),
                area,
            );
            return;
        }

        let min = self.points.iter().map(|(_, y)| *y).fold(f64::MAX, f64::min);
        let max = self.points.iter().map(|(_, y)| *y).fold(f64::MIN, f64::max);
        let pad = ((max - min).abs() * 0.1).max(1.0);
        let (lo, hi) = (min - pad, max + pad);

        let dataset = Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&self.points);

        let chart = Chart::new(vec![dataset])
            .block(
                Block::default()
                    .title("Net Worth")
                    .title_style(Style::default().add_modifier(Modifier::BOLD))
                    .borders(Borders::NONE),
            )
            .x_axis(
                Axis::default()
                    .bounds([0.0, (self.points.len().saturating_sub(1)).max(1) as f64])
                    .labels(vec![
                        Span::styled(self.first_label.clone(), FOOTER_STYLE),
                        Span::styled(self.last_label.clone(), FOOTER_STYLE),
                    ]),
            )
            .y_axis(
                Axis::default()
                    .bounds([lo, hi])
                    .labels(vec![
                        Span::styled(money_compact(lo.max(0.0)), FOOTER_STYLE),
                        Span::styled(money_compact(hi), FOOTER_STYLE),
                    ]),
            );
        frame.render_widget(chart, area);
    }
}

/// Income vs expenses as grouped bars, one group per period.
pub struct CashFlowChart {
    labels: Vec<String>,
    income: Vec<u64>,
    expenses: Vec<u64>,
}

impl CashFlowChart {
    pub fn new(daily: &[(String, Decimal, Decimal)]) -> Self {
        Self {
            labels: daily.iter().map(|(d, _, _)| d.clone()).collect(),
            income: daily
                .iter()
                .map(|(_, inc, _)| inc.to_f64().unwrap_or(0.0).max(0.0) as u64)
                .collect(),
            expenses: daily
                .iter()
                .map(|(_, _, exp)| exp.to_f64().unwrap_or(0.0).abs() as u64)
                .collect(),
        }
    }
}

impl ChartWidget for CashFlowChart {
    fn render(&self, frame: &mut Frame, area: Rect) {
        if self.labels.is_empty() {
            frame.render_widget(
                Paragraph::new(" No cash flow in this period").style(FOOTER_STYLE),
                area,
            );
            return;
        }

        let income_style = Style::default().fg(Color::Rgb(80, 220, 100));
        let expense_style = Style::default().fg(Color::Red);

        let max_val = self
            .income
            .iter()
            .chain(self.expenses.iter())
            .copied()
            .max()
            .unwrap_or(1) as f64;
        let (top_tick, mid_tick) = y_axis_ticks(max_val);
        let top_label = money_compact(top_tick);
        let mid_label = money_compact(mid_tick);
        let y_label_width = top_label.len().max(mid_label.len()) as u16 + 1;

        let [y_axis_area, bar_area] =
            Layout::horizontal([Constraint::Length(y_label_width), Constraint::Fill(1)])
                .areas(area);

        let inner_height = bar_area.height.saturating_sub(2); // title + labels row
        let mid_row = inner_height / 2;
        let mut y_lines: Vec<Line> = vec![Line::from("")];
        for row in 0..inner_height {
            if row == 0 {
                y_lines.push(Line::from(Span::styled(
                    format!("{:>width$}", top_label, width = y_label_width as usize),
                    FOOTER_STYLE,
                )));
            } else if row == mid_row {
                y_lines.push(Line::from(Span::styled(
                    format!("{:>width$}", mid_label, width = y_label_width as usize),
                    FOOTER_STYLE,
                )));
            } else {
                y_lines.push(Line::from(""));
            }
        }
        frame.render_widget(Paragraph::new(y_lines), y_axis_area);

        let groups: Vec<BarGroup> = self
            .labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let inc = self.income.get(i).copied().unwrap_or(0);
                let exp = self.expenses.get(i).copied().unwrap_or(0);
                let bars = vec![
                    Bar::default().value(inc).style(income_style),
                    Bar::default().value(exp).style(expense_style),
                ];
                BarGroup::default()
                    .label(Line::from(label.as_str()))
                    .bars(&bars)
            })
            .collect();

        let block = Block::default()
            .title("Cash Flow")
            .title_style(Style::default().add_modifier(Modifier::BOLD))
            .borders(Borders::NONE);

        let mut chart = BarChart::default()
            .block(block)
            .bar_width(2)
            .bar_gap(0)
            .group_gap(1);
        for group in &groups {
            chart = chart.data(group.clone());
        }
        frame.render_widget(chart, bar_area);
    }
}

/// Top spending categories with proportional bars.
pub struct SpendingChart {
    rows: Vec<(String, Decimal)>,
}

impl SpendingChart {
    pub fn new(rows: Vec<(String, Decimal)>) -> Self {
        Self { rows }
    }
}

impl ChartWidget for SpendingChart {
    fn render(&self, frame: &mut Frame, area: Rect) {
        let mut lines = vec![Line::from(Span::styled(
            " Top Spending",
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        if self.rows.is_empty() {
            lines.push(Line::from(Span::styled(
                " No spending in this period",
                FOOTER_STYLE,
            )));
        }
        let max = self
            .rows
            .iter()
            .map(|(_, v)| *v)
            .max()
            .unwrap_or(Decimal::ONE)
            .max(Decimal::ONE);
        let name_width = self.rows.iter().map(|(n, _)| n.len()).max().unwrap_or(10);
        let bar_budget = (area.width as usize).saturating_sub(name_width + 16).max(5);

        for (name, value) in &self.rows {
            let frac = (*value / max).to_f64().unwrap_or(0.0).clamp(0.0, 1.0);
            let filled = (frac * bar_budget as f64).round() as usize;
            lines.push(Line::from(vec![
                Span::raw(format!(" {name:<name_width$}  ")),
                Span::styled(
                    "\u{2587}".repeat(filled.max(1)),
                    Style::default().fg(Color::Red),
                ),
                Span::raw(format!(" {}", money(*value))),
            ]));
        }
        frame.render_widget(Paragraph::new(lines), area);
    }
}

/// Portfolio allocation by security type.
pub struct AllocationChart {
    slices: Vec<(String, Decimal, Decimal)>, // (label, value, percent)
}

impl AllocationChart {
    pub fn new(slices: Vec<(String, Decimal, Decimal)>) -> Self {
        Self { slices }
    }
}

impl ChartWidget for AllocationChart {
    fn render(&self, frame: &mut Frame, area: Rect) {
        let mut lines = vec![Line::from(Span::styled(
            " Allocation",
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        if self.slices.is_empty() {
            lines.push(Line::from(Span::styled(" No holdings", FOOTER_STYLE)));
        }
        let name_width = self.slices.iter().map(|(n, _, _)| n.len()).max().unwrap_or(8);
        let bar_budget = (area.width as usize).saturating_sub(name_width + 22).max(5);

        for (label, value, percent) in &self.slices {
            let frac = (percent.to_f64().unwrap_or(0.0) / 100.0).clamp(0.0, 1.0);
            let filled = (frac * bar_budget as f64).round() as usize;
            lines.push(Line::from(vec![
                Span::raw(format!(" {label:<name_width$}  ")),
                Span::styled(
                    "\u{2587}".repeat(filled.max(1)),
                    Style::default().fg(Color::Cyan),
                ),
                Span::raw(format!(" {:>5.1}%  {}", percent.to_f64().unwrap_or(0.0), money(*value))),
            ]));
        }
        frame.render_widget(Paragraph::new(lines), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Test double whose drop is observable, standing in for a widget
    /// holding a terminal surface binding.
    struct CountingChart {
        drops: Arc<AtomicUsize>,
    }

    impl Drop for CountingChart {
        fn drop(&mut self) {
            self.drops.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl ChartWidget for CountingChart {
        fn render(&self, _frame: &mut Frame, _area: Rect) {}
    }

    fn counting(drops: &Arc<AtomicUsize>) -> Box<dyn ChartWidget> {
        Box::new(CountingChart {
            drops: Arc::clone(drops),
        })
    }

    #[test]
    fn test_mount_destroys_previous_instance() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut registry = ChartRegistry::new();

        registry.mount("net_worth", counting(&drops));
        assert_eq!(drops.load(Ordering::SeqCst), 0);

        // Remounting the same name destroys the first chart before binding
        registry.mount("net_worth", counting(&drops));
        assert_eq!(drops.load(Ordering::SeqCst), 1);
        assert_eq!(registry.mounted_count(), 1);
        assert_eq!(registry.destroyed_count(), 1);
    }

    #[test]
    fn test_reload_cycle_replaces_every_chart_once() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut registry = ChartRegistry::new();
        let names = ["net_worth", "cash_flow", "spending", "allocation"];

        for name in names {
            registry.mount(name, counting(&drops));
        }
        // Second reload: each named chart destroyed exactly once
        for name in names {
            registry.mount(name, counting(&drops));
        }
        assert_eq!(drops.load(Ordering::SeqCst), names.len());
        assert_eq!(registry.mounted_count(), names.len());
    }

    #[test]
    fn test_destroy_all_is_idempotent() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut registry = ChartRegistry::new();
        registry.destroy_all(); // nothing mounted: safe

        registry.mount("spending", counting(&drops));
        registry.destroy_all();
        registry.destroy_all();
        assert_eq!(drops.load(Ordering::SeqCst), 1);
        assert_eq!(registry.mounted_count(), 0);
        assert!(!registry.is_mounted("spending"));
    }

    #[test]
    fn test_destroy_unknown_name_is_noop() {
        let mut registry = ChartRegistry::new();
        registry.destroy("never_mounted");
        assert_eq!(registry.destroyed_count(), 0);
    }

    #[test]
    fn test_y_axis_ticks_round_up() {
        assert_eq!(y_axis_ticks(900.0), (1000.0, 500.0));
        assert_eq!(y_axis_ticks(2600.0), (5000.0, 2500.0));
        assert_eq!(y_axis_ticks(10000.0), (10000.0, 5000.0));
    }
}
