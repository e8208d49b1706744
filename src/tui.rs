use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use rust_decimal::Decimal;

use crate::fmt::money;

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

pub const FOOTER_STYLE: Style = Style::new().fg(Color::DarkGray);

pub const AMOUNT_POS_STYLE: Style = Style::new().fg(Color::Rgb(80, 220, 100));
pub const AMOUNT_NEG_STYLE: Style = Style::new().fg(Color::Red);

pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(40, 40, 60))
    .add_modifier(Modifier::BOLD);

/// Signed balance as a colored span: green when at-or-above zero, red
/// below. Used for balances and net figures where sign means direction.
pub fn money_span(amount: Decimal) -> Span<'static> {
    let style = if amount < Decimal::ZERO {
        AMOUNT_NEG_STYLE
    } else {
        AMOUNT_POS_STYLE
    };
    Span::styled(money(amount), style)
}

/// Transaction amount as a colored span. Plaid sign convention: negative
/// is income (green), positive is spend (red). Shows the absolute value —
/// color conveys the direction.
pub fn txn_amount_span(amount: Decimal) -> Span<'static> {
    let style = if amount < Decimal::ZERO {
        AMOUNT_POS_STYLE
    } else {
        AMOUNT_NEG_STYLE
    };
    Span::styled(money(amount.abs()), style)
}

/// Wrap text to a given width. Returns (wrapped_string, line_count).
pub fn wrap_text(text: &str, width: usize) -> (String, u16) {
    if width == 0 {
        return (text.to_string(), 1);
    }
    let wrapped = textwrap::fill(text, width);
    let lines = wrapped.lines().count().max(1) as u16;
    (wrapped, lines)
}

/// Defined empty/error state: icon, message, call-to-action. Rendered in
/// place of a table whenever a collection is empty or a load failed,
/// never a bare empty surface.
pub fn empty_state(icon: &str, message: &str, call_to_action: &str) -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("   {icon}"),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            format!("   {message}"),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(format!("   {call_to_action}"), FOOTER_STYLE)),
    ]
}

/// Restore the terminal if a draw handler panics.
pub fn install_panic_hook() {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        ratatui::restore();
        hook(info);
    }));
}
