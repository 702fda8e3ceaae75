use binwatch_core::{
    classify::{DerivedState, FillTier},
    model::{Connection, SyncStatus, TrashKind},
};
use chrono::{DateTime, Local, Utc};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table, Wrap},
};

use crate::app::App;

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    if app.state.status.is_loading {
        let loading = Paragraph::new("Loading waste monitoring data…")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Binwatch"));
        frame.render_widget(loading, area);
        return;
    }

    let error_height = if app.state.status.last_error.is_some() {
        3
    } else {
        0
    };

    // Outer layout: header, error banner, cards, footer
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(error_height),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, error_area, content_area, footer_area] = chunks else {
        return;
    };

    draw_header(frame, &app.state.status, *header_area);

    if let Some(message) = &app.state.status.last_error {
        let banner = Paragraph::new(format!("Error: {message} · press r to try again"))
            .style(Style::default().fg(Color::Red))
            .block(Block::default().borders(Borders::ALL).title("Last attempt failed"))
            .wrap(Wrap { trim: true });
        frame.render_widget(banner, *error_area);
    }

    draw_cards(frame, &app.derived(), *content_area);

    let footer = Paragraph::new(format!(
        "Last updated: {} · r/F5 refresh · q/Ctrl-C quit",
        last_updated_label(app.state.status.last_updated)
    ))
    .block(Block::default().borders(Borders::ALL).title(concat!(
        "IoT Waste Management System v",
        env!("CARGO_PKG_VERSION")
    )))
    .wrap(Wrap { trim: true });
    frame.render_widget(footer, *footer_area);
}

fn draw_header(frame: &mut Frame<'_>, status: &SyncStatus, area: Rect) {
    let (indicator, indicator_style) = match status.connection {
        Connection::Connected => ("● Connected", Style::default().fg(Color::Green)),
        Connection::Disconnected => ("● Disconnected", Style::default().fg(Color::Red)),
    };
    let refresh = if status.is_refreshing {
        "Refreshing…"
    } else {
        "Refresh (r)"
    };

    let line = Line::from(vec![
        Span::styled(indicator, indicator_style),
        Span::raw("   "),
        Span::styled(refresh, Style::default().fg(Color::Yellow)),
    ]);

    let header = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .title("IoT Waste Monitoring Dashboard"),
    );
    frame.render_widget(header, area);
}

fn draw_cards(frame: &mut Frame<'_>, derived: &DerivedState, area: Rect) {
    let row_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let [top_row, bottom_row] = row_chunks.as_ref() else {
        return;
    };

    let top_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(*top_row);
    let [waste_area, weight_area] = top_chunks.as_ref() else {
        return;
    };

    let bottom_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(*bottom_row);
    let [price_area, stats_area] = bottom_chunks.as_ref() else {
        return;
    };

    let waste = Paragraph::new(derived.waste_label())
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(trash_color(derived.trash_kind))
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL).title("Waste Type"));
    frame.render_widget(waste, *waste_area);

    draw_weight(frame, derived, *weight_area);

    let price = Paragraph::new(vec![
        Line::from(format!("Rs {}", derived.display_price)).bold(),
        Line::from("Current waste processing fee"),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).title("Price"));
    frame.render_widget(price, *price_area);

    let tier_style = Style::default().fg(tier_color(derived.fill_tier));
    let rows = vec![
        Row::new(vec![
            Cell::from("Container Status:"),
            Cell::from(derived.fill_tier.label()).style(tier_style),
        ]),
        Row::new(vec![
            Cell::from("Capacity Remaining:"),
            Cell::from(format!("{:.1} kg", derived.remaining_capacity)),
        ]),
        Row::new(vec![
            Cell::from("Collection Schedule:"),
            Cell::from(derived.schedule.label()).style(tier_style),
        ]),
        Row::new(vec![
            Cell::from("Waste Type:"),
            Cell::from(derived.waste_label())
                .style(Style::default().fg(trash_color(derived.trash_kind))),
        ]),
    ];

    let stats = Table::new(rows, [Constraint::Length(21), Constraint::Min(10)])
        .block(Block::default().borders(Borders::ALL).title("Statistics"))
        .column_spacing(1);
    frame.render_widget(stats, *stats_area);
}

fn draw_weight(frame: &mut Frame<'_>, derived: &DerivedState, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Weight");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let weight_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(1)])
        .split(inner);
    let [value_area, gauge_area] = weight_chunks.as_ref() else {
        return;
    };

    let value = Paragraph::new(format!("{} gm", derived.display_weight))
        .alignment(Alignment::Center)
        .bold();
    frame.render_widget(value, *value_area);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(tier_color(derived.fill_tier)))
        .ratio((derived.fill_percentage / 100.0).clamp(0.0, 1.0))
        .label(fill_label(derived.fill_percentage));
    frame.render_widget(gauge, *gauge_area);
}

fn fill_label(fill_percentage: f64) -> String {
    format!("Fill Level: {fill_percentage:.0}%")
}

fn last_updated_label(last_updated: Option<DateTime<Utc>>) -> String {
    last_updated.map_or_else(
        || "never".to_owned(),
        |stamp| {
            stamp
                .with_timezone(&Local)
                .format("%H:%M:%S on %d.%m.%Y")
                .to_string()
        },
    )
}

fn tier_color(tier: FillTier) -> Color {
    match tier {
        FillTier::Normal => Color::Green,
        FillTier::Warning => Color::Yellow,
        FillTier::Critical => Color::Red,
    }
}

fn trash_color(kind: TrashKind) -> Color {
    match kind {
        TrashKind::Wet => Color::Blue,
        TrashKind::Dry => Color::Yellow,
        TrashKind::Unknown => Color::Gray,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_label_rounds_to_whole_percent() {
        assert_eq!(fill_label(54.6), "Fill Level: 55%");
        assert_eq!(fill_label(0.0), "Fill Level: 0%");
    }

    #[test]
    fn last_updated_before_first_success() {
        assert_eq!(last_updated_label(None), "never");
    }
}
