use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState, Wrap},
};
use toiletkaart_core::{Classification, Facility, Ownership, day_token};

use crate::app::{App, FILTER_ROWS, FilterRow, Focus};

const SLIDER_WIDTH: u16 = 24;

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: title, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    let header = Paragraph::new(format!("Public toilets in {}", app.municipality))
        .block(Block::default().borders(Borders::ALL).title("toiletkaart"));
    frame.render_widget(header, *header_area);

    let body_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(46), Constraint::Min(0)])
        .split(*content_area);
    let [controls_area, table_area] = body_chunks.as_ref() else {
        return;
    };

    draw_controls(frame, app, *controls_area);
    draw_facilities(frame, app, *table_area);

    // Status bar
    let nav_hint = if app.show_details {
        "Esc/Enter close details · q/Ctrl-C quit"
    } else {
        match app.focus {
            Focus::Facilities => {
                "←/→ ±15 min · ,/. ±1 min · [/] day · t time filter · Tab filters · Enter details · q quit"
            }
            Focus::Filters => {
                "↑/↓ row · Space on/off · v/Enter yes/no · 1-3 ownership · Tab list · q quit"
            }
        }
    };

    let status_text = match &app.error_message {
        Some(msg) => format!("{msg} · {nav_hint}"),
        None => nav_hint.to_owned(),
    };
    let status_style = if app.error_message.is_some() {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });
    frame.render_widget(status, *status_area);

    if app.show_details
        && let Some((facility, class)) = app.selected()
    {
        draw_details(frame, facility, class, area);
    }
}

fn draw_controls(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // time
            Constraint::Length(7), // filters
            Constraint::Min(0),    // legend
        ])
        .split(area);
    let [time_area, filter_area, legend_area] = layout_chunks.as_ref() else {
        return;
    };

    let time_state = if app.time_filter { "on" } else { "off" };
    let time_lines = vec![
        Line::from(format!("Day:  {}", day_token(app.day))),
        Line::from(format!("Time: {}", app.time())),
        Line::from(slider_bar(app.slider)),
        Line::from(format!("Time filter: {time_state}")),
    ];
    let time_panel = Paragraph::new(time_lines)
        .block(Block::default().borders(Borders::ALL).title("Moment"));
    frame.render_widget(time_panel, *time_area);

    let items = FILTER_ROWS
        .iter()
        .map(|row| ListItem::new(filter_label(app, *row)))
        .collect::<Vec<ListItem<'_>>>();

    let filter_title = if app.focus == Focus::Filters {
        "Filters (focused)"
    } else {
        "Filters (Tab)"
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(filter_title))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    if app.focus == Focus::Filters {
        state.select(Some(app.filter_index));
    }
    frame.render_stateful_widget(list, *filter_area, &mut state);

    let tally = app.tally();
    let mut legend_lines = if app.time_filter {
        vec![
            Line::from(vec![
                Span::styled("■ ", class_style(Classification::Open)),
                Span::raw(format!("Open     {}", tally.open)),
            ]),
            Line::from(vec![
                Span::styled("■ ", class_style(Classification::Closed)),
                Span::raw(format!("Closed   {}", tally.closed)),
            ]),
        ]
    } else {
        vec![Line::from(vec![
            Span::styled("■ ", class_style(Classification::Visible)),
            Span::raw(format!("Shown    {}", tally.visible)),
        ])]
    };
    legend_lines.push(Line::from(format!("  Hidden   {}", tally.hidden)));

    let legend = Paragraph::new(legend_lines)
        .block(Block::default().borders(Borders::ALL).title("Legend"));
    frame.render_widget(legend, *legend_area);
}

fn draw_facilities(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let shown = app.shown();
    let title = format!(
        "Facilities ({} of {}, ↑/↓, Enter)",
        shown.len(),
        app.facilities.len()
    );

    if shown.is_empty() {
        let paragraph = Paragraph::new("No facilities match the current filters.")
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let rows = shown.iter().map(|(facility, class)| {
        let hours = facility
            .opening_hours
            .hours_on(app.day)
            .map_or_else(|_| "unknown".to_owned(), |hours| hours.to_string());

        Row::new(vec![
            Cell::from(class_label(*class)),
            Cell::from(facility.label()),
            Cell::from(hours),
            Cell::from(yes_no(facility.fee)),
            Cell::from(accessibility_label(facility)),
            Cell::from(facility.ownership.token()),
        ])
        .style(class_style(*class))
    });

    let column_widths = [
        Constraint::Length(8),
        Constraint::Min(20),
        Constraint::Length(15),
        Constraint::Length(5),
        Constraint::Length(10),
        Constraint::Length(10),
    ];

    let highlight = if app.focus == Focus::Facilities {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    };

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec!["Status", "Name", "Hours", "Fee", "Access", "Owner"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(highlight)
        .column_spacing(1);

    let mut state = TableState::default().with_selected(Some(app.list_index));
    frame.render_stateful_widget(table, area, &mut state);
}

fn draw_details(frame: &mut Frame<'_>, facility: &Facility, class: Classification, area: Rect) {
    let popup_area = centered(area, 60, 60);

    let mut rows = vec![Row::new(vec![
        Cell::from("status"),
        Cell::from(class_label(class)),
    ])
    .style(class_style(class))];
    if let Some(location) = facility.location {
        rows.push(Row::new(vec![
            Cell::from("location"),
            Cell::from(format!("{:.5}, {:.5}", location.lat, location.lon)),
        ]));
    }
    rows.extend(
        facility
            .properties
            .iter()
            .map(|(key, value)| Row::new(vec![Cell::from(key.as_str()), Cell::from(value.as_str())])),
    );

    let table = Table::new(rows, [Constraint::Length(18), Constraint::Min(10)])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} (Esc to close)", facility.label())),
        )
        .column_spacing(1);

    frame.render_widget(Clear, popup_area);
    frame.render_widget(table, popup_area);
}

fn filter_label(app: &App, row: FilterRow) -> String {
    match row {
        FilterRow::Flag(attribute) => {
            let predicate = app.filters.predicate(attribute);
            format!(
                "{} {} = {}",
                checkbox(predicate.enabled),
                attribute.label(),
                yes_no(predicate.desired)
            )
        }
        FilterRow::Ownership => {
            let categories = Ownership::ALL
                .iter()
                .enumerate()
                .map(|(idx, ownership)| {
                    let mark = if app.filters.ownership.accepts(*ownership) { "+" } else { "-" };
                    format!("{}{mark}{}", idx + 1, ownership.token())
                })
                .collect::<Vec<_>>()
                .join(" ");
            format!("{} owner {categories}", checkbox(app.filters.ownership.enabled))
        }
    }
}

fn slider_bar(slider: u16) -> String {
    let filled = usize::from(slider * SLIDER_WIDTH / 1440);
    let width = usize::from(SLIDER_WIDTH);
    format!(
        "00 [{}|{}] 24",
        "=".repeat(filled.min(width)),
        " ".repeat(width.saturating_sub(filled))
    )
}

fn checkbox(checked: bool) -> &'static str {
    if checked { "[x]" } else { "[ ]" }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn accessibility_label(facility: &Facility) -> &'static str {
    match (facility.wheelchair, facility.wheelchair_plus) {
        (_, true) => "wheelchair+",
        (true, false) => "wheelchair",
        (false, false) => "-",
    }
}

fn class_label(class: Classification) -> &'static str {
    match class {
        Classification::Open => "open",
        Classification::Closed => "closed",
        Classification::Visible => "-",
        Classification::Hidden => "hidden",
    }
}

fn class_style(class: Classification) -> Style {
    match class {
        Classification::Open => Style::default().fg(Color::Green),
        Classification::Closed => Style::default().fg(Color::DarkGray),
        Classification::Visible | Classification::Hidden => Style::default(),
    }
}

fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let Some(middle) = vertical.get(1) else {
        return area;
    };
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(*middle);
    horizontal.get(1).copied().unwrap_or(area)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slider_bar_fills_proportionally() {
        assert_eq!(slider_bar(1440), format!("00 [{}|] 24", "=".repeat(24)));
        assert_eq!(slider_bar(720), format!("00 [{}|{}] 24", "=".repeat(12), " ".repeat(12)));
        assert_eq!(slider_bar(1), format!("00 [|{}] 24", " ".repeat(24)));
    }
}
