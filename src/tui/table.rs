use super::state::UiState;
use crate::view::{SortOrder, EMPTY_NOTICE};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

pub fn draw_result(area: Rect, f: &mut Frame, state: &UiState) {
    let block = Block::default().borders(Borders::ALL).title("Result");

    if let Some(err) = &state.error {
        let p = Paragraph::new(vec![
            Line::from(Span::styled(
                "Submission failed",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(err.clone()),
        ])
        .wrap(Wrap { trim: false })
        .block(block);
        f.render_widget(p, area);
        return;
    }

    let view = match (&state.table, state.visibility.result_area) {
        (Some(view), true) => view,
        _ => {
            let p = Paragraph::new("Press 's' to submit the loaded FASTA payload.").block(block);
            f.render_widget(p, area);
            return;
        }
    };

    if view.is_empty() {
        let p = Paragraph::new(EMPTY_NOTICE).block(block);
        f.render_widget(p, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)].as_ref())
        .split(area);

    let header = Row::new(
        view.columns()
            .iter()
            .enumerate()
            .map(|(i, name)| header_cell(state, i, name))
            .collect::<Vec<_>>(),
    )
    .height(1);

    let rows: Vec<Row> = view
        .visible_rows()
        .into_iter()
        .map(Row::new)
        .collect();

    let ncols = view.columns().len().max(1) as u32;
    let widths = vec![Constraint::Ratio(1, ncols); ncols as usize];
    let title = format!(
        "Result (page {}/{}, {} per page)",
        view.page() + 1,
        view.page_count(),
        view.page_size()
    );
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(table, chunks[0]);

    let mut info = view.info_line();
    if !view.search().is_empty() {
        info.push_str(&format!("  [search: {}]", view.search()));
    }
    f.render_widget(
        Paragraph::new(info).style(Style::default().fg(Color::Gray)),
        chunks[1],
    );
}

fn header_cell(state: &UiState, index: usize, name: &str) -> Cell<'static> {
    let view = state.table.as_ref();
    let mut text = name.to_string();
    if let Some((col, order)) = view.and_then(|v| v.sort()) {
        if col == index {
            text.push_str(match order {
                SortOrder::Ascending => " ^",
                SortOrder::Descending => " v",
            });
        }
    }
    let style = if index == state.sort_cursor {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    Cell::from(text).style(style)
}
