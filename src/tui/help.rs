use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

fn key_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{key:<10}"), Style::default().fg(Color::Magenta)),
        Span::raw(desc),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        key_line("q, Ctrl-C", "Quit"),
        key_line("s", "Submit the loaded FASTA payload"),
        key_line("/", "Edit the table search (Enter/Esc done)"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("Esc", Style::default().fg(Color::Magenta)),
            Span::raw("        Clear the search"),
        ]),
        key_line("n, Right", "Next page"),
        key_line("p, Left", "Previous page"),
        key_line("+, -, l", "Cycle the page size (10/25/50/100)"),
        key_line("Up, Down", "Select a sort column"),
        key_line("1-9", "Jump the sort selection to a column"),
        key_line("o", "Sort by the selected column (toggles order)"),
        key_line("e", "Export the table as CSV"),
        key_line("y", "Copy the job id to the clipboard"),
        key_line("?", "Toggle this help"),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(Clear, area);
    f.render_widget(p, area);
}
