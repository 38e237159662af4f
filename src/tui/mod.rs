mod export;
mod help;
mod state;
mod table;

use crate::cli::{self, Cli};
use crate::client::{self, HttpBackend};
use crate::model::SubmitEvent;
use crate::orchestrator::{self, UiCommand};
use crate::ready::{ReadyGate, ReadySignal};
use crate::store::{FsStore, StateStore};
use crate::view::PAGE_SIZES;
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Terminal,
};
use state::UiState;
use std::sync::Arc;
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Backend pages worth visiting once results exist; shown in the auxiliary
/// region. The epitope route spelling is the backend's own.
const AUX_PAGES: [&str; 5] = [
    "View_Perfect_Match_Table/",
    "View_by_Reference/",
    "View_by_Eptiope/",
    "View_by_Query/",
    "job_id_search/",
];

pub async fn run(args: Cli) -> Result<()> {
    let cfg = cli::build_config(&args);
    let store: Arc<dyn StateStore> = Arc::new(FsStore::new()?);
    let backend = Arc::new(HttpBackend::new(&cfg)?);

    // Unbounded channels avoid backpressure and task switching in the hot path.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<SubmitEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();
    let (signal, gate) = ReadyGate::channel();

    // A rejected --input is a startup warning, not a failure; the payload
    // simply stays empty until a valid one is supplied.
    let (sequence, input_warning) = match cli::load_sequence(&args) {
        Ok(seq) => (seq, None),
        Err(e) => (None, Some(format!("{e:#}"))),
    };

    let restore_cache = !args.no_cache;
    let client_ref = cfg.client_ref.clone();

    // TUI runs in a dedicated thread to keep all blocking I/O out of the
    // Tokio runtime.
    let ui_args = args.clone();
    let ui_store = store.clone();
    let ui_handle = std::thread::spawn(move || {
        run_threaded(
            ui_args,
            ui_store,
            client_ref,
            sequence,
            input_warning,
            signal,
            event_rx,
            cmd_tx,
        )
    });

    let res =
        orchestrator::run_controller(cfg, backend, store, gate, restore_cache, event_tx, cmd_rx)
            .await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Run the TUI loop on a dedicated thread.
#[allow(clippy::too_many_arguments)]
fn run_threaded(
    args: Cli,
    store: Arc<dyn StateStore>,
    client_ref: String,
    sequence: Option<String>,
    input_warning: Option<String>,
    signal: ReadySignal,
    mut event_rx: UnboundedReceiver<SubmitEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let mut state = UiState::new(store, args.page_size, args.base_url.clone());
    if let Some(warning) = input_warning {
        state.info = warning;
    }

    // The renderer can draw now; gated renders (fresh or cached) may run.
    signal.ready();

    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    let res = loop {
        // Drain events without blocking to keep the UI responsive.
        while let Ok(ev) = event_rx.try_recv() {
            state.apply_event(ev);
        }

        if last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| draw(f.area(), f, &state)).ok();
            last_tick = Instant::now();
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                if state.search_editing {
                    handle_search_key(&mut state, k.code);
                    continue;
                }
                match (k.modifiers, k.code) {
                    (_, KeyCode::Char('q')) | (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
                        let _ = cmd_tx.send(UiCommand::Quit);
                        break Ok(());
                    }
                    (_, KeyCode::Char('s')) => {
                        request_submit(&mut state, &args, &client_ref, &sequence, &cmd_tx);
                    }
                    (_, KeyCode::Char('/')) => {
                        if state.table.is_some() {
                            state.search_editing = true;
                        }
                    }
                    (_, KeyCode::Esc) => {
                        if state.show_help {
                            state.show_help = false;
                        } else if let Some(view) = state.table.as_mut() {
                            view.set_search("");
                        }
                    }
                    (_, KeyCode::Char('n')) | (_, KeyCode::Right) => {
                        if let Some(view) = state.table.as_mut() {
                            view.next_page();
                        }
                    }
                    (_, KeyCode::Char('p')) | (_, KeyCode::Left) => {
                        if let Some(view) = state.table.as_mut() {
                            view.prev_page();
                        }
                    }
                    (_, KeyCode::Char('l')) | (_, KeyCode::Char('+')) => {
                        if let Some(view) = state.table.as_mut() {
                            view.cycle_page_size();
                        }
                    }
                    (_, KeyCode::Char('-')) => {
                        if let Some(view) = state.table.as_mut() {
                            let at = PAGE_SIZES
                                .iter()
                                .position(|&s| s == view.page_size())
                                .unwrap_or(0);
                            view.set_page_size(
                                PAGE_SIZES[(at + PAGE_SIZES.len() - 1) % PAGE_SIZES.len()],
                            );
                        }
                    }
                    (_, KeyCode::Up) => {
                        state.sort_cursor = state.sort_cursor.saturating_sub(1);
                    }
                    (_, KeyCode::Down) => {
                        let max = state
                            .table
                            .as_ref()
                            .map(|v| v.columns().len().saturating_sub(1))
                            .unwrap_or(0);
                        state.sort_cursor = (state.sort_cursor + 1).min(max);
                    }
                    (_, KeyCode::Char(c)) if c.is_ascii_digit() && c != '0' => {
                        let max = state
                            .table
                            .as_ref()
                            .map(|v| v.columns().len().saturating_sub(1))
                            .unwrap_or(0);
                        state.sort_cursor = (c as usize - '1' as usize).min(max);
                    }
                    (_, KeyCode::Char('o')) | (_, KeyCode::Enter) => {
                        let cursor = state.sort_cursor;
                        if let Some(view) = state.table.as_mut() {
                            view.sort_by(cursor);
                        }
                    }
                    (_, KeyCode::Char('e')) => match export::export_table_csv(&state) {
                        Ok(path) => {
                            state.info = format!("Exported CSV: {}", path.display());
                        }
                        Err(e) => {
                            state.info = format!("CSV export failed: {e:#}");
                        }
                    },
                    (_, KeyCode::Char('y')) => {
                        if let Some(job) = state.job.clone() {
                            match export::copy_to_clipboard(&job.short_id) {
                                Ok(()) => {
                                    state.info =
                                        format!("Copied job id to clipboard: {}", job.short_id);
                                }
                                Err(e) => {
                                    state.info = format!("Clipboard copy failed: {e:#}");
                                }
                            }
                        } else {
                            state.info = "No job id to copy".into();
                        }
                    }
                    (_, KeyCode::Char('?')) => {
                        state.show_help = !state.show_help;
                    }
                    _ => {}
                }
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

fn handle_search_key(state: &mut UiState, code: KeyCode) {
    match code {
        KeyCode::Enter | KeyCode::Esc => state.search_editing = false,
        KeyCode::Backspace => {
            if let Some(view) = state.table.as_mut() {
                let mut text = view.search().to_string();
                text.pop();
                view.set_search(text);
            }
        }
        KeyCode::Char(c) => {
            if let Some(view) = state.table.as_mut() {
                let mut text = view.search().to_string();
                text.push(c);
                view.set_search(text);
            }
        }
        _ => {}
    }
}

/// Queue a submission. The controller enforces the in-flight rule too; this
/// local check only gives faster feedback.
fn request_submit(
    state: &mut UiState,
    args: &Cli,
    client_ref: &str,
    sequence: &Option<String>,
    cmd_tx: &UnboundedSender<UiCommand>,
) {
    if state.submitting {
        state.info = "A submission is already running".into();
        return;
    }
    match sequence {
        Some(seq) => {
            let _ = cmd_tx.send(UiCommand::Submit(cli::build_fields(
                args,
                client_ref,
                seq.clone(),
            )));
        }
        None => {
            state.info = "No FASTA payload loaded (use --input or --sequence)".into();
        }
    }
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let aux_height = if state.visibility.aux_links {
        AUX_PAGES.len() as u16 + 2
    } else {
        0
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(5),
                Constraint::Length(aux_height),
                Constraint::Min(5),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(area);

    draw_status(chunks[0], f, state);
    if state.visibility.aux_links {
        draw_aux_links(chunks[1], f, state);
    }
    table::draw_result(chunks[2], f, state);
    draw_footer(chunks[3], f, state);

    if state.show_help {
        help::draw_help(area, f);
    }
}

fn draw_status(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let mut lines = Vec::new();

    let mut status = Line::from(vec![
        Span::styled("Status: ", Style::default().fg(Color::Gray)),
        if state.submitting {
            Span::styled("Submitting", Style::default().fg(Color::Yellow))
        } else {
            Span::raw("Idle")
        },
    ]);
    if let Some(elapsed) = state.progress.display() {
        status.push_span(Span::styled(
            format!("  ({elapsed})"),
            Style::default().fg(Color::Gray),
        ));
    }
    lines.push(status);

    if state.visibility.job_badge {
        if let Some(job) = state.job.as_ref() {
            lines.push(Line::from(vec![
                Span::styled("Job: ", Style::default().fg(Color::Gray)),
                Span::styled(
                    job.short_id.clone(),
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                ),
            ]));
        }
    }

    if !state.info.is_empty() {
        lines.push(Line::from(Span::styled(
            state.info.clone(),
            Style::default().fg(Color::Gray),
        )));
    }

    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("seqjob"));
    f.render_widget(p, area);
}

fn draw_aux_links(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let lines: Vec<Line> = AUX_PAGES
        .iter()
        .map(|page| {
            Line::from(Span::styled(
                client::join_url(&state.base_url, page),
                Style::default().fg(Color::Cyan),
            ))
        })
        .collect();
    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Explore"));
    f.render_widget(p, area);
}

fn draw_footer(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let line = if state.search_editing {
        let text = state
            .table
            .as_ref()
            .map(|v| v.search().to_string())
            .unwrap_or_default();
        Line::from(vec![
            Span::styled("Search: ", Style::default().fg(Color::Yellow)),
            Span::raw(text),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ])
    } else {
        Line::from(Span::styled(
            "s submit  / search  n/p page  l page size  Up/Down+o sort  e export  y copy job  ? help  q quit",
            Style::default().fg(Color::Gray),
        ))
    };
    f.render_widget(Paragraph::new(line), area);
}
