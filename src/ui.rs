//! TUI and interactive components
//!
//! Features:
//! - Chat log with mode badges, collapsible reasoning, timing
//! - Live reasoning tab fed by the progress script, then the real trace
//! - Fuzzy model picker
//! - Mode / network toggles, two-step clear, in-flight cancel

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::client::{Backend, DemoResponse, ResponseEnvelope};
use crate::dispatch;
use crate::controller::{NoticeKind, Outcome, SessionController, Submission};
use crate::error::ClientError;
use crate::models;
use crate::progress::{self, ProgressEvent};
use crate::render::{self, Theme, ViewState};

// ═══════════════════════════════════════════════════════════════
// MODEL PICKER
// ═══════════════════════════════════════════════════════════════

/// Fuzzy-filter `models` by `filter`, best match first
pub fn filter_models<'a>(models: &'a [String], filter: &str) -> Vec<&'a String> {
    if filter.is_empty() {
        return models.iter().collect();
    }
    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<_> = models
        .iter()
        .filter_map(|m| matcher.fuzzy_match(m, filter).map(|score| (m, score)))
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.into_iter().map(|(m, _)| m).collect()
}

fn run_picker(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, models: &[String]) -> Result<String> {
    let mut filter = String::new();
    let mut list_state = ListState::default();
    list_state.select(Some(0));

    loop {
        let filtered = filter_models(models, &filter);

        // Clamp selection
        if let Some(selected) = list_state.selected() {
            if selected >= filtered.len() {
                list_state.select(Some(filtered.len().saturating_sub(1)));
            }
        }

        terminal.draw(|f| render_picker(f, &filter, &filtered, models.len(), &mut list_state))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                match key.code {
                    KeyCode::Esc => anyhow::bail!("Cancelled"),
                    KeyCode::Enter => {
                        if let Some(idx) = list_state.selected() {
                            if let Some(model) = filtered.get(idx) {
                                return Ok((*model).clone());
                            }
                        }
                    }
                    KeyCode::Up => {
                        let i = list_state.selected().unwrap_or(0);
                        list_state.select(Some(i.saturating_sub(1)));
                    }
                    KeyCode::Down => {
                        let i = list_state.selected().unwrap_or(0);
                        list_state.select(Some((i + 1).min(filtered.len().saturating_sub(1))));
                    }
                    KeyCode::Char(c) => {
                        filter.push(c);
                        list_state.select(Some(0));
                    }
                    KeyCode::Backspace => {
                        filter.pop();
                        list_state.select(Some(0));
                    }
                    _ => {}
                }
            }
        }
    }
}

fn render_picker(
    f: &mut Frame,
    filter: &str,
    filtered: &[&String],
    total: usize,
    list_state: &mut ListState,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)])
        .split(f.size());

    let input = Paragraph::new(filter)
        .block(Block::default().borders(Borders::ALL).title("Search models"));
    f.render_widget(input, chunks[0]);

    let items: Vec<ListItem> = filtered
        .iter()
        .map(|m| ListItem::new(format!("{} ({})", m, models::provider_hint(m))))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Models ({}/{})", filtered.len(), total)),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    f.render_stateful_widget(list, chunks[1], list_state);

    let help = Paragraph::new("Enter: select | Esc: cancel | Type to filter")
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(help, chunks[2]);
}

// ═══════════════════════════════════════════════════════════════
// MAIN TUI
// ═══════════════════════════════════════════════════════════════

/// Tab selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Chat,
    Reasoning,
    Log,
}

impl Tab {
    fn all() -> &'static [Tab] {
        &[Tab::Chat, Tab::Reasoning, Tab::Log]
    }

    fn name(&self) -> &'static str {
        match self {
            Tab::Chat => "Chat",
            Tab::Reasoning => "Reasoning",
            Tab::Log => "Log",
        }
    }
}

/// Messages from background request tasks
enum TuiMsg {
    Answer(u64, Result<ResponseEnvelope, ClientError>),
    Demo(u64, Result<DemoResponse, ClientError>),
}

/// View state around the controller
struct TuiState {
    tab: Tab,
    input: String,
    log: Vec<String>,
    view: ViewState,
    theme: Theme,
    scroll_back: usize,
    tick: usize,
    models: Vec<String>,
    inflight: Option<JoinHandle<()>>,
}

impl TuiState {
    fn new(models: Vec<String>) -> Self {
        Self {
            tab: Tab::Chat,
            input: String::new(),
            log: Vec::new(),
            view: ViewState::default(),
            theme: Theme::default(),
            scroll_back: 0,
            tick: 0,
            models,
            inflight: None,
        }
    }

    fn log(&mut self, msg: impl Into<String>) {
        let now = chrono::Local::now().format("%H:%M:%S");
        self.log.push(format!("[{}] {}", now, msg.into()));
    }

    /// Record a finished request. A stale reply belongs to an aborted task,
    /// so the handle of whatever is in flight now stays put.
    fn settle(&mut self, outcome: &Outcome) {
        if *outcome != Outcome::Stale {
            self.inflight = None;
            self.scroll_back = 0;
        }
        self.log(format!("Request finished: {:?}", outcome));
    }
}

/// Run the main TUI
pub async fn run_tui(
    backend: Arc<dyn Backend>,
    controller: SessionController,
    models: Vec<String>,
) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_tui_loop(&mut terminal, backend, controller, models).await;
    restore_terminal(terminal)?;
    result
}

async fn run_tui_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    backend: Arc<dyn Backend>,
    controller: SessionController,
    models: Vec<String>,
) -> Result<()> {
    let mut state = TuiState::new(models);
    let (tx, mut rx) = mpsc::channel::<TuiMsg>(16);
    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel::<ProgressEvent>();
    let mut controller = controller.with_progress(progress_tx);

    state.log(format!(
        "Model: {} | mode: {} | network: {}",
        controller.config.model_id,
        controller.config.mode.name(),
        on_off(controller.config.network_allowed)
    ));

    loop {
        state.tick += 1;

        while let Ok(ev) = progress_rx.try_recv() {
            controller.apply_progress(ev);
        }

        // Check for finished requests
        while let Ok(msg) = rx.try_recv() {
            let outcome = match msg {
                TuiMsg::Answer(generation, result) => controller.finish(generation, result),
                TuiMsg::Demo(generation, result) => controller.finish_demo(generation, result),
            };
            state.settle(&outcome);
        }

        terminal.draw(|f| render_tui(f, &mut state, &mut controller))?;

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        // Pending clear swallows the next key
        if controller.clear_pending() {
            let yes = matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y'));
            if let Some(removed) = controller.confirm_clear(yes) {
                state.view.reset();
                state.scroll_back = 0;
                state.log(format!("Cleared {} entries", removed));
            }
            continue;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => {
                if controller.is_busy() {
                    if let Some(handle) = state.inflight.take() {
                        handle.abort();
                    }
                    controller.cancel();
                    state.log("Request cancelled");
                } else {
                    break;
                }
            }
            KeyCode::Tab => {
                let tabs = Tab::all();
                let idx = tabs.iter().position(|t| *t == state.tab).unwrap_or(0);
                state.tab = tabs[(idx + 1) % tabs.len()];
            }
            KeyCode::F(2) => {
                let mode = controller.cycle_mode();
                state.log(format!("Mode: {}", mode.name()));
            }
            KeyCode::F(3) if !controller.is_busy() => {
                let current = controller.config.model_id.clone();
                let picked = pick_model_inline(terminal, &state.models).unwrap_or(current);
                controller.set_model(&picked);
                state.log(format!("Model: {}", picked));
            }
            KeyCode::F(4) => {
                let on = controller.toggle_network();
                state.log(format!("Network: {}", on_off(on)));
            }
            KeyCode::Char('l') if ctrl => {
                controller.request_clear();
            }
            KeyCode::Char('r') if ctrl => {
                if let Some(idx) = render::last_expandable(controller.conversation()) {
                    state.view.toggle(idx);
                }
            }
            KeyCode::PageUp => state.scroll_back += 5,
            KeyCode::PageDown => state.scroll_back = state.scroll_back.saturating_sub(5),
            KeyCode::Enter if controller.can_submit(&state.input) => {
                submit(&mut state, &mut controller, &backend, &tx);
            }
            KeyCode::Char(c) if !ctrl && controller.input_focused() => {
                state.input.push(c);
            }
            KeyCode::Backspace if controller.input_focused() => {
                state.input.pop();
            }
            _ => {}
        }
    }

    if let Some(handle) = state.inflight.take() {
        handle.abort();
    }
    Ok(())
}

fn submit(
    state: &mut TuiState,
    controller: &mut SessionController,
    backend: &Arc<dyn Backend>,
    tx: &mpsc::Sender<TuiMsg>,
) {
    let text = state.input.trim().to_string();

    if let Some(topic) = dispatch::parse_demo_command(&text) {
        let topic = topic.to_string();
        let model_id = controller.config.model_id.clone();
        match controller.begin_demo(&topic) {
            Some(generation) => {
                state.input.clear();
                state.scroll_back = 0;
                state.log(format!("Agent demo: {}", topic));
                let backend = Arc::clone(backend);
                let tx = tx.clone();
                state.inflight = Some(tokio::spawn(async move {
                    let result = backend.agent_demo(&topic, &model_id).await;
                    let _ = tx.send(TuiMsg::Demo(generation, result)).await;
                }));
            }
            None => state.log(format!("Demo not started: {:?}", topic)),
        }
        return;
    }

    match controller.begin(&text) {
        Submission::Rejected => {}
        Submission::Downgraded => {
            state.log("Network disabled: mode switched to simple");
        }
        Submission::Dispatch(d) => {
            state.input.clear();
            state.scroll_back = 0;
            state.log(format!(
                "Sending to {}: {}",
                d.endpoint.path(),
                text.chars().take(50).collect::<String>()
            ));
            let backend = Arc::clone(backend);
            let tx = tx.clone();
            state.inflight = Some(tokio::spawn(async move {
                let result = backend.send(d.endpoint, &d.request).await;
                let _ = tx.send(TuiMsg::Answer(d.generation, result)).await;
            }));
        }
    }
}

/// Model picker drawn on the already-open terminal
fn pick_model_inline(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    models: &[String],
) -> Option<String> {
    run_picker(terminal, models).ok()
}

fn render_tui(f: &mut Frame, state: &mut TuiState, controller: &mut SessionController) {
    let area = f.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header + tabs
            Constraint::Min(5),    // Main content
            Constraint::Length(3), // Input
            Constraint::Length(1), // Status / notice
        ])
        .split(area);

    let title = format!(
        "consulta | {} | {} | web {}",
        controller.config.model_id,
        controller.config.mode.name(),
        on_off(controller.config.network_allowed)
    );
    let tabs = Tabs::new(Tab::all().iter().map(|t| t.name()))
        .select(Tab::all().iter().position(|t| *t == state.tab).unwrap_or(0))
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(tabs, chunks[0]);

    match state.tab {
        Tab::Chat => render_chat(f, state, controller, chunks[1]),
        Tab::Reasoning => render_reasoning(f, controller, chunks[1]),
        Tab::Log => render_log(f, state, chunks[1]),
    }

    // Input
    let enabled = controller.input_focused();
    let input_style = if enabled {
        Style::default()
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let input_title = match controller.tracker().elapsed() {
        Some(elapsed) => format!(
            "{} {} ({}) - Esc to cancel",
            spinner_char(state.tick),
            controller.tracker().label().unwrap_or("Sending..."),
            progress::format_elapsed(elapsed)
        ),
        None if controller.can_submit(&state.input) => "Input (Enter to send)".into(),
        None => "Input".into(),
    };
    let input = Paragraph::new(state.input.as_str())
        .style(input_style)
        .block(Block::default().borders(Borders::ALL).title(input_title));
    f.render_widget(input, chunks[2]);
    if enabled && state.tab == Tab::Chat {
        let x = chunks[2].x + 1 + unicode_width::UnicodeWidthStr::width(state.input.as_str()) as u16;
        f.set_cursor(x.min(chunks[2].right().saturating_sub(2)), chunks[2].y + 1);
    }

    // Status bar: confirmation prompt, then notices, then key help
    let status = if controller.clear_pending() {
        Paragraph::new(" Clear the whole conversation? (y/n)")
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    } else if let Some(notice) = controller.notice() {
        let color = match notice.kind {
            NoticeKind::Info => Color::Blue,
            NoticeKind::Success => Color::Green,
            NoticeKind::Error => Color::Red,
        };
        Paragraph::new(format!(" {}", notice.text)).style(Style::default().fg(color))
    } else {
        Paragraph::new(
            " F2:mode F3:model F4:web Ctrl-L:clear Ctrl-R:reasoning PgUp/PgDn:scroll Tab:switch Esc:quit",
        )
        .style(Style::default().fg(Color::DarkGray))
    };
    f.render_widget(status, chunks[3]);
}

fn render_chat(f: &mut Frame, state: &TuiState, controller: &SessionController, area: Rect) {
    let lines = render::conversation_lines(controller.conversation(), &state.view, &state.theme);
    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2);
    let rows = render::wrapped_height(&lines, inner_width);
    let scroll = render::tail_scroll(rows, inner_height, state.scroll_back);

    let para = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(Block::default().borders(Borders::ALL).title("Chat"));
    f.render_widget(para, area);
}

fn render_reasoning(f: &mut Frame, controller: &SessionController, area: Rect) {
    let steps = controller.live_reasoning();
    let title = if controller.is_busy() {
        "Reasoning (live)"
    } else if controller.final_reasoning().is_some() {
        "Reasoning (final)"
    } else {
        "Reasoning"
    };
    let text = if steps.is_empty() {
        "No reasoning steps for this request.".to_string()
    } else {
        steps
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}. {}", i + 1, s))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let para = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(para, area);
}

fn render_log(f: &mut Frame, state: &TuiState, area: Rect) {
    let text: String = state.log.iter().rev().take(50).cloned().collect::<Vec<_>>().join("\n");
    let para = Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Log"));
    f.render_widget(para, area);
}

fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}

fn spinner_char(tick: usize) -> char {
    const SPINNER: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
    SPINNER[tick % SPINNER.len()]
}

// ═══════════════════════════════════════════════════════════════
// TERMINAL SETUP
// ═══════════════════════════════════════════════════════════════

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
