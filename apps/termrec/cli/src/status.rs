use crate::countdown::{big_text, countdown_label};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::{Frame, Terminal, TerminalOptions, Viewport};
use std::io::{self, Stdout};
use std::time::{Duration, Instant};
use termrec_host::lifecycle::{ProgressSnapshot, SessionObserver, SessionState};
use termrec_host::session::Session;
use tracing::warn;

const VIEWPORT_HEIGHT: u16 = 9;

type Term = Terminal<CrosstermBackend<Stdout>>;

enum View<'a> {
    Message(&'a str),
    Countdown(Duration),
    Recording {
        snapshot: &'a ProgressSnapshot,
        window: &'a str,
    },
    Flushing {
        snapshot: &'a ProgressSnapshot,
        writing_for: Duration,
    },
}

/// Inline live status drawn below the prompt while a session runs.
pub struct LiveStatus {
    terminal: Term,
    window: String,
    flush_started: Option<Instant>,
    bottom: u16,
}

impl LiveStatus {
    pub fn new() -> io::Result<Self> {
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::with_options(
            backend,
            TerminalOptions {
                viewport: Viewport::Inline(VIEWPORT_HEIGHT),
            },
        )?;
        Ok(Self {
            terminal,
            window: String::new(),
            flush_started: None,
            bottom: 0,
        })
    }

    fn show(&mut self, view: &View<'_>) {
        match self.terminal.draw(|frame| render(frame, view)) {
            Ok(completed) => self.bottom = completed.area.bottom(),
            Err(err) => warn!(error = %err, "failed to draw status"),
        }
    }

    /// Park the cursor under the status area so later output does not overlap.
    pub fn finish(mut self) -> io::Result<()> {
        self.terminal.set_cursor(0, self.bottom)?;
        self.terminal.show_cursor()
    }
}

impl SessionObserver for LiveStatus {
    fn on_state(&mut self, state: SessionState) {
        match state {
            SessionState::Idle => self.show(&View::Message("Starting...")),
            SessionState::Flushing => self.flush_started = Some(Instant::now()),
            SessionState::Done => self.show(&View::Message("Done.")),
            SessionState::Aborted => self.show(&View::Message("Recording aborted.")),
            SessionState::CountingDown | SessionState::Recording => {}
        }
    }

    fn on_countdown(&mut self, remaining: Duration) {
        self.show(&View::Countdown(remaining));
    }

    fn on_session(&mut self, session: &Session) {
        self.window = session.label.clone();
    }

    fn on_progress(&mut self, snapshot: &ProgressSnapshot) {
        let window = std::mem::take(&mut self.window);
        match snapshot.state {
            SessionState::Flushing => {
                let writing_for = self
                    .flush_started
                    .map(|started| started.elapsed())
                    .unwrap_or_default();
                self.show(&View::Flushing {
                    snapshot,
                    writing_for,
                });
            }
            _ => self.show(&View::Recording {
                snapshot,
                window: &window,
            }),
        }
        self.window = window;
    }
}

fn render(frame: &mut Frame<'_>, view: &View<'_>) {
    let area = frame.size();
    match view {
        View::Message(text) => {
            let widget = Paragraph::new(*text).block(framed("termrec"));
            frame.render_widget(widget, area);
        }
        View::Countdown(remaining) => {
            let digits = big_text(&countdown_label(*remaining)).join("\n");
            let widget = Paragraph::new(digits)
                .alignment(Alignment::Center)
                .block(framed("Starting..."));
            frame.render_widget(widget, area);
        }
        View::Recording { snapshot, window } => render_table(frame, area, snapshot, window),
        View::Flushing {
            snapshot,
            writing_for,
        } => {
            let text = format!(
                "Writing GIF: {:.1}s ({} frames, {} still queued)",
                writing_for.as_secs_f64(),
                snapshot.frames_captured,
                snapshot.frames_queued
            );
            let widget = Paragraph::new(text).block(framed("termrec"));
            frame.render_widget(widget, area);
        }
    }
}

fn framed(title: &str) -> Block<'_> {
    Block::default().borders(Borders::ALL).title(title)
}

fn render_table(frame: &mut Frame<'_>, area: Rect, snapshot: &ProgressSnapshot, window: &str) {
    let label = |text: &'static str, color: Color| {
        Cell::from(Span::styled(text, Style::default().fg(color)))
    };

    let mut rows = vec![
        Row::new(vec![
            label("Frames", Color::Cyan),
            Cell::from(snapshot.frames_captured.to_string()),
        ]),
        Row::new(vec![
            label("Time", Color::Blue),
            Cell::from(format!("{:.1}s", snapshot.elapsed_seconds)),
        ]),
    ];
    if let Some(fps) = snapshot.effective_fps() {
        rows.push(Row::new(vec![
            label("Fps", Color::Red),
            Cell::from(format!("{fps:.1}")),
        ]));
    }
    rows.push(Row::new(vec![
        label("Queue", Color::Magenta),
        Cell::from(snapshot.frames_queued.to_string()),
    ]));
    rows.push(Row::new(vec![
        label("Window", Color::Yellow),
        Cell::from(window.to_string()),
    ]));
    rows.push(Row::new(vec![Cell::from(Span::styled(
        "Press Ctrl+C to stop.",
        Style::default().add_modifier(Modifier::DIM),
    ))]));

    let table =
        Table::new(rows, [Constraint::Length(10), Constraint::Min(10)]).block(framed("Recording"));
    frame.render_widget(table, area);
}
